use clap::Parser;
use color_eyre::Result;

use qa_copilot::cli::{self, Cli};
use qa_copilot::logging::init_tracing;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cli::run(cli))
}
