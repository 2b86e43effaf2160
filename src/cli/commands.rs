//! Command handlers.
//!
//! Results go to stdout; progress (thinking steps, poll ticks) goes to
//! stderr so piping the answer stays clean.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use futures_util::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::args::{
    ChatArgs, Cli, Command, ConversationsCommand, JobsCommand, ReportsCommand, ScheduleFields,
    SchedulesCommand, WorkspacesCommand,
};
use crate::adapters::FilePreferences;
use crate::api::{CopilotClient, JobFilter};
use crate::config::ClientConfig;
use crate::error::{CopilotError, CopilotResult};
use crate::models::{Job, NewWorkspace, Schedule, ScheduleInput, ThinkingStep, Workspace};
use crate::poller::{poll_job, poll_jobs, PollUpdate};
use crate::sse::ChatStreamEvent;
use crate::state::{ChatState, WorkspaceSelection};
use crate::traits::PreferencesStore;

/// Execute the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config()?;
    let client = CopilotClient::new(config.clone())?;
    let json = cli.json;

    match cli.command {
        Command::Health => health(&client, json).await,
        Command::Chat(args) => chat(&client, &config, args, json).await,
        Command::Conversations(cmd) => conversations(&client, cmd, json).await,
        Command::Workspaces(cmd) => workspaces(&client, &config, cmd, json).await,
        Command::Jobs(cmd) => jobs(&client, &config, cmd, json).await,
        Command::Schedules(cmd) => schedules(&client, cmd, json).await,
        Command::Reports(cmd) => reports(&client, cmd, json).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn preferences_store(config: &ClientConfig) -> Result<Arc<dyn PreferencesStore>> {
    let store = match &config.preferences_path {
        Some(path) => FilePreferences::with_path(path),
        None => FilePreferences::new()?,
    };
    Ok(Arc::new(store))
}

/// Cancel `token` on Ctrl-C. Abort the returned task when done.
fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, cancelling");
            token.cancel();
        }
    })
}

async fn health(client: &CopilotClient, json: bool) -> Result<()> {
    let health = client.health().await?;
    if json {
        return print_json(&health);
    }

    println!(
        "{} {}",
        health.status,
        health.version.as_deref().unwrap_or("")
    );
    if let Some(components) = &health.components {
        for (name, status) in components {
            match status.as_str() {
                Some(text) => println!("  {}: {}", name, text),
                None => println!("  {}: {}", name, status),
            }
        }
    }
    if !health.is_healthy() {
        return Err(eyre!("backend reports status '{}'", health.status));
    }
    Ok(())
}

/// Writes assistant text snapshots to stdout as they grow.
#[derive(Debug, Default)]
struct ContentPrinter {
    printed: String,
}

impl ContentPrinter {
    /// The part of `snapshot` not yet on screen. A snapshot that does not
    /// extend the printed text starts over on a new line.
    fn delta<'a>(&mut self, snapshot: &'a str) -> std::borrow::Cow<'a, str> {
        let out = if let Some(rest) = snapshot.strip_prefix(self.printed.as_str()) {
            std::borrow::Cow::Borrowed(rest)
        } else {
            std::borrow::Cow::Owned(format!("\n{}", snapshot))
        };
        self.printed = snapshot.to_string();
        out
    }

    fn print(&mut self, snapshot: &str) -> Result<()> {
        let delta = self.delta(snapshot);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(delta.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn has_output(&self) -> bool {
        !self.printed.is_empty()
    }
}

fn format_step(step: &ThinkingStep) -> String {
    let mut line = format!("{} {}: {}", step.status.symbol(), step.agent, step.action);
    if let Some(detail) = step.detail.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!(" ({})", detail));
    }
    if let Some(ms) = step.duration_ms {
        line.push_str(&format!(" [{} ms]", ms));
    }
    if step.parent_id.is_some() {
        line.insert_str(0, "    ");
    } else {
        line.insert_str(0, "  ");
    }
    line
}

async fn chat(
    client: &CopilotClient,
    config: &ClientConfig,
    args: ChatArgs,
    json: bool,
) -> Result<()> {
    let mut selection = WorkspaceSelection::load(preferences_store(config)?);
    let workspace_ids = if args.workspaces.is_empty() {
        selection.selected().to_vec()
    } else {
        args.workspaces.clone()
    };
    let conversation_id = if args.resume {
        selection.last_conversation_id().map(str::to_string)
    } else {
        args.conversation.clone()
    };

    let mut state = ChatState::new();
    if let Some(id) = conversation_id {
        state = state.with_conversation_id(id);
    }
    let request = state.begin_turn(args.message, &workspace_ids);

    if args.no_stream {
        let envelope = client.send_chat(&request).await?;
        state.complete(envelope);
    } else {
        let cancel = CancellationToken::new();
        let ctrl_c = cancel_on_ctrl_c(cancel.clone());
        let mut events = client.stream_chat(&request, cancel);
        let mut printer = ContentPrinter::default();

        while let Some(event) = events.next().await {
            match &event {
                ChatStreamEvent::ThinkingStep(step) if !json => {
                    let seen = state.timeline().get(&step.id).is_some();
                    if !seen || step.status.is_finished() {
                        eprintln!("{}", format_step(step));
                    }
                }
                ChatStreamEvent::Content(text) if !json => printer.print(text)?,
                _ => {}
            }
            state.apply(&event);
        }
        ctrl_c.abort();

        if printer.has_output() {
            println!();
        }
    }

    if let Some(error) = state.last_error() {
        tracing::debug!(code = error.error_code(), "{}", error);
        return Err(eyre!("{}", error.user_message()));
    }

    let envelope = state
        .last_envelope()
        .ok_or_else(|| eyre!("the stream ended before the answer was complete"))?;

    if json {
        print_json(envelope)?;
    } else {
        if args.no_stream {
            println!("{}", envelope.content);
        }
        if let Some(chain) = &envelope.agent_chain {
            eprintln!("agents: {}", chain.join(" → "));
        }
    }

    if let Some(id) = state.conversation_id() {
        eprintln!("conversation: {}", id);
        selection.set_last_conversation_id(Some(id.to_string()));
        if let Err(e) = selection.save() {
            tracing::warn!("Failed to save preferences: {}", e);
        }
    }
    Ok(())
}

async fn conversations(client: &CopilotClient, cmd: ConversationsCommand, json: bool) -> Result<()> {
    match cmd {
        ConversationsCommand::List => {
            let conversations = client.list_conversations().await?;
            if json {
                return print_json(&conversations);
            }
            for c in &conversations {
                println!(
                    "{}\t{}\t{}",
                    c.id,
                    c.display_title(),
                    c.message_count.map(|n| n.to_string()).unwrap_or_default()
                );
            }
        }
        ConversationsCommand::Show { id } => {
            let conversation = client.get_conversation(&id).await?;
            if json {
                return print_json(&conversation);
            }
            println!("# {}", conversation.summary.display_title());
            for message in &conversation.messages {
                println!("\n[{}]\n{}", message.role.as_str(), message.content);
            }
        }
        ConversationsCommand::Rename { id, title } => {
            client.rename_conversation(&id, &title).await?;
            println!("Renamed {}", id);
        }
        ConversationsCommand::Delete { id } => {
            client.delete_conversation(&id).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn format_workspace(workspace: &Workspace, selected: bool) -> String {
    format!(
        "{}{}\t{}\t{} files",
        if selected { "* " } else { "  " },
        workspace.id,
        workspace.name,
        workspace.files.len()
    )
}

async fn workspaces(
    client: &CopilotClient,
    config: &ClientConfig,
    cmd: WorkspacesCommand,
    json: bool,
) -> Result<()> {
    match cmd {
        WorkspacesCommand::List => {
            let workspaces = client.list_workspaces().await?;
            if json {
                return print_json(&workspaces);
            }
            let selection = WorkspaceSelection::load(preferences_store(config)?);
            for w in &workspaces {
                println!("{}", format_workspace(w, selection.is_selected(&w.id)));
            }
        }
        WorkspacesCommand::Show { id } => {
            let workspace = client.get_workspace(&id).await?;
            if json {
                return print_json(&workspace);
            }
            println!("{} ({})", workspace.name, workspace.id);
            if let Some(description) = &workspace.description {
                println!("{}", description);
            }
            for file in &workspace.files {
                match file.size {
                    Some(size) => println!("  {}\t{} bytes", file.path, size),
                    None => println!("  {}", file.path),
                }
            }
        }
        WorkspacesCommand::Create { name, description } => {
            let workspace = client
                .create_workspace(&NewWorkspace { name, description })
                .await?;
            if json {
                return print_json(&workspace);
            }
            println!("Created {} ({})", workspace.name, workspace.id);
        }
        WorkspacesCommand::Delete { id } => {
            client.delete_workspace(&id).await?;
            println!("Deleted {}", id);
        }
        WorkspacesCommand::ReadFile { id, path } => {
            let file = client.read_file(&id, &path).await?;
            if json {
                return print_json(&file);
            }
            print!("{}", file.content);
        }
        WorkspacesCommand::WriteFile {
            id,
            path,
            from,
            content,
        } => {
            let content = read_content(from, content)?;
            client.write_file(&id, &path, &content).await?;
            println!("Wrote {} ({} bytes)", path, content.len());
        }
        WorkspacesCommand::Select { ids, toggle } => {
            let mut selection = WorkspaceSelection::load(preferences_store(config)?);
            if toggle {
                for id in &ids {
                    selection.toggle(id);
                }
            } else {
                selection.set(ids);
            }
            selection.save()?;
            println!("Selected: {}", selection.selected().join(", "));
        }
        WorkspacesCommand::Selected => {
            let mut selection = WorkspaceSelection::load(preferences_store(config)?);
            let workspaces = client.list_workspaces().await?;
            let dropped = selection.retain_existing(&workspaces);
            if !dropped.is_empty() {
                eprintln!("Dropped missing workspaces: {}", dropped.join(", "));
                selection.save()?;
            }
            if json {
                return print_json(&selection.selected());
            }
            for w in workspaces.iter().filter(|w| selection.is_selected(&w.id)) {
                println!("{}", format_workspace(w, true));
            }
        }
    }
    Ok(())
}

fn read_content(from: Option<PathBuf>, content: Option<String>) -> Result<String> {
    match (from, content) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        (None, Some(content)) => Ok(content),
        (None, None) => Err(eyre!("either --from or --content is required")),
    }
}

fn format_job(job: &Job) -> String {
    let mut line = format!("{}\t{}", job.id, job.status);
    if let Some(progress) = job.progress {
        line.push_str(&format!("\t{:.0}%", progress));
    }
    if let Some(elapsed) = job.elapsed(chrono::Utc::now()) {
        line.push_str(&format!("\t{}s", elapsed.num_seconds()));
    }
    if let Some(report) = &job.report_id {
        line.push_str(&format!("\treport {}", report));
    }
    if let Some(error) = &job.error {
        line.push_str(&format!("\t{}", error));
    }
    line
}

fn watch_interval(
    flag_secs: Option<u64>,
    default: std::time::Duration,
) -> CopilotResult<std::time::Duration> {
    match flag_secs {
        Some(0) => Err(CopilotError::configuration(
            "--interval must be at least one second",
        )),
        Some(secs) => Ok(std::time::Duration::from_secs(secs)),
        None => Ok(default),
    }
}

async fn jobs(
    client: &CopilotClient,
    config: &ClientConfig,
    cmd: JobsCommand,
    json: bool,
) -> Result<()> {
    match cmd {
        JobsCommand::List { status, limit } => {
            let filter = JobFilter { status, limit };
            let jobs = client.list_jobs(&filter).await?;
            if json {
                return print_json(&jobs);
            }
            for job in &jobs {
                println!("{}", format_job(job));
            }
        }
        JobsCommand::Show { id } => {
            let job = client.get_job(&id).await?;
            if json {
                return print_json(&job);
            }
            println!("{}", format_job(&job));
        }
        JobsCommand::Cancel { id } => {
            let job = client.cancel_job(&id).await?;
            if json {
                return print_json(&job);
            }
            println!("{}", format_job(&job));
        }
        JobsCommand::Watch { id, interval } => {
            let interval = watch_interval(interval, config.poll_interval)?;
            let cancel = CancellationToken::new();
            let ctrl_c = cancel_on_ctrl_c(cancel.clone());

            match id {
                Some(id) => {
                    let (handle, mut rx) = poll_job(client.clone(), id, interval, cancel);
                    while let Some(update) = rx.recv().await {
                        match update {
                            PollUpdate::Snapshot(job) if json => print_json(&job)?,
                            PollUpdate::Snapshot(job) => println!("{}", format_job(&job)),
                            PollUpdate::Failed(e) => eprintln!("poll failed: {}", e.user_message()),
                        }
                    }
                    handle.join().await;
                }
                None => {
                    let (handle, mut rx) =
                        poll_jobs(client.clone(), JobFilter::default(), interval, cancel);
                    while let Some(update) = rx.recv().await {
                        match update {
                            PollUpdate::Snapshot(jobs) if json => print_json(&jobs)?,
                            PollUpdate::Snapshot(jobs) => {
                                let active: Vec<_> = jobs.iter().filter(|j| j.is_active()).collect();
                                eprintln!("-- {} active --", active.len());
                                for job in active {
                                    println!("{}", format_job(job));
                                }
                            }
                            PollUpdate::Failed(e) => eprintln!("poll failed: {}", e.user_message()),
                        }
                    }
                    handle.join().await;
                }
            }
            ctrl_c.abort();
        }
    }
    Ok(())
}

fn format_schedule(schedule: &Schedule) -> String {
    format!(
        "{}\t{}\t{}\t{}\tnext {}",
        schedule.id,
        if schedule.enabled { "on " } else { "off" },
        schedule.cron_expression,
        schedule.name,
        schedule
            .next_run_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    )
}

/// Apply the given fields on top of `input`.
fn merge_schedule_fields(mut input: ScheduleInput, fields: ScheduleFields) -> ScheduleInput {
    if let Some(name) = fields.name {
        input.name = name;
    }
    if let Some(cron) = fields.cron {
        input.cron_expression = cron;
    }
    if !fields.workspaces.is_empty() {
        input.workspace_ids = fields.workspaces;
    }
    if !fields.tests.is_empty() {
        input.test_ids = fields.tests;
    }
    if fields.description.is_some() {
        input.description = fields.description;
    }
    if fields.disabled {
        input.enabled = false;
    }
    input
}

fn new_schedule_input(fields: ScheduleFields) -> Result<ScheduleInput> {
    let name = fields
        .name
        .clone()
        .ok_or_else(|| eyre!("--name is required"))?;
    let cron_expression = fields
        .cron
        .clone()
        .ok_or_else(|| eyre!("--cron is required"))?;
    let base = ScheduleInput {
        name,
        cron_expression,
        workspace_ids: Vec::new(),
        test_ids: Vec::new(),
        enabled: true,
        description: None,
    };
    Ok(merge_schedule_fields(base, fields))
}

async fn schedules(client: &CopilotClient, cmd: SchedulesCommand, json: bool) -> Result<()> {
    let schedule = match cmd {
        SchedulesCommand::List => {
            let schedules = client.list_schedules().await?;
            if json {
                return print_json(&schedules);
            }
            for s in &schedules {
                println!("{}", format_schedule(s));
            }
            return Ok(());
        }
        SchedulesCommand::Delete { id } => {
            client.delete_schedule(&id).await?;
            println!("Deleted {}", id);
            return Ok(());
        }
        SchedulesCommand::Show { id } => client.get_schedule(&id).await?,
        SchedulesCommand::Create(fields) => {
            client.create_schedule(&new_schedule_input(fields)?).await?
        }
        SchedulesCommand::Update { id, fields } => {
            let current = client.get_schedule(&id).await?;
            let input = merge_schedule_fields(ScheduleInput::from(&current), fields);
            client.update_schedule(&id, &input).await?
        }
        SchedulesCommand::Toggle { id } => client.toggle_schedule(&id).await?,
    };

    if json {
        print_json(&schedule)
    } else {
        println!("{}", format_schedule(&schedule));
        Ok(())
    }
}

async fn reports(client: &CopilotClient, cmd: ReportsCommand, json: bool) -> Result<()> {
    match cmd {
        ReportsCommand::List => {
            let reports = client.list_reports().await?;
            if json {
                return print_json(&reports);
            }
            for r in &reports {
                println!(
                    "{}\t{}\t{}",
                    r.id,
                    r.name,
                    r.job_id.as_deref().unwrap_or("-")
                );
            }
        }
        ReportsCommand::Fetch { id, output } => {
            let html = client.fetch_report(&id).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &html)
                        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Saved report {} to {}", id, path.display());
                }
                None => print!("{}", html),
            }
        }
    }
    Ok(())
}
