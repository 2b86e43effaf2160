use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub components: Option<Map<String, Value>>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status":"healthy","version":"1.4.0"}"#).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.version.as_deref(), Some("1.4.0"));

        let degraded: HealthStatus = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!degraded.is_healthy());
    }
}
