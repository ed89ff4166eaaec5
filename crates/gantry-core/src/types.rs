//! Shared types used across gantry crates.

use serde::{Deserialize, Serialize};

/// Operational status reported by an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentStatus {
    /// Environment is being provisioned for the first time.
    Launching,
    /// Environment is applying a new version or configuration.
    Updating,
    /// Environment has converged; the terminal success state for a deploy.
    Ready,
    /// Environment is serving traffic with reduced health.
    Degraded,
    /// Environment is being torn down.
    Terminating,
    /// Environment no longer exists.
    Terminated,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EnvironmentStatus::Launching => "Launching",
            EnvironmentStatus::Updating => "Updating",
            EnvironmentStatus::Ready => "Ready",
            EnvironmentStatus::Degraded => "Degraded",
            EnvironmentStatus::Terminating => "Terminating",
            EnvironmentStatus::Terminated => "Terminated",
            EnvironmentStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Coarse health classification reported alongside the status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthColor {
    Green,
    Yellow,
    Red,
    #[default]
    #[serde(other)]
    Grey,
}

impl std::fmt::Display for HealthColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthColor::Green => "Green",
            HealthColor::Yellow => "Yellow",
            HealthColor::Red => "Red",
            HealthColor::Grey => "Grey",
        };
        f.write_str(s)
    }
}

/// A point-in-time read of an environment's health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: EnvironmentStatus,
    /// Free-form health description ("Ok", "Warning", "Severe", ...).
    pub health_status: String,
    #[serde(default)]
    pub color: HealthColor,
    /// Epoch seconds when the sample was taken, stamped client-side.
    #[serde(default)]
    pub observed_at: u64,
}

impl HealthSnapshot {
    /// Build a snapshot stamped with the current time.
    pub fn now(status: EnvironmentStatus, health_status: impl Into<String>, color: HealthColor) -> Self {
        Self {
            status,
            health_status: health_status.into(),
            color,
            observed_at: epoch_secs(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == EnvironmentStatus::Ready
    }
}

/// A status/health change between two consecutive health samples.
///
/// Purely informational: nothing in the pipeline decides anything based
/// on a transition, it is only reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from_status: EnvironmentStatus,
    pub from_health: String,
    pub to_status: EnvironmentStatus,
    pub to_health: String,
}

/// Acknowledgment that an environment accepted an update request.
///
/// Acceptance only — it does not imply the switch has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub environment: String,
    pub version_label: String,
    pub status: EnvironmentStatus,
}

/// A registered application version, with the label the service actually
/// assigned (which may differ from the requested one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedVersion {
    pub label: String,
}

/// One environment option override, applied in order during an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingOverride {
    pub name: String,
    pub value: String,
}

/// Seconds since the Unix epoch.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_deserializes() {
        let status: EnvironmentStatus = serde_json::from_str("\"LinkingFrom\"").unwrap();
        assert_eq!(status, EnvironmentStatus::Unknown);
    }

    #[test]
    fn known_status_round_trips() {
        let status: EnvironmentStatus = serde_json::from_str("\"Ready\"").unwrap();
        assert_eq!(status, EnvironmentStatus::Ready);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Ready\"");
    }

    #[test]
    fn color_defaults_to_grey() {
        let snapshot: HealthSnapshot =
            serde_json::from_str(r#"{"status":"Updating","health_status":"Info"}"#).unwrap();
        assert_eq!(snapshot.color, HealthColor::Grey);
        assert_eq!(snapshot.observed_at, 0);
    }

    #[test]
    fn snapshot_now_is_stamped() {
        let snapshot = HealthSnapshot::now(EnvironmentStatus::Ready, "Ok", HealthColor::Green);
        assert!(snapshot.is_ready());
        assert!(snapshot.observed_at > 0);
    }
}
