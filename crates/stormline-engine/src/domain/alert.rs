//! Public emergency alerts and their severity/hazard weighting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::District;
use crate::EngineError;

/// Unique identifier for an alert
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AlertId(i64);

impl AlertId {
    /// Create an ID from its numeric value
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the numeric value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hazard category of an alert.
///
/// Unrecognized categories parse to `Other` instead of failing; new
/// hazard names coming off upstream feeds must not break intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertType {
    /// Hurricane or tropical cyclone
    Hurricane,
    /// River or flash flooding
    Flood,
    /// Landslide or mudslide
    Landslide,
    /// Coastal storm surge
    StormSurge,
    /// Damaging winds below hurricane strength
    HighWind,
    /// Sustained heavy rainfall
    HeavyRain,
    /// Any unrecognized hazard
    Other,
}

impl AlertType {
    /// Hazard weight used by the scoring function
    pub fn weight(&self) -> f64 {
        match self {
            AlertType::Hurricane => 2.0,
            AlertType::Flood | AlertType::Landslide => 1.8,
            AlertType::StormSurge => 1.6,
            AlertType::HighWind => 1.4,
            AlertType::HeavyRain => 1.2,
            AlertType::Other => 1.0,
        }
    }

    /// Canonical name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Hurricane => "Hurricane",
            AlertType::Flood => "Flood",
            AlertType::Landslide => "Landslide",
            AlertType::StormSurge => "Storm Surge",
            AlertType::HighWind => "High Wind",
            AlertType::HeavyRain => "Heavy Rain",
            AlertType::Other => "Other",
        }
    }

    /// Parse a hazard name; anything unrecognized maps to `Other`
    pub fn parse(value: &str) -> Self {
        match value {
            "Hurricane" => AlertType::Hurricane,
            "Flood" => AlertType::Flood,
            "Landslide" => AlertType::Landslide,
            "Storm Surge" => AlertType::StormSurge,
            "High Wind" => AlertType::HighWind,
            "Heavy Rain" => AlertType::HeavyRain,
            _ => AlertType::Other,
        }
    }
}

impl From<&str> for AlertType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AlertType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlertType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(AlertType::parse(&value))
    }
}

/// Alert severity level.
///
/// Unlike hazard categories, an unknown severity is an input error;
/// severity drives both scoring and demand urgency and has no safe
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Life-threatening conditions
    High,
    /// Significant disruption expected
    Medium,
    /// Informational
    Low,
}

impl Severity {
    /// Severity weight used by the scoring function
    pub fn weight(&self) -> f64 {
        match self {
            Severity::High => 100.0,
            Severity::Medium => 50.0,
            Severity::Low => 10.0,
        }
    }

    /// Urgency factor for demand derivation, in (0, 1]
    pub fn urgency(&self) -> f64 {
        match self {
            Severity::High => 1.0,
            Severity::Medium => 0.6,
            Severity::Low => 0.3,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "High" => Ok(Severity::High),
            "Medium" => Ok(Severity::Medium),
            "Low" => Ok(Severity::Low),
            other => Err(EngineError::UnknownSeverity {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        write!(f, "{name}")
    }
}

/// A public emergency alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Upstream identifier
    pub id: AlertId,
    /// Human-readable headline
    pub title: String,
    /// Hazard category
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Severity level
    pub severity: Severity,
    /// Geographic scope
    pub district: District,
    /// Whether the alert is currently in effect
    pub active: bool,
    /// Issue time
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Create an active alert issued now
    pub fn new(
        id: AlertId,
        title: impl Into<String>,
        alert_type: AlertType,
        severity: Severity,
        district: impl Into<District>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            alert_type,
            severity,
            district: district.into(),
            active: true,
            created_at: Utc::now(),
        }
    }
}
