//! Demand points and assignment results.

use serde::{Deserialize, Serialize};

use super::{Alert, DistrictDirectory, LatLng, ResourceId, ResourceKind};
use crate::EngineError;

/// Caller-meaningful identifier for a demand point
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DemandId(String);

impl DemandId {
    /// Create an ID from any string-like key
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DemandId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for DemandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point where one unit of a resource category is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    /// Caller-meaningful key, echoed back in assignments
    pub id: DemandId,
    /// Resource category that can serve this demand
    pub resource_type: ResourceKind,
    /// Where help is needed
    pub location: LatLng,
    /// Units requested. Allocation treats every demand as a single
    /// unit; use [`Demand::fan_out`] to expand multi-unit requests.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// How urgently this demand needs serving, in (0, 1]
    pub urgency: f64,
}

fn default_quantity() -> u32 {
    1
}

impl Demand {
    /// Create a unit demand
    pub fn new(
        id: impl Into<DemandId>,
        resource_type: ResourceKind,
        location: LatLng,
        urgency: f64,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type,
            location,
            quantity: 1,
            urgency,
        }
    }

    /// Derive a unit demand from an alert.
    ///
    /// The location comes from the district directory and the urgency
    /// from the alert severity. Fails when the directory has no
    /// coordinates for the alert's district.
    pub fn from_alert(
        alert: &Alert,
        resource_type: ResourceKind,
        directory: &DistrictDirectory,
    ) -> Result<Self, EngineError> {
        let location =
            directory
                .locate(&alert.district)
                .ok_or_else(|| EngineError::UnknownDistrict {
                    district: alert.district.name().to_string(),
                })?;
        Ok(Self {
            id: DemandId::new(format!("alert-{}", alert.id)),
            resource_type,
            location,
            quantity: 1,
            urgency: alert.severity.urgency(),
        })
    }

    /// Expand a multi-unit demand into unit demands.
    ///
    /// Unit demands keep their id; larger quantities split into `#k`
    /// suffixed copies so every unit competes for capacity on its own.
    pub fn fan_out(self) -> Vec<Demand> {
        if self.quantity <= 1 {
            return vec![Demand { quantity: 1, ..self }];
        }
        (1..=self.quantity)
            .map(|unit| Demand {
                id: DemandId::new(format!("{}#{unit}", self.id)),
                quantity: 1,
                ..self.clone()
            })
            .collect()
    }
}

/// One optimizer pairing of a demand with a resource unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// The demand being served
    pub demand_id: DemandId,
    /// The resource serving it
    pub resource_id: ResourceId,
    /// Pair cost under the allocator's cost model
    pub cost: f64,
}
