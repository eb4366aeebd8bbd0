//! Response resources: shelters, medical units, supply and water stocks.

use serde::{Deserialize, Serialize};

use super::LatLng;

/// Unique identifier for a resource
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(i64);

impl ResourceId {
    /// Create an ID from its numeric value
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the numeric value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of response resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Emergency shelter space
    Shelter,
    /// Medical teams and facilities
    Medical,
    /// General relief supplies
    Supplies,
    /// Potable water stocks
    Water,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Shelter => "Shelter",
            ResourceKind::Medical => "Medical",
            ResourceKind::Supplies => "Supplies",
            ResourceKind::Water => "Water",
        };
        write!(f, "{name}")
    }
}

/// Operational status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceStatus {
    /// Accepting assignments normally
    Available,
    /// Accepting assignments but close to saturation
    Limited,
    /// Not accepting assignments
    Unavailable,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceStatus::Available => "Available",
            ResourceStatus::Limited => "Limited",
            ResourceStatus::Unavailable => "Unavailable",
        };
        write!(f, "{name}")
    }
}

/// A deployable response resource with bounded capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Registry identifier
    pub id: ResourceId,
    /// Human-readable name
    pub name: String,
    /// Resource category
    #[serde(rename = "type")]
    pub resource_type: ResourceKind,
    /// Operational status
    pub status: ResourceStatus,
    /// Where the resource is stationed
    pub location: LatLng,
    /// Maximum units this resource can serve
    pub capacity: u32,
    /// Units currently occupied
    pub current_count: u32,
    /// Soft load signal; falls back to `current_count` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_workload: Option<u32>,
}

impl Resource {
    /// Create an available, empty resource
    pub fn new(
        id: ResourceId,
        name: impl Into<String>,
        resource_type: ResourceKind,
        location: LatLng,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            resource_type,
            status: ResourceStatus::Available,
            location,
            capacity,
            current_count: 0,
            current_workload: None,
        }
    }

    /// Unoccupied capacity
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.current_count)
    }

    /// Load pressure in [0, 1]; 0 for zero-capacity resources.
    ///
    /// Uses `current_workload` when the caller tracks one, otherwise the
    /// occupied count.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        let load = self.current_workload.unwrap_or(self.current_count);
        (f64::from(load) / f64::from(self.capacity)).min(1.0)
    }

    /// Status implied by the current counts.
    ///
    /// The stored status stays authoritative for allocation; this is for
    /// callers that track counts and want the matching status: no
    /// remaining units means `Unavailable`, under a quarter of capacity
    /// remaining means `Limited`.
    pub fn derived_status(&self) -> ResourceStatus {
        let remaining = self.remaining_capacity();
        if remaining == 0 {
            ResourceStatus::Unavailable
        } else if f64::from(remaining) < f64::from(self.capacity) * 0.25 {
            ResourceStatus::Limited
        } else {
            ResourceStatus::Available
        }
    }

    /// Whether this resource can take new assignments at all
    pub fn is_usable(&self) -> bool {
        self.status != ResourceStatus::Unavailable && self.remaining_capacity() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_resource(capacity: u32, current_count: u32) -> Resource {
        Resource {
            id: ResourceId::new(1),
            name: "Castries Shelter".to_string(),
            resource_type: ResourceKind::Shelter,
            status: ResourceStatus::Available,
            location: LatLng::new(14.0101, -60.9875),
            capacity,
            current_count,
            current_workload: None,
        }
    }

    #[test]
    fn test_remaining_capacity() {
        assert_eq!(create_test_resource(10, 3).remaining_capacity(), 7);
        assert_eq!(create_test_resource(10, 10).remaining_capacity(), 0);
        assert_eq!(create_test_resource(0, 0).remaining_capacity(), 0);
    }

    #[test]
    fn test_load_factor_prefers_workload() {
        let mut resource = create_test_resource(10, 2);
        assert!((resource.load_factor() - 0.2).abs() < 1e-9);

        resource.current_workload = Some(8);
        assert!((resource.load_factor() - 0.8).abs() < 1e-9);

        resource.current_workload = Some(15);
        assert!((resource.load_factor() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_factor_zero_capacity() {
        assert_eq!(create_test_resource(0, 0).load_factor(), 0.0);
    }

    #[test]
    fn test_derived_status_thresholds() {
        assert_eq!(
            create_test_resource(100, 0).derived_status(),
            ResourceStatus::Available
        );
        // 24 of 100 remaining: below a quarter
        assert_eq!(
            create_test_resource(100, 76).derived_status(),
            ResourceStatus::Limited
        );
        // Exactly a quarter remaining is still Available
        assert_eq!(
            create_test_resource(100, 75).derived_status(),
            ResourceStatus::Available
        );
        assert_eq!(
            create_test_resource(100, 100).derived_status(),
            ResourceStatus::Unavailable
        );
    }

    #[test]
    fn test_is_usable() {
        assert!(create_test_resource(10, 5).is_usable());
        assert!(!create_test_resource(10, 10).is_usable());

        let mut down = create_test_resource(10, 0);
        down.status = ResourceStatus::Unavailable;
        assert!(!down.is_usable());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ResourceKind::Water.to_string(), "Water");
        assert_eq!(ResourceStatus::Limited.to_string(), "Limited");
        assert_eq!(ResourceId::new(42).to_string(), "42");
    }

    #[test]
    fn test_resource_json_shape() {
        let json = r#"{
            "id": 3,
            "name": "Vieux Fort Medical Post",
            "type": "Medical",
            "status": "Limited",
            "location": { "lat": 13.7246, "lng": -60.9490 },
            "capacity": 20,
            "current_count": 17
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.resource_type, ResourceKind::Medical);
        assert_eq!(resource.status, ResourceStatus::Limited);
        assert_eq!(resource.remaining_capacity(), 3);
        assert_eq!(resource.current_workload, None);
    }
}
