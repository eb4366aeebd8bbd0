//! # stormline-engine
//!
//! Alert prioritization and resource assignment for disaster response.
//!
//! This crate provides the coordination core of a hurricane-season
//! response system: it scores and ranks public emergency alerts,
//! collapses redundant ones, fans published alerts out to
//! district-scoped subscribers, and matches demand points to response
//! resources at minimum total cost.
//!
//! ## Features
//!
//! - **Priority Scoring**: severity × hazard type × geographic scope
//! - **Alert Queue**: descending-priority ordering with per-(type, district)
//!   redundancy collapse into counted summary entries
//! - **Distribution Hub**: non-blocking publish/subscribe keyed by
//!   district, with an island-wide wildcard
//! - **Assignment Optimizer**: Kuhn–Munkres matching of demands to
//!   capacity-expanded resource units
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    stormline-engine                      │
//! ├─────────────────────────────────────────────────────────┤
//! │   ┌─────────┐    ┌───────────┐    ┌────────────────┐   │
//! │   │ Scoring │───▶│   Queue   │◀───│  Distribution  │   │
//! │   │         │    │ (ranked)  │    │      Hub       │   │
//! │   └─────────┘    └─────┬─────┘    └───────┬────────┘   │
//! │                        │                  │ fan-out     │
//! │                  ┌─────▼─────┐      subscribers         │
//! │                  │  Demands  │                          │
//! │                  └─────┬─────┘                          │
//! │                  ┌─────▼─────┐                          │
//! │                  │ Allocator │──▶ assignments           │
//! │                  └───────────┘                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure library: no transport, no persistence, no UI.
//! Callers construct the hub, queue and allocator directly and observe
//! results through return values and subscriber callbacks.
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), stormline_engine::EngineError> {
//! use stormline_engine::prelude::*;
//!
//! // Score and rank incoming alerts
//! let mut queue = AlertQueue::new();
//! queue.enqueue(Alert::new(
//!     AlertId::new(1),
//!     "Hurricane warning",
//!     AlertType::Hurricane,
//!     Severity::High,
//!     "All",
//! ));
//! queue.enqueue(Alert::new(
//!     AlertId::new(2),
//!     "Localized flooding",
//!     AlertType::Flood,
//!     Severity::Medium,
//!     "Castries",
//! ));
//! assert_eq!(queue.peek().map(|a| a.id), Some(AlertId::new(1)));
//!
//! // Turn the top alert into a demand and match it to a resource
//! let directory = DistrictDirectory::saint_lucia();
//! let demand = Demand::from_alert(
//!     queue.peek().expect("queue is non-empty"),
//!     ResourceKind::Shelter,
//!     &directory,
//! )?;
//! let shelter = Resource::new(
//!     ResourceId::new(10),
//!     "Castries Comprehensive Secondary",
//!     ResourceKind::Shelter,
//!     LatLng::new(14.0101, -60.9875),
//!     120,
//! );
//! let assignments = allocate(&[demand], &[shelter])?;
//! assert_eq!(assignments.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod allocation;
pub mod domain;
pub mod hub;
pub mod queue;
pub mod scoring;

// Re-export main types
pub use domain::{
    alert::{Alert, AlertId, AlertType, Severity},
    demand::{Assignment, Demand, DemandId},
    district::{District, DistrictDirectory},
    location::LatLng,
    resource::{Resource, ResourceId, ResourceKind, ResourceStatus},
};

pub use allocation::{allocate, Allocator, AllocatorConfig, AllocatorConfigBuilder};
pub use hub::{AlertHub, DistrictSubscriber, LogSubscriber, Subscription};
pub use queue::AlertQueue;
pub use scoring::priority;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Unified error type for engine operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A severity string was not one of the known levels
    #[error("unknown severity '{value}' (expected High, Medium or Low)")]
    UnknownSeverity {
        /// The rejected input
        value: String,
    },

    /// No coordinates are registered for a district
    #[error("no coordinates registered for district '{district}'")]
    UnknownDistrict {
        /// The district that could not be located
        district: String,
    },

    /// A demand failed input validation
    #[error("invalid demand '{id}': {field} {reason}")]
    InvalidDemand {
        /// Which demand
        id: DemandId,
        /// Which field was rejected
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A resource failed input validation
    #[error("invalid resource {id}: {field} {reason}")]
    InvalidResource {
        /// Which resource
        id: ResourceId,
        /// Which field was rejected
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A subscriber reported a delivery failure
    #[error("subscriber '{name}' failed: {reason}")]
    Subscriber {
        /// The subscriber's registration name
        name: String,
        /// What went wrong
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn invalid_demand(
        id: &DemandId,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidDemand {
            id: id.clone(),
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_resource(
        id: ResourceId,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidResource {
            id,
            field,
            reason: reason.into(),
        }
    }

    /// Build a subscriber failure, for [`DistrictSubscriber`] impls
    pub fn subscriber(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Subscriber {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Common imports for working with the engine
pub mod prelude {
    pub use crate::allocation::{allocate, Allocator, AllocatorConfig};
    pub use crate::domain::{
        Alert, AlertId, AlertType, Assignment, Demand, DemandId, District, DistrictDirectory,
        LatLng, Resource, ResourceId, ResourceKind, ResourceStatus, Severity,
    };
    pub use crate::hub::{AlertHub, DistrictSubscriber, LogSubscriber, Subscription};
    pub use crate::queue::AlertQueue;
    pub use crate::scoring::priority;
    pub use crate::{EngineError, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_messages_name_entity_and_field() {
        let demand_err = EngineError::invalid_demand(
            &DemandId::new("alert-3"),
            "urgency",
            "must be a finite value in (0, 1]",
        );
        assert_eq!(
            demand_err.to_string(),
            "invalid demand 'alert-3': urgency must be a finite value in (0, 1]"
        );

        let resource_err =
            EngineError::invalid_resource(ResourceId::new(9), "current_count", "exceeds capacity");
        assert_eq!(
            resource_err.to_string(),
            "invalid resource 9: current_count exceeds capacity"
        );
    }

    #[test]
    fn test_subscriber_error_display() {
        let err = EngineError::subscriber("sms-gateway", "connection refused");
        assert_eq!(
            err.to_string(),
            "subscriber 'sms-gateway' failed: connection refused"
        );
    }
}
