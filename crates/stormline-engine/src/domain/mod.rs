//! Core domain types shared by the alerting and assignment halves.
//!
//! - **Alerts**: what the public is warned about (`Alert`, `AlertType`, `Severity`)
//! - **Geography**: districts and coordinates (`District`, `DistrictDirectory`, `LatLng`)
//! - **Resources**: what responds (`Resource`, `ResourceKind`, `ResourceStatus`)
//! - **Demands**: where help is needed (`Demand`, `Assignment`)

pub mod alert;
pub mod demand;
pub mod district;
pub mod location;
pub mod resource;

// Re-export all domain types
pub use alert::*;
pub use demand::*;
pub use district::*;
pub use location::*;
pub use resource::*;
