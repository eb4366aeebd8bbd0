//! Districts and the coordinate directory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::LatLng;

/// Geographic scope of an alert or subscription.
///
/// The bare string `"All"` (exact match) is the island-wide wildcard;
/// every other string names a single district. The wire representation
/// is the plain string in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum District {
    /// Island-wide scope
    All,
    /// A single named district
    Named(String),
}

impl District {
    /// The district name as it appears on the wire
    pub fn name(&self) -> &str {
        match self {
            District::All => "All",
            District::Named(name) => name,
        }
    }

    /// Whether this is the island-wide wildcard
    pub fn is_all(&self) -> bool {
        matches!(self, District::All)
    }

    /// Scope multiplier for priority scoring.
    ///
    /// Island-wide alerts outrank single-district alerts of the same
    /// severity and hazard class.
    pub fn multiplier(&self) -> f64 {
        match self {
            District::All => 1.5,
            District::Named(_) => 1.0,
        }
    }
}

impl From<String> for District {
    fn from(name: String) -> Self {
        if name == "All" {
            District::All
        } else {
            District::Named(name)
        }
    }
}

impl From<&str> for District {
    fn from(name: &str) -> Self {
        District::from(name.to_string())
    }
}

impl std::fmt::Display for District {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for District {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for District {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(District::from(name))
    }
}

/// Representative coordinates for districts.
///
/// Demand derivation uses the directory to place an alert on the map.
/// The wildcard resolves to the anchor point when one is set (the
/// emergency-management headquarters in the seeded set), otherwise to
/// the centroid of every registered district.
#[derive(Debug, Clone, Default)]
pub struct DistrictDirectory {
    coords: HashMap<String, LatLng>,
    anchor: Option<LatLng>,
}

impl DistrictDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the ten Saint Lucia districts and the
    /// NEMO headquarters as the island-wide anchor.
    pub fn saint_lucia() -> Self {
        let mut directory = Self::new();
        directory.register("Castries", LatLng::new(14.0101, -60.9875));
        directory.register("Gros Islet", LatLng::new(14.0722, -60.9498));
        directory.register("Vieux Fort", LatLng::new(13.7246, -60.9490));
        directory.register("Soufriere", LatLng::new(13.8566, -61.0564));
        directory.register("Micoud", LatLng::new(13.8247, -60.9002));
        directory.register("Dennery", LatLng::new(13.8963, -60.8888));
        directory.register("Laborie", LatLng::new(13.7516, -60.9932));
        directory.register("Choiseul", LatLng::new(13.7762, -61.0490));
        directory.register("Anse La Raye", LatLng::new(13.9462, -61.0379));
        directory.register("Canaries", LatLng::new(13.9042, -61.0687));
        directory.set_anchor(LatLng::new(14.0089, -60.9789));
        directory
    }

    /// Register coordinates for a named district
    pub fn register(&mut self, name: impl Into<String>, coords: LatLng) {
        self.coords.insert(name.into(), coords);
    }

    /// Set the anchor point used for the island-wide wildcard
    pub fn set_anchor(&mut self, coords: LatLng) {
        self.anchor = Some(coords);
    }

    /// Look up coordinates for a district.
    ///
    /// Returns `None` for an unknown named district, or for the wildcard
    /// when the directory is empty and has no anchor.
    pub fn locate(&self, district: &District) -> Option<LatLng> {
        match district {
            District::All => self.anchor.or_else(|| self.centroid()),
            District::Named(name) => self.coords.get(name).copied(),
        }
    }

    /// Number of registered districts
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether any districts are registered
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Registered district names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.coords.keys().map(String::as_str)
    }

    fn centroid(&self) -> Option<LatLng> {
        if self.coords.is_empty() {
            return None;
        }
        let n = self.coords.len() as f64;
        let (lat_sum, lng_sum) = self
            .coords
            .values()
            .fold((0.0, 0.0), |(lat, lng), c| (lat + c.lat, lng + c.lng));
        Some(LatLng::new(lat_sum / n, lng_sum / n))
    }
}
