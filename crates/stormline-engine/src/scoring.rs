//! Alert priority scoring.
//!
//! A score is the product of three weights: severity (dominant), hazard
//! type, and geographic scope. Island-wide alerts carry a 1.5× scope
//! multiplier, so a High hurricane over the whole island scores
//! 100 × 2.0 × 1.5 = 300 while a Low heavy-rain notice in one district
//! scores 10 × 1.2 × 1.0 = 12.

use crate::domain::Alert;

/// Compute the priority score for an alert.
///
/// Pure: the same alert always yields the same score. Unknown hazard
/// categories were collapsed to [`AlertType::Other`] (weight 1.0) at the
/// parse boundary, so scoring never fails.
///
/// [`AlertType::Other`]: crate::domain::AlertType::Other
pub fn priority(alert: &Alert) -> f64 {
    alert.severity.weight() * alert.alert_type.weight() * alert.district.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertId, AlertType, Severity};

    fn create_test_alert(alert_type: AlertType, severity: Severity, district: &str) -> Alert {
        Alert::new(AlertId::new(1), "test", alert_type, severity, district)
    }

    #[test]
    fn test_island_wide_hurricane_scores_300() {
        let alert = create_test_alert(AlertType::Hurricane, Severity::High, "All");
        assert_eq!(priority(&alert), 300.0);
    }

    #[test]
    fn test_low_heavy_rain_scores_12() {
        let alert = create_test_alert(AlertType::HeavyRain, Severity::Low, "Castries");
        assert_eq!(priority(&alert), 12.0);
    }

    #[test]
    fn test_flood_outranks_storm_surge_at_equal_severity() {
        let flood = create_test_alert(AlertType::Flood, Severity::Medium, "Dennery");
        let surge = create_test_alert(AlertType::StormSurge, Severity::Medium, "Dennery");
        assert!(priority(&flood) > priority(&surge));
        assert_eq!(priority(&flood), 90.0);
        assert_eq!(priority(&surge), 80.0);
    }

    #[test]
    fn test_severity_dominates_hazard_weight() {
        // A High anything outranks a Medium hurricane
        let high_other = create_test_alert(AlertType::Other, Severity::High, "Micoud");
        let medium_hurricane = create_test_alert(AlertType::Hurricane, Severity::Medium, "Micoud");
        assert!(priority(&high_other) > priority(&medium_hurricane));
    }

    #[test]
    fn test_severity_is_monotonic_for_fixed_hazard() {
        let high = create_test_alert(AlertType::Flood, Severity::High, "Castries");
        let medium = create_test_alert(AlertType::Flood, Severity::Medium, "Castries");
        let low = create_test_alert(AlertType::Flood, Severity::Low, "Castries");
        assert!(priority(&high) > priority(&medium));
        assert!(priority(&medium) > priority(&low));
    }

    #[test]
    fn test_hazard_weights_are_monotonic_for_fixed_severity() {
        let scores: Vec<f64> = [
            AlertType::Hurricane,
            AlertType::Flood,
            AlertType::Landslide,
            AlertType::StormSurge,
            AlertType::HighWind,
            AlertType::HeavyRain,
            AlertType::Other,
        ]
        .into_iter()
        .map(|alert_type| priority(&create_test_alert(alert_type, Severity::High, "Dennery")))
        .collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_island_wide_multiplier_is_exactly_one_and_a_half() {
        let island = create_test_alert(AlertType::StormSurge, Severity::Medium, "All");
        let local = create_test_alert(AlertType::StormSurge, Severity::Medium, "Soufriere");
        assert_eq!(priority(&island), 1.5 * priority(&local));
    }

    #[test]
    fn test_unknown_hazard_defaults_to_neutral_weight() {
        let alert = create_test_alert(AlertType::Other, Severity::Medium, "Laborie");
        assert_eq!(priority(&alert), 50.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let alert = create_test_alert(AlertType::Flood, Severity::High, "All");
        let first = priority(&alert);
        for _ in 0..10 {
            assert_eq!(priority(&alert), first);
        }
    }
}
