//! Resource-to-demand assignment.
//!
//! [`Allocator::allocate`] matches demand points to resource units at
//! minimum total cost. Resources expand into one column per unit of
//! remaining capacity, the matrix pads to square with dummy cells, and
//! a Kuhn–Munkres solve picks the matching. Among equal-cost optima the
//! allocator prefers the matching whose longest pairing is shortest,
//! then stable demand input order.

mod cost;
mod hungarian;

use uuid::Uuid;

use crate::domain::{Assignment, Demand, Resource};
use crate::{EngineError, Result};

use cost::DUMMY_COST;

/// Weights for the allocator's cost model.
///
/// Defaults match the production tuning: distance dominates, load
/// pressure and urgency share the rest. Weights clamp to ≥ 0 when set
/// through the builder.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Weight on haversine distance in kilometers
    pub distance_weight: f64,
    /// Weight on the resource load factor
    pub load_weight: f64,
    /// Weight on the demand urgency gap (1 − urgency)
    pub urgency_weight: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            distance_weight: 0.4,
            load_weight: 0.3,
            urgency_weight: 0.3,
        }
    }
}

impl AllocatorConfig {
    /// Start building a config
    pub fn builder() -> AllocatorConfigBuilder {
        AllocatorConfigBuilder::default()
    }
}

/// Builder for [`AllocatorConfig`]
#[derive(Debug, Default)]
pub struct AllocatorConfigBuilder {
    distance_weight: Option<f64>,
    load_weight: Option<f64>,
    urgency_weight: Option<f64>,
}

impl AllocatorConfigBuilder {
    /// Weight on haversine distance (clamped to ≥ 0)
    pub fn distance_weight(mut self, weight: f64) -> Self {
        self.distance_weight = Some(weight.max(0.0));
        self
    }

    /// Weight on resource load pressure (clamped to ≥ 0)
    pub fn load_weight(mut self, weight: f64) -> Self {
        self.load_weight = Some(weight.max(0.0));
        self
    }

    /// Weight on the urgency gap (clamped to ≥ 0)
    pub fn urgency_weight(mut self, weight: f64) -> Self {
        self.urgency_weight = Some(weight.max(0.0));
        self
    }

    /// Build the config, filling unset weights from the defaults
    pub fn build(self) -> AllocatorConfig {
        let defaults = AllocatorConfig::default();
        AllocatorConfig {
            distance_weight: self.distance_weight.unwrap_or(defaults.distance_weight),
            load_weight: self.load_weight.unwrap_or(defaults.load_weight),
            urgency_weight: self.urgency_weight.unwrap_or(defaults.urgency_weight),
        }
    }
}

/// Matches demand points to resource units at minimum total cost.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    config: AllocatorConfig,
}

/// Run the allocator once with the default cost weights.
pub fn allocate(demands: &[Demand], resources: &[Resource]) -> Result<Vec<Assignment>> {
    Allocator::new().allocate(demands, resources)
}

impl Allocator {
    /// Allocator with the default cost weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator with explicit cost weights
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// The active cost weights
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Assign each demand to at most one resource unit.
    ///
    /// Every demand counts as a single unit; multi-unit requests are
    /// expanded by the caller (see [`Demand::fan_out`]). Demands that no
    /// usable compatible resource can serve stay unassigned and simply
    /// do not appear in the result. Fails fast on malformed input,
    /// naming the entity and field.
    pub fn allocate(&self, demands: &[Demand], resources: &[Resource]) -> Result<Vec<Assignment>> {
        validate_demands(demands)?;
        validate_resources(resources)?;

        if demands.is_empty() {
            return Ok(Vec::new());
        }
        let slots = cost::expand_slots(resources, demands.len());
        if slots.is_empty() {
            tracing::info!(
                demands = demands.len(),
                "no usable resource capacity, nothing assigned"
            );
            return Ok(Vec::new());
        }

        let run_id = Uuid::new_v4();
        let matrix = cost::build_matrix(&self.config, demands, resources, &slots);
        tracing::debug!(
            %run_id,
            rows = demands.len(),
            cols = slots.len(),
            padded = matrix.len(),
            "cost matrix built"
        );

        let assigned = hungarian::solve(&matrix);
        let optimal_total = hungarian::total_cost(&matrix, &assigned);
        let assigned =
            tighten_max_distance(demands, resources, &slots, &matrix, assigned, optimal_total);

        let mut assignments = Vec::new();
        for (row, &col) in assigned.iter().enumerate() {
            if row >= demands.len() || col >= slots.len() {
                continue;
            }
            let pair_cost = matrix[row][col];
            if pair_cost >= DUMMY_COST {
                // Dummy or forbidden cell: the demand stays unserved
                continue;
            }
            assignments.push(Assignment {
                demand_id: demands[row].id.clone(),
                resource_id: resources[slots[col].resource].id,
                cost: pair_cost,
            });
        }

        tracing::info!(
            %run_id,
            demands = demands.len(),
            resources = resources.len(),
            slots = slots.len(),
            matched = assignments.len(),
            total_cost = assignments.iter().map(|a| a.cost).sum::<f64>(),
            "allocation complete"
        );
        Ok(assignments)
    }
}

/// Equality tolerance when comparing matching totals.
const TOTAL_EPS: f64 = 1e-6;

/// Among equal-total-cost matchings, prefer the one whose longest pair
/// distance is smallest.
///
/// Candidate thresholds are the distinct real pair distances. Cells
/// farther than a threshold become forbidden; a binary search keeps the
/// smallest threshold whose restricted solve still reaches the optimal
/// total. Feasibility is monotone in the threshold, which is what makes
/// the binary search sound.
fn tighten_max_distance(
    demands: &[Demand],
    resources: &[Resource],
    slots: &[cost::Slot],
    matrix: &[Vec<f64>],
    assigned: Vec<usize>,
    optimal_total: f64,
) -> Vec<usize> {
    let n = matrix.len();
    let distances = cost::build_distance_matrix(demands, resources, slots, n);

    let mut thresholds: Vec<f64> = Vec::new();
    for (row, matrix_row) in matrix.iter().enumerate().take(demands.len()) {
        for (col, &cell) in matrix_row.iter().enumerate().take(slots.len()) {
            if cell < DUMMY_COST {
                thresholds.push(distances[row][col]);
            }
        }
    }
    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    if thresholds.len() < 2 {
        return assigned;
    }

    let restrict = |limit: f64| -> Vec<Vec<f64>> {
        let mut restricted = matrix.to_vec();
        for (row, restricted_row) in restricted.iter_mut().enumerate().take(demands.len()) {
            for (col, cell) in restricted_row.iter_mut().enumerate().take(slots.len()) {
                if *cell < DUMMY_COST && distances[row][col] > limit + 1e-9 {
                    *cell = cost::FORBIDDEN_COST;
                }
            }
        }
        restricted
    };

    let mut best = assigned;
    let mut lo = 0usize;
    let mut hi = thresholds.len() - 1;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let restricted = restrict(thresholds[mid]);
        let candidate = hungarian::solve(&restricted);
        let total = hungarian::total_cost(&restricted, &candidate);
        if total <= optimal_total + TOTAL_EPS {
            best = candidate;
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    best
}

fn validate_demands(demands: &[Demand]) -> Result<()> {
    for demand in demands {
        if demand.quantity < 1 {
            return Err(EngineError::invalid_demand(
                &demand.id,
                "quantity",
                "must be at least 1",
            ));
        }
        if !demand.location.is_valid() {
            return Err(EngineError::invalid_demand(
                &demand.id,
                "location",
                "latitude/longitude out of range",
            ));
        }
        if !demand.urgency.is_finite() || demand.urgency <= 0.0 || demand.urgency > 1.0 {
            return Err(EngineError::invalid_demand(
                &demand.id,
                "urgency",
                "must be a finite value in (0, 1]",
            ));
        }
    }
    Ok(())
}

fn validate_resources(resources: &[Resource]) -> Result<()> {
    for resource in resources {
        if resource.current_count > resource.capacity {
            return Err(EngineError::invalid_resource(
                resource.id,
                "current_count",
                "exceeds capacity",
            ));
        }
        if !resource.location.is_valid() {
            return Err(EngineError::invalid_resource(
                resource.id,
                "location",
                "latitude/longitude out of range",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LatLng, ResourceId, ResourceKind, ResourceStatus};

    // Equator coordinates make longitude differences exactly
    // proportional to distance, which keeps tie constructions honest.
    fn at(lng_hundredths: f64) -> LatLng {
        LatLng::new(0.0, lng_hundredths * 0.01)
    }

    fn create_test_demand(id: &str, kind: ResourceKind, location: LatLng, urgency: f64) -> Demand {
        Demand::new(id, kind, location, urgency)
    }

    fn create_test_resource(
        id: i64,
        kind: ResourceKind,
        location: LatLng,
        capacity: u32,
    ) -> Resource {
        Resource::new(ResourceId::new(id), format!("r-{id}"), kind, location, capacity)
    }

    #[test]
    fn test_no_demands_no_assignments() {
        let resources = vec![create_test_resource(1, ResourceKind::Water, at(0.0), 5)];
        let assignments = allocate(&[], &resources).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_no_resources_no_assignments() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Water, at(0.0), 1.0)];
        let assignments = allocate(&demands, &[]).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_single_obvious_pairing() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Shelter, at(0.0), 1.0)];
        let resources = vec![create_test_resource(1, ResourceKind::Shelter, at(1.0), 5)];
        let assignments = allocate(&demands, &resources).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].demand_id.as_str(), "d-1");
        assert_eq!(assignments[0].resource_id, ResourceId::new(1));
        assert!(assignments[0].cost > 0.0);
    }

    #[test]
    fn test_type_compatibility_is_hard() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Water, at(0.0), 1.0)];
        let resources = vec![create_test_resource(1, ResourceKind::Shelter, at(0.0), 5)];
        let assignments = allocate(&demands, &resources).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_closest_compatible_resource_wins() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Medical, at(0.0), 1.0)];
        let resources = vec![
            create_test_resource(1, ResourceKind::Medical, at(50.0), 5),
            create_test_resource(2, ResourceKind::Medical, at(2.0), 5),
        ];
        let assignments = allocate(&demands, &resources).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].resource_id, ResourceId::new(2));
    }

    #[test]
    fn test_capacity_bounds_assignments() {
        let demands = vec![
            create_test_demand("d-1", ResourceKind::Shelter, at(0.0), 1.0),
            create_test_demand("d-2", ResourceKind::Shelter, at(1.0), 1.0),
            create_test_demand("d-3", ResourceKind::Shelter, at(2.0), 1.0),
        ];
        let mut shelter = create_test_resource(1, ResourceKind::Shelter, at(0.0), 5);
        shelter.current_count = 3; // two units left
        let assignments = allocate(&demands, &[shelter]).unwrap();
        assert_eq!(assignments.len(), 2);
        assert!(assignments
            .iter()
            .all(|a| a.resource_id == ResourceId::new(1)));
    }

    #[test]
    fn test_spillover_to_farther_resource_when_near_one_fills() {
        let demands = vec![
            create_test_demand("d-1", ResourceKind::Shelter, at(0.0), 1.0),
            create_test_demand("d-2", ResourceKind::Shelter, at(0.0), 1.0),
        ];
        let resources = vec![
            create_test_resource(1, ResourceKind::Shelter, at(1.0), 1),
            create_test_resource(2, ResourceKind::Shelter, at(10.0), 1),
        ];
        let assignments = allocate(&demands, &resources).unwrap();
        assert_eq!(assignments.len(), 2);
        let mut resource_ids: Vec<i64> =
            assignments.iter().map(|a| a.resource_id.value()).collect();
        resource_ids.sort_unstable();
        assert_eq!(resource_ids, vec![1, 2]);
    }

    #[test]
    fn test_urgent_demand_wins_contested_resource() {
        // One unit, two demands at the same spot: the urgent one costs
        // less to serve, so it gets the unit.
        let demands = vec![
            create_test_demand("routine", ResourceKind::Medical, at(0.0), 0.3),
            create_test_demand("critical", ResourceKind::Medical, at(0.0), 1.0),
        ];
        let resources = vec![create_test_resource(1, ResourceKind::Medical, at(0.0), 1)];
        let assignments = allocate(&demands, &resources).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].demand_id.as_str(), "critical");
    }

    #[test]
    fn test_lower_load_breaks_distance_ties() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Water, at(0.0), 1.0)];
        let mut busy = create_test_resource(1, ResourceKind::Water, at(5.0), 10);
        busy.current_workload = Some(8);
        let idle = create_test_resource(2, ResourceKind::Water, at(5.0), 10);
        let assignments = allocate(&demands, &[busy, idle]).unwrap();
        assert_eq!(assignments[0].resource_id, ResourceId::new(2));
    }

    #[test]
    fn test_unavailable_resource_is_skipped() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Water, at(0.0), 1.0)];
        let mut down = create_test_resource(1, ResourceKind::Water, at(0.0), 5);
        down.status = ResourceStatus::Unavailable;
        let far = create_test_resource(2, ResourceKind::Water, at(50.0), 5);
        let assignments = allocate(&demands, &[down, far]).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].resource_id, ResourceId::new(2));
    }

    #[test]
    fn test_excess_demand_leaves_some_unmatched() {
        let demands: Vec<Demand> = (0..4)
            .map(|i| {
                create_test_demand(
                    &format!("d-{i}"),
                    ResourceKind::Supplies,
                    at(i as f64),
                    0.6,
                )
            })
            .collect();
        let resources = vec![create_test_resource(1, ResourceKind::Supplies, at(0.0), 2)];
        let assignments = allocate(&demands, &resources).unwrap();
        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn test_assignments_come_back_in_demand_order() {
        let demands = vec![
            create_test_demand("b", ResourceKind::Water, at(0.0), 1.0),
            create_test_demand("a", ResourceKind::Water, at(1.0), 1.0),
            create_test_demand("c", ResourceKind::Water, at(2.0), 1.0),
        ];
        let resources = vec![create_test_resource(1, ResourceKind::Water, at(0.0), 3)];
        let assignments = allocate(&demands, &resources).unwrap();
        let ids: Vec<&str> = assignments.iter().map(|a| a.demand_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_costs_are_never_negative() {
        let demands = vec![
            create_test_demand("d-1", ResourceKind::Water, at(0.0), 1.0),
            create_test_demand("d-2", ResourceKind::Shelter, at(3.0), 0.3),
            create_test_demand("d-3", ResourceKind::Water, at(7.0), 0.6),
        ];
        let resources = vec![
            create_test_resource(1, ResourceKind::Water, at(1.0), 2),
            create_test_resource(2, ResourceKind::Shelter, at(2.0), 1),
        ];
        let assignments = allocate(&demands, &resources).unwrap();
        assert!(!assignments.is_empty());
        assert!(assignments.iter().all(|a| a.cost >= 0.0));
    }

    #[test]
    fn test_equal_total_prefers_smaller_longest_leg() {
        // Collinear on the equator: both resources east of both demands,
        // so both matchings cost the same total while the crossed one
        // has the longer worst leg.
        let demands = vec![
            create_test_demand("d-1", ResourceKind::Shelter, at(0.0), 1.0),
            create_test_demand("d-2", ResourceKind::Shelter, at(2.0), 1.0),
        ];
        let resources = vec![
            create_test_resource(1, ResourceKind::Shelter, at(5.0), 1),
            create_test_resource(2, ResourceKind::Shelter, at(9.0), 1),
        ];
        let assignments = allocate(&demands, &resources).unwrap();
        assert_eq!(assignments.len(), 2);
        // Straight matching: d-1 -> r1 (5 units), d-2 -> r2 (7 units);
        // crossed would be 9 and 3.
        assert_eq!(assignments[0].demand_id.as_str(), "d-1");
        assert_eq!(assignments[0].resource_id, ResourceId::new(1));
        assert_eq!(assignments[1].resource_id, ResourceId::new(2));
    }

    #[test]
    fn test_matches_brute_force_on_small_instances() {
        // Every demand/resource pair compatible, unit capacities; the
        // optimizer total must equal the best permutation total.
        let demands: Vec<Demand> = (0..5)
            .map(|i| {
                create_test_demand(
                    &format!("d-{i}"),
                    ResourceKind::Medical,
                    at((i * 3) as f64),
                    [1.0, 0.6, 0.3, 1.0, 0.6][i],
                )
            })
            .collect();
        let resources: Vec<Resource> = (0..5)
            .map(|i| {
                let mut r =
                    create_test_resource(i as i64, ResourceKind::Medical, at((i * 4 + 1) as f64), 1);
                r.current_workload = Some(0);
                r
            })
            .collect();

        let config = AllocatorConfig::default();
        let assignments = Allocator::with_config(config.clone())
            .allocate(&demands, &resources)
            .unwrap();
        assert_eq!(assignments.len(), 5);
        let total: f64 = assignments.iter().map(|a| a.cost).sum();

        let best = best_permutation_total(&config, &demands, &resources);
        assert!(
            (total - best).abs() < 1e-6,
            "optimizer {total} vs brute force {best}"
        );
    }

    fn best_permutation_total(
        config: &AllocatorConfig,
        demands: &[Demand],
        resources: &[Resource],
    ) -> f64 {
        fn pair(config: &AllocatorConfig, d: &Demand, r: &Resource) -> f64 {
            config.distance_weight * d.location.distance_km(&r.location)
                + config.load_weight * r.load_factor()
                + config.urgency_weight * (1.0 - d.urgency)
        }
        fn walk(
            config: &AllocatorConfig,
            demands: &[Demand],
            resources: &[Resource],
            order: &mut Vec<usize>,
            k: usize,
            best: &mut f64,
        ) {
            if k == order.len() {
                let total: f64 = order
                    .iter()
                    .enumerate()
                    .map(|(d, &r)| pair(config, &demands[d], &resources[r]))
                    .sum();
                if total < *best {
                    *best = total;
                }
                return;
            }
            for i in k..order.len() {
                order.swap(k, i);
                walk(config, demands, resources, order, k + 1, best);
                order.swap(k, i);
            }
        }

        let mut order: Vec<usize> = (0..demands.len()).collect();
        let mut best = f64::INFINITY;
        walk(config, demands, resources, &mut order, 0, &mut best);
        best
    }

    #[test]
    fn test_invalid_urgency_fails_fast() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Water, at(0.0), 0.0)];
        let resources = vec![create_test_resource(1, ResourceKind::Water, at(0.0), 1)];
        match allocate(&demands, &resources) {
            Err(EngineError::InvalidDemand { id, field, .. }) => {
                assert_eq!(id.as_str(), "d-1");
                assert_eq!(field, "urgency");
            }
            other => panic!("expected InvalidDemand, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_location_fails_fast() {
        let demands = vec![create_test_demand(
            "d-1",
            ResourceKind::Water,
            LatLng::new(120.0, 0.0),
            1.0,
        )];
        match allocate(&demands, &[]) {
            Err(EngineError::InvalidDemand { field, .. }) => assert_eq!(field, "location"),
            other => panic!("expected InvalidDemand, got {other:?}"),
        }
    }

    #[test]
    fn test_overfull_resource_fails_fast() {
        let demands = vec![create_test_demand("d-1", ResourceKind::Water, at(0.0), 1.0)];
        let mut resource = create_test_resource(7, ResourceKind::Water, at(0.0), 5);
        resource.current_count = 9;
        match allocate(&demands, &[resource]) {
            Err(EngineError::InvalidResource { id, field, .. }) => {
                assert_eq!(id, ResourceId::new(7));
                assert_eq!(field, "current_count");
            }
            other => panic!("expected InvalidResource, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_clamps_negative_weights() {
        let config = AllocatorConfig::builder()
            .distance_weight(-1.0)
            .load_weight(0.5)
            .build();
        assert_eq!(config.distance_weight, 0.0);
        assert_eq!(config.load_weight, 0.5);
        assert_eq!(config.urgency_weight, 0.3);

        let allocator = Allocator::with_config(config);
        assert_eq!(allocator.config().load_weight, 0.5);
    }
}
