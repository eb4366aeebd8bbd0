//! Cost model and matrix construction for the allocator.

use crate::domain::{Demand, Resource};

use super::AllocatorConfig;

/// Cost of a padding cell (dummy row or column).
///
/// Must dominate every real pair cost so a genuine pairing always beats
/// leaving a demand unserved.
pub(crate) const DUMMY_COST: f64 = 1.0e6;

/// Cost of an incompatible pairing.
///
/// Must dominate any whole matching of dummy cells so the solver never
/// trades a forbidden pairing for unmatched demands. Kept finite: the
/// solver's potential updates subtract cell values.
pub(crate) const FORBIDDEN_COST: f64 = 1.0e12;

/// One unit column of a resource's remaining capacity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    /// Index into the caller's resource slice
    pub resource: usize,
}

/// Expand resources into unit columns.
///
/// A resource contributes one column per unit of remaining capacity,
/// capped at the demand count: extra columns cannot change the optimum,
/// they only grow the matrix. Unusable resources contribute none.
pub(crate) fn expand_slots(resources: &[Resource], demand_count: usize) -> Vec<Slot> {
    let mut slots = Vec::new();
    for (index, resource) in resources.iter().enumerate() {
        if !resource.is_usable() {
            continue;
        }
        let units = (resource.remaining_capacity() as usize).min(demand_count);
        slots.extend(std::iter::repeat(Slot { resource: index }).take(units));
    }
    slots
}

/// Cost of serving `demand` with one unit of `resource`.
///
/// `None` when the resource category cannot serve the demand. Real
/// costs are always finite and non-negative: distance is in kilometers,
/// load is in [0, 1], and the urgency gap rewards urgent demands so
/// they win contested resources.
pub(crate) fn pair_cost(
    config: &AllocatorConfig,
    demand: &Demand,
    resource: &Resource,
) -> Option<f64> {
    if demand.resource_type != resource.resource_type {
        return None;
    }
    let distance = demand.location.distance_km(&resource.location);
    let load = resource.load_factor();
    let urgency_gap = 1.0 - demand.urgency;
    Some(
        config.distance_weight * distance
            + config.load_weight * load
            + config.urgency_weight * urgency_gap,
    )
}

/// Square cost matrix over demands × slots, padded with dummy cells.
pub(crate) fn build_matrix(
    config: &AllocatorConfig,
    demands: &[Demand],
    resources: &[Resource],
    slots: &[Slot],
) -> Vec<Vec<f64>> {
    let n = demands.len().max(slots.len());
    let mut matrix = vec![vec![DUMMY_COST; n]; n];
    for (row, demand) in demands.iter().enumerate() {
        for (col, slot) in slots.iter().enumerate() {
            matrix[row][col] =
                pair_cost(config, demand, &resources[slot.resource]).unwrap_or(FORBIDDEN_COST);
        }
    }
    matrix
}

/// Pair distances in kilometers, same shape as the cost matrix.
///
/// Padding and incompatible cells carry zero; the max-distance
/// tie-break only inspects cells the cost matrix marks as real.
pub(crate) fn build_distance_matrix(
    demands: &[Demand],
    resources: &[Resource],
    slots: &[Slot],
    n: usize,
) -> Vec<Vec<f64>> {
    let mut distances = vec![vec![0.0f64; n]; n];
    for (row, demand) in demands.iter().enumerate() {
        for (col, slot) in slots.iter().enumerate() {
            if demand.resource_type == resources[slot.resource].resource_type {
                distances[row][col] =
                    demand.location.distance_km(&resources[slot.resource].location);
            }
        }
    }
    distances
}
