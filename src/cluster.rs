//! Capacity-bounded partitioning of pickups.
//!
//! This is plain chunking, not centroid-based clustering: pickups are put in
//! a stable priority order and cut into consecutive groups of at most
//! `max_cluster_size`. Nothing here looks at distances, so clusters can be
//! spatially loose. Fewer pickups than the limit simply yield one cluster.

use crate::error::{Error, Result};
use crate::model::PickupLocation;

/// An ordered group of pickups routed together.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<'a> {
    pub index: usize,
    pub pickups: Vec<&'a PickupLocation>,
}

impl Cluster<'_> {
    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }
}

/// Splits `pickups` into clusters of at most `max_cluster_size`.
///
/// Ordering is by ascending priority (lower is more urgent), keeping input
/// order among equal priorities.
pub fn cluster_pickups(
    pickups: &[PickupLocation],
    max_cluster_size: usize,
) -> Result<Vec<Cluster<'_>>> {
    if max_cluster_size == 0 {
        return Err(Error::invalid_input("max cluster size must be at least 1"));
    }

    let mut ordered: Vec<&PickupLocation> = pickups.iter().collect();
    ordered.sort_by_key(|pickup| pickup.priority);

    Ok(ordered
        .chunks(max_cluster_size)
        .enumerate()
        .map(|(index, chunk)| Cluster {
            index,
            pickups: chunk.to_vec(),
        })
        .collect())
}
