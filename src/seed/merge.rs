use std::collections::HashMap;

use super::{DistanceMetric, FragmentImpact, Seed, ID_BIT_WIDTH, ID_MASK};
use crate::error::{Result, SeedError};

/// Largest merge counter that still fits above the base id.
const MAX_SUB_ID: u32 = u32::MAX >> ID_BIT_WIDTH;

/// Attaches each seed to its nearest fragment.
///
/// A seed merged into fragment `f` gets the id `f | (k << ID_BIT_WIDTH)`,
/// where `k` counts the seeds merged into `f` so far (starting at 1). Ties
/// go to the fragment listed first.
pub struct MergeSeeds {
    metric: DistanceMetric,
}

impl MergeSeeds {
    /// Creates a new `MergeSeeds` operation.
    #[must_use]
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    /// Executes the merge, relabeling `seeds` in place.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::NoFragments`] if seeds are given but no
    /// fragments, and [`SeedError::InvalidParameter`] if a fragment id does
    /// not fit in [`ID_BIT_WIDTH`] bits or a fragment receives more seeds
    /// than the counter can hold.
    pub fn execute(&self, fragments: &[FragmentImpact], seeds: &mut [Seed]) -> Result<()> {
        if seeds.is_empty() {
            return Ok(());
        }
        if fragments.is_empty() {
            return Err(SeedError::NoFragments.into());
        }
        if let Some(bad) = fragments.iter().find(|f| f.id > ID_MASK) {
            return Err(SeedError::InvalidParameter(format!(
                "fragment id {} exceeds {ID_BIT_WIDTH} bits",
                bad.id
            ))
            .into());
        }

        let mut counters: HashMap<u32, u32> = HashMap::new();
        for seed in seeds.iter_mut() {
            let nearest = self.nearest(fragments, *seed);
            let counter = counters.entry(nearest.id).or_insert(0);
            if *counter == MAX_SUB_ID {
                return Err(SeedError::InvalidParameter(format!(
                    "fragment {} received more than {MAX_SUB_ID} seeds",
                    nearest.id
                ))
                .into());
            }
            *counter += 1;
            seed.id = nearest.id | (*counter << ID_BIT_WIDTH);
        }
        Ok(())
    }

    /// First fragment at minimum distance from `seed`. `fragments` must not
    /// be empty.
    fn nearest(&self, fragments: &[FragmentImpact], seed: Seed) -> FragmentImpact {
        let mut best = fragments[0];
        let mut best_distance = f64::INFINITY;
        for fragment in fragments {
            let distance = self.metric.distance(seed.coord, fragment.coord);
            if distance < best_distance {
                best_distance = distance;
                best = *fragment;
            }
        }
        best
    }
}
