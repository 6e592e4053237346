use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, trace, warn};

use super::{DistanceMetric, FragmentImpact, Seed, DEFAULT_MAX_ATTEMPTS};
use crate::error::{Result, SeedError};
use crate::grid::{VoxelCoord, VoxelGrid, VOXEL_FREE};
use crate::random::RandomSource;

/// Scatters new seeds around existing fragment impacts.
///
/// `num_seeds` is split at random among `num_impacts` impacts picked from
/// the existing list; the last impact visited takes whatever budget is
/// left. Around each impact, candidates are drawn with a per-axis biased
/// offset (wrapping around the grid) and accepted when they lie within half
/// the smallest grid dimension of the impact, are occupied, unused and on
/// the boundary.
pub struct NearSeeds {
    num_impacts: usize,
    num_seeds: usize,
    spreading: f64,
    neighborhood: u32,
    max_attempts: u32,
}

impl NearSeeds {
    /// Creates a new `NearSeeds` search.
    ///
    /// `spreading` is the bias strength of the offsets: larger values keep
    /// seeds closer to their impact.
    #[must_use]
    pub fn new(num_impacts: usize, num_seeds: usize, spreading: f64) -> Self {
        Self {
            num_impacts,
            num_seeds,
            spreading,
            neighborhood: 1,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the Chebyshev radius used by the boundary test.
    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: u32) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    /// Sets the number of candidate draws allowed per impact.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Executes the search, returning `impacts` followed by the new seeds.
    ///
    /// New seeds are numbered after the largest id among `impacts`, in
    /// coordinate order.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::NoFragments`] if `impacts` is empty,
    /// [`SeedError::InvalidParameter`] for a non-positive `spreading`, a
    /// zero impact count with seeds requested or new ids that would not fit
    /// in a `u32`, and
    /// [`SeedError::NearSearchExhausted`] if an impact runs out of attempts.
    pub fn execute(
        &self,
        grid: &VoxelGrid,
        impacts: &[FragmentImpact],
        random: &mut RandomSource,
    ) -> Result<Vec<Seed>> {
        if impacts.is_empty() {
            return Err(SeedError::NoFragments.into());
        }
        if !(self.spreading.is_finite() && self.spreading > 0.0) {
            return Err(SeedError::InvalidParameter(format!(
                "spreading must be positive, got {}",
                self.spreading
            ))
            .into());
        }
        if self.num_impacts == 0 && self.num_seeds > 0 {
            return Err(SeedError::InvalidParameter(
                "at least one impact is needed to place near seeds".into(),
            )
            .into());
        }

        let max_id = impacts.iter().map(|f| f.id).max().unwrap_or(u32::from(VOXEL_FREE));
        let first_id = max_id.saturating_add(1);
        let last_id = u32::try_from(self.num_seeds)
            .ok()
            .and_then(|n| max_id.checked_add(n))
            .ok_or_else(|| {
                SeedError::InvalidParameter(format!(
                    "{} near seeds do not fit after impact id {max_id}",
                    self.num_seeds
                ))
            })?;

        let divs = grid.subdivisions();
        let max_distance = f64::from(divs.iter().copied().min().unwrap_or(0) / 2);

        let mut used: BTreeSet<VoxelCoord> = impacts.iter().map(|f| f.coord).collect();
        let mut seeds = BTreeSet::new();
        let mut pending = self.num_seeds;

        for visit in 0..self.num_impacts {
            if pending == 0 {
                break;
            }

            let impact = impacts[random.rng().gen_range(0..impacts.len())];
            let budget = if visit + 1 == self.num_impacts {
                pending
            } else {
                random.rng().gen_range(1..=pending)
            };
            trace!(impact = impact.id, budget, "placing near seeds");

            let mut found = 0;
            let mut attempts: u32 = 0;
            while found < budget {
                if attempts == self.max_attempts {
                    warn!(
                        impact = impact.id,
                        max_attempts = self.max_attempts,
                        found,
                        requested = budget,
                        "near seed search exhausted"
                    );
                    return Err(SeedError::NearSearchExhausted {
                        max_attempts: self.max_attempts,
                        impact: impact.id,
                        found,
                        requested: budget,
                    }
                    .into());
                }
                attempts += 1;

                let coord = self.draw_around(random, impact.coord, divs);
                if DistanceMetric::Euclidean.distance(impact.coord, coord) > max_distance {
                    continue;
                }

                let [x, y, z] = coord.to_signed();
                if grid.is_occupied(x, y, z)
                    && !used.contains(&coord)
                    && grid.is_boundary(x, y, z, self.neighborhood)
                {
                    used.insert(coord);
                    seeds.insert(coord);
                    found += 1;
                }
            }

            pending -= budget;
        }

        debug!(impacts = impacts.len(), seeds = seeds.len(), "near seed search done");

        let mut result = impacts.to_vec();
        result.extend(
            seeds
                .into_iter()
                .zip(first_id..=last_id)
                .map(|(coord, id)| Seed::new(coord, id)),
        );
        Ok(result)
    }

    /// Candidate voxel offset from `anchor` by a biased amount per axis,
    /// wrapped into the grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_around(
        &self,
        random: &mut RandomSource,
        anchor: VoxelCoord,
        divs: [u32; 3],
    ) -> VoxelCoord {
        let anchor = anchor.to_signed();
        let mut axis = |i: usize| {
            let n = i64::from(divs[i]);
            let offset = n / 2 - random.biased_int(0, n, self.spreading);
            // rem_euclid keeps the result in [0, n), which fits the u32 axis.
            (anchor[i] + offset).rem_euclid(n) as u32
        };
        let x = axis(0);
        let y = axis(1);
        let z = axis(2);
        VoxelCoord::new(x, y, z)
    }
}
