mod halton;

pub use halton::HaltonSequence;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Strategy used to draw seed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RandomMode {
    /// Independent uniform draws.
    #[default]
    Uniform,
    /// Deterministic Halton sequence, one prime base per axis.
    Halton,
    /// Normal distribution (mean 0.5, deviation 0.25) clamped to `[0, 1]`.
    Normal,
}

/// Mean of the normal strategy in unit space.
pub const NORMAL_MEAN: f64 = 0.5;

/// Standard deviation of the normal strategy in unit space.
pub const NORMAL_STD_DEV: f64 = 0.25;

#[derive(Debug, Clone)]
enum Strategy {
    Uniform,
    Halton(HaltonSequence),
    Normal { spare: Option<f64> },
}

/// Random number source owned by a single fracture job.
///
/// Every draw is addressed by `(index, axis)`. The Halton strategy maps that
/// pair to a fixed sequence value; the uniform and normal strategies ignore
/// it and consume the job's own generator instead.
#[derive(Debug, Clone)]
pub struct RandomSource {
    strategy: Strategy,
    rng: StdRng,
}

impl RandomSource {
    /// Creates a source seeded from `seed`, or from OS entropy when `None`.
    #[must_use]
    pub fn new(mode: RandomMode, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::with_rng(mode, rng)
    }

    /// Creates a source around an existing generator.
    #[must_use]
    pub fn with_rng(mode: RandomMode, rng: StdRng) -> Self {
        let strategy = match mode {
            RandomMode::Uniform => Strategy::Uniform,
            RandomMode::Halton => Strategy::Halton(HaltonSequence::new(3)),
            RandomMode::Normal => Strategy::Normal { spare: None },
        };
        Self { strategy, rng }
    }

    /// The strategy this source draws with.
    #[must_use]
    pub fn mode(&self) -> RandomMode {
        match self.strategy {
            Strategy::Uniform => RandomMode::Uniform,
            Strategy::Halton(_) => RandomMode::Halton,
            Strategy::Normal { .. } => RandomMode::Normal,
        }
    }

    /// Underlying generator, for draws that are not addressed by
    /// `(index, axis)`.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Prepares the strategy for a batch of about `size_hint` points.
    ///
    /// Halton points are addressed directly by index, so the hint only
    /// shows up in the trace; its per-axis tables are built once and
    /// reused. The normal strategy drops any cached deviate.
    pub fn init(&mut self, size_hint: usize) {
        trace!(mode = ?self.mode(), size_hint, "random source reset");
        if let Strategy::Normal { spare } = &mut self.strategy {
            *spare = None;
        }
    }

    /// Draws a float in `[min, max)`.
    pub fn next_float(&mut self, min: f64, max: f64, index: u64, axis: usize) -> f64 {
        self.unit(index, axis) * (max - min) + min
    }

    /// Draws an integer in `[min, max)`. Returns `min` when the range is
    /// empty.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn next_int(&mut self, min: i64, max: i64, index: u64, axis: usize) -> i64 {
        if max <= min {
            return min;
        }
        if matches!(self.strategy, Strategy::Uniform) {
            return self.rng.gen_range(min..max);
        }
        let value = min + (self.unit(index, axis) * (max - min) as f64).floor() as i64;
        value.clamp(min, max - 1)
    }

    /// Draws an integer in `[min, max)` whose spread around the midpoint is
    /// shaped by `strength`: values above `1` pull draws toward the midpoint,
    /// values below `1` push them toward the ends, and `1` is uniform.
    ///
    /// Always uses the job's generator, regardless of strategy.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn biased_int(&mut self, min: i64, max: i64, strength: f64) -> i64 {
        if max <= min {
            return min;
        }
        let u: f64 = self.rng.gen_range(-1.0..1.0);
        let t = u.signum() * u.abs().powf(strength);
        let mid = (min + max) as f64 * 0.5;
        let half = (max - min) as f64 * 0.5;
        let value = (mid + t * half).floor() as i64;
        value.clamp(min, max - 1)
    }

    /// Re-initialises the source and fills a noise buffer of `count` floats
    /// in `[0, 1)`, drawn in pairs from axes 0 and 1 of index `i / 2`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn float_noise(&mut self, max_buffer_size: usize, count: usize) -> Vec<f32> {
        self.init(max_buffer_size);
        let mut noise = Vec::with_capacity(count + 1);
        for pair in 0..count.div_ceil(2) as u64 {
            noise.push(self.next_float(0.0, 1.0, pair, 0) as f32);
            noise.push(self.next_float(0.0, 1.0, pair, 1) as f32);
        }
        noise.truncate(count);
        noise
    }

    /// Unit-interval value for `(index, axis)` under the active strategy.
    fn unit(&mut self, index: u64, axis: usize) -> f64 {
        match &mut self.strategy {
            Strategy::Uniform => self.rng.gen(),
            Strategy::Halton(halton) => halton.sample(axis, index),
            Strategy::Normal { spare } => {
                let z = match spare.take() {
                    Some(z) => z,
                    None => {
                        let (z0, z1) = box_muller(&mut self.rng);
                        *spare = Some(z1);
                        z0
                    }
                };
                (NORMAL_MEAN + NORMAL_STD_DEV * z).clamp(0.0, 1.0)
            }
        }
    }
}

/// Two independent standard normal deviates.
fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    // 1 - gen() lies in (0, 1], keeping ln() finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = std::f64::consts::TAU * u2;
    (radius * theta.cos(), radius * theta.sin())
}
