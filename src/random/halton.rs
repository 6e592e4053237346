/// Faure-scrambled Halton sequence.
///
/// Dimension `d` uses the `d`-th prime as its base, with the digits of the
/// radical inverse permuted by the Faure permutation of that base.
#[derive(Debug, Clone, Default)]
pub struct HaltonSequence {
    permutations: Vec<Vec<u32>>,
}

impl HaltonSequence {
    /// Creates a sequence with tables for the first `dimensions` dimensions.
    /// Further dimensions are built on first use.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        let mut sequence = Self::default();
        sequence.reserve_dimensions(dimensions);
        sequence
    }

    /// Number of dimensions with a ready permutation table.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.permutations.len()
    }

    /// Value of the `index`-th point along `dimension`, in `[0, 1)`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn sample(&mut self, dimension: usize, index: u64) -> f64 {
        self.reserve_dimensions(dimension + 1);
        let perm = &self.permutations[dimension];
        let base = perm.len() as u64;

        let inv_base = 1.0 / base as f64;
        let mut factor = inv_base;
        let mut value = 0.0;
        let mut i = index;
        while i > 0 {
            value += f64::from(perm[(i % base) as usize]) * factor;
            i /= base;
            factor *= inv_base;
        }
        value
    }

    fn reserve_dimensions(&mut self, dimensions: usize) {
        while self.permutations.len() < dimensions {
            let base = nth_prime(self.permutations.len());
            self.permutations.push(faure_permutation(base));
        }
    }
}

/// The `n`-th prime, zero based.
fn nth_prime(n: usize) -> u32 {
    (2_u32..)
        .filter(|&c| (2_u32..).take_while(|d| d * d <= c).all(|d| c % d != 0))
        .nth(n)
        .unwrap_or(2)
}

/// Faure's digit permutation for base `base`.
///
/// Even bases double the permutation of `base / 2`; odd bases take the
/// permutation of `base - 1`, shift values from the middle up by one and
/// insert the middle value at the center.
fn faure_permutation(base: u32) -> Vec<u32> {
    match base {
        0 | 1 => vec![0],
        2 => vec![0, 1],
        b if b % 2 == 0 => {
            let half = faure_permutation(b / 2);
            half.iter()
                .map(|&v| 2 * v)
                .chain(half.iter().map(|&v| 2 * v + 1))
                .collect()
        }
        b => {
            let c = (b - 1) / 2;
            let mut perm: Vec<u32> = faure_permutation(b - 1)
                .into_iter()
                .map(|v| if v >= c { v + 1 } else { v })
                .collect();
            perm.insert(c as usize, c);
            perm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn primes_in_order() {
        let primes: Vec<u32> = (0..6).map(nth_prime).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13]);
    }

    #[test]
    fn faure_permutations_are_permutations() {
        assert_eq!(faure_permutation(3), vec![0, 1, 2]);
        assert_eq!(faure_permutation(4), vec![0, 2, 1, 3]);
        assert_eq!(faure_permutation(5), vec![0, 3, 2, 1, 4]);
        for base in [7, 11, 13] {
            let mut perm = faure_permutation(base);
            assert_eq!(perm[0], 0);
            perm.sort_unstable();
            assert_eq!(perm, (0..base).collect::<Vec<_>>());
        }
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn base_two_is_van_der_corput() {
        let mut halton = HaltonSequence::new(1);
        let expected = [0.0, 0.5, 0.25, 0.75, 0.125, 0.625];
        for (index, &e) in expected.iter().enumerate() {
            assert_relative_eq!(halton.sample(0, index as u64), e);
        }
    }

    #[test]
    fn dimensions_grow_on_demand() {
        let mut halton = HaltonSequence::new(3);
        assert_eq!(halton.dimensions(), 3);
        let v = halton.sample(5, 17);
        assert!((0.0..1.0).contains(&v));
        assert_eq!(halton.dimensions(), 6);
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn first_points_are_well_spread() {
        let mut halton = HaltonSequence::new(2);
        let mut buckets = [0_u32; 4];
        for index in 1..=64 {
            let v = halton.sample(1, index);
            buckets[(v * 4.0) as usize] += 1;
        }
        assert!(buckets.iter().all(|&b| (14..=18).contains(&b)), "{buckets:?}");
    }
}
