//! Random draws over finite populations.
//!
//! All generators go through these helpers so that empty populations and
//! zero-weight tables fail the same way everywhere.

use rand::Rng;

use crate::error::SeedError;

/// Weights for how many sexes a search preference lists (index = count).
pub const PREFERRED_SEX_COUNT_WEIGHTS: [f64; 6] = [5.0, 80.0, 20.0, 10.0, 5.0, 2.0];

/// Selects one element with equal probability.
pub fn uniform_choice<'a, T>(
    rng: &mut impl Rng,
    population: &'a [T],
    label: &'static str,
) -> Result<&'a T, SeedError> {
    if population.is_empty() {
        return Err(SeedError::EmptyPopulation(label));
    }
    Ok(&population[rng.gen_range(0..population.len())])
}

/// Selects one element with probability proportional to `weight`.
///
/// Non-positive weights are never selected. Fails if the population is empty
/// or carries no positive weight.
pub fn weighted_choice<'a, T>(
    rng: &mut impl Rng,
    population: &'a [T],
    weight: impl Fn(&T) -> f64,
    label: &'static str,
) -> Result<&'a T, SeedError> {
    let index = weighted_index(rng, population.iter().map(&weight), label)?;
    Ok(&population[index])
}

/// Index form of [`weighted_choice`], for weight tables without labels.
pub fn weighted_index(
    rng: &mut impl Rng,
    weights: impl IntoIterator<Item = f64>,
    label: &'static str,
) -> Result<usize, SeedError> {
    let weights: Vec<f64> = weights
        .into_iter()
        .map(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return Err(SeedError::EmptyPopulation(label));
    }

    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = i;
        if cumulative > draw {
            return Ok(i);
        }
    }

    // Float rounding can leave the draw a hair above the running sum.
    Ok(last_positive)
}

/// Uniform integer in `[min, max]`; `min` when the range is empty.
pub fn int_range(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// True with probability `threshold / 100`.
pub fn percent_under(rng: &mut impl Rng, threshold: f64) -> bool {
    rng.gen_range(0.0..100.0) < threshold
}

/// Discrete, bell-shaped distribution over `0..=2 * peak`.
///
/// The weight of `i` is `height - falloff * (i - peak)^2`.
#[derive(Debug, Clone, Copy)]
pub struct BellCurve {
    pub peak: u32,
    pub falloff: f64,
    pub height: f64,
}

impl BellCurve {
    /// Number of interests on a profile, and number of photos.
    pub const INTEREST_COUNT: BellCurve = BellCurve {
        peak: 10,
        falloff: 0.15,
        height: 20.0,
    };

    /// Number of interests in a search preference.
    pub const PREFERENCE_INTEREST_COUNT: BellCurve = BellCurve {
        peak: 5,
        falloff: 0.6,
        height: 20.0,
    };

    pub fn weights(&self) -> Vec<f64> {
        (0..=2 * self.peak)
            .map(|i| {
                let d = f64::from(i) - f64::from(self.peak);
                self.height - self.falloff * d * d
            })
            .collect()
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Result<usize, SeedError> {
        weighted_index(rng, self.weights(), "bell curve")
    }
}
