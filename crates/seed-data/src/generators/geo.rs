//! City generation for reference countries.

use std::collections::HashSet;

use fake::Fake;
use fake::faker::address::en::CityName;
use rand::Rng;

/// Configuration for city generation.
#[derive(Debug, Clone)]
pub struct CityGenConfig {
    /// Redraws allowed per city before accepting a duplicate name.
    pub max_name_attempts: usize,
}

impl Default for CityGenConfig {
    fn default() -> Self {
        Self {
            max_name_attempts: 50,
        }
    }
}

/// Fabricates city names, a number per country scaled to its population.
pub struct CityGenerator {
    config: CityGenConfig,
}

impl CityGenerator {
    pub fn new() -> Self {
        Self {
            config: CityGenConfig::default(),
        }
    }

    pub fn with_config(config: CityGenConfig) -> Self {
        Self { config }
    }

    /// `max(1, floor(10 * log10(population)))`.
    pub fn city_count(population: i64) -> usize {
        if population <= 1 {
            return 1;
        }
        let count = (10.0 * (population as f64).log10()).floor() as usize;
        count.max(1)
    }

    /// Names for every city of a country with `population` inhabitants.
    ///
    /// Names are unique within the country unless the faker keeps repeating
    /// itself, in which case a numbered variant is used.
    pub fn generate(&self, population: i64, rng: &mut impl Rng) -> Vec<String> {
        let count = Self::city_count(population);
        let mut seen = HashSet::with_capacity(count);
        let mut names = Vec::with_capacity(count);

        for _ in 0..count {
            let mut name: String = CityName().fake_with_rng(rng);
            let mut attempts = 1;
            while seen.contains(&name) && attempts < self.config.max_name_attempts {
                name = CityName().fake_with_rng(rng);
                attempts += 1;
            }
            if seen.contains(&name) {
                name = format!("{} {}", name, names.len() + 1);
            }
            seen.insert(name.clone());
            names.push(name);
        }

        names
    }
}

impl Default for CityGenerator {
    fn default() -> Self {
        Self::new()
    }
}
