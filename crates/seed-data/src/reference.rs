//! Static reference tables read from CSV before generation starts.

use std::io::Read;
use std::path::Path;

use dating::models::PaymentCycle;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::SeedError;

#[derive(Debug, Clone, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub iso_code: String,
    pub population: i64,
    #[serde(default)]
    pub locale: Option<String>,
}

/// A sex, its frequency among users, and how strongly it attracts users of
/// each preference bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct SexRecord {
    pub name: String,
    pub frequency: f64,
    /// Keys the bucket this sex's own users draw preferences from.
    pub preference_code: i32,
    pub affinity_low: f64,
    pub affinity_mid: f64,
    pub affinity_high: f64,
}

impl SexRecord {
    /// Weight of this sex as a preference of a user whose own sex has `preference_code`.
    pub fn affinity_for(&self, preference_code: i32) -> f64 {
        if preference_code > 3 {
            self.affinity_high
        } else if preference_code < -3 {
            self.affinity_low
        } else {
            self.affinity_mid
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterestRecord {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRecord {
    pub name: String,
    pub price: f64,
    pub payment_cycle: PaymentCycle,
    pub benefits: String,
    /// Relative popularity, used as the sampling weight.
    pub users: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportReason {
    pub reason: String,
    pub frequency: f64,
}

/// All reference tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub countries: Vec<CountryRecord>,
    pub sexes: Vec<SexRecord>,
    pub interests: Vec<InterestRecord>,
    pub plans: Vec<PlanRecord>,
    pub report_reasons: Vec<ReportReason>,
}

impl ReferenceData {
    /// Reads every table from `dir`.
    pub fn load(dir: &Path) -> Result<Self, SeedError> {
        info!("Loading reference data from {}", dir.display());

        let data = Self {
            countries: read_file(&dir.join("countries.csv"))?,
            sexes: read_file(&dir.join("sexes.csv"))?,
            interests: read_file(&dir.join("interests.csv"))?,
            plans: read_file(&dir.join("plans.csv"))?,
            report_reasons: read_file(&dir.join("report_reasons.csv"))?,
        };

        info!(
            "Loaded {} countries, {} sexes, {} interests, {} plans, {} report reasons",
            data.countries.len(),
            data.sexes.len(),
            data.interests.len(),
            data.plans.len(),
            data.report_reasons.len()
        );
        Ok(data)
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeedError> {
    let file = std::fs::File::open(path)?;
    read_records(file)
}

/// Parses a headed CSV table into records.
pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, SeedError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_countries_with_optional_locale() {
        let csv = "name,iso_code,population,locale\n\
                   France,FR,68000000,fr_FR\n\
                   Iceland,IS,380000,\n";
        let countries: Vec<CountryRecord> = read_records(csv.as_bytes()).unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].locale.as_deref(), Some("fr_FR"));
        assert_eq!(countries[1].locale, None);
        assert_eq!(countries[1].population, 380_000);
    }

    #[test]
    fn test_read_plans() {
        let csv = "name,price,payment_cycle,benefits,users\n\
                   Gold, 9.99, Monthly, Unlimited likes, 30\n";
        let plans: Vec<PlanRecord> = read_records(csv.as_bytes()).unwrap();
        assert_eq!(plans[0].payment_cycle, PaymentCycle::Monthly);
        assert_eq!(plans[0].benefits, "Unlimited likes");
    }

    #[test]
    fn test_bad_row_is_an_error() {
        let csv = "name,price,payment_cycle,benefits,users\nGold,cheap,Monthly,x,1\n";
        let result: Result<Vec<PlanRecord>, _> = read_records(csv.as_bytes());
        assert!(matches!(result, Err(SeedError::Csv(_))));
    }

    #[test]
    fn test_affinity_buckets() {
        let sex = SexRecord {
            name: "Female".into(),
            frequency: 50.0,
            preference_code: 0,
            affinity_low: 1.0,
            affinity_mid: 2.0,
            affinity_high: 3.0,
        };
        assert_eq!(sex.affinity_for(-4), 1.0);
        assert_eq!(sex.affinity_for(-3), 2.0);
        assert_eq!(sex.affinity_for(3), 2.0);
        assert_eq!(sex.affinity_for(4), 3.0);
    }

    #[test]
    fn test_load_shipped_tables() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let data = ReferenceData::load(&dir).unwrap();
        assert!(!data.countries.is_empty());
        assert!(!data.sexes.is_empty());
        assert!(!data.interests.is_empty());
        assert!(!data.plans.is_empty());
        assert!(!data.report_reasons.is_empty());
    }
}
