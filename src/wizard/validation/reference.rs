//! Externally supplied reference data: the country eligibility allow-list.
//!
//! Ships with a built-in default list and can be replaced from an operator
//! CSV export (`country` column, one row per eligible country).

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

/// Countries whose natives are eligible for the current lottery year. Not
/// exhaustive; deployments load the year's official list from CSV.
const DEFAULT_ELIGIBLE_COUNTRIES: &[&str] = &[
    "Algeria",
    "Angola",
    "Benin",
    "Botswana",
    "Burkina Faso",
    "Burundi",
    "Cameroon",
    "Chad",
    "Democratic Republic of the Congo",
    "Djibouti",
    "Egypt",
    "Eritrea",
    "Ethiopia",
    "Gabon",
    "Gambia",
    "Ghana",
    "Guinea",
    "Ivory Coast",
    "Kenya",
    "Lesotho",
    "Liberia",
    "Libya",
    "Madagascar",
    "Malawi",
    "Mali",
    "Mauritania",
    "Morocco",
    "Mozambique",
    "Namibia",
    "Niger",
    "Rwanda",
    "Senegal",
    "Sierra Leone",
    "Somalia",
    "South Africa",
    "South Sudan",
    "Sudan",
    "Tanzania",
    "Togo",
    "Tunisia",
    "Uganda",
    "Zambia",
    "Zimbabwe",
];

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("failed to read country list: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed country list: {0}")]
    Csv(#[from] csv::Error),
    #[error("country list is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    #[serde(rename = "country")]
    country: String,
}

/// Reference data consumed by the business-rule validator.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    eligible_countries: BTreeSet<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            eligible_countries: DEFAULT_ELIGIBLE_COUNTRIES
                .iter()
                .map(|name| normalize(name))
                .collect(),
        }
    }
}

impl ReferenceData {
    pub fn from_countries<I, S>(countries: I) -> Result<Self, ReferenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let eligible_countries: BTreeSet<String> = countries
            .into_iter()
            .map(|name| normalize(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        if eligible_countries.is_empty() {
            return Err(ReferenceError::Empty);
        }
        Ok(Self { eligible_countries })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ReferenceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut countries = Vec::new();
        for record in csv_reader.deserialize::<CountryRow>() {
            countries.push(record?.country);
        }
        Self::from_countries(countries)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Case- and whitespace-insensitive eligibility lookup.
    pub fn is_eligible_country(&self, country: &str) -> bool {
        self.eligible_countries.contains(&normalize(country))
    }

    pub fn eligible_country_count(&self) -> usize {
        self.eligible_countries.len()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_matches_case_insensitively() {
        let reference = ReferenceData::default();
        assert!(reference.is_eligible_country("Ethiopia"));
        assert!(reference.is_eligible_country("  eThIoPiA  "));
        assert!(!reference.is_eligible_country("Atlantis"));
    }

    #[test]
    fn loads_operator_csv() {
        let csv = "country\nEthiopia\nKenya\n";
        let reference = ReferenceData::from_csv_reader(csv.as_bytes()).expect("parses");
        assert_eq!(reference.eligible_country_count(), 2);
        assert!(reference.is_eligible_country("kenya"));
        assert!(!reference.is_eligible_country("Sudan"));
    }

    #[test]
    fn rejects_empty_list() {
        let csv = "country\n";
        assert!(matches!(
            ReferenceData::from_csv_reader(csv.as_bytes()),
            Err(ReferenceError::Empty)
        ));
    }
}
