//! Persona keys and the second-stage (mean-of-means) deduplication

use crate::aggregate::compensated_mean;
use crate::banding::{AgeBand, AgeBands};
use crate::error::SegmentationResult;
use crate::types::{Country, DemographicGroupKey, Platform, Sex};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical `COUNTRY_PLATFORM_SEX_AGEBAND` identifier of a persona
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonaKey(String);

impl PersonaKey {
    /// Upper-case each component and join them with `_`
    pub fn build(country: Country, platform: Platform, sex: Sex, band: &AgeBand) -> Self {
        let parts = [
            country.code().to_string(),
            platform.code().to_string(),
            sex.code().to_string(),
            band.to_string(),
        ];
        let key = parts
            .iter()
            .map(|part| part.to_uppercase())
            .collect::<Vec<_>>()
            .join("_");
        PersonaKey(key)
    }

    /// Wrap an already-formatted key, e.g. one typed by a user
    pub fn from_raw(key: impl Into<String>) -> Self {
        PersonaKey(key.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of the persona a demographic group falls into
pub fn key_for_group(key: &DemographicGroupKey, bands: &AgeBands) -> SegmentationResult<PersonaKey> {
    let band = bands.band(key.age)?;
    Ok(PersonaKey::build(key.country, key.platform, key.sex, &band))
}

/// Collapse demographic groups sharing a persona key into one mean price
///
/// The persona price is the unweighted mean of its groups' mean prices; the
/// number of transactions behind each group does not enter the average.
pub fn deduplicate(
    groups: &BTreeMap<DemographicGroupKey, f64>,
    bands: &AgeBands,
) -> SegmentationResult<BTreeMap<PersonaKey, f64>> {
    let mut collected: BTreeMap<PersonaKey, Vec<f64>> = BTreeMap::new();

    for (group, &mean_price) in groups {
        let key = key_for_group(group, bands)?;
        collected.entry(key).or_default().push(mean_price);
    }

    let personas: BTreeMap<_, _> = collected
        .into_iter()
        .map(|(key, means)| {
            let mean = compensated_mean(&means);
            (key, mean)
        })
        .collect();

    log::info!(
        "Deduplicated {} demographic groups into {} personas",
        groups.len(),
        personas.len()
    );

    Ok(personas)
}
