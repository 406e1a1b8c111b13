//! Persona catalog built from a full transaction batch, and the prediction lookup

use crate::aggregate::aggregate_by_demographics;
use crate::banding::AgeBands;
use crate::error::{SegmentationError, SegmentationResult};
use crate::persona::{deduplicate, PersonaKey};
use crate::segment::{segment_personas, summarize, QuartileCuts, Segment, SegmentSummary};
use crate::types::{Country, Platform, Sex, TransactionRecord};
use std::collections::BTreeMap;

/// Final catalog row
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub key: PersonaKey,
    pub mean_price: f64,
    pub segment: Segment,
}

/// Immutable mapping from persona key to predicted revenue and tier
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaCatalog {
    personas: BTreeMap<PersonaKey, Persona>,
    bands: AgeBands,
    cuts: QuartileCuts,
}

impl PersonaCatalog {
    /// Run aggregation, banding, deduplication and segmentation over the batch
    pub fn build(records: &[TransactionRecord]) -> SegmentationResult<Self> {
        if records.is_empty() {
            return Err(SegmentationError::EmptyBatch);
        }

        let groups = aggregate_by_demographics(records);
        let bands = AgeBands::from_ages(groups.keys().map(|group| group.age))?;
        let prices = deduplicate(&groups, &bands)?;
        let (cuts, segments) = segment_personas(&prices)?;

        let personas = prices
            .into_iter()
            .filter_map(|(key, mean_price)| {
                let segment = *segments.get(&key)?;
                Some((
                    key.clone(),
                    Persona {
                        key,
                        mean_price,
                        segment,
                    },
                ))
            })
            .collect();

        Ok(Self {
            personas,
            bands,
            cuts,
        })
    }

    /// Exact-match lookup; `None` when the persona never occurred in the batch
    pub fn lookup(&self, key: &PersonaKey) -> Option<&Persona> {
        self.personas.get(key)
    }

    /// Key a new customer maps to, banded against this catalog's maximum age
    pub fn key_for(
        &self,
        country: Country,
        platform: Platform,
        sex: Sex,
        age: i64,
    ) -> SegmentationResult<PersonaKey> {
        let band = self.bands.band(age)?;
        Ok(PersonaKey::build(country, platform, sex, &band))
    }

    /// Predicted revenue and tier for a customer descriptor
    ///
    /// An age outside the catalog's banded range is an error; a descriptor
    /// whose persona is absent from the catalog yields `Ok(None)`.
    pub fn predict(
        &self,
        country: Country,
        platform: Platform,
        sex: Sex,
        age: i64,
    ) -> SegmentationResult<Option<&Persona>> {
        let key = self.key_for(country, platform, sex, age)?;
        let found = self.lookup(&key);
        if found.is_none() {
            log::debug!("Persona {} not present in catalog", key);
        }
        Ok(found)
    }

    /// Personas ordered by key
    pub fn personas(&self) -> impl Iterator<Item = &Persona> {
        self.personas.values()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn bands(&self) -> &AgeBands {
        &self.bands
    }

    pub fn cuts(&self) -> &QuartileCuts {
        &self.cuts
    }

    pub fn segment_summaries(&self) -> Vec<SegmentSummary> {
        summarize(self.personas().map(|p| (p.segment, p.mean_price)))
    }

    pub fn in_segment(&self, segment: Segment) -> impl Iterator<Item = &Persona> {
        self.personas().filter(move |p| p.segment == segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: f64, country: Country, sex: Sex, age: i64) -> TransactionRecord {
        TransactionRecord {
            price,
            platform: Platform::Android,
            sex,
            country,
            age,
        }
    }

    fn sample_records() -> Vec<TransactionRecord> {
        vec![
            record(30.0, Country::Usa, Sex::Male, 20),
            record(30.0, Country::Usa, Sex::Male, 20),
            record(40.0, Country::Usa, Sex::Male, 22),
            record(19.0, Country::Bra, Sex::Female, 17),
            record(49.0, Country::Tur, Sex::Female, 33),
            record(59.0, Country::Deu, Sex::Male, 45),
            record(9.0, Country::Fra, Sex::Male, 27),
            record(39.0, Country::Can, Sex::Female, 52),
        ]
    }

    #[test]
    fn test_build_catalog() {
        let catalog = PersonaCatalog::build(&sample_records()).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.bands().max_age(), 52);

        let usa = catalog
            .lookup(&PersonaKey::from_raw("USA_ANDROID_MALE_19_23"))
            .unwrap();
        assert_eq!(usa.mean_price, 35.0);

        let deu = catalog
            .lookup(&PersonaKey::from_raw("DEU_ANDROID_MALE_41_52"))
            .unwrap();
        assert_eq!(deu.segment, Segment::A);

        let fra = catalog
            .lookup(&PersonaKey::from_raw("FRA_ANDROID_MALE_24_30"))
            .unwrap();
        assert_eq!(fra.segment, Segment::D);
    }

    #[test]
    fn test_predict() {
        let catalog = PersonaCatalog::build(&sample_records()).unwrap();

        let found = catalog
            .predict(Country::Tur, Platform::Android, Sex::Female, 38)
            .unwrap()
            .unwrap();
        assert_eq!(found.key.as_str(), "TUR_ANDROID_FEMALE_31_40");
        assert_eq!(found.mean_price, 49.0);

        let missing = catalog
            .predict(Country::Tur, Platform::Ios, Sex::Female, 38)
            .unwrap();
        assert!(missing.is_none());

        assert!(matches!(
            catalog.predict(Country::Tur, Platform::Android, Sex::Female, 70),
            Err(SegmentationError::AgeOutOfRange { age: 70, max_age: 52 })
        ));
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(
            PersonaCatalog::build(&[]),
            Err(SegmentationError::EmptyBatch)
        ));
    }

    #[test]
    fn test_segment_summaries_cover_catalog() {
        let catalog = PersonaCatalog::build(&sample_records()).unwrap();
        let summaries = catalog.segment_summaries();
        assert_eq!(summaries.len(), 4);
        assert_eq!(
            summaries.iter().map(|s| s.count).sum::<usize>(),
            catalog.len()
        );
        assert_eq!(catalog.in_segment(Segment::A).count(), summaries[0].count);
    }
}
