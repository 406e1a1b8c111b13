//! Age banding with a data-dependent upper edge

use crate::error::{SegmentationError, SegmentationResult};
use std::fmt;

/// Fixed lower edges of the five bands; the last upper edge is the batch's maximum age
const FIXED_EDGES: [i64; 5] = [0, 18, 23, 30, 40];

/// One of the five ordered age bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBand {
    UpTo18,
    From19To23,
    From24To30,
    From31To40,
    From41 { max_age: i64 },
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeBand::UpTo18 => f.write_str("0_18"),
            AgeBand::From19To23 => f.write_str("19_23"),
            AgeBand::From24To30 => f.write_str("24_30"),
            AgeBand::From31To40 => f.write_str("31_40"),
            AgeBand::From41 { max_age } => write!(f, "41_{}", max_age),
        }
    }
}

/// Band edges `[0, 18, 23, 30, 40, max_age]`, right-closed and left-open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBands {
    max_age: i64,
}

impl AgeBands {
    /// Build bands whose top edge is `max_age`
    pub fn new(max_age: i64) -> SegmentationResult<Self> {
        if max_age <= FIXED_EDGES[FIXED_EDGES.len() - 1] {
            return Err(SegmentationError::AgeEdgesNotIncreasing { max_age });
        }
        log::debug!("Age band edges: {:?}", Self { max_age }.edges());
        Ok(Self { max_age })
    }

    /// Build bands from the ages present in a working set
    pub fn from_ages(ages: impl IntoIterator<Item = i64>) -> SegmentationResult<Self> {
        let max_age = ages
            .into_iter()
            .max()
            .ok_or(SegmentationError::EmptyBatch)?;
        Self::new(max_age)
    }

    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    pub fn edges(&self) -> [i64; 6] {
        let [a, b, c, d, e] = FIXED_EDGES;
        [a, b, c, d, e, self.max_age]
    }

    pub fn labels(&self) -> [AgeBand; 5] {
        [
            AgeBand::UpTo18,
            AgeBand::From19To23,
            AgeBand::From24To30,
            AgeBand::From31To40,
            AgeBand::From41 {
                max_age: self.max_age,
            },
        ]
    }

    /// Band containing `age`; edge ages belong to the lower band
    pub fn band(&self, age: i64) -> SegmentationResult<AgeBand> {
        if age <= 0 || age > self.max_age {
            return Err(SegmentationError::AgeOutOfRange {
                age,
                max_age: self.max_age,
            });
        }

        let edges = self.edges();
        let index = edges[1..]
            .iter()
            .position(|&upper| age <= upper)
            .ok_or(SegmentationError::AgeOutOfRange {
                age,
                max_age: self.max_age,
            })?;

        Ok(self.labels()[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_ages() {
        let bands = AgeBands::new(66).unwrap();
        assert_eq!(bands.band(1).unwrap().to_string(), "0_18");
        assert_eq!(bands.band(18).unwrap().to_string(), "0_18");
        assert_eq!(bands.band(19).unwrap().to_string(), "19_23");
        assert_eq!(bands.band(23).unwrap().to_string(), "19_23");
        assert_eq!(bands.band(24).unwrap().to_string(), "24_30");
        assert_eq!(bands.band(30).unwrap().to_string(), "24_30");
        assert_eq!(bands.band(40).unwrap().to_string(), "31_40");
        assert_eq!(bands.band(41).unwrap().to_string(), "41_66");
        assert_eq!(bands.band(66).unwrap().to_string(), "41_66");
    }

    #[test]
    fn test_top_label_tracks_max_age() {
        let bands = AgeBands::from_ages([20, 59, 33]).unwrap();
        assert_eq!(bands.max_age(), 59);
        assert_eq!(bands.edges(), [0, 18, 23, 30, 40, 59]);
        assert_eq!(bands.band(59).unwrap().to_string(), "41_59");
    }

    #[test]
    fn test_out_of_range() {
        let bands = AgeBands::new(66).unwrap();
        assert!(matches!(
            bands.band(0),
            Err(SegmentationError::AgeOutOfRange { age: 0, max_age: 66 })
        ));
        assert!(bands.band(-3).is_err());
        assert!(matches!(
            bands.band(67),
            Err(SegmentationError::AgeOutOfRange { age: 67, .. })
        ));
    }

    #[test]
    fn test_edges_must_increase() {
        assert!(matches!(
            AgeBands::new(40),
            Err(SegmentationError::AgeEdgesNotIncreasing { max_age: 40 })
        ));
        assert!(AgeBands::new(41).is_ok());
        assert!(matches!(
            AgeBands::from_ages(std::iter::empty()),
            Err(SegmentationError::EmptyBatch)
        ));
    }
}
