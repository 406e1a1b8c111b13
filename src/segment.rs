//! Quartile-based revenue tiers over persona mean prices

use crate::error::{SegmentationError, SegmentationResult};
use crate::persona::PersonaKey;
use ndarray::Array1;
use std::collections::BTreeMap;
use std::fmt;

/// Revenue tier; ordered D < C < B < A
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    D,
    C,
    B,
    A,
}

impl Segment {
    /// Tiers from highest to lowest revenue
    pub const DESCENDING: [Segment; 4] = [Segment::A, Segment::B, Segment::C, Segment::D];

    pub fn label(&self) -> &'static str {
        match self {
            Segment::A => "A",
            Segment::B => "B",
            Segment::C => "C",
            Segment::D => "D",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Segment::A => "Premium customer! Offer VIP treatment and exclusive features.",
            Segment::B => "High-value customer! Use upselling campaigns to move to Segment A.",
            Segment::C => "Mid-value customer! Focus on engagement with value packages.",
            Segment::D => "Budget customer! Offer discounts and volume deals.",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum, quartile cut points and maximum of the persona price distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuartileCuts {
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl QuartileCuts {
    /// Compute cut points with linear interpolation between order statistics
    ///
    /// Fails with `DegenerateDistribution` when there are fewer than four
    /// distinct prices or when two cut points coincide.
    pub fn from_prices(prices: &[f64]) -> SegmentationResult<Self> {
        let mut sorted = prices.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let distinct = count_distinct(&sorted);
        let degenerate = SegmentationError::DegenerateDistribution {
            distinct,
            personas: prices.len(),
        };
        if distinct < 4 {
            return Err(degenerate);
        }

        let values = Array1::from_vec(sorted);
        let cuts = Self {
            min: quantile(&values, 0.0),
            q25: quantile(&values, 0.25),
            q50: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: quantile(&values, 1.0),
        };

        let edges = cuts.edges();
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(degenerate);
        }

        log::debug!("Quartile edges: {:?}", edges);
        Ok(cuts)
    }

    pub fn edges(&self) -> [f64; 5] {
        [self.min, self.q25, self.q50, self.q75, self.max]
    }

    /// Tier of a price: D = `[min, q25]`, C = `(q25, q50]`, B = `(q50, q75]`, A = above q75
    pub fn classify(&self, price: f64) -> Segment {
        if price <= self.q25 {
            Segment::D
        } else if price <= self.q50 {
            Segment::C
        } else if price <= self.q75 {
            Segment::B
        } else {
            Segment::A
        }
    }
}

fn count_distinct(sorted: &[f64]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    1 + sorted.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

/// Quantile of sorted values at fraction `p`, interpolating linearly
fn quantile(sorted: &Array1<f64>, p: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * p;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    let a = sorted[lower];
    let b = sorted[upper];
    let diff = b - a;
    // Interpolate from the nearer end, as numpy does
    if weight >= 0.5 {
        b - diff * (1.0 - weight)
    } else {
        a + diff * weight
    }
}

/// Assign every persona to a revenue tier
///
/// Every tier must end up non-empty; otherwise the distribution is degenerate.
pub fn segment_personas(
    personas: &BTreeMap<PersonaKey, f64>,
) -> SegmentationResult<(QuartileCuts, BTreeMap<PersonaKey, Segment>)> {
    let prices: Vec<f64> = personas.values().copied().collect();
    let cuts = QuartileCuts::from_prices(&prices)?;

    let segments: BTreeMap<_, _> = personas
        .iter()
        .map(|(key, &price)| (key.clone(), cuts.classify(price)))
        .collect();

    let mut counts = [0usize; 4];
    for segment in segments.values() {
        counts[*segment as usize] += 1;
    }
    if counts.contains(&0) {
        return Err(SegmentationError::DegenerateDistribution {
            distinct: count_distinct(&sorted_copy(&prices)),
            personas: prices.len(),
        });
    }

    log::info!(
        "Segmented {} personas: D={} C={} B={} A={}",
        segments.len(),
        counts[0],
        counts[1],
        counts[2],
        counts[3]
    );

    Ok((cuts, segments))
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Descriptive statistics of the persona prices in one tier
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; NaN for a single persona
    pub std: f64,
}

/// Summaries for each non-empty tier, highest tier first
pub fn summarize(rows: impl IntoIterator<Item = (Segment, f64)>) -> Vec<SegmentSummary> {
    let mut by_segment: BTreeMap<Segment, Vec<f64>> = BTreeMap::new();
    for (segment, price) in rows {
        by_segment.entry(segment).or_default().push(price);
    }

    Segment::DESCENDING
        .iter()
        .filter_map(|segment| {
            let prices = by_segment.remove(segment)?;
            let values = Array1::from_vec(prices);
            Some(SegmentSummary {
                segment: *segment,
                count: values.len(),
                mean: values.mean()?,
                min: values.fold(f64::INFINITY, |a, &b| a.min(b)),
                max: values.fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
                std: values.std(1.0),
            })
        })
        .collect()
}
