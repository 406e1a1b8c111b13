//! First-stage aggregation: mean price per exact demographic tuple

use crate::types::{DemographicGroupKey, TransactionRecord};
use std::collections::BTreeMap;

/// Mean price of every distinct (country, platform, sex, age) tuple in the batch
///
/// Groups holding a single record yield that record's price. The returned map
/// is ordered by country, platform, sex and age.
pub fn aggregate_by_demographics(
    records: &[TransactionRecord],
) -> BTreeMap<DemographicGroupKey, f64> {
    let mut prices: BTreeMap<DemographicGroupKey, Vec<f64>> = BTreeMap::new();

    for record in records {
        prices.entry(record.group_key()).or_default().push(record.price);
    }

    let groups: BTreeMap<_, _> = prices
        .into_iter()
        .map(|(key, values)| (key, compensated_mean(&values)))
        .collect();

    log::info!(
        "Aggregated {} records into {} demographic groups",
        records.len(),
        groups.len()
    );

    groups
}

/// Arithmetic mean using Kahan-compensated summation in input order
///
/// Matches pandas' grouped mean, so fractional group means agree to the last bit.
pub fn compensated_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &value in values {
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum / values.len() as f64
}
