//! Transaction loading, catalog export and exploratory summaries using Polars

use crate::banding::AgeBands;
use crate::catalog::PersonaCatalog;
use crate::error::{SegmentationError, SegmentationResult};
use crate::types::{Country, Platform, Sex, TransactionRecord};
use polars::prelude::*;
use std::path::PathBuf;
use std::str::FromStr;

/// Load the transaction table (PRICE, SOURCE, SEX, COUNTRY, AGE)
///
/// Any row with a missing field, an unknown attribute, a non-positive or
/// non-numeric price, or a fractional age rejects the whole batch.
pub fn load_transactions(file_path: &str) -> SegmentationResult<Vec<TransactionRecord>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()?;

    let records = records_from_frame(&df)?;
    log::info!("Loaded {} transactions from {}", records.len(), file_path);
    Ok(records)
}

/// Convert a transaction DataFrame into typed records
pub fn records_from_frame(df: &DataFrame) -> SegmentationResult<Vec<TransactionRecord>> {
    let prices = price_values(df)?;
    let ages = age_values(df)?;
    let sources = typed_column(df, "SOURCE", &DataType::String)?;
    let sexes = typed_column(df, "SEX", &DataType::String)?;
    let countries = typed_column(df, "COUNTRY", &DataType::String)?;

    let sources = sources.str()?;
    let sexes = sexes.str()?;
    let countries = countries.str()?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let row = i + 1;

        let price = prices[i].ok_or_else(|| malformed(row, "missing PRICE"))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(malformed(row, &format!("PRICE must be positive, got {}", price)));
        }

        let age = ages[i].ok_or_else(|| malformed(row, "missing AGE"))?;

        records.push(TransactionRecord {
            price,
            platform: parse_attribute::<Platform>(sources.get(i), "SOURCE", row)?,
            sex: parse_attribute::<Sex>(sexes.get(i), "SEX", row)?,
            country: parse_attribute::<Country>(countries.get(i), "COUNTRY", row)?,
            age,
        });
    }

    Ok(records)
}

fn require_column<'a>(df: &'a DataFrame, name: &str) -> SegmentationResult<&'a Series> {
    df.column(name)
        .map_err(|_| malformed(0, &format!("missing column {}", name)))
}

fn typed_column(df: &DataFrame, name: &str, dtype: &DataType) -> SegmentationResult<Series> {
    Ok(require_column(df, name)?.cast(dtype)?)
}

/// PRICE values; text that does not parse as a number rejects its row
fn price_values(df: &DataFrame) -> SegmentationResult<Vec<Option<f64>>> {
    let series = require_column(df, "PRICE")?;
    if series.dtype().is_numeric() {
        let prices = series.cast(&DataType::Float64)?;
        return Ok(prices.f64()?.into_iter().collect());
    }

    let raw = series.cast(&DataType::String)?;
    let values: SegmentationResult<Vec<Option<_>>> = raw
        .str()?
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            value
                .map(|text| {
                    text.trim().parse::<f64>().map_err(|_| {
                        malformed(i + 1, &format!("PRICE must be numeric, got '{}'", text))
                    })
                })
                .transpose()
        })
        .collect();
    values
}

/// AGE values; fractional or non-numeric ages reject their row
fn age_values(df: &DataFrame) -> SegmentationResult<Vec<Option<i64>>> {
    let series = require_column(df, "AGE")?;
    if series.dtype().is_integer() {
        let ages = series.cast(&DataType::Int64)?;
        return Ok(ages.i64()?.into_iter().collect());
    }

    if series.dtype().is_float() {
        let ages = series.cast(&DataType::Float64)?;
        return ages
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                value
                    .map(|age| {
                        if age.is_finite() && age.fract() == 0.0 {
                            Ok(age as i64)
                        } else {
                            Err(malformed(
                                i + 1,
                                &format!("AGE must be an integer, got {}", age),
                            ))
                        }
                    })
                    .transpose()
            })
            .collect();
    }

    let raw = series.cast(&DataType::String)?;
    let values: SegmentationResult<Vec<Option<_>>> = raw
        .str()?
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            value
                .map(|text| {
                    text.trim().parse::<i64>().map_err(|_| {
                        malformed(i + 1, &format!("AGE must be an integer, got '{}'", text))
                    })
                })
                .transpose()
        })
        .collect();
    values
}

fn parse_attribute<T>(value: Option<&str>, column: &str, row: usize) -> SegmentationResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.ok_or_else(|| malformed(row, &format!("missing {}", column)))?;
    value
        .parse::<T>()
        .map_err(|e| malformed(row, &format!("{}: {}", column, e)))
}

fn malformed(row: usize, reason: &str) -> SegmentationError {
    SegmentationError::MalformedRecord {
        row,
        reason: reason.to_string(),
    }
}

/// Catalog as a DataFrame with columns customers_level_based, PRICE, SEGMENT
pub fn catalog_frame(catalog: &PersonaCatalog) -> SegmentationResult<DataFrame> {
    let keys: Vec<&str> = catalog.personas().map(|p| p.key.as_str()).collect();
    let prices: Vec<f64> = catalog.personas().map(|p| p.mean_price).collect();
    let segments: Vec<&str> = catalog.personas().map(|p| p.segment.label()).collect();

    let df = df!(
        "customers_level_based" => keys,
        "PRICE" => prices,
        "SEGMENT" => segments
    )?;
    Ok(df)
}

/// Write the catalog to CSV with two-decimal prices
pub fn write_catalog(catalog: &PersonaCatalog, output_path: &str) -> SegmentationResult<()> {
    let mut df = catalog_frame(catalog)?;
    let mut file = std::fs::File::create(output_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_float_precision(Some(2))
        .finish(&mut df)?;

    log::info!("Wrote {} personas to {}", catalog.len(), output_path);
    Ok(())
}

/// Descriptive tables over the raw transactions
#[derive(Debug)]
pub struct ExploratoryOverview {
    pub records: usize,
    pub price_points: Vec<f64>,
    pub by_country: DataFrame,
    pub by_platform: DataFrame,
    pub by_country_platform: DataFrame,
    pub by_age_band: DataFrame,
}

/// Sales, revenue and mean price per country, platform, country and platform, and age band
pub fn exploratory_overview(
    records: &[TransactionRecord],
) -> SegmentationResult<ExploratoryOverview> {
    let bands = AgeBands::from_ages(records.iter().map(|r| r.age))?;
    let age_bands = records
        .iter()
        .map(|r| bands.band(r.age).map(|band| band.to_string()))
        .collect::<SegmentationResult<Vec<String>>>()?;

    let df = df!(
        "PRICE" => records.iter().map(|r| r.price).collect::<Vec<f64>>(),
        "SOURCE" => records.iter().map(|r| r.platform.code()).collect::<Vec<&str>>(),
        "SEX" => records.iter().map(|r| r.sex.code()).collect::<Vec<&str>>(),
        "COUNTRY" => records.iter().map(|r| r.country.code()).collect::<Vec<&str>>(),
        "AGE" => records.iter().map(|r| r.age).collect::<Vec<i64>>(),
        "AGE_BAND" => age_bands
    )?;

    let mut price_points: Vec<f64> = records.iter().map(|r| r.price).collect();
    price_points.sort_by(|a, b| a.total_cmp(b));
    price_points.dedup();

    let by_revenue = SortMultipleOptions::default().with_order_descending(true);

    Ok(ExploratoryOverview {
        records: records.len(),
        price_points,
        by_country: price_summary(&df, &["COUNTRY"])
            .sort(["revenue"], by_revenue.clone())
            .collect()?,
        by_platform: price_summary(&df, &["SOURCE"])
            .sort(["revenue"], by_revenue)
            .collect()?,
        by_country_platform: price_summary(&df, &["COUNTRY", "SOURCE"])
            .sort(["COUNTRY", "SOURCE"], SortMultipleOptions::default())
            .collect()?,
        by_age_band: price_summary(&df, &["AGE_BAND"])
            .sort(
                ["mean_price"],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .collect()?,
    })
}

fn price_summary(df: &DataFrame, keys: &[&str]) -> LazyFrame {
    df.clone()
        .lazy()
        .group_by(keys.iter().map(|&k| col(k)).collect::<Vec<_>>())
        .agg([
            col("PRICE").count().alias("sales"),
            col("PRICE").sum().alias("revenue"),
            col("PRICE").mean().alias("mean_price"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PRICE,SOURCE,SEX,COUNTRY,AGE").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_transactions() {
        let file = create_test_csv(&[
            "39,android,male,bra,17",
            "49,ios,female,tur,33",
            "29.5,android,female,usa,66",
        ]);
        let records = load_transactions(file.path().to_str().unwrap()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].price, 39.0);
        assert_eq!(records[1].platform, Platform::Ios);
        assert_eq!(records[1].country, Country::Tur);
        assert_eq!(records[2].sex, Sex::Female);
        assert_eq!(records[2].age, 66);
    }

    #[test]
    fn test_unknown_country_rejects_batch() {
        let file = create_test_csv(&["39,android,male,bra,17", "49,ios,female,gbr,33"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_missing_price_rejects_batch() {
        let file = create_test_csv(&["39,android,male,bra,17", ",ios,female,tur,33"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_fractional_age_rejects_batch() {
        let file = create_test_csv(&["30,android,male,usa,18.9", "30,android,male,usa,45"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_whole_float_age_accepted() {
        let file = create_test_csv(&["30,android,male,usa,18.0", "30,android,male,usa,45.0"]);
        let records = load_transactions(file.path().to_str().unwrap()).unwrap();
        assert_eq!(records[0].age, 18);
        assert_eq!(records[1].age, 45);
    }

    #[test]
    fn test_non_numeric_age_rejects_batch() {
        let file = create_test_csv(&["30,android,male,usa,45", "30,ios,female,tur,twenty"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_non_positive_price_rejects_batch() {
        let file = create_test_csv(&["39,android,male,bra,17", "0,ios,female,tur,33"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 2, .. })
        ));

        let file = create_test_csv(&["-9,android,male,bra,17", "39,ios,female,tur,33"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_nan_price_rejects_batch() {
        let file = create_test_csv(&["39.5,android,male,bra,17", "NaN,ios,female,tur,33"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_non_numeric_price_rejects_batch() {
        let file = create_test_csv(&["39,android,male,bra,17", "cheap,ios,female,tur,33"]);
        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PRICE,SOURCE,SEX,COUNTRY").unwrap();
        writeln!(file, "39,android,male,bra").unwrap();

        let result = load_transactions(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(SegmentationError::MalformedRecord { row: 0, .. })
        ));
    }

    #[test]
    fn test_exploratory_overview() {
        let file = create_test_csv(&[
            "39,android,male,bra,17",
            "49,ios,female,tur,45",
            "29,android,female,usa,20",
            "29,ios,male,usa,20",
        ]);
        let records = load_transactions(file.path().to_str().unwrap()).unwrap();
        let overview = exploratory_overview(&records).unwrap();

        assert_eq!(overview.records, 4);
        assert_eq!(overview.price_points, vec![29.0, 39.0, 49.0]);
        assert_eq!(overview.by_country.height(), 3);
        assert_eq!(overview.by_platform.height(), 2);
        assert_eq!(overview.by_country_platform.height(), 4);
        assert_eq!(overview.by_age_band.height(), 3);
    }
}
