//! Command-line interface definitions and argument parsing

use crate::types::{Country, Platform, Sex};
use clap::Parser;

/// Rule-based customer persona segmentation and revenue prediction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the transaction CSV file (PRICE,SOURCE,SEX,COUNTRY,AGE)
    #[arg(short, long, default_value = "persona.csv")]
    pub input: String,

    /// Output path for the persona catalog CSV
    #[arg(short, long, default_value = "customer_segments.csv")]
    pub output: String,

    /// Prediction mode: provide country,platform,sex,age as comma-separated string
    /// Example: --predict "tur,android,female,33"
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Optional output path for an SVG chart of persona prices by segment
    #[arg(short, long)]
    pub chart: Option<String>,

    /// Print exploratory summaries of the raw transactions
    #[arg(long)]
    pub eda: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Customer descriptor to predict revenue for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaQuery {
    pub country: Country,
    pub platform: Platform,
    pub sex: Sex,
    pub age: i64,
}

impl Args {
    /// Parse the customer descriptor from the predict string
    /// Expected format: "country,platform,sex,age"
    pub fn parse_query(&self) -> crate::Result<Option<PersonaQuery>> {
        if let Some(ref predict_str) = self.predict {
            let parts: Vec<&str> = predict_str.split(',').collect();
            if parts.len() != 4 {
                anyhow::bail!("Predict values must be in format 'country,platform,sex,age'");
            }

            let country: Country = parts[0].parse()?;
            let platform: Platform = parts[1].parse()?;
            let sex: Sex = parts[2].parse()?;
            let age: i64 = parts[3]
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid age value: {}", parts[3]))?;

            Ok(Some(PersonaQuery {
                country,
                platform,
                sex,
                age,
            }))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let mut args = Args {
            input: "persona.csv".to_string(),
            output: "out.csv".to_string(),
            predict: Some("tur,android,female,33".to_string()),
            chart: None,
            eda: false,
            verbose: false,
        };

        let result = args.parse_query().unwrap();
        assert_eq!(
            result,
            Some(PersonaQuery {
                country: Country::Tur,
                platform: Platform::Android,
                sex: Sex::Female,
                age: 33,
            })
        );

        args.predict = Some("FRA, ios, female, 35".to_string());
        let result = args.parse_query().unwrap().unwrap();
        assert_eq!(result.country, Country::Fra);
        assert_eq!(result.age, 35);

        args.predict = None;
        assert_eq!(args.parse_query().unwrap(), None);

        args.predict = Some("tur,android,female".to_string());
        assert!(args.parse_query().is_err());

        args.predict = Some("gbr,android,female,33".to_string());
        assert!(args.parse_query().is_err());

        args.predict = Some("tur,android,female,old".to_string());
        assert!(args.parse_query().is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["personaforge"]);
        assert_eq!(args.input, "persona.csv");
        assert_eq!(args.output, "customer_segments.csv");
        assert!(args.predict.is_none());
        assert!(!args.eda);
    }
}
