//! Transaction records and the demographic attributes they carry

use std::fmt;
use std::str::FromStr;

/// Country of the purchasing customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Country {
    Bra,
    Can,
    Deu,
    Fra,
    Tur,
    Usa,
}

/// Device platform the purchase was made on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Android,
    Ios,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Female,
    Male,
}

impl Country {
    pub const ALL: [Country; 6] = [
        Country::Bra,
        Country::Can,
        Country::Deu,
        Country::Fra,
        Country::Tur,
        Country::Usa,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Country::Bra => "bra",
            Country::Can => "can",
            Country::Deu => "deu",
            Country::Fra => "fra",
            Country::Tur => "tur",
            Country::Usa => "usa",
        }
    }
}

impl Platform {
    pub fn code(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl Sex {
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

/// Unknown value for one of the enumerated attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute {
    pub attribute: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.attribute, self.value)
    }
}

impl std::error::Error for UnknownAttribute {}

fn unknown(attribute: &'static str, value: &str) -> UnknownAttribute {
    UnknownAttribute {
        attribute,
        value: value.to_string(),
    }
}

impl FromStr for Country {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bra" => Ok(Country::Bra),
            "can" => Ok(Country::Can),
            "deu" => Ok(Country::Deu),
            "fra" => Ok(Country::Fra),
            "tur" => Ok(Country::Tur),
            "usa" => Ok(Country::Usa),
            _ => Err(unknown("country", s)),
        }
    }
}

impl FromStr for Platform {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            _ => Err(unknown("platform", s)),
        }
    }
}

impl FromStr for Sex {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            _ => Err(unknown("sex", s)),
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single purchase as read from the transaction table
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub price: f64,
    pub platform: Platform,
    pub sex: Sex,
    pub country: Country,
    pub age: i64,
}

impl TransactionRecord {
    pub fn group_key(&self) -> DemographicGroupKey {
        DemographicGroupKey {
            country: self.country,
            platform: self.platform,
            sex: self.sex,
            age: self.age,
        }
    }
}

/// Exact (country, platform, sex, age) tuple used by the first aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DemographicGroupKey {
    pub country: Country,
    pub platform: Platform,
    pub sex: Sex,
    pub age: i64,
}
