use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// A calendar month without day or time resolution.
///
/// The textual form is always `MM-YYYY` (e.g. `07-2024`), and that is also
/// how the type appears in JSON. Ordering is chronological: year first,
/// then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDate {
    year: i32,
    month: u32,
}

impl MonthDate {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of this month, as stored in the `DATE` column.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month is validated on construction")
    }
}

impl From<NaiveDate> for MonthDate {
    // Day-of-month precision is dropped here; only (year, month) survive.
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for MonthDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || AppError::ValidationError(format!("invalid month '{s}', expected MM-YYYY"));

        let (mm, yyyy) = s.split_once('-').ok_or_else(invalid)?;
        if mm.len() != 2
            || yyyy.len() != 4
            || !mm.bytes().all(|b| b.is_ascii_digit())
            || !yyyy.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let month: u32 = mm.parse().map_err(|_| invalid())?;
        let year: i32 = yyyy.parse().map_err(|_| invalid())?;

        MonthDate::new(year, month).ok_or_else(|| {
            AppError::ValidationError(format!("month out of range in '{s}', expected 01-12"))
        })
    }
}

impl Serialize for MonthDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl<'s> utoipa::ToSchema<'s> for MonthDate {
    fn schema() -> (
        &'s str,
        utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
    ) {
        (
            "MonthDate",
            utoipa::openapi::ObjectBuilder::new()
                .schema_type(utoipa::openapi::SchemaType::String)
                .description(Some("Calendar month in MM-YYYY form"))
                .example(Some(serde_json::json!("07-2024")))
                .into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_round_trip() {
        for text in ["01-2024", "07-2024", "12-1999", "06-0001"] {
            let month: MonthDate = text.parse().unwrap();
            assert_eq!(month.to_string(), text);
        }
    }

    #[test]
    fn test_parse_valid() {
        let month: MonthDate = "07-2024".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 7);
    }

    #[test]
    fn test_parse_rejects_month_out_of_range() {
        assert!("00-2024".parse::<MonthDate>().is_err());
        assert!("13-2024".parse::<MonthDate>().is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!("2024-07".parse::<MonthDate>().is_err());
        assert!("7-2024".parse::<MonthDate>().is_err());
        assert!("07/2024".parse::<MonthDate>().is_err());
        assert!("07-24".parse::<MonthDate>().is_err());
        assert!("07-20245".parse::<MonthDate>().is_err());
        assert!("ab-2024".parse::<MonthDate>().is_err());
        assert!("07-abcd".parse::<MonthDate>().is_err());
        assert!("+7-2024".parse::<MonthDate>().is_err());
        assert!("".parse::<MonthDate>().is_err());
        assert!("07-2024 ".parse::<MonthDate>().is_err());
    }

    #[test]
    fn test_chronological_ordering() {
        let jan: MonthDate = "01-2024".parse().unwrap();
        let jul: MonthDate = "07-2024".parse().unwrap();
        let dec_prev: MonthDate = "12-2023".parse().unwrap();

        assert!(jan < jul);
        assert!(dec_prev < jan);
        assert_eq!(jan, "01-2024".parse::<MonthDate>().unwrap());
    }

    #[test]
    fn test_json_round_trip() {
        let month: MonthDate = "07-2024".parse().unwrap();
        let encoded = serde_json::to_string(&month).unwrap();
        assert_eq!(encoded, "\"07-2024\"");

        let decoded: MonthDate = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, month);

        assert!(serde_json::from_str::<MonthDate>("\"13-2024\"").is_err());
    }

    #[test]
    fn test_naive_date_conversion_truncates_day() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 19).unwrap();
        let month = MonthDate::from(date);
        assert_eq!(month.to_string(), "07-2024");
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }
}
