//! Defines a _trigger_, the year/month message exchanged between the
//! scheduler and the ingestion handler, and the remote file it
//! refers to.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Matches a four-digit year.
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));

/// Matches a zero-padded month, 01 through 12.
static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])$").expect("valid month regex"));

/// The message published by the scheduler and consumed by the
/// ingestion handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMessage {
    pub year: String,
    pub month: String,
}

/// A trigger message as received. A field is `None` only when it is
/// absent; any value present, `null` included, is kept as given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PartialTrigger {
    #[serde(default, deserialize_with = "present")]
    pub year: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub month: Option<Value>,
}

/// Deserializes a field that appears in the input, keeping `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The text of a received field, or the default when it is absent.
/// Values that aren't strings come back as their JSON rendering, in
/// the error position.
fn field_text(value: Option<Value>, default: &str) -> Result<String, String> {
    match value {
        None => Ok(default.to_string()),
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(other.to_string()),
    }
}

/// A year/month pair that isn't a 4-digit year and a 01-12 month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDate {
    pub year: String,
    pub month: String,
}

impl TriggerMessage {
    /// Builds the message naming the month of the given date.
    pub fn for_date(date: NaiveDate) -> Self {
        TriggerMessage {
            year: format!("{:04}", date.year()),
            month: format!("{:02}", date.month()),
        }
    }

    /// Fills in absent fields with the given defaults, then checks
    /// the result is a well-formed year and month given as strings.
    pub fn resolve(
        partial: PartialTrigger,
        default_year: &str,
        default_month: &str,
    ) -> Result<Self, InvalidDate> {
        match (
            field_text(partial.year, default_year),
            field_text(partial.month, default_month),
        ) {
            (Ok(year), Ok(month)) if YEAR_RE.is_match(&year) && MONTH_RE.is_match(&month) => {
                Ok(TriggerMessage { year, month })
            }
            (year, month) => Err(InvalidDate {
                year: year.unwrap_or_else(|text| text),
                month: month.unwrap_or_else(|text| text),
            }),
        }
    }

    /// The remote file this message asks to ingest.
    pub fn remote_file(&self) -> RemoteFile {
        RemoteFile {
            file_name: format!("yellow_tripdata_{}-{}.parquet", self.year, self.month),
        }
    }
}

/// A reference to the monthly file, from which its download URL and
/// storage key are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFile {
    pub file_name: String,
}

impl RemoteFile {
    /// The download URL under the given base.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file_name)
    }

    /// The object key under the given prefix.
    pub fn object_key(&self, key_prefix: &str) -> String {
        let prefix = key_prefix.trim_matches('/');
        if prefix.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", prefix, self.file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(year: Option<&str>, month: Option<&str>) -> PartialTrigger {
        PartialTrigger {
            year: year.map(|text| Value::String(text.to_string())),
            month: month.map(|text| Value::String(text.to_string())),
        }
    }

    #[test]
    fn month_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let message = TriggerMessage::for_date(date);
        assert_eq!(message.year, "2025");
        assert_eq!(message.month, "07");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"year": "2025", "month": "07"})
        );
    }

    #[test]
    fn absent_fields_take_defaults() {
        let message = TriggerMessage::resolve(partial(None, None), "2025", "01").unwrap();
        assert_eq!(
            message.remote_file().file_name,
            "yellow_tripdata_2025-01.parquet"
        );

        let message = TriggerMessage::resolve(partial(Some("2023"), None), "2025", "01").unwrap();
        assert_eq!(message.year, "2023");
        assert_eq!(message.month, "01");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for (year, month) in [
            ("25", "01"),
            ("2024", "1"),
            ("2024", "13"),
            ("2024", "00"),
            ("abcd", "03"),
            ("2024", "../x"),
        ] {
            let result = TriggerMessage::resolve(partial(Some(year), Some(month)), "2025", "01");
            assert_eq!(
                result,
                Err(InvalidDate {
                    year: year.to_string(),
                    month: month.to_string()
                })
            );
        }
    }

    #[test]
    fn non_string_fields_are_rejected() {
        let received: PartialTrigger = serde_json::from_str(r#"{"year": 2024, "month": 3}"#).unwrap();
        assert_eq!(
            TriggerMessage::resolve(received, "2025", "01"),
            Err(InvalidDate {
                year: String::from("2024"),
                month: String::from("3")
            })
        );

        let received: PartialTrigger = serde_json::from_str(r#"{"year": null}"#).unwrap();
        assert_eq!(received.year, Some(Value::Null));
        assert_eq!(received.month, None);
        assert_eq!(
            TriggerMessage::resolve(received, "2025", "01"),
            Err(InvalidDate {
                year: String::from("null"),
                month: String::from("01")
            })
        );
    }

    #[test]
    fn names_are_derived_from_year_and_month() {
        let message = TriggerMessage {
            year: String::from("2024"),
            month: String::from("03"),
        };
        let file = message.remote_file();
        assert_eq!(
            file.url("https://d37ci6vzurychx.cloudfront.net/trip-data/"),
            "https://d37ci6vzurychx.cloudfront.net/trip-data/yellow_tripdata_2024-03.parquet"
        );
        assert_eq!(
            file.object_key("nyc-taxi-datalake-project/raw"),
            "nyc-taxi-datalake-project/raw/yellow_tripdata_2024-03.parquet"
        );
        assert_eq!(file.object_key(""), "yellow_tripdata_2024-03.parquet");
    }
}
