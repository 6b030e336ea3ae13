//! Raw extraction data and its classification

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::normalize::parse_timestamp_ms;
use crate::Error;

/// Treat an explicit `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Author fields read from the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAuthor {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(deserialize_with = "nullable")]
    pub avatar: String,
    #[serde(deserialize_with = "nullable")]
    pub uid: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

/// A video element: playable source plus optional poster frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVideo {
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    pub cover: Option<String>,
}

/// Output of the in-page extraction script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    #[serde(deserialize_with = "nullable")]
    pub text: String,
    #[serde(deserialize_with = "nullable")]
    pub timestamp: String,
    #[serde(deserialize_with = "nullable")]
    pub author: RawAuthor,
    #[serde(deserialize_with = "nullable")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub videos: Vec<RawVideo>,
}

/// Non-fatal problem found while normalizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizationWarning {
    /// The page carried no timestamp
    MissingTimestamp,
    /// The timestamp could not be parsed
    MalformedTimestamp(String),
}

impl fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationWarning::MissingTimestamp => write!(f, "missing timestamp, using 0"),
            NormalizationWarning::MalformedTimestamp(raw) => {
                write!(f, "malformed timestamp {:?}, using 0", raw)
            }
        }
    }
}

/// What the extraction script produced
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Found(RawExtraction),
    NotFound,
    PartiallyMalformed(RawExtraction, Vec<NormalizationWarning>),
}

impl ExtractionOutcome {
    /// Classify the script result; `None` means no content container
    pub fn classify(value: Option<Value>) -> Result<Self, Error> {
        let Some(value) = value else {
            return Ok(ExtractionOutcome::NotFound);
        };

        let raw: RawExtraction = serde_json::from_value(value)?;

        let warnings: Vec<NormalizationWarning> = parse_timestamp_ms(&raw.timestamp).err().into_iter().collect();

        if warnings.is_empty() {
            Ok(ExtractionOutcome::Found(raw))
        } else {
            Ok(ExtractionOutcome::PartiallyMalformed(raw, warnings))
        }
    }
}
