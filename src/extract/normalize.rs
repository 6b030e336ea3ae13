//! Result normalizer
//!
//! Maps raw page data onto the canonical record. Every function here is pure.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use phf::phf_set;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use super::raw::{ExtractionOutcome, NormalizationWarning, RawExtraction};
use super::record::{Author, CanonicalRecord, MediaItem, Platform, PARSER_TAG, STATE_SUCCESS};
use crate::Error;

/// Extensions kept as-is on image URLs
static IMAGE_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "jpg",
    "jpeg",
    "png",
    "gif",
    "webp",
};

/// Suffix requesting the original-quality rendition
const ORIGINAL_SIZE: &str = ":orig";

static RE_STATUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/(\d+)").expect("valid status id pattern"));

/// Date-time layouts without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Digits of the first `/status/<digits>` in `url`, or `""`
pub fn parse_post_id(url: &str) -> String {
    RE_STATUS_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
        .unwrap_or_default()
}

/// Parse an ISO-8601 instant into epoch milliseconds.
///
/// Seconds may be omitted and a bare date means midnight. A date-time
/// without an offset, or with a `Z`, is read as UTC.
pub fn parse_timestamp_ms(raw: &str) -> Result<i64, NormalizationWarning> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(NormalizationWarning::MissingTimestamp);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.timestamp_millis());
    }
    if let Ok(instant) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Ok(instant.timestamp_millis());
    }

    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(instant.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| NormalizationWarning::MalformedTimestamp(raw.to_string()))
}

/// Rewrite an image URL to its original-quality form.
///
/// Strips query and fragment, drops any `:size` suffix, adds `.jpg` when the
/// path has no known image extension, then appends `:orig`. Idempotent.
pub fn canonicalize_image_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split('#').next().unwrap_or(url);
    let url = url.split('?').next().unwrap_or(url);
    if url.is_empty() {
        return String::new();
    }

    let (prefix, last) = match url.rfind('/') {
        Some(pos) => url.split_at(pos + 1),
        None => ("", url),
    };
    let name = last.split(':').next().unwrap_or(last);

    let has_known_extension = name
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    let mut canonical = format!("{}{}", prefix, name);
    if !has_known_extension {
        canonical.push_str(".jpg");
    }
    canonical.push_str(ORIGINAL_SIZE);
    canonical
}

/// Build the canonical record for `raw` found at `source_url`
pub fn normalize(raw: &RawExtraction, source_url: &str) -> CanonicalRecord {
    let images = raw
        .images
        .iter()
        .map(|url| canonicalize_image_url(url))
        .filter(|url| !url.is_empty())
        .map(MediaItem::image);

    let videos = raw
        .videos
        .iter()
        .filter(|video| !video.url.trim().is_empty())
        .map(|video| {
            let cover = video.cover.clone().filter(|c| !c.trim().is_empty());
            MediaItem::video(video.url.trim(), cover)
        });

    CanonicalRecord {
        pid: parse_post_id(source_url),
        url: source_url.to_string(),
        content: raw.text.clone(),
        media: images.chain(videos).collect(),
        author: Author {
            uid: raw.author.uid.clone(),
            name: raw.author.name.clone(),
            user_name: raw.author.user_name.clone(),
            avatar: raw.author.avatar.clone(),
            url: raw.author.url.clone(),
        },
        created_time: parse_timestamp_ms(&raw.timestamp).unwrap_or(0),
        parser: PARSER_TAG.to_string(),
        state: STATE_SUCCESS.to_string(),
        platform: Platform::x(),
    }
}

/// Turn an extraction outcome into a record or an error
pub fn resolve(outcome: ExtractionOutcome, url: &str) -> Result<CanonicalRecord, Error> {
    match outcome {
        ExtractionOutcome::NotFound => Err(Error::extraction_not_found(url)),
        ExtractionOutcome::Found(raw) => Ok(normalize(&raw, url)),
        ExtractionOutcome::PartiallyMalformed(raw, warnings) => {
            for warning in &warnings {
                warn!(url = %url, "normalization: {}", warning);
            }
            Ok(normalize(&raw, url))
        }
    }
}
