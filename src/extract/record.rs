//! Canonical post record

use serde::{Deserialize, Serialize};

/// Parser tag of the browser engine
pub const PARSER_TAG: &str = "twitter_parser";

/// State of every record returned
pub const STATE_SUCCESS: &str = "success";

const PLATFORM_ICON_URL: &str = "https://is1-ssl.mzstatic.com/image/thumb/Purple211/v4/d8/88/a7/d888a76a-2b0c-d68a-ab65-83eb09740f43/ProductionAppIcon-0-0-1x_U007emarketing-0-7-0-0-0-85-220.png/512x512bb.jpg";

/// Media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One media attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
            cover: None,
        }
    }

    pub fn video(url: impl Into<String>, cover: Option<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
            cover,
        }
    }
}

/// Post author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub uid: String,
    pub name: String,
    pub user_name: String,
    pub avatar: String,
    pub url: String,
}

/// Platform descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    pub code: String,
    pub url: String,
    pub icon_url: String,
}

impl Platform {
    /// The X platform
    pub fn x() -> Self {
        Self {
            name: "X".to_string(),
            code: "x".to_string(),
            url: "https://x.com/".to_string(),
            icon_url: PLATFORM_ICON_URL.to_string(),
        }
    }
}

/// Normalized post, identical in shape whichever parser produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Post id
    pub pid: String,
    /// Source URL
    pub url: String,
    pub content: String,
    /// Images first, then videos, each in document order
    pub media: Vec<MediaItem>,
    pub author: Author,
    /// Creation time in epoch milliseconds, 0 when unknown
    pub created_time: i64,
    pub parser: String,
    pub state: String,
    pub platform: Platform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys() {
        let record = CanonicalRecord {
            pid: "1".to_string(),
            url: "https://x.com/a/status/1".to_string(),
            content: "hi".to_string(),
            media: vec![
                MediaItem::image("https://pbs.twimg.com/media/A.jpg:orig"),
                MediaItem::video("https://video.twimg.com/v.mp4", Some("https://pbs.twimg.com/p.jpg".to_string())),
            ],
            author: Author {
                user_name: "a".to_string(),
                ..Author::default()
            },
            created_time: 1,
            parser: PARSER_TAG.to_string(),
            state: STATE_SUCCESS.to_string(),
            platform: Platform::x(),
        };

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["pid"], "1");
        assert_eq!(value["createdTime"], 1);
        assert_eq!(value["author"]["userName"], "a");
        assert_eq!(value["platform"]["iconUrl"], PLATFORM_ICON_URL);
        assert_eq!(value["media"][0]["type"], "image");
        assert!(value["media"][0].get("cover").is_none());
        assert_eq!(value["media"][1]["type"], "video");
        assert_eq!(value["media"][1]["cover"], "https://pbs.twimg.com/p.jpg");
    }
}
