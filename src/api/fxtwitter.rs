//! FxTwitter API client
//!
//! Fetches a post as JSON from the FxTwitter proxy and maps it onto the
//! canonical record.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::extract::{Author, CanonicalRecord, MediaItem, Platform, STATE_SUCCESS};
use crate::parser::ContentParser;
use crate::Error;

/// Parser tag of API-sourced records
pub const PARSER_NAME: &str = "fxtwitter";

/// Hosts rewritten to the API host
const POST_HOSTS: &[&str] = &["twitter.com", "www.twitter.com", "x.com", "www.x.com"];

const API_PLATFORM_URL: &str = "https://x.com";
const API_PLATFORM_ICON_URL: &str = "https://raw.githubusercontent.com/content-hive/assets/main/IconSet/X.png";

/// Platform descriptor attached to API-built records
fn api_platform() -> Platform {
    Platform {
        name: "X".to_string(),
        code: "x".to_string(),
        url: API_PLATFORM_URL.to_string(),
        icon_url: API_PLATFORM_ICON_URL.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: u16,
    #[serde(default)]
    message: String,
    tweet: Option<ApiTweet>,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: String,
    url: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_timestamp: i64,
    author: ApiAuthor,
    #[serde(default)]
    media: Option<ApiMedia>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    screen_name: String,
    #[serde(default)]
    avatar_url: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiMedia {
    #[serde(default)]
    photos: Vec<ApiPhoto>,
    #[serde(default)]
    videos: Vec<ApiVideo>,
}

#[derive(Debug, Deserialize)]
struct ApiPhoto {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiVideo {
    url: String,
    thumbnail_url: Option<String>,
}

/// Client of the FxTwitter API proxy
#[derive(Debug, Clone)]
pub struct FxTwitterClient {
    client: reqwest::Client,
    api_host: String,
}

impl FxTwitterClient {
    pub fn new(api_host: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_host: api_host.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(config.api_host.clone(), config.api_timeout())
    }

    /// Rewrite a post URL onto the API host
    pub fn api_url(&self, url: &str) -> Result<Url, Error> {
        let mut api_url = Url::parse(url).map_err(|e| Error::api(format!("invalid URL {}: {}", url, e)))?;

        match api_url.host_str() {
            Some(host) if POST_HOSTS.contains(&host) => {}
            other => return Err(Error::api(format!("unsupported host {:?}", other))),
        }

        api_url
            .set_host(Some(&self.api_host))
            .map_err(|e| Error::api(format!("invalid API host {}: {}", self.api_host, e)))?;
        Ok(api_url)
    }

    async fn fetch(&self, api_url: Url) -> Result<ApiResponse, Error> {
        let response = self.client.get(api_url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(format!("status {}: {}", status.as_u16(), body)));
        }

        Ok(response.json().await?)
    }
}

/// Map an API payload onto the canonical record
fn build_record(payload: ApiResponse) -> Result<CanonicalRecord, Error> {
    if payload.code != 200 {
        let message = if payload.message.is_empty() {
            "Unknown error".to_string()
        } else {
            payload.message
        };
        return Err(Error::api(format!("API returned error: {}", message)));
    }

    let tweet = payload
        .tweet
        .ok_or_else(|| Error::api("API response carries no tweet"))?;
    let media = tweet.media.unwrap_or_default();

    let images = media.photos.into_iter().map(|photo| MediaItem::image(photo.url));
    let videos = media
        .videos
        .into_iter()
        .map(|video| MediaItem::video(video.url, video.thumbnail_url));

    Ok(CanonicalRecord {
        pid: tweet.id,
        url: tweet.url,
        content: tweet.text,
        media: images.chain(videos).collect(),
        author: Author {
            uid: tweet.author.id,
            name: tweet.author.name,
            user_name: tweet.author.screen_name,
            avatar: tweet.author.avatar_url,
            url: tweet.author.url,
        },
        created_time: tweet.created_timestamp * 1000,
        parser: PARSER_NAME.to_string(),
        state: STATE_SUCCESS.to_string(),
        platform: api_platform(),
    })
}

#[async_trait]
impl ContentParser for FxTwitterClient {
    fn name(&self) -> &str {
        PARSER_NAME
    }

    async fn parse(&self, url: &str) -> Result<CanonicalRecord, Error> {
        let api_url = self.api_url(url)?;
        info!(url = %url, "fetching {}", api_url);

        let payload = self.fetch(api_url).await?;
        debug!(url = %url, code = payload.code, "API response received");

        build_record(payload)
    }
}
