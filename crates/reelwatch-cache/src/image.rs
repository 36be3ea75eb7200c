// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded cache of transcoded poster images.
//!
//! Entries are keyed by the hex SHA-256 of the source URL. On a miss the
//! poster is downloaded, shrunk into the configured bounding box and
//! re-encoded as JPEG. When full, the entry with the oldest capture time is
//! evicted.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use reelwatch_config::model::ImageConfig;
use reelwatch_core::{Clock, ReelwatchError};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Failures while producing a cached image.
#[derive(Debug, Error)]
pub enum ImageCacheError {
    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16 },

    /// The download itself failed.
    #[error("image fetch failed: {0}")]
    Fetch(String),

    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    /// The transcode task did not complete.
    #[error("image transcode aborted: {0}")]
    Aborted(String),
}

impl From<ImageCacheError> for ReelwatchError {
    fn from(err: ImageCacheError) -> Self {
        ReelwatchError::Media {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Where raw image bytes come from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageCacheError>;
}

/// Downloads images over HTTP.
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self, ReelwatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReelwatchError::Media {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageCacheError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageCacheError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageCacheError::Upstream {
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageCacheError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Clone)]
struct CachedImage {
    bytes: Vec<u8>,
    captured_at: DateTime<Utc>,
    seq: u64,
}

/// Transcoding parameters.
#[derive(Debug, Clone, Copy)]
struct Transcode {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

/// Poster cache shared by every rendering path.
pub struct ImageCache {
    entries: RwLock<HashMap<String, CachedImage>>,
    source: Arc<dyn ImageSource>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
    transcode: Transcode,
    seq: AtomicU64,
}

impl ImageCache {
    pub fn new(config: &ImageConfig, source: Arc<dyn ImageSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            source,
            clock,
            max_entries: config.max_entries.max(1),
            transcode: Transcode {
                max_width: config.max_width,
                max_height: config.max_height,
                quality: config.jpeg_quality.clamp(1, 100),
            },
            seq: AtomicU64::new(0),
        }
    }

    /// Cached JPEG bytes for `url`, downloading and transcoding on a miss.
    pub async fn get_or_fetch(&self, url: &str) -> Result<Vec<u8>, ImageCacheError> {
        let key = cache_key(url);
        if let Some(hit) = self.entries.read().await.get(&key) {
            return Ok(hit.bytes.clone());
        }

        let raw = self.source.fetch(url).await?;
        let params = self.transcode;
        let bytes = tokio::task::spawn_blocking(move || transcode(&raw, params))
            .await
            .map_err(|e| ImageCacheError::Aborted(e.to_string()))??;

        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&key) {
            return Ok(existing.bytes.clone());
        }
        if entries.len() >= self.max_entries {
            evict_oldest(&mut entries);
        }
        entries.insert(
            key,
            CachedImage {
                bytes: bytes.clone(),
                captured_at: self.clock.now(),
                seq: self.seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        Ok(bytes)
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.entries.read().await.contains_key(&cache_key(url))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

fn evict_oldest(entries: &mut HashMap<String, CachedImage>) {
    let oldest = entries
        .iter()
        .min_by_key(|(_, e)| (e.captured_at, e.seq))
        .map(|(k, _)| k.clone());
    if let Some(key) = oldest {
        entries.remove(&key);
        debug!(key = %key, "evicted cached image");
    }
}

fn transcode(raw: &[u8], params: Transcode) -> Result<Vec<u8>, ImageCacheError> {
    let mut img = image::load_from_memory(raw).map_err(ImageCacheError::Decode)?;
    if img.width() > params.max_width || img.height() > params.max_height {
        img = img.resize(params.max_width, params.max_height, FilterType::Lanczos3);
    }
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, params.quality);
    rgb.write_with_encoder(encoder).map_err(ImageCacheError::Encode)?;
    Ok(out.into_inner())
}
