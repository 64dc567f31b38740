//! Asset loading: image fetch and decode off the client task
//!
//! Every load is an independent spawned task; completion arrives at the
//! client event loop as a [`ClientEvent::Asset`] notification. A failed
//! load is logged and never produces an event, so its slot simply stays
//! empty.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::warn;

use crate::app::ClientEvent;
use crate::net::protocol::Facing;

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long
    pub data: Vec<u8>,
}

impl Pixmap {
    /// Create a transparent pixmap
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// Wrap an existing RGBA buffer
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.data[idx..idx + 4].copy_from_slice(&pixel);
    }

    pub fn fill(&mut self, pixel: [u8; 4]) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&pixel);
        }
    }
}

/// Completion notifications delivered to the client event loop
#[derive(Debug)]
pub enum AssetEvent {
    /// The world map image finished decoding
    World { image: Pixmap },
    /// One avatar animation frame finished decoding
    Frame {
        avatar: String,
        /// Registration generation the load was started for
        generation: u64,
        facing: Facing,
        index: usize,
        image: Pixmap,
    },
}

/// Asset fetch/decode errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data URI")]
    DataUri,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Clonable handle that spawns fetch+decode tasks and reports completions
#[derive(Clone)]
pub struct AssetLoader {
    http: reqwest::Client,
    asset_base: String,
    events: mpsc::Sender<ClientEvent>,
}

impl AssetLoader {
    pub fn new(asset_base: &str, events: mpsc::Sender<ClientEvent>) -> Self {
        Self {
            http: reqwest::Client::new(),
            asset_base: asset_base.trim_end_matches('/').to_string(),
            events,
        }
    }

    /// Start loading the world map. Failure leaves rendering disabled.
    pub fn load_world(&self, source: &str) {
        let loader = self.clone();
        let source = source.to_string();
        tokio::spawn(async move {
            match loader.fetch_and_decode(&source).await {
                Ok(image) => {
                    let _ = loader
                        .events
                        .send(ClientEvent::Asset(AssetEvent::World { image }))
                        .await;
                }
                Err(e) => warn!(source = %source, error = %e, "World image failed to load"),
            }
        });
    }

    /// Start loading one avatar frame. Frames load independently; a failed
    /// frame never blocks its siblings.
    pub fn load_frame(
        &self,
        avatar: &str,
        generation: u64,
        facing: Facing,
        index: usize,
        source: &str,
    ) {
        let loader = self.clone();
        let avatar = avatar.to_string();
        let source = source.to_string();
        tokio::spawn(async move {
            match loader.fetch_and_decode(&source).await {
                Ok(image) => {
                    let _ = loader
                        .events
                        .send(ClientEvent::Asset(AssetEvent::Frame {
                            avatar,
                            generation,
                            facing,
                            index,
                            image,
                        }))
                        .await;
                }
                Err(e) => {
                    warn!(avatar = %avatar, source = %source, error = %e, "Avatar frame failed to load")
                }
            }
        });
    }

    async fn fetch_and_decode(&self, source: &str) -> Result<Pixmap, AssetError> {
        let bytes = self.fetch(source).await?;
        let decoded = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Pixmap::from_rgba(width, height, decoded.into_raw()))
    }

    /// Resolve a source against the asset base and fetch its raw bytes.
    /// Data URIs and absolute URLs/paths bypass the base.
    async fn fetch(&self, source: &str) -> Result<Vec<u8>, AssetError> {
        if let Some(rest) = source.strip_prefix("data:") {
            let (_, payload) = rest.split_once(";base64,").ok_or(AssetError::DataUri)?;
            return Ok(STANDARD.decode(payload)?);
        }

        let resolved = if is_absolute(source) {
            source.to_string()
        } else {
            format!("{}/{}", self.asset_base, source)
        };

        if resolved.starts_with("http://") || resolved.starts_with("https://") {
            let response = self
                .http
                .get(&resolved)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| AssetError::Fetch {
                    url: resolved.clone(),
                    source: e,
                })?;
            let bytes = response.bytes().await.map_err(|e| AssetError::Fetch {
                url: resolved.clone(),
                source: e,
            })?;
            return Ok(bytes.to_vec());
        }

        tokio::fs::read(&resolved)
            .await
            .map_err(|e| AssetError::Io {
                path: resolved,
                source: e,
            })
    }
}

fn is_absolute(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://") || Path::new(source).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_roundtrip_and_bounds() {
        let mut pixmap = Pixmap::new(4, 3);
        pixmap.set_pixel(2, 1, [9, 8, 7, 255]);
        assert_eq!(pixmap.get_pixel(2, 1), Some([9, 8, 7, 255]));
        assert_eq!(pixmap.get_pixel(4, 0), None);
        assert_eq!(pixmap.get_pixel(0, 3), None);
        // Out-of-bounds writes are dropped, not panics
        pixmap.set_pixel(100, 100, [1, 2, 3, 4]);
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut pixmap = Pixmap::new(2, 2);
        pixmap.fill([1, 2, 3, 4]);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(pixmap.get_pixel(x, y), Some([1, 2, 3, 4]));
            }
        }
    }
}
