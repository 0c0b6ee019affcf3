//! Configuration for the overview synchronization.
//!
//! Settings are read from an INI file. Every key is optional; anything left
//! out keeps its default.
//!
//! ```ini
//! [sync]
//! zoom_offset = -2
//! clone_pitch = 0
//!
//! [overlay]
//! view_bounds_source = viewBounds
//! bbox_source = bbox
//!
//! [logging]
//! filter = info
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::overlay::OverlaySourceNames;
use crate::sync::{OverviewPolicy, DEFAULT_CLONE_PITCH, DEFAULT_ZOOM_OFFSET};

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Highest pitch a clone can be pinned to, in degrees.
pub const MAX_CLONE_PITCH: f64 = 90.0;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// A key holds a value that cannot be used.
    #[error("Invalid value for [{section}] {key}: {value:?}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Synchronization settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Zoom difference applied to the overview (negative = zoomed out).
    pub zoom_offset: f64,

    /// Pitch the overview is held at.
    pub clone_pitch: f64,

    /// Names of the overlay sources on the overview.
    pub sources: OverlaySourceNames,

    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            zoom_offset: DEFAULT_ZOOM_OFFSET,
            clone_pitch: DEFAULT_CLONE_PITCH,
            sources: OverlaySourceNames::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl SyncConfig {
    /// Load settings from an INI file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&content)
    }

    /// Parse settings from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content)?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("sync")) {
            if let Some(offset) = parse_number(section, "sync", "zoom_offset")? {
                config.zoom_offset = offset;
            }
            if let Some(pitch) = parse_number(section, "sync", "clone_pitch")? {
                if !(0.0..=MAX_CLONE_PITCH).contains(&pitch) {
                    return Err(invalid("sync", "clone_pitch", &pitch.to_string()));
                }
                config.clone_pitch = pitch;
            }
        }

        if let Some(section) = ini.section(Some("overlay")) {
            if let Some(name) = parse_name(section, "overlay", "view_bounds_source")? {
                config.sources.view_bounds = name;
            }
            if let Some(name) = parse_name(section, "overlay", "bbox_source")? {
                config.sources.bbox = name;
            }
        }

        if config.sources.bbox == config.sources.view_bounds {
            return Err(invalid("overlay", "bbox_source", &config.sources.bbox));
        }

        if let Some(filter) = ini
            .section(Some("logging"))
            .and_then(|section| section.get("filter"))
        {
            config.log_filter = filter.trim().to_string();
        }

        Ok(config)
    }

    /// Set the zoom offset.
    pub fn with_zoom_offset(mut self, offset: f64) -> Self {
        self.zoom_offset = offset;
        self
    }

    /// Set the clone pitch.
    pub fn with_clone_pitch(mut self, pitch: f64) -> Self {
        self.clone_pitch = pitch;
        self
    }

    /// Set the overlay source names.
    pub fn with_sources(mut self, sources: OverlaySourceNames) -> Self {
        self.sources = sources;
        self
    }

    /// Set the fallback log filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// The overview policy these settings describe.
    pub fn policy(&self) -> OverviewPolicy {
        OverviewPolicy::new(self.zoom_offset, self.clone_pitch)
    }
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number(
    props: &Properties,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ConfigError> {
    let Some(raw) = props.get(key) else {
        return Ok(None);
    };
    match f64::from_str(raw.trim()) {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(invalid(section, key, raw)),
    }
}

fn parse_name(props: &Properties, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
    let Some(raw) = props.get(key) else {
        return Ok(None);
    };
    let name = raw.trim();
    if name.is_empty() {
        return Err(invalid(section, key, raw));
    }
    Ok(Some(name.to_string()))
}
