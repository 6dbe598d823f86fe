//! Layered synchronization settings
//!
//! The `[sync]` table of the DAM config file is the base. A `.dam-sync.toml`
//! in the development tree overrides it for that project, and command-line
//! options override both.

use std::path::Path;

use dam_common::config::SyncConfig;
use serde::Deserialize;
use tracing::info;

use crate::error::{Result, SyncError};

/// Per-project settings file, kept at the root of the development tree
pub const PROJECT_FILE: &str = ".dam-sync.toml";

/// Any subset of [`SyncConfig`]; unset entries keep the lower layer's value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncOverrides {
    pub live_server: Option<String>,
    pub local_server: Option<String>,
    pub server_path: Option<String>,
    pub bandwidth_limit: Option<String>,
    pub extra_filters: Option<Vec<String>>,
}

impl SyncOverrides {
    pub fn apply(self, mut base: SyncConfig) -> SyncConfig {
        if let Some(v) = self.live_server {
            base.live_server = v;
        }
        if let Some(v) = self.local_server {
            base.local_server = v;
        }
        if let Some(v) = self.server_path {
            base.server_path = v;
        }
        if let Some(v) = self.bandwidth_limit {
            // an empty limit turns throttling off
            base.bandwidth_limit = Some(v).filter(|v| !v.is_empty());
        }
        if let Some(v) = self.extra_filters {
            base.extra_filters = v;
        }
        base
    }
}

/// Project overrides from `dev/.dam-sync.toml`, if the file exists
pub fn load_project_overrides(dev: &Path) -> Result<Option<SyncOverrides>> {
    let path = dev.join(PROJECT_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let overrides = toml::from_str(&content).map_err(|e| SyncError::Settings {
        path: path.clone(),
        message: e.to_string(),
    })?;
    info!("Loaded project settings: {}", path.display());
    Ok(Some(overrides))
}
