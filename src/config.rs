use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    pub infrastructure: Vec<String>,
    #[serde(default)]
    pub infrastructure_metadata: HashMap<String, HostMetadata>,
    #[serde(default)]
    pub websites: Vec<String>,
    pub cameras: CameraRange,
    #[serde(default)]
    pub nvrs: NvrGroup,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_ms: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HostMetadata {
    pub name: String,
    pub location: String,
}

/// Cameras live at `base + n` for every `n` in `start..=end`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CameraRange {
    pub base: String,
    pub start: u32,
    pub end: u32,
    #[serde(default = "default_camera_location")]
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NvrGroup {
    pub addresses: Vec<String>,
    #[serde(default = "default_nvr_location")]
    pub location: String,
}

impl Default for NvrGroup {
    fn default() -> Self {
        Self { addresses: Vec::new(), location: default_nvr_location() }
    }
}

fn default_max_concurrency() -> usize { 32 }
pub fn default_ping_timeout() -> u64 { 1000 }
pub fn default_http_timeout() -> u64 { 5000 }
fn default_output() -> PathBuf { PathBuf::from("network_status.xlsx") }
fn default_camera_location() -> String { "Camera Subnet".into() }
fn default_nvr_location() -> String { "NVR Subnet".into() }

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}
