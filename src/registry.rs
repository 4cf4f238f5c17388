//! Validated, read-only view of everything a sweep has to probe.

use std::collections::HashMap;

use crate::config::{CameraRange, HostMetadata, MonitorConfig, NvrGroup};
use crate::error::ConfigError;
use crate::models::{Target, TargetKind};

#[derive(Debug, Clone)]
pub struct TargetRegistry {
    infrastructure: Vec<String>,
    metadata: HashMap<String, HostMetadata>,
    websites: Vec<String>,
    cameras: CameraRange,
    nvrs: NvrGroup,
}

impl TargetRegistry {
    /// Builds the registry, rejecting configurations that would otherwise
    /// show up as bogus Offline rows.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, ConfigError> {
        if let Some(missing) = config
            .infrastructure
            .iter()
            .find(|address| !config.infrastructure_metadata.contains_key(*address))
        {
            return Err(ConfigError::MissingMetadata(missing.clone()));
        }

        let cameras = &config.cameras;
        if cameras.start > cameras.end {
            return Err(ConfigError::EmptyCameraRange { start: cameras.start, end: cameras.end });
        }

        Ok(Self {
            infrastructure: config.infrastructure.clone(),
            metadata: config.infrastructure_metadata.clone(),
            websites: config.websites.clone(),
            cameras: cameras.clone(),
            nvrs: config.nvrs.clone(),
        })
    }

    pub fn infrastructure(&self) -> impl Iterator<Item = Target> + '_ {
        self.infrastructure.iter().zip(0u32..).map(|(address, sequence)| {
            // Presence checked in from_config.
            let meta = &self.metadata[address];
            Target {
                id: address.clone(),
                kind: TargetKind::InfrastructureIp,
                display_name: meta.name.clone(),
                location: meta.location.clone(),
                sequence,
            }
        })
    }

    pub fn websites(&self) -> impl Iterator<Item = Target> + '_ {
        self.websites.iter().zip(0u32..).map(|(url, sequence)| Target {
            id: url.clone(),
            kind: TargetKind::Website,
            display_name: url.clone(),
            location: "N/A".into(),
            sequence,
        })
    }

    pub fn cameras(&self) -> impl Iterator<Item = Target> + '_ {
        (self.cameras.start..=self.cameras.end).map(|suffix| Target {
            id: format!("{}{}", self.cameras.base, suffix),
            kind: TargetKind::CameraIp,
            display_name: format!("Camera {}", suffix),
            location: self.cameras.location.clone(),
            sequence: suffix,
        })
    }

    pub fn nvrs(&self) -> impl Iterator<Item = Target> + '_ {
        self.nvrs.addresses.iter().zip(0u32..).map(|(address, sequence)| Target {
            id: address.clone(),
            kind: TargetKind::NvrIp,
            display_name: address.clone(),
            location: self.nvrs.location.clone(),
            sequence,
        })
    }

    /// Every target, cameras expanded from their range.
    pub fn targets(&self) -> Vec<Target> {
        self.infrastructure()
            .chain(self.websites())
            .chain(self.cameras())
            .chain(self.nvrs())
            .collect()
    }

    pub fn target_count(&self) -> usize {
        let camera_count = (self.cameras.end - self.cameras.start) as usize + 1;
        self.infrastructure.len() + self.websites.len() + camera_count + self.nvrs.addresses.len()
    }
}
