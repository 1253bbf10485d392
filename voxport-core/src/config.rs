//! Import configuration.
//!
//! Uses `figment` for layered configuration: built-in defaults, then an
//! optional TOML file, then `VOXPORT_`-prefixed environment variables.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::select::default_modality_priorities;

/// Tunables for batch import and primary selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// File-name extension token marking segmentation images, e.g. `"seg"`
    /// for `liver.seg.nii`. Empty disables the convention.
    pub segment_group_extension: String,
    /// Modality ranking for primary selection; higher wins.
    pub modality_priorities: HashMap<String, u8>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            segment_group_extension: "seg".to_string(),
            modality_priorities: default_modality_priorities(),
        }
    }
}

impl ImportConfig {
    /// Load configuration: defaults, then the TOML file (if given), then
    /// environment variables (`VOXPORT_SEGMENT_GROUP_EXTENSION=...`).
    pub fn load(config_file: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(ImportConfig::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("VOXPORT_")).extract()
    }
}
