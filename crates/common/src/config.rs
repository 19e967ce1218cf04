//! Runtime configuration for the VA surface core.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

/// Default DRM render node used to open a VA display.
pub const DEFAULT_RENDER_NODE: &str = "/dev/dri/renderD128";

/// What a subpicture deassociation reports when the backend call fails.
///
/// Membership is always dropped before the backend call, so the overlay set
/// never tracks a subpicture the caller asked to remove. The policy only
/// decides whether the failed backend cleanup is surfaced to the caller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeassociatePolicy {
    /// Membership dropped, reference released, backend error returned.
    #[default]
    ReportFailure,
    /// Membership dropped, reference released, failure only logged.
    IgnoreFailure,
}

/// Top-level configuration for opening a display and managing surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaapiConfig {
    /// Explicit path to `libva.so`; system search path when `None`.
    pub library_path: Option<PathBuf>,
    /// Explicit path to `libva-drm.so`; system search path when `None`.
    pub drm_library_path: Option<PathBuf>,
    /// DRM render node the display is opened on.
    pub render_node: PathBuf,
    pub deassociate_policy: DeassociatePolicy,
}

impl Default for VaapiConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            drm_library_path: None,
            render_node: PathBuf::from(DEFAULT_RENDER_NODE),
            deassociate_policy: DeassociatePolicy::default(),
        }
    }
}

impl VaapiConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            render_node = %config.render_node.display(),
            "Loaded VA configuration"
        );
        Ok(config)
    }

    pub fn to_json_string(&self) -> ConfigResult<String> {
        let json = serde_json::to_string_pretty(self)?;
        debug!(json_len = json.len(), "Serialized VA configuration");
        Ok(json)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.render_node.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "render_node",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VaapiConfig::default();
        assert_eq!(config.render_node, PathBuf::from(DEFAULT_RENDER_NODE));
        assert_eq!(config.deassociate_policy, DeassociatePolicy::ReportFailure);
        assert!(config.library_path.is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            VaapiConfig::from_json_str(r#"{ "deassociate_policy": "IgnoreFailure" }"#).unwrap();
        assert_eq!(config.deassociate_policy, DeassociatePolicy::IgnoreFailure);
        assert_eq!(config.render_node, PathBuf::from(DEFAULT_RENDER_NODE));
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = VaapiConfig {
            library_path: Some(PathBuf::from("/opt/va/lib/libva.so.2")),
            ..VaapiConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(VaapiConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn empty_render_node_is_rejected() {
        let err = VaapiConfig::from_json_str(r#"{ "render_node": "" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "render_node", .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = VaapiConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = VaapiConfig::load(Path::new("/nonexistent/vs-config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
