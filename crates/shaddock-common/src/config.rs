//! Global configuration model for the Shaddock resolution engine.
//!
//! Relative template and endpoint paths are taken from `template_dir`;
//! nothing here reads the process environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShaddockError};

/// Root configuration for a Shaddock invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaddockConfig {
    /// Directory relative `template_file` and `endpoint_file` paths start from.
    pub template_dir: PathBuf,
    /// Cluster template to resolve definitions from.
    pub template_file: Option<PathBuf>,
    /// Listing of named container-runtime endpoints.
    pub endpoint_file: Option<PathBuf>,
    /// Root directory of the per-image build contexts.
    pub images_dir: PathBuf,
    /// Runtime API address used when a container declares no host.
    pub docker_host: String,
    /// Runtime API version. Not interpreted here; handed unchanged to whatever
    /// talks to the container runtime.
    pub docker_version: String,
}

impl Default for ShaddockConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(crate::constants::DEFAULT_TEMPLATE_DIR),
            template_file: None,
            endpoint_file: None,
            images_dir: PathBuf::from(crate::constants::DEFAULT_IMAGES_DIR),
            docker_host: crate::constants::DEFAULT_DOCKER_HOST.to_string(),
            docker_version: crate::constants::DEFAULT_DOCKER_VERSION.to_string(),
        }
    }
}

impl ShaddockConfig {
    /// Parses a configuration from YAML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::DocumentLoad`] if the YAML is malformed.
    pub fn from_yaml_str(input: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(input).map_err(|e| ShaddockError::load(origin, e))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::DocumentLoad`] if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ShaddockError::load(path, e))?;
        Self::from_yaml_str(&content, path)
    }

    /// Returns the template file path, relative paths joined onto `template_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::MissingTemplateFile`] if none was supplied.
    pub fn template_file(&self) -> Result<PathBuf> {
        self.template_file
            .as_deref()
            .map(|file| self.in_template_dir(file))
            .ok_or(ShaddockError::MissingTemplateFile { kind: "template" })
    }

    /// Returns the endpoint listing path, relative paths joined onto `template_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::MissingTemplateFile`] if none was supplied.
    pub fn endpoint_file(&self) -> Result<PathBuf> {
        self.endpoint_file
            .as_deref()
            .map(|file| self.in_template_dir(file))
            .ok_or(ShaddockError::MissingTemplateFile {
                kind: "endpoint listing",
            })
    }

    // `join` keeps absolute paths as they are.
    fn in_template_dir(&self, file: &Path) -> PathBuf {
        self.template_dir.join(file)
    }
}
