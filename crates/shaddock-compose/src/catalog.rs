//! Structural index over composed templates and endpoint listings.
//!
//! Definitions are kept exactly as authored. Required properties are checked
//! by the resolvers, not here, so every field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use shaddock_common::config::ShaddockConfig;
use shaddock_common::error::{Result, ShaddockError};

use crate::loader::load_document;

/// A container definition as written in a template.
///
/// Values are kept untyped so that a malformed property only fails the
/// resolution of the definition holding it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceDefinition {
    /// Unique name of the definition.
    pub name: Option<Value>,
    /// Image tag in `namespace/image[:version]` form.
    pub image: Option<Value>,
    /// Endpoint the container should run on.
    pub host: Option<Value>,
    /// Whether the container runs privileged.
    pub privileged: Option<Value>,
    /// Environment variables.
    pub env: Option<Value>,
    /// Runtime network mode.
    pub network_mode: Option<Value>,
    /// TCP ports to publish.
    pub ports: Option<Value>,
    /// Host directories to bind into the container, as [`VolumeSpec`] entries.
    pub volumes: Option<Value>,
}

impl ServiceDefinition {
    /// Authored name, if it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

/// A volume entry of a container definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VolumeSpec {
    /// Directory on the host.
    pub host_dir: Option<String>,
    /// Mount point in the container, optionally suffixed with `:ro`.
    pub mount: Option<String>,
}

/// A group of container definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Cluster {
    /// Cluster name.
    pub name: Option<String>,
    /// Container definitions in authored order.
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
}

/// A named container-runtime API endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointDefinition {
    /// Unique name of the endpoint.
    pub name: Option<Value>,
    /// Runtime API URL.
    pub url: Option<Value>,
}

impl EndpointDefinition {
    /// Authored name, if it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

#[derive(Deserialize)]
struct TemplateDocument {
    clusters: Vec<Cluster>,
}

/// Clusters of a composed template, in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    source: PathBuf,
    clusters: Vec<Cluster>,
}

impl TemplateCatalog {
    /// Loads the template named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::MissingTemplateFile`] if no template is
    /// configured, or a load error from [`TemplateCatalog::load`].
    pub fn open(config: &ShaddockConfig) -> Result<Self> {
        Self::load(config.template_file()?)
    }

    /// Loads and indexes a template file, expanding includes.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::DocumentLoad`] if the file cannot be read,
    /// parsed, or has no `clusters` list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = load_document(path)?;
        Self::from_value(path, value)
    }

    /// Indexes an already composed document.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::DocumentLoad`] if the document has no
    /// `clusters` list or a definition has the wrong shape.
    pub fn from_value(source: impl Into<PathBuf>, value: Value) -> Result<Self> {
        let source = source.into();
        let document: TemplateDocument =
            serde_yaml::from_value(value).map_err(|e| ShaddockError::load(&source, e))?;
        tracing::debug!(
            path = %source.display(),
            clusters = document.clusters.len(),
            "indexed template"
        );
        Ok(Self {
            source,
            clusters: document.clusters,
        })
    }

    /// Template file the catalog was built from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All clusters in authored order.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Returns the first cluster with the given name.
    #[must_use]
    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }

    /// Every container definition, cluster order first, then definition order.
    pub fn service_definitions(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.clusters.iter().flat_map(|c| c.services.iter())
    }
}

/// Endpoints of an endpoint listing, in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCatalog {
    source: PathBuf,
    endpoints: Vec<EndpointDefinition>,
}

impl EndpointCatalog {
    /// Loads the endpoint listing named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::MissingTemplateFile`] if no listing is
    /// configured, or a load error from [`EndpointCatalog::load`].
    pub fn open(config: &ShaddockConfig) -> Result<Self> {
        Self::load(config.endpoint_file()?)
    }

    /// Loads and indexes an endpoint listing.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::DocumentLoad`] if the file cannot be read or
    /// is not a sequence of endpoint entries.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = load_document(path)?;
        Self::from_value(path, value)
    }

    /// Indexes an already loaded listing.
    ///
    /// # Errors
    ///
    /// Returns [`ShaddockError::DocumentLoad`] if the value is not a sequence
    /// of endpoint entries.
    pub fn from_value(source: impl Into<PathBuf>, value: Value) -> Result<Self> {
        let source = source.into();
        let endpoints: Vec<EndpointDefinition> =
            serde_yaml::from_value(value).map_err(|e| ShaddockError::load(&source, e))?;
        tracing::debug!(
            path = %source.display(),
            endpoints = endpoints.len(),
            "indexed endpoint listing"
        );
        Ok(Self { source, endpoints })
    }

    /// Listing file the catalog was built from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Every endpoint definition in authored order.
    pub fn endpoint_definitions(&self) -> impl Iterator<Item = &EndpointDefinition> {
        self.endpoints.iter()
    }
}
