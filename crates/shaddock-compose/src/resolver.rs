//! Container configuration resolution.
//!
//! A reference is either a bare `namespace/image` tag, used directly, or the
//! name of a container definition in the template catalog. Named definitions
//! are validated and normalized into a [`ResolvedContainer`] before any
//! runtime action sees them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use shaddock_common::constants::{DEFAULT_NETWORK_MODE, PORT_BIND_ADDRESS};
use shaddock_common::error::{Result, ShaddockError};
use shaddock_common::types::ImageTag;

use crate::catalog::{ServiceDefinition, TemplateCatalog, VolumeSpec};
use crate::lookup::{Named, find_unique};
use crate::reference::is_bare_reference;

/// Transport protocol of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP.
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

/// A port exposed by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExposedPort {
    /// Container port.
    pub port: u16,
    /// Transport protocol.
    pub protocol: Protocol,
}

/// Where a container port is published on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortBinding {
    /// Host address to bind.
    pub host_ip: String,
    /// Host port.
    pub host_port: u16,
}

/// A host directory mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bind {
    /// Mount point inside the container.
    pub bind: String,
    /// Whether the mount is read-only.
    pub read_only: bool,
}

/// Configuration synthesized from a bare image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BareImage {
    /// Image name, the second segment of the reference.
    pub name: String,
    /// The reference itself.
    pub tag: ImageTag,
    /// Build context directory.
    pub path: PathBuf,
    /// Runtime network mode.
    pub network_mode: String,
}

/// Configuration derived from a validated container definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContainer {
    /// Definition name.
    pub name: String,
    /// Image tag as authored.
    pub tag: ImageTag,
    /// Build context directory, derived from the unversioned tag.
    pub path: PathBuf,
    /// Endpoint the container should run on.
    pub host: Option<String>,
    /// Privileged flag as authored.
    pub privileged: Option<bool>,
    /// Environment variables.
    pub env: BTreeMap<String, String>,
    /// Runtime network mode.
    pub network_mode: String,
    /// Exposed ports in declaration order.
    pub ports: Vec<ExposedPort>,
    /// Host publication of each exposed port.
    pub port_bindings: BTreeMap<u16, PortBinding>,
    /// Container-side mount points in declaration order.
    pub volumes: Vec<String>,
    /// Host directory to mount mapping.
    pub binds: BTreeMap<String, Bind>,
}

/// A fully resolved container configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerConfig {
    /// Addressed directly by image tag; nothing beyond the image is declared.
    Bare(BareImage),
    /// Looked up in the template catalog.
    Resolved(ResolvedContainer),
}

impl ContainerConfig {
    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Bare(b) => &b.name,
            Self::Resolved(r) => &r.name,
        }
    }

    /// Image tag.
    #[must_use]
    pub const fn tag(&self) -> &ImageTag {
        match self {
            Self::Bare(b) => &b.tag,
            Self::Resolved(r) => &r.tag,
        }
    }

    /// Build context directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Bare(b) => &b.path,
            Self::Resolved(r) => &r.path,
        }
    }

    /// Runtime network mode.
    #[must_use]
    pub fn network_mode(&self) -> &str {
        match self {
            Self::Bare(b) => &b.network_mode,
            Self::Resolved(r) => &r.network_mode,
        }
    }

    /// Declared endpoint, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => r.host.as_deref(),
        }
    }

    /// Declared privileged flag, if any.
    #[must_use]
    pub const fn privileged(&self) -> Option<bool> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => r.privileged,
        }
    }

    /// Environment variables; `None` when nothing was declared.
    #[must_use]
    pub const fn env(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => Some(&r.env),
        }
    }

    /// Exposed ports; `None` when nothing was declared.
    #[must_use]
    pub fn ports(&self) -> Option<&[ExposedPort]> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => Some(&r.ports),
        }
    }

    /// Port publications; `None` when nothing was declared.
    #[must_use]
    pub const fn port_bindings(&self) -> Option<&BTreeMap<u16, PortBinding>> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => Some(&r.port_bindings),
        }
    }

    /// Container-side mount points; `None` when nothing was declared.
    #[must_use]
    pub fn volumes(&self) -> Option<&[String]> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => Some(&r.volumes),
        }
    }

    /// Host directory mounts; `None` when nothing was declared.
    #[must_use]
    pub const fn binds(&self) -> Option<&BTreeMap<String, Bind>> {
        match self {
            Self::Bare(_) => None,
            Self::Resolved(r) => Some(&r.binds),
        }
    }
}

/// Resolves a container reference against a template catalog.
///
/// # Errors
///
/// Returns an error if a named reference is undefined or ambiguous, or if the
/// matched definition lacks a required property.
pub fn resolve(
    reference: &str,
    images_root: &Path,
    catalog: &TemplateCatalog,
) -> Result<ContainerConfig> {
    if is_bare_reference(reference) {
        tracing::debug!(reference, "using bare image reference");
        return Ok(ContainerConfig::Bare(bare_image(reference, images_root)));
    }

    tracing::info!(reference, template = %catalog.source().display(), "resolving container");
    let definition = find_unique(catalog.service_definitions(), reference, catalog.source())?;
    resolve_definition(reference, definition, images_root, catalog.source())
        .map(ContainerConfig::Resolved)
}

fn bare_image(reference: &str, images_root: &Path) -> BareImage {
    let name = reference
        .split_once('/')
        .map_or(reference, |(_, image)| image);
    BareImage {
        name: name.to_string(),
        tag: ImageTag::new(reference),
        path: images_root.join(reference),
        network_mode: DEFAULT_NETWORK_MODE.to_string(),
    }
}

fn resolve_definition(
    name: &str,
    definition: &ServiceDefinition,
    images_root: &Path,
    source_file: &Path,
) -> Result<ResolvedContainer> {
    let fields = FieldReader { name, source_file };

    let tag = fields
        .read::<String>("image", definition.image.as_ref())?
        .filter(|image| !image.trim().is_empty())
        .map(ImageTag::new)
        .ok_or_else(|| ShaddockError::MissingRequiredField {
            field: "image",
            context: fields.context(),
            source_file: source_file.to_path_buf(),
        })?;
    let path = images_root.join(tag.repository());
    tracing::debug!(
        reference = name,
        tag = %tag,
        version = tag.version(),
        "matched definition"
    );

    let mut ports = Vec::new();
    let mut port_bindings = BTreeMap::new();
    let declared_ports: Option<Vec<u16>> = fields.read("ports", definition.ports.as_ref())?;
    for port in declared_ports.into_iter().flatten() {
        ports.push(ExposedPort {
            port,
            protocol: Protocol::Tcp,
        });
        let _ = port_bindings.insert(
            port,
            PortBinding {
                host_ip: PORT_BIND_ADDRESS.to_string(),
                host_port: port,
            },
        );
    }

    let mut volumes = Vec::new();
    let mut binds = BTreeMap::new();
    let declared_volumes: Option<Vec<VolumeSpec>> =
        fields.read("volumes", definition.volumes.as_ref())?;
    for spec in declared_volumes.iter().flatten() {
        let (host_dir, bind) = resolve_volume(name, spec, source_file)?;
        volumes.push(bind.bind.clone());
        let _ = binds.insert(host_dir, bind);
    }

    let env = definition
        .env
        .as_ref()
        .map(render_env)
        .transpose()
        .map_err(|reason| fields.invalid("env", reason))?
        .unwrap_or_default();
    let network_mode: Option<String> =
        fields.read("network_mode", definition.network_mode.as_ref())?;

    Ok(ResolvedContainer {
        name: name.to_string(),
        path,
        tag,
        host: fields.read("host", definition.host.as_ref())?,
        privileged: fields.read("privileged", definition.privileged.as_ref())?,
        env,
        network_mode: network_mode.unwrap_or_else(|| DEFAULT_NETWORK_MODE.to_string()),
        ports,
        port_bindings,
        volumes,
        binds,
    })
}

/// Converts the authored properties of one definition to their expected types.
struct FieldReader<'a> {
    name: &'a str,
    source_file: &'a Path,
}

impl FieldReader<'_> {
    fn context(&self) -> String {
        format!("container definition of '{}'", self.name)
    }

    fn invalid(&self, field: &'static str, reason: String) -> ShaddockError {
        ShaddockError::InvalidField {
            field,
            context: self.context(),
            source_file: self.source_file.to_path_buf(),
            reason,
        }
    }

    /// Absent and `null` both yield `None`.
    fn read<T: DeserializeOwned>(
        &self,
        field: &'static str,
        raw: Option<&Value>,
    ) -> Result<Option<T>> {
        raw.map_or(Ok(None), |value| {
            serde_yaml::from_value(value.clone())
                .map_err(|e| self.invalid(field, e.to_string()))
        })
    }
}

/// Renders an `env` mapping, scalar values as strings and `null` as empty.
fn render_env(raw: &Value) -> std::result::Result<BTreeMap<String, String>, String> {
    let Value::Mapping(mapping) = raw else {
        return Err(format!("expected a mapping, got {raw:?}"));
    };
    mapping
        .iter()
        .map(|(key, value)| {
            let key = scalar_string(key).ok_or_else(|| format!("invalid key {key:?}"))?;
            let value = scalar_string(value)
                .ok_or_else(|| format!("value for {key} must be a scalar, got {value:?}"))?;
            Ok((key, value))
        })
        .collect()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Splits a `mount[:mode]` spec. Any suffix marks the mount read-only.
fn resolve_volume(name: &str, spec: &VolumeSpec, source_file: &Path) -> Result<(String, Bind)> {
    let missing = |field| ShaddockError::MissingRequiredField {
        field,
        context: format!("a volume definition of '{name}'"),
        source_file: source_file.to_path_buf(),
    };
    let mount = spec.mount.as_deref().ok_or_else(|| missing("mount"))?;
    let host_dir = spec.host_dir.clone().ok_or_else(|| missing("host_dir"))?;

    let bind = match mount.split_once(':') {
        Some((path, _mode)) => Bind {
            bind: path.to_string(),
            read_only: true,
        },
        None => Bind {
            bind: mount.to_string(),
            read_only: false,
        },
    };
    Ok((host_dir, bind))
}

/// Resolves container references against one catalog and images root.
#[derive(Debug, Clone, Copy)]
pub struct ContainerResolver<'a> {
    catalog: &'a TemplateCatalog,
    images_root: &'a Path,
}

impl<'a> ContainerResolver<'a> {
    /// Creates a resolver over `catalog`, deriving build paths under `images_root`.
    #[must_use]
    pub const fn new(catalog: &'a TemplateCatalog, images_root: &'a Path) -> Self {
        Self {
            catalog,
            images_root,
        }
    }

    /// Resolves a single reference. See [`resolve`].
    ///
    /// # Errors
    ///
    /// Returns an error if resolution of `reference` fails.
    pub fn resolve(&self, reference: &str) -> Result<ContainerConfig> {
        resolve(reference, self.images_root, self.catalog)
    }

    /// Resolves every container definition of the catalog, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error encountered.
    pub fn resolve_all(&self) -> Result<Vec<ContainerConfig>> {
        let source_file = self.catalog.source().to_path_buf();
        let names = self
            .catalog
            .service_definitions()
            .map(|definition| match definition.name() {
                Some(name) => Ok(name),
                None if definition.has_name() => Err(ShaddockError::InvalidField {
                    field: "name",
                    context: "a container definition".into(),
                    source_file: source_file.clone(),
                    reason: "expected a string".into(),
                }),
                None => Err(ShaddockError::MissingRequiredField {
                    field: "name",
                    context: "at least one container definition".into(),
                    source_file: source_file.clone(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        names.into_iter().map(|name| self.resolve(name)).collect()
    }
}
