//! Container-runtime endpoint resolution.
//!
//! Mirrors container resolution: a reference shaped like `a/b` is taken as a
//! direct value, anything else is looked up by name in the endpoint listing.

use serde::Serialize;
use serde_yaml::Value;
use shaddock_common::error::{Result, ShaddockError};

use crate::catalog::EndpointCatalog;
use crate::lookup::find_unique;
use crate::reference::is_bare_reference;
use crate::resolver::ContainerConfig;

/// A resolved container-runtime endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointConfig {
    /// Used as given; no URL was looked up.
    Direct {
        /// The reference itself.
        name: String,
    },
    /// Found in the endpoint listing.
    Named {
        /// Endpoint name.
        name: String,
        /// Runtime API URL.
        url: String,
    },
}

impl EndpointConfig {
    /// Endpoint name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Direct { name } | Self::Named { name, .. } => name,
        }
    }

    /// Looked-up URL; `None` for a direct endpoint.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Direct { .. } => None,
            Self::Named { url, .. } => Some(url),
        }
    }
}

/// Resolves an endpoint reference against an endpoint listing.
///
/// # Errors
///
/// Returns an error if a named reference is undefined or ambiguous, or if the
/// matched endpoint has no string `url`.
pub fn resolve_endpoint(reference: &str, catalog: &EndpointCatalog) -> Result<EndpointConfig> {
    if is_bare_reference(reference) {
        tracing::debug!(reference, "using direct endpoint");
        return Ok(EndpointConfig::Direct {
            name: reference.to_string(),
        });
    }

    tracing::info!(reference, listing = %catalog.source().display(), "resolving endpoint");
    let definition = find_unique(catalog.endpoint_definitions(), reference, catalog.source())?;
    let context = format!("endpoint definition of '{reference}'");
    let url = match &definition.url {
        Some(Value::String(url)) => url.clone(),
        Some(_) => {
            return Err(ShaddockError::InvalidField {
                field: "url",
                context,
                source_file: catalog.source().to_path_buf(),
                reason: "expected a string".into(),
            });
        }
        None => {
            return Err(ShaddockError::MissingRequiredField {
                field: "url",
                context,
                source_file: catalog.source().to_path_buf(),
            });
        }
    };

    Ok(EndpointConfig::Named {
        name: reference.to_string(),
        url,
    })
}

/// Resolves the endpoint a container should run on.
///
/// A container declaring a `host` is resolved through the listing; otherwise
/// `default_host` is used directly.
///
/// # Errors
///
/// Returns an error if the declared host cannot be resolved.
pub fn endpoint_for_container(
    container: &ContainerConfig,
    catalog: &EndpointCatalog,
    default_host: &str,
) -> Result<EndpointConfig> {
    match container.host() {
        Some(host) => resolve_endpoint(host, catalog),
        None => Ok(EndpointConfig::Direct {
            name: default_host.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::catalog::TemplateCatalog;
    use crate::resolver::resolve;

    const LISTING: &str = r"
- name: node1
  url: tcp://10.0.0.1:2375
- name: node2
  url: tcp://10.0.0.2:2375
- name: broken
";

    fn listing() -> EndpointCatalog {
        let value = serde_yaml::from_str(LISTING).expect("yaml");
        EndpointCatalog::from_value("docker-api.yml", value).expect("catalog")
    }

    #[test]
    fn named_endpoint_yields_url() {
        let endpoint = resolve_endpoint("node2", &listing()).expect("resolve");
        assert_eq!(endpoint.name(), "node2");
        assert_eq!(endpoint.url(), Some("tcp://10.0.0.2:2375"));
    }

    #[test]
    fn bare_endpoint_has_no_url() {
        let endpoint = resolve_endpoint("10.0.0.9/docker", &listing()).expect("resolve");
        assert_eq!(
            endpoint,
            EndpointConfig::Direct {
                name: "10.0.0.9/docker".into()
            }
        );
        assert!(endpoint.url().is_none());
    }

    #[test]
    fn unknown_endpoint_is_undefined() {
        let err = resolve_endpoint("node9", &listing()).unwrap_err();
        assert!(matches!(err, ShaddockError::UndefinedReference { .. }));
        assert!(err.to_string().contains("docker-api.yml"), "got: {err}");
    }

    #[test]
    fn duplicate_endpoint_is_rejected() {
        let value = serde_yaml::from_str(
            "- name: node1\n  url: tcp://a:2375\n- name: node1\n  url: tcp://b:2375\n",
        )
        .expect("yaml");
        let catalog = EndpointCatalog::from_value("docker-api.yml", value).expect("catalog");
        let err = resolve_endpoint("node1", &catalog).unwrap_err();
        assert!(matches!(err, ShaddockError::DuplicateDefinition { .. }));
    }

    #[test]
    fn unnamed_endpoint_is_reported() {
        let value = serde_yaml::from_str("- url: tcp://a:2375\n").expect("yaml");
        let catalog = EndpointCatalog::from_value("docker-api.yml", value).expect("catalog");
        let err = resolve_endpoint("node1", &catalog).unwrap_err();
        assert!(matches!(
            err,
            ShaddockError::MissingRequiredField { field: "name", .. }
        ));
    }

    #[test]
    fn endpoint_without_url_is_reported() {
        let err = resolve_endpoint("broken", &listing()).unwrap_err();
        assert!(matches!(
            err,
            ShaddockError::MissingRequiredField { field: "url", .. }
        ));
    }

    #[test]
    fn non_string_url_is_invalid() {
        let value = serde_yaml::from_str("- name: node1\n  url: [tcp://a:2375]\n").expect("yaml");
        let catalog = EndpointCatalog::from_value("docker-api.yml", value).expect("catalog");
        let err = resolve_endpoint("node1", &catalog).unwrap_err();
        assert!(matches!(err, ShaddockError::InvalidField { field: "url", .. }));
    }

    #[test]
    fn container_host_is_resolved_through_listing() {
        let value = serde_yaml::from_str(
            r"
clusters:
  - services:
      - name: nova
        image: ns/nova
        host: node1
",
        )
        .expect("yaml");
        let templates = TemplateCatalog::from_value("infra.yml", value).expect("catalog");
        let nova = resolve("nova", Path::new("/images"), &templates).expect("nova");

        let endpoint = endpoint_for_container(&nova, &listing(), "unix://var/run/docker.sock")
            .expect("endpoint");
        assert_eq!(endpoint.url(), Some("tcp://10.0.0.1:2375"));
    }

    #[test]
    fn container_without_host_uses_default() {
        let value = serde_yaml::from_str("clusters: []").expect("yaml");
        let templates = TemplateCatalog::from_value("infra.yml", value).expect("catalog");
        let bare = resolve("ns/img", Path::new("/images"), &templates).expect("bare");

        let endpoint = endpoint_for_container(&bare, &listing(), "unix://var/run/docker.sock")
            .expect("endpoint");
        assert_eq!(endpoint.name(), "unix://var/run/docker.sock");
        assert!(endpoint.url().is_none());
    }
}
