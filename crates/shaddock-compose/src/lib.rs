//! # shaddock-compose
//!
//! Turns cluster templates into validated container and endpoint
//! configurations for a lifecycle driver to act on.
//!
//! Handles:
//! - **Loader**: YAML loading with recursive `!include` expansion.
//! - **Catalog**: Structural index of clusters, container definitions, and endpoints.
//! - **Lookup**: Unique-by-name search shared by both resolvers.
//! - **Resolver**: Container configuration resolution and normalization.
//! - **Endpoint**: Container-runtime endpoint resolution.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use shaddock_compose::catalog::TemplateCatalog;
//! use shaddock_compose::resolver::resolve;
//!
//! let catalog = TemplateCatalog::load("/var/lib/shaddock/infra.yml")?;
//! let nova = resolve("nova", Path::new("/var/lib/shaddock/images"), &catalog)?;
//! println!("{} -> {}", nova.tag(), nova.path().display());
//! # Ok::<(), shaddock_common::error::ShaddockError>(())
//! ```

pub mod catalog;
pub mod endpoint;
pub mod loader;
pub mod lookup;
pub mod reference;
pub mod resolver;
