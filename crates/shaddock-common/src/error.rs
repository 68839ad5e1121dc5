//! Unified error types for the Shaddock workspace.
//!
//! Every failure is fatal to the resolution call that raised it. Messages
//! carry the offending reference and source file so they can be shown to an
//! operator as-is.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ShaddockError {
    /// No path was supplied for a required input document.
    #[error("no {kind} file was specified")]
    MissingTemplateFile {
        /// Which document is missing ("template", "endpoint listing").
        kind: &'static str,
    },

    /// A named lookup matched zero definitions.
    #[error("there is no definition containing 'name: {reference}' in {}", .source_file.display())]
    UndefinedReference {
        /// The name that was looked up.
        reference: String,
        /// Document the lookup was performed against.
        source_file: PathBuf,
    },

    /// A named lookup matched more than one definition.
    #[error(
        "there is more than one definition matching 'name: {reference}' in {}",
        .source_file.display()
    )]
    DuplicateDefinition {
        /// The ambiguous name.
        reference: String,
        /// Document the lookup was performed against.
        source_file: PathBuf,
    },

    /// A definition lacks a property required in its context.
    #[error("{context} in {} is missing the {field} property", .source_file.display())]
    MissingRequiredField {
        /// The missing property (`name`, `image`, `mount`, `host_dir`, `url`).
        field: &'static str,
        /// Human-readable description of the offending definition.
        context: String,
        /// Document holding the definition.
        source_file: PathBuf,
    },

    /// A definition property is present but has the wrong shape.
    #[error("{context} in {} has an invalid {field} property: {reason}", .source_file.display())]
    InvalidField {
        /// The offending property.
        field: &'static str,
        /// Human-readable description of the offending definition.
        context: String,
        /// Document holding the definition.
        source_file: PathBuf,
        /// What was wrong with the value.
        reason: String,
    },

    /// A document could not be read or parsed.
    #[error("failed to load {}: {source}", .path.display())]
    DocumentLoad {
        /// Document that failed to load.
        path: PathBuf,
        /// Underlying cause.
        source: LoadFailure,
    },

    /// An `!include` chain re-entered a file that is still being expanded.
    #[error("cyclic include: {}", format_chain(.chain))]
    CyclicInclude {
        /// Include chain, outermost file first, ending with the re-entered file.
        chain: Vec<PathBuf>,
    },
}

/// Cause of a [`ShaddockError::DocumentLoad`].
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The content is not valid YAML or does not have the expected shape.
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),

    /// An `!include` directive is malformed.
    #[error("invalid include directive {target}: {reason}")]
    Include {
        /// Rendered payload of the directive.
        target: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ShaddockError {
    /// Builds a [`ShaddockError::DocumentLoad`] for `path`.
    pub fn load(path: impl Into<PathBuf>, source: impl Into<LoadFailure>) -> Self {
        Self::DocumentLoad {
            path: path.into(),
            source: source.into(),
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ShaddockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_reference_names_reference_and_file() {
        let err = ShaddockError::UndefinedReference {
            reference: "nova".into(),
            source_file: PathBuf::from("/etc/shaddock/infra.yml"),
        };
        let msg = err.to_string();
        assert!(msg.contains("name: nova"), "got: {msg}");
        assert!(msg.contains("/etc/shaddock/infra.yml"), "got: {msg}");
    }

    #[test]
    fn missing_field_names_property() {
        let err = ShaddockError::MissingRequiredField {
            field: "image",
            context: "container definition 'glance'".into(),
            source_file: PathBuf::from("infra.yml"),
        };
        assert_eq!(
            err.to_string(),
            "container definition 'glance' in infra.yml is missing the image property"
        );
    }

    #[test]
    fn invalid_field_names_property_and_reason() {
        let err = ShaddockError::InvalidField {
            field: "ports",
            context: "container definition of 'nova'".into(),
            source_file: PathBuf::from("infra.yml"),
            reason: "expected u16".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("container definition of 'nova' in infra.yml"), "got: {msg}");
        assert!(msg.ends_with("has an invalid ports property: expected u16"), "got: {msg}");
    }

    #[test]
    fn cyclic_include_renders_chain() {
        let err = ShaddockError::CyclicInclude {
            chain: vec!["a.yml".into(), "b.yml".into(), "a.yml".into()],
        };
        assert_eq!(err.to_string(), "cyclic include: a.yml -> b.yml -> a.yml");
    }

    #[test]
    fn document_load_wraps_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ShaddockError::load("missing.yml", io);
        let msg = err.to_string();
        assert!(msg.starts_with("failed to load missing.yml"), "got: {msg}");
        assert!(matches!(
            err,
            ShaddockError::DocumentLoad {
                source: LoadFailure::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn missing_template_file_message() {
        let err = ShaddockError::MissingTemplateFile { kind: "template" };
        assert_eq!(err.to_string(), "no template file was specified");
    }
}
