//! Unique-by-name search over authored definitions.

use std::path::Path;

use shaddock_common::error::{Result, ShaddockError};

use crate::catalog::{EndpointDefinition, ServiceDefinition};

/// A definition addressable by its `name` property.
pub trait Named {
    /// Whether a `name` property was authored at all.
    fn has_name(&self) -> bool;

    /// Authored name, if it is a string.
    fn name(&self) -> Option<&str>;

    /// Describes the kind of definition in error messages.
    fn kind() -> &'static str;
}

impl Named for ServiceDefinition {
    fn has_name(&self) -> bool {
        self.name.is_some()
    }

    fn name(&self) -> Option<&str> {
        ServiceDefinition::name(self)
    }

    fn kind() -> &'static str {
        "container definition"
    }
}

impl Named for EndpointDefinition {
    fn has_name(&self) -> bool {
        self.name.is_some()
    }

    fn name(&self) -> Option<&str> {
        EndpointDefinition::name(self)
    }

    fn kind() -> &'static str {
        "endpoint definition"
    }
}

/// Returns the only definition named `reference`.
///
/// Every candidate must carry a name, even if another one already matched.
///
/// # Errors
///
/// - [`ShaddockError::MissingRequiredField`] if any candidate has no name.
/// - [`ShaddockError::UndefinedReference`] if nothing matches.
/// - [`ShaddockError::DuplicateDefinition`] if more than one candidate matches.
pub fn find_unique<'a, T, I>(items: I, reference: &str, source_file: &Path) -> Result<&'a T>
where
    T: Named + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut found = None;
    let mut duplicate = false;

    for item in items {
        if !item.has_name() {
            return Err(ShaddockError::MissingRequiredField {
                field: "name",
                context: format!("at least one {}", T::kind()),
                source_file: source_file.to_path_buf(),
            });
        }
        if item.name() == Some(reference) {
            duplicate |= found.is_some();
            found = Some(item);
        }
    }

    if duplicate {
        return Err(ShaddockError::DuplicateDefinition {
            reference: reference.to_string(),
            source_file: source_file.to_path_buf(),
        });
    }

    found.ok_or_else(|| ShaddockError::UndefinedReference {
        reference: reference.to_string(),
        source_file: source_file.to_path_buf(),
    })
}
