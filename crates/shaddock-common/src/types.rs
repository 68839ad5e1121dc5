//! Domain primitive types used across the Shaddock workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An image tag in `namespace/image[:version]` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTag(String);

impl ImageTag {
    /// Creates a tag from its string form.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the full tag, version suffix included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the tag without its version suffix.
    #[must_use]
    pub fn repository(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(repo, _)| repo)
    }

    /// Returns the version suffix, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, version)| version)
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
