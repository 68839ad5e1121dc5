//! System-wide constants and default paths.

/// Default template directory.
pub const DEFAULT_TEMPLATE_DIR: &str = "/var/lib/shaddock";

/// Default root directory holding one build context per image tag.
pub const DEFAULT_IMAGES_DIR: &str = "/var/lib/shaddock/images";

/// Default container-runtime API address.
pub const DEFAULT_DOCKER_HOST: &str = "unix://var/run/docker.sock";

/// Default container-runtime API version.
pub const DEFAULT_DOCKER_VERSION: &str = "1.12";

/// Network mode applied when a definition does not declare one.
pub const DEFAULT_NETWORK_MODE: &str = "bridge";

/// Host address every declared port is published on.
pub const PORT_BIND_ADDRESS: &str = "0.0.0.0";

/// YAML tag of the inclusion directive (without the leading `!`).
pub const INCLUDE_TAG: &str = "include";
