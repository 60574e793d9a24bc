//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → config file (TOML, optional)
//!     → command-line overrides (--backends, --port)
//!     → validation.rs (semantic checks)
//!     → LbConfig (validated, immutable)
//!     → handed to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend list never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Overrides};
pub use schema::{
    AdminConfig, HealthCheckConfig, LbConfig, LimitsConfig, ListenerConfig, ObservabilityConfig,
    RetryConfig, TimeoutConfig,
};
