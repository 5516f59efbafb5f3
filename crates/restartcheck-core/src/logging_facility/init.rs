//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for interactive runs
    Development,
    /// JSON structured output for harness-driven runs
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// This function should be called once at application startup. `RUST_LOG`
/// overrides the profile's default filter.
///
/// # Profiles
///
/// - **Development**: Human-readable logs at warn level
/// - **Production**: JSON structured logs at info level
/// - **Test**: Capture mode for test assertions
///
/// # Example
///
/// ```
/// use restartcheck_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("restartcheck=warn")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("restartcheck=info")),
                )
                .init();
        }
        // Test capture is installed separately via init_test_capture()
        Profile::Test => {}
    });
}
