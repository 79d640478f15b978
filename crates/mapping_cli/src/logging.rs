use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "MCV_LOG";

/// Logging presets selectable with `--log-profile`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogProfile {
    /// Errors only
    Production,
    /// Warnings and errors
    #[default]
    Standalone,
    /// Everything down to debug
    Development,
    /// No output
    Testing,
}

impl LogProfile {
    pub fn directive(self) -> &'static str {
        match self {
            LogProfile::Production => "error",
            LogProfile::Standalone => "warn",
            LogProfile::Development => "debug",
            LogProfile::Testing => "off",
        }
    }
}

/// Installs the global subscriber. Log lines go to stderr so that JSON
/// output on stdout stays parseable.
pub fn init(profile: LogProfile, verbose: bool) {
    let profile = if verbose {
        LogProfile::Development
    } else {
        profile
    };

    let filter = [LOG_ENV, "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(profile.directive()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .init();
}
