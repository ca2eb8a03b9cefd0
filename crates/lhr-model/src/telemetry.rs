//! Subscriber setup for the `lhr` command.
//!
//! The model library only emits events through [`crate::obs`]; nothing is
//! recorded until a subscriber exists. The CLI installs one here from its
//! `--verbose` and `--json` flags. Output goes to stderr so that stdout
//! carries only reports and converted records. `RUST_LOG` overrides the
//! level when set.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for one `lhr` invocation.
///
/// `json` selects newline-delimited JSON lines; `level` applies when
/// `RUST_LOG` is unset. A subscriber that is already installed stays.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!(event = "telemetry.already_installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
    }
}
