//! Process-wide `tracing` subscriber setup.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INIT_GUARD: OnceLock<bool> = OnceLock::new();

/// Installs a formatting subscriber filtered by `RUST_LOG` (default `info`).
///
/// Only the first call does anything. A subscriber installed elsewhere is left in place;
/// the return value tells whether this call's subscriber is the active one.
pub fn init_tracing() -> bool {
    *INIT_GUARD.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr);
        match Registry::default().with(filter).with(fmt_layer).try_init() {
            Ok(()) => true,
            Err(err) => {
                warn!("tracing subscriber not installed: {err}");
                false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        let first = init_tracing();
        assert_eq!(init_tracing(), first);
    }
}
