//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs a human-readable subscriber.
///
/// Uses `RUST_LOG` if set, otherwise the provided level. Installing twice
/// is a no-op.
pub fn init(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(false)
        .try_init();
}

/// Installs a JSON subscriber, one object per event.
pub fn init_json(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(default_level))
        .with_current_span(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init("debug");
        init("info");
        init_json("info");
    }
}
