use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// Unknown levels fall back to info
pub fn normalize_level(level: &str) -> &'static str {
    let level = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .find(|known| **known == level)
        .copied()
        .unwrap_or("info")
}

// RUST_LOG directives win over the configured level
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::builder()
        .with_default_directive(
            normalize_level(level)
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        )
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("DEBUG"), "debug");
        assert_eq!(normalize_level(" warn "), "warn");
        assert_eq!(normalize_level("verbose"), "info");
    }
}
