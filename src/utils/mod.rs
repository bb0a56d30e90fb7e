pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
            .add_directive("quote_core=info".parse().unwrap_or_else(|_| LevelFilter::INFO.into()));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Parses a non-negative whole number that fits in `u32`. Commas are only
/// accepted as thousands separators (`12,500`, not `1,25,00`).
pub fn parse_grouped_number(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let mut groups = trimmed.split(',');
    let head = groups.next()?;
    let head_ok = !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit());
    let mut digits = head.to_string();
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        grouped = true;
        digits.push_str(group);
    }
    if !head_ok || (grouped && head.len() > 3) {
        return None;
    }
    digits.parse::<u32>().ok()
}
