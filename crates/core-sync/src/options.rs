use core_config::{Config, DEFAULT_SAFETY_LINES};
use core_model::HeaderInset;

/// Tunables for the correction algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOptions {
    /// Multiples of the line height kept below the caret after a downward correction.
    pub safety_lines: f64,
    pub header_inset: HeaderInset,
    pub growth_tracking: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            safety_lines: DEFAULT_SAFETY_LINES,
            header_inset: HeaderInset::Visible,
            growth_tracking: true,
        }
    }
}

impl From<&Config> for SyncOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            safety_lines: cfg.effective_safety_lines,
            header_inset: cfg.header_inset(),
            growth_tracking: cfg.growth_tracking(),
        }
    }
}
