//! Configuration loading and parsing.
//!
//! Parses `caretsync.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [scroll]
//! safety_lines = 2.0        # line heights kept below the caret on downward corrections
//! header_inset = "visible"  # "visible" | "total" | "none"
//!
//! [growth]
//! enabled = true            # trailing-edge growth tracking
//! ```
//!
//! A missing file yields defaults. A malformed file also yields defaults (with a
//! warning on target `config`). Unknown fields are ignored.
//!
//! `safety_lines` is clamped into `[0, MAX_SAFETY_LINES]`; the raw parsed value is
//! retained in `file` and the clamped one in `effective_safety_lines`.

use anyhow::{Context, Result};
use core_model::HeaderInset;
use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "caretsync.toml";
pub const DEFAULT_SAFETY_LINES: f64 = 2.0;
pub const MAX_SAFETY_LINES: f64 = 16.0;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScrollConfig {
    #[serde(default = "ScrollConfig::default_safety_lines")]
    pub safety_lines: f64,
    #[serde(default)]
    pub header_inset: HeaderInset,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            safety_lines: Self::default_safety_lines(),
            header_inset: HeaderInset::default(),
        }
    }
}

impl ScrollConfig {
    const fn default_safety_lines() -> f64 {
        DEFAULT_SAFETY_LINES
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GrowthConfig {
    #[serde(default = "GrowthConfig::default_enabled")]
    pub enabled: bool,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

impl GrowthConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub raw: Option<String>,         // original file string (optional)
    pub file: ConfigFile,            // parsed (or default) data
    pub effective_safety_lines: f64, // clamped
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(None, ConfigFile::default())
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("caretsync").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading config {}", path.display()));
        }
    };
    Ok(parse_str(&content))
}

/// Parse TOML text, falling back to defaults on syntax or type errors.
pub fn parse_str(content: &str) -> Config {
    match toml::from_str::<ConfigFile>(content) {
        Ok(file) => Config::from_file(Some(content.to_string()), file),
        Err(e) => {
            warn!(target: "config", error = %e, "config_parse_failed_using_defaults");
            Config::default()
        }
    }
}

impl Config {
    fn from_file(raw: Option<String>, file: ConfigFile) -> Self {
        let mut cfg = Self {
            raw,
            file,
            effective_safety_lines: DEFAULT_SAFETY_LINES,
        };
        cfg.apply_limits();
        cfg
    }

    /// Clamp the parsed safety margin. Returns the effective value.
    pub fn apply_limits(&mut self) -> f64 {
        let raw = self.file.scroll.safety_lines;
        let clamped = if raw.is_finite() {
            raw.clamp(0.0, MAX_SAFETY_LINES)
        } else {
            DEFAULT_SAFETY_LINES
        };
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max = MAX_SAFETY_LINES,
                "safety_lines_clamped"
            );
        }
        self.effective_safety_lines = clamped;
        clamped
    }

    pub fn header_inset(&self) -> HeaderInset {
        self.file.scroll.header_inset
    }

    pub fn growth_tracking(&self) -> bool {
        self.file.growth.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture_logs<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file.scroll.safety_lines, DEFAULT_SAFETY_LINES);
        assert_eq!(cfg.effective_safety_lines, DEFAULT_SAFETY_LINES);
        assert_eq!(cfg.header_inset(), HeaderInset::Visible);
        assert!(cfg.growth_tracking());
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_all_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[scroll]\nsafety_lines = 1.5\nheader_inset = \"total\"\n[growth]\nenabled = false\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.effective_safety_lines, 1.5);
        assert_eq!(cfg.header_inset(), HeaderInset::Total);
        assert!(!cfg.growth_tracking());
        assert!(cfg.raw.as_deref().unwrap().contains("safety_lines"));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = parse_str("[scroll]\nheader_inset = \"none\"\n");
        assert_eq!(cfg.header_inset(), HeaderInset::None);
        assert_eq!(cfg.effective_safety_lines, DEFAULT_SAFETY_LINES);
        assert!(cfg.growth_tracking());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults_with_warning() {
        let mut cfg = None;
        let logs = capture_logs(|| {
            cfg = Some(parse_str("[scroll]\nheader_inset = \"sideways\"\n"));
        });
        assert_eq!(cfg.unwrap(), Config::default());
        assert!(logs.contains("WARN config:"), "{logs}");
        assert!(logs.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn clamps_excessive_safety_lines() {
        let mut cfg = None;
        let logs = capture_logs(|| {
            cfg = Some(parse_str("[scroll]\nsafety_lines = 40.0\n"));
        });
        let cfg = cfg.unwrap();
        assert_eq!(cfg.file.scroll.safety_lines, 40.0);
        assert_eq!(cfg.effective_safety_lines, MAX_SAFETY_LINES);
        assert!(logs.contains("INFO config:"), "{logs}");
        assert!(logs.contains("safety_lines_clamped"));
    }

    #[test]
    fn clamps_negative_safety_lines_to_zero() {
        let cfg = parse_str("[scroll]\nsafety_lines = -3.0\n");
        assert_eq!(cfg.effective_safety_lines, 0.0);
    }

    #[test]
    fn non_finite_safety_lines_use_default() {
        let cfg = parse_str("[scroll]\nsafety_lines = nan\n");
        assert_eq!(cfg.effective_safety_lines, DEFAULT_SAFETY_LINES);
    }
}
