//! Configuration loading and parsing.
//!
//! Parses `calced.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [format]
//! grouping_separator = " "   # empty string disables grouping
//! decimal_point = "."
//! highlight = true           # false disables the formatting pass
//!
//! [runtime]
//! log_filter = "info"        # used when RUST_LOG is unset
//! ```
//!
//! A missing file yields defaults. A file that fails to parse also yields
//! defaults, with a `warn!` on the `config` target. Unknown fields are ignored.
//! Strings are validated when converted into a `NumberFormat`: only the first
//! char is used, and a grouping separator equal to the decimal point disables
//! grouping.

use anyhow::Result;
use core_text::NumberFormat;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "calced.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    #[serde(default = "FormatConfig::default_grouping_separator")]
    pub grouping_separator: String,
    #[serde(default = "FormatConfig::default_decimal_point")]
    pub decimal_point: String,
    #[serde(default = "FormatConfig::default_highlight")]
    pub highlight: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            grouping_separator: Self::default_grouping_separator(),
            decimal_point: Self::default_decimal_point(),
            highlight: Self::default_highlight(),
        }
    }
}

impl FormatConfig {
    fn default_grouping_separator() -> String {
        " ".to_string()
    }
    fn default_decimal_point() -> String {
        ".".to_string()
    }
    const fn default_highlight() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    #[serde(default = "RuntimeConfig::default_log_filter")]
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_filter: Self::default_log_filter(),
        }
    }
}

impl RuntimeConfig {
    fn default_log_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,  // original file string (optional)
    pub path: Option<PathBuf>, // where it was read from
    pub file: ConfigFile,     // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("calced").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            path: Some(path),
            file,
        }),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

fn first_char(field: &'static str, value: &str) -> Option<char> {
    let mut chars = value.chars();
    let first = chars.next();
    if chars.next().is_some() {
        warn!(target: "config", field, len = value.chars().count(), "multi_char_value_truncated");
    }
    first
}

impl Config {
    /// Number format the classifier and formatter should use.
    pub fn number_format(&self) -> NumberFormat {
        let fmt = &self.file.format;
        let decimal_point = first_char("decimal_point", &fmt.decimal_point).unwrap_or('.');
        let mut grouping_separator = first_char("grouping_separator", &fmt.grouping_separator);
        if grouping_separator == Some(decimal_point) {
            warn!(target: "config", "grouping_separator_conflicts_with_decimal_point");
            grouping_separator = None;
        }
        NumberFormat::new(grouping_separator, decimal_point)
    }

    pub fn highlight(&self) -> bool {
        self.file.format.highlight
    }

    pub fn log_filter(&self) -> &str {
        &self.file.runtime.log_filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
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

    fn captured<F: FnOnce()>(f: F) -> String {
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

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.number_format(), NumberFormat::new(Some(' '), '.'));
        assert!(cfg.highlight());
        assert_eq!(cfg.log_filter(), "info");
    }

    #[test]
    fn parses_format_section() {
        let tmp = write_config(
            "[format]\ngrouping_separator = \"'\"\ndecimal_point = \",\"\nhighlight = false\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.number_format(), NumberFormat::new(Some('\''), ','));
        assert!(!cfg.highlight());
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn empty_separator_disables_grouping() {
        let tmp = write_config("[format]\ngrouping_separator = \"\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.number_format().grouping_separator, None);
    }

    #[test]
    fn parses_runtime_section() {
        let tmp = write_config("[runtime]\nlog_filter = \"calced=debug\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.log_filter(), "calced=debug");
        assert_eq!(cfg.file.format, FormatConfig::default());
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = write_config("[format\nhighlight = ");
        let mut cfg = None;
        let logs = captured(|| {
            cfg = Some(load_from(Some(tmp.path().to_path_buf())).unwrap());
        });
        let cfg = cfg.unwrap();
        assert!(cfg.raw.is_none());
        assert!(cfg.highlight());
        assert!(logs.contains("WARN config:"));
        assert!(logs.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn separator_equal_to_decimal_point_is_dropped() {
        let tmp = write_config("[format]\ngrouping_separator = \",\"\ndecimal_point = \",\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let logs = captured(|| {
            assert_eq!(cfg.number_format(), NumberFormat::new(None, ','));
        });
        assert!(logs.contains("grouping_separator_conflicts_with_decimal_point"));
    }

    #[test]
    fn multi_char_values_use_first_char() {
        let tmp = write_config("[format]\ngrouping_separator = \"_x\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.number_format().grouping_separator, Some('_'));
    }
}
