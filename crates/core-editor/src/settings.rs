use core_config::Config;
use core_text::NumberFormat;

/// Editor construction/reconfiguration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    pub format: NumberFormat,
    /// Run the formatting pass after text changes.
    pub highlight: bool,
}

impl EditorSettings {
    pub fn new(format: NumberFormat, highlight: bool) -> Self {
        Self { format, highlight }
    }

    /// Same number format, formatting pass disabled (every transition completes synchronously).
    pub fn without_highlight(self) -> Self {
        Self {
            highlight: false,
            ..self
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self::new(NumberFormat::default(), true)
    }
}

impl From<&Config> for EditorSettings {
    fn from(config: &Config) -> Self {
        Self::new(config.number_format(), config.highlight())
    }
}
