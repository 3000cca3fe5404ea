//! Trigger configuration.
//!
//! The defaults match an inspector attached with `-agentpath:<module>`, whose handshake file sits
//! next to the module with a `.dat` extension and whose signal file uses `.sig`.

use std::path::{Path, PathBuf};

/// Names and extensions the trigger uses to find the inspector's shared files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerConfig {
    pub(crate) marker: String,
    pub(crate) delimiter: char,
    pub(crate) module_extensions: Vec<String>,
    pub(crate) data_extension: String,
    pub(crate) signal_extension: String,
}

impl TriggerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix of the launch argument announcing the inspector.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Character separating the marker from the module path.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Extensions recognized as the inspector module, compared case-insensitively.
    pub fn module_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.module_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Extension of the handshake file.
    pub fn data_extension(mut self, extension: impl Into<String>) -> Self {
        self.data_extension = extension.into();
        self
    }

    /// Extension of the signal file.
    pub fn signal_extension(mut self, extension: impl Into<String>) -> Self {
        self.signal_extension = extension.into();
        self
    }

    /// Signal file matching a handshake file.
    pub fn signal_path(&self, handshake: &Path) -> PathBuf {
        handshake.with_extension(&self.signal_extension)
    }

    pub(crate) fn is_module_extension(&self, extension: &str) -> bool {
        self.module_extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension))
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            marker: "-agentpath".to_owned(),
            delimiter: ':',
            module_extensions: vec!["dll".to_owned(), "so".to_owned(), "dylib".to_owned()],
            data_extension: "dat".to_owned(),
            signal_extension: "sig".to_owned(),
        }
    }
}
