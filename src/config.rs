/// Default upper bound on a single encoded record (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 << 20;

/// Decoding options.
///
/// ```rust
/// use protolite::CodecConfig;
///
/// let config = CodecConfig::default()
///     .with_preserve_unknown_fields(false)
///     .with_max_message_size(1 << 20);
/// assert!(!config.preserve_unknown_fields);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Capture unrecognized fields for re-encoding. When off they are still
    /// consumed and bounds-checked, then dropped.
    pub preserve_unknown_fields: bool,
    /// Inputs longer than this are rejected before any decoding.
    pub max_message_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            preserve_unknown_fields: true,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl CodecConfig {
    pub fn with_preserve_unknown_fields(mut self, preserve: bool) -> Self {
        self.preserve_unknown_fields = preserve;
        self
    }

    pub fn with_max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = limit;
        self
    }
}
