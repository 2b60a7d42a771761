//! Interop configuration.

use esent_native::CodePage;

use crate::encoding::Encoding;
use crate::error::{InteropError, InteropResult};

/// Configuration for an [`Api`](crate::Api) context.
#[derive(Debug, Clone)]
pub struct Config {
    /// Size of the scratch buffer used for the first retrieval attempt.
    pub buffer_size: usize,

    /// Largest buffer the pool keeps for reuse.
    pub max_cached_buffer_size: usize,

    /// Code page used for text when the caller does not name one.
    pub default_code_page: CodePage,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: 32 * 1024,            // 32 KiB
            max_cached_buffer_size: 64 * 1024, // 64 KiB
            default_code_page: CodePage::UNICODE,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scratch buffer size.
    #[must_use]
    pub const fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets the largest buffer kept for reuse.
    #[must_use]
    pub const fn max_cached_buffer_size(mut self, size: usize) -> Self {
        self.max_cached_buffer_size = size;
        self
    }

    /// Sets the default text code page.
    #[must_use]
    pub const fn default_code_page(mut self, code_page: CodePage) -> Self {
        self.default_code_page = code_page;
        self
    }

    /// Checks the configuration for consistency.
    pub fn validate(&self) -> InteropResult<()> {
        if self.buffer_size == 0 {
            return Err(InteropError::invalid_argument("buffer size must be positive"));
        }
        if self.max_cached_buffer_size < self.buffer_size {
            return Err(InteropError::invalid_argument(
                "maximum cached buffer size is smaller than the buffer size",
            ));
        }
        Encoding::for_code_page(self.default_code_page)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.buffer_size, 32 * 1024);
        assert_eq!(config.max_cached_buffer_size, 64 * 1024);
        assert_eq!(config.default_code_page, CodePage::UNICODE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .buffer_size(16)
            .max_cached_buffer_size(32)
            .default_code_page(CodePage::ASCII);

        assert_eq!(config.buffer_size, 16);
        assert_eq!(config.max_cached_buffer_size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inconsistent_sizes() {
        assert!(Config::new().buffer_size(0).validate().is_err());
        assert!(Config::new().buffer_size(128).max_cached_buffer_size(64).validate().is_err());
    }

    #[test]
    fn rejects_unsupported_code_page() {
        let result = Config::new().default_code_page(CodePage(437)).validate();
        assert!(matches!(result, Err(InteropError::InvalidEncoding { code_page: 437 })));
    }
}
