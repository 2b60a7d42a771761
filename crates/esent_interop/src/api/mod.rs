//! The binding context and typed wrappers over every native call.
//!
//! Each wrapper converts its arguments, makes exactly one native call and
//! passes the status through [`Api::check`]. Warnings are returned to the
//! caller as [`JetWarning`]; errors become [`InteropError::Engine`].

mod ddl;
mod dml;
mod lifecycle;
mod navigation;

use std::fmt;
use std::sync::Arc;

use esent_native::{InMemoryEngine, InstanceHandle, JetApi, JetErr, ParamId, SessionHandle};
use parking_lot::RwLock;
use tracing::error;

use crate::buffer::BufferPool;
use crate::config::Config;
use crate::error::{InteropError, InteropResult};
use crate::status::{ErrorHook, JetWarning};

/// Size of the buffer used to fetch error descriptions.
const ERROR_TEXT_SIZE: u32 = 1024;

/// Description used when the engine cannot describe an error.
const UNKNOWN_ERROR: &str = "<unknown>";

struct ApiInner {
    engine: Arc<dyn JetApi>,
    config: Config,
    buffers: BufferPool,
    hook: RwLock<Option<ErrorHook>>,
}

/// A binding context: an engine, its configuration and the error hook.
///
/// Cloning is cheap; clones share the engine, the buffer pool and the hook.
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("config", &self.inner.config)
            .field("hook", &self.inner.hook.read().is_some())
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Creates a context over `engine`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent or names an
    /// unsupported code page.
    pub fn new(engine: Arc<dyn JetApi>, config: Config) -> InteropResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(engine, config))
    }

    /// Creates a context over a fresh in-memory engine with the default
    /// configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_valid_config(Arc::new(InMemoryEngine::new()), Config::default())
    }

    fn with_valid_config(engine: Arc<dyn JetApi>, config: Config) -> Self {
        let buffers = BufferPool::new(config.buffer_size, config.max_cached_buffer_size);
        Self {
            inner: Arc::new(ApiInner {
                engine,
                config,
                buffers,
                hook: RwLock::new(None),
            }),
        }
    }

    /// Creates a context over the system `esent.dll`.
    #[cfg(all(windows, feature = "native"))]
    pub fn native(config: Config) -> InteropResult<Self> {
        Self::new(Arc::new(esent_native::EsentLibrary::new()), config)
    }

    /// The engine behind this context.
    #[must_use]
    pub fn engine(&self) -> &dyn JetApi {
        self.inner.engine.as_ref()
    }

    /// The configuration of this context.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub(crate) fn buffers(&self) -> &BufferPool {
        &self.inner.buffers
    }

    /// Installs or clears the error hook.
    pub fn set_error_hook(&self, hook: Option<ErrorHook>) {
        *self.inner.hook.write() = hook;
    }

    /// Translates a native status.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::Engine`], or the hook's substitute, for a
    /// negative status.
    pub fn check(&self, status: JetErr) -> InteropResult<JetWarning> {
        if status >= 0 {
            return Ok(JetWarning(status));
        }
        let engine_error = InteropError::Engine {
            code: status,
            description: self.describe_error(status),
        };
        let hook = self.inner.hook.read().clone();
        match hook.and_then(|hook| hook(&engine_error)) {
            Some(replacement) => {
                error!(code = status, %replacement, "error hook replaced engine error");
                Err(replacement)
            }
            None => Err(engine_error),
        }
    }

    /// Asks the engine to describe a status code.
    fn describe_error(&self, code: JetErr) -> String {
        // The code travels through the integer parameter, sign-extended.
        let mut value = code as isize as usize;
        let mut text = String::new();
        let status = self.engine().get_system_parameter(
            InstanceHandle::NIL,
            SessionHandle::NIL,
            ParamId::ERROR_TO_STRING,
            &mut value,
            &mut text,
            ERROR_TEXT_SIZE,
        );
        if status < 0 || text.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            text
        }
    }
}

/// Converts a buffer length to the native 32-bit size.
pub(crate) fn native_size(len: usize) -> InteropResult<u32> {
    u32::try_from(len).map_err(|_| InteropError::invalid_argument("buffer is larger than 4 GiB"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use esent_native::{err, wrn};

    #[test]
    fn in_memory_context_matches_an_explicit_one() {
        let implicit = Api::in_memory();
        let explicit = Api::new(Arc::new(InMemoryEngine::new()), Config::default()).unwrap();
        assert_eq!(implicit.config().buffer_size, explicit.config().buffer_size);
        assert_eq!(implicit.config().default_code_page, explicit.config().default_code_page);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let config = Config::new().buffer_size(0);
        assert!(Api::new(Arc::new(InMemoryEngine::new()), config).is_err());
    }

    #[test]
    fn zero_and_warnings_are_returned() {
        let api = Api::in_memory();
        assert_eq!(api.check(err::SUCCESS).unwrap(), JetWarning::NONE);
        assert_eq!(api.check(wrn::COLUMN_NULL).unwrap(), JetWarning(wrn::COLUMN_NULL));
    }

    #[test]
    fn errors_carry_engine_description() {
        let api = Api::in_memory();
        let error = api.check(err::WRITE_CONFLICT).unwrap_err();
        assert!(error.is(err::WRITE_CONFLICT));
        let InteropError::Engine { description, .. } = error else {
            panic!("not an engine error");
        };
        assert!(description.starts_with("JET_errWriteConflict"));
    }

    #[test]
    fn unknown_codes_still_get_a_description() {
        let api = Api::in_memory();
        let error = api.check(-31337).unwrap_err();
        assert!(error.is(-31337));
    }

    #[test]
    fn hook_can_replace_errors() {
        #[derive(Debug, thiserror::Error)]
        #[error("conflict, retry later")]
        struct Retry;

        let api = Api::in_memory();
        api.set_error_hook(Some(Arc::new(|e: &InteropError| {
            e.is(err::WRITE_CONFLICT)
                .then(|| InteropError::Translated(Box::new(Retry)))
        })));
        let error = api.check(err::WRITE_CONFLICT).unwrap_err();
        assert_eq!(error.to_string(), "conflict, retry later");
        assert!(api.check(err::RECORD_NOT_FOUND).unwrap_err().is(err::RECORD_NOT_FOUND));

        api.set_error_hook(None);
        assert!(api.check(err::WRITE_CONFLICT).unwrap_err().is(err::WRITE_CONFLICT));
    }

    #[test]
    fn invalid_config_is_rejected_before_use() {
        let engine: Arc<dyn JetApi> = Arc::new(InMemoryEngine::new());
        let config = Config::new().default_code_page(esent_native::CodePage(850));
        assert!(matches!(
            Api::new(engine, config),
            Err(InteropError::InvalidEncoding { code_page: 850 })
        ));
    }
}
