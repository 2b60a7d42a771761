//! Engine warnings and the error translation hook.

use std::fmt;
use std::sync::Arc;

use esent_native::{describe, JetErr};

use crate::error::InteropError;

/// A non-negative engine status.
///
/// Zero means plain success. Positive values are warnings such as
/// `JET_wrnColumnNull` or `JET_wrnSeekNotEqual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JetWarning(pub JetErr);

impl JetWarning {
    /// Plain success.
    pub const NONE: Self = Self(0);

    /// Returns the raw status.
    #[must_use]
    pub const fn code(self) -> JetErr {
        self.0
    }

    /// Returns true for plain success.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this is the warning `code`.
    #[must_use]
    pub const fn is(self, code: JetErr) -> bool {
        self.0 == code
    }
}

impl fmt::Display for JetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match describe(self.0) {
            Some((name, _)) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Hook consulted for every engine error.
///
/// Returning `Some` replaces the error; `None` keeps it.
pub type ErrorHook = Arc<dyn Fn(&InteropError) -> Option<InteropError> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use esent_native::wrn;

    #[test]
    fn display_uses_engine_names() {
        assert_eq!(JetWarning(wrn::COLUMN_NULL).to_string(), "JET_wrnColumnNull");
        assert_eq!(JetWarning(424242).to_string(), "424242");
    }

    #[test]
    fn none_is_success() {
        assert!(JetWarning::NONE.is_none());
        assert!(!JetWarning(wrn::SEEK_NOT_EQUAL).is_none());
        assert!(JetWarning(wrn::SEEK_NOT_EQUAL).is(wrn::SEEK_NOT_EQUAL));
    }
}
