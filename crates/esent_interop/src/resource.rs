//! Lifetime tracking shared by the resource wrappers.

use crate::error::{InteropError, InteropResult};

/// Two-flag lifetime state of a wrapper around an engine resource.
///
/// A wrapper marks the resource allocated once the engine hands it out and
/// released once the engine takes it back. Disposal runs the release hook at
/// most once; afterwards every use fails with
/// [`InteropError::ObjectDisposed`].
#[derive(Debug)]
pub struct ResourceState {
    object: &'static str,
    has_resource: bool,
    is_disposed: bool,
}

impl ResourceState {
    /// State for a wrapper of kind `object`, holding nothing yet.
    #[must_use]
    pub const fn new(object: &'static str) -> Self {
        Self {
            object,
            has_resource: false,
            is_disposed: false,
        }
    }

    /// True while the engine resource is held.
    #[must_use]
    pub const fn has_resource(&self) -> bool {
        self.has_resource
    }

    /// True once disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.is_disposed
    }

    /// Fails with `ObjectDisposed` once disposed.
    pub fn check_not_disposed(&self) -> InteropResult<()> {
        if self.is_disposed {
            return Err(InteropError::object_disposed(self.object));
        }
        Ok(())
    }

    /// Records that the engine resource now exists.
    pub fn resource_was_allocated(&mut self) -> InteropResult<()> {
        self.check_not_disposed()?;
        self.has_resource = true;
        Ok(())
    }

    /// Records that the engine resource has been freed.
    pub fn resource_was_released(&mut self) -> InteropResult<()> {
        self.check_not_disposed()?;
        self.has_resource = false;
        Ok(())
    }

    /// Disposes the wrapper, running `release` if a resource is held.
    ///
    /// Calling this again is a no-op. `release` must call
    /// [`resource_was_released`](Self::resource_was_released) when it
    /// succeeds. If it fails, the error is returned and the wrapper is still
    /// disposed, since the engine handle cannot be trusted afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `release` succeeds without releasing the resource.
    pub fn dispose(
        &mut self,
        release: impl FnOnce(&mut Self) -> InteropResult<()>,
    ) -> InteropResult<()> {
        if self.is_disposed {
            return Ok(());
        }
        let result = if self.has_resource {
            let result = release(self);
            assert!(
                result.is_err() || !self.has_resource,
                "release of {} did not free the resource",
                self.object
            );
            result
        } else {
            Ok(())
        };
        self.has_resource = false;
        self.is_disposed = true;
        result
    }
}
