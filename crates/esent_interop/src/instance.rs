//! Owned engine instances.

use esent_native::grbit::{CreateInstanceGrbit, TermGrbit};
use esent_native::InstanceHandle;
use tracing::{debug, warn};

use crate::error::InteropResult;
use crate::parameters::InstanceParameters;
use crate::resource::ResourceState;
use crate::Api;

/// An engine instance, terminated on drop.
///
/// Create the instance, adjust its [`parameters`](Self::parameters), then
/// [`init`](Self::init) it before beginning sessions.
#[derive(Debug)]
pub struct Instance {
    api: Api,
    name: String,
    handle: InstanceHandle,
    state: ResourceState,
}

impl Instance {
    /// Creates an instance named `name`.
    pub fn new(api: &Api, name: &str) -> InteropResult<Self> {
        Self::with_display_name(api, name, name)
    }

    /// Creates an instance with a separate display name.
    pub fn with_display_name(api: &Api, name: &str, display_name: &str) -> InteropResult<Self> {
        let mut state = ResourceState::new("instance");
        let handle = api.create_instance2(name, display_name, CreateInstanceGrbit::NONE)?;
        state.resource_was_allocated()?;
        debug!(%handle, name, "created instance");
        Ok(Self {
            api: api.clone(),
            name: name.to_string(),
            handle,
            state,
        })
    }

    /// The instance name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The binding the instance was created with.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The native handle.
    pub fn handle(&self) -> InteropResult<InstanceHandle> {
        self.state.check_not_disposed()?;
        Ok(self.handle)
    }

    /// System parameters of the instance.
    pub fn parameters(&self) -> InteropResult<InstanceParameters<'_>> {
        Ok(self.api.parameters(self.handle()?))
    }

    /// Initializes the instance.
    pub fn init(&mut self) -> InteropResult<()> {
        self.state.check_not_disposed()?;
        self.api.init(&mut self.handle)?;
        debug!(handle = %self.handle, "initialized instance");
        Ok(())
    }

    /// Terminates the instance. Later calls do nothing.
    pub fn term(&mut self) -> InteropResult<()> {
        self.term_with(TermGrbit::NONE)
    }

    /// Terminates the instance with explicit termination flags.
    pub fn term_with(&mut self, grbit: TermGrbit) -> InteropResult<()> {
        let (api, handle) = (&self.api, self.handle);
        self.state.dispose(|state| {
            api.term(handle, grbit)?;
            debug!(%handle, "terminated instance");
            state.resource_was_released()
        })
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        if let Err(error) = self.term() {
            warn!(%error, handle = %self.handle, "failed to terminate instance");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteropError;
    use esent_native::err;

    #[test]
    fn term_is_idempotent() {
        let api = Api::in_memory();
        let mut instance = Instance::new(&api, "once").unwrap();
        instance.init().unwrap();
        instance.term().unwrap();
        instance.term().unwrap();
        assert!(matches!(instance.handle(), Err(InteropError::ObjectDisposed { .. })));
        assert!(matches!(instance.init(), Err(InteropError::ObjectDisposed { .. })));
    }

    #[test]
    fn dropping_frees_the_name() {
        let api = Api::in_memory();
        {
            let mut instance = Instance::new(&api, "reused").unwrap();
            instance.init().unwrap();
        }
        let second = Instance::new(&api, "reused");
        assert!(second.is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let api = Api::in_memory();
        let _first = Instance::new(&api, "taken").unwrap();
        let error = Instance::new(&api, "taken").unwrap_err();
        assert!(error.is(err::INSTANCE_NAME_IN_USE));
    }

    #[test]
    fn parameters_are_set_before_init() {
        let api = Api::in_memory();
        let mut instance = Instance::new(&api, "configured").unwrap();
        instance.parameters().unwrap().set_max_sessions(4).unwrap();
        instance.init().unwrap();
        assert_eq!(instance.parameters().unwrap().max_sessions().unwrap(), 4);
    }
}
