//! Typed access to instance system parameters.

use esent_native::{InstanceHandle, ParamId, SessionHandle};

use crate::error::InteropResult;
use crate::Api;

/// Longest string parameter read back from the engine.
const MAX_STRING_PARAMETER: usize = 1024;

/// System parameters of one instance.
///
/// With [`InstanceHandle::NIL`] the accessors read and write the process-wide
/// defaults used by instances created afterwards. Path, log and page size
/// parameters can only be changed before the instance is initialized.
#[derive(Debug, Clone, Copy)]
pub struct InstanceParameters<'a> {
    api: &'a Api,
    instance: InstanceHandle,
}

macro_rules! integer_parameter {
    ($get:ident, $set:ident, $param:ident, $doc:literal) => {
        #[doc = concat!("Returns ", $doc, ".")]
        pub fn $get(&self) -> InteropResult<usize> {
            self.integer(ParamId::$param)
        }

        #[doc = concat!("Sets ", $doc, ".")]
        pub fn $set(&self, value: usize) -> InteropResult<()> {
            self.set_integer(ParamId::$param, value)
        }
    };
}

macro_rules! bool_parameter {
    ($get:ident, $set:ident, $param:ident, $doc:literal) => {
        #[doc = concat!("Returns whether ", $doc, ".")]
        pub fn $get(&self) -> InteropResult<bool> {
            Ok(self.integer(ParamId::$param)? != 0)
        }

        #[doc = concat!("Sets whether ", $doc, ".")]
        pub fn $set(&self, value: bool) -> InteropResult<()> {
            self.set_integer(ParamId::$param, usize::from(value))
        }
    };
}

macro_rules! string_parameter {
    ($get:ident, $set:ident, $param:ident, $doc:literal) => {
        #[doc = concat!("Returns ", $doc, ".")]
        pub fn $get(&self) -> InteropResult<String> {
            self.string(ParamId::$param)
        }

        #[doc = concat!("Sets ", $doc, ".")]
        pub fn $set(&self, value: &str) -> InteropResult<()> {
            self.set_string(ParamId::$param, value)
        }
    };
}

impl<'a> InstanceParameters<'a> {
    /// Parameters of `instance`.
    #[must_use]
    pub fn new(api: &'a Api, instance: InstanceHandle) -> Self {
        Self { api, instance }
    }

    /// The instance whose parameters are accessed.
    #[must_use]
    pub fn instance(&self) -> InstanceHandle {
        self.instance
    }

    string_parameter!(
        system_directory,
        set_system_directory,
        SYSTEM_PATH,
        "the checkpoint file directory"
    );
    string_parameter!(temp_directory, set_temp_directory, TEMP_PATH, "the temporary database path");
    string_parameter!(
        log_file_directory,
        set_log_file_directory,
        LOG_FILE_PATH,
        "the transaction log directory"
    );
    string_parameter!(base_name, set_base_name, BASE_NAME, "the three-letter log file prefix");

    integer_parameter!(max_sessions, set_max_sessions, MAX_SESSIONS, "the session limit");
    integer_parameter!(
        max_open_tables,
        set_max_open_tables,
        MAX_OPEN_TABLES,
        "the open table limit"
    );
    integer_parameter!(max_cursors, set_max_cursors, MAX_CURSORS, "the cursor limit");
    integer_parameter!(
        max_ver_pages,
        set_max_ver_pages,
        MAX_VER_PAGES,
        "the version store size in pages"
    );
    integer_parameter!(log_file_size, set_log_file_size, LOG_FILE_SIZE, "the log file size in KiB");
    integer_parameter!(
        database_page_size,
        set_database_page_size,
        DATABASE_PAGE_SIZE,
        "the database page size in bytes"
    );

    bool_parameter!(
        circular_log,
        set_circular_log,
        CIRCULAR_LOG,
        "log files are reused once checkpointed"
    );
    bool_parameter!(
        create_path_if_not_exist,
        set_create_path_if_not_exist,
        CREATE_PATH_IF_NOT_EXIST,
        "missing directories are created"
    );
    bool_parameter!(
        no_information_event,
        set_no_information_event,
        NO_INFORMATION_EVENT,
        "informational event log entries are suppressed"
    );

    /// Returns whether crash recovery is enabled.
    pub fn recovery(&self) -> InteropResult<bool> {
        Ok(!self.string(ParamId::RECOVERY)?.eq_ignore_ascii_case("off"))
    }

    /// Enables or disables crash recovery.
    pub fn set_recovery(&self, value: bool) -> InteropResult<()> {
        self.set_string(ParamId::RECOVERY, if value { "On" } else { "Off" })
    }

    fn integer(&self, paramid: ParamId) -> InteropResult<usize> {
        let (value, _) = self
            .api
            .get_system_parameter(self.instance, SessionHandle::NIL, paramid, 0)?;
        Ok(value)
    }

    fn string(&self, paramid: ParamId) -> InteropResult<String> {
        let (_, string) = self.api.get_system_parameter(
            self.instance,
            SessionHandle::NIL,
            paramid,
            MAX_STRING_PARAMETER,
        )?;
        Ok(string)
    }

    fn set_integer(&self, paramid: ParamId, value: usize) -> InteropResult<()> {
        self.api
            .set_system_parameter(self.instance, SessionHandle::NIL, paramid, value, None)?;
        Ok(())
    }

    fn set_string(&self, paramid: ParamId, value: &str) -> InteropResult<()> {
        self.api
            .set_system_parameter(self.instance, SessionHandle::NIL, paramid, 0, Some(value))?;
        Ok(())
    }
}

impl Api {
    /// Typed system parameters of `instance`.
    #[must_use]
    pub fn parameters(&self, instance: InstanceHandle) -> InstanceParameters<'_> {
        InstanceParameters::new(self, instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esent_native::err;

    #[test]
    fn defaults_are_readable() {
        let api = Api::in_memory();
        let instance = api.create_instance("params").unwrap();
        let parameters = api.parameters(instance);
        assert_eq!(parameters.base_name().unwrap(), "edb");
        assert_eq!(parameters.database_page_size().unwrap(), 8192);
        assert!(parameters.recovery().unwrap());
        assert!(!parameters.circular_log().unwrap());
    }

    #[test]
    fn values_round_trip_per_instance() {
        let api = Api::in_memory();
        let instance = api.create_instance("params").unwrap();
        let other = api.create_instance("other").unwrap();
        let parameters = api.parameters(instance);
        parameters.set_max_sessions(64).unwrap();
        parameters.set_log_file_directory("logs\\").unwrap();
        parameters.set_recovery(false).unwrap();
        parameters.set_circular_log(true).unwrap();

        assert_eq!(parameters.max_sessions().unwrap(), 64);
        assert_eq!(parameters.log_file_directory().unwrap(), "logs\\");
        assert!(!parameters.recovery().unwrap());
        assert!(parameters.circular_log().unwrap());
        assert_eq!(api.parameters(other).max_sessions().unwrap(), 16);
    }

    #[test]
    fn startup_parameters_are_frozen_after_init() {
        let api = Api::in_memory();
        let mut instance = api.create_instance("params").unwrap();
        api.init(&mut instance).unwrap();
        let parameters = api.parameters(instance);
        let error = parameters.set_base_name("abc").unwrap_err();
        assert!(error.is(err::ALREADY_INITIALIZED));
        parameters.set_max_cursors(10).unwrap();
        assert_eq!(parameters.max_cursors().unwrap(), 10);
    }
}
