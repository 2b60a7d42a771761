//! CLI command implementations.

pub mod create_sample;
pub mod dump_csv;
pub mod dump_metadata;

use std::io;

use clap::ValueEnum;
use esent_interop::{Api, Instance, InteropError, Session};
use esent_native::grbit::{AttachDatabaseGrbit, OpenDatabaseGrbit};
use esent_native::DatabaseHandle;
use thiserror::Error;
use tracing::debug;

/// Errors reported by the commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A binding call failed.
    #[error(transparent)]
    Interop(#[from] InteropError),

    /// Writing output failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Serializing output failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for the commands.
pub type CliResult<T> = Result<T, CliError>;

/// How a report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Binding over the engine this build uses.
#[cfg(all(windows, feature = "native"))]
pub fn open_api() -> CliResult<Api> {
    Ok(Api::native(esent_interop::Config::default())?)
}

/// Binding over the engine this build uses.
#[cfg(not(all(windows, feature = "native")))]
pub fn open_api() -> CliResult<Api> {
    debug!("using the in-memory engine");
    Ok(Api::in_memory())
}

/// Runs `f` with `database` attached and opened read-only on a fresh
/// instance named `instance_name`, without crash recovery.
pub fn with_read_only_database<R>(
    api: &Api,
    instance_name: &str,
    database: &str,
    f: impl FnOnce(&Session<'_>, DatabaseHandle) -> CliResult<R>,
) -> CliResult<R> {
    let mut instance = Instance::new(api, instance_name)?;
    instance.parameters()?.set_recovery(false)?;
    instance.init()?;
    let result = {
        let session = Session::new(&instance)?;
        session.attach_database(database, AttachDatabaseGrbit::READ_ONLY)?;
        let dbid = session.open_database(database, OpenDatabaseGrbit::READ_ONLY)?;
        debug!(database, %dbid, "opened database read-only");
        f(&session, dbid)
    };
    instance.term()?;
    result
}
