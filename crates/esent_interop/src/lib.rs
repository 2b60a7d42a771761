//! # ESENT Interop
//!
//! Safe, typed bindings over the flat ESENT call surface in `esent_native`.
//!
//! This crate provides:
//! - [`Api`], a binding context that turns status codes into
//!   [`InteropError`]s and [`JetWarning`]s
//! - Typed column marshaling with the two-phase retrieval protocol
//! - Try-pattern navigation that reports "no record" as `false`
//! - [`ColumnStream`], a `Read + Write + Seek` view of a long value
//! - Metadata enumeration over the engine's temporary list tables
//! - Owned resources ([`Instance`], [`Session`], [`Table`], [`Transaction`],
//!   [`Update`]) released on drop in dependency order
//!
//! ## Example
//!
//! ```rust
//! use esent_interop::{Api, Instance, Session};
//! use esent_native::grbit::{CreateDatabaseGrbit, CreateIndexGrbit};
//! use esent_native::{ColumnDef, ColumnType, Prep};
//!
//! # fn main() -> esent_interop::InteropResult<()> {
//! let api = Api::in_memory();
//! let mut instance = Instance::new(&api, "example")?;
//! instance.init()?;
//! let session = Session::new(&instance)?;
//! let dbid = session.create_database("example.edb", CreateDatabaseGrbit::NONE)?;
//!
//! let table = session.create_table(dbid, "counters")?;
//! let long = ColumnDef { coltyp: ColumnType::Long, ..ColumnDef::default() };
//! let id = table.add_column("id", &long, None)?;
//! table.create_index("primary", CreateIndexGrbit::INDEX_PRIMARY, "+id\0\0")?;
//!
//! let mut transaction = session.begin_transaction()?;
//! let mut update = table.update(Prep::Insert)?;
//! update.set_value(id, 42i32)?;
//! update.save_and_goto_bookmark()?;
//! drop(update);
//! transaction.commit(Default::default())?;
//!
//! assert_eq!(table.retrieve::<i32>(id)?, Some(42));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod buffer;
mod config;
mod encoding;
mod enumerator;
mod error;
mod instance;
mod make_key;
mod metadata;
mod navigation;
mod parameters;
mod resource;
mod retrieve;
mod session;
mod set;
mod status;
mod stream;
mod table;
mod transaction;
mod update;
mod value;

#[cfg(test)]
mod test_support;

pub use api::Api;
pub use config::Config;
pub use encoding::Encoding;
pub use enumerator::TableEnumerator;
pub use error::{InteropError, InteropResult};
pub use instance::Instance;
pub use metadata::{ColumnDictionary, ColumnInfo, IndexInfo, IndexSegment};
pub use navigation::Bookmark;
pub use parameters::InstanceParameters;
pub use resource::ResourceState;
pub use session::Session;
pub use status::{ErrorHook, JetWarning};
pub use stream::{ColumnStream, MAX_LONG_VALUE_OFFSET};
pub use table::Table;
pub use transaction::Transaction;
pub use update::Update;
pub use value::{FixedColumn, OleDateTime};
