//! # ESENT Native
//!
//! The flat native call surface of the ESENT database engine.
//!
//! This crate provides the lowest-level abstraction used by the interop layer.
//! Every entry point takes opaque handles and primitive buffers and returns a
//! signed 32-bit status code. Nothing here interprets status codes or manages
//! resource lifetimes; that is the job of `esent_interop`.
//!
//! ## Design Principles
//!
//! - The engine is reached only through the [`JetApi`] trait
//! - Status codes are returned, never raised
//! - Absent buffers are `None`, which maps to a null pointer with a zero size
//! - Implementations must be `Send + Sync`
//!
//! ## Available Engines
//!
//! - [`InMemoryEngine`] - For testing, implements the observable status-code
//!   semantics of the real engine without any storage
//! - `EsentLibrary` - The real `esent.dll` (Windows, feature `native`)
//!
//! ## Example
//!
//! ```rust
//! use esent_native::{err, InMemoryEngine, InstanceHandle, JetApi};
//!
//! let engine = InMemoryEngine::new();
//! let mut instance = InstanceHandle::NIL;
//! assert_eq!(engine.create_instance(&mut instance, "example"), err::SUCCESS);
//! assert_eq!(engine.init(&mut instance), err::SUCCESS);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod api;
pub mod codes;
pub mod grbit;
mod handles;
mod memory;
mod types;

#[cfg(all(windows, feature = "native"))]
mod esent;

pub use api::JetApi;
pub use codes::{describe, err, wrn, JetErr};
pub use handles::{ColumnId, DatabaseHandle, InstanceHandle, SessionHandle, TableHandle};
pub use memory::InMemoryEngine;
pub use types::{
    CodePage, ColumnDef, ColumnList, ColumnType, EnumColumn, EnumColumnId, EnumColumnValue,
    IndexList, IndexRange, ObjectList, ObjectType, ParamId, Prep, RecordList, RecordPosition,
    RetrieveInfo, SetInfo, BOOKMARK_MOST, KEY_MOST, MOVE_FIRST, MOVE_LAST, MOVE_NEXT,
    MOVE_PREVIOUS,
};

#[cfg(all(windows, feature = "native"))]
pub use esent::EsentLibrary;
