//! # ESENT Testkit
//!
//! Test utilities for the ESENT bindings.
//!
//! This crate provides:
//! - Test fixtures: an initialized instance, session and database on the
//!   in-memory engine
//! - Property-based test generators using proptest
//! - Concurrent escrow stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use esent_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_database() {
//!     let db = TestDatabase::memory();
//!     let table = scenarios::record_table(&db, "records");
//!     scenarios::insert_record(&db, &table, 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
