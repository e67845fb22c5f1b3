//! Document persistence
//!
//! Records are stored as JSON documents, one table per record type, with a
//! side table of secondary index values. [`Store`] is the interface the rest
//! of the code uses; [`SqliteStore`] implements it and [`LoggedStore`]
//! decorates any store with save logging.

pub mod init;
pub mod logged;
pub mod sqlite;
pub mod store;

pub use init::{init_database, init_memory_database};
pub use logged::LoggedStore;
pub use sqlite::SqliteStore;
pub use store::{Document, Store};
