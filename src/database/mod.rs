//! Val Browser database layer.
//!
//! SQLite connection management and schema migrations for bookmarks,
//! history and the download list.
//!
//! ```no_run
//! use valbrowser::database::Database;
//!
//! let db = Database::open("valbrowser.db").expect("failed to open database");
//! let conn = db.connection();
//! # let _ = conn;
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
