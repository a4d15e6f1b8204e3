//! SQLite backend for the accreditation records store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every multi-statement operation runs
//! inside a single SQLite transaction on that thread.

mod accounts;
mod checklist;
mod courses;
mod encode;
mod evidence;
mod faculty;
mod outcomes;
mod programs;
mod schema;
mod sections;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
