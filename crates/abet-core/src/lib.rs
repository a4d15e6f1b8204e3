//! Core types and trait definitions for the ABET accreditation records store.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! completion calculators, progress aggregation and field validators live
//! here so every backend and every surface applies the same rules.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod checklist;
pub mod completion;
pub mod course;
pub mod error;
pub mod evidence;
pub mod faculty;
pub mod outcome;
pub mod program;
pub mod section;
pub mod slot;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use validate::FieldErrors;
