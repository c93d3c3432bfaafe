//! Command implementations.
//!
//! Output goes to stdout; logs and errors go to stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod reviews;
