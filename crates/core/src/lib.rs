//! Domain logic for the deck builder.
//!
//! Everything in this crate is pure: no database, no HTTP, no clocks. The
//! `db` and `api` crates build on these types.

pub mod auth;
pub mod deck;
pub mod error;
pub mod search;
pub mod types;
pub mod validation;
