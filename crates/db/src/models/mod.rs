//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching database rows or joined reads
//! - plain input DTOs consumed by the repositories

pub mod card;
pub mod deck;
pub mod session;
