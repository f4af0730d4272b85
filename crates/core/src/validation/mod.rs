//! Deck construction rules.
//!
//! Pure logic, no database access: a verdict can be computed from the three
//! submitted zones alone.

pub mod deck;
