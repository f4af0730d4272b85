//! Use-case orchestration between handlers and the store.

pub mod decks;

pub use decks::DeckService;
