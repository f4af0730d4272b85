//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads take `&PgPool`; writes that must share a transaction take
//! `&mut PgConnection` so callers can pass `&mut *tx`.

pub mod card_repo;
pub mod deck_card_repo;
pub mod deck_repo;
pub mod session_repo;

pub use card_repo::CardRepo;
pub use deck_card_repo::DeckCardRepo;
pub use deck_repo::DeckRepo;
pub use session_repo::SessionRepo;

/// Escape `LIKE` wildcards in user input and wrap it for a substring match.
pub(crate) fn contains_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
