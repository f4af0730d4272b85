//! Session authentication.
//!
//! - [`session`] -- resolves a bearer header to an [`Identity`](decklab_core::auth::Identity)
//!   against the session store.

pub mod session;
