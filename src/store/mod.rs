//! In-memory stores shared by all concurrent requests.
//!
//! Both stores are cheap to clone; clones share the same underlying map.

pub mod bans;
pub mod sessions;

pub use bans::AccessControlStore;
pub use sessions::{Session, SessionStore};
