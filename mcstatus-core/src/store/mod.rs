//! Group-scoped server configuration store
//!
//! This module provides the `ServerStore`, which owns the server tree of every
//! group and mediates all reads and mutations of it, persisting through a
//! [`GroupStorage`] backend.

mod backend;
mod manager;

pub use backend::{GroupStorage, MemoryStorage};
pub use manager::{AddOutcome, ServerStore};
