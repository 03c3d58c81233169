//! Core data models for `mcstatus`
//!
//! This module defines the stored configuration tree (groups and server
//! nodes), the named attribute dispatch used by commands, and the live status
//! records merged onto the tree for display.

mod attribute;
mod group;
mod server;
mod status;
pub mod tree;

pub use attribute::{AttributeValue, ServerAttribute, IDENTITY_FIELD};
pub use group::GroupConfig;
pub use server::{FlatServer, NewServer, ServerNode, DEFAULT_SERVER_PRIORITY};
pub use status::{
    LiveStatus, Motd, PlayerSample, Players, ANONYMOUS_PLAYER_ID, ANONYMOUS_PLAYER_NAME,
};
