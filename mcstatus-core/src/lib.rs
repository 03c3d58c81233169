//! `mcstatus` Core Library
//!
//! This crate provides the core functionality for per-group Minecraft server
//! lists, including the persistent server tree, the web editor transport
//! codec, live status collection, and display preparation.

pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod status;
pub mod store;
pub mod validation;

pub use codec::{decode, editor_url, encode};
pub use config::{AppSettings, ConfigManager};
pub use display::{format_tree_listing, DisplayView, EnrichedNode};
pub use error::{
    CodecError, CodecResult, ConfigError, ConfigResult, McStatusError, StatusError, StatusResult,
};
pub use models::{
    AttributeValue, FlatServer, GroupConfig, LiveStatus, NewServer, ServerAttribute, ServerNode,
};
pub use status::{fetch_all, SnapshotFetcher, StatusFetcher};
pub use store::{AddOutcome, GroupStorage, MemoryStorage, ServerStore};
