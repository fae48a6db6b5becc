//! Input schemas
//!
//! This module defines the raw interaction record format produced by session
//! recorders and the adapters that turn raw records (and external analytics
//! events) into the crate's typed representation.

mod adapter;
mod external;
mod raw_record;

pub use adapter::*;
pub use external::*;
pub use raw_record::*;
