//! Database queries

pub mod hotspot;
pub mod plan;
pub mod settings;
pub mod timeline;
pub mod vehicle;
