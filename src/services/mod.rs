//! Business logic services

pub mod distance;
pub mod geo;
pub mod timeline;
