//! Type definitions

pub mod hotspot;
pub mod location;
pub mod messages;
pub mod plan;
pub mod settings;
pub mod timeline;
pub mod vehicle;

pub use hotspot::*;
pub use location::*;
pub use messages::*;
pub use plan::*;
pub use settings::*;
pub use timeline::*;
pub use vehicle::*;
