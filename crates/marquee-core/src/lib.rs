pub mod animation;
pub mod condition;
pub mod config;
pub mod error;
pub mod host;
pub mod media;
pub mod replicator;
pub mod reset;
pub mod scroll;
pub mod sim;
pub mod skew;
pub mod widget;

pub use config::{AppConfig, Direction, EngineConfig, MarqueeAttributes, MarqueeConfig};
pub use error::{Error, Result};
pub use host::{Host, HostEvent};
pub use media::{MediaQuery, Orientation, PointerKind, Viewport};
pub use widget::{Marquee, MarqueeStatus};
