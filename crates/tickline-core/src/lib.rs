pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod index_map;
pub mod interaction;
pub mod marquee;
pub mod selection;
pub mod timeline;
pub mod units;
pub mod viewport;
pub mod zoom;
