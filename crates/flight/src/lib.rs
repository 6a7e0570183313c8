//! Core of the animated flight map: route sampling, aircraft state, the
//! two-mode animation director and the renderer boundary it drives.

pub mod config;
pub mod director;
pub mod loader;
pub mod route;
pub mod scene;
pub mod vehicle;

pub use config::*;
pub use director::*;
pub use loader::*;
pub use route::*;
pub use scene::*;
pub use vehicle::*;
