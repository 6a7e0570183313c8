pub mod geodesy;
pub mod scalar;

pub use geodesy::*;
pub use scalar::*;
