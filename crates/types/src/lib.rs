//! Shared value types for the ForestSathi wildfire risk engine.
//!
//! Everything here is a plain, immutable value: coordinates, ecological
//! zones, risk labels, class probabilities, historical region statistics and
//! the prediction result handed back to callers. No I/O happens in this crate.

pub mod intensity;
pub mod location;
pub mod prediction;
pub mod region;
pub mod risk;
pub mod season;
pub mod zone;

pub use intensity::*;
pub use location::*;
pub use prediction::*;
pub use region::*;
pub use risk::*;
pub use season::*;
pub use zone::*;
