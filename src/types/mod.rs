//! Value types translating between human units and the bridge's native ranges.

mod hue;
mod level;

pub use hue::Hue;
pub use level::Level;
