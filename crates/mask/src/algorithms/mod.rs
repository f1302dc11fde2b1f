pub mod components;
pub mod hole_fill;
pub mod median;
pub mod resize;

pub use components::*;
pub use hole_fill::*;
pub use median::*;
pub use resize::*;
