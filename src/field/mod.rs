pub mod beat;
pub mod constants;
pub mod controller;
pub mod particle;
pub mod state;
pub mod surface;

pub use beat::*;
pub use controller::*;
pub use particle::*;
pub use state::*;
pub use surface::*;
