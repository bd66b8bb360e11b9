pub mod bounds;
pub mod clock;
pub mod geometry;
pub mod kinds;
pub mod messages;
pub mod model;
pub mod monitor;
pub mod overlay;
pub mod render;
pub mod service;
pub mod shapes;
pub mod state;
pub mod surface;

pub use bounds::{calculate_bounds, BAND_HEIGHT, FALLBACK_BOUNDS};
pub use messages::LoopEvent;
pub use model::Pet;
pub use service::{PetObserver, PetRuntime, Platform};
