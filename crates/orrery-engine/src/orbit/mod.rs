//! Orbital kinematics: immutable elements, the pure position solver,
//! per-body controllers and the derived orbit-path geometry.

pub mod body;
pub mod catalog;
pub mod elements;
pub mod path;
pub mod solver;
pub mod star;

pub use body::{BodyController, OrbitFrame, OrbitState};
pub use elements::OrbitalElement;
pub use path::{OrbitPath, OrbitPathRenderer, PathStyle, PATH_SEGMENTS};
pub use solver::{orbit_position, Ellipse};
pub use star::Star;
