//! Procedural scene systems driven once per tick by the scene graph.

pub mod belt;
pub mod comet;
pub mod flares;
pub mod labels;
pub mod links;
pub mod rng;

pub use belt::DebrisBelt;
pub use comet::CometTail;
pub use flares::SunFlares;
pub use labels::{LabelInstance, OverlayLabelSystem};
pub use links::{LinkEntity, LinkNetwork};
pub use rng::Rng;
