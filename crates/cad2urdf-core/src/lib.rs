//! CAD to URDF Core
//!
//! This crate turns a CAD assembly's pairwise joints into a rooted kinematic tree:
//! - Geometry: row-major occurrence transforms and unit conversion
//! - Host: serde model of the CAD snapshot handed over by the host add-in
//! - Joint: raw joint records extracted from the snapshot
//! - Graph: undirected body connectivity
//! - Resolve: BFS orientation and world-space joint origins
//! - Mimic: actuator coupling encoded in joint names
//! - Link / Urdf: link records and the URDF serialization adapter
//! - Export: the pass-by-pass pipeline tying it all together

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod geometry;
pub mod graph;
pub mod host;
pub mod joint;
pub mod link;
pub mod mimic;
pub mod resolve;
pub mod table;
pub mod urdf;

pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use export::*;
pub use geometry::*;
pub use graph::*;
pub use host::*;
pub use joint::*;
pub use link::*;
pub use mimic::*;
pub use resolve::*;
pub use table::*;
pub use urdf::*;
