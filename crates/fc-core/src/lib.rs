pub mod canvas;
pub mod config;
pub mod diagram;
pub mod geom;
pub mod id;
pub mod model;
pub mod quadtree;

pub use canvas::{Canvas, CanvasMargins};
pub use config::{ConfigError, EditorConfig};
pub use diagram::Diagram;
pub use geom::{Bounds, distance_to_segment, segment_intersection};
pub use id::EntityId;
pub use model::*;
pub use quadtree::{QuadNode, QuadTree, SplitPolicy};

// Re-export kurbo so downstream crates share one geometry vocabulary.
pub use kurbo;
