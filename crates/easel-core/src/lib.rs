pub mod area;
pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod placement;
pub mod scene;
pub mod transformer;
pub mod view;

pub use area::{AnchorGeometry, AnchorRole, AnchorSet, validate_area};
pub use config::{AreaStyle, EditorConfig, GridConfig};
pub use error::{EaselError, EaselResult};
pub use id::NodeId;
pub use model::*;
pub use scene::{Scene, SceneSnapshot};
pub use transformer::{Pose, TransformHandle, TransformerStyle};
pub use view::{ChromeMetrics, ViewTransform, ZoomDirection};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
