pub mod changes;
pub mod descriptor;
pub mod diagnostic;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod paint;
pub mod property;
pub mod scene;
pub mod transaction;

pub use changes::ChangeSet;
pub use descriptor::NodeDescriptor;
pub use diagnostic::{Diagnostic, Severity};
pub use error::SceneError;
pub use geometry::{Geometry, Transform};
pub use id::NodeId;
pub use model::*;
pub use paint::{ImageRef, Paint, PaintList, Rgba8, StrokeProps};
pub use property::{PropertyPath, PropertyValue, ValueKind};
pub use scene::{Scene, Slot, Subtree};
pub use transaction::{AppliedChange, Applied, ChangeRecord, Transaction, apply_transaction, replay};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
