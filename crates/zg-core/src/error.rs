//! Structural errors raised by the scene graph.
//!
//! Every variant is reported *before* the scene is mutated; a failing
//! operation leaves the graph exactly as it was.

use crate::id::NodeId;
use crate::model::NodeType;
use crate::property::{PropertyPath, ValueKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("no node with id `{0}`")]
    UnknownNode(NodeId),

    #[error("id `{0}` is already in use")]
    DuplicateId(NodeId),

    #[error("moving `{node}` under `{parent}` would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("a {child:?} cannot be placed inside a {parent:?}")]
    InvalidParent { parent: NodeType, child: NodeType },

    #[error("the document root cannot be deleted or moved")]
    RootImmutable,

    #[error("cannot delete `{0}`: a document needs at least one page")]
    LastPage(NodeId),

    #[error("`{path}` expects a {expected:?} value, got {found:?}")]
    PropertyMismatch {
        path: PropertyPath,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("{node_type:?} nodes have no `{path}` property")]
    UnsupportedProperty {
        node_type: NodeType,
        path: PropertyPath,
    },

    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    #[error("`{0}` is not a page")]
    NotAPage(NodeId),

    #[error("a scene description must start at a Document, found {0:?}")]
    InvalidRoot(NodeType),
}
