//! The contract between the synchronizer and whatever draws.
//!
//! A backend owns its primitives; the synchronizer only holds handles.
//! A handle is allocated once per visual node and stays the same until
//! the node is destroyed, however often it is updated or reordered.

use crate::paint::ResolvedPaint;
use kurbo::Rect;
use std::fmt::Debug;
use std::hash::Hash;
use zg_core::{ImageRef, Transform};

/// Everything a backend needs to draw one node, always complete.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveProps<T> {
    /// Local-space rectangle, always anchored at the origin.
    pub rect: Rect,
    pub corner_radius: f32,
    /// Full placement matrix; never a delta.
    pub transform: Transform,
    pub fill: Option<ResolvedPaint<T>>,
    pub stroke: Option<ResolvedStroke<T>>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStroke<T> {
    pub weight: f32,
    pub paint: ResolvedPaint<T>,
}

pub trait RenderBackend {
    type Handle: Copy + Eq + Hash + Debug;
    type Texture: Clone;

    fn create_primitive(&mut self) -> Self::Handle;

    fn update_primitive(&mut self, handle: Self::Handle, props: &PrimitiveProps<Self::Texture>);

    /// Reassign draw order (lower draws first). Geometry and paint are
    /// untouched.
    fn set_order(&mut self, handle: Self::Handle, order: usize);

    fn destroy_primitive(&mut self, handle: Self::Handle);
}

/// Turns image references into something the backend can draw.
pub trait AssetResolver<T> {
    fn resolve(&mut self, image: &ImageRef) -> Option<T>;
}

/// Resolver for backends that draw no images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl<T> AssetResolver<T> for NoAssets {
    fn resolve(&mut self, _image: &ImageRef) -> Option<T> {
        None
    }
}
