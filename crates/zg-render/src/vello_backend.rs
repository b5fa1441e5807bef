//! Retained primitives → Vello drawing commands.
//!
//! The backend keeps the last props pushed for every handle and encodes
//! them into a fresh `vello::Scene` on demand, in draw order, under the
//! viewport transform. The caller presents the scene via wgpu.

use crate::paint::ResolvedPaint;
use crate::primitive::{AssetResolver, PrimitiveProps, RenderBackend};
use kurbo::{Affine, RoundedRect, Stroke};
use peniko::{Color, Fill, Image};
use std::collections::HashMap;
use vello::Scene;
use zg_core::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(u32);

#[derive(Debug, Clone)]
struct Primitive {
    order: usize,
    props: Option<PrimitiveProps<Image>>,
}

#[derive(Debug, Default)]
pub struct VelloBackend {
    next_id: u32,
    primitives: HashMap<PrimitiveId, Primitive>,
}

impl VelloBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn props(&self, id: PrimitiveId) -> Option<&PrimitiveProps<Image>> {
        self.primitives.get(&id).and_then(|p| p.props.as_ref())
    }

    /// Handles sorted by draw order (ties broken by allocation order).
    pub fn draw_order(&self) -> Vec<PrimitiveId> {
        let mut ids: Vec<_> = self.primitives.keys().copied().collect();
        ids.sort_by_key(|id| (self.primitives[id].order, *id));
        ids
    }

    /// Encode every visible primitive. Call once per frame with a
    /// freshly-cleared `Scene`.
    pub fn paint(&self, scene: &mut Scene, view: Affine) {
        for id in self.draw_order() {
            if let Some(props) = self.props(id)
                && props.visible
            {
                paint_primitive(scene, view, props);
            }
        }
    }
}

impl RenderBackend for VelloBackend {
    type Handle = PrimitiveId;
    type Texture = Image;

    fn create_primitive(&mut self) -> PrimitiveId {
        self.next_id += 1;
        let id = PrimitiveId(self.next_id);
        self.primitives.insert(
            id,
            Primitive {
                order: usize::MAX,
                props: None,
            },
        );
        id
    }

    fn update_primitive(&mut self, handle: PrimitiveId, props: &PrimitiveProps<Image>) {
        match self.primitives.get_mut(&handle) {
            Some(p) => p.props = Some(props.clone()),
            None => log::warn!("update of unknown primitive {handle:?}"),
        }
    }

    fn set_order(&mut self, handle: PrimitiveId, order: usize) {
        if let Some(p) = self.primitives.get_mut(&handle) {
            p.order = order;
        }
    }

    fn destroy_primitive(&mut self, handle: PrimitiveId) {
        self.primitives.remove(&handle);
    }
}

// ─── Painting ────────────────────────────────────────────────────────────────

fn paint_primitive(scene: &mut Scene, view: Affine, props: &PrimitiveProps<Image>) {
    let shape: RoundedRect = props.rect.to_rounded_rect(f64::from(props.corner_radius));
    let transform = view * props.transform.to_affine();

    match &props.fill {
        Some(ResolvedPaint::Solid(c)) => {
            scene.fill(Fill::NonZero, transform, Color::new(*c), None, &shape);
        }
        Some(ResolvedPaint::Texture(image)) => {
            scene.fill(
                Fill::NonZero,
                transform,
                image,
                Some(image_fit(props, image)),
                &shape,
            );
        }
        None => {}
    }

    if let Some(stroke) = &props.stroke {
        let style = Stroke::new(f64::from(stroke.weight));
        match &stroke.paint {
            ResolvedPaint::Solid(c) => {
                scene.stroke(&style, transform, Color::new(*c), None, &shape);
            }
            ResolvedPaint::Texture(image) => {
                scene.stroke(&style, transform, image, Some(image_fit(props, image)), &shape);
            }
        }
    }
}

/// Stretch an image over the primitive's local rectangle.
fn image_fit(props: &PrimitiveProps<Image>, image: &Image) -> Affine {
    if image.width == 0 || image.height == 0 {
        return Affine::IDENTITY;
    }
    Affine::scale_non_uniform(
        props.rect.width() / f64::from(image.width),
        props.rect.height() / f64::from(image.height),
    )
}

// ─── Assets ──────────────────────────────────────────────────────────────────

/// In-memory image table keyed by image reference.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: HashMap<String, Image>,
}

impl ImageStore {
    pub fn insert(&mut self, key: impl Into<String>, image: Image) {
        self.images.insert(key.into(), image);
    }

    pub fn remove(&mut self, key: &str) -> Option<Image> {
        self.images.remove(key)
    }
}

impl AssetResolver<Image> for ImageStore {
    fn resolve(&mut self, image: &ImageRef) -> Option<Image> {
        self.images.get(image.as_str()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::RenderSync;
    use peniko::{Blob, ImageFormat};
    use std::sync::Arc;
    use zg_core::{NodeProps, NodeType, Paint, Rgba8, Scene as Document};

    fn checker() -> Image {
        let pixels: Vec<u8> = [255, 255, 255, 255, 0, 0, 0, 255].repeat(2);
        Image::new(Blob::new(Arc::new(pixels)), ImageFormat::Rgba8, 2, 2)
    }

    #[test]
    fn handles_are_stable_and_ordered() {
        let mut backend = VelloBackend::new();
        let a = backend.create_primitive();
        let b = backend.create_primitive();
        backend.set_order(a, 1);
        backend.set_order(b, 0);
        assert_eq!(backend.draw_order(), vec![b, a]);

        backend.destroy_primitive(b);
        assert_eq!(backend.draw_order(), vec![a]);
    }

    #[test]
    fn image_fill_resolves_through_store() {
        let mut doc = Document::new();
        let node = doc.create_element(
            NodeType::Rectangle,
            NodeProps::rect(0.0, 0.0, 20.0, 20.0).with_fill(Paint::image("checker")),
        );
        let mut store = ImageStore::default();
        store.insert("checker", checker());

        let mut sync = RenderSync::new(VelloBackend::new(), store);
        let handle = sync.create_render_node(&node).unwrap();
        let props = sync.backend().props(handle).unwrap();
        assert!(matches!(&props.fill, Some(ResolvedPaint::Texture(img)) if img.width == 2));

        let mut scene = Scene::new();
        sync.backend().paint(&mut scene, Affine::IDENTITY);
    }

    #[test]
    fn paint_encodes_solid_fill() {
        let mut doc = Document::new();
        let node = doc.create_element(
            NodeType::Rectangle,
            NodeProps::rect(10.0, 10.0, 100.0, 50.0).with_fill(Paint::solid(Rgba8::new(255, 0, 0, 255))),
        );
        let mut sync = RenderSync::new(VelloBackend::new(), ImageStore::default());
        sync.create_render_node(&node).unwrap();

        let mut scene = Scene::new();
        sync.backend().paint(&mut scene, Affine::scale(2.0));
        assert_eq!(sync.backend().len(), 1);
    }
}
