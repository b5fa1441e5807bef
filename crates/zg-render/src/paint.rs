//! Model paints → renderer paints.
//!
//! Only the first paint of a list is drawn. Solid colors become 0–1 float
//! channels with the paint opacity folded into alpha; image paints go
//! through the asset resolver.

use crate::primitive::{AssetResolver, ResolvedStroke};
use zg_core::{Paint, PaintList, Rgba8, StrokeProps};

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPaint<T> {
    /// `[r, g, b, a]` in `0.0..=1.0`.
    Solid([f32; 4]),
    Texture(T),
}

pub fn solid_channels(color: Rgba8, opacity: f32) -> [f32; 4] {
    let c = |v: u8| f32::from(v) / 255.0;
    [
        c(color.r),
        c(color.g),
        c(color.b),
        c(color.a) * opacity.clamp(0.0, 1.0),
    ]
}

pub fn resolve_paint<T, R: AssetResolver<T>>(paint: &Paint, resolver: &mut R) -> Option<ResolvedPaint<T>> {
    match paint {
        Paint::Solid { color, opacity } => Some(ResolvedPaint::Solid(solid_channels(*color, *opacity))),
        Paint::Image { image } => {
            let texture = resolver.resolve(image);
            if texture.is_none() {
                log::warn!("image `{}` could not be resolved; drawing no fill", image.as_str());
            }
            texture.map(ResolvedPaint::Texture)
        }
    }
}

/// Resolve the first paint of a list, ignoring the rest.
pub fn resolve_first<T, R: AssetResolver<T>>(paints: &PaintList, resolver: &mut R) -> Option<ResolvedPaint<T>> {
    paints.first().and_then(|p| resolve_paint(p, resolver))
}

pub fn resolve_stroke<T, R: AssetResolver<T>>(
    stroke: &StrokeProps,
    resolver: &mut R,
) -> Option<ResolvedStroke<T>> {
    if stroke.stroke_weight <= 0.0 {
        return None;
    }
    resolve_first(&stroke.stroke_paints, resolver).map(|paint| ResolvedStroke {
        weight: stroke.stroke_weight,
        paint,
    })
}
