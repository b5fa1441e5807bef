pub mod hit;
pub mod paint;
pub mod primitive;
pub mod sync;
pub mod vello_backend;
pub mod viewport;

pub use hit::{hit_test, hit_test_rect};
pub use paint::{ResolvedPaint, solid_channels};
pub use primitive::{AssetResolver, NoAssets, PrimitiveProps, RenderBackend, ResolvedStroke};
pub use sync::RenderSync;
pub use vello_backend::{ImageStore, PrimitiveId, VelloBackend};
pub use viewport::Viewport;
