//! Node geometry and the affine transform that places it.
//!
//! A node's visual rectangle lives in local space at `(0, 0, width, height)`.
//! Translation, rotation and scale are all carried by one 3×2 affine
//! matrix; renderers must always receive the full matrix, never deltas.

use kurbo::Affine;
use serde::{Deserialize, Serialize};

/// 2D affine transform `[a, b, c, d, tx, ty]`:
///
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// | 0  0  1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(pub [f32; 6]);

impl Transform {
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub const fn translate(x: f32, y: f32) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, x, y])
    }

    /// Translation followed by a rotation (degrees, clockwise in y-down
    /// screen space) about the local origin.
    pub fn from_position_rotation(x: f32, y: f32, degrees: f32) -> Self {
        if degrees == 0.0 {
            return Self::translate(x, y);
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self([cos, sin, -sin, cos, x, y])
    }

    /// Truncate a column-major 3×3 homogeneous matrix to its affine part.
    pub fn from_mat3(m: &[f32; 9]) -> Self {
        Self([m[0], m[1], m[3], m[4], m[6], m[7]])
    }

    /// Expand back to a column-major 3×3 homogeneous matrix.
    pub fn to_mat3(&self) -> [f32; 9] {
        let [a, b, c, d, tx, ty] = self.0;
        [a, b, 0.0, c, d, 0.0, tx, ty, 1.0]
    }

    pub fn translation(&self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }

    /// Same linear part, new translation.
    #[must_use]
    pub fn with_translation(mut self, x: f32, y: f32) -> Self {
        self.0[4] = x;
        self.0[5] = y;
        self
    }

    /// Replace the linear part with a pure rotation, keeping translation.
    #[must_use]
    pub fn with_rotation(self, degrees: f32) -> Self {
        let (x, y) = self.translation();
        Self::from_position_rotation(x, y, degrees)
    }

    pub fn to_affine(&self) -> Affine {
        Affine::new(self.0.map(f64::from))
    }

    /// Map a local-space point into the parent space.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, tx, ty] = self.0;
        (a * x + c * y + tx, b * x + d * y + ty)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Position, size, rotation and placement matrix of a node.
///
/// `x`, `y` and `rotation` mirror what the matrix encodes; the matrix is
/// what renderers consume. Each is stored separately so a single-field
/// edit inverts exactly, and edits that move a node write both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees.
    pub rotation: f32,
    pub transform: Transform,
}

impl Geometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            transform: Transform::translate(x, y),
        }
    }

    /// Corners of the local rectangle mapped through the transform.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let t = &self.transform;
        [
            t.apply(0.0, 0.0),
            t.apply(self.width, 0.0),
            t.apply(self.width, self.height),
            t.apply(0.0, self.height),
        ]
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
