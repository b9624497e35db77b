use super::{FractionalHex, Hex};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// A point in world (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Forward (`f`) and inverse (`b`) conversion matrices plus the angle of the first corner,
/// measured in sixths of a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    f: [f64; 4],
    b: [f64; 4],
    start_angle: f64,
}

impl Orientation {
    pub const POINTY: Self = Self {
        f: [SQRT_3, SQRT_3 / 2.0, 0.0, 3.0 / 2.0],
        b: [SQRT_3 / 3.0, -1.0 / 3.0, 0.0, 2.0 / 3.0],
        start_angle: 0.5,
    };

    pub const FLAT: Self = Self {
        f: [3.0 / 2.0, 0.0, SQRT_3 / 2.0, SQRT_3],
        b: [2.0 / 3.0, 0.0, -1.0 / 3.0, SQRT_3 / 3.0],
        start_angle: 0.0,
    };
}

/// Serializable name of an [`Orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationKind {
    #[default]
    Pointy,
    Flat,
}

impl From<OrientationKind> for Orientation {
    fn from(kind: OrientationKind) -> Self {
        match kind {
            OrientationKind::Pointy => Self::POINTY,
            OrientationKind::Flat => Self::FLAT,
        }
    }
}

/// Maps hex cells to pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub orientation: Orientation,
    pub size: Point,
    pub origin: Point,
}

impl Layout {
    #[must_use]
    pub const fn new(orientation: Orientation, size: Point, origin: Point) -> Self {
        Self { orientation, size, origin }
    }

    /// Center of `hex` in world space.
    #[must_use]
    pub fn hex_to_pixel(&self, hex: Hex) -> Point {
        let [f0, f1, f2, f3] = self.orientation.f;
        let (q, r) = (f64::from(hex.q()), f64::from(hex.r()));
        let x = (f0 * q + f1 * r) * self.size.x;
        let y = (f2 * q + f3 * r) * self.size.y;
        Point::new(x + self.origin.x, y + self.origin.y)
    }

    /// Continuous cube position under `point`; call [`FractionalHex::round`] to pick a cell.
    #[must_use]
    pub fn pixel_to_hex(&self, point: Point) -> FractionalHex {
        let [b0, b1, b2, b3] = self.orientation.b;
        let px = (point.x - self.origin.x) / self.size.x;
        let py = (point.y - self.origin.y) / self.size.y;
        let q = b0 * px + b1 * py;
        let r = b2 * px + b3 * py;
        FractionalHex::new(q, r, -q - r)
    }

    /// Offset of corner `corner` (wrapping modulo 6) from a cell center.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn corner_offset(&self, corner: usize) -> Point {
        let angle = 2.0 * PI * (self.orientation.start_angle - (corner % 6) as f64) / 6.0;
        Point::new(self.size.x * angle.cos(), self.size.y * angle.sin())
    }

    /// The six corners of `hex` in world space.
    #[must_use]
    pub fn polygon_corners(&self, hex: Hex) -> [Point; 6] {
        let center = self.hex_to_pixel(hex);
        std::array::from_fn(|i| {
            let offset = self.corner_offset(i);
            Point::new(center.x + offset.x, center.y + offset.y)
        })
    }
}
