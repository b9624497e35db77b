//! Hexagon grid geometry in cube coordinates.
//!
//! Follows the conventions from <https://www.redblobgames.com/grids/hexagons/>:
//! integer [`Hex`] cells with the `q + r + s == 0` invariant, [`FractionalHex`]
//! for interpolation and pixel picking, offset/doubled storage coordinates and
//! pixel [`Layout`]s.

mod layout;
mod offset;

pub use layout::{Layout, Orientation, OrientationKind, Point};
pub use offset::{DoubledCoord, OffsetCoord, OffsetSystem};

use crate::DomainError;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A hexagon cell in cube coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hex {
    q: i32,
    r: i32,
    s: i32,
}

/// The six neighbour directions, in counter-clockwise order starting east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HexDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

const DIRECTIONS: [Hex; 6] = [
    Hex { q: 1, r: 0, s: -1 },
    Hex { q: 1, r: -1, s: 0 },
    Hex { q: 0, r: -1, s: 1 },
    Hex { q: -1, r: 0, s: 1 },
    Hex { q: -1, r: 1, s: 0 },
    Hex { q: 0, r: 1, s: -1 },
];

const DIAGONALS: [Hex; 6] = [
    Hex { q: 2, r: -1, s: -1 },
    Hex { q: 1, r: -2, s: 1 },
    Hex { q: -1, r: -1, s: 2 },
    Hex { q: -2, r: 1, s: 1 },
    Hex { q: -1, r: 2, s: -1 },
    Hex { q: 1, r: 1, s: -2 },
];

impl HexDirection {
    pub const ALL: [Self; 6] =
        [Self::East, Self::NorthEast, Self::NorthWest, Self::West, Self::SouthWest, Self::SouthEast];

    /// Direction by index; wraps modulo 6.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit vector of this direction.
    #[must_use]
    pub const fn offset(self) -> Hex {
        DIRECTIONS[self.index()]
    }
}

impl Hex {
    pub const ORIGIN: Self = Self { q: 0, r: 0, s: 0 };

    /// Builds a hex from axial coordinates; `s` is derived.
    #[must_use]
    pub const fn axial(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Builds a hex from cube coordinates.
    ///
    /// # Errors
    /// Returns [`DomainError::Geometry`] when `q + r + s != 0`.
    pub fn try_new(q: i32, r: i32, s: i32) -> Result<Self, DomainError> {
        if q + r + s != 0 {
            return Err(DomainError::Geometry {
                message: format!("q + r + s must be 0, is {}", q + r + s).into(),
                context: None,
            });
        }
        Ok(Self { q, r, s })
    }

    #[must_use]
    pub const fn q(self) -> i32 {
        self.q
    }

    #[must_use]
    pub const fn r(self) -> i32 {
        self.r
    }

    #[must_use]
    pub const fn s(self) -> i32 {
        self.s
    }

    #[must_use]
    pub const fn rotate_left(self) -> Self {
        Self { q: -self.s, r: -self.q, s: -self.r }
    }

    #[must_use]
    pub const fn rotate_right(self) -> Self {
        Self { q: -self.r, r: -self.s, s: -self.q }
    }

    #[must_use]
    pub fn neighbor(self, direction: HexDirection) -> Self {
        self + direction.offset()
    }

    /// All six neighbours in [`HexDirection::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        HexDirection::ALL.map(|direction| self.neighbor(direction))
    }

    /// The diagonal neighbour sitting between `direction` and the next one.
    #[must_use]
    pub fn diagonal_neighbor(self, direction: HexDirection) -> Self {
        self + DIAGONALS[direction.index()]
    }

    /// Number of steps from the origin.
    #[must_use]
    pub const fn length(self) -> u32 {
        (self.q.unsigned_abs() + self.r.unsigned_abs() + self.s.unsigned_abs()) / 2
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> u32 {
        (self - other).length()
    }

    /// Every hex crossed by the straight segment from `self` to `other`, both ends included.
    #[must_use]
    pub fn line_to(self, other: Self) -> Vec<Self> {
        let n = self.distance_to(other);
        // Nudge off the edges so ties resolve consistently.
        let a = FractionalHex::from(self).nudged();
        let b = FractionalHex::from(other).nudged();
        let step = 1.0 / f64::from(n.max(1));
        (0..=n).map(|i| a.lerp(b, step * f64::from(i)).round()).collect()
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> FractionalHex {
        FractionalHex::from(self).lerp(FractionalHex::from(other), t)
    }

    #[must_use]
    pub fn to_offset(self, system: OffsetSystem) -> OffsetCoord {
        OffsetCoord::from_cube(self, system)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}

impl Add for Hex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { q: self.q + rhs.q, r: self.r + rhs.r, s: self.s + rhs.s }
    }
}

impl Sub for Hex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { q: self.q - rhs.q, r: self.r - rhs.r, s: self.s - rhs.s }
    }
}

impl Mul<i32> for Hex {
    type Output = Self;

    fn mul(self, k: i32) -> Self {
        Self { q: self.q * k, r: self.r * k, s: self.s * k }
    }
}

impl Neg for Hex {
    type Output = Self;

    fn neg(self) -> Self {
        Self { q: -self.q, r: -self.r, s: -self.s }
    }
}

/// A point in continuous cube space, produced by interpolation or pixel picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalHex {
    pub q: f64,
    pub r: f64,
    pub s: f64,
}

impl FractionalHex {
    #[must_use]
    pub const fn new(q: f64, r: f64, s: f64) -> Self {
        Self { q, r, s }
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            q: self.q * (1.0 - t) + other.q * t,
            r: self.r * (1.0 - t) + other.r * t,
            s: self.s * (1.0 - t) + other.s * t,
        }
    }

    /// Snaps to the nearest cell, recomputing the component with the largest
    /// rounding error so the cube invariant holds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn round(self) -> Hex {
        let mut q = self.q.round_ties_even();
        let mut r = self.r.round_ties_even();
        let mut s = self.s.round_ties_even();
        let q_diff = (q - self.q).abs();
        let r_diff = (r - self.r).abs();
        let s_diff = (s - self.s).abs();
        if q_diff > r_diff && q_diff > s_diff {
            q = -r - s;
        } else if r_diff > s_diff {
            r = -q - s;
        } else {
            s = -q - r;
        }
        Hex { q: q as i32, r: r as i32, s: s as i32 }
    }

    fn nudged(self) -> Self {
        Self { q: self.q + 1e-6, r: self.r + 1e-6, s: self.s - 2e-6 }
    }
}

impl From<Hex> for FractionalHex {
    fn from(h: Hex) -> Self {
        Self { q: f64::from(h.q), r: f64::from(h.r), s: f64::from(h.s) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arithmetic() {
        assert_eq!(Hex::axial(1, -3) + Hex::axial(3, -7), Hex::axial(4, -10));
        assert_eq!(Hex::axial(1, -3) - Hex::axial(3, -7), Hex::axial(-2, 4));
        assert_eq!(Hex::axial(1, -3) * 2, Hex::axial(2, -6));
        assert_eq!(-Hex::axial(1, -3), Hex::axial(-1, 3));
    }

    #[test]
    fn try_new_rejects_broken_invariant() {
        assert!(Hex::try_new(1, 1, 1).is_err());
        assert_eq!(Hex::try_new(1, -3, 2).ok(), Some(Hex::axial(1, -3)));
    }

    #[test]
    fn directions_and_neighbors() {
        assert_eq!(HexDirection::NorthWest.offset(), Hex::axial(0, -1));
        assert_eq!(HexDirection::from_index(8), HexDirection::NorthWest);
        assert_eq!(Hex::axial(1, -2).neighbor(HexDirection::NorthWest), Hex::axial(1, -3));
        assert_eq!(Hex::axial(1, -2).diagonal_neighbor(HexDirection::West), Hex::axial(-1, -1));
        assert!(Hex::ORIGIN.neighbors().iter().all(|n| n.length() == 1));
    }

    #[test]
    fn distance_and_rotation() {
        assert_eq!(Hex::axial(3, -7).distance_to(Hex::ORIGIN), 7);
        assert_eq!(Hex::axial(1, -3).rotate_right(), Hex::axial(3, -2));
        assert_eq!(Hex::axial(1, -3).rotate_left(), Hex::axial(-2, -1));
    }

    #[test]
    fn rounding_picks_nearest_cell() {
        let a = Hex::ORIGIN;
        let b = Hex::axial(1, -1);
        let c = Hex::axial(0, -1);
        assert_eq!(Hex::ORIGIN.lerp(Hex::axial(10, -20), 0.5).round(), Hex::axial(5, -10));
        assert_eq!(a.lerp(b, 0.499).round(), a);
        assert_eq!(a.lerp(b, 0.501).round(), b);

        let mix = |wa: f64, wb: f64, wc: f64| {
            let (fa, fb, fc) =
                (FractionalHex::from(a), FractionalHex::from(b), FractionalHex::from(c));
            FractionalHex::new(
                fa.q * wa + fb.q * wb + fc.q * wc,
                fa.r * wa + fb.r * wb + fc.r * wc,
                fa.s * wa + fb.s * wb + fc.s * wc,
            )
        };
        assert_eq!(mix(0.4, 0.3, 0.3).round(), a);
        assert_eq!(mix(0.3, 0.3, 0.4).round(), c);
    }

    #[test]
    fn line_draw() {
        let expected = vec![
            Hex::axial(0, 0),
            Hex::axial(0, -1),
            Hex::axial(0, -2),
            Hex::axial(1, -3),
            Hex::axial(1, -4),
            Hex::axial(1, -5),
        ];
        assert_eq!(Hex::ORIGIN.line_to(Hex::axial(1, -5)), expected);
        assert_eq!(Hex::axial(2, 2).line_to(Hex::axial(2, 2)), vec![Hex::axial(2, 2)]);
    }

    fn any_hex() -> impl Strategy<Value = Hex> {
        (-60i32..60, -60i32..60).prop_map(|(q, r)| Hex::axial(q, r))
    }

    proptest! {
        #[test]
        fn six_rotations_are_identity(h in any_hex()) {
            let mut left = h;
            let mut right = h;
            for _ in 0..6 {
                left = left.rotate_left();
                right = right.rotate_right();
            }
            prop_assert_eq!(left, h);
            prop_assert_eq!(right, h);
        }

        #[test]
        fn distance_is_symmetric_and_matches_line(a in any_hex(), b in any_hex()) {
            prop_assert_eq!(a.distance_to(b), b.distance_to(a));
            let line = a.line_to(b);
            prop_assert_eq!(line.len() as u32, a.distance_to(b) + 1);
            prop_assert_eq!(line.first().copied(), Some(a));
            prop_assert_eq!(line.last().copied(), Some(b));
            prop_assert!(line.windows(2).all(|w| w[0].distance_to(w[1]) == 1));
        }
    }
}
