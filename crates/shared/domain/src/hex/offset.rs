use super::Hex;
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which rows or columns are shoved by half a cell in an offset grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetSystem {
    OddR,
    EvenR,
    OddQ,
    EvenQ,
}

impl OffsetSystem {
    const fn parity(self) -> i32 {
        match self {
            Self::OddR | Self::OddQ => -1,
            Self::EvenR | Self::EvenQ => 1,
        }
    }

    const fn is_row_based(self) -> bool {
        matches!(self, Self::OddR | Self::EvenR)
    }
}

impl FromStr for OffsetSystem {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "odd-r" => Ok(Self::OddR),
            "even-r" => Ok(Self::EvenR),
            "odd-q" => Ok(Self::OddQ),
            "even-q" => Ok(Self::EvenQ),
            other => Err(DomainError::Geometry {
                message: format!("system must be odd-r, even-r, odd-q, or even-q, got '{other}'")
                    .into(),
                context: None,
            }),
        }
    }
}

/// Column/row storage coordinates of an offset grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

impl OffsetCoord {
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[must_use]
    pub fn from_cube(hex: Hex, system: OffsetSystem) -> Self {
        let parity = system.parity();
        if system.is_row_based() {
            let col = hex.q() + (hex.r() + parity * (hex.r() & 1)).div_euclid(2);
            Self { col, row: hex.r() }
        } else {
            let row = hex.r() + (hex.q() + parity * (hex.q() & 1)).div_euclid(2);
            Self { col: hex.q(), row }
        }
    }

    #[must_use]
    pub fn to_cube(self, system: OffsetSystem) -> Hex {
        let parity = system.parity();
        if system.is_row_based() {
            let q = self.col - (self.row + parity * (self.row & 1)).div_euclid(2);
            Hex::axial(q, self.row)
        } else {
            let r = self.row - (self.col + parity * (self.col & 1)).div_euclid(2);
            Hex::axial(self.col, r)
        }
    }
}

/// Doubled-width (`r`) or doubled-height (`q`) storage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoubledCoord {
    pub col: i32,
    pub row: i32,
}

impl DoubledCoord {
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[must_use]
    pub const fn from_cube_q(hex: Hex) -> Self {
        Self { col: hex.q(), row: 2 * hex.r() + hex.q() }
    }

    #[must_use]
    pub const fn to_cube_q(self) -> Hex {
        Hex::axial(self.col, (self.row - self.col).div_euclid(2))
    }

    #[must_use]
    pub const fn from_cube_r(hex: Hex) -> Self {
        Self { col: 2 * hex.q() + hex.r(), row: hex.r() }
    }

    #[must_use]
    pub const fn to_cube_r(self) -> Hex {
        Hex::axial((self.col - self.row).div_euclid(2), self.row)
    }
}
