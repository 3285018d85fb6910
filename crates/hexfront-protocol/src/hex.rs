use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axial coordinates for a hex grid (q, r). The implicit cube coordinate is `s = -q - r`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexParseError {
    #[error("hex key must look like `q,r`, got {0:?}")]
    Malformed(String),
    #[error("invalid hex component in {0:?}")]
    Component(String),
}

impl Hex {
    pub const DIRECTIONS: [Hex; 6] = [
        Hex { q: 1, r: 0 },  // East
        Hex { q: -1, r: 0 }, // West
        Hex { q: 0, r: 1 },  // Southeast
        Hex { q: 0, r: -1 }, // Northwest
        Hex { q: 1, r: -1 }, // Northeast
        Hex { q: -1, r: 1 }, // Southwest
    ];

    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// The six adjacent hexes. No bounds filtering; callers check board membership.
    pub fn neighbors(self) -> impl Iterator<Item = Hex> {
        Self::DIRECTIONS.into_iter().map(move |d| self + d)
    }

    #[inline]
    pub fn is_adjacent(self, other: Hex) -> bool {
        self.distance(other) == 1
    }

    #[inline]
    pub fn distance(self, other: Hex) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// All hexes with distance `<= radius`, in a deterministic order.
    pub fn ring_inclusive(self, radius: i32) -> impl Iterator<Item = Hex> {
        let radius = radius.max(0);
        (-radius..=radius).flat_map(move |dq| {
            // Constraint: max(|dq|, |dr|, |dq + dr|) <= radius
            let dr_min = (-radius).max(-dq - radius);
            let dr_max = radius.min(-dq + radius);
            (dr_min..=dr_max).map(move |dr| Hex {
                q: self.q + dq,
                r: self.r + dr,
            })
        })
    }

    /// Canonical map key, `"q,r"`.
    pub fn key(self) -> String {
        self.to_string()
    }

    pub fn from_key(key: &str) -> Result<Hex, HexParseError> {
        key.parse()
    }

    /// Pointy-top pixel projection of the hex center.
    pub fn to_pixel(self, size: f32) -> (f32, f32) {
        let sqrt3 = 3.0_f32.sqrt();
        let x = size * (sqrt3 * self.q as f32 + sqrt3 / 2.0 * self.r as f32);
        let y = size * (1.5 * self.r as f32);
        (x, y)
    }
}

impl std::ops::Add for Hex {
    type Output = Hex;

    fn add(self, other: Hex) -> Hex {
        Hex {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }
}

impl PartialOrd for Hex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for Hex {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| HexParseError::Malformed(s.to_string()))?;
        let q = q
            .trim()
            .parse()
            .map_err(|_| HexParseError::Component(s.to_string()))?;
        let r = r
            .trim()
            .parse()
            .map_err(|_| HexParseError::Component(s.to_string()))?;
        Ok(Hex { q, r })
    }
}
