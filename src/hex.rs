//! Axial hex coordinates (pointy-top) and the ring/disk walks built on them.
//!
//! Cube form is `x = q`, `z = r`, `y = -x - z`. All arithmetic wraps instead of
//! panicking so enumeration stays total for coordinates near the `i32` limits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Hex { q, r }
    }

    /// Cube `y` component.
    pub fn s(&self) -> i64 {
        -(self.q as i64) - (self.r as i64)
    }

    pub fn offset(&self, direction: Direction, steps: u32) -> Hex {
        let (dq, dr) = direction.delta();
        let steps = steps as i32;
        Hex {
            q: self.q.wrapping_add(dq.wrapping_mul(steps)),
            r: self.r.wrapping_add(dr.wrapping_mul(steps)),
        }
    }

    pub fn neighbor(&self, direction: Direction) -> Hex {
        self.offset(direction, 1)
    }

    pub fn neighbors(&self) -> [Hex; 6] {
        Direction::ALL.map(|direction| self.neighbor(direction))
    }

    /// Hex (cube-metric) distance, saturating at `u32::MAX`.
    pub fn distance(&self, other: &Hex) -> u32 {
        let dx = (self.q as i64 - other.q as i64).abs();
        let dz = (self.r as i64 - other.r as i64).abs();
        let dy = (self.s() - other.s()).abs();
        u32::try_from(dx.max(dy).max(dz)).unwrap_or(u32::MAX)
    }

    pub fn ring(&self, radius: u32) -> Ring {
        Ring::new(*self, radius)
    }

    /// Every coordinate within `radius` steps, ring by ring from the center outward.
    pub fn disk(&self, radius: u32) -> impl Iterator<Item = Hex> {
        let center = *self;
        (0..=radius).flat_map(move |r| Ring::new(center, r))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

pub fn distance(a: Hex, b: Hex) -> u32 {
    a.distance(&b)
}

pub fn neighbors(c: Hex) -> [Hex; 6] {
    c.neighbors()
}

pub fn ring(center: Hex, radius: u32) -> Ring {
    Ring::new(center, radius)
}

pub fn disk_around(center: Hex, radius: u32) -> impl Iterator<Item = Hex> {
    center.disk(radius)
}

/// The six axial directions, listed counter-clockwise starting from east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (0, -1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (0, 1),
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Direction::East => "e",
            Direction::NorthEast => "ne",
            Direction::NorthWest => "nw",
            Direction::West => "w",
            Direction::SouthWest => "sw",
            Direction::SouthEast => "se",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction '{0}' (expected one of e, ne, nw, w, sw, se)")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "e" | "east" => Ok(Direction::East),
            "ne" | "northeast" => Ok(Direction::NorthEast),
            "nw" | "northwest" => Ok(Direction::NorthWest),
            "w" | "west" => Ok(Direction::West),
            "sw" | "southwest" => Ok(Direction::SouthWest),
            "se" | "southeast" => Ok(Direction::SouthEast),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Lazy walk over the `6 * radius` cells at exactly `radius` from `center`.
///
/// Starts at `center + SouthWest * radius` and walks the six sides in
/// [`Direction::ALL`] order, so every call yields the same sequence.
#[derive(Debug, Clone)]
pub struct Ring {
    current: Hex,
    radius: u32,
    side: usize,
    step: u32,
    done: bool,
}

impl Ring {
    pub fn new(center: Hex, radius: u32) -> Self {
        let current = if radius == 0 {
            center
        } else {
            center.offset(Direction::SouthWest, radius)
        };
        Ring {
            current,
            radius,
            side: 0,
            step: 0,
            done: false,
        }
    }
}

impl Iterator for Ring {
    type Item = Hex;

    fn next(&mut self) -> Option<Hex> {
        if self.done {
            return None;
        }
        if self.radius == 0 {
            self.done = true;
            return Some(self.current);
        }

        let out = self.current;
        self.current = self.current.neighbor(Direction::ALL[self.side]);
        self.step += 1;
        if self.step == self.radius {
            self.step = 0;
            self.side += 1;
            if self.side == Direction::ALL.len() {
                self.done = true;
            }
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = if self.radius == 0 {
            1
        } else {
            let radius = self.radius as usize;
            (6 - self.side) * radius - self.step as usize
        };
        (remaining, Some(remaining))
    }
}
