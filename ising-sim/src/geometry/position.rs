use std::ops::{Add, Neg};

use crate::error::{IsingError, Result};

/// Number of lattice axes.
pub const DIMS: usize = 2;

/// Integer point on the square lattice.
///
/// The same type doubles as an extent (`Position::new(width, height)`), which
/// is what the wrapping operations reduce against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    coords: [i64; DIMS],
}

impl Position {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { coords: [x, y] }
    }

    /// Build a position from a coordinate slice; fails unless it has exactly
    /// [`DIMS`] entries.
    pub fn from_coords(coords: &[i64]) -> Result<Self> {
        let coords: [i64; DIMS] = coords
            .try_into()
            .map_err(|_| IsingError::InvalidPosition {
                expected: DIMS,
                got: coords.len(),
            })?;
        Ok(Self { coords })
    }

    #[inline]
    pub fn x(&self) -> i64 {
        self.coords[0]
    }

    #[inline]
    pub fn y(&self) -> i64 {
        self.coords[1]
    }

    #[inline]
    pub fn coord(&self, axis: usize) -> i64 {
        self.coords[axis]
    }

    pub fn coords(&self) -> [i64; DIMS] {
        self.coords
    }

    /// Visit `(axis, coordinate)` for axes `0..DIMS` in order.
    pub fn for_each_coordinate(&self, mut f: impl FnMut(usize, i64)) {
        for (axis, &c) in self.coords.iter().enumerate() {
            f(axis, c);
        }
    }

    /// Rebuild the position axis by axis, in the same order as
    /// [`for_each_coordinate`](Self::for_each_coordinate).
    pub fn map_coordinates(&self, mut f: impl FnMut(usize, i64) -> i64) -> Self {
        let mut coords = self.coords;
        for (axis, c) in coords.iter_mut().enumerate() {
            *c = f(axis, *c);
        }
        Self { coords }
    }

    /// Reduce every coordinate into `[0, extent_axis)` with a non-negative
    /// modulo.
    #[inline]
    pub fn wrap(&self, extent: Position) -> Self {
        self.map_coordinates(|axis, c| c.rem_euclid(extent.coords[axis]))
    }

    /// Component-wise sum, wrapped onto the torus of the given extent when one
    /// is supplied.
    #[inline]
    pub fn add(&self, other: Position, wrap: Option<Position>) -> Self {
        let sum = *self + other;
        match wrap {
            Some(extent) => sum.wrap(extent),
            None => sum,
        }
    }

    /// Product of the coordinates, i.e. the number of sites when `self` is an
    /// extent.
    pub fn product(&self) -> usize {
        self.coords.iter().map(|&c| c as usize).product()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        let mut coords = self.coords;
        for (c, r) in coords.iter_mut().zip(rhs.coords) {
            *c += r;
        }
        Position { coords }
    }
}

impl Neg for Position {
    type Output = Position;

    fn neg(self) -> Position {
        self.map_coordinates(|_, c| -c)
    }
}

impl From<[i64; DIMS]> for Position {
    fn from(coords: [i64; DIMS]) -> Self {
        Self { coords }
    }
}
