use super::offsets::von_neumann;
use super::position::{Position, DIMS};
use crate::error::{IsingError, Result};

/// Number of neighbors of every site.
pub const N_NEIGHBORS: usize = 2 * DIMS;

/// Periodic square lattice of boolean spins (`true` = up) with a precomputed
/// neighbor table.
///
/// Sites are stored in row-major (C) order: site `(x, y)` lives at flat index
/// `x * strides[0] + y`. Every lookup is reduced modulo the extent, so the
/// lattice has no edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    extent: Position,
    strides: [usize; DIMS],
    volume: usize,
    cells: Vec<bool>,
    /// `neighbors[i * N_NEIGHBORS + k]` is the k-th neighbor of site `i`, in
    /// the order of [`von_neumann`].
    neighbors: Vec<u32>,
}

impl Lattice {
    /// Create a lattice of the given extent, setting each site from
    /// `generator`.
    ///
    /// Fails with [`IsingError::InvalidExtent`] if any axis is shorter than 2.
    pub fn new(extent: Position, generator: impl FnMut(Position) -> bool) -> Result<Self> {
        let mut short = None;
        extent.for_each_coordinate(|axis, c| {
            if c < 2 && short.is_none() {
                short = Some(IsingError::InvalidExtent { axis, extent: c });
            }
        });
        if let Some(err) = short {
            return Err(err);
        }

        let volume = extent.product();
        let mut strides = [1usize; DIMS];
        for d in (0..DIMS - 1).rev() {
            strides[d] = strides[d + 1] * extent.coord(d + 1) as usize;
        }

        let mut lattice = Self {
            extent,
            strides,
            volume,
            cells: vec![false; volume],
            neighbors: Vec::with_capacity(volume * N_NEIGHBORS),
        };

        let offsets = von_neumann();
        for i in 0..volume {
            let pos = lattice.position_of(i);
            for &off in &offsets {
                let j = lattice.index_of(pos.add(off, Some(extent)));
                lattice.neighbors.push(j as u32);
            }
        }

        lattice.fill(generator);
        Ok(lattice)
    }

    /// Lattice with every spin set to `value`.
    pub fn uniform(extent: Position, value: bool) -> Result<Self> {
        Self::new(extent, |_| value)
    }

    fn fill(&mut self, mut generator: impl FnMut(Position) -> bool) {
        for i in 0..self.volume {
            let up = generator(self.position_of(i));
            self.cells[i] = up;
        }
    }

    #[inline]
    pub fn extent(&self) -> Position {
        self.extent
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Flat index of an already-normalized position.
    #[inline]
    pub fn index_of(&self, pos: Position) -> usize {
        let mut flat = 0usize;
        pos.for_each_coordinate(|axis, c| flat += c as usize * self.strides[axis]);
        flat
    }

    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        Position::new(
            (index / self.strides[0]) as i64,
            (index % self.strides[0]) as i64,
        )
    }

    /// Spin at `pos`, wrapping it onto the torus first.
    #[inline]
    pub fn get(&self, pos: Position) -> bool {
        self.cells[self.index_of(pos.wrap(self.extent))]
    }

    /// Set the spin at an already-normalized `pos`.
    #[inline]
    pub fn assign(&mut self, pos: Position, value: bool) {
        debug_assert_eq!(pos, pos.wrap(self.extent), "assign expects a wrapped position");
        let i = self.index_of(pos);
        self.cells[i] = value;
    }

    #[inline]
    pub fn get_index(&self, index: usize) -> bool {
        self.cells[index]
    }

    /// Toggle the spin at flat `index`, returning the new value.
    #[inline]
    pub fn toggle_index(&mut self, index: usize) -> bool {
        let cell = &mut self.cells[index];
        *cell = !*cell;
        *cell
    }

    /// The `2 * DIMS` wrapped neighbors of `pos`: `+x, -x, +y, -y`.
    pub fn neighbors(&self, pos: Position) -> [Position; N_NEIGHBORS] {
        let base = pos.wrap(self.extent);
        von_neumann().map(|off| base.add(off, Some(self.extent)))
    }

    /// Flat indices of the neighbors of site `index`.
    #[inline]
    pub fn neighbor_indices(&self, index: usize) -> &[u32] {
        &self.neighbors[index * N_NEIGHBORS..(index + 1) * N_NEIGHBORS]
    }

    /// Full recount of up spins.
    pub fn positive_spin_count(&self) -> usize {
        self.cells.iter().filter(|&&up| up).count()
    }

    /// Sum `f` over every site.
    pub fn aggregate(&self, mut f: impl FnMut(Position) -> f64) -> f64 {
        (0..self.volume).map(|i| f(self.position_of(i))).sum()
    }

    /// Iterate over every site in storage order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.volume).map(|i| self.position_of(i))
    }
}
