use crate::geometry::{Lattice, Position};

/// `+1` for an up spin, `-1` for a down spin.
#[inline]
pub fn spin(up: bool) -> i32 {
    if up {
        1
    } else {
        -1
    }
}

/// Sum of the neighbor spins of site `index`.
#[inline]
pub fn local_field(lattice: &Lattice, index: usize) -> i32 {
    lattice
        .neighbor_indices(index)
        .iter()
        .map(|&j| spin(lattice.get_index(j as usize)))
        .sum()
}

/// Candidate energy term of site `index`: `-s_i * (sum_j s_j + h)`.
///
/// Flipping the site changes the total energy by `-2` times this value.
#[inline]
pub fn candidate_energy(lattice: &Lattice, index: usize, field: f64) -> f64 {
    let si = spin(lattice.get_index(index)) as f64;
    -si * (local_field(lattice, index) as f64 + field)
}

/// Share of the total energy owned by one site.
///
/// Each bond is split evenly between its two ends, so summing this over the
/// lattice gives `-sum_<ij> s_i s_j - h * sum_i s_i`.
#[inline]
pub fn site_energy(lattice: &Lattice, pos: Position, field: f64) -> f64 {
    let index = lattice.index_of(pos.wrap(lattice.extent()));
    let si = spin(lattice.get_index(index)) as f64;
    -si * (0.5 * local_field(lattice, index) as f64 + field)
}

/// Full-lattice energy recomputation.
pub fn compute_energy(lattice: &Lattice, field: f64) -> f64 {
    lattice.aggregate(|pos| site_energy(lattice, pos, field))
}
