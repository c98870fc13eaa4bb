pub mod lattice;
pub mod offsets;
pub mod position;

pub use lattice::{Lattice, N_NEIGHBORS};
pub use offsets::{von_neumann, UNIT_STEPS};
pub use position::{Position, DIMS};
