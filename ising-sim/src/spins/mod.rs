pub mod energy;

pub use energy::{candidate_energy, compute_energy, local_field, site_energy, spin};
