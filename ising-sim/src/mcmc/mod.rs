pub mod engine;
pub mod metropolis;
pub mod schedule;

pub use engine::IsingEngine;
pub use metropolis::{accept, acceptance_probability};
pub use schedule::Schedule;
