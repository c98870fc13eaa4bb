use std::time::Instant;

use ising_sim::{IsingEngine, Position, Result};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;

const L: i64 = 128;
const N_TEMPS: usize = 16;
const N_MACRO_STEPS: usize = 50;
const ATTEMPTS_PER_SITE: usize = 10;
const MICRO_SAMPLES: usize = 10;

fn main() -> Result<()> {
    let temps: Vec<f64> = (0..N_TEMPS)
        .map(|i| 0.5 + 4.0 * i as f64 / (N_TEMPS - 1) as f64)
        .collect();

    let mut engines: Vec<IsingEngine> = temps
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            IsingEngine::with_random_spins(
                Position::new(L, L),
                t,
                0.0,
                MICRO_SAMPLES,
                Xoshiro256StarStar::seed_from_u64(42 + i as u64),
            )
        })
        .collect::<Result<_>>()?;

    let attempts = (L * L) as usize * ATTEMPTS_PER_SITE;

    println!(
        "Lattice: {}x{}  |  Temps: {}  |  Macro-steps: {}  |  Attempts/step: {}",
        L, L, N_TEMPS, N_MACRO_STEPS, attempts
    );
    println!("{}", "-".repeat(70));

    let t0 = Instant::now();
    engines.par_iter_mut().for_each(|engine| {
        for _ in 0..N_MACRO_STEPS {
            engine.advance(attempts);
        }
    });
    let elapsed = t0.elapsed().as_secs_f64();

    let total = (N_TEMPS * N_MACRO_STEPS * attempts) as f64;
    println!(
        "Total: {:.3} s  |  {:.1} M attempts/s",
        elapsed,
        total / elapsed / 1e6
    );
    for (t, engine) in temps.iter().zip(&engines) {
        println!(
            "T = {:.3}  M = {:+.4}  E = {:+.4}  flip rate = {:.4}",
            t,
            engine.magnetization(),
            engine.energy(),
            engine.flip_rate()
        );
    }
    Ok(())
}
