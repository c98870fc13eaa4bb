use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ising")]
#[command(author, version, about = "Sweep 2-D Ising simulations over temperature and field")]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(short, long, default_value = "settings.json", env = "ISING_SETTINGS")]
    pub settings: PathBuf,

    /// Override the base seed from the settings file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Force live lattice rendering on, whatever the settings say
    #[arg(long)]
    pub visualize: bool,

    /// Hide the progress bar
    #[arg(long, short)]
    pub quiet: bool,
}
