use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration path
    #[arg(short, long, default_value = crate::defaults::OUTPUT_CONFIG)]
    pub output: PathBuf,

    /// Block length used in inference and simulations (rule of thumb: 3/dxy)
    #[arg(long)]
    pub blocklen: usize,

    /// Per-site mutation rate
    #[arg(long)]
    pub mutation_rate: f64,

    /// Per-site recombination rate
    #[arg(long)]
    pub recombination_rate: f64,

    /// Blocks per state [within pop1, within pop2, between]
    #[arg(long, num_args = 3, value_names = ["POP1", "POP2", "BETWEEN"])]
    pub num_blocks: Option<Vec<usize>>,

    /// Prior distribution for Ne (uniform, gamma or exponential)
    #[arg(long = "ne-prior", default_value = crate::defaults::NE_PRIOR)]
    pub ne_prior: String,

    /// Parameters for the Ne prior; [min max] for uniform,
    /// [alpha loc scale] for gamma, [loc scale] for exponential
    #[arg(long = "ne-prior-params", num_args = 1.., allow_negative_numbers = true)]
    pub ne_prior_params: Option<Vec<f64>>,

    /// Prior distribution for tau
    #[arg(long = "tau-prior", default_value = crate::defaults::TAU_PRIOR)]
    pub tau_prior: String,

    /// Parameters for the tau prior
    #[arg(long = "tau-prior-params", num_args = 1.., allow_negative_numbers = true)]
    pub tau_prior_params: Option<Vec<f64>>,

    /// Prior distribution for M
    #[arg(long = "m-prior", default_value = crate::defaults::M_PRIOR)]
    pub m_prior: String,

    /// Parameters for the M prior
    #[arg(long = "m-prior-params", num_args = 1.., allow_negative_numbers = true)]
    pub m_prior_params: Option<Vec<f64>>,

    /// Topologies to simulate, comma separated (default: all six)
    #[arg(long, value_delimiter = ',')]
    pub topologies: Option<Vec<String>>,

    /// Number of simulations per topology
    #[arg(short = 'n', long, default_value_t = crate::defaults::NUM_SIMS_PER_TOPOLOGY)]
    pub num_sims: usize,

    /// Worker threads (default: all logical CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Random seed for a reproducible build
    #[arg(long)]
    pub seed: Option<u64>,
}
