use anyhow::{Context, Result};
use abiss_sim::base::Topology;
use abiss_sim::priors::PriorConfig;
use abiss_sim::simulation::{PriorsConfig, RunConfig, SimulationConfig};
use tracing::debug;

use crate::args::InitArgs;
use crate::defaults;
use crate::printing::print_config;

pub fn init_config(args: &InitArgs) -> Result<()> {
    println!("🧬 ABISS - Reference Table Configuration");
    println!("========================================\n");

    if args.output.exists() {
        anyhow::bail!(
            "Refusing to overwrite existing file: {}",
            args.output.display()
        );
    }

    let config = build_config(args)?;
    config.validate().context("Invalid configuration")?;
    debug!(?config, "validated run configuration");

    print_config(&config);

    config
        .to_json_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\n✓ Configuration written: {}", args.output.display());
    Ok(())
}

fn prior(distribution: &str, params: Option<&Vec<f64>>, default: &[f64]) -> PriorConfig {
    PriorConfig::new(
        distribution,
        params.cloned().unwrap_or_else(|| default.to_vec()),
    )
}

pub fn build_config(args: &InitArgs) -> Result<RunConfig> {
    let mut simulation =
        SimulationConfig::new(args.mutation_rate, args.recombination_rate, args.blocklen);
    if let Some(blocks) = &args.num_blocks {
        let blocks: [usize; 3] = blocks
            .as_slice()
            .try_into()
            .context("--num-blocks takes exactly three values")?;
        simulation = simulation.with_num_blocks(blocks);
    } else {
        simulation = simulation.with_num_blocks(defaults::NUM_BLOCKS);
    }

    let priors = PriorsConfig {
        ne: prior(
            &args.ne_prior,
            args.ne_prior_params.as_ref(),
            &defaults::NE_PRIOR_PARAMS,
        ),
        tau: prior(
            &args.tau_prior,
            args.tau_prior_params.as_ref(),
            &defaults::TAU_PRIOR_PARAMS,
        ),
        migration: prior(
            &args.m_prior,
            args.m_prior_params.as_ref(),
            &defaults::M_PRIOR_PARAMS,
        ),
    };

    let mut config = RunConfig::new(simulation)
        .with_priors(priors)
        .with_num_sims(args.num_sims);

    if let Some(names) = &args.topologies {
        let topologies = names
            .iter()
            .map(|name| name.parse::<Topology>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --topologies")?;
        config = config.with_topologies(topologies);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}
