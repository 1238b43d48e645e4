use abiss_sim::base::Topology;
use abiss_sim::priors::PriorConfig;
use abiss_sim::simulation::RunConfig;
use abiss_sim::storage::ReferenceTable;

fn prior(config: &PriorConfig) -> String {
    let params: Vec<String> = config.params.iter().map(|p| p.to_string()).collect();
    format!("{} [{}]", config.distribution, params.join(" "))
}

pub fn print_config(config: &RunConfig) {
    let sim = &config.simulation;
    let [pop1, pop2, between] = sim.num_blocks_per_state;

    println!("\n📋 Run Configuration");
    println!(
        "  • Topologies: {}",
        config
            .topologies
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  • Simulations per topology: {} [-n, --num-sims]",
        config.num_sims_per_topology
    );
    match config.threads {
        Some(threads) => println!("  • Threads: {threads} [-t, --threads]"),
        None => println!("  • Threads: all logical CPUs [-t, --threads]"),
    }
    if let Some(seed) = config.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }

    println!("\n🎲 Priors");
    println!("  • Ne: {} [--ne-prior]", prior(&config.priors.ne));
    println!("  • tau: {} [--tau-prior]", prior(&config.priors.tau));
    println!("  • M: {} [--m-prior]", prior(&config.priors.migration));

    println!("\n🧬 Blocks");
    println!("  • Block length: {} bp [--blocklen]", sim.blocklen);
    println!("  • Mutation rate: {:.2e} [--mutation-rate]", sim.mutation_rate);
    println!(
        "  • Recombination rate: {:.2e} [--recombination-rate]",
        sim.recombination_rate
    );
    println!("  • Blocks per state: within pop1 {pop1}, within pop2 {pop2}, between {between} [--num-blocks]");
}

pub fn print_table(table: &ReferenceTable) {
    println!("\n📊 Reference Table");
    println!("  • Rows: {}", table.rows());
    println!(
        "  • Features (X): {} x {} (blocklen {})",
        table.features().nrows(),
        table.features().ncols(),
        table.blocklen()
    );
    println!(
        "  • Parameters (y_params): {} x {}",
        table.parameters().nrows(),
        table.param_width()
    );

    println!("\n🏷️  Topologies");
    for topology in Topology::ALL {
        let count = table.count(topology);
        if count > 0 {
            println!(
                "  • {:<10} {:>8} rows, {} parameters",
                topology.name(),
                count,
                topology.fields().len()
            );
        }
    }
}
