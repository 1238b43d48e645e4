use anyhow::{Context, Result};
use abiss_sim::base::is_absent;
use abiss_sim::storage::{ObservedSummary, ReferenceTable};
use abiss_sim::summary::PairState;
use std::path::Path;

pub fn validate_table(path: &Path, observed: Option<&Path>, key: &str) -> Result<()> {
    println!("🔍 Validating reference table: {}", path.display());

    let table = ReferenceTable::read_npz(path)
        .with_context(|| format!("Failed to read reference table {}", path.display()))?;
    println!(
        "✓ Arrays: X, y_model, y_params aligned ({} rows)",
        table.rows()
    );

    let mut total_issues = 0;
    let blocklen = table.blocklen();

    // Every row must hold the same number of blocks per state
    let mut expected: Option<[u64; 3]> = None;
    let mut inconsistent_rows = 0;
    for row in table.features().rows() {
        let row = row.to_vec();
        let mut sums = [0u64; 3];
        for (state, chunk) in PairState::ALL.iter().zip(row.chunks(blocklen)) {
            sums[state.index()] = chunk.iter().sum();
        }
        match expected {
            None => expected = Some(sums),
            Some(first) if first != sums => inconsistent_rows += 1,
            Some(_) => {}
        }
    }
    if inconsistent_rows > 0 {
        println!("✗ Histogram totals: {inconsistent_rows} rows differ from the first row");
        total_issues += 1;
    } else if let Some([pop1, pop2, between]) = expected {
        println!("✓ Histogram totals: within pop1 {pop1}, within pop2 {pop2}, between {between}");
    }

    let mut bad_params = 0;
    for (row, &topology) in table.labels().iter().enumerate() {
        let width = topology.fields().len();
        let values = table.parameters().row(row);
        let own_ok = values.iter().take(width).all(|v| v.is_finite());
        let padding_ok = values.iter().skip(width).all(|v| is_absent(*v));
        if values.len() < width || !own_ok || !padding_ok {
            bad_params += 1;
        }
    }
    if bad_params > 0 {
        println!("✗ Parameters: {bad_params} rows do not match their topology layout");
        total_issues += 1;
    } else {
        println!("✓ Parameters: every row matches its topology layout");
    }

    if let Some(observed_path) = observed {
        let summary = ObservedSummary::load(observed_path, key).with_context(|| {
            format!("Failed to read observed summary {}", observed_path.display())
        })?;
        match summary.state_totals(blocklen) {
            Ok([pop1, pop2, between]) => println!(
                "✓ Observed summary: {} columns (within pop1 {pop1}, within pop2 {pop2}, between {between})",
                summary.len()
            ),
            Err(e) => {
                println!("✗ Observed summary: {e}");
                total_issues += 1;
            }
        }
    }

    if total_issues > 0 {
        anyhow::bail!("Validation failed with {total_issues} issue(s)");
    }
    println!("\n✓ Reference table is valid");
    Ok(())
}
