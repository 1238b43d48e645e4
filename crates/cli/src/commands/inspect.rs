use anyhow::{Context, Result};
use abiss_sim::storage::ReferenceTable;
use std::path::Path;

use crate::printing::print_table;

pub fn show_table(path: &Path) -> Result<()> {
    println!("🔍 Reference table: {}", path.display());

    let table = ReferenceTable::read_npz(path)
        .with_context(|| format!("Failed to read reference table {}", path.display()))?;
    print_table(&table);
    Ok(())
}
