use super::chain_filter;
use anyhow::Result;
use dtaffinity_core::sequence_from_file;
use std::path::PathBuf;

pub fn execute(target: PathBuf, chains: Vec<String>) -> Result<()> {
    let target = sequence_from_file(&target, chain_filter(&chains))?;
    print!("{}", target.to_fasta());
    Ok(())
}
