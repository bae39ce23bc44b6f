use candle_core::IndexOp;
use dtaffinity_core::{
    sequence_from_file, MolGraph, ProteinEncoding, ATOM_FDIM, BOND_FDIM, MAX_NB, PROTEIN_ALPHABET,
};
use dtaffinity_test_data::TestFile;

#[test]
fn test_target_to_one_hot() -> anyhow::Result<()> {
    let (pdb_file, _tmp) = TestFile::target_01().create_temp()?;
    let target = sequence_from_file(&pdb_file, None)?;
    let encoding = ProteinEncoding::new(&target.sequence);
    let expected = format!("MKTAYWGSEC{}", "?".repeat(990));
    assert_eq!(encoding.symbols(), expected);
    assert_eq!(encoding.unknown(), 0);

    let one_hot = encoding.to_tensor(&candle_core::Device::Cpu)?;
    assert_eq!(one_hot.dims(), &[PROTEIN_ALPHABET.len(), 1000]);
    // one hot entry per column; padding columns light up the `?` row
    let column_sums: Vec<f32> = one_hot.sum(0)?.to_vec1()?;
    assert!(column_sums.iter().all(|&s| s == 1.0));
    let padding_row: Vec<f32> = one_hot.i(0)?.to_vec1()?;
    assert!(padding_row[..10].iter().all(|&v| v == 0.0));
    assert!(padding_row[10..].iter().all(|&v| v == 1.0));
    Ok(())
}

#[test]
fn test_drug_graph_sizes() -> anyhow::Result<()> {
    for (smiles, atoms, bonds) in [
        ("CCO", 3, 2),
        ("CC(=O)Oc1ccccc1C(=O)O", 13, 13),
        ("Cn1cnc2c1c(=O)n(C)c(=O)n2C", 14, 15),
    ] {
        let graph = MolGraph::from_smiles(smiles)?;
        assert_eq!(graph.n_atoms(), atoms, "{smiles}");
        // two directed rows per bond plus padding
        assert_eq!(graph.n_bonds(), 2 * bonds + 1, "{smiles}");
        assert_eq!(graph.fatoms.len(), atoms * ATOM_FDIM);
        assert_eq!(graph.fbonds.len(), (2 * bonds + 1) * (ATOM_FDIM + BOND_FDIM));
        assert_eq!(graph.agraph.len(), atoms * MAX_NB);
    }
    Ok(())
}

#[test]
fn test_unreadable_smiles_is_empty() -> anyhow::Result<()> {
    assert!(MolGraph::from_smiles("C1CC")?.is_empty());
    assert!(MolGraph::from_smiles("")?.is_empty());
    Ok(())
}
