pub mod featurize;
pub mod predict;
pub mod sequence;

/// `None` when no chain filter was given.
pub(crate) fn chain_filter(chains: &[String]) -> Option<&[String]> {
    (!chains.is_empty()).then_some(chains)
}
