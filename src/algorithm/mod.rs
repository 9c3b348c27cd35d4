/// Fixed-width terrain sets backed by a bit array
pub mod bitset;
/// Generation driver, configuration and observer hooks
pub mod executor;
/// Constraint propagation over the adjacency graph
pub mod propagation;
/// Minimum-remaining-values cell selection and random terrain choice
pub mod selection;
/// Per-cell possibility storage
pub mod store;
