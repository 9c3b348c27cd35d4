//! Tests for the directed adjacency rule table

#[cfg(test)]
mod tests {
    use hexcollapse::GenerationError;
    use hexcollapse::algorithm::bitset::TerrainSet;
    use hexcollapse::terrain::{AdjacencyRules, Terrain};

    fn set(terrains: &[Terrain]) -> TerrainSet {
        terrains.iter().copied().collect()
    }

    // Verifies the reference policy entries
    #[test]
    fn test_reference_table() {
        let rules = AdjacencyRules::reference();
        assert_eq!(
            rules.allowed_neighbors(Terrain::Water),
            set(&[Terrain::Water, Terrain::Grass, Terrain::Desert])
        );
        assert_eq!(
            rules.allowed_neighbors(Terrain::Grass),
            set(&[Terrain::Grass, Terrain::Forest, Terrain::Desert, Terrain::Water])
        );
        assert!(!rules.permits(Terrain::Grass, Terrain::Mountain));
        assert!(rules.permits(Terrain::Desert, Terrain::Mountain));
        assert_eq!(AdjacencyRules::default(), rules);
    }

    // Verifies the default table is directed, mountain accepts grass but not the reverse
    // Verified by listing mountain in the grass entry
    #[test]
    fn test_reference_table_is_directed() {
        let rules = AdjacencyRules::reference();
        assert!(rules.permits(Terrain::Mountain, Terrain::Grass));
        assert!(!rules.permits(Terrain::Grass, Terrain::Mountain));
        assert!(!rules.is_symmetric());
        assert_ne!(rules.symmetrized(), rules);
    }

    // Verifies every terrain may always neighbour itself
    #[test]
    fn test_every_entry_allows_itself() {
        for rules in [AdjacencyRules::reference(), AdjacencyRules::permissive()] {
            for (source, allowed) in rules.entries() {
                assert!(allowed.contains(source), "{source} must allow itself");
            }
        }
    }

    // Verifies the symmetric closure only ever adds permissions
    #[test]
    fn test_symmetrized_is_a_superset() {
        let asymmetric = AdjacencyRules::from_entries([
            (Terrain::Grass, set(&[Terrain::Grass, Terrain::Water])),
            (Terrain::Water, set(&[Terrain::Water])),
            (Terrain::Mountain, set(&[Terrain::Mountain])),
            (Terrain::Forest, set(&[Terrain::Forest])),
            (Terrain::Desert, set(&[Terrain::Desert])),
        ])
        .expect("Failed to build rules");
        assert!(!asymmetric.is_symmetric());

        let closed = asymmetric.symmetrized();
        assert!(closed.is_symmetric());
        assert!(closed.permits(Terrain::Water, Terrain::Grass));
        for (source, allowed) in asymmetric.entries() {
            assert!(allowed.is_subset(&closed.allowed_neighbors(source)));
        }
        assert!(AdjacencyRules::permissive().is_symmetric());
    }

    // Verifies malformed tables are rejected
    #[test]
    fn test_from_entries_validation() {
        let full = |terrain| (terrain, TerrainSet::all());

        let missing = AdjacencyRules::from_entries([full(Terrain::Grass)]);
        assert!(matches!(missing, Err(GenerationError::InvalidRules { .. })));

        let duplicate = AdjacencyRules::from_entries(
            Terrain::ALL
                .into_iter()
                .map(full)
                .chain([full(Terrain::Water)]),
        );
        assert!(matches!(duplicate, Err(GenerationError::InvalidRules { .. })));

        let not_reflexive = AdjacencyRules::from_entries(Terrain::ALL.into_iter().map(|t| {
            if t == Terrain::Forest {
                (t, set(&[Terrain::Grass]))
            } else {
                full(t)
            }
        }));
        assert!(matches!(
            not_reflexive,
            Err(GenerationError::InvalidRules { .. })
        ));

        let complete = AdjacencyRules::from_entries(Terrain::ALL.into_iter().map(full))
            .expect("Failed to build rules");
        assert_eq!(complete, AdjacencyRules::permissive());
    }
}
