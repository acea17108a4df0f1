//! Names for throwaway constraints.

use crate::edge::RelationshipEdge;

/// Characters kept from each table or column name.
const FRAGMENT_LEN: usize = 8;

fn fragment(name: &str) -> String {
    name.chars().take(FRAGMENT_LEN).collect()
}

/// Generate a constraint name for `edge` no longer than `max_len`.
///
/// The name is a readable prefix (`fk_<source>_<column>_<destination>`, each
/// cut to eight characters) followed by 32 random hex digits. The prefix is
/// shortened first when the limit is tight.
pub fn generate_constraint_name(edge: &RelationshipEdge, max_len: usize) -> String {
    let suffix = hex::encode(rand::random::<[u8; 16]>());
    let prefix = format!(
        "fk_{}_{}_{}",
        fragment(&edge.source_table),
        fragment(&edge.foreign_key_column),
        fragment(&edge.destination_table)
    );

    let budget = max_len.saturating_sub(suffix.len() + 1);
    if budget == 0 {
        return format!("fk{}", suffix).chars().take(max_len).collect();
    }

    let prefix: String = prefix.chars().take(budget).collect();
    format!("{}_{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> RelationshipEdge {
        RelationshipEdge::new(
            "simple_child_models",
            "second_parent_model_id",
            "second_parent_models",
            "id",
        )
    }

    #[test]
    fn test_name_shape() {
        let name = generate_constraint_name(&edge(), 64);

        assert!(name.starts_with("fk_simple_c_second_p_second_p_"));
        assert_eq!(name.len(), 30 + 32);
        assert!(name.len() <= 64);
    }

    #[test]
    fn test_names_differ() {
        assert_ne!(
            generate_constraint_name(&edge(), 64),
            generate_constraint_name(&edge(), 64)
        );
    }

    #[test]
    fn test_tight_limit() {
        let name = generate_constraint_name(&edge(), 40);
        assert_eq!(name.len(), 40);
        assert!(name.starts_with("fk_simp_"));

        let tiny = generate_constraint_name(&edge(), 10);
        assert_eq!(tiny.len(), 10);
        assert!(tiny.starts_with("fk"));
    }
}
