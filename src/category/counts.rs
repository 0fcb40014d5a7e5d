use std::collections::HashMap;

use super::tree::CategoryTree;
use super::types::{CategoryId, CategoryRecord};

/// Extract the leaf counts carried by repository records.
pub fn leaf_counts(records: &[CategoryRecord]) -> HashMap<CategoryId, u64> {
    records
        .iter()
        .map(|record| (record.category.id, record.leaf_count))
        .collect()
}

/// Roll leaf counts up through the tree.
///
/// Every category in the tree gets an entry: its own leaf count plus the leaf
/// counts of all its descendants. Ids missing from `leaf_counts` count as 0;
/// ids not present in the tree are ignored.
pub fn aggregate_counts(
    tree: &CategoryTree,
    leaf_counts: &HashMap<CategoryId, u64>,
) -> HashMap<CategoryId, u64> {
    let leaf = |id: CategoryId| leaf_counts.get(&id).copied().unwrap_or(0);

    let mut aggregated: HashMap<CategoryId, u64> = tree
        .traverse()
        .map(|(category, _)| (category.id, leaf(category.id)))
        .collect();

    for (category, _) in tree.traverse() {
        let count = leaf(category.id);
        if count == 0 {
            continue;
        }
        for ancestor in tree.ancestors(category.id) {
            *aggregated.entry(ancestor.id).or_default() += count;
        }
    }

    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use proptest::prelude::*;

    #[test]
    fn test_chain_rolls_up() {
        let tree = CategoryTree::build(vec![
            Category::new(1, "A", "a", None),
            Category::new(2, "B", "b", Some(1)),
            Category::new(3, "C", "c", Some(2)),
        ])
        .unwrap();
        let leaves = HashMap::from([(1, 2), (2, 0), (3, 3)]);

        let counts = aggregate_counts(&tree, &leaves);
        assert_eq!(counts[&3], 3);
        assert_eq!(counts[&2], 3);
        assert_eq!(counts[&1], 5);
    }

    #[test]
    fn test_missing_ids_count_as_zero() {
        let tree = CategoryTree::build(vec![
            Category::new(1, "A", "a", None),
            Category::new(2, "B", "b", Some(1)),
        ])
        .unwrap();

        let counts = aggregate_counts(&tree, &HashMap::new());
        assert_eq!(counts, HashMap::from([(1, 0), (2, 0)]));
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let tree = CategoryTree::build(vec![Category::new(1, "A", "a", None)]).unwrap();
        let counts = aggregate_counts(&tree, &HashMap::from([(1, 1), (99, 50)]));
        assert_eq!(counts, HashMap::from([(1, 1)]));
    }

    #[test]
    fn test_siblings_sum_into_parent() {
        let tree = CategoryTree::build(vec![
            Category::new(1, "Root", "root", None),
            Category::new(2, "Left", "left", Some(1)),
            Category::new(3, "Right", "right", Some(1)),
            Category::new(4, "Other", "other", None),
        ])
        .unwrap();
        let counts = aggregate_counts(&tree, &HashMap::from([(2, 4), (3, 6), (4, 1)]));
        assert_eq!(counts[&1], 10);
        assert_eq!(counts[&4], 1);
    }

    #[test]
    fn test_leaf_counts_from_records() {
        let records = vec![
            CategoryRecord::new(Category::new(1, "A", "a", None), 7),
            CategoryRecord::new(Category::new(2, "B", "b", Some(1)), 0),
        ];
        assert_eq!(leaf_counts(&records), HashMap::from([(1, 7), (2, 0)]));
    }

    proptest! {
        #[test]
        fn prop_aggregate_equals_subtree_sum(
            parents in prop::collection::vec(
                (any::<prop::sample::Index>(), any::<bool>()),
                1..30,
            ),
            leaves in prop::collection::vec(0u64..50, 30),
        ) {
            let categories: Vec<_> = parents
                .iter()
                .enumerate()
                .map(|(i, (parent, is_root))| {
                    let parent_id = if i == 0 || *is_root {
                        None
                    } else {
                        Some(parent.index(i) as CategoryId)
                    };
                    Category::new(i as CategoryId, format!("n{i}"), format!("s{i}"), parent_id)
                })
                .collect();
            let leaf_map: HashMap<CategoryId, u64> = (0..categories.len())
                .map(|i| (i as CategoryId, leaves[i]))
                .collect();

            let tree = CategoryTree::build(categories).unwrap();
            let counts = aggregate_counts(&tree, &leaf_map);

            for (category, _) in tree.traverse() {
                let expected: u64 = tree
                    .subtree_ids(category.id)
                    .unwrap()
                    .iter()
                    .map(|id| leaf_map[id])
                    .sum();
                prop_assert_eq!(counts[&category.id], expected);
            }
        }
    }
}
