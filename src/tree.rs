//! Flat `{id, parentId, order}` records to a nested menu forest.
//!
//! The builder is total: every input record appears in the output exactly
//! once. Records whose parent is not in the list become roots. Siblings are
//! ordered by `order` ascending with a stable sort; records without an order
//! go after their ordered siblings. Parent chains that loop are rejected
//! with [`MenuError::CyclicHierarchy`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MenuError, Result};
use crate::record::MenuRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTreeNode {
    #[serde(flatten)]
    pub record: MenuRecord,
    #[serde(default)]
    pub children: Vec<MenuTreeNode>,
}

impl MenuTreeNode {
    pub fn leaf(record: MenuRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Deep parent chains are valid input; tear them down without recursing.
impl Drop for MenuTreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Total node count of a forest.
pub fn forest_size(forest: &[MenuTreeNode]) -> usize {
    forest.iter().map(MenuTreeNode::size).sum()
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Unvisited,
    OnPath,
    Rooted,
}

pub fn build_menu_tree(records: Vec<MenuRecord>) -> Result<Vec<MenuTreeNode>> {
    let keys: Vec<String> = records.iter().map(|r| r.id.as_text()).collect();

    // First occurrence of an id is the one children attach to.
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        index.entry(key.as_str()).or_insert(i);
    }

    let parent_of: Vec<Option<usize>> = records
        .iter()
        .map(|r| {
            r.parent_id
                .as_ref()
                .and_then(|p| index.get(p.as_text().as_str()).copied())
        })
        .collect();

    check_acyclic(&parent_of, &keys)?;

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (i, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let order_key = |i: &usize| {
        let order = records[*i].order;
        (order.is_none(), order.unwrap_or(0))
    };
    roots.sort_by_key(order_key);
    for siblings in children.iter_mut() {
        siblings.sort_by_key(order_key);
    }

    Ok(assemble(records, &roots, &children))
}

/// Every parent chain must end at a root. Reports the first record found on
/// a loop.
fn check_acyclic(parent_of: &[Option<usize>], keys: &[String]) -> Result<()> {
    let mut state = vec![Visit::Unvisited; parent_of.len()];
    let mut path = Vec::new();

    for start in 0..parent_of.len() {
        let mut current = Some(start);
        while let Some(i) = current {
            match state[i] {
                Visit::Rooted => break,
                Visit::OnPath => return Err(MenuError::CyclicHierarchy(keys[i].clone())),
                Visit::Unvisited => {
                    state[i] = Visit::OnPath;
                    path.push(i);
                    current = parent_of[i];
                }
            }
        }
        for i in path.drain(..) {
            state[i] = Visit::Rooted;
        }
    }
    Ok(())
}

/// Post-order assembly with an explicit stack: a node is built once all of
/// its children are.
fn assemble(
    records: Vec<MenuRecord>,
    roots: &[usize],
    children: &[Vec<usize>],
) -> Vec<MenuTreeNode> {
    let mut slots: Vec<Option<MenuRecord>> = records.into_iter().map(Some).collect();
    let mut built: Vec<Option<MenuTreeNode>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);

    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            let kids = children[i]
                .iter()
                .filter_map(|c| built[*c].take())
                .collect();
            if let Some(record) = slots[i].take() {
                built[i] = Some(MenuTreeNode {
                    record,
                    children: kids,
                });
            }
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|&c| (c, false)));
        }
    }

    roots.iter().filter_map(|r| built[*r].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;

    fn titles(nodes: &[MenuTreeNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| n.record.title.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn empty_input_is_empty_forest() {
        assert!(build_menu_tree(vec![]).unwrap().is_empty());
    }

    #[test]
    fn nests_children_under_parents() {
        let tree = build_menu_tree(vec![
            MenuRecord::new("1").with_title("Sys"),
            MenuRecord::new("2").with_parent("1").with_title("Users"),
            MenuRecord::new("3").with_parent("2").with_title("Detail"),
        ])
        .unwrap();

        assert_eq!(titles(&tree), vec!["Sys"]);
        assert_eq!(titles(&tree[0].children), vec!["Users"]);
        assert_eq!(titles(&tree[0].children[0].children), vec!["Detail"]);
        assert_eq!(forest_size(&tree), 3);
    }

    #[test]
    fn missing_parent_becomes_root() {
        let tree = build_menu_tree(vec![
            MenuRecord::new("1").with_title("a"),
            MenuRecord::new("2").with_parent("404").with_title("orphan"),
        ])
        .unwrap();
        assert_eq!(titles(&tree), vec!["a", "orphan"]);
    }

    #[test]
    fn numeric_and_text_ids_match() {
        let tree = build_menu_tree(vec![
            MenuRecord::new(1).with_title("root"),
            MenuRecord::new("2").with_parent("1").with_title("child"),
        ])
        .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].record.id, RecordId::Text("2".into()));
    }

    #[test]
    fn siblings_sorted_stably() {
        let tree = build_menu_tree(vec![
            MenuRecord::new("a").with_title("a").with_order(2),
            MenuRecord::new("b").with_title("b").with_order(1),
            MenuRecord::new("c").with_title("c").with_order(1),
        ])
        .unwrap();
        assert_eq!(titles(&tree), vec!["b", "c", "a"]);
    }

    #[test]
    fn unordered_siblings_go_last() {
        let tree = build_menu_tree(vec![
            MenuRecord::new("x").with_title("x"),
            MenuRecord::new("y").with_title("y").with_order(5),
            MenuRecord::new("z").with_title("z"),
        ])
        .unwrap();
        assert_eq!(titles(&tree), vec!["y", "x", "z"]);
    }

    #[test]
    fn children_sorted_within_group() {
        let tree = build_menu_tree(vec![
            MenuRecord::new("p").with_title("p"),
            MenuRecord::new("1").with_parent("p").with_title("late").with_order(20),
            MenuRecord::new("2").with_parent("p").with_title("early").with_order(10),
        ])
        .unwrap();
        assert_eq!(titles(&tree[0].children), vec!["early", "late"]);
    }

    #[test]
    fn duplicate_ids_are_all_kept() {
        let tree = build_menu_tree(vec![
            MenuRecord::new("1").with_title("first"),
            MenuRecord::new("1").with_title("second"),
            MenuRecord::new("2").with_parent("1").with_title("child"),
        ])
        .unwrap();
        assert_eq!(forest_size(&tree), 3);
        assert_eq!(titles(&tree[0].children), vec!["child"]);
    }

    #[test]
    fn two_node_cycle_rejected() {
        let err = build_menu_tree(vec![
            MenuRecord::new("1").with_parent("2"),
            MenuRecord::new("2").with_parent("1"),
        ])
        .unwrap_err();
        assert!(matches!(err, MenuError::CyclicHierarchy(_)));
    }

    #[test]
    fn self_parent_rejected() {
        let err = build_menu_tree(vec![
            MenuRecord::new("root"),
            MenuRecord::new("7").with_parent("7"),
        ])
        .unwrap_err();
        assert_eq!(err, MenuError::CyclicHierarchy("7".into()));
    }

    #[test]
    fn chain_into_cycle_rejected() {
        let err = build_menu_tree(vec![
            MenuRecord::new("leaf").with_parent("a"),
            MenuRecord::new("a").with_parent("b"),
            MenuRecord::new("b").with_parent("a"),
        ])
        .unwrap_err();
        assert!(matches!(err, MenuError::CyclicHierarchy(_)));
    }

    #[test]
    fn serializes_flat_with_children() {
        let tree = build_menu_tree(vec![MenuRecord::new("1").with_title("Sys")]).unwrap();
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"id": "1", "title": "Sys", "children": []}])
        );
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        let depth = 10_000;
        let records: Vec<MenuRecord> = (0..depth)
            .map(|i| {
                let record = MenuRecord::new(i.to_string());
                if i == 0 {
                    record
                } else {
                    record.with_parent((i - 1).to_string())
                }
            })
            .rev()
            .collect();

        let tree = build_menu_tree(records).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(forest_size(&tree), depth);

        let mut node = &tree[0];
        let mut levels = 1;
        while let Some(child) = node.children.first() {
            node = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(node.record.id, RecordId::Text((depth - 1).to_string()));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use proptest::sample::Index;
        use std::collections::HashSet;

        /// Unique ids; each record is a root, an orphan, or a child of an
        /// earlier record, so no input loops. Input order is shuffled.
        fn arb_records() -> impl Strategy<Value = Vec<MenuRecord>> {
            prop::collection::vec(
                (any::<Index>(), 0u8..4, prop::option::of(0i64..3)),
                0..48,
            )
            .prop_map(|specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (pick, kind, order))| {
                        let record = MenuRecord::new(i.to_string());
                        let mut record = match kind {
                            0 => record,
                            1 => record.with_parent(format!("missing-{i}")),
                            _ if i > 0 => record.with_parent(pick.index(i).to_string()),
                            _ => record,
                        };
                        record.order = order;
                        record
                    })
                    .collect::<Vec<_>>()
            })
            .prop_shuffle()
        }

        /// Every sibling group of the forest, roots first.
        fn sibling_groups(forest: &[MenuTreeNode]) -> Vec<&[MenuTreeNode]> {
            let mut groups = vec![forest];
            let mut stack: Vec<&MenuTreeNode> = forest.iter().collect();
            while let Some(node) = stack.pop() {
                groups.push(&node.children);
                stack.extend(node.children.iter());
            }
            groups
        }

        proptest! {
            #[test]
            fn every_record_lands_once(records in arb_records()) {
                let n = records.len();
                let ids: HashSet<String> = records.iter().map(|r| r.id.as_text()).collect();
                let expected_roots: HashSet<String> = records
                    .iter()
                    .filter(|r| r.parent_id.as_ref().map_or(true, |p| !ids.contains(&p.as_text())))
                    .map(|r| r.id.as_text())
                    .collect();

                let tree = build_menu_tree(records).unwrap();

                prop_assert_eq!(forest_size(&tree), n);
                let roots: HashSet<String> = tree.iter().map(|t| t.record.id.as_text()).collect();
                prop_assert_eq!(roots, expected_roots);
            }

            #[test]
            fn children_hang_off_their_parent(records in arb_records()) {
                let tree = build_menu_tree(records).unwrap();
                let mut stack: Vec<&MenuTreeNode> = tree.iter().collect();
                while let Some(node) = stack.pop() {
                    for child in &node.children {
                        prop_assert_eq!(child.record.parent_id.as_ref(), Some(&node.record.id));
                    }
                    stack.extend(node.children.iter());
                }
            }

            #[test]
            fn siblings_ascend_stably(records in arb_records()) {
                let position: HashMap<String, usize> = records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (r.id.as_text(), i))
                    .collect();
                let key = |node: &MenuTreeNode| {
                    let order = node.record.order;
                    (order.is_none(), order.unwrap_or(0), position[&node.record.id.as_text()])
                };

                let tree = build_menu_tree(records).unwrap();
                for group in sibling_groups(&tree) {
                    for pair in group.windows(2) {
                        prop_assert!(key(&pair[0]) < key(&pair[1]));
                    }
                }
            }
        }
    }
}
