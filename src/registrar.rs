//! Micro-frontend registration list derived from a resolved menu tree.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tree::MenuTreeNode;

/// A sub-application the host must register before routing to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

/// Collect every `_target == "qiankun"` node, pre-order.
///
/// Qualification is per node: a mount point's children are still walked and
/// a non-qualifying parent never hides qualifying descendants.
pub fn collect_mount_targets(tree: &[MenuTreeNode]) -> Vec<MountTarget> {
    let mut targets = Vec::new();
    let mut stack: Vec<&MenuTreeNode> = tree.iter().rev().collect();

    while let Some(node) = stack.pop() {
        let record = &node.record;
        if record.is_mount_point() {
            if record.name.is_none() || record.entry.is_none() {
                warn!(
                    id = %record.id,
                    "mount point is missing name or entry; registering anyway"
                );
            }
            targets.push(MountTarget {
                title: record.title.clone(),
                name: record.name.clone(),
                entry: record.entry.clone(),
            });
        }
        stack.extend(node.children.iter().rev());
    }

    targets
}
