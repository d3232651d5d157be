//! Adjacency-list trees: threading flat rows into nested nodes.
//!
//! Both taxonomy rows (scoped per vocabulary) and menu links (scoped per
//! menu) are stored as `(id, parent_id, weight)` rows. Callers pass the rows
//! of a single scope; nothing here crosses scopes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A row that participates in a tree.
pub trait TreeNode {
    /// Row id.
    fn node_id(&self) -> i64;
    /// Parent row id, `None` for roots.
    fn parent_id(&self) -> Option<i64>;
    /// Sibling order (lower first). Ties break on id.
    fn weight(&self) -> i32;
}

/// A row with its nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threaded<T> {
    #[serde(flatten)]
    pub node: T,
    pub children: Vec<Threaded<T>>,
}

/// Nest flat rows. Rows whose parent is absent from the set become roots.
///
/// Rows caught in a parent cycle are unreachable from any root and are
/// left out.
pub fn thread<T: TreeNode>(nodes: Vec<T>) -> Vec<Threaded<T>> {
    let ids: HashSet<i64> = nodes.iter().map(TreeNode::node_id).collect();
    let mut by_parent: HashMap<Option<i64>, Vec<T>> = HashMap::new();
    for node in nodes {
        let parent = node.parent_id().filter(|p| ids.contains(p));
        by_parent.entry(parent).or_default().push(node);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|n| (n.weight(), n.node_id()));
    }
    build(None, &mut by_parent)
}

fn build<T: TreeNode>(
    parent: Option<i64>,
    by_parent: &mut HashMap<Option<i64>, Vec<T>>,
) -> Vec<Threaded<T>> {
    let Some(siblings) = by_parent.remove(&parent) else {
        return Vec::new();
    };
    siblings
        .into_iter()
        .map(|node| {
            let children = build(Some(node.node_id()), by_parent);
            Threaded { node, children }
        })
        .collect()
}

/// Pre-order walk yielding `(depth, node)`, roots at depth 0.
pub fn flatten<T>(threaded: &[Threaded<T>]) -> Vec<(usize, &T)> {
    fn walk<'a, T>(nodes: &'a [Threaded<T>], depth: usize, out: &mut Vec<(usize, &'a T)>) {
        for n in nodes {
            out.push((depth, &n.node));
            walk(&n.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(threaded, 0, &mut out);
    out
}

/// Ids of every row below `id` (not including `id`).
pub fn descendant_ids<T: TreeNode>(nodes: &[T], id: i64) -> Vec<i64> {
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for n in nodes {
        if let Some(parent) = n.parent_id() {
            children.entry(parent).or_default().push(n.node_id());
        }
    }

    let mut seen = HashSet::from([id]);
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        for &child in children.get(&current).map(Vec::as_slice).unwrap_or(&[]) {
            if seen.insert(child) {
                out.push(child);
                stack.push(child);
            }
        }
    }
    out
}

/// Siblings of `id` (including itself) in display order.
pub fn siblings<T: TreeNode>(nodes: &[T], id: i64) -> Vec<&T> {
    let Some(parent) = nodes.iter().find(|n| n.node_id() == id).map(|n| n.parent_id()) else {
        return Vec::new();
    };
    let mut out: Vec<&T> = nodes.iter().filter(|n| n.parent_id() == parent).collect();
    out.sort_by_key(|n| (n.weight(), n.node_id()));
    out
}

/// Weight that places a new row after every current child of `parent`.
pub fn next_weight<T: TreeNode>(nodes: &[T], parent: Option<i64>) -> i32 {
    nodes
        .iter()
        .filter(|n| n.parent_id() == parent)
        .map(TreeNode::weight)
        .max()
        .map_or(0, |w| w + 1)
}
