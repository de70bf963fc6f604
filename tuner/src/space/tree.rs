//! The per-group tree: a flat arena of [`Node`]s addressed by [`NodeId`], in the teacher's
//! `LinkSet`/`ChunkId` idiom rather than as boxed recursive structures.

use crate::parameter::{Bindings, Parameter};
use crate::value::Value;

/// Index of a [`Node`] within a single [`GroupTree`]'s arena. Not meaningful across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// A single bound value at one level of a [`GroupTree`], together with the (already-pruned)
/// children that extend it and the number of leaves beneath it.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub value: Value,
    pub children: Vec<NodeId>,
    pub leaf_count: u64,
}

/// The tree of valid assignments for one maximal contiguous group of mutually dependent
/// parameters.
#[derive(Debug, Clone)]
pub(crate) struct GroupTree {
    arena: Vec<Node>,
    /// The valid values of the group's first parameter; every configuration's path starts at one
    /// of these.
    roots: Vec<NodeId>,
    /// Sum of the leaf counts of `roots`, i.e. the number of valid assignments for this group.
    leaf_count: u64,
}

impl GroupTree {
    /// Builds the tree for a contiguous slice of mutually-dependent `parameters`, depth-first,
    /// dropping any node whose subtree contains no valid leaf.
    pub fn build(parameters: &[Parameter]) -> Self {
        let mut arena = Vec::new();
        let mut path: Vec<(String, Value)> = Vec::with_capacity(parameters.len());
        let roots = build_level(parameters, 0, &mut path, &mut arena);
        let leaf_count = sum_leaf_counts(&roots, &arena);
        Self {
            arena,
            roots,
            leaf_count,
        }
    }

    /// The number of valid configurations of this group, i.e. the number of leaves in the tree.
    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.0]
    }

    /// Descends the tree following `local_idx` (in `[0, self.leaf_count())`), returning the bound
    /// values of the group's parameters in declared order.
    pub fn index_to_values(&self, local_idx: u64) -> Vec<Value> {
        self.index_to_path(local_idx).into_iter().map(|(v, _)| v).collect()
    }

    /// As [`Self::index_to_values`], but also returns a coordinate per level which, when fed back
    /// through [`Self::coord_to_values`], reproduces the same path (the `(position + 1) / n`
    /// representative of the sibling range the path actually chose).
    pub fn index_to_path(&self, mut local_idx: u64) -> Vec<(Value, f64)> {
        assert!(local_idx < self.leaf_count, "group-local index out of range");
        let mut path = Vec::new();
        let mut children = self.roots.as_slice();
        loop {
            let mut chosen_pos = 0;
            let chosen_node = children
                .iter()
                .enumerate()
                .map(|(pos, &id)| (pos, self.node(id)))
                .find(|(pos, node)| {
                    if local_idx < node.leaf_count {
                        chosen_pos = *pos;
                        true
                    } else {
                        local_idx -= node.leaf_count;
                        false
                    }
                })
                .map(|(_, node)| node)
                .expect("leaf_count accounting is inconsistent with the tree shape");
            let coord = (chosen_pos + 1) as f64 / children.len() as f64;
            path.push((chosen_node.value.clone(), coord));
            if chosen_node.children.is_empty() {
                return path;
            }
            children = &chosen_node.children;
        }
    }

    /// Descends the tree following one coordinate per level, returning the bound values of the
    /// group's parameters in declared order. `coords` must have one entry per parameter in this
    /// group, each in `(0, 1]`.
    pub fn coord_to_values(&self, coords: &[f64]) -> Vec<Value> {
        let mut values = Vec::with_capacity(coords.len());
        let mut children = self.roots.as_slice();
        for &c in coords {
            debug_assert!(c > 0.0 && c <= 1.0, "coordinate {c} out of (0, 1]");
            let n = children.len() as f64;
            let choice = ((c * n).ceil() as i64 - 1).clamp(0, children.len() as i64 - 1) as usize;
            let node = self.node(children[choice]);
            values.push(node.value.clone());
            if node.children.is_empty() {
                return values;
            }
            children = &node.children;
        }
        values
    }

    /// The group-local index of `values` (one value per parameter in this group, in order),
    /// i.e. the inverse of [`Self::index_to_values`].
    ///
    /// Returns `None` if `values` doesn't correspond to any valid path through this tree.
    pub fn values_to_index(&self, values: &[Value]) -> Option<u64> {
        let mut idx = 0u64;
        let mut children = self.roots.as_slice();
        for value in values {
            let mut offset = 0u64;
            let mut found = None;
            for &id in children {
                let node = self.node(id);
                if node.value == *value {
                    found = Some(node);
                    break;
                }
                offset += node.leaf_count;
            }
            let node = found?;
            idx += offset;
            if node.children.is_empty() {
                return Some(idx);
            }
            children = &node.children;
        }
        None
    }
}

fn build_level(
    parameters: &[Parameter],
    level: usize,
    path: &mut Vec<(String, Value)>,
    arena: &mut Vec<Node>,
) -> Vec<NodeId> {
    let param = &parameters[level];
    let range = param.range();
    let is_last_level = level + 1 == parameters.len();

    let mut node_ids = Vec::new();
    for i in 0..range.size() {
        let candidate = range.at(i);
        path.push((param.name().to_owned(), candidate.clone()));

        let satisfies = match param.constraint() {
            Some(constraint) => constraint.is_satisfied(Bindings::new(path)),
            None => true,
        };

        if satisfies {
            if is_last_level {
                arena.push(Node {
                    value: candidate,
                    children: Vec::new(),
                    leaf_count: 1,
                });
                node_ids.push(NodeId(arena.len() - 1));
            } else {
                let children = build_level(parameters, level + 1, path, arena);
                let leaf_count = sum_leaf_counts(&children, arena);
                if leaf_count > 0 {
                    arena.push(Node {
                        value: candidate,
                        children,
                        leaf_count,
                    });
                    node_ids.push(NodeId(arena.len() - 1));
                }
            }
        }

        path.pop();
    }
    node_ids
}

fn sum_leaf_counts(ids: &[NodeId], arena: &[Node]) -> u64 {
    ids.iter().map(|id| arena[id.0].leaf_count).sum()
}
