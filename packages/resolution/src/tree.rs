//! Arena-backed multiway tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`], so
//! parent links need no shared ownership.

/// Index of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A forest of nodes with parent back-references.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a parentless node.
    pub fn add_root(&mut self, value: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Adds `value` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, value: T) -> NodeId {
        let id = self.add_root(value);
        self.nodes[id.0].parent = Some(parent);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The value stored at `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &T {
        &self.nodes[id.0].value
    }

    /// Mutable access to the value stored at `id`.
    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.0].value
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Node ids of the subtree rooted at `from`, parents before children.
    #[must_use]
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Preorder ids of the subtree rooted at `from` whose values match.
    pub fn filter(&self, from: NodeId, mut predicate: impl FnMut(&T) -> bool) -> Vec<NodeId> {
        self.preorder(from)
            .into_iter()
            .filter(|id| predicate(self.get(*id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ```text
    /// a
    /// ├── b
    /// │   └── d
    /// └── c
    /// ```
    fn sample() -> (Tree<&'static str>, [NodeId; 4]) {
        let mut tree = Tree::new();
        let a = tree.add_root("a");
        let b = tree.add_child(a, "b");
        let c = tree.add_child(a, "c");
        let d = tree.add_child(b, "d");
        (tree, [a, b, c, d])
    }

    #[test]
    fn preorder_visits_parents_first_in_child_order() {
        let (tree, [a, ..]) = sample();
        let values: Vec<_> = tree.preorder(a).into_iter().map(|id| *tree.get(id)).collect();
        assert_eq!(values, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn links_are_consistent() {
        let (tree, [a, b, c, d]) = sample();
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.parent(d), Some(b));
        assert_eq!(tree.children(a), &[b, c]);
        assert!(tree.children(c).is_empty());
        assert_eq!(tree.children(b), &[d]);
    }

    #[test]
    fn filter_restricts_to_subtree() {
        let (tree, [a, b, ..]) = sample();
        assert_eq!(tree.filter(a, |v| *v != "b").len(), 3);
        assert_eq!(tree.filter(b, |v| *v == "c").len(), 0);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut tree = Tree::new();
        let root = tree.add_root(vec![1]);
        tree.get_mut(root).push(2);
        assert_eq!(tree.get(root), &vec![1, 2]);
    }
}
