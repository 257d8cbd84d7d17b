//! Leaf-depth checks over read-only binary trees.

use crate::avl_tree::NodeRef;

/// Read-only access to the children of a binary tree node.
pub trait BinaryNode: Sized {
    fn left(&self) -> Option<Self>;

    fn right(&self) -> Option<Self>;
}

impl<'a, T, U> BinaryNode for NodeRef<'a, T, U> {
    fn left(&self) -> Option<Self> {
        NodeRef::left(self)
    }

    fn right(&self) -> Option<Self> {
        NodeRef::right(self)
    }
}

/// Returns `true` if every leaf of the tree rooted at `root` is at the same depth. An empty tree
/// and a single node both satisfy this. A node with a single child contributes no leaf of its
/// own, so its depth is that of the leaves below its only child.
///
/// # Examples
///
/// ```
/// use linked_avl::avl_tree::AvlMap;
/// use linked_avl::equal_paths::equal_paths;
///
/// let mut map = AvlMap::new();
/// for key in &[2, 1, 3] {
///     map.insert(*key, ());
/// }
/// assert!(equal_paths(map.root()));
///
/// map.insert(4, ());
/// assert!(!equal_paths(map.root()));
/// ```
pub fn equal_paths<N>(root: Option<N>) -> bool
where
    N: BinaryNode,
{
    match root {
        None => true,
        Some(root) => leaf_depth(&root).is_some(),
    }
}

// Returns the common depth of every leaf below `node`, or `None` if two leaves disagree.
fn leaf_depth<N>(node: &N) -> Option<usize>
where
    N: BinaryNode,
{
    match (node.left(), node.right()) {
        (None, None) => Some(1),
        (Some(child), None) | (None, Some(child)) => leaf_depth(&child).map(|depth| depth + 1),
        (Some(left), Some(right)) => {
            let left_depth = leaf_depth(&left)?;
            let right_depth = leaf_depth(&right)?;
            if left_depth == right_depth {
                Some(left_depth + 1)
            } else {
                None
            }
        },
    }
}
