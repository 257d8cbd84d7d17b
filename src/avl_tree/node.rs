use crate::arena::Handle;
use crate::avl_tree::tree::Tree;
use crate::entry::Entry;
use std::fmt;

/// A struct representing an internal node of an avl tree.
///
/// `left` and `right` are the owning links of the node. `parent` is a back-reference that mirrors
/// whichever node holds this one in its `left` or `right` slot.
pub struct Node<T, U> {
    pub entry: Entry<T, U>,
    pub balance: i8,
    pub height: usize,
    pub parent: Option<Handle>,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
}

impl<T, U> Node<T, U> {
    pub fn new(key: T, value: U, parent: Option<Handle>) -> Self {
        Node {
            entry: Entry { key, value },
            balance: 0,
            height: 1,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A read-only handle to a node of an `AvlMap<T, U>`.
///
/// A `NodeRef` borrows the map immutably, so the tree cannot be restructured while it is alive.
/// It exposes the structural links of the node (`left`, `right`, `parent`) and its in-order
/// neighbours, but offers no way of mutating the tree.
///
/// # Examples
///
/// ```
/// use linked_avl::avl_tree::AvlMap;
///
/// let mut map = AvlMap::new();
/// map.insert(10, "a");
/// map.insert(20, "b");
/// map.insert(30, "c");
///
/// let root = map.root().unwrap();
/// assert_eq!(root.key(), &20);
/// assert_eq!(root.left().map(|node| *node.key()), Some(10));
/// assert_eq!(root.right().map(|node| *node.value()), Some("c"));
/// ```
pub struct NodeRef<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    tree: &'a Tree<T, U>,
    handle: Handle,
}

impl<'a, T, U> NodeRef<'a, T, U> {
    pub(crate) fn new(tree: &'a Tree<T, U>, handle: Handle) -> Self {
        NodeRef { tree, handle }
    }

    fn node(&self) -> &'a Node<T, U> {
        self.tree.node(self.handle)
    }

    fn link(&self, link: Option<Handle>) -> Option<NodeRef<'a, T, U>> {
        let tree = self.tree;
        link.map(|handle| NodeRef::new(tree, handle))
    }

    /// Returns the arena handle of the node.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn key(&self) -> &'a T {
        &self.node().entry.key
    }

    pub fn value(&self) -> &'a U {
        &self.node().entry.value
    }

    /// Returns the cached balance factor, `height(left) - height(right)`.
    pub fn balance(&self) -> i8 {
        self.node().balance
    }

    /// Returns the height of the subtree rooted at this node. A leaf has height one.
    pub fn height(&self) -> usize {
        self.node().height
    }

    pub fn left(&self) -> Option<NodeRef<'a, T, U>> {
        self.link(self.node().left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, T, U>> {
        self.link(self.node().right)
    }

    /// Returns the parent of the node, or `None` if the node is the root.
    pub fn parent(&self) -> Option<NodeRef<'a, T, U>> {
        self.link(self.node().parent)
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Returns the node holding the largest key strictly less than this node's key.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, ());
    /// map.insert(2, ());
    /// map.insert(3, ());
    ///
    /// let node = map.find(&3).unwrap();
    /// assert_eq!(node.predecessor().map(|node| *node.key()), Some(2));
    /// assert!(map.find(&1).unwrap().predecessor().is_none());
    /// ```
    pub fn predecessor(&self) -> Option<NodeRef<'a, T, U>> {
        self.link(self.tree.predecessor(self.handle))
    }

    /// Returns the node holding the smallest key strictly greater than this node's key.
    pub fn successor(&self) -> Option<NodeRef<'a, T, U>> {
        self.link(self.tree.successor(self.handle))
    }
}

impl<'a, T, U> Clone for NodeRef<'a, T, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, U> Copy for NodeRef<'a, T, U> {}

impl<'a, T, U> PartialEq for NodeRef<'a, T, U> {
    fn eq(&self, other: &NodeRef<'a, T, U>) -> bool {
        ::std::ptr::eq(self.tree, other.tree) && self.handle == other.handle
    }
}

impl<'a, T, U> Eq for NodeRef<'a, T, U> {}

impl<'a, T, U> fmt::Debug for NodeRef<'a, T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("balance", &self.balance())
            .finish()
    }
}
