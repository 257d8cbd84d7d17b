use crate::arena::Handle;
use crate::avl_tree::node::NodeRef;
use crate::avl_tree::tree::Tree;
use crate::avl_tree::Result;
use std::borrow::Borrow;
use std::ops::{Index, IndexMut};

/// Number of node slots allocated at a time by `AvlMap::new`.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// An ordered map implemented using an avl tree.
///
/// An avl tree is a self-balancing binary search tree that maintains the invariant that the
/// heights of the two child subtrees of any node differ by at most one. Every node also links
/// back to its parent, so the tree can be walked upwards from any node returned by `find`.
///
/// # Examples
///
/// ```
/// use linked_avl::avl_tree::AvlMap;
///
/// let mut map = AvlMap::new();
/// map.insert(0, 1);
/// map.insert(3, 4);
///
/// assert_eq!(map[&0], 1);
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some(&0));
/// assert_eq!(map.ceil(&2), Some(&3));
///
/// map[&0] = 2;
/// assert_eq!(map.remove(&0), Some((0, 2)));
/// assert_eq!(map.remove(&1), None);
/// ```
pub struct AvlMap<T, U> {
    tree: Tree<T, U>,
}

impl<T, U> AvlMap<T, U> {
    /// Constructs a new, empty `AvlMap<T, U>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = AvlMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `AvlMap<T, U>` whose node arena allocates `chunk_size` nodes at a
    /// time. A `chunk_size` of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = AvlMap::with_chunk_size(1024);
    /// assert_eq!(map.chunk_size(), 1024);
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        AvlMap {
            tree: Tree::new(chunk_size),
        }
    }

    /// Returns the number of nodes the map allocates at a time.
    pub fn chunk_size(&self) -> usize {
        self.tree.chunk_size()
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, its value is
    /// replaced in place and the old value is returned; the shape of the tree is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: T, value: U) -> Option<U>
    where
        T: Ord,
    {
        self.tree.insert(key, value)
    }

    /// Removes a key-value pair from the map. If the key exists in the map, it will return the
    /// associated key-value pair. Otherwise it will return `None` and leave the map unchanged.
    ///
    /// A node with two children is removed by exchanging its contents with its in-order
    /// predecessor and unlinking the predecessor's node instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove(&1), Some((1, 1)));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Option<(T, U)>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.remove(key)
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }

    /// Returns a read-only handle to the node holding a particular key, or `None` if the key does
    /// not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let node = map.find(&2).unwrap();
    /// assert_eq!(node.value(), &"b");
    /// assert_eq!(node.parent().map(|node| *node.key()), Some(1));
    /// assert!(map.find(&3).is_none());
    /// ```
    pub fn find<V>(&self, key: &V) -> Option<NodeRef<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.node_ref(self.tree.find(key))
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree
            .find(key)
            .map(|handle| &self.tree.node(handle).entry.value)
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn get_mut<V>(&mut self, key: &V) -> Option<&mut U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.tree.find(key) {
            Some(handle) => Some(&mut self.tree.node_mut(handle).entry.value),
            None => None,
        }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = AvlMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the height of the tree. An empty map has height zero and a single entry has height
    /// one.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// for key in 0..7 {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        self.tree.height(self.tree.root())
    }

    /// Returns a read-only handle to the root node, or `None` if the map is empty.
    pub fn root(&self) -> Option<NodeRef<T, U>> {
        self.node_ref(self.tree.root())
    }

    /// Returns a key in the map that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.floor(&0), None);
    /// assert_eq!(map.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree
            .floor(key)
            .map(|handle| &self.tree.node(handle).entry.key)
    }

    /// Returns a key in the map that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.ceil(&0), Some(&1));
    /// assert_eq!(map.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree
            .ceil(key)
            .map(|handle| &self.tree.node(handle).entry.key)
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.tree
            .root()
            .map(|root| &self.tree.node(self.tree.min_from(root)).entry.key)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.tree
            .root()
            .map(|root| &self.tree.node(self.tree.max_from(root)).entry.key)
    }

    /// Checks the structural invariants of the tree: keys are strictly increasing in-order, every
    /// node is balanced, cached heights and balance factors are current, parent links mirror child
    /// links, and every stored entry is reachable from the root.
    ///
    /// A map is always valid between calls to its public methods, so an `Err` here indicates a
    /// bug in the map itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// for key in 0..100 {
    ///     map.insert(key, key);
    /// }
    /// assert!(map.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<()>
    where
        T: Ord,
    {
        self.tree.validate().map_err(|err| {
            debug!("invariant check failed: {}", err);
            err
        })
    }

    fn node_ref(&self, handle: Option<Handle>) -> Option<NodeRef<T, U>> {
        let tree = &self.tree;
        handle.map(|handle| NodeRef::new(tree, handle))
    }
}

impl<T, U> Default for AvlMap<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, U, V> Index<&'a V> for AvlMap<T, U>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    type Output = U;

    fn index(&self, key: &V) -> &Self::Output {
        self.get(key).expect("Error: key does not exist.")
    }
}

impl<'a, T, U, V> IndexMut<&'a V> for AvlMap<T, U>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    fn index_mut(&mut self, key: &V) -> &mut Self::Output {
        self.get_mut(key).expect("Error: key does not exist.")
    }
}

#[cfg(test)]
mod tests {
    use super::AvlMap;

    fn shape(map: &AvlMap<u32, u32>) -> Vec<(u32, Option<u32>, Option<u32>, i8)> {
        let mut ret = Vec::new();
        let mut stack: Vec<_> = map.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            ret.push((
                *node.key(),
                node.left().map(|node| *node.key()),
                node.right().map(|node| *node.key()),
                node.balance(),
            ));
            stack.extend(node.left());
            stack.extend(node.right());
        }
        ret.sort();
        ret
    }

    #[test]
    fn test_len_empty() {
        let map: AvlMap<u32, u32> = AvlMap::new();
        assert_eq!(map.len(), 0);
        assert_eq!(map.height(), 0);
        assert!(map.root().is_none());
    }

    #[test]
    fn test_is_empty() {
        let map: AvlMap<u32, u32> = AvlMap::new();
        assert!(map.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let map: AvlMap<u32, u32> = AvlMap::new();
        assert_eq!(map.min(), None);
        assert_eq!(map.max(), None);
        assert!(map.find(&0).is_none());
    }

    #[test]
    fn test_insert() {
        let mut map = AvlMap::new();
        assert_eq!(map.insert(1, 1), None);
        assert!(map.contains_key(&1));
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn test_insert_replace() {
        let mut map = AvlMap::new();
        assert_eq!(map.insert(1, 1), None);
        assert_eq!(map.insert(1, 3), Some(1));
        assert_eq!(map.get(&1), Some(&3));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insert_replace_keeps_shape() {
        let mut map = AvlMap::new();
        for key in &[5, 3, 8, 1] {
            map.insert(*key, 0);
        }
        let before = shape(&map);
        assert_eq!(map.insert(1, 9), Some(0));
        assert_eq!(shape(&map), before);
        assert_eq!(map.find(&1).map(|node| *node.value()), Some(9));
    }

    #[test]
    fn test_remove() {
        let mut map = AvlMap::new();
        map.insert(1, 1);
        assert_eq!(map.remove(&1), Some((1, 1)));
        assert!(!map.contains_key(&1));
        assert!(map.root().is_none());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut map = AvlMap::new();
        for key in &[4, 2, 6, 1] {
            map.insert(*key, *key);
        }
        let before = shape(&map);
        assert_eq!(map.remove(&5), None);
        assert_eq!(shape(&map), before);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_right_right_rotation() {
        let mut map = AvlMap::new();
        for key in &[10, 20, 30] {
            map.insert(*key, 0);
        }
        assert_eq!(
            shape(&map),
            vec![(10, None, None, 0), (20, Some(10), Some(30), 0), (30, None, None, 0)],
        );
        assert_eq!(map.root().map(|node| *node.key()), Some(20));
    }

    #[test]
    fn test_left_right_rotation() {
        let mut map = AvlMap::new();
        for key in &[30, 10, 20] {
            map.insert(*key, 0);
        }
        assert_eq!(
            shape(&map),
            vec![(10, None, None, 0), (20, Some(10), Some(30), 0), (30, None, None, 0)],
        );
        assert_eq!(map.root().map(|node| *node.key()), Some(20));
    }

    #[test]
    fn test_left_left_and_right_left_rotations() {
        let mut map = AvlMap::new();
        for key in &[30, 20, 10] {
            map.insert(*key, 0);
        }
        assert_eq!(map.root().map(|node| *node.key()), Some(20));

        let mut map = AvlMap::new();
        for key in &[10, 30, 20] {
            map.insert(*key, 0);
        }
        assert_eq!(map.root().map(|node| *node.key()), Some(20));
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_remove_two_children_uses_predecessor() {
        let mut map = AvlMap::new();
        for key in &[5, 3, 8, 1, 4, 7, 9, 2, 6] {
            map.insert(*key, *key * 10);
        }
        let root_handle = map.root().unwrap().handle();
        assert_eq!(map.root().map(|node| *node.key()), Some(5));

        assert_eq!(map.remove(&5), Some((5, 50)));
        let root = map.root().unwrap();
        assert_eq!(root.key(), &4);
        assert_eq!(root.value(), &40);
        assert_eq!(root.handle(), root_handle);
        assert_eq!(map.len(), 8);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_remove_rebalances() {
        let mut map = AvlMap::new();
        for key in &[2, 1, 3, 4] {
            map.insert(*key, 0);
        }
        map.remove(&1);
        assert_eq!(map.root().map(|node| *node.key()), Some(3));
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_min_max() {
        let mut map = AvlMap::new();
        map.insert(1, 1);
        map.insert(3, 3);
        map.insert(5, 5);

        assert_eq!(map.min(), Some(&1));
        assert_eq!(map.max(), Some(&5));
    }

    #[test]
    fn test_get_mut() {
        let mut map = AvlMap::new();
        map.insert(1, 1);
        {
            let value = map.get_mut(&1);
            *value.unwrap() = 3;
        }
        assert_eq!(map.get(&1), Some(&3));
    }

    #[test]
    fn test_index() {
        let mut map = AvlMap::new();
        map.insert(String::from("a"), 1);
        map["a"] += 1;
        assert_eq!(map["a"], 2);
    }

    #[test]
    #[should_panic]
    fn test_index_missing() {
        let map: AvlMap<u32, u32> = AvlMap::new();
        map[&0];
    }

    #[test]
    fn test_floor_ceil() {
        let mut map = AvlMap::new();
        map.insert(1, 1);
        map.insert(3, 3);
        map.insert(5, 5);

        assert_eq!(map.floor(&0), None);
        assert_eq!(map.floor(&2), Some(&1));
        assert_eq!(map.floor(&4), Some(&3));
        assert_eq!(map.floor(&6), Some(&5));

        assert_eq!(map.ceil(&0), Some(&1));
        assert_eq!(map.ceil(&2), Some(&3));
        assert_eq!(map.ceil(&4), Some(&5));
        assert_eq!(map.ceil(&6), None);
    }

    #[test]
    fn test_clear_reuses_map() {
        let mut map = AvlMap::with_chunk_size(2);
        for key in 0..10 {
            map.insert(key, key);
        }
        map.clear();
        assert!(map.is_empty());
        assert!(map.root().is_none());

        map.insert(1, 1);
        assert_eq!(map.get(&1), Some(&1));
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_successor_chain() {
        let mut map = AvlMap::new();
        for key in &[8, 3, 10, 1, 6, 14, 4, 7, 13] {
            map.insert(*key, ());
        }
        let mut keys = Vec::new();
        let mut curr = map.find(&1);
        while let Some(node) = curr {
            keys.push(*node.key());
            curr = node.successor();
        }
        assert_eq!(keys, vec![1, 3, 4, 6, 7, 8, 10, 13, 14]);
    }
}
