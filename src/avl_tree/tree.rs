use crate::arena::{Arena, Handle};
use crate::avl_tree::node::Node;
use crate::avl_tree::{Error, Result};
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;

/// Node storage and structural operations shared by the public map.
///
/// All nodes live in `arena`. Every occupied slot is reachable from `root` through exactly one
/// `left` or `right` link, so the arena length is the number of entries.
pub struct Tree<T, U> {
    arena: Arena<Node<T, U>>,
    root: Option<Handle>,
}

impl<T, U> Tree<T, U> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: Arena::new(chunk_size),
            root: None,
        }
    }

    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn chunk_size(&self) -> usize {
        self.arena.chunk_size()
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
    }

    pub fn node(&self, handle: Handle) -> &Node<T, U> {
        &self.arena[handle]
    }

    pub fn node_mut(&mut self, handle: Handle) -> &mut Node<T, U> {
        &mut self.arena[handle]
    }

    pub fn height(&self, link: Option<Handle>) -> usize {
        match link {
            None => 0,
            Some(handle) => self.arena[handle].height,
        }
    }

    // Recomputes the cached height and balance factor from the children's heights.
    fn update(&mut self, handle: Handle) {
        let (left, right) = {
            let node = &self.arena[handle];
            (node.left, node.right)
        };
        let left_height = self.height(left);
        let right_height = self.height(right);
        let node = &mut self.arena[handle];
        node.height = cmp::max(left_height, right_height) + 1;
        node.balance = (left_height as isize - right_height as isize) as i8;
    }

    // Points whichever slot referenced `old` (a child link of `parent`, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self.arena[parent];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            },
        }
    }

    fn rotate_left(&mut self, handle: Handle) {
        let child = match self.arena[handle].right {
            Some(child) => child,
            None => unreachable!(),
        };
        let parent = self.arena[handle].parent;
        let inner = self.arena[child].left;

        self.arena[handle].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }
        self.arena[child].left = Some(handle);
        self.arena[child].parent = parent;
        self.arena[handle].parent = Some(child);
        self.replace_child(parent, handle, Some(child));
        trace!("rotated left at {:?}, promoted {:?}", handle, child);
    }

    fn rotate_right(&mut self, handle: Handle) {
        let child = match self.arena[handle].left {
            Some(child) => child,
            None => unreachable!(),
        };
        let parent = self.arena[handle].parent;
        let inner = self.arena[child].right;

        self.arena[handle].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }
        self.arena[child].right = Some(handle);
        self.arena[child].parent = parent;
        self.arena[handle].parent = Some(child);
        self.replace_child(parent, handle, Some(child));
        trace!("rotated right at {:?}, promoted {:?}", handle, child);
    }

    // Walks from `start` up to the root, restoring the balance of every node on the way.
    fn rebalance(&mut self, start: Option<Handle>) {
        let mut curr = start;
        while let Some(handle) = curr {
            self.update(handle);
            let balance = self.arena[handle].balance;

            if balance > 1 {
                trace!("left heavy at {:?} with balance {}", handle, balance);
                let child = match self.arena[handle].left {
                    Some(child) => child,
                    None => unreachable!(),
                };
                if self.arena[child].balance < 0 {
                    self.rotate_left(child);
                    self.update(child);
                }
                self.rotate_right(handle);
            } else if balance < -1 {
                trace!("right heavy at {:?} with balance {}", handle, balance);
                let child = match self.arena[handle].right {
                    Some(child) => child,
                    None => unreachable!(),
                };
                if self.arena[child].balance > 0 {
                    self.rotate_right(child);
                    self.update(child);
                }
                self.rotate_left(handle);
            } else {
                curr = self.arena[handle].parent;
                continue;
            }

            // `handle` was demoted, so its new parent is the root of the rotated subtree.
            self.update(handle);
            let promoted = match self.arena[handle].parent {
                Some(promoted) => promoted,
                None => unreachable!(),
            };
            self.update(promoted);
            curr = self.arena[promoted].parent;
        }
    }

    pub fn find<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub fn insert(&mut self, key: T, value: U) -> Option<U>
    where
        T: Ord,
    {
        let mut parent = None;
        let mut is_left = false;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &mut self.arena[handle];
            curr = match key.cmp(&node.entry.key) {
                Ordering::Less => {
                    is_left = true;
                    node.left
                },
                Ordering::Greater => {
                    is_left = false;
                    node.right
                },
                Ordering::Equal => return Some(mem::replace(&mut node.entry.value, value)),
            };
            parent = Some(handle);
        }

        let new_handle = self.arena.allocate(Node::new(key, value, parent));
        match parent {
            None => self.root = Some(new_handle),
            Some(parent) if is_left => self.arena[parent].left = Some(new_handle),
            Some(parent) => self.arena[parent].right = Some(new_handle),
        }
        self.rebalance(parent);
        None
    }

    pub fn remove<V>(&mut self, key: &V) -> Option<(T, U)>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let target = self.find(key)?;
        let removed = match (self.arena[target].left, self.arena[target].right) {
            (Some(left), Some(_)) => {
                let predecessor = self.max_from(left);
                self.swap_contents(target, predecessor);
                predecessor
            },
            _ => target,
        };

        let parent = self.splice(removed);
        let Node { entry, .. } = self.arena.free(removed);
        self.rebalance(parent);
        Some(entry.into_pair())
    }

    // Exchanges the entries and balance factors of two nodes, leaving their links untouched.
    fn swap_contents(&mut self, a: Handle, b: Handle) {
        if let Some((a, b)) = self.arena.get_pair_mut(a, b) {
            mem::swap(&mut a.entry, &mut b.entry);
            mem::swap(&mut a.balance, &mut b.balance);
        }
    }

    // Unlinks a node with at most one child by moving that child into its place. Returns the
    // former parent of the node.
    fn splice(&mut self, handle: Handle) -> Option<Handle> {
        let (parent, child) = {
            let node = &mut self.arena[handle];
            debug_assert!(node.left.is_none() || node.right.is_none());
            (node.parent.take(), node.left.take().or_else(|| node.right.take()))
        };
        if let Some(child) = child {
            self.arena[child].parent = parent;
        }
        self.replace_child(parent, handle, child);
        parent
    }

    pub fn min_from(&self, handle: Handle) -> Handle {
        let mut curr = handle;
        while let Some(left) = self.arena[curr].left {
            curr = left;
        }
        curr
    }

    pub fn max_from(&self, handle: Handle) -> Handle {
        let mut curr = handle;
        while let Some(right) = self.arena[curr].right {
            curr = right;
        }
        curr
    }

    pub fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.arena[handle].left {
            return Some(self.max_from(left));
        }
        let mut child = handle;
        let mut parent = self.arena[handle].parent;
        while let Some(curr) = parent {
            if self.arena[curr].right == Some(child) {
                return Some(curr);
            }
            child = curr;
            parent = self.arena[curr].parent;
        }
        None
    }

    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.arena[handle].right {
            return Some(self.min_from(right));
        }
        let mut child = handle;
        let mut parent = self.arena[handle].parent;
        while let Some(curr) = parent {
            if self.arena[curr].left == Some(child) {
                return Some(curr);
            }
            child = curr;
            parent = self.arena[curr].parent;
        }
        None
    }

    pub fn floor<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    best = Some(handle);
                    node.right
                },
                Ordering::Equal => return Some(handle),
            };
        }
        best
    }

    pub fn ceil<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => {
                    best = Some(handle);
                    node.left
                },
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        best
    }

    /// Checks every structural invariant of the tree, returning the first violation found.
    pub fn validate(&self) -> Result<()>
    where
        T: Ord,
    {
        let mut count = 0;
        if let Some(root) = self.root {
            self.validate_subtree(root, None, None, None, &mut count)?;
        }
        if count != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: count,
            });
        }
        Ok(())
    }

    fn validate_subtree(
        &self,
        handle: Handle,
        parent: Option<Handle>,
        lower: Option<&T>,
        upper: Option<&T>,
        count: &mut usize,
    ) -> Result<usize>
    where
        T: Ord,
    {
        let node = self.arena.get(handle).ok_or(Error::DanglingLink(handle))?;
        *count += 1;
        if *count > self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: *count,
            });
        }
        if node.parent != parent {
            return Err(Error::BrokenParent(handle));
        }

        let key = &node.entry.key;
        let above_lower = lower.map_or(true, |lower| key > lower);
        let below_upper = upper.map_or(true, |upper| key < upper);
        if !above_lower || !below_upper {
            return Err(Error::Unordered(handle));
        }

        let left_height = match node.left {
            Some(left) => self.validate_subtree(left, Some(handle), lower, Some(key), count)?,
            None => 0,
        };
        let right_height = match node.right {
            Some(right) => self.validate_subtree(right, Some(handle), Some(key), upper, count)?,
            None => 0,
        };

        if node.height != cmp::max(left_height, right_height) + 1 {
            return Err(Error::StaleHeight(handle));
        }
        let balance = left_height as isize - right_height as isize;
        if balance != isize::from(node.balance) {
            return Err(Error::StaleBalance(handle));
        }
        if balance.abs() > 1 {
            return Err(Error::Unbalanced(handle));
        }
        Ok(node.height)
    }
}
