//! Self-balancing binary search tree where the heights of the two child subtrees of any node
//! differ by at most one.
//!
//! Nodes are kept in an arena and linked with handles, including a link from every node back to
//! its parent. Insertions and removals perform the plain binary search tree edit first and then
//! walk from the edited position up to the root, rotating wherever a node has become unbalanced.

mod map;
mod node;
mod tree;

pub use self::map::{AvlMap, DEFAULT_CHUNK_SIZE};
pub use self::node::NodeRef;

use crate::arena::Handle;
use std::error;
use std::fmt;
use std::result;

/// A structural invariant of an `AvlMap<T, U>` that did not hold.
///
/// These are never produced by a correctly functioning map; they are reported by
/// `AvlMap::validate` so that tests can assert on the shape of the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A key is not strictly between the keys of its ancestors.
    Unordered(Handle),
    /// The heights of the subtrees of a node differ by more than one.
    Unbalanced(Handle),
    /// The cached height of a node does not match the heights of its children.
    StaleHeight(Handle),
    /// The cached balance factor of a node does not match the heights of its children.
    StaleBalance(Handle),
    /// The parent link of a node does not point at the node holding it.
    BrokenParent(Handle),
    /// A child link points at a vacant slot.
    DanglingLink(Handle),
    /// The number of reachable nodes differs from the number of stored entries.
    LengthMismatch { expected: usize, actual: usize },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unordered(handle) => write!(f, "node {:?} is out of order", handle),
            Error::Unbalanced(handle) => write!(f, "node {:?} is unbalanced", handle),
            Error::StaleHeight(handle) => write!(f, "node {:?} has a stale height", handle),
            Error::StaleBalance(handle) => {
                write!(f, "node {:?} has a stale balance factor", handle)
            },
            Error::BrokenParent(handle) => {
                write!(f, "node {:?} has an inconsistent parent link", handle)
            },
            Error::DanglingLink(handle) => write!(f, "link to vacant node {:?}", handle),
            Error::LengthMismatch { expected, actual } => write!(
                f,
                "expected {} reachable nodes, found {}",
                expected, actual,
            ),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
