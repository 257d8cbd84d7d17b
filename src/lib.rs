//! An ordered map backed by an avl tree whose nodes keep links to their parents.
//!
//! The tree lives in a typed arena, so child links are owning handles into the arena and parent
//! links are plain back-references that never keep a node alive. See `avl_tree::AvlMap` for the
//! map itself and `equal_paths` for a read-only consumer of the node links.

#[macro_use]
extern crate log;

mod entry;
pub mod arena;
pub mod avl_tree;
pub mod equal_paths;
