#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

//! In-memory ordered key store on top of a splay tree.
//!
//! ```
//! use splay_tree::SplayTree;
//!
//! let mut tree = SplayTree::new();
//! for k in [5, 3, 8, 1, 4] {
//!     tree.insert(k);
//! }
//! assert_eq!(tree.root(), Some(&4));
//!
//! assert_eq!(tree.find(&8), Some(&8));
//! assert_eq!(tree.root(), Some(&8));
//!
//! assert!(tree.remove(&3));
//! assert_eq!(tree.find(&3), None);
//! ```

mod node;
mod splay_tree;

pub use splay_tree::SplayTree;
