use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;

use tracing::trace;

use crate::node::{size_of, Node, NodePos, RawNode};

/// A self-adjusting binary search tree of unique keys.
///
/// Every access (insert, find, remove, nth) finishes by splaying the touched
/// node, or the last node visited on a miss, to the root. There is no balance
/// bookkeeping, recently used keys simply end up close to the root which gives
/// amortized `O(log n)` operations.
///
/// Because lookups restructure the tree they take `&mut self`.
pub struct SplayTree<K> {
    // INVARIANTS:
    //  * `root` has no parent
    //  * every other node is owned by exactly one `left`/`right` slot and its
    //    `parent` points back to the owner
    //  * in-order keys are strictly increasing
    //  * `size` of every node is 1 + size of both subtrees
    root: Option<RawNode<K>>,
    marker: PhantomData<Box<Node<K>>>,
}

pub(crate) enum SearchResult<K> {
    Found(RawNode<K>),
    /// Key is absent. Holds the last node visited and its empty child slot
    /// where the key belongs, `None` only for an empty tree.
    GoDown(Option<(RawNode<K>, NodePos)>),
}

impl<K> Drop for SplayTree<K> {
    fn drop(&mut self) {
        // Splay trees can degenerate into long paths, so no recursion here.
        let mut stack: Vec<RawNode<K>> = self.root.take().into_iter().collect();
        while let Some(node) = stack.pop() {
            let node = unsafe { node.into_node() };
            stack.extend(node.left);
            stack.extend(node.right);
        }
    }
}

impl<K> fmt::Debug for SplayTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct TreeDebug<'a, K> {
            tree: &'a SplayTree<K>,
        }

        impl<K> fmt::Debug for TreeDebug<'_, K>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();
                self.tree.inorder_for_each_raw(|node| {
                    f.entry(unsafe { node.as_ref() });
                });
                f.finish()
            }
        }

        f.debug_struct("SplayTree")
            .field("len", &self.len())
            .field("root", &self.root.map(|root| unsafe { root.as_ref() }))
            .field("nodes", &TreeDebug { tree: self })
            .finish()
    }
}

impl<K> Default for SplayTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SplayTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        unsafe { size_of(self.root) }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Key stored at the root, which is the most recently accessed one.
    pub fn root(&self) -> Option<&K> {
        self.root.map(|root| unsafe { root.key() })
    }

    /// Smallest key. Doesn't restructure the tree.
    pub fn min(&self) -> Option<&K> {
        self.root.map(|root| unsafe { Self::min_of(root).key() })
    }

    /// Largest key. Doesn't restructure the tree.
    pub fn max(&self) -> Option<&K> {
        self.root.map(|root| unsafe { Self::max_of(root).key() })
    }

    pub fn inorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K),
    {
        self.inorder_for_each_raw(|node| f(unsafe { node.key() }));
    }

    fn inorder_for_each_raw<F>(&self, mut f: F)
    where
        F: FnMut(RawNode<K>),
    {
        let mut stack = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = unsafe { node.left() };
            }
            let Some(node) = stack.pop() else {
                break;
            };
            f(node);
            current = unsafe { node.right() };
        }
    }

    pub fn insert(&mut self, key: K) -> &K
    where
        K: Ord,
    {
        let node = match self.search(&key) {
            SearchResult::Found(node) => {
                trace!("insert: key already present");
                node
            }
            SearchResult::GoDown(slot) => {
                let node = unsafe { self.attach(key, slot) };
                trace!(len = self.len(), "insert: new node");
                node
            }
        };

        self.splay(node);
        unsafe { node.key() }
    }

    /// Links a new leaf holding `key` into `slot`, or as root if the tree is empty.
    ///
    /// Keys are not compared here, once the node is allocated nothing can
    /// unwind before it is linked.
    ///
    /// # Safety
    ///
    /// `slot` must be where a search for `key` ended.
    unsafe fn attach(&mut self, key: K, slot: Option<(RawNode<K>, NodePos)>) -> RawNode<K> {
        // new node is a leaf, it cannot have left or right subtrees
        let new_node = RawNode::from_node(Node::leaf(key, slot.map(|(parent, _)| parent)));
        match slot {
            Some((mut parent, pos)) => unsafe {
                match pos {
                    NodePos::Left => {
                        debug_assert!(parent.left().is_none());
                        parent.set_left(Some(new_node));
                    }
                    NodePos::Right => {
                        debug_assert!(parent.right().is_none());
                        parent.set_right(Some(new_node));
                    }
                    NodePos::Root => unreachable!("search never ends in a root slot"),
                }
                self.resize_path(Some(parent));
            },
            None => {
                debug_assert!(self.root.is_none());
                self.root = Some(new_node);
            }
        }

        new_node
    }

    /// Looks up `key` and moves it to the root.
    ///
    /// On a miss the last node visited is moved to the root instead, so that
    /// repeated misses in one region can't keep the tree deep there.
    pub fn find<Q>(&mut self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            SearchResult::Found(node) => {
                self.splay(node);
                Some(unsafe { node.key() })
            }
            SearchResult::GoDown(last) => {
                trace!("find: key not present");
                if let Some((last, _)) = last {
                    self.splay(last);
                }
                None
            }
        }
    }

    /// Removes `key`, returns `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes `key` and returns the stored key.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            SearchResult::Found(node) => {
                let (removed, parent) = unsafe { self.delete_core(node) };
                if let Some(parent) = parent {
                    self.splay(parent);
                }
                trace!(len = self.len(), "remove: node freed");
                Some(removed)
            }
            SearchResult::GoDown(last) => {
                trace!("remove: key not present");
                if let Some((last, _)) = last {
                    self.splay(last);
                }
                None
            }
        }
    }

    /// Frees one node so that `node`'s key leaves the tree.
    ///
    /// Returns the removed key and the parent of the node that was actually
    /// freed, which is `node` itself if it has at most one child and its
    /// in-order successor otherwise.
    unsafe fn delete_core(&mut self, mut node: RawNode<K>) -> (K, Option<RawNode<K>>) {
        //       ┌────────── 34 ─────────┐
        //       │                       │
        // ┌──── 2 ────┐                 58 ────┐
        // │           │                        │
        // 1      ┌─── 9 ────┐              ┌── 77 ──┐
        //        │          │              │        │
        //     ┌─ 6       ┌─ 20 ─┐      ┌─ 71 ─┐     82
        //     │          │      │      │      │
        //     5         12 ─┐   24    67      75
        //                   │
        //                   13

        unsafe {
            let to_free = match (node.left(), node.right()) {
                (Some(_), Some(right)) => {
                    // Remove 9: the successor 12 is the minimum of the right
                    // subtree. Its key moves into `node` and the 12 node itself
                    // goes away, `node` keeps its place and links.
                    let mut successor = Self::min_of(right);
                    debug_assert!(successor.left().is_none());
                    mem::swap(node.key_mut(), successor.key_mut());
                    successor
                }
                // Remove 1, 6, 12 or 58: splice the only child (or nothing) in.
                _ => node,
            };

            let parent = to_free.parent();
            self.replace_subtree(to_free, to_free.left().or(to_free.right()));
            self.resize_path(parent);

            let Node { key, .. } = *to_free.into_node();
            (key, parent)
        }
    }

    /// Selects the key with `index` smaller keys and moves it to the root.
    pub fn nth(&mut self, mut index: usize) -> Option<&K> {
        if index >= self.len() {
            return None;
        }

        let mut node = self.root?;
        loop {
            let left = unsafe { size_of(node.left()) };
            match index.cmp(&left) {
                Ordering::Less => node = unsafe { node.left()? },
                Ordering::Equal => break,
                Ordering::Greater => {
                    index -= left + 1;
                    node = unsafe { node.right()? };
                }
            }
        }

        self.splay(node);
        Some(unsafe { node.key() })
    }

    /// Plain binary search tree descent, doesn't restructure anything.
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut last = None;
        let mut current = self.root;
        while let Some(node) = current {
            current = unsafe {
                match key.cmp(node.key().borrow()) {
                    Ordering::Less => {
                        last = Some((node, NodePos::Left));
                        node.left()
                    }
                    Ordering::Equal => return SearchResult::Found(node),
                    Ordering::Greater => {
                        last = Some((node, NodePos::Right));
                        node.right()
                    }
                }
            };
        }

        SearchResult::GoDown(last)
    }

    unsafe fn min_of(root: RawNode<K>) -> RawNode<K> {
        let mut x = root;
        while let Some(left) = unsafe { x.left() } {
            x = left;
        }

        x
    }

    unsafe fn max_of(root: RawNode<K>) -> RawNode<K> {
        let mut x = root;
        while let Some(right) = unsafe { x.right() } {
            x = right;
        }

        x
    }

    /// Rotates `x` up until it becomes the root.
    pub(crate) fn splay(&mut self, x: RawNode<K>) {
        let mut rotations = 0u32;
        unsafe {
            while let Some(p) = x.parent() {
                let x_pos = x.pos();
                match p.parent() {
                    // zig
                    None => {
                        match x_pos {
                            NodePos::Left => self.rotate_right(p),
                            _ => self.rotate_left(p),
                        }
                        rotations += 1;
                    }
                    Some(g) => {
                        match (x_pos, p.pos()) {
                            // zig-zig, grandparent goes first
                            (NodePos::Left, NodePos::Left) => {
                                self.rotate_right(g);
                                self.rotate_right(p);
                            }
                            (NodePos::Right, NodePos::Right) => {
                                self.rotate_left(g);
                                self.rotate_left(p);
                            }
                            // zig-zag, after the first rotation `g` is the parent of `x`
                            (NodePos::Right, NodePos::Left) => {
                                self.rotate_left(p);
                                self.rotate_right(g);
                            }
                            (NodePos::Left, NodePos::Right) => {
                                self.rotate_right(p);
                                self.rotate_left(g);
                            }
                            (NodePos::Root, _) | (_, NodePos::Root) => unreachable!(),
                        }
                        rotations += 2;
                    }
                }
            }
        }
        trace!(rotations, "splay");
        debug_assert!(self.root.is_some_and(|root| root.ptr_eq(&x)));
    }

    fn rotate_left(&mut self, mut node: RawNode<K>) {
        //    p                       p
        //    |                       |
        // +-node-+               +-right-+
        // |      |      -->      |       |
        // a  +-right-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        // where a, b, c can be any subtrees
        unsafe {
            if let Some(mut right) = node.right() {
                // attach right to parent
                self.replace_subtree(node, Some(right));

                // attach b to node
                let b = right.left();
                node.set_right(b);
                if let Some(mut b) = b {
                    b.set_parent(Some(node));
                }

                // attach node to right
                right.set_left(Some(node));
                node.set_parent(Some(right));

                node.update_size();
                right.update_size();
            }
        }
    }

    fn rotate_right(&mut self, mut node: RawNode<K>) {
        //         p              p
        //         |              |
        //     +-node-+       +-left-+
        //     |      |       |      |
        // +-left-+   c  -->  a  +-node-+
        // |      |              |      |
        // a      b              b      c
        // where a, b, c can be any subtrees
        unsafe {
            if let Some(mut left) = node.left() {
                // attach left to parent
                self.replace_subtree(node, Some(left));

                // attach b to node
                let b = left.right();
                node.set_left(b);
                if let Some(mut b) = b {
                    b.set_parent(Some(node));
                }

                // attach node to left
                left.set_right(Some(node));
                node.set_parent(Some(left));

                node.update_size();
                left.update_size();
            }
        }
    }

    /// Replaces subtree `old` with subtree `new`
    unsafe fn replace_subtree(&mut self, old: RawNode<K>, new: Option<RawNode<K>>) {
        // We need to do two things:
        //  a) make the parent of `old` point to `new` instead of `old`,
        //     if `old` doesn't have parents it must have been the root which
        //     means that `new` will be the new root
        //  b) make `new` point to the parent of `old`

        unsafe {
            // a)
            let parent = old.parent();
            match (old.pos(), parent) {
                (NodePos::Left, Some(mut parent)) => parent.set_left(new),
                (NodePos::Right, Some(mut parent)) => parent.set_right(new),
                _ => self.root = new,
            }

            // b)
            if let Some(mut new) = new {
                new.set_parent(parent);
            }
        }
    }

    /// Recomputes `size` from `from` up to the root.
    unsafe fn resize_path(&mut self, from: Option<RawNode<K>>) {
        let mut current = from;
        while let Some(mut node) = current {
            unsafe {
                node.update_size();
                current = node.parent();
            }
        }
    }
}

impl<K> Extend<K> for SplayTree<K>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K> FromIterator<K> for SplayTree<K>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
