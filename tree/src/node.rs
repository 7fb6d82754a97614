use core::fmt;
use core::ptr::{self, NonNull};

pub(crate) struct Node<K> {
    pub(crate) key: K,
    // Number of nodes in the subtree rooted at this node, including itself.
    pub(crate) size: usize,
    pub(crate) parent: Option<RawNode<K>>,
    pub(crate) left: Option<RawNode<K>>,
    pub(crate) right: Option<RawNode<K>>,
}

impl<K> Node<K> {
    pub(crate) fn leaf(key: K, parent: Option<RawNode<K>>) -> Self {
        Self {
            key,
            size: 1,
            parent,
            left: None,
            right: None,
        }
    }
}

impl<K> fmt::Debug for Node<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("Node");
        f.field("key", &self.key).field("size", &self.size);

        let mut dbg_opt_node = |name: &str, node: &Option<RawNode<K>>| match node {
            Some(node) => {
                f.field(name, &Some(unsafe { node.key() }));
            }
            None => {
                f.field(name, &None::<K>);
            }
        };

        dbg_opt_node("parent", &self.parent);
        dbg_opt_node("left", &self.left);
        dbg_opt_node("right", &self.right);

        f.finish()
    }
}

/// Non-owning handle to a heap allocated [`Node`].
///
/// Whether a handle owns its node depends on where it is stored: `left`,
/// `right` and the tree root own, `parent` only navigates. Nodes are created
/// with [`RawNode::from_node`] and destroyed with [`RawNode::into_node`],
/// nothing else allocates or frees them.
#[repr(transparent)]
pub(crate) struct RawNode<K> {
    ptr: NonNull<Node<K>>,
}

impl<K> Clone for RawNode<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RawNode<K> {}

impl<K> RawNode<K> {
    pub(crate) fn from_node(node: Node<K>) -> Self {
        Self {
            ptr: unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(node))) },
        }
    }

    /// Takes back ownership of the allocation.
    ///
    /// # Safety
    ///
    /// `self` must come from [`RawNode::from_node`], must not have been
    /// freed already and no other handle to it may be used afterwards.
    pub(crate) unsafe fn into_node(self) -> Box<Node<K>> {
        unsafe { Box::from_raw(self.as_ptr()) }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut Node<K> {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn ptr_eq(&self, other: &RawNode<K>) -> bool {
        ptr::eq(self.as_ptr(), other.as_ptr())
    }

    #[inline]
    pub(crate) unsafe fn as_ref<'a>(&self) -> &'a Node<K> {
        unsafe { self.ptr.as_ref() }
    }

    #[inline]
    pub(crate) unsafe fn key<'a>(&self) -> &'a K {
        unsafe { &(*self.as_ptr()).key }
    }

    #[inline]
    pub(crate) unsafe fn key_mut<'a>(&mut self) -> &'a mut K {
        unsafe { &mut (*self.as_ptr()).key }
    }

    #[inline]
    pub(crate) unsafe fn size(&self) -> usize {
        unsafe { (*self.as_ptr()).size }
    }

    #[inline]
    pub(crate) unsafe fn set_size(&mut self, new_size: usize) {
        unsafe { (*self.as_ptr()).size = new_size }
    }

    /// Recomputes `size` from the children, which must already be correct.
    #[inline]
    pub(crate) unsafe fn update_size(&mut self) {
        unsafe {
            let size = 1 + size_of(self.left()) + size_of(self.right());
            self.set_size(size);
        }
    }

    #[inline]
    pub(crate) unsafe fn parent(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).parent }
    }

    #[inline]
    pub(crate) unsafe fn set_parent(&mut self, new_parent: Option<RawNode<K>>) {
        unsafe {
            (*self.as_ptr()).parent = new_parent;
        }
    }

    #[inline]
    pub(crate) unsafe fn right(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).right }
    }

    #[inline]
    pub(crate) unsafe fn set_right(&mut self, new_right: Option<RawNode<K>>) {
        unsafe {
            (*self.as_ptr()).right = new_right;
        }
    }

    #[inline]
    pub(crate) unsafe fn left(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).left }
    }

    #[inline]
    pub(crate) unsafe fn set_left(&mut self, new_left: Option<RawNode<K>>) {
        unsafe {
            (*self.as_ptr()).left = new_left;
        }
    }

    /// Which slot of its parent holds this node.
    #[inline]
    pub(crate) unsafe fn pos(&self) -> NodePos {
        match unsafe { self.parent() } {
            Some(p) => match unsafe { p.left() } {
                Some(left) if left.ptr_eq(self) => NodePos::Left,
                _ => {
                    debug_assert!(
                        unsafe { p.right() }.is_some_and(|right| right.ptr_eq(self)),
                        "parent link points to a node that doesn't own this one"
                    );
                    NodePos::Right
                }
            },
            None => NodePos::Root,
        }
    }
}

#[inline]
pub(crate) unsafe fn size_of<K>(node: Option<RawNode<K>>) -> usize {
    node.map_or(0, |n| unsafe { n.size() })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodePos {
    Root,
    Left,
    Right,
}
