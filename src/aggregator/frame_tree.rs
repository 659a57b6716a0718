//! Arena-backed tree of distinct call paths.
//!
//! Frames live in a flat `Vec` and link to each other by index:
//! `parent` points up, `first_child` / `next_sibling` form each
//! sibling list. Ownership is the arena alone, so releasing the tree
//! is one linear sweep no matter how deep the call paths go.

use crate::function::{FunctionKey, InternTable};

/// Index of a frame inside its [`FrameTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

impl FrameId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One distinct call path
#[derive(Debug, Clone)]
pub struct Frame {
    /// `None` only for the root
    pub key: Option<FunctionKey>,

    /// Completed calls
    pub calls: u64,

    /// Cumulative elapsed nanoseconds over completed calls
    pub nanotime: u64,

    /// Timestamp of the most recent entry, 0 when not active
    pub entry: u64,

    parent: Option<FrameId>,
    first_child: Option<FrameId>,
    next_sibling: Option<FrameId>,
}

impl Frame {
    fn new(key: Option<FunctionKey>, parent: Option<FrameId>, next_sibling: Option<FrameId>) -> Self {
        Self {
            key,
            calls: 0,
            nanotime: 0,
            entry: 0,
            parent,
            first_child: None,
            next_sibling,
        }
    }

    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }
}

/// Rooted call-path tree
#[derive(Debug, Clone)]
pub struct FrameTree {
    frames: Vec<Frame>,
}

impl Default for FrameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTree {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(None, None, None)],
        }
    }

    /// The keyless root; never part of the output
    pub fn root(&self) -> FrameId {
        FrameId(0)
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    pub fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.0]
    }

    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.frames[id.0].parent
    }

    /// Children of `id`, most recently created first
    pub fn children(&self, id: FrameId) -> Children<'_> {
        Children {
            tree: self,
            next: self.frames[id.0].first_child,
        }
    }

    /// Number of frames excluding the root
    pub fn len(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the child of `parent` matching `key`, creating it if absent
    ///
    /// New children are linked in at the head of the sibling list.
    pub fn find_or_create_child(
        &mut self,
        parent: FrameId,
        key: FunctionKey,
        names: &InternTable,
    ) -> FrameId {
        let existing = self.children(parent).find(|&child| {
            self.frames[child.0]
                .key
                .is_some_and(|candidate| candidate.matches(&key, names))
        });

        if let Some(child) = existing {
            return child;
        }

        let id = FrameId(self.frames.len());
        let head = self.frames[parent.0].first_child;
        self.frames.push(Frame::new(Some(key), Some(parent), head));
        self.frames[parent.0].first_child = Some(id);
        id
    }

    /// Release every frame except a fresh root
    ///
    /// Returns the number of frames released.
    pub fn release(&mut self) -> usize {
        let released = self.len();
        self.frames.truncate(1);
        self.frames[0] = Frame::new(None, None, None);
        released
    }
}

/// Iterator over a sibling list
pub struct Children<'a> {
    tree: &'a FrameTree,
    next: Option<FrameId>,
}

impl Iterator for Children<'_> {
    type Item = FrameId;

    fn next(&mut self) -> Option<FrameId> {
        let current = self.next?;
        self.next = self.tree.frames[current.0].next_sibling;
        Some(current)
    }
}
