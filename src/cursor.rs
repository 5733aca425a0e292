use core::fmt;

use crate::arena::NodeArena;
use crate::node::{Anchor, NodeIndex};

/// A position inside a [`Heartwood`](crate::Heartwood) tree: either a live
/// element or the one-past-the-end position [`Position::END`].
///
/// Positions are plain handles. They stay valid across insertions and
/// erasures of *other* elements, because nodes never move once allocated.
/// Using a position after its element was erased is a caller error and
/// panics on access, even once the erased element's storage has been reused
/// by a later insertion. A position only means something to the tree that
/// produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(Option<NodeIndex>);

impl Position {
    /// One past the last element; also what lookups return on a miss.
    pub const END: Position = Position(None);

    pub(crate) const fn at(index: NodeIndex) -> Self {
        Position(Some(index))
    }

    pub(crate) const fn from_link(link: Option<NodeIndex>) -> Self {
        Position(link)
    }

    pub(crate) const fn index(self) -> Option<NodeIndex> {
        self.0
    }

    #[must_use]
    pub const fn is_end(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(NodeIndex { slot, .. }) => write!(f, "Position({slot})"),
            None => f.write_str("Position(end)"),
        }
    }
}

/// Read access to the links of live nodes, whatever holds them.
pub(crate) trait Links {
    fn left(&self, node: NodeIndex) -> Option<NodeIndex>;
    fn right(&self, node: NodeIndex) -> Option<NodeIndex>;
    fn parent(&self, node: NodeIndex) -> Option<NodeIndex>;
}

impl<V> Links for NodeArena<V> {
    fn left(&self, node: NodeIndex) -> Option<NodeIndex> {
        self[node].left
    }

    fn right(&self, node: NodeIndex) -> Option<NodeIndex> {
        self[node].right
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self[node].parent
    }
}

pub(crate) fn leftmost<L: Links + ?Sized>(links: &L, mut node: NodeIndex) -> NodeIndex {
    while let Some(left) = links.left(node) {
        node = left;
    }

    node
}

pub(crate) fn rightmost<L: Links + ?Sized>(links: &L, mut node: NodeIndex) -> NodeIndex {
    while let Some(right) = links.right(node) {
        node = right;
    }

    node
}

/// In-order successor. Leaving the maximum lands on [`Position::END`], and
/// the end position stays where it is.
pub(crate) fn successor<L: Links + ?Sized>(links: &L, position: Position) -> Position {
    let Some(mut node) = position.index() else {
        return Position::END;
    };

    if let Some(right) = links.right(node) {
        return Position::at(leftmost(links, right));
    }

    while let Some(parent) = links.parent(node) {
        if links.left(parent) == Some(node) {
            return Position::at(parent);
        }
        node = parent;
    }

    Position::END
}

/// In-order predecessor. Stepping back from [`Position::END`] yields the
/// maximum; stepping back from the minimum yields [`Position::END`].
pub(crate) fn predecessor<L: Links + ?Sized>(links: &L, anchor: &Anchor, position: Position) -> Position {
    let Some(mut node) = position.index() else {
        return Position::from_link(anchor.max());
    };

    if let Some(left) = links.left(node) {
        return Position::at(rightmost(links, left));
    }

    while let Some(parent) = links.parent(node) {
        if links.right(parent) == Some(node) {
            return Position::at(parent);
        }
        node = parent;
    }

    Position::END
}
