#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum NodeColor {
    #[default]
    Red,
    Black,
}

/// Slot of a node inside the tree's [`NodeArena`](crate::arena::NodeArena).
///
/// A node keeps the same index for its whole lifetime, so links between nodes
/// are plain indices and rotations only reassign them. The generation stamps
/// the allocation that filled the slot: once the slot is recycled, indices
/// naming its previous occupant no longer match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeIndex {
    pub(crate) slot: usize,
    pub(crate) generation: u64,
}

impl NodeIndex {
    pub(crate) const fn new(slot: usize, generation: u64) -> Self {
        Self { slot, generation }
    }
}

#[derive(Debug)]
pub(crate) struct HeartwoodNode<V> {
    pub(crate) value: V,
    pub(crate) color: NodeColor,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
}

impl<V> HeartwoodNode<V> {
    pub(crate) fn new_isolated(value: V) -> Self {
        Self {
            value,
            color: NodeColor::default(),
            parent: None,
            left: None,
            right: None,
        }
    }

    pub(crate) fn is_red(&self) -> bool {
        self.color == NodeColor::Red
    }

    /// Copies payload and color, leaving every link for the caller to wire.
    pub(crate) fn detached_copy(&self, parent: Option<NodeIndex>) -> Self
    where
        V: Clone,
    {
        Self {
            value: self.value.clone(),
            color: self.color,
            parent,
            left: None,
            right: None,
        }
    }
}

/// Tree-level anchor: the real root plus cached extreme nodes.
///
/// The one-past-the-end position is not stored here; it is
/// [`Position::END`](crate::Position::END), which every upward walk reaches
/// once it leaves the root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    #[default]
    Empty,
    Populated {
        root: NodeIndex,
        min: NodeIndex,
        max: NodeIndex,
    },
}

impl Anchor {
    pub(crate) fn root(&self) -> Option<NodeIndex> {
        match *self {
            Anchor::Empty => None,
            Anchor::Populated { root, .. } => Some(root),
        }
    }

    pub(crate) fn min(&self) -> Option<NodeIndex> {
        match *self {
            Anchor::Empty => None,
            Anchor::Populated { min, .. } => Some(min),
        }
    }

    pub(crate) fn max(&self) -> Option<NodeIndex> {
        match *self {
            Anchor::Empty => None,
            Anchor::Populated { max, .. } => Some(max),
        }
    }
}
