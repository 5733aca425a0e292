//! Structural surgery: rotations, linking with red-red repair, and unlinking
//! with double-black repair.
//!
//! Every function here works on bare node indices. Lookups and the ordering
//! policy stay in the engine; by the time these run, the caller already knows
//! where a node goes or which node leaves.

use crate::arena::NodeArena;
use crate::cursor::{leftmost, rightmost};
use crate::node::{Anchor, NodeColor, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

fn is_red<V>(arena: &NodeArena<V>, link: Option<NodeIndex>) -> bool {
    link.is_some_and(|node| arena[node].is_red())
}

/// Points whatever referenced `old` (its parent's child slot, or the root)
/// at `new`. Returns the possibly-updated root.
fn replace_child<V>(
    arena: &mut NodeArena<V>,
    root: NodeIndex,
    old: NodeIndex,
    new: NodeIndex,
) -> NodeIndex {
    let parent = arena[old].parent;
    arena[new].parent = parent;

    match parent {
        None => new,
        Some(parent) => {
            if arena[parent].left == Some(old) {
                arena[parent].left = Some(new);
            } else {
                arena[parent].right = Some(new);
            }

            root
        }
    }
}

/// Moves `pivot`'s right child into `pivot`'s place; `pivot` becomes its left
/// child. Returns the possibly-updated root.
pub(crate) fn rotate_left<V>(arena: &mut NodeArena<V>, pivot: NodeIndex, root: NodeIndex) -> NodeIndex {
    let Some(raised) = arena[pivot].right else {
        unreachable!("left rotation around a node without a right child");
    };

    let inner = arena[raised].left;
    arena[pivot].right = inner;
    if let Some(inner) = inner {
        arena[inner].parent = Some(pivot);
    }

    let root = replace_child(arena, root, pivot, raised);
    arena[raised].left = Some(pivot);
    arena[pivot].parent = Some(raised);

    root
}

/// Mirror of [`rotate_left`].
pub(crate) fn rotate_right<V>(arena: &mut NodeArena<V>, pivot: NodeIndex, root: NodeIndex) -> NodeIndex {
    let Some(raised) = arena[pivot].left else {
        unreachable!("right rotation around a node without a left child");
    };

    let inner = arena[raised].right;
    arena[pivot].left = inner;
    if let Some(inner) = inner {
        arena[inner].parent = Some(pivot);
    }

    let root = replace_child(arena, root, pivot, raised);
    arena[raised].right = Some(pivot);
    arena[pivot].parent = Some(raised);

    root
}

/// Attaches the freshly allocated `node` below `parent` on `side` (or as the
/// only node when `parent` is `None`) and restores the color invariants.
pub(crate) fn link<V>(
    arena: &mut NodeArena<V>,
    anchor: &mut Anchor,
    node: NodeIndex,
    parent: Option<NodeIndex>,
    side: Side,
) {
    let (Some(parent), Anchor::Populated { root, min, max }) = (parent, *anchor) else {
        arena[node].color = NodeColor::Black;
        *anchor = Anchor::Populated {
            root: node,
            min: node,
            max: node,
        };

        return;
    };

    arena[node].parent = Some(parent);
    let (min, max) = match side {
        Side::Left => {
            arena[parent].left = Some(node);
            (if parent == min { node } else { min }, max)
        }
        Side::Right => {
            arena[parent].right = Some(node);
            (min, if parent == max { node } else { max })
        }
    };

    let root = fix_red_violation(arena, node, root);
    *anchor = Anchor::Populated { root, min, max };
}

fn fix_red_violation<V>(arena: &mut NodeArena<V>, start_node: NodeIndex, mut root: NodeIndex) -> NodeIndex {
    let mut curr_node = start_node;

    while let Some(parent) = arena[curr_node].parent {
        if !arena[parent].is_red() {
            break;
        }

        // a red parent is never the root, so the grandparent exists
        let Some(grandparent) = arena[parent].parent else {
            break;
        };

        let parent_is_right_child = arena[grandparent].right == Some(parent);
        let uncle = if parent_is_right_child {
            arena[grandparent].left
        } else {
            arena[grandparent].right
        };

        if let Some(uncle) = uncle.filter(|&uncle| arena[uncle].is_red()) {
            arena[parent].color = NodeColor::Black;
            arena[uncle].color = NodeColor::Black;
            arena[grandparent].color = NodeColor::Red;

            curr_node = grandparent;
            continue;
        }

        let mut parent = parent;
        let is_inner_grandchild = if parent_is_right_child {
            arena[parent].left == Some(curr_node)
        } else {
            arena[parent].right == Some(curr_node)
        };

        if is_inner_grandchild {
            root = if parent_is_right_child {
                rotate_right(arena, parent, root)
            } else {
                rotate_left(arena, parent, root)
            };

            parent = curr_node;
        }

        arena[parent].color = NodeColor::Black;
        arena[grandparent].color = NodeColor::Red;

        root = if parent_is_right_child {
            rotate_left(arena, grandparent, root)
        } else {
            rotate_right(arena, grandparent, root)
        };

        log::trace!(
            "insertion repair rotated around {} (inner grandchild: {is_inner_grandchild})",
            grandparent.slot
        );
        break;
    }

    arena[root].color = NodeColor::Black;

    root
}

/// Detaches `node` from the tree shape and restores the color invariants.
///
/// The node stays allocated; the caller frees it afterwards.
pub(crate) fn unlink<V>(arena: &mut NodeArena<V>, anchor: &mut Anchor, node: NodeIndex) {
    let Anchor::Populated { root, min, max } = *anchor else {
        unreachable!("unlinking from an empty tree");
    };

    let left = arena[node].left;
    let right = arena[node].right;
    let parent = arena[node].parent;

    if parent.is_none() && left.is_none() && right.is_none() {
        *anchor = Anchor::Empty;
        return;
    }

    // the minimum has no left child, the maximum no right child
    let min = if node == min {
        match (right, parent) {
            (Some(right), _) => leftmost(arena, right),
            (None, Some(parent)) => parent,
            (None, None) => unreachable!("lone root handled above"),
        }
    } else {
        min
    };
    let max = if node == max {
        match (left, parent) {
            (Some(left), _) => rightmost(arena, left),
            (None, Some(parent)) => parent,
            (None, None) => unreachable!("lone root handled above"),
        }
    } else {
        max
    };

    let removed_color;
    let replacement;
    let replacement_parent;
    let mut root = root;

    match (left, right) {
        (None, child) | (child, None) => {
            removed_color = arena[node].color;
            replacement = child;
            replacement_parent = parent;
            root = detach(arena, root, node, child);
        }
        (Some(left), Some(right)) => {
            // the successor takes over the node's place and color; the
            // deficiency, if any, is the successor's old color at its old spot
            let heir = leftmost(arena, right);
            removed_color = arena[heir].color;
            replacement = arena[heir].right;

            if arena[heir].parent == Some(node) {
                replacement_parent = Some(heir);
            } else {
                replacement_parent = arena[heir].parent;
                root = detach(arena, root, heir, replacement);
                arena[heir].right = Some(right);
                arena[right].parent = Some(heir);
            }

            root = replace_child(arena, root, node, heir);
            arena[heir].left = Some(left);
            arena[left].parent = Some(heir);
            arena[heir].color = arena[node].color;
        }
    }

    if removed_color == NodeColor::Black {
        root = fix_double_black(arena, replacement, replacement_parent, root);
    }

    arena[node].parent = None;
    arena[node].left = None;
    arena[node].right = None;

    *anchor = Anchor::Populated { root, min, max };
}

/// Splices `node` (which has at most one child) out, lifting `child` into its
/// slot. Returns the possibly-updated root.
fn detach<V>(arena: &mut NodeArena<V>, root: NodeIndex, node: NodeIndex, child: Option<NodeIndex>) -> NodeIndex {
    match child {
        Some(child) => replace_child(arena, root, node, child),
        None => {
            let Some(parent) = arena[node].parent else {
                unreachable!("a childless root is only detached when it is the last node");
            };

            if arena[parent].left == Some(node) {
                arena[parent].left = None;
            } else {
                arena[parent].right = None;
            }

            root
        }
    }
}

/// Repairs the missing black on every path through `node`, which may be an
/// empty link hanging off `parent`.
fn fix_double_black<V>(
    arena: &mut NodeArena<V>,
    mut node: Option<NodeIndex>,
    mut parent: Option<NodeIndex>,
    mut root: NodeIndex,
) -> NodeIndex {
    while node != Some(root) && !is_red(arena, node) {
        let Some(curr_parent) = parent else {
            break;
        };

        let node_is_left_child = arena[curr_parent].left == node;
        let sibling_of = |arena: &NodeArena<V>| {
            let sibling = if node_is_left_child {
                arena[curr_parent].right
            } else {
                arena[curr_parent].left
            };

            match sibling {
                Some(sibling) => sibling,
                None => unreachable!("a black-deficient path always has a sibling"),
            }
        };

        let mut sibling = sibling_of(arena);

        if arena[sibling].is_red() {
            arena[sibling].color = NodeColor::Black;
            arena[curr_parent].color = NodeColor::Red;
            root = if node_is_left_child {
                rotate_left(arena, curr_parent, root)
            } else {
                rotate_right(arena, curr_parent, root)
            };

            sibling = sibling_of(arena);
        }

        let (near, far) = if node_is_left_child {
            (arena[sibling].left, arena[sibling].right)
        } else {
            (arena[sibling].right, arena[sibling].left)
        };

        if !is_red(arena, near) && !is_red(arena, far) {
            arena[sibling].color = NodeColor::Red;
            node = Some(curr_parent);
            parent = arena[curr_parent].parent;
            continue;
        }

        if !is_red(arena, far) {
            if let Some(near) = near {
                arena[near].color = NodeColor::Black;
            }
            arena[sibling].color = NodeColor::Red;
            root = if node_is_left_child {
                rotate_right(arena, sibling, root)
            } else {
                rotate_left(arena, sibling, root)
            };

            sibling = sibling_of(arena);
        }

        arena[sibling].color = arena[curr_parent].color;
        arena[curr_parent].color = NodeColor::Black;

        let far = if node_is_left_child {
            arena[sibling].right
        } else {
            arena[sibling].left
        };
        if let Some(far) = far {
            arena[far].color = NodeColor::Black;
        }

        root = if node_is_left_child {
            rotate_left(arena, curr_parent, root)
        } else {
            rotate_right(arena, curr_parent, root)
        };

        log::trace!("erase repair absorbed the deficiency at {}", curr_parent.slot);
        node = Some(root);
        break;
    }

    if let Some(node) = node {
        arena[node].color = NodeColor::Black;
    }

    root
}

#[cfg(test)]
mod tests {
    use super::{Side, link, rotate_left, rotate_right, unlink};
    use crate::arena::NodeArena;
    use crate::node::{Anchor, HeartwoodNode, NodeColor, NodeIndex};

    //   p            r
    //  / \          / \
    // a   r   =>   p   c
    //    / \      / \
    //   b   c    a   b
    fn pivot_shape() -> (NodeArena<char>, [NodeIndex; 5]) {
        let mut arena = NodeArena::new();
        let [p, a, r, b, c] = ['p', 'a', 'r', 'b', 'c'].map(|key| arena.allocate(HeartwoodNode::new_isolated(key)));

        arena[p].left = Some(a);
        arena[p].right = Some(r);
        arena[a].parent = Some(p);
        arena[r].parent = Some(p);
        arena[r].left = Some(b);
        arena[r].right = Some(c);
        arena[b].parent = Some(r);
        arena[c].parent = Some(r);

        (arena, [p, a, r, b, c])
    }

    #[test]
    pub fn rotations_are_inverse() {
        let (mut arena, [p, a, r, b, c]) = pivot_shape();

        let root = rotate_left(&mut arena, p, p);
        assert_eq!(root, r);
        assert_eq!(arena[r].parent, None);
        assert_eq!(arena[r].left, Some(p));
        assert_eq!(arena[r].right, Some(c));
        assert_eq!(arena[p].left, Some(a));
        assert_eq!(arena[p].right, Some(b));
        assert_eq!(arena[b].parent, Some(p));

        let root = rotate_right(&mut arena, r, root);
        assert_eq!(root, p);
        assert_eq!(arena[p].parent, None);
        assert_eq!(arena[p].right, Some(r));
        assert_eq!(arena[r].left, Some(b));
        assert_eq!(arena[b].parent, Some(r));
    }

    #[test]
    pub fn rotation_below_root_keeps_root() {
        let (mut arena, [p, _, r, _, c]) = pivot_shape();

        let root = rotate_left(&mut arena, r, p);
        assert_eq!(root, p);
        assert_eq!(arena[p].right, Some(c));
        assert_eq!(arena[c].parent, Some(p));
        assert_eq!(arena[c].left, Some(r));
    }

    #[test]
    pub fn ascending_links_rebalance_into_black_root() {
        let mut arena = NodeArena::new();
        let mut anchor = Anchor::Empty;

        let one = arena.allocate(HeartwoodNode::new_isolated(1));
        link(&mut arena, &mut anchor, one, None, Side::Right);
        let two = arena.allocate(HeartwoodNode::new_isolated(2));
        link(&mut arena, &mut anchor, two, Some(one), Side::Right);
        let three = arena.allocate(HeartwoodNode::new_isolated(3));
        link(&mut arena, &mut anchor, three, Some(two), Side::Right);

        assert_eq!(
            anchor,
            Anchor::Populated {
                root: two,
                min: one,
                max: three
            }
        );
        assert_eq!(arena[two].color, NodeColor::Black);
        assert_eq!(arena[one].color, NodeColor::Red);
        assert_eq!(arena[three].color, NodeColor::Red);
    }

    #[test]
    pub fn unlinking_root_of_pair_leaves_black_root() {
        let mut arena = NodeArena::new();
        let mut anchor = Anchor::Empty;

        let one = arena.allocate(HeartwoodNode::new_isolated(1));
        link(&mut arena, &mut anchor, one, None, Side::Right);
        let two = arena.allocate(HeartwoodNode::new_isolated(2));
        link(&mut arena, &mut anchor, two, Some(one), Side::Right);

        unlink(&mut arena, &mut anchor, one);

        assert_eq!(
            anchor,
            Anchor::Populated {
                root: two,
                min: two,
                max: two
            }
        );
        assert_eq!(arena[two].color, NodeColor::Black);
        assert_eq!(arena[two].parent, None);

        unlink(&mut arena, &mut anchor, two);
        assert_eq!(anchor, Anchor::Empty);
    }
}
