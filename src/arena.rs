use core::mem;
use core::ops::{Index, IndexMut};

use alloc::vec::Vec;

use crate::cursor::Links;
use crate::node::{HeartwoodNode, NodeIndex};

/*
vacant cells form an intrusive free list whose head lives in the arena:
- allocating pops the head, new head is the popped cell's `next_free`
- freeing a cell points it at the current head and makes it the head

indices handed out are never moved, so a node keeps its identity until it is
freed, whatever rotations happen around it. every allocation draws a fresh
generation from a counter that only grows (clear included), so an index left
over from a freed node never matches whatever later fills its cell.
*/

#[derive(Debug)]
enum Slot<V> {
    Occupied { generation: u64, node: HeartwoodNode<V> },
    Vacant { next_free: Option<usize> },
}

/// Index-addressed node allocator backing a single tree.
#[derive(Debug)]
pub(crate) struct NodeArena<V> {
    slots: Vec<Slot<V>>,
    free_head: Option<usize>,
    occupied: usize,
    next_generation: u64,
}

impl<V> NodeArena<V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            occupied: 0,
            next_generation: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            occupied: 0,
            next_generation: 0,
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.occupied
    }

    /// Makes room for `additional` more nodes, counting recycled cells.
    pub(crate) fn reserve(&mut self, additional: usize) {
        let recyclable = self.slots.len() - self.occupied;
        self.slots.reserve(additional.saturating_sub(recyclable));
    }

    pub(crate) fn allocate(&mut self, node: HeartwoodNode<V>) -> NodeIndex {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.occupied += 1;

        let filled = Slot::Occupied { generation, node };
        let slot = match self.free_head {
            Some(free) => {
                self.free_head = match mem::replace(&mut self.slots[free], filled) {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied { .. } => unreachable!("free list points at a live node"),
                };

                free
            }
            None => {
                self.slots.push(filled);

                self.slots.len() - 1
            }
        };

        NodeIndex::new(slot, generation)
    }

    /// Frees the cell at `index` and hands back the payload it held.
    pub(crate) fn deallocate(&mut self, index: NodeIndex) -> V {
        match self.slots.get(index.slot) {
            Some(Slot::Occupied { generation, .. }) if *generation == index.generation => {}
            Some(Slot::Vacant { .. }) => panic!("node {} was already freed", index.slot),
            _ => stale(index),
        }

        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match mem::replace(&mut self.slots[index.slot], vacant) {
            Slot::Occupied { node, .. } => {
                self.free_head = Some(index.slot);
                self.occupied -= 1;

                node.value
            }
            Slot::Vacant { .. } => unreachable!("cell checked as occupied above"),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.occupied = 0;
    }

    /// Snapshot of every cell's links, each live one paired with a mutable
    /// borrow of its payload. Entries sit at their cell's slot.
    pub(crate) fn linked_values_mut(&mut self) -> Vec<Option<LinkedValue<'_, V>>> {
        self.slots
            .iter_mut()
            .map(|slot| match slot {
                Slot::Occupied { node, .. } => Some(LinkedValue {
                    parent: node.parent,
                    left: node.left,
                    right: node.right,
                    value: Some(&mut node.value),
                }),
                Slot::Vacant { .. } => None,
            })
            .collect()
    }

    /// Consumes the arena, yielding payloads in the order of `order`.
    pub(crate) fn into_values_in(self, order: &[NodeIndex]) -> Vec<V> {
        let mut values: Vec<Option<V>> = self
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Occupied { node, .. } => Some(node.value),
                Slot::Vacant { .. } => None,
            })
            .collect();

        order
            .iter()
            .filter_map(|index| values[index.slot].take())
            .collect()
    }
}

/// Links of a live node, detached from the arena, next to its payload until
/// someone takes it.
pub(crate) struct LinkedValue<'a, V> {
    parent: Option<NodeIndex>,
    left: Option<NodeIndex>,
    right: Option<NodeIndex>,
    pub(crate) value: Option<&'a mut V>,
}

fn linked<'s, 'a, V>(table: &'s [Option<LinkedValue<'a, V>>], node: NodeIndex) -> &'s LinkedValue<'a, V> {
    match table.get(node.slot) {
        Some(Some(linked)) => linked,
        _ => unreachable!("link to vacant cell {}", node.slot),
    }
}

impl<V> Links for [Option<LinkedValue<'_, V>>] {
    fn left(&self, node: NodeIndex) -> Option<NodeIndex> {
        linked(self, node).left
    }

    fn right(&self, node: NodeIndex) -> Option<NodeIndex> {
        linked(self, node).right
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        linked(self, node).parent
    }
}

fn stale(index: NodeIndex) -> ! {
    panic!("stale position: node {} was erased", index.slot)
}

impl<V> Default for NodeArena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<NodeIndex> for NodeArena<V> {
    type Output = HeartwoodNode<V>;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        match self.slots.get(index.slot) {
            Some(Slot::Occupied { generation, node }) if *generation == index.generation => node,
            _ => stale(index),
        }
    }
}

impl<V> IndexMut<NodeIndex> for NodeArena<V> {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        match self.slots.get_mut(index.slot) {
            Some(Slot::Occupied { generation, node }) if *generation == index.generation => node,
            _ => stale(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NodeArena;
    use crate::node::HeartwoodNode;

    #[test]
    pub fn freed_cells_are_recycled_last_in_first_out() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(HeartwoodNode::new_isolated('a'));
        let b = arena.allocate(HeartwoodNode::new_isolated('b'));
        let c = arena.allocate(HeartwoodNode::new_isolated('c'));

        assert_eq!(arena.deallocate(a), 'a');
        assert_eq!(arena.deallocate(c), 'c');
        assert_eq!(arena.len(), 1);

        assert_eq!(arena.allocate(HeartwoodNode::new_isolated('d')).slot, c.slot);
        assert_eq!(arena.allocate(HeartwoodNode::new_isolated('e')).slot, a.slot);
        assert_eq!(arena.allocate(HeartwoodNode::new_isolated('f')).slot, 3);
        assert_eq!(arena[b].value, 'b');
        assert_eq!(arena.len(), 4);
    }

    #[test]
    #[should_panic(expected = "stale position")]
    pub fn reading_a_freed_cell_panics() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(HeartwoodNode::new_isolated(1));
        arena.deallocate(a);

        let _ = &arena[a];
    }

    #[test]
    #[should_panic(expected = "stale position")]
    pub fn recycled_cell_rejects_previous_occupant() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(HeartwoodNode::new_isolated(1));
        arena.deallocate(a);
        let b = arena.allocate(HeartwoodNode::new_isolated(2));
        assert_eq!(a.slot, b.slot);
        assert_eq!(arena[b].value, 2);

        let _ = &arena[a];
    }

    #[test]
    #[should_panic(expected = "stale position")]
    pub fn indices_from_before_clear_stay_stale() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(HeartwoodNode::new_isolated(1));
        arena.clear();
        arena.allocate(HeartwoodNode::new_isolated(2));

        let _ = &arena[a];
    }

    #[test]
    #[should_panic(expected = "already freed")]
    pub fn double_free_panics() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(HeartwoodNode::new_isolated(1));
        arena.deallocate(a);
        arena.deallocate(a);
    }

    #[test]
    pub fn link_snapshot_skips_vacant_cells() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(HeartwoodNode::new_isolated(10));
        let b = arena.allocate(HeartwoodNode::new_isolated(20));
        let c = arena.allocate(HeartwoodNode::new_isolated(30));
        arena.deallocate(b);

        let snapshot = arena.linked_values_mut();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot[b.slot].is_none());
        for value in snapshot.into_iter().flatten().filter_map(|linked| linked.value) {
            *value += 1;
        }

        assert_eq!(arena.into_values_in(&[c, a]), vec![31, 11]);
    }
}
