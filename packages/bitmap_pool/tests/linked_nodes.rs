//! Uses a pool chain as the node store of a minimal singly linked list, the way an
//! allocator-aware container consumes it.

use std::ptr::NonNull;

use bitmap_pool::{Error, PoolChain};
use new_zealand::nz;

struct Node {
    value: u64,
    next: Option<NonNull<Node>>,
}

struct NodeList {
    nodes: PoolChain<Node>,
    head: Option<NonNull<Node>>,
}

impl NodeList {
    fn new() -> Self {
        Self {
            nodes: PoolChain::builder().base_capacity(nz!(4)).build(),
            head: None,
        }
    }

    fn push_front(&mut self, value: u64) -> Result<(), Error> {
        let node = self.nodes.allocate(1)?;

        // SAFETY: The slot was just allocated and holds no value.
        unsafe {
            PoolChain::construct(
                node,
                Node {
                    value,
                    next: self.head,
                },
            );
        }

        self.head = Some(node);
        Ok(())
    }

    fn pop_front(&mut self) -> Option<u64> {
        let node = self.head?;

        // SAFETY: Every node reachable from the head holds a live value.
        let (value, next) = unsafe {
            let node_ref = node.as_ref();
            (node_ref.value, node_ref.next)
        };

        // SAFETY: The node holds a live value that is not used after this point.
        unsafe { PoolChain::destroy(node) };

        self.nodes
            .deallocate(node, 1)
            .expect("every node was allocated from this chain");

        self.head = next;
        Some(value)
    }

    fn values(&self) -> Vec<u64> {
        let mut values = Vec::new();
        let mut cursor = self.head;

        while let Some(node) = cursor {
            // SAFETY: Every node reachable from the head holds a live value.
            let node_ref = unsafe { node.as_ref() };
            values.push(node_ref.value);
            cursor = node_ref.next;
        }

        values
    }
}

impl Drop for NodeList {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}

#[test]
fn list_spans_multiple_pools() {
    let mut list = NodeList::new();

    for value in 0..10 {
        list.push_front(value).unwrap();
    }

    assert_eq!(list.values(), [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);

    // Four nodes fit in the first pool, the next six in the eight-slot pool.
    assert_eq!(list.nodes.pool_count(), 2);
    assert_eq!(list.nodes.total_count(), 12);
    assert_eq!(list.nodes.free_count(), 2);
}

#[test]
fn freed_nodes_are_reused_without_growth() {
    let mut list = NodeList::new();

    for value in 0..4 {
        list.push_front(value).unwrap();
    }
    assert_eq!(list.nodes.occupancy(), "****\n");

    assert_eq!(list.pop_front(), Some(3));
    assert_eq!(list.pop_front(), Some(2));
    list.push_front(20).unwrap();
    list.push_front(30).unwrap();

    assert_eq!(list.nodes.pool_count(), 1);
    assert_eq!(list.values(), [30, 20, 1, 0]);
}

#[test]
fn draining_returns_every_slot() {
    let mut list = NodeList::new();

    for value in 0..25 {
        list.push_front(value).unwrap();
    }

    while list.pop_front().is_some() {}

    assert_eq!(list.nodes.free_count(), list.nodes.total_count());
    assert!(!list.nodes.occupancy().contains('*'));
}
