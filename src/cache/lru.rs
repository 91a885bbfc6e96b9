//! LRU List Module
//!
//! Recency ordering for cache entries, kept in an index-linked arena so that
//! unlinking and relinking a node is O(1) and safe.

/// Null link marker.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    item: Option<T>,
    prev: usize,
    next: usize,
    /// Position of this node's handle in `live`
    live_pos: usize,
}

// == LRU List ==
/// Doubly-linked list over an arena of slots.
///
/// - Head = least recently used
/// - Tail = most recently used
///
/// Slots are addressed by `usize` handles. A handle stays valid until its
/// item is removed or the list is compacted. Handles of live items are also
/// kept densely in `live`, in no particular order, so picking live items at
/// random costs nothing per vacant slot.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Node<T>>,
    head: usize,
    tail: usize,
    free: Vec<usize>,
    live: Vec<usize>,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: NIL,
            tail: NIL,
            free: Vec::new(),
            live: Vec::new(),
        }
    }

    // == Push Back ==
    /// Appends an item at the most-recent end and returns its handle.
    pub fn push_back(&mut self, item: T) -> usize {
        let node = Node {
            item: Some(item),
            prev: self.tail,
            next: NIL,
            live_pos: self.live.len(),
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        };

        if self.tail != NIL {
            self.slots[self.tail].next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
        self.live.push(idx);
        idx
    }

    // == Remove ==
    /// Unlinks the node at `idx` and returns its item.
    ///
    /// Returns None if the slot is vacant or out of range.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        let item = self.slots.get_mut(idx)?.item.take()?;
        self.unlink(idx);

        let pos = self.slots[idx].live_pos;
        self.live.swap_remove(pos);
        if let Some(&moved) = self.live.get(pos) {
            self.slots[moved].live_pos = pos;
        }

        self.free.push(idx);
        Some(item)
    }

    // == Move To Back ==
    /// Marks the node at `idx` as most recently used.
    pub fn move_to_back(&mut self, idx: usize) {
        if !self.is_occupied(idx) || idx == self.tail {
            return;
        }
        self.unlink(idx);
        let node = &mut self.slots[idx];
        node.prev = self.tail;
        node.next = NIL;
        self.slots[self.tail].next = idx;
        self.tail = idx;
    }

    // == Pop Front ==
    /// Removes and returns the least recently used item.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.head == NIL {
            return None;
        }
        self.remove(self.head)
    }

    // == Accessors ==
    /// Returns the item at `idx`, if occupied.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(|n| n.item.as_ref())
    }

    /// Returns true if `idx` holds a live item.
    pub fn is_occupied(&self, idx: usize) -> bool {
        self.get(idx).is_some()
    }

    /// Handles of every live item, unordered.
    pub fn handles(&self) -> &[usize] {
        &self.live
    }

    /// Number of slots allocated, live or vacant.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    // == Length ==
    /// Returns the number of live items.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    // == Is Empty ==
    /// Returns true if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    // == Clear ==
    /// Drops every item and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    // == Compact ==
    /// Rebuilds the arena with only live items, in recency order, and frees
    /// the vacant slots.
    ///
    /// Every handle changes. `relocated` is called once per item with its
    /// new handle so that callers can update their own references.
    pub fn compact<F>(&mut self, mut relocated: F)
    where
        F: FnMut(&T, usize),
    {
        let mut old = std::mem::take(&mut self.slots);
        let mut cursor = self.head;
        self.clear();

        while cursor != NIL {
            let node = &mut old[cursor];
            cursor = node.next;
            if let Some(item) = node.item.take() {
                let idx = self.push_back(item);
                if let Some(item) = self.get(idx) {
                    relocated(item, idx);
                }
            }
        }

        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
        self.live.shrink_to_fit();
    }

    /// Iterates items from least to most recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.slots[idx];
            (node.prev, node.next)
        };
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
    }
}

/// Iterator from head (LRU) to tail (MRU).
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.list.slots[self.cursor];
        self.cursor = node.next;
        node.item.as_ref()
    }
}
