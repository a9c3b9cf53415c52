//! Index-based doubly linked lists over arena slots.
//!
//! [`IndexLists`] keeps one link record per arena slot and any number of
//! independent lists threaded through those records. A slot can be a member
//! of at most one list of a given `IndexLists` at a time, which is exactly
//! the shape of both the update sequence (one list) and the collision group
//! index (one list per group).
//!
//! Heads and tails are `Option`s instead of sentinel nodes, and links are
//! slot indices instead of pointers, so insert/remove stay O(1) without any
//! aliasing between the lists and the entity storage.

#[derive(Clone, Copy, Debug, Default)]
struct Link {
    prev: Option<u32>,
    next: Option<u32>,
    list: Option<u16>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Ends {
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

#[derive(Clone, Debug)]
pub struct IndexLists {
    links: Vec<Link>,
    ends: Vec<Ends>,
}

impl IndexLists {
    pub fn new(capacity: usize, lists: usize) -> Self {
        debug_assert!(lists <= usize::from(u16::MAX));
        Self {
            links: vec![Link::default(); capacity],
            ends: vec![Ends::default(); lists],
        }
    }

    pub fn list_count(&self) -> usize {
        self.ends.len()
    }

    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Append `node` at the tail of `list`. The node must not be linked.
    pub fn push_back(&mut self, list: u16, node: u32) {
        debug_assert!(
            self.links[node as usize].list.is_none(),
            "slot {node} is already linked into list {:?}",
            self.links[node as usize].list
        );
        let ends = &mut self.ends[usize::from(list)];
        let old_tail = ends.tail;
        ends.tail = Some(node);
        if ends.head.is_none() {
            ends.head = Some(node);
        }
        ends.len += 1;
        if let Some(t) = old_tail {
            self.links[t as usize].next = Some(node);
        }
        self.links[node as usize] = Link {
            prev: old_tail,
            next: None,
            list: Some(list),
        };
    }

    /// Unlink `node` from whatever list holds it. Returns that list.
    pub fn remove(&mut self, node: u32) -> Option<u16> {
        let link = self.links[node as usize];
        let list = link.list?;
        let ends = &mut self.ends[usize::from(list)];
        match link.prev {
            Some(p) => self.links[p as usize].next = link.next,
            None => ends.head = link.next,
        }
        match link.next {
            Some(n) => self.links[n as usize].prev = link.prev,
            None => ends.tail = link.prev,
        }
        ends.len -= 1;
        self.links[node as usize] = Link::default();
        Some(list)
    }

    /// Unlink `node` and append it to the tail of `list`.
    pub fn move_to_back(&mut self, node: u32, list: u16) {
        self.remove(node);
        self.push_back(list, node);
    }

    pub fn list_of(&self, node: u32) -> Option<u16> {
        self.links[node as usize].list
    }

    pub fn contains(&self, node: u32) -> bool {
        self.list_of(node).is_some()
    }

    pub fn head(&self, list: u16) -> Option<u32> {
        self.ends[usize::from(list)].head
    }

    pub fn tail(&self, list: u16) -> Option<u32> {
        self.ends[usize::from(list)].tail
    }

    pub fn next(&self, node: u32) -> Option<u32> {
        self.links[node as usize].next
    }

    pub fn prev(&self, node: u32) -> Option<u32> {
        self.links[node as usize].prev
    }

    pub fn len(&self, list: u16) -> usize {
        self.ends[usize::from(list)].len
    }

    pub fn is_empty(&self, list: u16) -> bool {
        self.len(list) == 0
    }

    /// Walk `list` head to tail. Borrowing iterator: no mutation mid-walk.
    pub fn iter(&self, list: u16) -> Iter<'_> {
        Iter {
            lists: self,
            cursor: self.head(list),
        }
    }
}

pub struct Iter<'a> {
    lists: &'a IndexLists,
    cursor: Option<u32>,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let node = self.cursor?;
        self.cursor = self.lists.next(node);
        Some(node)
    }
}
