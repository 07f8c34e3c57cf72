use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Socket;

/// FIFO of waiting sockets with O(1) push, pop and removal from any
/// position.
///
/// Nodes live in a slot arena and link to each other by slot index; the
/// index map finds a socket's slot without walking the list.
#[derive(Default)]
pub struct Queue {
    inner: Mutex<LinkedSlots>,
}

#[derive(Default)]
struct LinkedSlots {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<Socket, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

struct Node {
    socket: Socket,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the tail. A socket that is already queued keeps its place.
    pub fn push(&self, socket: Socket) {
        self.lock().push(socket);
    }

    /// Removes and returns the longest-waiting socket.
    #[cfg(test)]
    pub(crate) fn pop(&self) -> Option<Socket> {
        self.lock().pop()
    }

    /// Removes a socket wherever it is. Absent sockets are ignored.
    pub fn remove(&self, socket: &Socket) -> bool {
        self.lock().remove(socket).is_some()
    }

    /// Pops `n` sockets from the head in one step. Takes nothing unless at
    /// least `n` are waiting.
    pub fn pop_many(&self, n: usize) -> Option<Vec<Socket>> {
        let mut slots = self.lock();
        if n == 0 || slots.index.len() < n {
            return None;
        }
        Some((0..n).filter_map(|_| slots.pop()).collect())
    }

    pub fn count(&self) -> usize {
        self.lock().index.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, socket: &Socket) -> bool {
        self.lock().index.contains_key(socket)
    }

    /// Queued sockets from head to tail.
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Vec<Socket> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LinkedSlots> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl LinkedSlots {
    fn push(&mut self, socket: Socket) {
        if self.index.contains_key(&socket) {
            return;
        }

        let node = Node {
            socket: socket.clone(),
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.index.insert(socket, slot);
    }

    fn pop(&mut self) -> Option<Socket> {
        let head = self.head?;
        let socket = self.slots[head].as_ref()?.socket.clone();
        self.remove(&socket)
    }

    fn remove(&mut self, socket: &Socket) -> Option<Socket> {
        let slot = self.index.remove(socket)?;
        let node = self.slots[slot].take()?;
        self.free.push(slot);

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        Some(node.socket)
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node {
        // Linked slots are always occupied; `remove` unlinks before freeing.
        match self.slots[slot].as_mut() {
            Some(node) => node,
            None => unreachable!("queue link points at free slot {slot}"),
        }
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &Socket> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.slots[cursor?].as_ref()?;
            cursor = node.next;
            Some(&node.socket)
        })
    }
}
