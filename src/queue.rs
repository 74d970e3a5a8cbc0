//! Unbounded FIFO blocking queue using crossbeam channels.

use crossbeam_channel::{self, Receiver, Sender};

/// An unbounded, thread-safe MPMC FIFO with a blocking pop.
///
/// Push always succeeds immediately; pop blocks the calling thread until an
/// element is available. Both primitives in this crate drain one of these
/// internally.
///
/// The queue holds both channel halves for its whole lifetime, so the
/// channel can never disconnect while the queue is alive.
///
/// # Example
///
/// ```rust
/// use workpool::queue::BlockingQueue;
///
/// let queue = BlockingQueue::new();
/// queue.push(7);
/// assert_eq!(queue.pop(), 7);
/// ```
pub struct BlockingQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T: Send> BlockingQueue<T> {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Enqueues an element. Never blocks.
    pub fn push(&self, element: T) {
        // The queue owns a receiver, so the channel cannot be disconnected.
        let _ = self.sender.send(element);
    }

    /// Dequeues an element, blocking until one is available.
    pub fn pop(&self) -> T {
        match self.receiver.recv() {
            Ok(element) => element,
            Err(_) => unreachable!("queue owns a sender; the channel cannot disconnect"),
        }
    }

    /// Dequeues an element without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Removes and returns everything currently queued, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// The current length of the queue. The value is approximate: it may
    /// change between the call and the use of the result. Diagnostics only.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Indication that the queue is empty at this point in time.
    /// Diagnostics only.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T: Send> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo() {
        let queue = BlockingQueue::new();
        for i in 0..128 {
            queue.push(i);
        }
        for i in 0..128 {
            assert_eq!(queue.pop(), i);
        }
    }

    #[test]
    fn test_try_pop_empty() {
        let queue: BlockingQueue<i32> = BlockingQueue::new();
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_drain() {
        let queue = BlockingQueue::new();
        for i in 0..5 {
            queue.push(i);
        }
        assert_eq!(queue.drain(), vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_len() {
        let queue = BlockingQueue::new();
        assert!(queue.is_empty());
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue = Arc::new(BlockingQueue::new());
        let consumer_queue = Arc::clone(&queue);

        let consumer = thread::spawn(move || consumer_queue.pop());

        thread::sleep(Duration::from_millis(20));
        queue.push(42);
        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn test_concurrent_push_pop() {
        let queue = Arc::new(BlockingQueue::new());
        let num_items = 100;

        let mut producers = vec![];
        for p in 0..4 {
            let q = Arc::clone(&queue);
            producers.push(thread::spawn(move || {
                for i in 0..num_items / 4 {
                    q.push((p, i));
                }
            }));
        }
        for p in producers {
            p.join().unwrap();
        }

        let mut received = 0;
        while queue.try_pop().is_some() {
            received += 1;
        }
        assert_eq!(received, num_items);
    }
}
