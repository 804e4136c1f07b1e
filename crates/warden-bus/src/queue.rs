//! A single FIFO queue, bounded or unbounded, shared by one producer side and
//! one consumer side. Backs each of the bus's two independent queues.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::sync::Mutex;

enum Sender<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

enum Receiver<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

pub struct Queue<T> {
    tx: Sender<T>,
    rx: Mutex<Receiver<T>>,
    len: AtomicUsize,
}

impl<T> Queue<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        match capacity {
            Some(n) => {
                let (tx, rx) = mpsc::channel(n.max(1));
                Self {
                    tx: Sender::Bounded(tx),
                    rx: Mutex::new(Receiver::Bounded(rx)),
                    len: AtomicUsize::new(0),
                }
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                Self {
                    tx: Sender::Unbounded(tx),
                    rx: Mutex::new(Receiver::Unbounded(rx)),
                    len: AtomicUsize::new(0),
                }
            }
        }
    }

    /// Suspends the caller when a bounded queue is full; returns once the
    /// message has been handed to a (possibly future) consumer.
    pub async fn publish(&self, item: T) {
        match &self.tx {
            Sender::Bounded(tx) => {
                // A closed receiver only happens after `stop()`; publishers racing
                // shutdown simply drop the message rather than panicking.
                if tx.send(item).await.is_ok() {
                    self.len.fetch_add(1, Ordering::SeqCst);
                }
            }
            Sender::Unbounded(tx) => {
                if tx.send(item).is_ok() {
                    self.len.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }

    /// Blocks indefinitely until a message arrives or the queue is closed.
    /// Returns `None` once closed (after `stop()` drops every sender/receiver).
    pub async fn consume(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        let item = match &mut *rx {
            Receiver::Bounded(rx) => rx.recv().await,
            Receiver::Unbounded(rx) => rx.recv().await,
        };
        if item.is_some() {
            self.len.fetch_sub(1, Ordering::SeqCst);
        }
        item
    }

    /// Best-effort snapshot; not synchronised with in-flight consumers.
    pub fn size(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    /// Closes the receive side so any consumer parked in `recv().await` wakes
    /// with `None` immediately.
    pub async fn close(&self) {
        let mut rx = self.rx.lock().await;
        match &mut *rx {
            Receiver::Bounded(rx) => rx.close(),
            Receiver::Unbounded(rx) => rx.close(),
        }
    }
}
