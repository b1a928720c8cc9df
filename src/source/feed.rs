//! Work item feeds
//!
//! Every item source ends up as one channel of items that the workers share. A feed
//! bundles that channel with the loop that fills it, so the coordinator can run the
//! producer on its own thread next to the workers. The channel is closed exactly once,
//! when the producer returns and drops its sender.

use super::ReadString;
use crossbeam::channel::{Receiver, Sender, bounded};

/// A paginated cursor over external results, such as a remote listing that fetches
/// pages on demand.
pub trait PagedIterator {
    type Item;

    /// Moves to the next result, returning `false` when there are no more.
    fn advance(&mut self) -> bool;

    /// The result the cursor is positioned on, taken out of the cursor.
    /// `None` if `advance` has not returned `true` since the last call.
    fn current(&mut self) -> Option<Self::Item>;
}

/// Adapts any [`Iterator`] into a [`PagedIterator`].
#[derive(Debug)]
pub struct Paged<I: Iterator> {
    iter: I,
    current: Option<I::Item>,
}

impl<I: Iterator> Paged<I> {
    pub fn new<T: IntoIterator<IntoIter = I>>(iter: T) -> Self {
        Self {
            iter: iter.into_iter(),
            current: None,
        }
    }
}

impl<I: Iterator> PagedIterator for Paged<I> {
    type Item = I::Item;

    fn advance(&mut self) -> bool {
        self.current = self.iter.next();
        self.current.is_some()
    }

    fn current(&mut self) -> Option<Self::Item> {
        self.current.take()
    }
}

/// Loop that fills a feed's channel; returns how many items it pushed.
pub(crate) type Producer<'a> = Box<dyn FnOnce() -> usize + Send + 'a>;

/// A channel of work items plus the producer that fills it, if any.
pub struct Feed<'a, T> {
    items: Receiver<T>,
    producer: Option<Producer<'a>>,
}

impl<'a, T: Send + 'a> Feed<'a, T> {
    /// Items from a channel that someone else fills and closes.
    pub fn from_channel(items: Receiver<T>) -> Self {
        Self {
            items,
            producer: None,
        }
    }

    /// Items from a paginated cursor, with up to `buffer_size` results fetched ahead
    /// of the workers.
    pub fn from_paged<P>(mut cursor: P, buffer_size: usize) -> Self
    where
        P: PagedIterator<Item = T> + Send + 'a,
    {
        let (tx, rx) = bounded(buffer_size);
        let producer: Producer<'a> = Box::new(move || {
            let mut pushed = 0;
            while cursor.advance() {
                let Some(item) = cursor.current() else {
                    break;
                };
                if tx.send(item).is_err() {
                    break; // Workers dropped
                }
                pushed += 1;
            }
            pushed
        });

        Self {
            items: rx,
            producer: Some(producer),
        }
    }

    pub(crate) fn into_parts(self) -> (Receiver<T>, Option<Producer<'a>>) {
        (self.items, self.producer)
    }
}

impl<'a> Feed<'a, String> {
    /// Strings pulled from a [`ReadString`] one at a time. The channel has no buffer,
    /// so the reader is only advanced when a worker is ready for the next item.
    pub fn from_reader<R: ReadString + Send + 'a>(reader: R) -> Self {
        let (tx, rx) = bounded(0);
        let producer: Producer<'a> = Box::new(move || pump_strings(reader, &tx));

        Self {
            items: rx,
            producer: Some(producer),
        }
    }
}

fn pump_strings<R: ReadString>(mut reader: R, tx: &Sender<String>) -> usize {
    let mut pushed = 0;
    while let Some(item) = reader.read_string() {
        if tx.send(item).is_err() {
            break; // Workers dropped
        }
        pushed += 1;
    }
    pushed
}
