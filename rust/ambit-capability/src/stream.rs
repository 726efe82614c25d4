//! One-directional production of values.
//!
//! A producer yields items in order and never hears back from the consumer.
//! Whether the sequence is lazy, bounded or restartable is a property of the
//! channel backing the capability: a rendezvous `sync_channel(0)` runs the
//! producer only as fast as the consumer pulls, an unbounded channel lets it
//! run ahead.

use std::convert::Infallible;
use std::marker::PhantomData;
use std::sync::mpsc;

use crossbeam_queue::SegQueue;
use tracing::debug;

use crate::{Provide, ReaderStrategy, Rename, WriterStrategy};

/// Emission of items tagged `Tag` to a consumer.
pub trait HasStream<Tag> {
    /// The items produced.
    type Item;

    /// Emit `item` after every item emitted before it.
    fn r#yield(&self, item: Self::Item);

    /// Emit every item of `items`, in iteration order.
    fn yield_all(&self, items: impl IntoIterator<Item = Self::Item>) {
        for item in items {
            <Self as HasStream<Tag>>::r#yield(self, item);
        }
    }
}

/// How a strategy emits items reached from the context `C`.
pub trait StreamStrategy<C> {
    /// The items produced.
    type Item;

    /// Emit `item`.
    fn r#yield(ctx: &C, item: Self::Item);
}

impl<C, Tag> HasStream<Tag> for C
where
    C: Provide<Tag>,
    <C as Provide<Tag>>::Via: StreamStrategy<C>,
{
    type Item = <<C as Provide<Tag>>::Via as StreamStrategy<C>>::Item;

    #[inline]
    fn r#yield(&self, item: Self::Item) {
        <<C as Provide<Tag>>::Via as StreamStrategy<C>>::r#yield(self, item)
    }
}

/// The producing end of a channel.
///
/// Emitting into a channel whose consumer is gone drops the item; the
/// producer carries on, since nothing can flow back to it.
pub trait Emitter {
    /// The items carried.
    type Item;

    /// Hand `item` to the consumer.
    fn emit(&self, item: Self::Item);
}

impl<T> Emitter for mpsc::Sender<T> {
    type Item = T;

    fn emit(&self, item: T) {
        if self.send(item).is_err() {
            debug!("stream consumer disconnected, dropping item");
        }
    }
}

/// Blocks while the channel is full, so a zero-capacity channel makes every
/// `yield` wait for the consumer.
impl<T> Emitter for mpsc::SyncSender<T> {
    type Item = T;

    fn emit(&self, item: T) {
        if self.send(item).is_err() {
            debug!("stream consumer disconnected, dropping item");
        }
    }
}

impl<T> Emitter for crossbeam_channel::Sender<T> {
    type Item = T;

    fn emit(&self, item: T) {
        if let Err(crossbeam_channel::SendError(_)) = self.send(item) {
            debug!(
                capacity = ?self.capacity(),
                "stream consumer disconnected, dropping item"
            );
        }
    }
}

impl<T> Emitter for SegQueue<T> {
    type Item = T;

    fn emit(&self, item: T) {
        self.push(item);
    }
}

/// Pair the receiver with `tokio_stream::wrappers::UnboundedReceiverStream`
/// to consume the items as an async `Stream`.
#[cfg(feature = "tokio")]
impl<T> Emitter for tokio::sync::mpsc::UnboundedSender<T> {
    type Item = T;

    fn emit(&self, item: T) {
        if self.send(item).is_err() {
            debug!("stream consumer disconnected, dropping item");
        }
    }
}

/// Items handed to the [`Emitter`] that the reader strategy `Of` yields.
pub struct Channel<Of>(Infallible, PhantomData<fn() -> Of>);

impl<C, Of> StreamStrategy<C> for Channel<Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: Emitter,
{
    type Item = <Of::Target as Emitter>::Item;

    #[inline]
    fn r#yield(ctx: &C, item: Self::Item) {
        Of::reader(ctx, |emitter| emitter.emit(item))
    }
}

/// Items collected by the writer strategy `Of`, whose output is a `Vec`.
///
/// The whole stream is buffered; consumers read it once production is done.
pub struct StreamLog<Of>(Infallible, PhantomData<fn() -> Of>);

impl<C, Of, T> StreamStrategy<C> for StreamLog<Of>
where
    Of: WriterStrategy<C, Output = Vec<T>>,
{
    type Item = T;

    #[inline]
    fn r#yield(ctx: &C, item: T) {
        Of::tell(ctx, vec![item])
    }
}

impl<C, Tag> StreamStrategy<C> for Rename<Tag>
where
    C: HasStream<Tag>,
{
    type Item = <C as HasStream<Tag>>::Item;

    #[inline]
    fn r#yield(ctx: &C, item: Self::Item) {
        <C as HasStream<Tag>>::r#yield(ctx, item)
    }
}

/// Emit `item` on the stream tagged `Tag`.
pub fn r#yield<Tag, C>(ctx: &C, item: C::Item)
where
    C: HasStream<Tag>,
{
    ctx.r#yield(item)
}

/// Emit every item of `items` on the stream tagged `Tag`.
pub fn yield_all<Tag, C>(ctx: &C, items: impl IntoIterator<Item = C::Item>)
where
    C: HasStream<Tag>,
{
    ctx.yield_all(items)
}

#[cfg(test)]
mod tests {
    use crate::*;
    use crossbeam_queue::SegQueue;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::sync::mpsc;

    tag!(Numbers, Words, Queue, Log, Alias);

    #[derive(Fields)]
    struct Context {
        numbers: mpsc::Sender<u32>,
        words: crossbeam_channel::Sender<&'static str>,
        queue: SegQueue<char>,
        log: RefCell<Vec<u8>>,
    }

    provide!(Context {
        Numbers => Channel<Field<context::numbers>>,
        Words => Channel<Field<context::words>>,
        Queue => Channel<Field<context::queue>>,
        Log => StreamLog<Appender<Field<context::log>>>,
        Alias => Rename<Numbers>,
    });

    struct Consumers {
        numbers: mpsc::Receiver<u32>,
        words: crossbeam_channel::Receiver<&'static str>,
    }

    fn context() -> (Context, Consumers) {
        let (numbers, numbers_rx) = mpsc::channel();
        let (words, words_rx) = crossbeam_channel::unbounded();
        let ctx = Context {
            numbers,
            words,
            queue: SegQueue::new(),
            log: RefCell::new(Vec::new()),
        };
        (
            ctx,
            Consumers {
                numbers: numbers_rx,
                words: words_rx,
            },
        )
    }

    #[test]
    fn it_yields_in_emission_order() {
        let (ctx, consumers) = context();
        stream::r#yield::<Numbers, _>(&ctx, 1);
        stream::yield_all::<Numbers, _>(&ctx, [2, 3]);
        stream::r#yield::<Alias, _>(&ctx, 4);
        drop(ctx);

        assert_eq!(consumers.numbers.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn it_yields_into_crossbeam_and_queues() {
        let (ctx, consumers) = context();
        stream::yield_all::<Words, _>(&ctx, ["to", "be"]);
        stream::yield_all::<Queue, _>(&ctx, "ab".chars());

        assert_eq!(consumers.words.try_iter().collect::<Vec<_>>(), vec!["to", "be"]);
        assert_eq!(ctx.queue.pop(), Some('a'));
        assert_eq!(ctx.queue.pop(), Some('b'));
        assert_eq!(ctx.queue.pop(), None);
    }

    #[test]
    fn it_collects_into_a_writer() {
        let (ctx, _consumers) = context();
        stream::yield_all::<Log, _>(&ctx, [3, 1, 2]);
        assert_eq!(ctx.log.into_inner(), vec![3, 1, 2]);
    }

    #[test]
    fn it_keeps_producing_after_the_consumer_leaves() {
        let (ctx, consumers) = context();
        drop(consumers);

        stream::r#yield::<Numbers, _>(&ctx, 1);
        stream::r#yield::<Words, _>(&ctx, "ignored");
    }

    #[test]
    fn it_resolves_generic_code_against_the_context() {
        fn countdown<C: HasStream<Numbers, Item = u32>>(ctx: &C, from: u32) {
            ctx.yield_all((0..=from).rev());
        }

        let (ctx, consumers) = context();
        countdown(&ctx, 3);
        drop(ctx);

        assert_eq!(consumers.numbers.iter().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }
}
