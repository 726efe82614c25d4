//! Append-only accumulation into a monoid.
//!
//! A writer can only grow its output: there is no way to read back what was
//! told through the capability. Two strategies back it:
//!
//! - [`Appender<Of>`] appends into a dedicated [`Sink`] reached by `Of`.
//! - [`WriterLog<Of>`] appends through a state strategy. It works, but each
//!   `tell` clones the accumulated output, so prefer a [`Sink`].

use std::cell::RefCell;
use std::convert::Infallible;
use std::marker::PhantomData;
use std::sync::{Mutex, RwLock};

use crossbeam_queue::SegQueue;

use crate::cell::{lock, write};
use crate::{Monoid, Provide, ReaderStrategy, Rename, StateStrategy};

/// Append-only access to the output tagged `Tag`.
///
/// `tell(a); tell(b)` has the same effect as `tell(a.combine(b))`.
pub trait HasWriter<Tag> {
    /// The accumulated output.
    type Output: Monoid;

    /// Append `output`.
    fn tell(&self, output: Self::Output);

    /// Append the second component of `entry` and return the first.
    fn writer<A>(&self, (value, output): (A, Self::Output)) -> A {
        <Self as HasWriter<Tag>>::tell(self, output);
        value
    }
}

/// How a strategy appends to an output reached from the context `C`.
pub trait WriterStrategy<C> {
    /// The accumulated output.
    type Output: Monoid;

    /// Append `output`.
    fn tell(ctx: &C, output: Self::Output);
}

impl<C, Tag> HasWriter<Tag> for C
where
    C: Provide<Tag>,
    <C as Provide<Tag>>::Via: WriterStrategy<C>,
{
    type Output = <<C as Provide<Tag>>::Via as WriterStrategy<C>>::Output;

    #[inline]
    fn tell(&self, output: Self::Output) {
        <<C as Provide<Tag>>::Via as WriterStrategy<C>>::tell(self, output)
    }
}

/// A destination that accumulates a monoid through a shared reference.
///
/// | Sink | concurrent `append` |
/// |------|---------------------|
/// | `crossbeam_queue::SegQueue<T>` | lock-free; items of concurrent appends may interleave |
/// | `std::sync::{Mutex, RwLock}`, `parking_lot::{Mutex, RwLock}` | atomic under the write lock |
/// | `RefCell` | single-threaded |
pub trait Sink {
    /// The accumulated output.
    type Output: Monoid;

    /// Append `output` in place.
    fn append(&self, output: Self::Output);
}

impl<T> Sink for SegQueue<T> {
    type Output = Vec<T>;

    fn append(&self, output: Vec<T>) {
        for item in output {
            self.push(item);
        }
    }
}

impl<W: Monoid> Sink for RefCell<W> {
    type Output = W;

    fn append(&self, output: W) {
        Monoid::append(&mut *self.borrow_mut(), output);
    }
}

impl<W: Monoid> Sink for Mutex<W> {
    type Output = W;

    fn append(&self, output: W) {
        Monoid::append(&mut *lock(self), output);
    }
}

impl<W: Monoid> Sink for RwLock<W> {
    type Output = W;

    fn append(&self, output: W) {
        Monoid::append(&mut *write(self), output);
    }
}

impl<W: Monoid> Sink for parking_lot::Mutex<W> {
    type Output = W;

    fn append(&self, output: W) {
        Monoid::append(&mut *self.lock(), output);
    }
}

impl<W: Monoid> Sink for parking_lot::RwLock<W> {
    type Output = W;

    fn append(&self, output: W) {
        Monoid::append(&mut *self.write(), output);
    }
}

/// Output appended into the [`Sink`] that the reader strategy `Of` yields.
pub struct Appender<Of>(Infallible, PhantomData<fn() -> Of>);

impl<C, Of> WriterStrategy<C> for Appender<Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: Sink,
{
    type Output = <Of::Target as Sink>::Output;

    #[inline]
    fn tell(ctx: &C, output: Self::Output) {
        Of::reader(ctx, |sink| Sink::append(sink, output))
    }
}

/// Output accumulated as the state of the state strategy `Of`.
///
/// Every `tell` replaces the state with `state.clone().combine(output)`, so
/// the whole output is copied each time. Use [`Appender`] over a [`Sink`]
/// unless the output has to live in existing state.
pub struct WriterLog<Of>(Infallible, PhantomData<fn() -> Of>);

impl<C, Of> WriterStrategy<C> for WriterLog<Of>
where
    Of: StateStrategy<C>,
    Of::State: Monoid + Clone,
{
    type Output = Of::State;

    fn tell(ctx: &C, output: Self::Output) {
        Of::state(ctx, |current| {
            ((), current.clone().combine(output.clone()))
        })
    }
}

impl<C, Tag> WriterStrategy<C> for Rename<Tag>
where
    C: HasWriter<Tag>,
{
    type Output = <C as HasWriter<Tag>>::Output;

    #[inline]
    fn tell(ctx: &C, output: Self::Output) {
        <C as HasWriter<Tag>>::tell(ctx, output)
    }
}

/// Append `output` to the writer tagged `Tag`.
pub fn tell<Tag, C>(ctx: &C, output: C::Output)
where
    C: HasWriter<Tag>,
{
    ctx.tell(output)
}

/// Append the second component of `entry` to the writer tagged `Tag` and
/// return the first.
pub fn writer<Tag, C, A>(ctx: &C, entry: (A, C::Output)) -> A
where
    C: HasWriter<Tag>,
{
    ctx.writer(entry)
}

#[cfg(test)]
mod tests {
    use crate::*;
    use crossbeam_queue::SegQueue;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    tag!(Log, Seen, Trail, Events, Alias);

    #[derive(Fields)]
    struct Context {
        log: RefCell<Vec<&'static str>>,
        seen: parking_lot::Mutex<BTreeSet<u32>>,
        trail: Mutex<String>,
        events: SegQueue<u32>,
    }

    provide!(Context {
        Log => Appender<Field<context::log>>,
        Seen => Appender<Field<context::seen>>,
        Trail => WriterLog<Ref<Field<context::trail>>>,
        Events => Appender<Field<context::events>>,
        Alias => Rename<Log>,
    });

    fn context() -> Context {
        Context {
            log: RefCell::new(Vec::new()),
            seen: parking_lot::Mutex::new(BTreeSet::new()),
            trail: Mutex::new(String::new()),
            events: SegQueue::new(),
        }
    }

    #[test]
    fn it_appends_in_order() {
        let ctx = context();
        writer::tell::<Log, _>(&ctx, vec!["a"]);
        writer::tell::<Log, _>(&ctx, vec!["b", "c"]);
        assert_eq!(ctx.log.into_inner(), vec!["a", "b", "c"]);
    }

    #[test]
    fn it_combines_with_the_monoid() {
        let ctx = context();
        writer::tell::<Seen, _>(&ctx, BTreeSet::from([3, 1]));
        writer::tell::<Seen, _>(&ctx, BTreeSet::from([1, 2]));
        assert_eq!(ctx.seen.into_inner(), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn it_accumulates_through_state() {
        let ctx = context();
        writer::tell::<Trail, _>(&ctx, "ab".into());
        writer::tell::<Trail, _>(&ctx, "cd".into());
        assert_eq!(ctx.trail.into_inner().unwrap(), "abcd");
    }

    #[test]
    fn it_pushes_items_onto_a_queue() {
        let ctx = context();
        writer::tell::<Events, _>(&ctx, vec![1, 2]);
        writer::tell::<Events, _>(&ctx, vec![3]);

        let drained: Vec<u32> = std::iter::from_fn(|| ctx.events.pop()).collect();
        assert_eq!(drained, vec![1, 2, 3]);
    }

    #[test]
    fn it_returns_the_value_paired_with_the_output() {
        let ctx = context();
        let answer = writer::writer::<Alias, _, _>(&ctx, (42, vec!["answered"]));
        assert_eq!(answer, 42);
        assert_eq!(ctx.log.into_inner(), vec!["answered"]);
    }

    #[test]
    fn it_resolves_generic_code_against_the_context() {
        fn greet<C: HasWriter<Log, Output = Vec<&'static str>>>(ctx: &C) {
            ctx.tell(vec!["hello"]);
            ctx.tell(vec!["world"]);
        }

        let ctx = context();
        greet(&ctx);
        assert_eq!(ctx.log.into_inner(), vec!["hello", "world"]);
    }
}
