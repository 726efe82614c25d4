//! Mutable state addressed by tag.
//!
//! The dominant way to back [`HasState`] is [`Ref<Of>`]: take a reader that
//! yields a mutable cell and implement `get`/`put`/`state` with the cell's
//! primitives. The atomicity of [`HasState::state`] is that of the cell
//! (see [`Mutable`]).

use std::convert::Infallible;
use std::marker::PhantomData;

use crate::{Field, HasField, HasPosition, Mutable, Pos, Provide, ReaderStrategy, Rename};

/// Get/put access to the state tagged `Tag`.
///
/// Within a single thread of the computation, operations are sequentially
/// consistent: a `get` after `put(v)` returns `v`.
pub trait HasState<Tag> {
    /// The state.
    type State;

    /// Apply `f` to a borrow of the current state.
    fn gets<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R;

    /// Replace the state.
    fn put(&self, state: Self::State);

    /// Read-modify-write: replace the state with the second component of
    /// `f`'s result and return the first.
    ///
    /// `f` may be called more than once when the backing cell is lock-free
    /// and contended, so it should not have side effects.
    fn state<R>(&self, f: impl FnMut(&Self::State) -> (R, Self::State)) -> R;

    /// Retrieve a copy of the current state.
    fn get(&self) -> Self::State
    where
        Self::State: Clone,
    {
        <Self as HasState<Tag>>::gets(self, <Self::State as Clone>::clone)
    }

    /// Replace the state with `f` applied to it.
    fn modify(&self, mut f: impl FnMut(&Self::State) -> Self::State) {
        <Self as HasState<Tag>>::state(self, |state| ((), f(state)))
    }
}

/// How a strategy reaches mutable state from the context `C`.
pub trait StateStrategy<C> {
    /// The state.
    type State;

    /// Apply `f` to a borrow of the current state.
    fn gets<R>(ctx: &C, f: impl FnOnce(&Self::State) -> R) -> R;

    /// Replace the state.
    fn put(ctx: &C, state: Self::State);

    /// Read-modify-write the state.
    fn state<R>(ctx: &C, f: impl FnMut(&Self::State) -> (R, Self::State)) -> R;
}

impl<C, Tag> HasState<Tag> for C
where
    C: Provide<Tag>,
    <C as Provide<Tag>>::Via: StateStrategy<C>,
{
    type State = <<C as Provide<Tag>>::Via as StateStrategy<C>>::State;

    #[inline]
    fn gets<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R {
        <<C as Provide<Tag>>::Via as StateStrategy<C>>::gets(self, f)
    }

    #[inline]
    fn put(&self, state: Self::State) {
        <<C as Provide<Tag>>::Via as StateStrategy<C>>::put(self, state)
    }

    #[inline]
    fn state<R>(&self, f: impl FnMut(&Self::State) -> (R, Self::State)) -> R {
        <<C as Provide<Tag>>::Via as StateStrategy<C>>::state(self, f)
    }
}

/// State kept in the mutable cell that the reader strategy `Of` yields.
///
/// Also a reader of the cell's current value.
pub struct Ref<Of>(Infallible, PhantomData<fn() -> Of>);

impl<C, Of> ReaderStrategy<C> for Ref<Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: Mutable,
{
    type Target = <Of::Target as Mutable>::Value;

    #[inline]
    fn reader<R>(ctx: &C, f: impl FnOnce(&Self::Target) -> R) -> R {
        Of::reader(ctx, |cell| cell.view(f))
    }
}

impl<C, Of> StateStrategy<C> for Ref<Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: Mutable,
{
    type State = <Of::Target as Mutable>::Value;

    #[inline]
    fn gets<R>(ctx: &C, f: impl FnOnce(&Self::State) -> R) -> R {
        Of::reader(ctx, |cell| cell.view(f))
    }

    #[inline]
    fn put(ctx: &C, state: Self::State) {
        Of::reader(ctx, |cell| Mutable::store(cell, state))
    }

    #[inline]
    fn state<R>(ctx: &C, f: impl FnMut(&Self::State) -> (R, Self::State)) -> R {
        Of::reader(ctx, |cell| Mutable::update(cell, f))
    }
}

/// Field-scoped state over whole-record state. Each update writes back a
/// copy of the record.
impl<C, Name, Of> StateStrategy<C> for Field<Name, Of>
where
    Of: StateStrategy<C>,
    Of::State: HasField<Name> + Clone,
    <Of::State as HasField<Name>>::Type: Clone,
{
    type State = <Of::State as HasField<Name>>::Type;

    fn gets<R>(ctx: &C, f: impl FnOnce(&Self::State) -> R) -> R {
        Of::gets(ctx, |record| f(HasField::<Name>::field(record)))
    }

    fn put(ctx: &C, state: Self::State) {
        Of::state(ctx, |record| {
            let mut next = record.clone();
            *HasField::<Name>::field_mut(&mut next) = state.clone();
            ((), next)
        })
    }

    fn state<R>(ctx: &C, mut f: impl FnMut(&Self::State) -> (R, Self::State)) -> R {
        Of::state(ctx, |record| {
            let (out, value) = f(HasField::<Name>::field(record));
            let mut next = record.clone();
            *HasField::<Name>::field_mut(&mut next) = value;
            (out, next)
        })
    }
}

impl<C, const N: usize, Of> StateStrategy<C> for Pos<N, Of>
where
    Of: StateStrategy<C>,
    Of::State: HasPosition<N> + Clone,
    <Of::State as HasPosition<N>>::Type: Clone,
{
    type State = <Of::State as HasPosition<N>>::Type;

    fn gets<R>(ctx: &C, f: impl FnOnce(&Self::State) -> R) -> R {
        Of::gets(ctx, |record| f(HasPosition::<N>::position(record)))
    }

    fn put(ctx: &C, state: Self::State) {
        Of::state(ctx, |record| {
            let mut next = record.clone();
            *HasPosition::<N>::position_mut(&mut next) = state.clone();
            ((), next)
        })
    }

    fn state<R>(ctx: &C, mut f: impl FnMut(&Self::State) -> (R, Self::State)) -> R {
        Of::state(ctx, |record| {
            let (out, value) = f(HasPosition::<N>::position(record));
            let mut next = record.clone();
            *HasPosition::<N>::position_mut(&mut next) = value;
            (out, next)
        })
    }
}

impl<C, Tag> StateStrategy<C> for Rename<Tag>
where
    C: HasState<Tag>,
{
    type State = <C as HasState<Tag>>::State;

    #[inline]
    fn gets<R>(ctx: &C, f: impl FnOnce(&Self::State) -> R) -> R {
        <C as HasState<Tag>>::gets(ctx, f)
    }

    #[inline]
    fn put(ctx: &C, state: Self::State) {
        <C as HasState<Tag>>::put(ctx, state)
    }

    #[inline]
    fn state<R>(ctx: &C, f: impl FnMut(&Self::State) -> (R, Self::State)) -> R {
        <C as HasState<Tag>>::state(ctx, f)
    }
}

/// Retrieve a copy of the state tagged `Tag`.
pub fn get<Tag, C>(ctx: &C) -> C::State
where
    C: HasState<Tag>,
    C::State: Clone,
{
    ctx.get()
}

/// Apply `f` to the state tagged `Tag`.
pub fn gets<Tag, C, R>(ctx: &C, f: impl FnOnce(&C::State) -> R) -> R
where
    C: HasState<Tag>,
{
    ctx.gets(f)
}

/// Replace the state tagged `Tag`.
pub fn put<Tag, C>(ctx: &C, state: C::State)
where
    C: HasState<Tag>,
{
    ctx.put(state)
}

/// Read-modify-write the state tagged `Tag`.
pub fn state<Tag, C, R>(ctx: &C, f: impl FnMut(&C::State) -> (R, C::State)) -> R
where
    C: HasState<Tag>,
{
    ctx.state(f)
}

/// Replace the state tagged `Tag` with `f` applied to it.
pub fn modify<Tag, C>(ctx: &C, f: impl FnMut(&C::State) -> C::State)
where
    C: HasState<Tag>,
{
    ctx.modify(f)
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::cell::{Cell, RefCell};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicI64;

    tag!(Count, Other, Label, Config, Retries, Verbose, Alias);

    #[derive(Debug, Clone, PartialEq, Fields)]
    struct Settings {
        retries: u8,
        verbose: bool,
    }

    #[derive(Fields)]
    struct Context {
        count: AtomicI64,
        other: Cell<i64>,
        label: RefCell<String>,
        settings: Mutex<Settings>,
    }

    provide!(Context {
        Count => Ref<Field<context::count>>,
        Other => Ref<Field<context::other>>,
        Label => Ref<Field<context::label>>,
        Config => Ref<Field<context::settings>>,
        Retries => Field<settings::retries, Ref<Field<context::settings>>>,
        Verbose => Pos<1, Rename<Config>>,
        Alias => Rename<Count>,
    });

    fn context() -> Context {
        Context {
            count: AtomicI64::new(0),
            other: Cell::new(100),
            label: RefCell::new("initial".into()),
            settings: Mutex::new(Settings {
                retries: 3,
                verbose: false,
            }),
        }
    }

    #[test]
    fn it_returns_what_was_put() {
        let ctx = context();
        state::put::<Count, _>(&ctx, 41);
        assert_eq!(state::get::<Count, _>(&ctx), 41);

        state::put::<Label, _>(&ctx, "updated".into());
        assert_eq!(state::get::<Label, _>(&ctx), "updated");
    }

    #[test]
    fn it_returns_the_auxiliary_result_of_state() {
        let ctx = context();
        let first = state::state::<Count, _, _>(&ctx, |old| (*old, old + 1));
        let second = state::state::<Count, _, _>(&ctx, |old| (*old, old + 1));

        assert_eq!((first, second), (0, 1));
        assert_eq!(state::get::<Count, _>(&ctx), 2);
    }

    #[test]
    fn it_keeps_tags_independent() {
        let ctx = context();
        state::put::<Count, _>(&ctx, 7);
        assert_eq!(state::get::<Other, _>(&ctx), 100);

        state::modify::<Other, _>(&ctx, |n| n * 2);
        assert_eq!(state::get::<Count, _>(&ctx), 7);
        assert_eq!(state::get::<Other, _>(&ctx), 200);
    }

    #[test]
    fn it_shares_storage_through_a_renamed_tag() {
        let ctx = context();
        state::put::<Alias, _>(&ctx, 9);
        assert_eq!(state::get::<Count, _>(&ctx), 9);
    }

    #[test]
    fn it_scopes_state_to_a_field_of_a_record() {
        let ctx = context();
        state::modify::<Retries, _>(&ctx, |retries| retries + 2);
        state::put::<Verbose, _>(&ctx, true);

        assert_eq!(
            state::get::<Config, _>(&ctx),
            Settings {
                retries: 5,
                verbose: true
            }
        );
        assert_eq!(state::gets::<Retries, _, _>(&ctx, |retries| *retries), 5);
    }

    #[test]
    fn it_reads_the_current_cell_value() {
        let ctx = context();
        state::put::<Count, _>(&ctx, 12);
        assert_eq!(reader::ask::<Count, _>(&ctx), 12);
    }

    #[test]
    fn it_resolves_generic_code_against_the_context() {
        fn bump<C: HasState<Count, State = i64>>(ctx: &C) -> i64 {
            ctx.modify(|n| n + 10);
            ctx.get()
        }

        let ctx = context();
        assert_eq!(bump(&ctx), 10);
        assert_eq!(bump(&ctx), 20);
    }
}
