//! Recoverable errors with a narrow declared type.
//!
//! Code that throws declares the error it can raise (`Error`), while the
//! context decides the unified fault type that travels through `Result`
//! (`Fault`). The two are connected by an injection/projection pair,
//! [`Inject<E>`], which must round-trip:
//!
//! ```text
//! Fault::project(Fault::inject(e)) == Ok(e)
//! ```
//!
//! `catch` at the narrow type projects a fault; a fault of another variant
//! falls through unchanged.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::marker::PhantomData;

use crate::{Provide, Rename};

/// A fault type that can carry the error `E`.
///
/// `inject` is total and `project(inject(e))` returns `Ok(e)`. Derive it for
/// an enum with `#[derive(Variants)]`.
pub trait Inject<E>: Sized {
    /// Wrap `error` into the fault type.
    fn inject(error: E) -> Self;

    /// Recover the error if this fault carries one, or give the fault back.
    fn project(self) -> Result<E, Self>;
}

impl<E> Inject<E> for Box<dyn StdError + Send + Sync>
where
    E: StdError + Send + Sync + 'static,
{
    fn inject(error: E) -> Self {
        Box::new(error)
    }

    fn project(self) -> Result<E, Self> {
        self.downcast::<E>().map(|error| *error)
    }
}

#[cfg(feature = "anyhow")]
impl<E> Inject<E> for anyhow::Error
where
    E: StdError + Send + Sync + 'static,
{
    fn inject(error: E) -> Self {
        anyhow::Error::new(error)
    }

    fn project(self) -> Result<E, Self> {
        self.downcast::<E>()
    }
}

/// The ability to raise the error tagged `Tag`.
pub trait HasThrow<Tag> {
    /// The error this capability raises.
    type Error;
    /// The context's unified error type.
    type Fault;

    /// Widen an error into the fault type.
    fn inject(error: Self::Error) -> Self::Fault;

    /// Abort the current computation with `error`.
    ///
    /// Use with `?` or as a tail expression:
    /// `return ctx.throw(NotFound(key))`.
    fn throw<T>(&self, error: Self::Error) -> Result<T, Self::Fault> {
        Err(<Self as HasThrow<Tag>>::inject(error))
    }
}

/// The ability to recover from the error tagged `Tag`.
pub trait HasCatch<Tag>: HasThrow<Tag> {
    /// Narrow a fault to this capability's error, or give it back.
    fn project(fault: Self::Fault) -> Result<Self::Error, Self::Fault>;

    /// Run `action`; if it fails with this capability's error, resume with
    /// `handler`. Any other fault propagates unchanged.
    fn catch<T>(
        &self,
        action: impl FnOnce() -> Result<T, Self::Fault>,
        handler: impl FnOnce(Self::Error) -> Result<T, Self::Fault>,
    ) -> Result<T, Self::Fault> {
        match action() {
            Ok(value) => Ok(value),
            Err(fault) => handler(<Self as HasCatch<Tag>>::project(fault)?),
        }
    }

    /// Like [`catch`](HasCatch::catch), but only for errors `select` maps to
    /// `Some`. Rejected errors are rethrown.
    fn catch_just<T, B>(
        &self,
        action: impl FnOnce() -> Result<T, Self::Fault>,
        select: impl FnOnce(&Self::Error) -> Option<B>,
        handler: impl FnOnce(B) -> Result<T, Self::Fault>,
    ) -> Result<T, Self::Fault> {
        match action() {
            Ok(value) => Ok(value),
            Err(fault) => {
                let error = <Self as HasCatch<Tag>>::project(fault)?;
                match select(&error) {
                    Some(selected) => handler(selected),
                    None => Err(<Self as HasThrow<Tag>>::inject(error)),
                }
            }
        }
    }

    /// Run `action` and surface this capability's error as a value.
    fn attempt<T>(
        &self,
        action: impl FnOnce() -> Result<T, Self::Fault>,
    ) -> Result<Result<T, Self::Error>, Self::Fault> {
        match action() {
            Ok(value) => Ok(Ok(value)),
            Err(fault) => <Self as HasCatch<Tag>>::project(fault).map(Err),
        }
    }
}

/// How a strategy relates a narrow error to a context's fault type.
pub trait ErrorStrategy<C> {
    /// The narrow error.
    type Error;
    /// The context's fault type.
    type Fault;

    /// Widen an error into the fault type.
    fn inject(error: Self::Error) -> Self::Fault;

    /// Narrow a fault, or give it back.
    fn project(fault: Self::Fault) -> Result<Self::Error, Self::Fault>;
}

impl<C, Tag> HasThrow<Tag> for C
where
    C: Provide<Tag>,
    <C as Provide<Tag>>::Via: ErrorStrategy<C>,
{
    type Error = <<C as Provide<Tag>>::Via as ErrorStrategy<C>>::Error;
    type Fault = <<C as Provide<Tag>>::Via as ErrorStrategy<C>>::Fault;

    #[inline]
    fn inject(error: Self::Error) -> Self::Fault {
        <<C as Provide<Tag>>::Via as ErrorStrategy<C>>::inject(error)
    }
}

impl<C, Tag> HasCatch<Tag> for C
where
    C: Provide<Tag>,
    <C as Provide<Tag>>::Via: ErrorStrategy<C>,
{
    #[inline]
    fn project(fault: Self::Fault) -> Result<Self::Error, Self::Fault> {
        <<C as Provide<Tag>>::Via as ErrorStrategy<C>>::project(fault)
    }
}

/// The fault type `F` itself. Catching it catches every fault.
pub struct Direct<F>(Infallible, PhantomData<fn() -> F>);

impl<C, F> ErrorStrategy<C> for Direct<F> {
    type Error = F;
    type Fault = F;

    #[inline]
    fn inject(error: F) -> F {
        error
    }

    #[inline]
    fn project(fault: F) -> Result<F, F> {
        Ok(fault)
    }
}

/// The error `E` as one variant of the error of the strategy `Of`.
///
/// Nests: `Variant<Timeout, Variant<Network, Direct<Fault>>>` throws a
/// `Timeout` as `Fault::Network(Network::Timeout(..))` and catches exactly
/// those faults.
pub struct Variant<E, Of>(Infallible, PhantomData<fn() -> (E, Of)>);

impl<C, E, Of> ErrorStrategy<C> for Variant<E, Of>
where
    Of: ErrorStrategy<C>,
    Of::Error: Inject<E>,
{
    type Error = E;
    type Fault = Of::Fault;

    #[inline]
    fn inject(error: E) -> Self::Fault {
        Of::inject(<Of::Error as Inject<E>>::inject(error))
    }

    fn project(fault: Self::Fault) -> Result<E, Self::Fault> {
        let wide = Of::project(fault)?;
        <Of::Error as Inject<E>>::project(wide).map_err(Of::inject)
    }
}

impl<C, Tag> ErrorStrategy<C> for Rename<Tag>
where
    C: HasCatch<Tag>,
{
    type Error = <C as HasThrow<Tag>>::Error;
    type Fault = <C as HasThrow<Tag>>::Fault;

    #[inline]
    fn inject(error: Self::Error) -> Self::Fault {
        <C as HasThrow<Tag>>::inject(error)
    }

    #[inline]
    fn project(fault: Self::Fault) -> Result<Self::Error, Self::Fault> {
        <C as HasCatch<Tag>>::project(fault)
    }
}

/// Abort with the error tagged `Tag`.
pub fn throw<Tag, C, T>(ctx: &C, error: C::Error) -> Result<T, C::Fault>
where
    C: HasThrow<Tag>,
{
    ctx.throw(error)
}

/// Run `action`, recovering from the error tagged `Tag` with `handler`.
pub fn catch<Tag, C, T>(
    ctx: &C,
    action: impl FnOnce() -> Result<T, C::Fault>,
    handler: impl FnOnce(C::Error) -> Result<T, C::Fault>,
) -> Result<T, C::Fault>
where
    C: HasCatch<Tag>,
{
    ctx.catch(action, handler)
}

/// Run `action`, recovering with `handler` from the errors tagged `Tag`
/// that `select` accepts.
pub fn catch_just<Tag, C, T, B>(
    ctx: &C,
    action: impl FnOnce() -> Result<T, C::Fault>,
    select: impl FnOnce(&C::Error) -> Option<B>,
    handler: impl FnOnce(B) -> Result<T, C::Fault>,
) -> Result<T, C::Fault>
where
    C: HasCatch<Tag>,
{
    ctx.catch_just(action, select, handler)
}

/// Run `action`, surfacing the error tagged `Tag` as a value.
pub fn attempt<Tag, C, T>(
    ctx: &C,
    action: impl FnOnce() -> Result<T, C::Fault>,
) -> Result<Result<T, C::Error>, C::Fault>
where
    C: HasCatch<Tag>,
{
    ctx.attempt(action)
}
