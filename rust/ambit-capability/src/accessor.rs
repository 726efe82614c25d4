//! Accessor types: the zero-sized building blocks of capability chains.
//!
//! Every type here is uninhabited. They are only ever named inside
//! [`Provide::Via`](crate::Provide), and the capability modules give them
//! meaning through strategy trait impls. Like
//! [`Infallible`](std::convert::Infallible), a strategy can never be
//! constructed, which keeps it out of every runtime representation.

use std::convert::Infallible;
use std::marker::PhantomData;

/// Projection of a record onto one of its fields, addressed by a name tag.
///
/// Implemented by `#[derive(Fields)]`, which generates one tag type per
/// named field. A field that does not exist has no impl, so referring to it
/// is a compile error.
pub trait HasField<Name> {
    /// Type of the field.
    type Type;

    /// Borrow the field.
    fn field(&self) -> &Self::Type;

    /// Mutably borrow the field.
    fn field_mut(&mut self) -> &mut Self::Type;
}

/// Projection of a record onto its `N`th field (zero-based, in declaration
/// order).
///
/// Implemented by `#[derive(Fields)]` for named and tuple structs alike.
/// Positions beyond the last field have no impl, so selecting one is a
/// compile error.
pub trait HasPosition<const N: usize> {
    /// Type of the field.
    type Type;

    /// Borrow the field.
    fn position(&self) -> &Self::Type;

    /// Mutably borrow the field.
    fn position_mut(&mut self) -> &mut Self::Type;
}

/// A compile-time constant that can back a reader.
pub trait Literal {
    /// Type of the constant.
    type Type;
    /// The constant.
    const VALUE: Self::Type;
}

/// The execution context itself. The root of every accessor chain.
pub struct Whole(Infallible);

/// The field tagged `Name` of the record `Of` resolves to.
///
/// Over a reader (`Of = Whole` by default) this reads the field. Over a
/// state strategy whose state is a `Clone` record it scopes the state to
/// that field: updates replace the record with a copy carrying the new
/// field value.
pub struct Field<Name, Of = Whole>(Infallible, PhantomData<fn() -> (Name, Of)>);

/// The `N`th field of the record `Of` resolves to.
///
/// Use it when several fields share a type and nothing else tells them
/// apart. Behaves like [`Field`] otherwise.
pub struct Pos<const N: usize, Of = Whole>(Infallible, PhantomData<fn() -> Of>);

/// The capability already resolved under `Tag`, re-exposed under a new one.
///
/// Works for every capability kind `Tag` supports. Two tags renamed onto the
/// same source share its storage.
pub struct Rename<Tag>(Infallible, PhantomData<fn() -> Tag>);

/// A constant reader value given by a [`Literal`].
pub struct Const<K>(Infallible, PhantomData<fn() -> K>);

/// The value `Of` resolves to, converted into `T` with [`From`].
///
/// Used to widen (or otherwise adapt) the environment type of another
/// reader. The conversion runs on every read.
pub struct Convert<T, Of = Whole>(Infallible, PhantomData<fn() -> (T, Of)>);
