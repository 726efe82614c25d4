//! Read-only access to an environment value.
//!
//! [`HasReader<Tag>`] never mutates the context. Anything that is
//! conceptually "a value available in the environment" can back it: a
//! field, a constant, a conversion of another reader, or the current
//! content of a mutable cell (see [`Ref`](crate::Ref)).

use crate::{Const, Convert, Field, HasField, HasPosition, Literal, Pos, Provide, Rename, Whole};

/// Read access to the environment value tagged `Tag`.
pub trait HasReader<Tag> {
    /// The environment value.
    type Value;

    /// Apply `f` to a borrow of the current value.
    fn reader<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R;

    /// Retrieve a copy of the current value.
    fn ask(&self) -> Self::Value
    where
        Self::Value: Clone,
    {
        <Self as HasReader<Tag>>::reader(self, <Self::Value as Clone>::clone)
    }
}

/// How a strategy reaches a readable value from the context `C`.
///
/// Reader strategies compose: [`Field<Name, Of>`] reads a field of whatever
/// `Of` reads, so chains can descend through nested records.
pub trait ReaderStrategy<C> {
    /// The value this strategy reads.
    type Target;

    /// Apply `f` to a borrow of the value.
    fn reader<R>(ctx: &C, f: impl FnOnce(&Self::Target) -> R) -> R;
}

impl<C, Tag> HasReader<Tag> for C
where
    C: Provide<Tag>,
    <C as Provide<Tag>>::Via: ReaderStrategy<C>,
{
    type Value = <<C as Provide<Tag>>::Via as ReaderStrategy<C>>::Target;

    #[inline]
    fn reader<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R {
        <<C as Provide<Tag>>::Via as ReaderStrategy<C>>::reader(self, f)
    }
}

impl<C> ReaderStrategy<C> for Whole {
    type Target = C;

    #[inline]
    fn reader<R>(ctx: &C, f: impl FnOnce(&C) -> R) -> R {
        f(ctx)
    }
}

impl<C, Name, Of> ReaderStrategy<C> for Field<Name, Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: HasField<Name>,
{
    type Target = <Of::Target as HasField<Name>>::Type;

    #[inline]
    fn reader<R>(ctx: &C, f: impl FnOnce(&Self::Target) -> R) -> R {
        Of::reader(ctx, |record| f(HasField::<Name>::field(record)))
    }
}

impl<C, const N: usize, Of> ReaderStrategy<C> for Pos<N, Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: HasPosition<N>,
{
    type Target = <Of::Target as HasPosition<N>>::Type;

    #[inline]
    fn reader<R>(ctx: &C, f: impl FnOnce(&Self::Target) -> R) -> R {
        Of::reader(ctx, |record| f(HasPosition::<N>::position(record)))
    }
}

impl<C, Tag> ReaderStrategy<C> for Rename<Tag>
where
    C: HasReader<Tag>,
{
    type Target = <C as HasReader<Tag>>::Value;

    #[inline]
    fn reader<R>(ctx: &C, f: impl FnOnce(&Self::Target) -> R) -> R {
        <C as HasReader<Tag>>::reader(ctx, f)
    }
}

impl<C, K> ReaderStrategy<C> for Const<K>
where
    K: Literal,
{
    type Target = K::Type;

    #[inline]
    fn reader<R>(_ctx: &C, f: impl FnOnce(&K::Type) -> R) -> R {
        f(&K::VALUE)
    }
}

impl<C, T, Of> ReaderStrategy<C> for Convert<T, Of>
where
    Of: ReaderStrategy<C>,
    Of::Target: Clone,
    T: From<Of::Target>,
{
    type Target = T;

    #[inline]
    fn reader<R>(ctx: &C, f: impl FnOnce(&T) -> R) -> R {
        Of::reader(ctx, |value| f(&T::from(value.clone())))
    }
}

/// Retrieve a copy of the value tagged `Tag`.
pub fn ask<Tag, C>(ctx: &C) -> C::Value
where
    C: HasReader<Tag>,
    C::Value: Clone,
{
    ctx.ask()
}

/// Apply `f` to the value tagged `Tag`.
pub fn reader<Tag, C, R>(ctx: &C, f: impl FnOnce(&C::Value) -> R) -> R
where
    C: HasReader<Tag>,
{
    ctx.reader(f)
}

#[cfg(test)]
mod tests {
    use crate::*;

    tag!(Foo, Name, Port, Wide, Limit, Alias);

    #[derive(Fields)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Fields)]
    struct Context {
        foo: i32,
        server: Server,
    }

    enum Ten {}

    impl Literal for Ten {
        type Type = usize;
        const VALUE: usize = 10;
    }

    provide!(Context {
        Foo => Field<context::foo>,
        Name => Field<server::host, Field<context::server>>,
        Port => Pos<1, Field<context::server>>,
        Wide => Convert<i64, Field<context::foo>>,
        Limit => Const<Ten>,
        Alias => Rename<Foo>,
    });

    fn context() -> Context {
        Context {
            foo: 7,
            server: Server {
                host: "localhost".into(),
                port: 8080,
            },
        }
    }

    #[test]
    fn it_reads_a_field() {
        let ctx = context();
        assert_eq!(reader::ask::<Foo, _>(&ctx), 7);
    }

    #[test]
    fn it_applies_a_projection_to_the_value() {
        let ctx = context();
        let len = reader::reader::<Name, _, _>(&ctx, |host| host.len());
        assert_eq!(len, "localhost".len());
    }

    #[test]
    fn it_reads_nested_fields_by_name_and_position() {
        let ctx = context();
        assert_eq!(reader::ask::<Name, _>(&ctx), "localhost");
        assert_eq!(reader::ask::<Port, _>(&ctx), 8080);
    }

    #[test]
    fn it_widens_another_reader() {
        let ctx = context();
        let wide: i64 = reader::ask::<Wide, _>(&ctx);
        assert_eq!(wide, 7i64);
    }

    #[test]
    fn it_reads_a_constant() {
        let ctx = context();
        assert_eq!(reader::ask::<Limit, _>(&ctx), 10);
    }

    #[test]
    fn it_reads_through_a_renamed_tag() {
        let ctx = context();
        assert_eq!(reader::ask::<Alias, _>(&ctx), reader::ask::<Foo, _>(&ctx));
    }

    #[test]
    fn it_resolves_generic_code_against_the_context() {
        fn doubled<C: HasReader<Foo, Value = i32>>(ctx: &C) -> i32 {
            ctx.reader(|foo| foo * 2)
        }

        assert_eq!(doubled(&context()), 14);
    }

    #[test]
    fn it_does_not_mutate_the_context() {
        let ctx = context();
        let _ = reader::ask::<Name, _>(&ctx);
        let _ = reader::ask::<Name, _>(&ctx);
        assert_eq!(ctx.server.host, "localhost");
        assert_eq!(ctx.foo, 7);
    }

    struct Manual(u8);

    impl HasReader<Foo> for Manual {
        type Value = u8;

        fn reader<R>(&self, f: impl FnOnce(&u8) -> R) -> R {
            f(&self.0)
        }
    }

    #[test]
    fn it_accepts_hand_written_capabilities() {
        assert_eq!(reader::ask::<Foo, _>(&Manual(3)), 3);
    }
}
