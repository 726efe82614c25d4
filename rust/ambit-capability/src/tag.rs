/// Declares which strategy backs the capability tagged `Tag`.
///
/// A context implements `Provide<Tag>` once per tag. The strategy decides
/// which capability kinds the tag supports: `Field<..>` yields a reader,
/// `Ref<..>` yields a reader and state, `Variant<..>` yields throw and catch,
/// and so on. The capability traits are then implemented for the context by
/// blanket impls, so the declaration is all a context has to write.
///
/// ```
/// use ambit_capability::{Field, Fields, Provide, reader, tag};
///
/// tag!(Name);
///
/// #[derive(Fields)]
/// struct Config {
///     name: String,
/// }
///
/// impl Provide<Name> for Config {
///     type Via = Field<config::name>;
/// }
///
/// let config = Config { name: "ambit".into() };
/// assert_eq!(reader::ask::<Name, _>(&config), "ambit");
/// ```
///
/// Contexts that need something no strategy offers can implement the
/// capability traits directly instead.
pub trait Provide<Tag> {
    /// The strategy (accessor chain) backing `Tag`.
    type Via;
}

/// Declares tag types.
///
/// Tags are uninhabited enums: they can be named in types but never
/// constructed, so they leave no trace at runtime. A library that wants
/// its tags to stay distinct from everybody else's simply keeps them
/// private or namespaced in a module.
///
/// ```
/// ambit_capability::tag! {
///     /// Number of retries left.
///     pub Retries,
///     Verbose,
/// }
/// ```
#[macro_export]
macro_rules! tag {
    ($($(#[$meta:meta])* $vis:vis $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            $vis enum $name {}
        )+
    };
}

/// Implements [`Provide`] for several tags of one context at once.
///
/// ```
/// use ambit_capability::{Const, Field, Fields, HasReader, Literal, provide, reader, tag};
///
/// tag!(Port, Host, Retries);
///
/// enum Three {}
/// impl Literal for Three {
///     type Type = u8;
///     const VALUE: u8 = 3;
/// }
///
/// #[derive(Fields)]
/// struct Settings {
///     host: String,
///     port: u16,
/// }
///
/// provide!(Settings {
///     Host => Field<settings::host>,
///     Port => Field<settings::port>,
///     Retries => Const<Three>,
/// });
///
/// let settings = Settings { host: "localhost".into(), port: 8080 };
/// assert_eq!(reader::ask::<Port, _>(&settings), 8080);
/// assert_eq!(reader::ask::<Retries, _>(&settings), 3);
/// ```
///
/// Generic contexts write their [`Provide`] impls by hand.
#[macro_export]
macro_rules! provide {
    ($context:ty { $($tag:ty => $via:ty),+ $(,)? }) => {
        $(
            impl $crate::Provide<$tag> for $context {
                type Via = $via;
            }
        )+
    };
}
