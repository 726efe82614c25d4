#![warn(missing_docs)]

//! Procedural macros for the ambit project.
//!
//! This crate generates the structural projections that capability accessors
//! are built on: field and position projections for records, and
//! injection/projection pairs for error enums. The macros are re-exported
//! through `ambit_capability`, which is where the traits they implement live.
//!
//! Procedural macros must be defined in their own crate, which is why these
//! live here rather than next to the traits.

use proc_macro::TokenStream;

mod fields;
mod variants;

/// Derive `HasField` and `HasPosition` projections for a struct.
///
/// For every named field a tag type with the field's name is generated in a
/// module named after the struct in `snake_case`, and `HasField<module::name>`
/// is implemented. For every field, named or not, `HasPosition<N>` is
/// implemented where `N` is the zero-based declaration index.
///
/// ```rust,ignore
/// #[derive(ambit_capability::Fields)]
/// struct Context {
///     foo: i32,
///     bar: std::sync::atomic::AtomicBool,
/// }
///
/// // Generates:
/// //   mod context { pub enum foo {} pub enum bar {} }
/// //   impl HasField<context::foo> for Context { type Type = i32; ... }
/// //   impl HasField<context::bar> for Context { type Type = AtomicBool; ... }
/// //   impl HasPosition<0> for Context { type Type = i32; ... }
/// //   impl HasPosition<1> for Context { type Type = AtomicBool; ... }
/// ```
///
/// The module name can be overridden with `#[fields(module = name)]`. A
/// snake_case name that is a keyword becomes a raw identifier (`struct Ref`
/// gets `mod r#ref`); `crate`, `self` and `super` require the override.
#[proc_macro_derive(Fields, attributes(fields))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    fields::generate(input)
}

/// Derive `Inject<Payload>` for every single-field tuple variant of an enum.
///
/// `inject` wraps the payload in its variant and `project` unwraps it,
/// handing any other variant back unchanged. Variants annotated with
/// `#[variant(skip)]` are excluded. Two variants carrying the same payload
/// type produce conflicting impls and therefore a compile error, so a
/// payload always projects out of exactly one variant.
///
/// ```rust,ignore
/// #[derive(Debug, ambit_capability::Variants)]
/// enum Fault {
///     Parse(ParseError),
///     Io(std::io::Error),
///     #[variant(skip)]
///     Other(String),
/// }
/// ```
#[proc_macro_derive(Variants, attributes(variant))]
pub fn derive_variants(input: TokenStream) -> TokenStream {
    variants::generate(input)
}
