//! Tagged capabilities resolved at compile time.
//!
//! This crate lets a function declare the effects it needs (read access to
//! an environment, mutable state, an append-only accumulator, a recoverable
//! error, a stream of values) as trait bounds, without saying how any of them
//! is implemented. Every capability is addressed by a **tag**, a type used
//! purely as a label, so several instances of the same kind can coexist.
//!
//! # Quick Example
//!
//! ```rust
//! use ambit_capability::{Field, Fields, HasReader, HasState, Ref, provide, tag};
//! use std::sync::atomic::AtomicBool;
//!
//! tag!(Foo, Bar);
//!
//! #[derive(Fields)]
//! struct Context {
//!     foo: i32,
//!     bar: AtomicBool,
//! }
//!
//! // Foo reads the `foo` field; Bar is state kept in the `bar` cell.
//! provide!(Context {
//!     Foo => Field<context::foo>,
//!     Bar => Ref<Field<context::bar>>,
//! });
//!
//! fn store_parity<C>(ctx: &C)
//! where
//!     C: HasReader<Foo, Value = i32> + HasState<Bar, State = bool>,
//! {
//!     let even = ctx.reader(|foo| foo % 2 == 0);
//!     ctx.put(even);
//! }
//!
//! let ctx = Context { foo: 2, bar: AtomicBool::new(false) };
//! store_parity(&ctx);
//! assert!(ctx.bar.into_inner());
//! ```
//!
//! # Core Concepts
//!
//! ## Capabilities
//!
//! | Trait | Operations | Payload |
//! |-------|------------|---------|
//! | [`HasReader<Tag>`] | `ask`, `reader` | `Value` |
//! | [`HasState<Tag>`] | `get`, `put`, `state`, `gets`, `modify` | `State` |
//! | [`HasWriter<Tag>`] | `tell`, `writer` | `Output: Monoid` |
//! | [`HasThrow<Tag>`] / [`HasCatch<Tag>`] | `throw` / `catch`, `catch_just`, `attempt` | `Error`, `Fault` |
//! | [`HasStream<Tag>`] | `yield`, `yield_all` | `Item` |
//!
//! When a context satisfies several capabilities of the same kind, method
//! syntax becomes ambiguous; each capability module offers free functions
//! taking the tag as the first type argument, e.g.
//! `reader::ask::<Foo, _>(&ctx)`.
//!
//! ## Wiring
//!
//! A context implements [`Provide<Tag>`] to name the strategy backing `Tag`.
//! Strategies are uninhabited types that only exist at the type level, so a
//! chain such as `Ref<Field<context::bar>>` costs nothing at runtime: the
//! compiler inlines it down to a field access and an atomic operation.
//!
//! ```text
//! Provide<Bar>::Via = Ref<Field<context::bar, Whole>>
//!                     │   │                    └── the context itself
//!                     │   └── its `bar` field (an AtomicBool)
//!                     └── state kept in that cell
//! ```
//!
//! If no chain exists, or two candidates are equally valid, the program does
//! not compile. Nothing is decided at runtime.
//!
//! ## Strategies
//!
//! | Strategy | Derives | From |
//! |----------|---------|------|
//! | [`Whole`] | reader | the context |
//! | [`Field<Name, Of>`] | reader, state | a named field of `Of` |
//! | [`Pos<N, Of>`] | reader, state | the `N`th field of `Of` |
//! | [`Rename<Tag>`] | every kind | the capability under another tag |
//! | [`Const<K>`] | reader | a compile-time constant |
//! | [`Convert<T, Of>`] | reader | `Of` converted with `From` |
//! | [`Ref<Of>`] | reader, state | a [`Mutable`] cell reached by `Of` |
//! | [`Appender<Of>`] | writer | a [`Sink`] reached by `Of` |
//! | [`WriterLog<Of>`] | writer | a state strategy (discouraged) |
//! | [`Direct<F>`] | error | the fault type itself |
//! | [`Variant<E, Of>`] | error | one variant of `Of`'s error |
//! | [`Channel<Of>`] | stream | an [`Emitter`] reached by `Of` |
//! | [`StreamLog<Of>`] | stream | a writer strategy collecting a `Vec` |
//!
//! ## Concurrency
//!
//! Operations run synchronously on the calling thread. Whether `state` and
//! `tell` stay atomic under contention is decided by the backing primitive;
//! see [`Mutable`] and [`Sink`] for what each implementation guarantees.
//!
//! # Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `tokio` | [`Emitter`] for `tokio::sync::mpsc::UnboundedSender` |
//! | `anyhow` | [`Inject`] for `anyhow::Error`, so it can serve as a fault type |
//!
//! Both are off by default. The tests that cover them only build with the
//! feature enabled, so run the full suite with `cargo test --all-features`.

#![warn(missing_docs)]

extern crate self as ambit_capability;

mod tag;
pub use tag::*;

mod accessor;
pub use accessor::*;

mod cell;
pub use cell::*;

mod monoid;
pub use monoid::*;

pub mod reader;
pub use reader::{HasReader, ReaderStrategy};

pub mod state;
pub use state::{HasState, Ref, StateStrategy};

pub mod writer;
pub use writer::{Appender, HasWriter, Sink, WriterLog, WriterStrategy};

pub mod error;
pub use error::{Direct, ErrorStrategy, HasCatch, HasThrow, Inject, Variant};

pub mod stream;
pub use stream::{Channel, Emitter, HasStream, StreamLog, StreamStrategy};

/// Derive macros for record fields and error variants.
pub use ambit_macros::{Fields, Variants};
