//! Sable Debug - Type and Debug-Metadata Binding Layer
//!
//! This crate maps a compiler's source-level types onto the code-generation
//! engine's structurally-interned native types and onto the separate,
//! possibly-cyclic debug-metadata graph, and keeps the two associated until
//! the graph is fully self-consistent.
//!
//! The moving parts:
//!
//! - [`Context`] — top-level owner. One wrapper per (context, handle) pair,
//!   guaranteed by the interning caches; `Rc` pointer equality is identity.
//! - [`TypeRef`] / [`DiNode`] — kind-tagged wrappers built by factories that
//!   are total over the engine's discriminant spaces.
//! - [`TupleView`] — read-only typed projection over optional operand
//!   tuples; an absent tuple is a valid empty collection.
//! - [`DebugType`] — the native/debug pairing. The native side is
//!   write-once; the debug side is replaceable only while it holds a
//!   temporary placeholder, and each replacement rewires all graph uses of
//!   the old node.
//! - [`DebugStructType`] / [`DebugUnionType`] / [`DebugArrayType`] — the
//!   composite builders with the forward-declaration protocol: placeholder
//!   first, `set_body` (or `resolve_temporary`) later, resolution via
//!   replace-all-uses-with.
//! - [`DiBuilder`] / [`Module`] — the builder session with its single
//!   idempotent [`DiBuilder::finish`], after which no temporary may be
//!   created.
//!
//! Absent scope, file, or name information is a legitimate state everywhere
//! in this crate, represented by `Option`s and empty strings; errors are
//! reserved for contract violations.

mod array;
mod basic;
mod binding;
mod builder;
mod composite;
mod config;
mod context;
mod error;
mod flags;
mod member;
mod module;
mod native;
mod node;
mod tuple;
mod write_once;

pub use array::DebugArrayType;
pub use basic::{DebugBasicType, DebugFunctionType, DebugPointerType};
pub use binding::DebugType;
pub use builder::DiBuilder;
pub use composite::{DebugStructType, DebugUnionType};
pub use config::{DebugConfig, DebugLevel};
pub use context::Context;
pub use error::BindError;
pub use flags::{DiFlags, DwarfAte, DwarfTag, SourceLanguage};
pub use member::{DebugMemberInfo, MemberLayout};
pub use module::Module;
pub use native::{TypeRef, TypeVariant};
pub use node::DiNode;
pub use tuple::{DiEnumeratorNode, DiLocalVariableNode, DiTypeNode, Project, TupleView};
pub use write_once::WriteOnce;

#[cfg(test)]
mod tests;
