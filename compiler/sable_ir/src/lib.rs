//! Sable IR - Native Type and Metadata Substrate
//!
//! This crate is the code-generation engine's own representation layer:
//!
//! - Structurally interned native types ([`TypePool`]): equal shape means
//!   equal handle, so handle comparison is structural equality. Named
//!   structs are identified rather than interned and may be opaque until a
//!   body is attached, which is what makes recursive types representable.
//! - The debug-metadata node graph ([`MetadataGraph`]): uniqued, distinct,
//!   and temporary nodes, with replace-all-uses-with as the resolution
//!   primitive for forward references.
//! - The target layout oracle ([`TargetLayout`]): bit sizes, ABI alignments,
//!   and aggregate element offsets under an injected target description.
//!
//! Consumers treat these as primitive operations; the binding and resolution
//! policy on top of them lives in `sable_debug`.

mod context;
mod error;
mod layout;
mod metadata;
mod types;

pub use context::Context;
pub use error::IrError;
pub use layout::TargetLayout;
pub use metadata::{node_or_null, MdHandle, MdKind, MdOperand, MetadataGraph};
pub use types::{StructBody, TypeData, TypeHandle, TypeKind, TypePool};
