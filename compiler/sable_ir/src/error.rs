//! Errors raised by the engine substrate.
//!
//! Every variant is a contract violation on the caller's side: the engine has
//! no recoverable failure modes and never retries. Callers that hit one of
//! these have a bug in the phase driving the engine, not bad user input.

use crate::types::TypeHandle;
use crate::metadata::MdHandle;

/// Contract violation detected by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// The type has no size under any target layout (void, opaque struct,
    /// function, token, label, metadata).
    UnsizedType { handle: TypeHandle },
    /// A struct-only operation was applied to a non-struct type.
    NotAStruct { handle: TypeHandle },
    /// A body query was made against a struct that is still opaque.
    OpaqueStruct { handle: TypeHandle },
    /// `set_body` was called on a struct that already has a body.
    BodyAlreadySet { handle: TypeHandle },
    /// Pointers to void are not representable; use a byte pointer instead.
    PointerToVoid,
    /// Element offset query past the end of a struct body.
    MemberIndexOutOfRange { handle: TypeHandle, index: u32, len: u32 },
    /// Replace-all-uses-with on a node that is not a live temporary.
    NotATemporary { handle: MdHandle },
    /// A node retired by a prior replace-all-uses-with was used.
    DeletedNode { handle: MdHandle },
    /// A node cannot replace itself.
    SelfReplacement { handle: MdHandle },
}

impl std::fmt::Display for IrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrError::UnsizedType { handle } => {
                write!(f, "type {handle:?} has no size under the target layout")
            }
            IrError::NotAStruct { handle } => {
                write!(f, "type {handle:?} is not a struct")
            }
            IrError::OpaqueStruct { handle } => {
                write!(f, "struct {handle:?} is opaque (no body set)")
            }
            IrError::BodyAlreadySet { handle } => {
                write!(f, "struct {handle:?} already has a body")
            }
            IrError::PointerToVoid => {
                write!(f, "cannot create a pointer to void")
            }
            IrError::MemberIndexOutOfRange { handle, index, len } => {
                write!(
                    f,
                    "member index {index} out of range for struct {handle:?} with {len} members"
                )
            }
            IrError::NotATemporary { handle } => {
                write!(f, "metadata node {handle:?} is not a replaceable temporary")
            }
            IrError::DeletedNode { handle } => {
                write!(f, "metadata node {handle:?} was retired by a prior replacement")
            }
            IrError::SelfReplacement { handle } => {
                write!(f, "metadata node {handle:?} cannot replace itself")
            }
        }
    }
}

impl std::error::Error for IrError {}
