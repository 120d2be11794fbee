//! Binding-layer error definitions.
//!
//! Everything here is a contract violation: a bug in the compiler phase
//! driving this layer, not a normal-use condition. Absent scope/file/name
//! information is *not* an error anywhere in this crate — "no debug info
//! available here" is a legitimate, propagating state represented with
//! `Option`s and empty strings.

use sable_ir::{IrError, MdKind};

/// Contract violation detected by the binding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The native side of a binding is write-once; it is assigned at
    /// construction and can never be assigned again.
    NativeAlreadySet,
    /// The debug side of a binding already holds a resolved (non-temporary)
    /// node; no further replacement is permitted.
    AlreadyResolved,
    /// An operation required the binding's debug node, but none was assigned.
    DebugTypeUnset,
    /// Integer types must have a non-zero width.
    ZeroWidthInteger,
    /// One aggregate mixed explicit member layout with oracle-derived layout.
    /// All members must use the same policy.
    MixedMemberLayout,
    /// Explicit member layout requires the aggregate to be packed.
    ExplicitLayoutRequiresPacked,
    /// Native element list and debug member list disagree in length.
    MemberCountMismatch { expected: usize, found: usize },
    /// A member descriptor's element index does not match its position in
    /// the member list.
    MemberIndexMismatch { expected: u32, found: u32 },
    /// The native array's element type does not match the element binding.
    ElementTypeMismatch,
    /// A union must be built over an opaque (bodyless) native struct.
    UnionBasisNotOpaque,
    /// A union body needs at least one member.
    EmptyUnion,
    /// A tuple view was constructed over a non-tuple node.
    NotATuple { found: MdKind },
    /// The builder session was finished; temporaries may no longer be
    /// created.
    SessionFinished,
    /// Contract violation reported by the engine substrate.
    Ir(IrError),
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::NativeAlreadySet => {
                write!(f, "native type of a binding is write-once and was already set")
            }
            BindError::AlreadyResolved => {
                write!(f, "debug node is already resolved and cannot be replaced")
            }
            BindError::DebugTypeUnset => {
                write!(f, "binding has no debug node to derive from")
            }
            BindError::ZeroWidthInteger => {
                write!(f, "integer types must have a non-zero bit width")
            }
            BindError::MixedMemberLayout => {
                write!(
                    f,
                    "aggregate members must be all explicit-layout or all oracle-derived"
                )
            }
            BindError::ExplicitLayoutRequiresPacked => {
                write!(f, "explicit member layout requires a packed aggregate")
            }
            BindError::MemberCountMismatch { expected, found } => {
                write!(f, "expected {expected} members, found {found}")
            }
            BindError::MemberIndexMismatch { expected, found } => {
                write!(
                    f,
                    "member index {found} does not match its list position {expected}"
                )
            }
            BindError::ElementTypeMismatch => {
                write!(f, "native array element type does not match the element binding")
            }
            BindError::UnionBasisNotOpaque => {
                write!(f, "struct type used as the basis for a union must not have a body")
            }
            BindError::EmptyUnion => {
                write!(f, "union body requires at least one member")
            }
            BindError::NotATuple { found } => {
                write!(f, "expected an operand tuple node, found {found:?}")
            }
            BindError::SessionFinished => {
                write!(f, "builder session is finished; no new temporaries may be created")
            }
            BindError::Ir(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Ir(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<IrError> for BindError {
    fn from(inner: IrError) -> Self {
        BindError::Ir(inner)
    }
}
