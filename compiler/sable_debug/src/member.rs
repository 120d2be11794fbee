//! Member descriptors for aggregate debug types.

use std::rc::Rc;

use crate::binding::DebugType;
use crate::flags::DiFlags;
use crate::node::DiNode;

/// Explicit layout for one member, overriding the target layout oracle.
///
/// If any member of an aggregate provides this, every member must, and the
/// aggregate must be packed; the builders check both eagerly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberLayout {
    pub bit_size: u64,
    pub bit_align: u64,
    pub bit_offset: u64,
}

/// Description of one member of an aggregate for debug-info creation.
#[derive(Debug, Clone)]
pub struct DebugMemberInfo {
    /// Element index within the native aggregate.
    pub index: u32,
    /// Field name.
    pub name: String,
    /// Declaring file, when known.
    pub file: Option<Rc<DiNode>>,
    /// Declaring line, when known.
    pub line: u32,
    /// Binding of the member's type.
    pub debug_type: Rc<DebugType>,
    /// Flags for the member declaration.
    pub flags: DiFlags,
    /// Explicit layout; `None` defers to the module's layout oracle.
    pub explicit_layout: Option<MemberLayout>,
}

impl DebugMemberInfo {
    pub fn new(index: u32, name: impl Into<String>, debug_type: Rc<DebugType>) -> Self {
        Self {
            index,
            name: name.into(),
            file: None,
            line: 0,
            debug_type,
            flags: DiFlags::empty(),
            explicit_layout: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: Rc<DiNode>, line: u32) -> Self {
        self.file = Some(file);
        self.line = line;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: DiFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: MemberLayout) -> Self {
        self.explicit_layout = Some(layout);
        self
    }
}
