//! Managed wrappers over debug-metadata nodes.
//!
//! Node payloads are generic operand lists; the meaning of each slot is a
//! per-kind convention owned by this module. The typed accessors below are
//! the projections consumers use — the same property (name, scope, file) maps
//! to a different slot per kind and is dispatched by an explicit match on the
//! kind tag.
//!
//! Operand slot conventions:
//!
//! | kind            | operands                                                                 |
//! |-----------------|--------------------------------------------------------------------------|
//! | `String`        | 0 value                                                                  |
//! | `Tuple`         | elements…                                                                |
//! | `File`          | 0 filename, 1 directory                                                  |
//! | `CompileUnit`   | 0 language, 1 file, 2 producer, 3 optimized, 4 emission kind             |
//! | `BasicType`     | 0 tag, 1 name, 2 size, 3 align, 4 encoding                               |
//! | `DerivedType`   | 0 tag, 1 name, 2 scope, 3 file, 4 line, 5 base, 6 size, 7 align, 8 offset, 9 flags, 10 extra |
//! | `CompositeType` | 0 tag, 1 name, 2 scope, 3 file, 4 line, 5 size, 6 align, 7 flags, 8 base, 9 elements, 10 holder |
//! | `SubroutineType`| 0 flags, 1 types tuple (`[return?, params…]`)                            |
//! | `Subprogram`    | 0 name, 1 linkage, 2 scope, 3 file, 4 line, 5 type, 6 local, 7 definition, 8 scope line, 9 flags, 10 unit |
//! | `LexicalBlock`  | 0 scope, 1 file, 2 line, 3 column                                        |
//! | `LocalVariable` | 0 name, 1 scope, 2 file, 3 line, 4 type, 5 arg index, 6 flags            |
//! | `GlobalVariable`| 0 name, 1 linkage, 2 scope, 3 file, 4 line, 5 type, 6 local              |
//! | `Enumerator`    | 0 name, 1 value, 2 unsigned                                              |
//! | `Subrange`      | 0 lower bound, 1 count                                                   |

use std::cell::Cell;
use std::rc::Rc;

use sable_ir::{MdHandle, MdKind, MdOperand};

use crate::context::Context;
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfTag};
use crate::tuple::{DiTypeNode, TupleView};

/// The managed representation of a metadata node handle.
///
/// The deleted flag is a `Cell` so that replace-all-uses-with can retire the
/// wrapper in place: every holder of the `Rc` observes the deletion.
#[derive(Debug)]
pub struct DiNode {
    handle: MdHandle,
    deleted: Cell<bool>,
    kind: MdKind,
}

impl DiNode {
    pub(crate) fn new(handle: MdHandle, kind: MdKind) -> Self {
        Self {
            handle,
            deleted: Cell::new(false),
            kind,
        }
    }

    /// The underlying handle; a contract violation once the node has been
    /// retired by replace-all-uses-with.
    pub fn handle(&self) -> Result<MdHandle, BindError> {
        if self.deleted.get() {
            return Err(BindError::Ir(sable_ir::IrError::DeletedNode {
                handle: self.handle,
            }));
        }
        Ok(self.handle)
    }

    pub fn kind(&self) -> MdKind {
        self.kind
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.get()
    }

    /// Retire this wrapper after its node was replaced.
    pub(crate) fn retire(&self) {
        self.deleted.set(true);
    }

    pub fn is_temporary(&self, ctx: &Context) -> bool {
        !self.deleted.get() && ctx.with_ir(|ir| ir.metadata.is_temporary(self.handle))
    }

    pub fn is_distinct(&self, ctx: &Context) -> bool {
        !self.deleted.get() && ctx.with_ir(|ir| ir.metadata.is_distinct(self.handle))
    }

    pub fn is_uniqued(&self, ctx: &Context) -> bool {
        !self.deleted.get() && ctx.with_ir(|ir| ir.metadata.is_uniqued(self.handle))
    }

    /// Unique placeholder number of a temporary node.
    pub fn temp_id(&self, ctx: &Context) -> Option<u32> {
        if self.deleted.get() {
            return None;
        }
        ctx.with_ir(|ir| ir.metadata.temp_id(self.handle))
    }

    /// Whether this node kind describes a type.
    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            MdKind::BasicType
                | MdKind::DerivedType
                | MdKind::CompositeType
                | MdKind::SubroutineType
        )
    }

    // -- Generic operand access --

    pub fn operand_count(&self, ctx: &Context) -> Result<usize, BindError> {
        let handle = self.handle()?;
        Ok(ctx.with_ir(|ir| ir.metadata.operand_count(handle))?)
    }

    /// Operand at `index`; reads past the end as `Null`.
    pub fn operand(&self, ctx: &Context, index: usize) -> Result<MdOperand, BindError> {
        let handle = self.handle()?;
        Ok(ctx.with_ir(|ir| ir.metadata.operand(handle, index))?)
    }

    fn str_operand(&self, ctx: &Context, index: usize) -> Result<String, BindError> {
        Ok(self
            .operand(ctx, index)?
            .as_str()
            .map(str::to_owned)
            .unwrap_or_default())
    }

    fn int_operand(&self, ctx: &Context, index: usize) -> Result<u64, BindError> {
        Ok(self.operand(ctx, index)?.as_int().unwrap_or(0))
    }

    fn node_operand(&self, ctx: &Context, index: usize) -> Result<Option<Rc<DiNode>>, BindError> {
        match self.operand(ctx, index)? {
            MdOperand::Node(handle) => Ok(Some(ctx.node_ref(handle)?)),
            _ => Ok(None),
        }
    }

    // -- Typed accessors, dispatched on the kind tag --

    /// Name of the entity; empty when the kind carries none (a legitimate
    /// "no debug info" state, not an error).
    pub fn name(&self, ctx: &Context) -> Result<String, BindError> {
        match self.kind {
            MdKind::BasicType | MdKind::DerivedType | MdKind::CompositeType => {
                self.str_operand(ctx, 1)
            }
            MdKind::Subprogram
            | MdKind::LocalVariable
            | MdKind::GlobalVariable
            | MdKind::Enumerator
            | MdKind::File => self.str_operand(ctx, 0),
            _ => Ok(String::new()),
        }
    }

    /// Enclosing scope, when the kind has one.
    pub fn scope(&self, ctx: &Context) -> Result<Option<Rc<DiNode>>, BindError> {
        match self.kind {
            MdKind::DerivedType | MdKind::CompositeType | MdKind::Subprogram => {
                self.node_operand(ctx, 2)
            }
            MdKind::LocalVariable => self.node_operand(ctx, 1),
            MdKind::LexicalBlock => self.node_operand(ctx, 0),
            _ => Ok(None),
        }
    }

    /// Declaring file, when the kind has one.
    pub fn file(&self, ctx: &Context) -> Result<Option<Rc<DiNode>>, BindError> {
        match self.kind {
            MdKind::DerivedType
            | MdKind::CompositeType
            | MdKind::Subprogram
            | MdKind::GlobalVariable => self.node_operand(ctx, 3),
            MdKind::CompileUnit | MdKind::LexicalBlock => self.node_operand(ctx, 1),
            MdKind::LocalVariable => self.node_operand(ctx, 2),
            _ => Ok(None),
        }
    }

    pub fn line(&self, ctx: &Context) -> Result<u32, BindError> {
        let slot = match self.kind {
            MdKind::DerivedType
            | MdKind::CompositeType
            | MdKind::Subprogram
            | MdKind::GlobalVariable => 4,
            MdKind::LexicalBlock => 2,
            MdKind::LocalVariable => 3,
            _ => return Ok(0),
        };
        Ok(u32::try_from(self.int_operand(ctx, slot)?).unwrap_or(0))
    }

    /// DWARF tag of a type node.
    pub fn tag(&self, ctx: &Context) -> Result<Option<DwarfTag>, BindError> {
        match self.kind {
            MdKind::BasicType | MdKind::DerivedType | MdKind::CompositeType => {
                Ok(DwarfTag::from_value(self.int_operand(ctx, 0)?))
            }
            _ => Ok(None),
        }
    }

    pub fn bit_size(&self, ctx: &Context) -> Result<u64, BindError> {
        match self.kind {
            MdKind::BasicType => self.int_operand(ctx, 2),
            MdKind::DerivedType => self.int_operand(ctx, 6),
            MdKind::CompositeType => self.int_operand(ctx, 5),
            _ => Ok(0),
        }
    }

    pub fn bit_align(&self, ctx: &Context) -> Result<u64, BindError> {
        match self.kind {
            MdKind::BasicType => self.int_operand(ctx, 3),
            MdKind::DerivedType => self.int_operand(ctx, 7),
            MdKind::CompositeType => self.int_operand(ctx, 6),
            _ => Ok(0),
        }
    }

    /// Bit offset of a member within its aggregate.
    pub fn bit_offset(&self, ctx: &Context) -> Result<u64, BindError> {
        match self.kind {
            MdKind::DerivedType => self.int_operand(ctx, 8),
            _ => Ok(0),
        }
    }

    pub fn flags(&self, ctx: &Context) -> Result<DiFlags, BindError> {
        let slot = match self.kind {
            MdKind::DerivedType => 9,
            MdKind::CompositeType => 7,
            MdKind::SubroutineType => 0,
            MdKind::Subprogram => 9,
            MdKind::LocalVariable => 6,
            _ => return Ok(DiFlags::empty()),
        };
        Ok(DiFlags::from_bits_u64(self.int_operand(ctx, slot)?))
    }

    /// Base type of a derived type, or the type a composite derives from.
    pub fn base_type(&self, ctx: &Context) -> Result<Option<Rc<DiNode>>, BindError> {
        match self.kind {
            MdKind::DerivedType => self.node_operand(ctx, 5),
            MdKind::CompositeType => self.node_operand(ctx, 8),
            _ => Ok(None),
        }
    }

    /// Member/element list of a composite type as a typed view.
    ///
    /// An absent tuple is a valid empty collection.
    pub fn elements(&self, ctx: &Context) -> Result<TupleView<DiTypeNode>, BindError> {
        match self.kind {
            MdKind::CompositeType => TupleView::new(self.node_operand(ctx, 9)?),
            _ => TupleView::new(None),
        }
    }

    /// DWARF attribute encoding of a basic type.
    pub fn encoding(&self, ctx: &Context) -> Result<u64, BindError> {
        match self.kind {
            MdKind::BasicType => self.int_operand(ctx, 4),
            _ => Ok(0),
        }
    }

    /// Lower bound of a subrange node.
    pub fn lower_bound(&self, ctx: &Context) -> Result<u64, BindError> {
        match self.kind {
            MdKind::Subrange => self.int_operand(ctx, 0),
            _ => Ok(0),
        }
    }

    /// Element count of a subrange node.
    pub fn count(&self, ctx: &Context) -> Result<u64, BindError> {
        match self.kind {
            MdKind::Subrange => self.int_operand(ctx, 1),
            _ => Ok(0),
        }
    }
}
