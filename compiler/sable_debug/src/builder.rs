//! The debug-info builder session.
//!
//! A session accumulates compile-unit, scope, type, and variable nodes, some
//! of them temporary. [`DiBuilder::finish`] is the single finalize point: it
//! resolves every leftover temporary and marks the session finished, after
//! which no new temporary may be created — the compiler has seen the whole
//! program and nothing else will be forward-declared.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sable_ir::{node_or_null, MdKind, MdOperand};

use crate::config::DebugConfig;
use crate::context::Context;
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfAte, DwarfTag};
use crate::node::DiNode;

fn opt_node(node: Option<&Rc<DiNode>>) -> Result<MdOperand, BindError> {
    match node {
        Some(n) => Ok(MdOperand::Node(n.handle()?)),
        None => Ok(MdOperand::Null),
    }
}

/// Stateful facade over metadata node creation.
pub struct DiBuilder {
    finished: Cell<bool>,
    compile_unit: RefCell<Option<Rc<DiNode>>>,
}

impl Default for DiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DiBuilder {
    pub fn new() -> Self {
        Self {
            finished: Cell::new(false),
            compile_unit: RefCell::new(None),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    /// The compile unit created for this session, if any.
    pub fn compile_unit(&self) -> Option<Rc<DiNode>> {
        self.compile_unit.borrow().clone()
    }

    /// Finalize the session: resolve every leftover temporary and refuse new
    /// ones from here on. Idempotent — a second call is a no-op.
    pub fn finish(&self, ctx: &Context) {
        if self.finished.get() {
            return;
        }
        let promoted = ctx.resolve_temporaries();
        tracing::debug!(promoted = promoted.len(), "builder session finished");
        self.finished.set(true);
    }

    // -- Files and compile units --

    /// Get or create a file node. Empty paths are legitimate ("no debug info
    /// available here"), not errors.
    pub fn create_file(
        &self,
        ctx: &Context,
        filename: &str,
        directory: &str,
    ) -> Result<Rc<DiNode>, BindError> {
        let handle = ctx.with_ir_mut(|ir| {
            ir.metadata.get_uniqued(
                MdKind::File,
                &[
                    MdOperand::Str(filename.into()),
                    MdOperand::Str(directory.into()),
                ],
            )
        });
        ctx.node_ref(handle)
    }

    /// Create the compile unit for this session.
    pub fn create_compile_unit(
        &self,
        ctx: &Context,
        config: &DebugConfig,
        file: &Rc<DiNode>,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Int(config.language.value()),
            MdOperand::Node(file.handle()?),
            MdOperand::Str(config.producer.as_str().into()),
            MdOperand::Int(u64::from(config.optimized)),
            MdOperand::Int(config.level.emission_code()),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.create_distinct(MdKind::CompileUnit, &operands));
        let unit = ctx.node_ref(handle)?;
        *self.compile_unit.borrow_mut() = Some(Rc::clone(&unit));
        Ok(unit)
    }

    // -- Type nodes --

    pub fn create_basic_type(
        &self,
        ctx: &Context,
        name: &str,
        bit_size: u64,
        bit_align: u64,
        encoding: DwarfAte,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Int(DwarfTag::BaseType.value()),
            MdOperand::Str(name.into()),
            MdOperand::Int(bit_size),
            MdOperand::Int(bit_align),
            MdOperand::Int(encoding.value()),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::BasicType, &operands));
        ctx.node_ref(handle)
    }

    /// Create a pointer type node. A null pointee describes a pointer to a
    /// type without debug information (or to void).
    pub fn create_pointer_type(
        &self,
        ctx: &Context,
        name: &str,
        pointee: Option<&Rc<DiNode>>,
        bit_size: u64,
        bit_align: u64,
        address_space: u32,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Int(DwarfTag::PointerType.value()),
            MdOperand::Str(name.into()),
            MdOperand::Null, // scope
            MdOperand::Null, // file
            MdOperand::Int(0), // line
            opt_node(pointee)?,
            MdOperand::Int(bit_size),
            MdOperand::Int(bit_align),
            MdOperand::Int(0), // offset
            MdOperand::Int(0), // flags
            MdOperand::Int(u64::from(address_space)),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::DerivedType, &operands));
        ctx.node_ref(handle)
    }

    /// Create a member node describing one field of an aggregate.
    pub fn create_member_type(
        &self,
        ctx: &Context,
        scope: &Rc<DiNode>,
        name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        bit_size: u64,
        bit_align: u64,
        bit_offset: u64,
        flags: DiFlags,
        base: Option<&Rc<DiNode>>,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Int(DwarfTag::Member.value()),
            MdOperand::Str(name.into()),
            MdOperand::Node(scope.handle()?),
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            opt_node(base)?,
            MdOperand::Int(bit_size),
            MdOperand::Int(bit_align),
            MdOperand::Int(bit_offset),
            MdOperand::Int(flags.bits_u64()),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::DerivedType, &operands));
        ctx.node_ref(handle)
    }

    /// Get or create the operand tuple for an element list.
    pub fn create_tuple(
        &self,
        ctx: &Context,
        elements: &[Rc<DiNode>],
    ) -> Result<Rc<DiNode>, BindError> {
        let mut operands = Vec::with_capacity(elements.len());
        for element in elements {
            operands.push(MdOperand::Node(element.handle()?));
        }
        let handle = ctx.with_ir_mut(|ir| ir.metadata.get_tuple(&operands));
        ctx.node_ref(handle)
    }

    fn create_composite(
        &self,
        ctx: &Context,
        tag: DwarfTag,
        name: &str,
        scope: Option<&Rc<DiNode>>,
        file: Option<&Rc<DiNode>>,
        line: u32,
        bit_size: u64,
        bit_align: u64,
        flags: DiFlags,
        base: Option<&Rc<DiNode>>,
        elements: Option<&Rc<DiNode>>,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Int(tag.value()),
            MdOperand::Str(name.into()),
            opt_node(scope)?,
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            MdOperand::Int(bit_size),
            MdOperand::Int(bit_align),
            MdOperand::Int(flags.bits_u64()),
            opt_node(base)?,
            opt_node(elements)?,
            MdOperand::Null, // holder
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.create_distinct(MdKind::CompositeType, &operands));
        ctx.node_ref(handle)
    }

    pub fn create_struct_type(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        bit_size: u64,
        bit_align: u64,
        flags: DiFlags,
        derived_from: Option<&Rc<DiNode>>,
        elements: &[Rc<DiNode>],
    ) -> Result<Rc<DiNode>, BindError> {
        let tuple = self.create_tuple(ctx, elements)?;
        self.create_composite(
            ctx,
            DwarfTag::StructureType,
            name,
            scope,
            file,
            line,
            bit_size,
            bit_align,
            flags,
            derived_from,
            Some(&tuple),
        )
    }

    pub fn create_union_type(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        bit_size: u64,
        bit_align: u64,
        flags: DiFlags,
        elements: &[Rc<DiNode>],
    ) -> Result<Rc<DiNode>, BindError> {
        let tuple = self.create_tuple(ctx, elements)?;
        self.create_composite(
            ctx,
            DwarfTag::UnionType,
            name,
            scope,
            file,
            line,
            bit_size,
            bit_align,
            flags,
            None,
            Some(&tuple),
        )
    }

    pub fn create_array_type(
        &self,
        ctx: &Context,
        bit_size: u64,
        bit_align: u64,
        element_type: &Rc<DiNode>,
        subscripts: &[Rc<DiNode>],
    ) -> Result<Rc<DiNode>, BindError> {
        let tuple = self.create_tuple(ctx, subscripts)?;
        self.create_composite(
            ctx,
            DwarfTag::ArrayType,
            "",
            None,
            None,
            0,
            bit_size,
            bit_align,
            DiFlags::empty(),
            Some(element_type),
            Some(&tuple),
        )
    }

    pub fn create_enumeration_type(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        bit_size: u64,
        bit_align: u64,
        enumerators: &[Rc<DiNode>],
        underlying: &Rc<DiNode>,
    ) -> Result<Rc<DiNode>, BindError> {
        let tuple = self.create_tuple(ctx, enumerators)?;
        self.create_composite(
            ctx,
            DwarfTag::EnumerationType,
            name,
            scope,
            file,
            line,
            bit_size,
            bit_align,
            DiFlags::empty(),
            Some(underlying),
            Some(&tuple),
        )
    }

    pub fn create_subrange(
        &self,
        ctx: &Context,
        lower_bound: u64,
        count: u64,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [MdOperand::Int(lower_bound), MdOperand::Int(count)];
        let handle = ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::Subrange, &operands));
        ctx.node_ref(handle)
    }

    pub fn create_enumerator(
        &self,
        ctx: &Context,
        name: &str,
        value: i64,
        unsigned: bool,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Str(name.into()),
            MdOperand::Int(u64::from_le_bytes(value.to_le_bytes())),
            MdOperand::Int(u64::from(unsigned)),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::Enumerator, &operands));
        ctx.node_ref(handle)
    }

    /// Create a subroutine (function signature) type over `[return, params…]`.
    /// A `None` return or parameter stands for void / no debug info and is
    /// encoded as an explicit null slot.
    pub fn create_subroutine_type(
        &self,
        ctx: &Context,
        flags: DiFlags,
        return_type: Option<&Rc<DiNode>>,
        params: &[Option<Rc<DiNode>>],
    ) -> Result<Rc<DiNode>, BindError> {
        let mut type_operands = Vec::with_capacity(params.len() + 1);
        type_operands.push(opt_node(return_type)?);
        for param in params {
            type_operands.push(match param {
                Some(node) => MdOperand::Node(node.handle()?),
                None => MdOperand::Null,
            });
        }
        let types = ctx.with_ir_mut(|ir| ir.metadata.get_tuple(&type_operands));
        let operands = [MdOperand::Int(flags.bits_u64()), MdOperand::Node(types)];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::SubroutineType, &operands));
        ctx.node_ref(handle)
    }

    // -- Program entities --

    pub fn create_subprogram(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        linkage_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        subroutine_type: Option<&Rc<DiNode>>,
        is_local_to_unit: bool,
        is_definition: bool,
        scope_line: u32,
        flags: DiFlags,
    ) -> Result<Rc<DiNode>, BindError> {
        // An empty linkage name falls back to the source name.
        let linkage = if linkage_name.is_empty() { name } else { linkage_name };
        let unit = self.compile_unit();
        let operands = [
            MdOperand::Str(name.into()),
            MdOperand::Str(linkage.into()),
            opt_node(scope)?,
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            opt_node(subroutine_type)?,
            MdOperand::Int(u64::from(is_local_to_unit)),
            MdOperand::Int(u64::from(is_definition)),
            MdOperand::Int(u64::from(scope_line)),
            MdOperand::Int(flags.bits_u64()),
            node_or_null(unit.as_ref().map(|u| u.handle()).transpose()?),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.create_distinct(MdKind::Subprogram, &operands));
        ctx.node_ref(handle)
    }

    pub fn create_lexical_block(
        &self,
        ctx: &Context,
        scope: &Rc<DiNode>,
        file: Option<&Rc<DiNode>>,
        line: u32,
        column: u32,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Node(scope.handle()?),
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            MdOperand::Int(u64::from(column)),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.create_distinct(MdKind::LexicalBlock, &operands));
        ctx.node_ref(handle)
    }

    fn create_local_variable(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        arg_index: u32,
        file: Option<&Rc<DiNode>>,
        line: u32,
        variable_type: Option<&Rc<DiNode>>,
        flags: DiFlags,
    ) -> Result<Rc<DiNode>, BindError> {
        let operands = [
            MdOperand::Str(name.into()),
            opt_node(scope)?,
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            opt_node(variable_type)?,
            MdOperand::Int(u64::from(arg_index)),
            MdOperand::Int(flags.bits_u64()),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.get_uniqued(MdKind::LocalVariable, &operands));
        ctx.node_ref(handle)
    }

    /// Create debug info for a local variable.
    pub fn create_auto_variable(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        variable_type: Option<&Rc<DiNode>>,
        flags: DiFlags,
    ) -> Result<Rc<DiNode>, BindError> {
        self.create_local_variable(ctx, scope, name, 0, file, line, variable_type, flags)
    }

    /// Create debug info for a formal parameter. `arg_index` is 1-based.
    pub fn create_parameter_variable(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        arg_index: u32,
        file: Option<&Rc<DiNode>>,
        line: u32,
        variable_type: Option<&Rc<DiNode>>,
        flags: DiFlags,
    ) -> Result<Rc<DiNode>, BindError> {
        self.create_local_variable(ctx, scope, name, arg_index, file, line, variable_type, flags)
    }

    pub fn create_global_variable(
        &self,
        ctx: &Context,
        scope: Option<&Rc<DiNode>>,
        name: &str,
        linkage_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        variable_type: Option<&Rc<DiNode>>,
        is_local_to_unit: bool,
    ) -> Result<Rc<DiNode>, BindError> {
        let linkage = if linkage_name.is_empty() { name } else { linkage_name };
        let operands = [
            MdOperand::Str(name.into()),
            MdOperand::Str(linkage.into()),
            opt_node(scope)?,
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            opt_node(variable_type)?,
            MdOperand::Int(u64::from(is_local_to_unit)),
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.create_distinct(MdKind::GlobalVariable, &operands));
        ctx.node_ref(handle)
    }

    // -- Forward declarations --

    /// Create a temporary composite placeholder that later resolves to a
    /// full definition via replace-all-uses-with.
    ///
    /// Fails once the session is finished: after [`DiBuilder::finish`] every
    /// node must be created fully resolved.
    pub fn create_replaceable_composite_type(
        &self,
        ctx: &Context,
        tag: DwarfTag,
        name: &str,
        scope: Option<&Rc<DiNode>>,
        file: Option<&Rc<DiNode>>,
        line: u32,
    ) -> Result<Rc<DiNode>, BindError> {
        if self.finished.get() {
            return Err(BindError::SessionFinished);
        }
        let operands = [
            MdOperand::Int(tag.value()),
            MdOperand::Str(name.into()),
            opt_node(scope)?,
            opt_node(file)?,
            MdOperand::Int(u64::from(line)),
            MdOperand::Int(0), // size
            MdOperand::Int(0), // align
            MdOperand::Int(DiFlags::FWD_DECL.bits_u64()),
            MdOperand::Null, // base
            MdOperand::Null, // elements
            MdOperand::Null, // holder
        ];
        let handle =
            ctx.with_ir_mut(|ir| ir.metadata.create_temporary(MdKind::CompositeType, &operands));
        ctx.node_ref(handle)
    }
}
