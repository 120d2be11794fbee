//! Struct and union bindings with the forward-declaration protocol.
//!
//! Both aggregates follow the same state machine: a placeholder is created
//! first (opaque native struct + temporary composite node) so that
//! self-referential and mutually-referential types can point at it; the body
//! arrives later in a single `set_body` that attaches the native layout,
//! computes each member's concrete debug layout, and resolves the
//! placeholder by replacing all of its uses with the finished node.
//!
//! Member layout comes from exactly one policy per aggregate: every member
//! explicit, or every member derived from the module's layout oracle —
//! mixing the two is rejected eagerly.

use std::ops::Deref;
use std::rc::Rc;

use crate::binding::DebugType;
use crate::context::Context;
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfTag};
use crate::member::DebugMemberInfo;
use crate::module::Module;
use crate::native::TypeRef;
use crate::node::DiNode;
use crate::write_once::WriteOnce;

/// Validate the all-explicit-or-all-oracle member layout rule.
///
/// `packed` is `Some` for aggregates whose native body carries a packed
/// flag; explicit layout additionally requires it to be set.
fn check_layout_policy(
    members: &[DebugMemberInfo],
    packed: Option<bool>,
) -> Result<(), BindError> {
    let explicit = members
        .iter()
        .filter(|m| m.explicit_layout.is_some())
        .count();
    if explicit != 0 && explicit != members.len() {
        return Err(BindError::MixedMemberLayout);
    }
    if explicit > 0 && explicit == members.len() {
        if let Some(false) = packed {
            return Err(BindError::ExplicitLayoutRequiresPacked);
        }
    }
    Ok(())
}

/// Validate that member indices match their list positions.
fn check_member_indices(members: &[DebugMemberInfo]) -> Result<(), BindError> {
    for (position, member) in members.iter().enumerate() {
        let expected = u32::try_from(position).unwrap_or(u32::MAX);
        if member.index != expected {
            return Err(BindError::MemberIndexMismatch {
                expected,
                found: member.index,
            });
        }
    }
    Ok(())
}

/// The placeholder node of a not-yet-resolved aggregate, or the error that
/// matches the misuse.
fn placeholder_of(ctx: &Context, binding: &DebugType) -> Result<Rc<DiNode>, BindError> {
    let node = binding.debug_node().ok_or(BindError::DebugTypeUnset)?;
    if !node.is_temporary(ctx) {
        return Err(BindError::AlreadyResolved);
    }
    Ok(node)
}

/// Binding of a named native struct with a composite debug node.
#[derive(Debug)]
pub struct DebugStructType {
    binding: Rc<DebugType>,
    members: WriteOnce<Vec<DebugMemberInfo>>,
}

impl DebugStructType {
    /// Create an opaque placeholder struct: a fresh bodyless native struct
    /// plus a temporary composite node that other types may reference.
    pub fn new_placeholder(
        ctx: &Context,
        module: &Module,
        native_name: &str,
        scope: Option<&Rc<DiNode>>,
        source_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
    ) -> Result<Self, BindError> {
        let native = ctx.named_struct_type(native_name);
        Self::from_native(ctx, module, native, scope, source_name, file, line)
    }

    /// Create a placeholder over an existing native struct.
    pub fn from_native(
        ctx: &Context,
        module: &Module,
        native: Rc<TypeRef>,
        scope: Option<&Rc<DiNode>>,
        source_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
    ) -> Result<Self, BindError> {
        if !native.is_struct() {
            return Err(BindError::Ir(sable_ir::IrError::NotAStruct {
                handle: native.handle(),
            }));
        }
        let temp = module.di().create_replaceable_composite_type(
            ctx,
            DwarfTag::StructureType,
            source_name,
            scope,
            file,
            line,
        )?;
        let binding = DebugType::new(ctx, native, Some(temp))?;
        Ok(Self {
            binding,
            members: WriteOnce::new(),
        })
    }

    /// Create a struct with its body in one step. The placeholder still
    /// exists transiently so the member nodes can scope to it before the
    /// final node replaces it.
    pub fn new_with_body(
        ctx: &Context,
        module: &Module,
        native_name: &str,
        scope: Option<&Rc<DiNode>>,
        source_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        flags: DiFlags,
        packed: bool,
        members: Vec<DebugMemberInfo>,
    ) -> Result<Self, BindError> {
        let this =
            Self::new_placeholder(ctx, module, native_name, scope, source_name, file, line)?;
        this.set_body(ctx, module, packed, scope, file, line, flags, members)?;
        Ok(this)
    }

    /// Attach the native layout and resolve the placeholder.
    ///
    /// Every member uses the same layout policy (all explicit or all
    /// oracle-derived); the native body is attached exactly once; the
    /// finished composite node replaces all uses of the placeholder.
    #[expect(clippy::too_many_arguments, reason = "mirrors the body-definition surface")]
    pub fn set_body(
        &self,
        ctx: &Context,
        module: &Module,
        packed: bool,
        scope: Option<&Rc<DiNode>>,
        file: Option<&Rc<DiNode>>,
        line: u32,
        flags: DiFlags,
        members: Vec<DebugMemberInfo>,
    ) -> Result<(), BindError> {
        let placeholder = placeholder_of(ctx, &self.binding)?;
        check_layout_policy(&members, Some(packed))?;
        check_member_indices(&members)?;

        let native = Rc::clone(self.binding.native());
        let native_elements: Vec<Rc<TypeRef>> = members
            .iter()
            .map(|m| Rc::clone(m.debug_type.native()))
            .collect();
        ctx.set_struct_body(&native, packed, &native_elements)?;

        let mut member_nodes = Vec::with_capacity(members.len());
        for member in &members {
            let (bit_size, bit_align, bit_offset) = match member.explicit_layout {
                Some(layout) => (layout.bit_size, layout.bit_align, layout.bit_offset),
                None => ctx.with_ir(|ir| {
                    let size = module
                        .layout()
                        .bit_size_of(&ir.types, member.debug_type.native().handle())?;
                    let offset = module.layout().bit_offset_of_element(
                        &ir.types,
                        native.handle(),
                        member.index,
                    )?;
                    Ok::<_, BindError>((size, 0, offset))
                })?,
            };
            member_nodes.push(module.di().create_member_type(
                ctx,
                &placeholder,
                &member.name,
                member.file.as_ref(),
                member.line,
                bit_size,
                bit_align,
                bit_offset,
                member.flags,
                member.debug_type.debug_node().as_ref(),
            )?);
        }

        let bit_size =
            ctx.with_ir(|ir| module.layout().bit_size_of(&ir.types, native.handle()))?;
        let name = placeholder.name(ctx)?;
        let concrete = module.di().create_struct_type(
            ctx,
            scope,
            &name,
            file,
            line,
            bit_size,
            0,
            flags,
            None,
            &member_nodes,
        )?;

        self.binding.set_debug(ctx, concrete)?;
        self.members
            .set(members)
            .map_err(|_| BindError::AlreadyResolved)?;
        tracing::debug!(name = %name, "struct body resolved");
        Ok(())
    }

    pub fn binding(&self) -> &Rc<DebugType> {
        &self.binding
    }

    /// Whether the native struct is still bodyless.
    pub fn is_opaque(&self, ctx: &Context) -> bool {
        self.binding.native().is_opaque(ctx)
    }

    pub fn is_packed(&self, ctx: &Context) -> bool {
        self.binding.native().is_packed(ctx)
    }

    /// Native (IR-level) name.
    pub fn name(&self, ctx: &Context) -> String {
        self.binding.native().name(ctx)
    }

    /// Source-level (debug) name.
    pub fn source_name(&self, ctx: &Context) -> Result<String, BindError> {
        match self.binding.debug_node() {
            Some(node) => node.name(ctx),
            None => Ok(String::new()),
        }
    }

    /// Native member types; empty while opaque.
    pub fn members(&self, ctx: &Context) -> Vec<Rc<TypeRef>> {
        self.binding.native().members(ctx)
    }

    /// Member descriptors supplied to `set_body`; empty until then.
    pub fn debug_members(&self) -> &[DebugMemberInfo] {
        self.members.value().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Deref for DebugStructType {
    type Target = DebugType;

    fn deref(&self) -> &DebugType {
        &self.binding
    }
}

/// Binding of a union type.
///
/// The underlying native type is a struct whose body collapses to a single
/// element — the largest member — while the debug node enumerates every
/// logical member at bit offset zero.
#[derive(Debug)]
pub struct DebugUnionType {
    binding: Rc<DebugType>,
    members: WriteOnce<Vec<DebugMemberInfo>>,
}

impl DebugUnionType {
    /// Create an opaque placeholder union.
    pub fn new_placeholder(
        ctx: &Context,
        module: &Module,
        native_name: &str,
        scope: Option<&Rc<DiNode>>,
        source_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
    ) -> Result<Self, BindError> {
        let native = ctx.named_struct_type(native_name);
        Self::from_native(ctx, module, native, scope, source_name, file, line)
    }

    /// Create a placeholder union over an existing native struct, which must
    /// not have a body yet.
    pub fn from_native(
        ctx: &Context,
        module: &Module,
        native: Rc<TypeRef>,
        scope: Option<&Rc<DiNode>>,
        source_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
    ) -> Result<Self, BindError> {
        if !native.is_struct() {
            return Err(BindError::Ir(sable_ir::IrError::NotAStruct {
                handle: native.handle(),
            }));
        }
        if !native.is_opaque(ctx) {
            return Err(BindError::UnionBasisNotOpaque);
        }
        let temp = module.di().create_replaceable_composite_type(
            ctx,
            DwarfTag::UnionType,
            source_name,
            scope,
            file,
            line,
        )?;
        let binding = DebugType::new(ctx, native, Some(temp))?;
        Ok(Self {
            binding,
            members: WriteOnce::new(),
        })
    }

    /// Create a union with its body in one step.
    pub fn new_with_body(
        ctx: &Context,
        module: &Module,
        native_name: &str,
        scope: Option<&Rc<DiNode>>,
        source_name: &str,
        file: Option<&Rc<DiNode>>,
        line: u32,
        flags: DiFlags,
        members: Vec<DebugMemberInfo>,
    ) -> Result<Self, BindError> {
        let this =
            Self::new_placeholder(ctx, module, native_name, scope, source_name, file, line)?;
        this.set_body(ctx, module, scope, file, line, flags, members)?;
        Ok(this)
    }

    /// Attach the union body and resolve the placeholder.
    ///
    /// The native body becomes a single element of the member with the
    /// largest bit size; on ties the first member reaching the maximum wins.
    /// The debug body lists every logical member at offset zero.
    pub fn set_body(
        &self,
        ctx: &Context,
        module: &Module,
        scope: Option<&Rc<DiNode>>,
        file: Option<&Rc<DiNode>>,
        line: u32,
        flags: DiFlags,
        members: Vec<DebugMemberInfo>,
    ) -> Result<(), BindError> {
        let placeholder = placeholder_of(ctx, &self.binding)?;
        if members.is_empty() {
            return Err(BindError::EmptyUnion);
        }
        check_layout_policy(&members, None)?;
        check_member_indices(&members)?;

        let native = Rc::clone(self.binding.native());

        // Bit size per member under the aggregate's layout policy.
        let mut sizes = Vec::with_capacity(members.len());
        for member in &members {
            let size = match member.explicit_layout {
                Some(layout) => layout.bit_size,
                None => ctx.with_ir(|ir| {
                    module
                        .layout()
                        .bit_size_of(&ir.types, member.debug_type.native().handle())
                })?,
            };
            sizes.push(size);
        }

        // Largest member becomes the native body; first max wins on ties.
        let mut largest = 0usize;
        for (index, size) in sizes.iter().enumerate() {
            if *size > sizes[largest] {
                largest = index;
            }
        }
        let body = [Rc::clone(members[largest].debug_type.native())];
        ctx.set_struct_body(&native, false, &body)?;

        let mut member_nodes = Vec::with_capacity(members.len());
        let mut union_size = 0u64;
        let mut union_align = 0u64;
        for (member, size) in members.iter().zip(&sizes) {
            let bit_align = member.explicit_layout.map_or(0, |l| l.bit_align);
            union_size = union_size.max(*size);
            union_align = union_align.max(bit_align);
            member_nodes.push(module.di().create_member_type(
                ctx,
                &placeholder,
                &member.name,
                member.file.as_ref(),
                member.line,
                *size,
                bit_align,
                0,
                member.flags,
                member.debug_type.debug_node().as_ref(),
            )?);
        }

        let name = placeholder.name(ctx)?;
        let concrete = module.di().create_union_type(
            ctx,
            scope,
            &name,
            file,
            line,
            union_size,
            union_align,
            flags,
            &member_nodes,
        )?;

        self.binding.set_debug(ctx, concrete)?;
        self.members
            .set(members)
            .map_err(|_| BindError::AlreadyResolved)?;
        tracing::debug!(name = %name, "union body resolved");
        Ok(())
    }

    pub fn binding(&self) -> &Rc<DebugType> {
        &self.binding
    }

    pub fn is_opaque(&self, ctx: &Context) -> bool {
        self.binding.native().is_opaque(ctx)
    }

    pub fn name(&self, ctx: &Context) -> String {
        self.binding.native().name(ctx)
    }

    /// Native member types; for a resolved union this is the single largest
    /// member.
    pub fn members(&self, ctx: &Context) -> Vec<Rc<TypeRef>> {
        self.binding.native().members(ctx)
    }

    /// Logical member descriptors; empty until `set_body`.
    pub fn debug_members(&self) -> &[DebugMemberInfo] {
        self.members.value().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Deref for DebugUnionType {
    type Target = DebugType;

    fn deref(&self) -> &DebugType {
        &self.binding
    }
}
