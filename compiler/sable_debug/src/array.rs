//! Array bindings.
//!
//! An array over a sized element type gets a concrete composite node up
//! front. An array over a not-yet-sized element (an opaque forward
//! declaration) gets a temporary placeholder instead, to be patched by
//! [`DebugArrayType::resolve_temporary`] once the element's layout is known.

use std::ops::Deref;
use std::rc::Rc;

use sable_ir::TargetLayout;

use crate::binding::DebugType;
use crate::builder::DiBuilder;
use crate::context::Context;
use crate::error::BindError;
use crate::flags::DwarfTag;
use crate::module::Module;
use crate::native::TypeRef;

/// Binding of a native array type with a composite debug node.
#[derive(Debug)]
pub struct DebugArrayType {
    binding: Rc<DebugType>,
    element: Rc<DebugType>,
    lower_bound: u64,
    count: u64,
}

impl DebugArrayType {
    /// Create an array of `count` elements of `element`.
    pub fn new(
        ctx: &Context,
        module: &Module,
        element: Rc<DebugType>,
        count: u64,
        lower_bound: u64,
    ) -> Result<Self, BindError> {
        let native_array = element.native().create_array_type(ctx, count);
        Self::from_native(ctx, module, native_array, element, count, lower_bound)
    }

    /// Bind an existing native array type to its element binding.
    pub(crate) fn from_native(
        ctx: &Context,
        module: &Module,
        native_array: Rc<TypeRef>,
        element: Rc<DebugType>,
        count: u64,
        lower_bound: u64,
    ) -> Result<Self, BindError> {
        // The native element must be the element binding's native type.
        let native_element = native_array
            .element_type(ctx)
            .ok_or(BindError::ElementTypeMismatch)?;
        if native_element.handle() != element.native().handle() {
            return Err(BindError::ElementTypeMismatch);
        }

        let node = if native_array.is_sized(ctx) {
            let element_node = element.debug_node().ok_or(BindError::DebugTypeUnset)?;
            let (bit_size, bit_align) = ctx.with_ir(|ir| {
                Ok::<_, BindError>((
                    module
                        .layout()
                        .bit_size_of(&ir.types, native_array.handle())?,
                    module
                        .layout()
                        .abi_bit_alignment_of(&ir.types, native_array.handle())?,
                ))
            })?;
            let subrange = module.di().create_subrange(ctx, lower_bound, count)?;
            module.di().create_array_type(
                ctx,
                bit_size,
                u64::from(bit_align),
                &element_node,
                &[subrange],
            )?
        } else {
            // Element layout unknown: placeholder now, patched later via
            // resolve_temporary.
            let unit = module.di().compile_unit();
            module.di().create_replaceable_composite_type(
                ctx,
                DwarfTag::ArrayType,
                "",
                unit.as_ref(),
                None,
                0,
            )?
        };

        let binding = DebugType::new(ctx, native_array, Some(node))?;
        Ok(Self {
            binding,
            element,
            lower_bound,
            count,
        })
    }

    pub fn binding(&self) -> &Rc<DebugType> {
        &self.binding
    }

    /// The element binding.
    pub fn element(&self) -> &Rc<DebugType> {
        &self.element
    }

    pub fn lower_bound(&self) -> u64 {
        self.lower_bound
    }

    pub fn length(&self) -> u64 {
        self.count
    }

    /// Patch a placeholder array descriptor once the element's layout has
    /// become known.
    ///
    /// Fails when the descriptor never existed or was already resolved.
    pub fn resolve_temporary(
        &self,
        ctx: &Context,
        layout: &TargetLayout,
        di: &DiBuilder,
    ) -> Result<(), BindError> {
        let current = self.binding.debug_node().ok_or(BindError::DebugTypeUnset)?;
        if !current.is_temporary(ctx) {
            return Err(BindError::AlreadyResolved);
        }
        let element_node = self.element.debug_node().ok_or(BindError::DebugTypeUnset)?;
        let native_array = self.binding.native();
        let (bit_size, bit_align) = ctx.with_ir(|ir| {
            Ok::<_, BindError>((
                layout.bit_size_of(&ir.types, native_array.handle())?,
                layout.abi_bit_alignment_of(&ir.types, native_array.handle())?,
            ))
        })?;
        let subrange = di.create_subrange(ctx, self.lower_bound, self.count)?;
        let concrete = di.create_array_type(
            ctx,
            bit_size,
            u64::from(bit_align),
            &element_node,
            &[subrange],
        )?;
        self.binding.set_debug(ctx, concrete)
    }
}

impl Deref for DebugArrayType {
    type Target = DebugType;

    fn deref(&self) -> &DebugType {
        &self.binding
    }
}
