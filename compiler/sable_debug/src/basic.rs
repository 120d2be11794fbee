//! Bindings for non-composite shapes: scalars, pointers, and function
//! signatures.

use std::ops::Deref;
use std::rc::Rc;

use crate::binding::DebugType;
use crate::context::Context;
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfAte};
use crate::module::Module;
use crate::native::TypeRef;
use crate::node::DiNode;

/// Binding of a scalar native type with a basic-type debug node.
#[derive(Debug)]
pub struct DebugBasicType {
    binding: Rc<DebugType>,
}

impl DebugBasicType {
    /// Create a basic type named `name` over `native`, sized by the module's
    /// layout oracle.
    pub fn new(
        ctx: &Context,
        module: &Module,
        native: Rc<TypeRef>,
        name: &str,
        encoding: DwarfAte,
    ) -> Result<Self, BindError> {
        let (bit_size, bit_align) = ctx.with_ir(|ir| {
            Ok::<_, BindError>((
                module.layout().bit_size_of(&ir.types, native.handle())?,
                module.layout().abi_bit_alignment_of(&ir.types, native.handle())?,
            ))
        })?;
        let node = module.di().create_basic_type(
            ctx,
            name,
            bit_size,
            u64::from(bit_align),
            encoding,
        )?;
        let binding = DebugType::new(ctx, native, Some(node))?;
        Ok(Self { binding })
    }

    pub fn binding(&self) -> &Rc<DebugType> {
        &self.binding
    }

    pub fn name(&self, ctx: &Context) -> Result<String, BindError> {
        match self.binding.debug_node() {
            Some(node) => node.name(ctx),
            None => Ok(String::new()),
        }
    }
}

impl Deref for DebugBasicType {
    type Target = DebugType;

    fn deref(&self) -> &DebugType {
        &self.binding
    }
}

/// Binding of a native pointer type with a pointer debug node.
#[derive(Debug)]
pub struct DebugPointerType {
    binding: Rc<DebugType>,
}

impl DebugPointerType {
    /// Create a pointer to `element`. A pointee without a debug node is
    /// legitimate (a pointer to a type with no debug information).
    pub fn new(
        ctx: &Context,
        module: &Module,
        element: &DebugType,
        address_space: u32,
        name: &str,
    ) -> Result<Self, BindError> {
        let native_pointer = element.native().create_pointer_type(ctx, address_space)?;
        Self::from_native(ctx, module, native_pointer, element.debug_node(), name)
    }

    pub(crate) fn from_native(
        ctx: &Context,
        module: &Module,
        native_pointer: Rc<TypeRef>,
        pointee: Option<Rc<DiNode>>,
        name: &str,
    ) -> Result<Self, BindError> {
        let (bit_size, bit_align) = ctx.with_ir(|ir| {
            Ok::<_, BindError>((
                module
                    .layout()
                    .bit_size_of(&ir.types, native_pointer.handle())?,
                module
                    .layout()
                    .abi_bit_alignment_of(&ir.types, native_pointer.handle())?,
            ))
        })?;
        let node = module.di().create_pointer_type(
            ctx,
            name,
            pointee.as_ref(),
            bit_size,
            u64::from(bit_align),
            native_pointer.address_space(ctx),
        )?;
        let binding = DebugType::new(ctx, native_pointer, Some(node))?;
        Ok(Self { binding })
    }

    pub fn binding(&self) -> &Rc<DebugType> {
        &self.binding
    }

    pub fn address_space(&self, ctx: &Context) -> u32 {
        self.binding.native().address_space(ctx)
    }

    /// Native type of the pointee.
    pub fn element_type(&self, ctx: &Context) -> Option<Rc<TypeRef>> {
        self.binding.native().pointee(ctx)
    }
}

impl Deref for DebugPointerType {
    type Target = DebugType;

    fn deref(&self) -> &DebugType {
        &self.binding
    }
}

/// Binding of a native function signature with a subroutine-type debug node.
///
/// Signatures are unnamed interned types, so one native signature may serve
/// several source signatures (pass-by-value lowered through a pointer, for
/// example); the binding keeps the source-level association.
#[derive(Debug)]
pub struct DebugFunctionType {
    binding: Rc<DebugType>,
}

impl DebugFunctionType {
    /// Create a signature binding. A return or parameter binding without a
    /// debug node contributes a null slot (void / no debug info).
    pub fn new(
        ctx: &Context,
        module: &Module,
        flags: DiFlags,
        return_type: &DebugType,
        params: &[Rc<DebugType>],
        variadic: bool,
    ) -> Result<Self, BindError> {
        let param_natives: Vec<Rc<TypeRef>> =
            params.iter().map(|p| Rc::clone(p.native())).collect();
        let native = ctx.function_type(return_type.native(), &param_natives, variadic);

        let param_nodes: Vec<Option<Rc<DiNode>>> =
            params.iter().map(|p| p.debug_node()).collect();
        let node = module.di().create_subroutine_type(
            ctx,
            flags,
            return_type.debug_node().as_ref(),
            &param_nodes,
        )?;
        let binding = DebugType::new(ctx, native, Some(node))?;
        Ok(Self { binding })
    }

    pub fn binding(&self) -> &Rc<DebugType> {
        &self.binding
    }

    pub fn is_variadic(&self, ctx: &Context) -> bool {
        self.binding.native().is_variadic(ctx)
    }

    pub fn return_type(&self, ctx: &Context) -> Option<Rc<TypeRef>> {
        self.binding.native().fn_return(ctx)
    }

    pub fn parameter_types(&self, ctx: &Context) -> Vec<Rc<TypeRef>> {
        self.binding.native().fn_params(ctx)
    }
}

impl Deref for DebugFunctionType {
    type Target = DebugType;

    fn deref(&self) -> &DebugType {
        &self.binding
    }
}
