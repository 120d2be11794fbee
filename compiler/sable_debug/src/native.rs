//! Managed wrappers over native type handles.
//!
//! Exactly one [`TypeRef`] exists per (context, handle) pair; the context's
//! interning cache enforces that, so `Rc` pointer identity doubles as handle
//! identity. The wrapper caches only the kind discriminant; everything else
//! is answered live from the engine so that a struct completed by `set_body`
//! is observed through wrappers created while it was still opaque.

use std::rc::Rc;

use sable_ir::{TypeHandle, TypeKind};

use crate::context::Context;
use crate::error::BindError;

/// Variant constructed by the kind-tagged factory.
///
/// `Other` is the fallback for kinds this layer does not model (tokens,
/// labels, metadata, and whatever the engine grows next) — the factory is
/// total over the kind space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeVariant {
    Scalar,
    Pointer,
    Array,
    Vector,
    Struct,
    Function,
    Other,
}

/// The managed representation of a native type handle.
#[derive(Debug)]
pub struct TypeRef {
    handle: TypeHandle,
    kind: TypeKind,
    variant: TypeVariant,
}

impl TypeRef {
    /// Kind-tagged factory: dispatch on the discriminant to the right
    /// variant. Unlisted kinds become `Other` rather than failing, since the
    /// engine's kind space evolves independently of this layer.
    pub(crate) fn from_kind(handle: TypeHandle, kind: TypeKind) -> Self {
        let variant = match kind {
            TypeKind::Void
            | TypeKind::Integer
            | TypeKind::Float16
            | TypeKind::Float32
            | TypeKind::Float64 => TypeVariant::Scalar,
            TypeKind::Pointer => TypeVariant::Pointer,
            TypeKind::Array => TypeVariant::Array,
            TypeKind::Vector => TypeVariant::Vector,
            TypeKind::Struct => TypeVariant::Struct,
            TypeKind::Function => TypeVariant::Function,
            TypeKind::Token | TypeKind::Label | TypeKind::Metadata => TypeVariant::Other,
        };
        Self { handle, kind, variant }
    }

    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn variant(&self) -> TypeVariant {
        self.variant
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn is_integer(&self) -> bool {
        self.kind == TypeKind::Integer
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Float16 | TypeKind::Float32 | TypeKind::Float64
        )
    }

    pub fn is_pointer(&self) -> bool {
        self.variant == TypeVariant::Pointer
    }

    pub fn is_struct(&self) -> bool {
        self.variant == TypeVariant::Struct
    }

    pub fn is_function(&self) -> bool {
        self.variant == TypeVariant::Function
    }

    /// Arrays, vectors and pointers: types with a single element type.
    pub fn is_sequence(&self) -> bool {
        matches!(
            self.variant,
            TypeVariant::Array | TypeVariant::Vector | TypeVariant::Pointer
        )
    }

    pub fn is_sized(&self, ctx: &Context) -> bool {
        ctx.with_ir(|ir| ir.types.is_sized(self.handle))
    }

    /// Declared width of an integer type; zero otherwise.
    pub fn int_width(&self, ctx: &Context) -> u32 {
        ctx.with_ir(|ir| ir.types.int_width(self.handle))
    }

    /// Name of a named struct; empty for everything else (an anonymous type
    /// is a legitimate state, not an error).
    pub fn name(&self, ctx: &Context) -> String {
        ctx.with_ir(|ir| {
            ir.types
                .struct_name(self.handle)
                .map(str::to_owned)
                .unwrap_or_default()
        })
    }

    pub fn is_opaque(&self, ctx: &Context) -> bool {
        ctx.with_ir(|ir| ir.types.is_opaque(self.handle))
    }

    pub fn is_packed(&self, ctx: &Context) -> bool {
        ctx.with_ir(|ir| ir.types.is_packed(self.handle))
    }

    /// Member wrappers of a struct body; empty while opaque.
    pub fn members(&self, ctx: &Context) -> Vec<Rc<TypeRef>> {
        let handles = ctx.with_ir(|ir| ir.types.struct_members(self.handle).to_vec());
        handles.into_iter().map(|h| ctx.type_ref(h)).collect()
    }

    /// Pointee wrapper of a pointer type.
    pub fn pointee(&self, ctx: &Context) -> Option<Rc<TypeRef>> {
        ctx.with_ir(|ir| ir.types.pointee(self.handle))
            .map(|h| ctx.type_ref(h))
    }

    pub fn address_space(&self, ctx: &Context) -> u32 {
        ctx.with_ir(|ir| ir.types.address_space(self.handle))
    }

    /// Element wrapper of an array or vector type.
    pub fn element_type(&self, ctx: &Context) -> Option<Rc<TypeRef>> {
        ctx.with_ir(|ir| ir.types.element_type(self.handle))
            .map(|h| ctx.type_ref(h))
    }

    /// Element count of an array or vector; zero otherwise.
    pub fn length(&self, ctx: &Context) -> u64 {
        ctx.with_ir(|ir| ir.types.length(self.handle))
    }

    pub fn fn_return(&self, ctx: &Context) -> Option<Rc<TypeRef>> {
        ctx.with_ir(|ir| ir.types.fn_return(self.handle))
            .map(|h| ctx.type_ref(h))
    }

    pub fn fn_params(&self, ctx: &Context) -> Vec<Rc<TypeRef>> {
        let handles = ctx.with_ir(|ir| ir.types.fn_params(self.handle).to_vec());
        handles.into_iter().map(|h| ctx.type_ref(h)).collect()
    }

    pub fn is_variadic(&self, ctx: &Context) -> bool {
        ctx.with_ir(|ir| ir.types.is_variadic(self.handle))
    }

    /// Derive the native pointer-to-self type.
    pub fn create_pointer_type(
        &self,
        ctx: &Context,
        address_space: u32,
    ) -> Result<Rc<TypeRef>, BindError> {
        let handle = ctx.with_ir_mut(|ir| ir.types.pointer_type(self.handle, address_space))?;
        Ok(ctx.type_ref(handle))
    }

    /// Derive the native array-of-self type.
    pub fn create_array_type(&self, ctx: &Context, length: u64) -> Rc<TypeRef> {
        let handle = ctx.with_ir_mut(|ir| ir.types.array_type(self.handle, length));
        ctx.type_ref(handle)
    }
}
