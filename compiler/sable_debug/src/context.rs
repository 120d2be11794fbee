//! The binding context: owner of the engine and the wrapper interning caches.
//!
//! The context is the unit of identity stability: for a given handle there is
//! exactly one wrapper allocation for the life of the context, so `Rc`
//! pointer equality answers "is this the same type/node". Everything that
//! needs to intern or look up takes the context explicitly — there is no
//! ambient global state.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_ir::{MdHandle, TypeHandle, TypeKind};

use crate::error::BindError;
use crate::native::TypeRef;
use crate::node::DiNode;

/// Top-level owner of the engine context and the wrapper caches.
///
/// Intended for a single logical writer; the interior `RefCell`s serialize
/// nothing across threads. A concurrent embedding must wrap the whole
/// context in its own mutual exclusion.
#[derive(Debug, Default)]
pub struct Context {
    ir: RefCell<sable_ir::Context>,
    types: RefCell<FxHashMap<TypeHandle, Rc<TypeRef>>>,
    nodes: RefCell<FxHashMap<MdHandle, Rc<DiNode>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only engine query.
    pub(crate) fn with_ir<R>(&self, f: impl FnOnce(&sable_ir::Context) -> R) -> R {
        f(&self.ir.borrow())
    }

    /// Run an engine mutation.
    pub(crate) fn with_ir_mut<R>(&self, f: impl FnOnce(&mut sable_ir::Context) -> R) -> R {
        f(&mut self.ir.borrow_mut())
    }

    // -- Interning caches --

    /// Get or create the wrapper for a native type handle.
    ///
    /// Reference-stable: the same handle always yields `Rc`s to the same
    /// allocation. The wrapper is registered in the cache *before* its
    /// component types are resolved, so a self-referential aggregate finds
    /// its own wrapper in the cache instead of recursing into a second
    /// construction.
    pub fn type_ref(&self, handle: TypeHandle) -> Rc<TypeRef> {
        if let Some(existing) = self.types.borrow().get(&handle) {
            return Rc::clone(existing);
        }

        let (kind, components) = self.with_ir(|ir| {
            let kind = ir.types.kind(handle);
            let mut components: Vec<TypeHandle> = Vec::new();
            match kind {
                TypeKind::Pointer => components.extend(ir.types.pointee(handle)),
                TypeKind::Array | TypeKind::Vector => {
                    components.extend(ir.types.element_type(handle));
                }
                TypeKind::Struct => components.extend_from_slice(ir.types.struct_members(handle)),
                TypeKind::Function => {
                    components.extend(ir.types.fn_return(handle));
                    components.extend_from_slice(ir.types.fn_params(handle));
                }
                _ => {}
            }
            (kind, components)
        });

        let wrapper = Rc::new(TypeRef::from_kind(handle, kind));
        tracing::trace!(?handle, ?kind, "interning type wrapper");
        self.types
            .borrow_mut()
            .insert(handle, Rc::clone(&wrapper));

        // Emplace-then-populate: now that the wrapper is visible, resolve
        // the component wrappers. Cycles terminate on the cache hit.
        for component in components {
            let _ = self.type_ref(component);
        }
        wrapper
    }

    /// Get or create the wrapper for a metadata node handle.
    ///
    /// Reference-stable like [`Context::type_ref`]. A handle retired by
    /// replace-all-uses-with is a contract violation.
    pub fn node_ref(&self, handle: MdHandle) -> Result<Rc<DiNode>, BindError> {
        if let Some(existing) = self.nodes.borrow().get(&handle) {
            return Ok(Rc::clone(existing));
        }
        let kind = self.with_ir(|ir| ir.metadata.kind(handle))?;
        let wrapper = Rc::new(DiNode::new(handle, kind));
        tracing::trace!(?handle, ?kind, "interning node wrapper");
        self.nodes
            .borrow_mut()
            .insert(handle, Rc::clone(&wrapper));
        Ok(wrapper)
    }

    /// Rewire every graph reference from `old` onto `new`, retire `old`, and
    /// evict its cache entry.
    pub(crate) fn replace_node(
        &self,
        old: &Rc<DiNode>,
        new: &Rc<DiNode>,
    ) -> Result<(), BindError> {
        let old_handle = old.handle()?;
        let new_handle = new.handle()?;
        self.with_ir_mut(|ir| ir.metadata.replace_all_uses_with(old_handle, new_handle))?;
        self.nodes.borrow_mut().remove(&old_handle);
        old.retire();
        Ok(())
    }

    /// Promote every leftover temporary node to distinct.
    pub(crate) fn resolve_temporaries(&self) -> Vec<MdHandle> {
        self.with_ir_mut(|ir| ir.metadata.resolve_all_temporaries())
    }

    // -- Native type creation --

    pub fn void_type(&self) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.void_type());
        self.type_ref(handle)
    }

    /// The 1-bit integer type.
    pub fn bool_type(&self) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.int_type(1));
        self.type_ref(handle)
    }

    pub fn int_type(&self, bits: u32) -> Result<Rc<TypeRef>, BindError> {
        if bits == 0 {
            return Err(BindError::ZeroWidthInteger);
        }
        let handle = self.with_ir_mut(|ir| ir.types.int_type(bits));
        Ok(self.type_ref(handle))
    }

    pub fn float16_type(&self) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.float16_type());
        self.type_ref(handle)
    }

    pub fn float32_type(&self) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.float32_type());
        self.type_ref(handle)
    }

    pub fn float64_type(&self) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.float64_type());
        self.type_ref(handle)
    }

    pub fn pointer_type(
        &self,
        pointee: &TypeRef,
        address_space: u32,
    ) -> Result<Rc<TypeRef>, BindError> {
        let handle =
            self.with_ir_mut(|ir| ir.types.pointer_type(pointee.handle(), address_space))?;
        Ok(self.type_ref(handle))
    }

    pub fn array_type(&self, element: &TypeRef, length: u64) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.array_type(element.handle(), length));
        self.type_ref(handle)
    }

    pub fn vector_type(&self, element: &TypeRef, length: u64) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.vector_type(element.handle(), length));
        self.type_ref(handle)
    }

    pub fn function_type(
        &self,
        ret: &TypeRef,
        params: &[Rc<TypeRef>],
        variadic: bool,
    ) -> Rc<TypeRef> {
        let param_handles: Vec<TypeHandle> = params.iter().map(|p| p.handle()).collect();
        let handle = self.with_ir_mut(|ir| {
            ir.types
                .function_type(ret.handle(), &param_handles, variadic)
        });
        self.type_ref(handle)
    }

    /// Create a fresh opaque named struct (a forward reference).
    pub fn named_struct_type(&self, name: &str) -> Rc<TypeRef> {
        let handle = self.with_ir_mut(|ir| ir.types.named_struct_type(name));
        self.type_ref(handle)
    }

    /// Intern an anonymous struct with the given body.
    pub fn literal_struct_type(&self, packed: bool, elements: &[Rc<TypeRef>]) -> Rc<TypeRef> {
        let element_handles: Vec<TypeHandle> = elements.iter().map(|e| e.handle()).collect();
        let handle =
            self.with_ir_mut(|ir| ir.types.literal_struct_type(packed, &element_handles));
        self.type_ref(handle)
    }

    /// Attach a body to an opaque named struct. Legal exactly once.
    pub fn set_struct_body(
        &self,
        target: &TypeRef,
        packed: bool,
        elements: &[Rc<TypeRef>],
    ) -> Result<(), BindError> {
        let element_handles: Vec<TypeHandle> = elements.iter().map(|e| e.handle()).collect();
        self.with_ir_mut(|ir| ir.types.set_body(target.handle(), packed, &element_handles))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn type_wrappers_are_reference_stable() {
        let ctx = Context::new();
        let a = ctx.int_type(32).unwrap();
        let b = ctx.int_type(32).unwrap();
        assert!(Rc::ptr_eq(&a, &b));

        let c = ctx.type_ref(a.handle());
        assert!(Rc::ptr_eq(&a, &c));
    }

    #[test]
    fn distinct_shapes_get_distinct_wrappers() {
        let ctx = Context::new();
        let a = ctx.int_type(8).unwrap();
        let b = ctx.int_type(16).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn structurally_equal_spellings_collapse_to_one_wrapper() {
        // "byte" and "unsigned char" both lower to an 8-bit integer: one
        // native handle, one wrapper.
        let ctx = Context::new();
        let byte = ctx.int_type(8).unwrap();
        let uchar = ctx.int_type(8).unwrap();
        assert!(Rc::ptr_eq(&byte, &uchar));
    }

    #[test]
    fn self_referential_struct_interns_once() {
        let ctx = Context::new();
        let node = ctx.named_struct_type("Node");
        let next = ctx.pointer_type(&node, 0).unwrap();
        let value = ctx.int_type(32).unwrap();
        ctx.set_struct_body(&node, false, &[Rc::clone(&next), Rc::clone(&value)])
            .unwrap();

        // Resolving the members of the struct recursively reaches the struct
        // itself through the pointer; the cache must hand back the original
        // wrapper, not a second one.
        let members = node.members(&ctx);
        let through_pointer = members[0].pointee(&ctx).unwrap();
        assert!(Rc::ptr_eq(&node, &through_pointer));
    }

    #[test]
    fn zero_width_integers_are_rejected() {
        let ctx = Context::new();
        assert_eq!(ctx.int_type(0).unwrap_err(), BindError::ZeroWidthInteger);
    }

    #[test]
    fn node_wrappers_are_reference_stable() {
        let ctx = Context::new();
        let handle = ctx.with_ir_mut(|ir| {
            ir.metadata
                .get_uniqued(sable_ir::MdKind::Tuple, &[sable_ir::MdOperand::Int(1)])
        });
        let a = ctx.node_ref(handle).unwrap();
        let b = ctx.node_ref(handle).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }
}
