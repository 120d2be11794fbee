//! The debug/native binding: one native type paired with zero-or-one debug
//! descriptor.
//!
//! Native types are structurally interned, so there is no strict one-to-one
//! relationship between a native type and a source-language debug type —
//! `unsigned char`, `char` and `byte` may all be the same 8-bit integer as
//! far as the engine is concerned. The binding keeps the association the
//! compiler needs, and the relationship is strictly one-way: a raw native
//! handle cannot be mapped back to a debug descriptor, since there may be
//! many to choose from.
//!
//! The two sides have different mutability rules:
//!
//! - the **native** side is write-once — reassigning it would silently alias
//!   the binding onto a different interned type;
//! - the **debug** side is an explicit three-state slot
//!   (unset / temporary / resolved). While the current node is a temporary,
//!   assigning a new node replaces all graph uses of the old one; once a
//!   resolved node is in place, no further assignment is permitted. There is
//!   no way to assign "no node".

use std::cell::RefCell;
use std::rc::Rc;

use crate::array::DebugArrayType;
use crate::basic::DebugPointerType;
use crate::context::Context;
use crate::error::BindError;
use crate::module::Module;
use crate::native::TypeRef;
use crate::node::DiNode;
use crate::write_once::WriteOnce;

/// The three states of a binding's debug side.
#[derive(Debug, Clone)]
enum DiSlot {
    Unset,
    Temporary(Rc<DiNode>),
    Resolved(Rc<DiNode>),
}

/// Pairing of a native type with an optional debug descriptor.
#[derive(Debug)]
pub struct DebugType {
    native: WriteOnce<Rc<TypeRef>>,
    debug: RefCell<DiSlot>,
}

impl DebugType {
    /// Bind a native type to an optional debug node.
    pub fn new(
        ctx: &Context,
        native: Rc<TypeRef>,
        debug: Option<Rc<DiNode>>,
    ) -> Result<Rc<Self>, BindError> {
        let binding = Rc::new(Self {
            native: WriteOnce::new(),
            debug: RefCell::new(DiSlot::Unset),
        });
        binding
            .native
            .set(native)
            .map_err(|_| BindError::NativeAlreadySet)?;
        if let Some(node) = debug {
            binding.set_debug(ctx, node)?;
        }
        Ok(binding)
    }

    /// The native type of this binding.
    pub fn native(&self) -> &Rc<TypeRef> {
        match self.native.value() {
            Some(native) => native,
            None => unreachable!("native type is assigned at construction"),
        }
    }

    /// Attempt to assign the native type. The native side is write-once and
    /// is assigned at construction, so this always fails.
    pub fn set_native(&self, native: Rc<TypeRef>) -> Result<(), BindError> {
        self.native
            .set(native)
            .map_err(|_| BindError::NativeAlreadySet)
    }

    /// Current debug node; `None` until one is assigned.
    ///
    /// `None` is ambiguous between "no debug info" and "the void type" —
    /// use [`DebugType::has_debug_info`] to disambiguate.
    pub fn debug_node(&self) -> Option<Rc<DiNode>> {
        match &*self.debug.borrow() {
            DiSlot::Unset => None,
            DiSlot::Temporary(node) | DiSlot::Resolved(node) => Some(Rc::clone(node)),
        }
    }

    /// Whether the binding carries debug information.
    ///
    /// A null debug node represents the void type, so a bare null check on
    /// [`DebugType::debug_node`] cannot distinguish "void" from "no debug
    /// info"; this predicate also accepts a void native type.
    pub fn has_debug_info(&self) -> bool {
        self.debug_node().is_some() || self.native().is_void()
    }

    /// Assign or replace the debug node.
    ///
    /// Legal transitions: unset → anything; temporary → anything, by
    /// replacing all graph uses of the current placeholder with the new
    /// node and retiring the placeholder. Once a resolved node is in place,
    /// any further assignment fails.
    pub fn set_debug(&self, ctx: &Context, node: Rc<DiNode>) -> Result<(), BindError> {
        // A retired replacement target is a contract violation up front.
        node.handle()?;
        let new_is_temporary = node.is_temporary(ctx);

        let current = self.debug.borrow().clone();
        match current {
            DiSlot::Unset => {
                tracing::trace!(temporary = new_is_temporary, "binding debug node");
            }
            DiSlot::Temporary(old) => {
                ctx.replace_node(&old, &node)?;
            }
            DiSlot::Resolved(_) => return Err(BindError::AlreadyResolved),
        }
        *self.debug.borrow_mut() = if new_is_temporary {
            DiSlot::Temporary(node)
        } else {
            DiSlot::Resolved(node)
        };
        Ok(())
    }

    /// Derive a binding of pointer-to-self shape.
    ///
    /// Requires the debug node to be present; size and alignment come from
    /// the module's layout oracle.
    pub fn create_pointer_type(
        &self,
        ctx: &Context,
        module: &Module,
        address_space: u32,
    ) -> Result<DebugPointerType, BindError> {
        let pointee = self.debug_node().ok_or(BindError::DebugTypeUnset)?;
        let native_pointer = self.native().create_pointer_type(ctx, address_space)?;
        DebugPointerType::from_native(ctx, module, native_pointer, Some(pointee), "")
    }

    /// Derive a binding of array-of-self shape.
    ///
    /// Requires the debug node to be present. The element binding of the
    /// result is a fresh pairing of this binding's native type and debug
    /// node.
    pub fn create_array_type(
        &self,
        ctx: &Context,
        module: &Module,
        lower_bound: u64,
        count: u64,
    ) -> Result<DebugArrayType, BindError> {
        let node = self.debug_node().ok_or(BindError::DebugTypeUnset)?;
        let native_array = self.native().create_array_type(ctx, count);
        let element = DebugType::new(ctx, Rc::clone(self.native()), Some(node))?;
        DebugArrayType::from_native(ctx, module, native_array, element, count, lower_bound)
    }
}
