//! Binding-level properties: write-once native side, replace-until-resolved
//! debug side, void disambiguation, derived shapes.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::binding::DebugType;
use crate::error::BindError;
use crate::flags::DwarfTag;

use super::{ctx_and_module, int_binding};

#[test]
fn native_type_is_write_once() {
    let (ctx, module) = ctx_and_module();
    let binding = int_binding(&ctx, &module, 32, "int");

    let other = ctx.int_type(64).unwrap();
    assert_eq!(binding.set_native(other), Err(BindError::NativeAlreadySet));
    // The original association is untouched.
    assert_eq!(binding.native().int_width(&ctx), 32);
}

#[test]
fn replace_before_resolve() {
    let (ctx, module) = ctx_and_module();

    let native = ctx.named_struct_type("List");
    let temp = module
        .di()
        .create_replaceable_composite_type(&ctx, DwarfTag::StructureType, "List", None, None, 0)
        .unwrap();
    let binding = DebugType::new(&ctx, native, Some(Rc::clone(&temp))).unwrap();

    // An external reference to the placeholder.
    let pointer_node = module
        .di()
        .create_pointer_type(&ctx, "", Some(&temp), 64, 64, 0)
        .unwrap();

    // First replacement: placeholder -> resolved node. All uses rewire.
    let resolved = module
        .di()
        .create_struct_type(&ctx, None, "List", None, 0, 0, 0, crate::DiFlags::empty(), None, &[])
        .unwrap();
    binding.set_debug(&ctx, Rc::clone(&resolved)).unwrap();

    assert!(temp.is_deleted());
    let rewired = pointer_node.base_type(&ctx).unwrap().unwrap();
    assert!(Rc::ptr_eq(&rewired, &resolved));

    // Third assignment on an already-resolved binding fails.
    let another = module
        .di()
        .create_struct_type(&ctx, None, "Other", None, 0, 0, 0, crate::DiFlags::empty(), None, &[])
        .unwrap();
    assert_eq!(
        binding.set_debug(&ctx, another),
        Err(BindError::AlreadyResolved)
    );
}

#[test]
fn temporary_may_be_replaced_by_another_temporary() {
    let (ctx, module) = ctx_and_module();

    let native = ctx.named_struct_type("Fwd");
    let first = module
        .di()
        .create_replaceable_composite_type(&ctx, DwarfTag::StructureType, "Fwd", None, None, 0)
        .unwrap();
    let binding = DebugType::new(&ctx, native, Some(Rc::clone(&first))).unwrap();

    let second = module
        .di()
        .create_replaceable_composite_type(&ctx, DwarfTag::StructureType, "Fwd", None, None, 7)
        .unwrap();
    binding.set_debug(&ctx, Rc::clone(&second)).unwrap();

    assert!(first.is_deleted());
    let current = binding.debug_node().unwrap();
    assert!(Rc::ptr_eq(&current, &second));
    assert!(current.is_temporary(&ctx));
}

#[test]
fn void_disambiguation() {
    let (ctx, module) = ctx_and_module();

    // Unassigned debug node on a non-void type: no debug info.
    let plain = DebugType::new(&ctx, ctx.int_type(32).unwrap(), None).unwrap();
    assert!(plain.debug_node().is_none());
    assert!(!plain.has_debug_info());

    // A void binding carries no node either, yet it *is* debug info.
    let void = DebugType::new(&ctx, ctx.void_type(), None).unwrap();
    assert!(void.debug_node().is_none());
    assert!(void.has_debug_info());

    let with_node = int_binding(&ctx, &module, 8, "byte");
    assert!(with_node.has_debug_info());
}

#[test]
fn derived_shapes_require_a_debug_node() {
    let (ctx, module) = ctx_and_module();
    let bare = DebugType::new(&ctx, ctx.int_type(32).unwrap(), None).unwrap();

    assert_eq!(
        bare.create_pointer_type(&ctx, &module, 0).unwrap_err(),
        BindError::DebugTypeUnset
    );
    assert_eq!(
        bare.create_array_type(&ctx, &module, 0, 4).unwrap_err(),
        BindError::DebugTypeUnset
    );
}

#[test]
fn pointer_derivation_binds_pointee() {
    let (ctx, module) = ctx_and_module();
    let int = int_binding(&ctx, &module, 32, "int");

    let pointer = int.create_pointer_type(&ctx, &module, 0).unwrap();
    assert!(pointer.native().is_pointer());
    let pointee = pointer.element_type(&ctx).unwrap();
    assert!(Rc::ptr_eq(&pointee, int.native()));

    let node = pointer.debug_node().unwrap();
    assert_eq!(node.tag(&ctx).unwrap(), Some(DwarfTag::PointerType));
    assert_eq!(node.bit_size(&ctx).unwrap(), 64);
    let base = node.base_type(&ctx).unwrap().unwrap();
    assert!(Rc::ptr_eq(&base, &int.debug_node().unwrap()));
}

#[test]
fn array_derivation_binds_element() {
    let (ctx, module) = ctx_and_module();
    let int = int_binding(&ctx, &module, 32, "int");

    let array = int.create_array_type(&ctx, &module, 0, 8).unwrap();
    assert_eq!(array.length(), 8);
    assert_eq!(array.lower_bound(), 0);
    // The element binding is a fresh pairing over the same native type and
    // debug node.
    assert!(Rc::ptr_eq(array.element().native(), int.native()));
    assert!(Rc::ptr_eq(
        &array.element().debug_node().unwrap(),
        &int.debug_node().unwrap()
    ));

    let node = array.debug_node().unwrap();
    assert_eq!(node.tag(&ctx).unwrap(), Some(DwarfTag::ArrayType));
    // 8 x i32 = 256 bits.
    assert_eq!(node.bit_size(&ctx).unwrap(), 256);
}
