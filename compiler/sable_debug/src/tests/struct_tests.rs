//! The forward-declaration protocol for structs.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::composite::DebugStructType;
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfTag};
use crate::member::{DebugMemberInfo, MemberLayout};

use super::{ctx_and_module, int_binding};

#[test]
fn placeholder_is_opaque_and_memberless() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "S", None, "S", None, 0).unwrap();

    assert!(s.is_opaque(&ctx));
    assert!(s.members(&ctx).is_empty());
    assert!(s.debug_members().is_empty());
    assert_eq!(s.name(&ctx), "S");
    assert_eq!(s.source_name(&ctx).unwrap(), "S");
    assert!(s.debug_node().unwrap().is_temporary(&ctx));
}

#[test]
fn set_body_resolves_the_placeholder() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Pair", None, "Pair", None, 3)
        .unwrap();
    let placeholder = s.debug_node().unwrap();

    let a = int_binding(&ctx, &module, 32, "int");
    let b = int_binding(&ctx, &module, 8, "byte");
    let members = vec![
        DebugMemberInfo::new(0, "a", Rc::clone(&a)),
        DebugMemberInfo::new(1, "b", Rc::clone(&b)),
    ];
    s.set_body(&ctx, &module, false, None, None, 3, DiFlags::empty(), members)
        .unwrap();

    assert!(!s.is_opaque(&ctx));
    assert_eq!(s.members(&ctx).len(), 2);
    assert_eq!(s.debug_members().len(), 2);
    assert!(placeholder.is_deleted());

    let node = s.debug_node().unwrap();
    assert_eq!(node.tag(&ctx).unwrap(), Some(DwarfTag::StructureType));
    assert_eq!(node.name(&ctx).unwrap(), "Pair");
    // { i32, i8 } on the default target: 8 bytes with tail padding.
    assert_eq!(node.bit_size(&ctx).unwrap(), 64);

    // Member nodes carry oracle-derived offsets.
    let elements = node.elements(&ctx).unwrap();
    assert_eq!(elements.len(&ctx).unwrap(), 2);
    let second = elements.get(&ctx, 1).unwrap().unwrap();
    assert_eq!(second.0.name(&ctx).unwrap(), "b");
    assert_eq!(second.0.bit_offset(&ctx).unwrap(), 32);
}

#[test]
fn round_trip_self_referential_struct() {
    let (ctx, module) = ctx_and_module();

    // struct Node { next: Node*, value: i32 }
    let node_ty =
        DebugStructType::new_placeholder(&ctx, &module, "Node", None, "Node", None, 1).unwrap();
    let next = node_ty
        .binding()
        .create_pointer_type(&ctx, &module, 0)
        .unwrap();
    let value = int_binding(&ctx, &module, 32, "i32");

    let members = vec![
        DebugMemberInfo::new(0, "next", Rc::clone(next.binding())),
        DebugMemberInfo::new(1, "value", Rc::clone(&value)),
    ];
    node_ty
        .set_body(&ctx, &module, false, None, None, 1, DiFlags::empty(), members)
        .unwrap();

    assert!(!node_ty.is_opaque(&ctx));
    assert_eq!(node_ty.members(&ctx).len(), 2);

    // Structural self-reference intact on the native side: the pointer
    // member's element type is the struct wrapper itself.
    let native_members = node_ty.members(&ctx);
    let through_pointer = native_members[0].pointee(&ctx).unwrap();
    assert!(Rc::ptr_eq(&through_pointer, node_ty.binding().native()));

    // And on the debug side: the pointer node now points at the resolved
    // composite, transitively through the member node.
    let composite = node_ty.debug_node().unwrap();
    let elements = composite.elements(&ctx).unwrap();
    let next_member = elements.get(&ctx, 0).unwrap().unwrap();
    let pointer_node = next_member.0.base_type(&ctx).unwrap().unwrap();
    let pointee_node = pointer_node.base_type(&ctx).unwrap().unwrap();
    assert!(Rc::ptr_eq(&pointee_node, &composite));
}

#[test]
fn second_set_body_is_rejected() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Once", None, "Once", None, 0)
        .unwrap();
    let int = int_binding(&ctx, &module, 32, "int");

    s.set_body(
        &ctx,
        &module,
        false,
        None,
        None,
        0,
        DiFlags::empty(),
        vec![DebugMemberInfo::new(0, "x", Rc::clone(&int))],
    )
    .unwrap();

    let err = s
        .set_body(
            &ctx,
            &module,
            false,
            None,
            None,
            0,
            DiFlags::empty(),
            vec![DebugMemberInfo::new(0, "y", int)],
        )
        .unwrap_err();
    assert_eq!(err, BindError::AlreadyResolved);
}

#[test]
fn mixed_layout_policy_is_rejected() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Mix", None, "Mix", None, 0)
        .unwrap();
    let int = int_binding(&ctx, &module, 32, "int");

    let members = vec![
        DebugMemberInfo::new(0, "a", Rc::clone(&int)).with_layout(MemberLayout {
            bit_size: 32,
            bit_align: 32,
            bit_offset: 0,
        }),
        DebugMemberInfo::new(1, "b", int),
    ];
    let err = s
        .set_body(&ctx, &module, true, None, None, 0, DiFlags::empty(), members)
        .unwrap_err();
    assert_eq!(err, BindError::MixedMemberLayout);
    // The failed call must not have attached a body.
    assert!(s.is_opaque(&ctx));
}

#[test]
fn explicit_layout_requires_packed() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Exp", None, "Exp", None, 0)
        .unwrap();
    let int = int_binding(&ctx, &module, 32, "int");

    let members = vec![DebugMemberInfo::new(0, "a", int).with_layout(MemberLayout {
        bit_size: 32,
        bit_align: 32,
        bit_offset: 0,
    })];
    let err = s
        .set_body(&ctx, &module, false, None, None, 0, DiFlags::empty(), members)
        .unwrap_err();
    assert_eq!(err, BindError::ExplicitLayoutRequiresPacked);
}

#[test]
fn explicit_layout_overrides_the_oracle() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Raw", None, "Raw", None, 0)
        .unwrap();
    let int = int_binding(&ctx, &module, 32, "int");

    let members = vec![
        DebugMemberInfo::new(0, "lo", Rc::clone(&int)).with_layout(MemberLayout {
            bit_size: 16,
            bit_align: 16,
            bit_offset: 0,
        }),
        DebugMemberInfo::new(1, "hi", int).with_layout(MemberLayout {
            bit_size: 16,
            bit_align: 16,
            bit_offset: 16,
        }),
    ];
    s.set_body(&ctx, &module, true, None, None, 0, DiFlags::empty(), members)
        .unwrap();

    let elements = s.debug_node().unwrap().elements(&ctx).unwrap();
    let hi = elements.get(&ctx, 1).unwrap().unwrap();
    assert_eq!(hi.0.bit_size(&ctx).unwrap(), 16);
    assert_eq!(hi.0.bit_offset(&ctx).unwrap(), 16);
}

#[test]
fn member_indices_must_match_positions() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Idx", None, "Idx", None, 0)
        .unwrap();
    let int = int_binding(&ctx, &module, 32, "int");

    let members = vec![
        DebugMemberInfo::new(1, "a", Rc::clone(&int)),
        DebugMemberInfo::new(0, "b", int),
    ];
    let err = s
        .set_body(&ctx, &module, false, None, None, 0, DiFlags::empty(), members)
        .unwrap_err();
    assert_eq!(err, BindError::MemberIndexMismatch { expected: 0, found: 1 });
}

#[test]
fn one_step_construction_still_resolves_through_a_placeholder() {
    let (ctx, module) = ctx_and_module();
    let int = int_binding(&ctx, &module, 64, "long");

    let s = DebugStructType::new_with_body(
        &ctx,
        &module,
        "Whole",
        None,
        "Whole",
        None,
        9,
        DiFlags::empty(),
        false,
        vec![DebugMemberInfo::new(0, "x", int)],
    )
    .unwrap();

    assert!(!s.is_opaque(&ctx));
    let node = s.debug_node().unwrap();
    assert!(!node.is_temporary(&ctx));
    assert_eq!(node.line(&ctx).unwrap(), 9);
}
