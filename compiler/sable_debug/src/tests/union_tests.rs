//! Union bodies: single largest native member, all logical members at
//! offset zero.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::basic::DebugBasicType;
use crate::composite::DebugUnionType;
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfAte, DwarfTag};
use crate::member::DebugMemberInfo;

use super::{ctx_and_module, int_binding};

#[test]
fn union_native_body_is_the_largest_member() {
    let (ctx, module) = ctx_and_module();
    let u = DebugUnionType::new_placeholder(&ctx, &module, "U", None, "U", None, 0).unwrap();

    let a = int_binding(&ctx, &module, 8, "byte");
    let b = int_binding(&ctx, &module, 32, "int");
    let c = int_binding(&ctx, &module, 16, "short");
    let members = vec![
        DebugMemberInfo::new(0, "a", a),
        DebugMemberInfo::new(1, "b", b),
        DebugMemberInfo::new(2, "c", c),
    ];
    u.set_body(&ctx, &module, None, None, 0, DiFlags::empty(), members)
        .unwrap();

    // Native body collapses to one element of 32 bits.
    let native_members = u.members(&ctx);
    assert_eq!(native_members.len(), 1);
    assert_eq!(native_members[0].int_width(&ctx), 32);

    // Debug body enumerates all three logical members, each at offset 0.
    let node = u.debug_node().unwrap();
    assert_eq!(node.tag(&ctx).unwrap(), Some(DwarfTag::UnionType));
    assert_eq!(node.bit_size(&ctx).unwrap(), 32);
    let elements = node.elements(&ctx).unwrap();
    assert_eq!(elements.len(&ctx).unwrap(), 3);
    for index in 0..3 {
        let member = elements.get(&ctx, index).unwrap().unwrap();
        assert_eq!(member.0.bit_offset(&ctx).unwrap(), 0);
    }
    assert_eq!(u.debug_members().len(), 3);
}

#[test]
fn union_tie_break_picks_the_first_maximum() {
    let (ctx, module) = ctx_and_module();
    let u = DebugUnionType::new_placeholder(&ctx, &module, "T", None, "T", None, 0).unwrap();

    // Two 32-bit members of different native kinds: the integer comes first
    // and must win the tie.
    let int = int_binding(&ctx, &module, 32, "int");
    let float_native = ctx.float32_type();
    let float = DebugBasicType::new(&ctx, &module, float_native, "float", DwarfAte::Float)
        .unwrap();
    let members = vec![
        DebugMemberInfo::new(0, "i", int),
        DebugMemberInfo::new(1, "f", Rc::clone(float.binding())),
    ];
    u.set_body(&ctx, &module, None, None, 0, DiFlags::empty(), members)
        .unwrap();

    let native_members = u.members(&ctx);
    assert_eq!(native_members.len(), 1);
    assert!(native_members[0].is_integer());
}

#[test]
fn union_basis_must_be_opaque() {
    let (ctx, module) = ctx_and_module();
    let native = ctx.named_struct_type("Done");
    let int = ctx.int_type(32).unwrap();
    ctx.set_struct_body(&native, false, &[int]).unwrap();

    let err = DebugUnionType::from_native(&ctx, &module, native, None, "Done", None, 0)
        .unwrap_err();
    assert_eq!(err, BindError::UnionBasisNotOpaque);
}

#[test]
fn empty_union_body_is_rejected() {
    let (ctx, module) = ctx_and_module();
    let u = DebugUnionType::new_placeholder(&ctx, &module, "E", None, "E", None, 0).unwrap();
    let err = u
        .set_body(&ctx, &module, None, None, 0, DiFlags::empty(), vec![])
        .unwrap_err();
    assert_eq!(err, BindError::EmptyUnion);
    assert!(u.is_opaque(&ctx));
}
