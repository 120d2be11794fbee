//! Builder session lifecycle and node factories.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::composite::DebugStructType;
use crate::config::{DebugConfig, DebugLevel};
use crate::error::BindError;
use crate::flags::{DiFlags, DwarfAte, DwarfTag, SourceLanguage};

use super::ctx_and_module;

#[test]
fn finish_is_idempotent() {
    let (ctx, module) = ctx_and_module();
    assert!(!module.di().is_finished());

    module.di().finish(&ctx);
    assert!(module.di().is_finished());

    // Second call: no-op, no error, no observable difference.
    module.di().finish(&ctx);
    assert!(module.di().is_finished());
}

#[test]
fn finish_resolves_leftover_placeholders() {
    let (ctx, module) = ctx_and_module();
    let s = DebugStructType::new_placeholder(&ctx, &module, "Late", None, "Late", None, 0)
        .unwrap();
    let placeholder = s.debug_node().unwrap();
    assert!(placeholder.is_temporary(&ctx));

    module.di().finish(&ctx);

    // The placeholder was promoted: still live, no longer replaceable.
    assert!(!placeholder.is_deleted());
    assert!(!placeholder.is_temporary(&ctx));
    assert!(placeholder.is_distinct(&ctx));
}

#[test]
fn no_new_temporaries_after_finish() {
    let (ctx, module) = ctx_and_module();
    module.di().finish(&ctx);

    let err = module
        .di()
        .create_replaceable_composite_type(&ctx, DwarfTag::StructureType, "X", None, None, 0)
        .unwrap_err();
    assert_eq!(err, BindError::SessionFinished);

    // Fully resolved nodes remain legal.
    let node = module
        .di()
        .create_basic_type(&ctx, "int", 32, 32, DwarfAte::Signed)
        .unwrap();
    assert!(!node.is_temporary(&ctx));
}

#[test]
fn basic_types_and_files_are_uniqued() {
    let (ctx, module) = ctx_and_module();

    let a = module
        .di()
        .create_basic_type(&ctx, "int", 32, 32, DwarfAte::Signed)
        .unwrap();
    let b = module
        .di()
        .create_basic_type(&ctx, "int", 32, 32, DwarfAte::Signed)
        .unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(a.encoding(&ctx).unwrap(), DwarfAte::Signed.value());

    let f1 = module.di().create_file(&ctx, "lib.sb", "/src").unwrap();
    let f2 = module.di().create_file(&ctx, "lib.sb", "/src").unwrap();
    assert!(Rc::ptr_eq(&f1, &f2));
    assert_eq!(f1.name(&ctx).unwrap(), "lib.sb");
}

#[test]
fn compile_unit_records_the_config() {
    let (ctx, module) = ctx_and_module();
    let config = DebugConfig::new(DebugLevel::Full)
        .with_language(SourceLanguage::C)
        .with_producer("sable 0.1")
        .with_optimized(true);

    let file = module.di().create_file(&ctx, "main.sb", "/src").unwrap();
    let unit = module.di().create_compile_unit(&ctx, &config, &file).unwrap();

    assert!(unit.is_distinct(&ctx));
    assert!(Rc::ptr_eq(&module.di().compile_unit().unwrap(), &unit));
    assert!(Rc::ptr_eq(&unit.file(&ctx).unwrap().unwrap(), &file));
}

#[test]
fn subroutine_type_encodes_void_as_null() {
    let (ctx, module) = ctx_and_module();
    let int = module
        .di()
        .create_basic_type(&ctx, "int", 32, 32, DwarfAte::Signed)
        .unwrap();

    // void(int, <no debug info>)
    let sub = module
        .di()
        .create_subroutine_type(&ctx, DiFlags::empty(), None, &[Some(Rc::clone(&int)), None])
        .unwrap();
    assert_eq!(sub.kind(), sable_ir::MdKind::SubroutineType);

    let flags = sub.flags(&ctx).unwrap();
    assert_eq!(flags, DiFlags::empty());
}

#[test]
fn subprograms_and_variables() {
    let (ctx, module) = ctx_and_module();
    let config = DebugConfig::development().with_producer("sable test");
    let file = module.di().create_file(&ctx, "fn.sb", "/src").unwrap();
    let unit = module.di().create_compile_unit(&ctx, &config, &file).unwrap();

    let int = module
        .di()
        .create_basic_type(&ctx, "int", 32, 32, DwarfAte::Signed)
        .unwrap();
    let sub_ty = module
        .di()
        .create_subroutine_type(&ctx, DiFlags::empty(), Some(&int), &[Some(Rc::clone(&int))])
        .unwrap();
    let func = module
        .di()
        .create_subprogram(
            &ctx,
            Some(&unit),
            "add_one",
            "",
            Some(&file),
            10,
            Some(&sub_ty),
            false,
            true,
            10,
            DiFlags::PROTOTYPED,
        )
        .unwrap();
    assert!(func.is_distinct(&ctx));
    assert_eq!(func.name(&ctx).unwrap(), "add_one");
    assert_eq!(func.line(&ctx).unwrap(), 10);

    let block = module
        .di()
        .create_lexical_block(&ctx, &func, Some(&file), 11, 5)
        .unwrap();
    let param = module
        .di()
        .create_parameter_variable(
            &ctx,
            Some(&func),
            "x",
            1,
            Some(&file),
            10,
            Some(&int),
            DiFlags::empty(),
        )
        .unwrap();
    let local = module
        .di()
        .create_auto_variable(
            &ctx,
            Some(&block),
            "tmp",
            Some(&file),
            11,
            Some(&int),
            DiFlags::empty(),
        )
        .unwrap();

    assert_eq!(param.name(&ctx).unwrap(), "x");
    assert!(Rc::ptr_eq(&param.scope(&ctx).unwrap().unwrap(), &func));
    assert!(Rc::ptr_eq(&local.scope(&ctx).unwrap().unwrap(), &block));
}
