//! Scenario tests for the binding and resolution layer.

use std::rc::Rc;

use sable_ir::TargetLayout;

use crate::basic::DebugBasicType;
use crate::binding::DebugType;
use crate::context::Context;
use crate::flags::DwarfAte;
use crate::module::Module;

mod binding_tests;
mod builder_tests;
mod struct_tests;
mod union_tests;

/// Install a tracing subscriber honoring `RUST_LOG`, once per process.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A fresh context and module on the default 64-bit target.
fn ctx_and_module() -> (Context, Module) {
    init_tracing();
    let ctx = Context::new();
    let module = Module::new("test", TargetLayout::host_default());
    (ctx, module)
}

/// A signed-integer binding of the given width.
fn int_binding(ctx: &Context, module: &Module, bits: u32, name: &str) -> Rc<DebugType> {
    let native = ctx.int_type(bits).expect("non-zero width");
    let basic = DebugBasicType::new(ctx, module, native, name, DwarfAte::Signed)
        .expect("basic type creation");
    Rc::clone(basic.binding())
}
