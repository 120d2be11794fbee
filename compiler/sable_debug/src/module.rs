//! The compilation module: builder session plus injected target layout.

use sable_ir::TargetLayout;

use crate::builder::DiBuilder;

/// The unit a builder session and a layout oracle are scoped to.
///
/// The layout is injected configuration — this layer computes no target
/// sizes of its own.
pub struct Module {
    name: String,
    layout: TargetLayout,
    di: DiBuilder,
}

impl Module {
    pub fn new(name: impl Into<String>, layout: TargetLayout) -> Self {
        Self {
            name: name.into(),
            layout,
            di: DiBuilder::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target layout oracle for this module.
    pub fn layout(&self) -> &TargetLayout {
        &self.layout
    }

    /// The debug-info builder session for this module.
    pub fn di(&self) -> &DiBuilder {
        &self.di
    }
}
