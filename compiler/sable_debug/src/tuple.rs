//! Read-only typed projection over a generic operand tuple.
//!
//! Many debug-info container fields (composite element lists, enumerator
//! lists, a subprogram's retained variables) are optional tuples of operands.
//! [`TupleView`] exposes such a field as a strongly-typed collection: an
//! absent tuple behaves as a valid empty collection, and an operand that
//! fails the projection reads as `None` at that index rather than failing
//! the whole traversal.

use std::marker::PhantomData;
use std::rc::Rc;

use sable_ir::{MdKind, MdOperand};

use crate::context::Context;
use crate::error::BindError;
use crate::node::DiNode;

/// Projection from a generic metadata node to a typed element.
pub trait Project: Sized {
    /// Project a node, or `None` when the node is not of the expected type.
    fn project(node: Rc<DiNode>) -> Option<Self>;
}

/// A node of any kind; the identity projection.
impl Project for Rc<DiNode> {
    fn project(node: Rc<DiNode>) -> Option<Self> {
        Some(node)
    }
}

/// A node describing a type (basic, derived, composite or subroutine).
#[derive(Debug, Clone)]
pub struct DiTypeNode(pub Rc<DiNode>);

impl Project for DiTypeNode {
    fn project(node: Rc<DiNode>) -> Option<Self> {
        node.is_type().then(|| DiTypeNode(node))
    }
}

/// An enumerator node.
#[derive(Debug, Clone)]
pub struct DiEnumeratorNode(pub Rc<DiNode>);

impl Project for DiEnumeratorNode {
    fn project(node: Rc<DiNode>) -> Option<Self> {
        (node.kind() == MdKind::Enumerator).then(|| DiEnumeratorNode(node))
    }
}

/// A local-variable node.
#[derive(Debug, Clone)]
pub struct DiLocalVariableNode(pub Rc<DiNode>);

impl Project for DiLocalVariableNode {
    fn project(node: Rc<DiNode>) -> Option<Self> {
        (node.kind() == MdKind::LocalVariable).then(|| DiLocalVariableNode(node))
    }
}

/// Typed view over an optional operand tuple.
#[derive(Debug, Clone)]
pub struct TupleView<T> {
    tuple: Option<Rc<DiNode>>,
    _marker: PhantomData<T>,
}

impl<T: Project> TupleView<T> {
    /// Wrap an optional tuple node. `None` is a valid empty collection; a
    /// present node of any other kind is a contract violation.
    pub fn new(tuple: Option<Rc<DiNode>>) -> Result<Self, BindError> {
        if let Some(node) = &tuple {
            if node.kind() != MdKind::Tuple {
                return Err(BindError::NotATuple { found: node.kind() });
            }
        }
        Ok(Self {
            tuple,
            _marker: PhantomData,
        })
    }

    /// Number of operands in the underlying tuple; zero when absent.
    pub fn len(&self, ctx: &Context) -> Result<usize, BindError> {
        match &self.tuple {
            Some(node) => node.operand_count(ctx),
            None => Ok(0),
        }
    }

    pub fn is_empty(&self, ctx: &Context) -> Result<bool, BindError> {
        Ok(self.len(ctx)? == 0)
    }

    /// Projected element at `index`; `None` when the operand is absent, not
    /// a node, or fails the projection.
    pub fn get(&self, ctx: &Context, index: usize) -> Result<Option<T>, BindError> {
        let Some(node) = &self.tuple else {
            return Ok(None);
        };
        match node.operand(ctx, index)? {
            MdOperand::Node(handle) => Ok(T::project(ctx.node_ref(handle)?)),
            _ => Ok(None),
        }
    }

    /// Forward-only traversal of the projected elements.
    pub fn iter<'a>(
        &'a self,
        ctx: &'a Context,
    ) -> Result<impl Iterator<Item = Result<Option<T>, BindError>> + 'a, BindError> {
        let len = self.len(ctx)?;
        Ok((0..len).map(move |index| self.get(ctx, index)))
    }
}
