//! The debug-metadata node graph.
//!
//! Nodes are a kind plus an ordered operand list. Three creation modes exist,
//! mirroring how a code generator's metadata layer defers uniquing until
//! forward references are known:
//!
//! - **uniqued**: deduplicated by `(kind, operands)` — creating the same node
//!   twice returns the same handle;
//! - **distinct**: fresh identity every time, never merged, never replaced;
//! - **temporary**: fresh identity with a unique placeholder number; the only
//!   mode on which [`MetadataGraph::replace_all_uses_with`] is legal.
//!
//! Replace-all-uses-with rewires every operand edge that pointed at the old
//! node onto the new node and then retires the old node's slot. Because every
//! reference in the graph is an operand edge, no dangling reference survives.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::IrError;

/// Opaque identity of a metadata node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MdHandle(u32);

impl MdHandle {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Discriminant of a metadata node.
///
/// `Generic` is the fallback for node categories this layer does not model;
/// the kind space evolves independently of consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MdKind {
    String,
    Tuple,
    File,
    CompileUnit,
    BasicType,
    DerivedType,
    CompositeType,
    SubroutineType,
    Subprogram,
    LexicalBlock,
    LocalVariable,
    GlobalVariable,
    Enumerator,
    Subrange,
    Expression,
    Generic,
}

/// One operand slot of a metadata node.
///
/// `Null` is a legitimate value — optional references (missing scope, missing
/// file) are encoded as explicit null operands, not as shorter operand lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MdOperand {
    Null,
    Node(MdHandle),
    Str(Box<str>),
    Int(u64),
}

impl MdOperand {
    pub fn as_node(&self) -> Option<MdHandle> {
        match self {
            MdOperand::Node(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MdOperand::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            MdOperand::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// Convenience for building operand lists from optional node references.
pub fn node_or_null(node: Option<MdHandle>) -> MdOperand {
    match node {
        Some(handle) => MdOperand::Node(handle),
        None => MdOperand::Null,
    }
}

type Operands = SmallVec<[MdOperand; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Uniqued,
    Distinct,
    Temporary { temp_id: u32 },
}

#[derive(Debug)]
struct NodeData {
    kind: MdKind,
    operands: Operands,
    mode: Mode,
}

/// Context-owned metadata graph.
///
/// Single-writer, like the type pool: the owning context serializes all
/// mutation.
#[derive(Debug, Default)]
pub struct MetadataGraph {
    /// Slot per node; `None` marks a node retired by replace-all-uses-with.
    nodes: Vec<Option<NodeData>>,
    /// `(kind, operands)` → handle uniquing map for uniqued nodes.
    uniqued: FxHashMap<(MdKind, Box<[MdOperand]>), MdHandle>,
    next_temp_id: u32,
}

impl MetadataGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: MdKind, operands: Operands, mode: Mode) -> MdHandle {
        let handle = MdHandle(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Some(NodeData { kind, operands, mode }));
        handle
    }

    fn data(&self, handle: MdHandle) -> Result<&NodeData, IrError> {
        self.nodes[handle.index()]
            .as_ref()
            .ok_or(IrError::DeletedNode { handle })
    }

    // -- Creation --

    /// Get or create a uniqued node. Equal kind and operands yield the same
    /// handle.
    pub fn get_uniqued(&mut self, kind: MdKind, operands: &[MdOperand]) -> MdHandle {
        let key = (kind, operands.to_vec().into_boxed_slice());
        if let Some(&existing) = self.uniqued.get(&key) {
            return existing;
        }
        let handle = self.push(kind, operands.iter().cloned().collect(), Mode::Uniqued);
        tracing::trace!(?handle, ?kind, "uniqued metadata node");
        self.uniqued.insert(key, handle);
        handle
    }

    /// Create a distinct node: fresh identity, never merged, never replaced.
    pub fn create_distinct(&mut self, kind: MdKind, operands: &[MdOperand]) -> MdHandle {
        let handle = self.push(kind, operands.iter().cloned().collect(), Mode::Distinct);
        tracing::trace!(?handle, ?kind, "distinct metadata node");
        handle
    }

    /// Create a temporary placeholder node: fresh identity, uniquely
    /// numbered, replaceable until resolved.
    pub fn create_temporary(&mut self, kind: MdKind, operands: &[MdOperand]) -> MdHandle {
        let temp_id = self.next_temp_id;
        self.next_temp_id += 1;
        let handle = self.push(
            kind,
            operands.iter().cloned().collect(),
            Mode::Temporary { temp_id },
        );
        tracing::trace!(?handle, ?kind, temp_id, "temporary metadata node");
        handle
    }

    /// Get or create the uniqued string node for `value`.
    pub fn get_string(&mut self, value: &str) -> MdHandle {
        self.get_uniqued(MdKind::String, &[MdOperand::Str(value.into())])
    }

    /// Get or create a uniqued operand tuple.
    pub fn get_tuple(&mut self, operands: &[MdOperand]) -> MdHandle {
        self.get_uniqued(MdKind::Tuple, operands)
    }

    // -- Replacement & resolution --

    /// Rewire every reference to `old` onto `new`, then retire `old`.
    ///
    /// `old` must be a live temporary. Uniqued nodes whose operands were
    /// rewritten are re-registered under their new key; when the new key is
    /// already taken by another node, the rewritten node is demoted to
    /// distinct rather than merged (the existing node stays canonical for
    /// future uniqued lookups).
    pub fn replace_all_uses_with(&mut self, old: MdHandle, new: MdHandle) -> Result<(), IrError> {
        if old == new {
            return Err(IrError::SelfReplacement { handle: old });
        }
        let old_data = self.data(old)?;
        if !matches!(old_data.mode, Mode::Temporary { .. }) {
            return Err(IrError::NotATemporary { handle: old });
        }
        // new must be live too
        self.data(new)?;

        tracing::debug!(?old, ?new, "replace-all-uses-with");

        let mut rewritten: Vec<MdHandle> = Vec::new();
        for index in 0..self.nodes.len() {
            let Some(node) = self.nodes[index].as_ref() else { continue };
            let uses_old = node
                .operands
                .iter()
                .any(|op| matches!(op, MdOperand::Node(h) if *h == old));
            if !uses_old {
                continue;
            }
            // Uniqued nodes are re-keyed: drop the stale entry before the
            // operands change out from under it.
            if node.mode == Mode::Uniqued {
                let stale_key = (node.kind, node.operands.to_vec().into_boxed_slice());
                self.uniqued.remove(&stale_key);
                rewritten.push(MdHandle(u32::try_from(index).unwrap_or(u32::MAX)));
            }
            if let Some(node) = self.nodes[index].as_mut() {
                for operand in &mut node.operands {
                    if matches!(operand, MdOperand::Node(h) if *h == old) {
                        *operand = MdOperand::Node(new);
                    }
                }
            }
        }

        // Re-register rewritten uniqued nodes under their new keys. When the
        // new key is already taken by another node, the existing node stays
        // canonical and the rewritten one is demoted to distinct.
        for handle in rewritten {
            let Some(node) = self.nodes[handle.index()].as_ref() else {
                continue;
            };
            let new_key = (node.kind, node.operands.to_vec().into_boxed_slice());
            match self.uniqued.get(&new_key) {
                Some(&existing) if existing != handle => {
                    tracing::trace!(
                        ?handle,
                        ?existing,
                        "uniquing collision after rewrite; demoting"
                    );
                    if let Some(node) = self.nodes[handle.index()].as_mut() {
                        node.mode = Mode::Distinct;
                    }
                }
                Some(_) => {}
                None => {
                    self.uniqued.insert(new_key, handle);
                }
            }
        }

        self.nodes[old.index()] = None;
        Ok(())
    }

    /// Promote every live temporary to a distinct node, ending its
    /// replaceability. Returns the promoted handles.
    pub fn resolve_all_temporaries(&mut self) -> Vec<MdHandle> {
        let mut promoted = Vec::new();
        for (index, slot) in self.nodes.iter_mut().enumerate() {
            let Some(node) = slot.as_mut() else { continue };
            if matches!(node.mode, Mode::Temporary { .. }) {
                node.mode = Mode::Distinct;
                promoted.push(MdHandle(u32::try_from(index).unwrap_or(u32::MAX)));
            }
        }
        if !promoted.is_empty() {
            tracing::debug!(count = promoted.len(), "resolved leftover temporaries");
        }
        promoted
    }

    // -- Queries --

    pub fn kind(&self, handle: MdHandle) -> Result<MdKind, IrError> {
        Ok(self.data(handle)?.kind)
    }

    pub fn is_deleted(&self, handle: MdHandle) -> bool {
        self.nodes[handle.index()].is_none()
    }

    pub fn is_temporary(&self, handle: MdHandle) -> bool {
        self.nodes[handle.index()]
            .as_ref()
            .is_some_and(|n| matches!(n.mode, Mode::Temporary { .. }))
    }

    pub fn is_distinct(&self, handle: MdHandle) -> bool {
        self.nodes[handle.index()]
            .as_ref()
            .is_some_and(|n| n.mode == Mode::Distinct)
    }

    pub fn is_uniqued(&self, handle: MdHandle) -> bool {
        self.nodes[handle.index()]
            .as_ref()
            .is_some_and(|n| n.mode == Mode::Uniqued)
    }

    /// Unique placeholder number of a temporary node.
    pub fn temp_id(&self, handle: MdHandle) -> Option<u32> {
        match self.nodes[handle.index()].as_ref()?.mode {
            Mode::Temporary { temp_id } => Some(temp_id),
            _ => None,
        }
    }

    pub fn operand_count(&self, handle: MdHandle) -> Result<usize, IrError> {
        Ok(self.data(handle)?.operands.len())
    }

    /// Operand at `index`, or `Null` when past the end of the list.
    pub fn operand(&self, handle: MdHandle, index: usize) -> Result<MdOperand, IrError> {
        Ok(self
            .data(handle)?
            .operands
            .get(index)
            .cloned()
            .unwrap_or(MdOperand::Null))
    }

    pub fn operands(&self, handle: MdHandle) -> Result<&[MdOperand], IrError> {
        Ok(&self.data(handle)?.operands)
    }
}
