//! Structurally interned native types.
//!
//! The pool deduplicates type shapes: interning the same shape twice yields
//! the same [`TypeHandle`], so handle equality is structural equality. The one
//! exception is named structs, which are *identified* rather than interned —
//! two named structs are distinct types even when their bodies match, and a
//! named struct may exist in an opaque (bodyless) state so that recursive and
//! mutually-referential types can be built up front and completed later via
//! [`TypePool::set_body`].

use rustc_hash::FxHashMap;

use crate::error::IrError;

/// Opaque identity of an interned native type.
///
/// Handles are only meaningful relative to the [`TypePool`] that produced
/// them; they carry no lifetime and are cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(u32);

impl TypeHandle {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Discriminant of a native type.
///
/// The kind space grows as the engine grows; consumers must treat kinds they
/// do not recognize as opaque scalars rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Integer,
    Float16,
    Float32,
    Float64,
    Pointer,
    Array,
    Vector,
    Struct,
    Function,
    Token,
    Label,
    Metadata,
}

/// Structural shape of an interned type.
///
/// Shapes are the uniquing key: equal shape implies equal handle. Named
/// structs never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    Void,
    Int { bits: u32 },
    Float16,
    Float32,
    Float64,
    Token,
    Label,
    Metadata,
    Pointer { pointee: TypeHandle, address_space: u32 },
    Array { element: TypeHandle, length: u64 },
    Vector { element: TypeHandle, length: u64 },
    Function { ret: TypeHandle, params: Box<[TypeHandle]>, variadic: bool },
    /// Anonymous (literal) struct; interned like any other shape.
    Literal { packed: bool, elements: Box<[TypeHandle]> },
}

/// Body of a named struct once [`TypePool::set_body`] has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructBody {
    pub packed: bool,
    pub elements: Vec<TypeHandle>,
}

#[derive(Debug)]
enum TypeEntry {
    Interned(TypeData),
    NamedStruct { name: Box<str>, body: Option<StructBody> },
}

/// Context-owned store of native types.
///
/// Single-writer: the owning context serializes all mutation (there is no
/// internal synchronization).
#[derive(Debug, Default)]
pub struct TypePool {
    entries: Vec<TypeEntry>,
    /// Shape → handle uniquing map. Interning the same `TypeData` twice
    /// returns the original handle.
    interned: FxHashMap<TypeData, TypeHandle>,
}

impl TypePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, data: TypeData) -> TypeHandle {
        if let Some(&existing) = self.interned.get(&data) {
            return existing;
        }
        let handle = TypeHandle(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        tracing::trace!(?handle, ?data, "interning type shape");
        self.interned.insert(data.clone(), handle);
        self.entries.push(TypeEntry::Interned(data));
        handle
    }

    // -- Creation --

    pub fn void_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Void)
    }

    /// Intern an integer type of the given width.
    ///
    /// A zero width is a caller bug; widths are validated at the binding
    /// layer before reaching the pool.
    pub fn int_type(&mut self, bits: u32) -> TypeHandle {
        debug_assert!(bits > 0, "integer width must be non-zero");
        self.intern(TypeData::Int { bits })
    }

    pub fn float16_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Float16)
    }

    pub fn float32_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Float32)
    }

    pub fn float64_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Float64)
    }

    pub fn token_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Token)
    }

    pub fn label_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Label)
    }

    pub fn metadata_type(&mut self) -> TypeHandle {
        self.intern(TypeData::Metadata)
    }

    /// Intern a pointer type. Pointers to void are rejected; point at an
    /// 8-bit integer instead.
    pub fn pointer_type(
        &mut self,
        pointee: TypeHandle,
        address_space: u32,
    ) -> Result<TypeHandle, IrError> {
        if self.kind(pointee) == TypeKind::Void {
            return Err(IrError::PointerToVoid);
        }
        Ok(self.intern(TypeData::Pointer { pointee, address_space }))
    }

    pub fn array_type(&mut self, element: TypeHandle, length: u64) -> TypeHandle {
        self.intern(TypeData::Array { element, length })
    }

    pub fn vector_type(&mut self, element: TypeHandle, length: u64) -> TypeHandle {
        self.intern(TypeData::Vector { element, length })
    }

    pub fn function_type(
        &mut self,
        ret: TypeHandle,
        params: &[TypeHandle],
        variadic: bool,
    ) -> TypeHandle {
        self.intern(TypeData::Function {
            ret,
            params: params.into(),
            variadic,
        })
    }

    /// Intern an anonymous struct with the given element list.
    pub fn literal_struct_type(
        &mut self,
        packed: bool,
        elements: &[TypeHandle],
    ) -> TypeHandle {
        self.intern(TypeData::Literal {
            packed,
            elements: elements.into(),
        })
    }

    /// Create a fresh named struct in the opaque state.
    ///
    /// Named structs are identified, not interned: every call yields a new
    /// handle, even for a name seen before. Use an empty name for anonymous
    /// identified structs.
    pub fn named_struct_type(&mut self, name: &str) -> TypeHandle {
        let handle = TypeHandle(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        tracing::trace!(?handle, name, "creating named struct");
        self.entries.push(TypeEntry::NamedStruct {
            name: name.into(),
            body: None,
        });
        handle
    }

    /// Attach a body to an opaque named struct. Legal exactly once.
    pub fn set_body(
        &mut self,
        handle: TypeHandle,
        packed: bool,
        elements: &[TypeHandle],
    ) -> Result<(), IrError> {
        match &mut self.entries[handle.index()] {
            TypeEntry::NamedStruct { body, .. } => {
                if body.is_some() {
                    return Err(IrError::BodyAlreadySet { handle });
                }
                *body = Some(StructBody {
                    packed,
                    elements: elements.to_vec(),
                });
                Ok(())
            }
            TypeEntry::Interned(_) => Err(IrError::NotAStruct { handle }),
        }
    }

    // -- Queries --
    //
    // Handles are assumed to originate from this pool; an out-of-range
    // handle (one from another context) panics on the slot index.

    pub fn kind(&self, handle: TypeHandle) -> TypeKind {
        match &self.entries[handle.index()] {
            TypeEntry::NamedStruct { .. } => TypeKind::Struct,
            TypeEntry::Interned(data) => match data {
                TypeData::Void => TypeKind::Void,
                TypeData::Int { .. } => TypeKind::Integer,
                TypeData::Float16 => TypeKind::Float16,
                TypeData::Float32 => TypeKind::Float32,
                TypeData::Float64 => TypeKind::Float64,
                TypeData::Token => TypeKind::Token,
                TypeData::Label => TypeKind::Label,
                TypeData::Metadata => TypeKind::Metadata,
                TypeData::Pointer { .. } => TypeKind::Pointer,
                TypeData::Array { .. } => TypeKind::Array,
                TypeData::Vector { .. } => TypeKind::Vector,
                TypeData::Function { .. } => TypeKind::Function,
                TypeData::Literal { .. } => TypeKind::Struct,
            },
        }
    }

    /// Whether the type has a size under a target layout. Opaque structs and
    /// function types are unsized; so are void, token, label and metadata.
    /// Aggregates are sized only when every element is.
    pub fn is_sized(&self, handle: TypeHandle) -> bool {
        match &self.entries[handle.index()] {
            TypeEntry::NamedStruct { body, .. } => body
                .as_ref()
                .is_some_and(|b| b.elements.iter().all(|&e| self.is_sized(e))),
            TypeEntry::Interned(data) => match data {
                TypeData::Void
                | TypeData::Token
                | TypeData::Label
                | TypeData::Metadata
                | TypeData::Function { .. } => false,
                TypeData::Array { element, .. } | TypeData::Vector { element, .. } => {
                    self.is_sized(*element)
                }
                TypeData::Literal { elements, .. } => {
                    elements.iter().all(|&e| self.is_sized(e))
                }
                _ => true,
            },
        }
    }

    /// Declared width of an integer type; zero for everything else.
    pub fn int_width(&self, handle: TypeHandle) -> u32 {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Int { bits }) => *bits,
            _ => 0,
        }
    }

    /// Pointee of a pointer type.
    pub fn pointee(&self, handle: TypeHandle) -> Option<TypeHandle> {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Pointer { pointee, .. }) => Some(*pointee),
            _ => None,
        }
    }

    /// Address space of a pointer type; zero for everything else.
    pub fn address_space(&self, handle: TypeHandle) -> u32 {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Pointer { address_space, .. }) => *address_space,
            _ => 0,
        }
    }

    /// Element type of an array or vector.
    pub fn element_type(&self, handle: TypeHandle) -> Option<TypeHandle> {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Array { element, .. } | TypeData::Vector { element, .. }) => {
                Some(*element)
            }
            _ => None,
        }
    }

    /// Element count of an array or vector; zero for everything else.
    pub fn length(&self, handle: TypeHandle) -> u64 {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Array { length, .. } | TypeData::Vector { length, .. }) => {
                *length
            }
            _ => 0,
        }
    }

    /// Name of a named struct; `None` for literal structs and non-structs.
    pub fn struct_name(&self, handle: TypeHandle) -> Option<&str> {
        match &self.entries[handle.index()] {
            TypeEntry::NamedStruct { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether a struct is still bodyless. Non-structs are never opaque.
    pub fn is_opaque(&self, handle: TypeHandle) -> bool {
        matches!(
            &self.entries[handle.index()],
            TypeEntry::NamedStruct { body: None, .. }
        )
    }

    pub fn is_packed(&self, handle: TypeHandle) -> bool {
        match &self.entries[handle.index()] {
            TypeEntry::NamedStruct { body: Some(body), .. } => body.packed,
            TypeEntry::Interned(TypeData::Literal { packed, .. }) => *packed,
            _ => false,
        }
    }

    /// Member types of a struct body. Opaque structs report an empty list —
    /// opaque implies no members, not an error.
    pub fn struct_members(&self, handle: TypeHandle) -> &[TypeHandle] {
        match &self.entries[handle.index()] {
            TypeEntry::NamedStruct { body: Some(body), .. } => &body.elements,
            TypeEntry::Interned(TypeData::Literal { elements, .. }) => elements,
            _ => &[],
        }
    }

    pub fn fn_return(&self, handle: TypeHandle) -> Option<TypeHandle> {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Function { ret, .. }) => Some(*ret),
            _ => None,
        }
    }

    pub fn fn_params(&self, handle: TypeHandle) -> &[TypeHandle] {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Function { params, .. }) => params,
            _ => &[],
        }
    }

    pub fn is_variadic(&self, handle: TypeHandle) -> bool {
        match &self.entries[handle.index()] {
            TypeEntry::Interned(TypeData::Function { variadic, .. }) => *variadic,
            _ => false,
        }
    }

    /// Number of types in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
