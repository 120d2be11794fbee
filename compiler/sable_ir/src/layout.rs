//! Target/ABI layout oracle.
//!
//! Answers bit size, ABI alignment, and aggregate element offset questions
//! for native types under a specific target. Injected by the caller; the
//! binding layer above has no layout policy of its own, so a query failing
//! here surfaces as a contract violation at the point of use.

use crate::error::IrError;
use crate::types::{TypeHandle, TypeKind, TypePool};

/// Target description for layout queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    /// Pointer width in bits.
    pub pointer_bits: u32,
    /// ABI alignment of pointers in bits; also the cap for scalar alignment.
    pub pointer_abi_align_bits: u32,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self::host_default()
    }
}

impl TargetLayout {
    /// A generic 64-bit target.
    pub fn host_default() -> Self {
        Self {
            pointer_bits: 64,
            pointer_abi_align_bits: 64,
        }
    }

    /// A generic 32-bit target.
    pub fn ilp32() -> Self {
        Self {
            pointer_bits: 32,
            pointer_abi_align_bits: 32,
        }
    }

    pub fn with_pointer_bits(mut self, bits: u32) -> Self {
        self.pointer_bits = bits;
        self.pointer_abi_align_bits = bits;
        self
    }

    /// Allocation size of a type in bits.
    ///
    /// Array elements occupy their aligned stride; struct members are padded
    /// to their ABI alignment unless the struct is packed, and the total is
    /// rounded up to the struct's own alignment.
    pub fn bit_size_of(&self, pool: &TypePool, handle: TypeHandle) -> Result<u64, IrError> {
        match pool.kind(handle) {
            TypeKind::Integer => Ok(u64::from(pool.int_width(handle))),
            TypeKind::Float16 => Ok(16),
            TypeKind::Float32 => Ok(32),
            TypeKind::Float64 => Ok(64),
            TypeKind::Pointer => Ok(u64::from(self.pointer_bits)),
            TypeKind::Array => {
                let element = pool
                    .element_type(handle)
                    .ok_or(IrError::UnsizedType { handle })?;
                Ok(pool.length(handle) * self.bit_stride_of(pool, element)?)
            }
            TypeKind::Vector => {
                let element = pool
                    .element_type(handle)
                    .ok_or(IrError::UnsizedType { handle })?;
                // Vector elements are packed with no padding.
                Ok(pool.length(handle) * self.bit_size_of(pool, element)?)
            }
            TypeKind::Struct => {
                if pool.is_opaque(handle) {
                    return Err(IrError::UnsizedType { handle });
                }
                let packed = pool.is_packed(handle);
                let members = pool.struct_members(handle).to_vec();
                let mut offset = 0u64;
                for member in &members {
                    if !packed {
                        offset = align_up(offset, self.abi_bit_alignment_of(pool, *member)?);
                    }
                    offset += self.bit_size_of(pool, *member)?;
                }
                if packed {
                    Ok(offset)
                } else {
                    Ok(align_up(offset, self.abi_bit_alignment_of(pool, handle)?))
                }
            }
            TypeKind::Void
            | TypeKind::Function
            | TypeKind::Token
            | TypeKind::Label
            | TypeKind::Metadata => Err(IrError::UnsizedType { handle }),
        }
    }

    /// ABI alignment of a type in bits.
    pub fn abi_bit_alignment_of(&self, pool: &TypePool, handle: TypeHandle) -> Result<u32, IrError> {
        match pool.kind(handle) {
            TypeKind::Integer => {
                let bits = pool.int_width(handle).max(1);
                Ok(bits.next_power_of_two().clamp(8, self.pointer_abi_align_bits))
            }
            TypeKind::Float16 => Ok(16),
            TypeKind::Float32 => Ok(32),
            TypeKind::Float64 => Ok(64.min(self.pointer_abi_align_bits)),
            TypeKind::Pointer => Ok(self.pointer_abi_align_bits),
            TypeKind::Array | TypeKind::Vector => {
                let element = pool
                    .element_type(handle)
                    .ok_or(IrError::UnsizedType { handle })?;
                self.abi_bit_alignment_of(pool, element)
            }
            TypeKind::Struct => {
                if pool.is_opaque(handle) {
                    return Err(IrError::UnsizedType { handle });
                }
                if pool.is_packed(handle) {
                    return Ok(8);
                }
                let mut align = 8u32;
                for member in pool.struct_members(handle).to_vec() {
                    align = align.max(self.abi_bit_alignment_of(pool, member)?);
                }
                Ok(align)
            }
            TypeKind::Void
            | TypeKind::Function
            | TypeKind::Token
            | TypeKind::Label
            | TypeKind::Metadata => Err(IrError::UnsizedType { handle }),
        }
    }

    /// Bit offset of struct member `index` from the start of the aggregate.
    pub fn bit_offset_of_element(
        &self,
        pool: &TypePool,
        handle: TypeHandle,
        index: u32,
    ) -> Result<u64, IrError> {
        if pool.kind(handle) != TypeKind::Struct {
            return Err(IrError::NotAStruct { handle });
        }
        if pool.is_opaque(handle) {
            return Err(IrError::OpaqueStruct { handle });
        }
        let packed = pool.is_packed(handle);
        let members = pool.struct_members(handle).to_vec();
        let len = u32::try_from(members.len()).unwrap_or(u32::MAX);
        if index >= len {
            return Err(IrError::MemberIndexOutOfRange { handle, index, len });
        }
        let mut offset = 0u64;
        for (i, member) in members.iter().enumerate() {
            if !packed {
                offset = align_up(offset, self.abi_bit_alignment_of(pool, *member)?);
            }
            if i == index as usize {
                return Ok(offset);
            }
            offset += self.bit_size_of(pool, *member)?;
        }
        // Unreachable: the bounds check above covers every index.
        Err(IrError::MemberIndexOutOfRange { handle, index, len })
    }

    /// Stride of one array element: size rounded up to ABI alignment.
    fn bit_stride_of(&self, pool: &TypePool, element: TypeHandle) -> Result<u64, IrError> {
        let size = self.bit_size_of(pool, element)?;
        Ok(align_up(size, self.abi_bit_alignment_of(pool, element)?))
    }
}

fn align_up(value: u64, align_bits: u32) -> u64 {
    let align = u64::from(align_bits.max(1));
    value.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pool_with(f: impl FnOnce(&mut TypePool) -> TypeHandle) -> (TypePool, TypeHandle) {
        let mut pool = TypePool::new();
        let handle = f(&mut pool);
        (pool, handle)
    }

    #[test]
    fn scalar_sizes() {
        let layout = TargetLayout::host_default();
        let (pool, i32t) = pool_with(|p| p.int_type(32));
        assert_eq!(layout.bit_size_of(&pool, i32t), Ok(32));
        assert_eq!(layout.abi_bit_alignment_of(&pool, i32t), Ok(32));
    }

    #[test]
    fn pointer_size_follows_target() {
        let (mut pool, i8t) = pool_with(|p| p.int_type(8));
        let ptr = pool.pointer_type(i8t, 0).unwrap();
        assert_eq!(TargetLayout::host_default().bit_size_of(&pool, ptr), Ok(64));
        assert_eq!(TargetLayout::ilp32().bit_size_of(&pool, ptr), Ok(32));
    }

    #[test]
    fn struct_members_are_padded_to_alignment() {
        let layout = TargetLayout::host_default();
        let mut pool = TypePool::new();
        let i8t = pool.int_type(8);
        let i32t = pool.int_type(32);
        let s = pool.named_struct_type("S");
        pool.set_body(s, false, &[i8t, i32t]).unwrap();

        // { i8, pad(24), i32 } = 64 bits; the i32 lands at offset 32.
        assert_eq!(layout.bit_size_of(&pool, s), Ok(64));
        assert_eq!(layout.bit_offset_of_element(&pool, s, 0), Ok(0));
        assert_eq!(layout.bit_offset_of_element(&pool, s, 1), Ok(32));
    }

    #[test]
    fn packed_structs_have_no_padding() {
        let layout = TargetLayout::host_default();
        let mut pool = TypePool::new();
        let i8t = pool.int_type(8);
        let i32t = pool.int_type(32);
        let s = pool.named_struct_type("P");
        pool.set_body(s, true, &[i8t, i32t]).unwrap();

        assert_eq!(layout.bit_size_of(&pool, s), Ok(40));
        assert_eq!(layout.bit_offset_of_element(&pool, s, 1), Ok(8));
    }

    #[test]
    fn array_stride_includes_element_padding() {
        let layout = TargetLayout::host_default();
        let mut pool = TypePool::new();
        let i8t = pool.int_type(8);
        let i32t = pool.int_type(32);
        let elem = pool.named_struct_type("E");
        pool.set_body(elem, false, &[i32t, i8t]).unwrap();
        let arr = pool.array_type(elem, 4);

        // Element is 40 bits of data padded to a 64-bit stride.
        assert_eq!(layout.bit_size_of(&pool, arr), Ok(256));
    }

    #[test]
    fn unsized_queries_are_contract_violations() {
        let layout = TargetLayout::host_default();
        let mut pool = TypePool::new();
        let void = pool.void_type();
        let opaque = pool.named_struct_type("Fwd");

        assert_eq!(
            layout.bit_size_of(&pool, void),
            Err(IrError::UnsizedType { handle: void })
        );
        assert_eq!(
            layout.bit_size_of(&pool, opaque),
            Err(IrError::UnsizedType { handle: opaque })
        );
        assert_eq!(
            layout.bit_offset_of_element(&pool, opaque, 0),
            Err(IrError::OpaqueStruct { handle: opaque })
        );
        assert_eq!(
            layout.bit_offset_of_element(&pool, void, 0),
            Err(IrError::NotAStruct { handle: void })
        );
    }

    #[test]
    fn offset_index_is_bounds_checked() {
        let layout = TargetLayout::host_default();
        let mut pool = TypePool::new();
        let i32t = pool.int_type(32);
        let s = pool.named_struct_type("S");
        pool.set_body(s, false, &[i32t]).unwrap();
        assert_eq!(
            layout.bit_offset_of_element(&pool, s, 1),
            Err(IrError::MemberIndexOutOfRange { handle: s, index: 1, len: 1 })
        );
    }
}
