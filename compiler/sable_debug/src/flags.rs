//! DWARF constants and debug-info flags.
//!
//! Values match the DWARF specification (tags, attribute encodings) and the
//! flag bit assignments debuggers expect; only the subset this layer actually
//! produces is modeled.

use bitflags::bitflags;

bitflags! {
    /// Flags attached to debug-info nodes.
    ///
    /// The low two bits are the accessibility level (`PUBLIC` is the mask of
    /// both), the rest are independent bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DiFlags: u32 {
        const PRIVATE = 1;
        const PROTECTED = 2;
        const PUBLIC = 3;
        const FWD_DECL = 1 << 2;
        const APPLE_BLOCK = 1 << 3;
        const VIRTUAL = 1 << 5;
        const ARTIFICIAL = 1 << 6;
        const EXPLICIT = 1 << 7;
        const PROTOTYPED = 1 << 8;
        const OBJECT_POINTER = 1 << 10;
        const VECTOR = 1 << 11;
        const STATIC_MEMBER = 1 << 12;
        const LVALUE_REFERENCE = 1 << 13;
        const RVALUE_REFERENCE = 1 << 14;
    }
}

impl DiFlags {
    pub fn bits_u64(self) -> u64 {
        u64::from(self.bits())
    }

    pub fn from_bits_u64(bits: u64) -> Self {
        Self::from_bits_truncate(u32::try_from(bits).unwrap_or(0))
    }
}

/// DWARF tags for type and program entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DwarfTag {
    ArrayType = 0x01,
    ClassType = 0x02,
    EnumerationType = 0x04,
    Member = 0x0d,
    PointerType = 0x0f,
    ReferenceType = 0x10,
    StructureType = 0x13,
    SubroutineType = 0x15,
    Typedef = 0x16,
    UnionType = 0x17,
    Inheritance = 0x1c,
    SubrangeType = 0x21,
    BaseType = 0x24,
    ConstType = 0x26,
    Subprogram = 0x2e,
    Variable = 0x34,
}

impl DwarfTag {
    pub fn value(self) -> u64 {
        self as u32 as u64
    }

    pub fn from_value(value: u64) -> Option<Self> {
        match value {
            0x01 => Some(Self::ArrayType),
            0x02 => Some(Self::ClassType),
            0x04 => Some(Self::EnumerationType),
            0x0d => Some(Self::Member),
            0x0f => Some(Self::PointerType),
            0x10 => Some(Self::ReferenceType),
            0x13 => Some(Self::StructureType),
            0x15 => Some(Self::SubroutineType),
            0x16 => Some(Self::Typedef),
            0x17 => Some(Self::UnionType),
            0x1c => Some(Self::Inheritance),
            0x21 => Some(Self::SubrangeType),
            0x24 => Some(Self::BaseType),
            0x26 => Some(Self::ConstType),
            0x2e => Some(Self::Subprogram),
            0x34 => Some(Self::Variable),
            _ => None,
        }
    }
}

/// DWARF base-type attribute encodings (`DW_ATE_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DwarfAte {
    Address = 0x01,
    Boolean = 0x02,
    Float = 0x04,
    Signed = 0x05,
    SignedChar = 0x06,
    Unsigned = 0x07,
    UnsignedChar = 0x08,
    Utf = 0x10,
}

impl DwarfAte {
    pub fn value(self) -> u64 {
        self as u32 as u64
    }
}

/// DWARF source-language codes for compile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum SourceLanguage {
    C89 = 0x01,
    #[default]
    C = 0x02,
    CPlusPlus = 0x04,
    Rust = 0x1c,
}

impl SourceLanguage {
    pub fn value(self) -> u64 {
        self as u32 as u64
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tag_values_round_trip() {
        for tag in [
            DwarfTag::ArrayType,
            DwarfTag::Member,
            DwarfTag::PointerType,
            DwarfTag::StructureType,
            DwarfTag::UnionType,
            DwarfTag::BaseType,
        ] {
            assert_eq!(DwarfTag::from_value(tag.value()), Some(tag));
        }
        assert_eq!(DwarfTag::from_value(0xffff), None);
    }

    #[test]
    fn public_is_the_accessibility_mask() {
        assert_eq!(DiFlags::PRIVATE | DiFlags::PROTECTED, DiFlags::PUBLIC);
        let flags = DiFlags::from_bits_u64(DiFlags::FWD_DECL.bits_u64());
        assert_eq!(flags, DiFlags::FWD_DECL);
    }
}
