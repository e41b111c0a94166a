//! Type system
//!
//! Represents scalar/vector/matrix/struct/array/sampler/texture types and
//! defines the conversion rank used by overload resolution (spec.md §4.D).
//!
//! `rank()` is a direct port of `nodes::type_node::rank` in
//! `examples/original_source/source/symbol_table.cpp`, kept bit-for-bit so
//! overload resolution matches the original compiler's behavior.

use std::fmt;

/// The base type of a [`Type`]. Mirrors `type_node::datatype_*` in the
/// original ReShade compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    Void,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Texture,
    Sampler,
    Struct,
}

impl BaseType {
    pub fn is_numeric(self) -> bool {
        matches!(self, BaseType::Bool | BaseType::Int | BaseType::Uint | BaseType::Float)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, BaseType::Bool | BaseType::Int | BaseType::Uint)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, BaseType::Float)
    }

    /// Index into the 4x4 promotion-rank table in [`rank`]; only valid for
    /// numeric base types, ordered bool < int < uint < float as the
    /// original `ranks` table assumes.
    fn promotion_index(self) -> Option<usize> {
        match self {
            BaseType::Bool => Some(0),
            BaseType::Int => Some(1),
            BaseType::Uint => Some(2),
            BaseType::Float => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BaseType::Void => "void",
            BaseType::Bool => "bool",
            BaseType::Int => "int",
            BaseType::Uint => "uint",
            BaseType::Float => "float",
            BaseType::String => "string",
            BaseType::Texture => "texture",
            BaseType::Sampler => "sampler",
            BaseType::Struct => "struct",
        };
        write!(f, "{s}")
    }
}

bitflags::bitflags! {
    /// Bitset of type/declaration qualifiers (spec.md §3 "Type").
    ///
    /// `bitflags` is the crate `examples/messense-llvm-bitcode-rs` reaches
    /// for to model a flag set over a `u32`; the teacher workspace never
    /// modeled qualifier sets itself, so this follows that lead.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Qualifiers: u32 {
        const NONE = 0;
        const EXTERN = 1 << 0;
        const STATIC = 1 << 1;
        const UNIFORM = 1 << 2;
        const VOLATILE = 1 << 3;
        const PRECISE = 1 << 4;
        const IN = 1 << 5;
        const OUT = 1 << 6;
        const INOUT = 1 << 7;
        const CONST = 1 << 8;
        const LINEAR = 1 << 9;
        const NOPERSPECTIVE = 1 << 10;
        const CENTROID = 1 << 11;
        const NOINTERPOLATION = 1 << 12;
    }
}

/// `array_length` encoding from spec.md §3: 0 = not an array, -1 = unsized,
/// >=1 = explicit length.
pub const ARRAY_NOT_ARRAY: i32 = 0;
pub const ARRAY_UNSIZED: i32 = -1;

/// A fully resolved FX type: scalar, vector, matrix, struct, array,
/// sampler, texture, or void/string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Type {
    pub base_type: BaseType,
    /// 1..=4 for vectors/matrices/scalars; 0 for non-numeric kinds.
    pub rows: u8,
    /// 1..=4 for matrices; 1 for vectors/scalars; 0 for non-numeric kinds.
    pub cols: u8,
    pub array_length: i32,
    pub qualifiers: Qualifiers,
    /// Raw arena index of the struct declaration when `base_type ==
    /// BaseType::Struct`. Stored as a raw `u32` rather than
    /// `arena::Handle<StructDecl>` to avoid a dependency cycle between
    /// `types` and `ast`; `ast` provides the typed wrapper.
    pub definition: Option<u32>,
}

impl Type {
    pub const fn scalar(base_type: BaseType) -> Self {
        Type {
            base_type,
            rows: 1,
            cols: 1,
            array_length: ARRAY_NOT_ARRAY,
            qualifiers: Qualifiers::NONE,
            definition: None,
        }
    }

    pub const VOID: Type = Type {
        base_type: BaseType::Void,
        rows: 0,
        cols: 0,
        array_length: ARRAY_NOT_ARRAY,
        qualifiers: Qualifiers::NONE,
        definition: None,
    };

    pub const BOOL: Type = Type::scalar(BaseType::Bool);
    pub const INT: Type = Type::scalar(BaseType::Int);
    pub const UINT: Type = Type::scalar(BaseType::Uint);
    pub const FLOAT: Type = Type::scalar(BaseType::Float);

    pub const STRING: Type = Type {
        base_type: BaseType::String,
        rows: 0,
        cols: 0,
        array_length: ARRAY_NOT_ARRAY,
        qualifiers: Qualifiers::NONE,
        definition: None,
    };

    pub fn vector(base_type: BaseType, rows: u8) -> Self {
        Type {
            base_type,
            rows,
            cols: 1,
            array_length: ARRAY_NOT_ARRAY,
            qualifiers: Qualifiers::NONE,
            definition: None,
        }
    }

    pub fn matrix(base_type: BaseType, rows: u8, cols: u8) -> Self {
        Type {
            base_type,
            rows,
            cols,
            array_length: ARRAY_NOT_ARRAY,
            qualifiers: Qualifiers::NONE,
            definition: None,
        }
    }

    pub fn sampler() -> Self {
        Type {
            base_type: BaseType::Sampler,
            rows: 0,
            cols: 0,
            array_length: ARRAY_NOT_ARRAY,
            qualifiers: Qualifiers::NONE,
            definition: None,
        }
    }

    pub fn texture() -> Self {
        Type {
            base_type: BaseType::Texture,
            rows: 0,
            cols: 0,
            array_length: ARRAY_NOT_ARRAY,
            qualifiers: Qualifiers::NONE,
            definition: None,
        }
    }

    pub fn with_array_length(mut self, length: i32) -> Self {
        self.array_length = length;
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_length != ARRAY_NOT_ARRAY
    }

    pub fn is_scalar(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    pub fn is_vector(&self) -> bool {
        self.rows > 1 && self.cols == 1
    }

    pub fn is_matrix(&self) -> bool {
        self.rows >= 2 && self.cols >= 2
    }

    pub fn is_numeric(&self) -> bool {
        self.base_type.is_numeric()
    }

    pub fn is_integral(&self) -> bool {
        self.base_type.is_integral()
    }

    pub fn is_floating(&self) -> bool {
        self.base_type.is_floating()
    }

    pub fn is_struct(&self) -> bool {
        self.base_type == BaseType::Struct
    }

    pub fn is_sampler(&self) -> bool {
        self.base_type == BaseType::Sampler
    }

    pub fn is_texture(&self) -> bool {
        self.base_type == BaseType::Texture
    }

    pub fn is_void(&self) -> bool {
        self.base_type == BaseType::Void
    }

    pub fn has_qualifier(&self, q: Qualifiers) -> bool {
        self.qualifiers.contains(q)
    }

    pub fn components(&self) -> u32 {
        self.rows as u32 * self.cols as u32
    }

    /// Total scalar lane count an initializer/literal of this type needs,
    /// per invariant 3 in spec.md §3: `rows * cols * max(1, array_length)`.
    pub fn lane_count(&self) -> usize {
        let elems = if self.array_length > 0 {
            self.array_length as usize
        } else {
            1
        };
        self.components() as usize * elems
    }

    /// Conversion rank from `self` (source) to `dst` (destination).
    /// `0` means "no conversion possible"; lower nonzero is a cheaper
    /// conversion. Drives overload resolution (spec.md §4.D).
    ///
    /// Ported from `nodes::type_node::rank` in
    /// `examples/original_source/source/symbol_table.cpp`.
    pub fn rank(src: &Type, dst: &Type) -> u32 {
        if src.is_array() != dst.is_array()
            || (src.array_length != dst.array_length && src.array_length > 0 && dst.array_length > 0)
        {
            return 0;
        }
        if src.is_struct() || dst.is_struct() {
            return (src.definition == dst.definition) as u32;
        }
        if src.base_type == dst.base_type && src.rows == dst.rows && src.cols == dst.cols {
            return 1;
        }
        if !src.is_numeric() || !dst.is_numeric() {
            return 0;
        }

        // [src][dst], rows = bool/int/uint/float source, cols = dest.
        const RANKS: [[i32; 4]; 4] = [
            [0, 5, 5, 5],
            [4, 0, 3, 5],
            [4, 2, 0, 5],
            [4, 4, 4, 0],
        ];

        let si = src.base_type.promotion_index().unwrap();
        let di = dst.base_type.promotion_index().unwrap();
        let base_rank = (RANKS[si][di] as u32) << 2;

        if src.is_scalar() && dst.is_vector() {
            return base_rank | 2;
        }
        if (src.is_vector() && dst.is_scalar())
            || (src.is_vector() == dst.is_vector() && src.rows > dst.rows && src.cols >= dst.cols)
        {
            return base_rank | 32;
        }
        if src.is_vector() != dst.is_vector()
            || src.is_matrix() != dst.is_matrix()
            || src.rows as u32 * src.cols as u32 != dst.rows as u32 * dst.cols as u32
        {
            return 0;
        }

        base_rank
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_matrix() {
            write!(f, "{}{}x{}", self.base_type, self.rows, self.cols)?;
        } else if self.is_vector() {
            write!(f, "{}{}", self.base_type, self.rows)?;
        } else {
            write!(f, "{}", self.base_type)?;
        }
        if self.array_length == ARRAY_UNSIZED {
            write!(f, "[]")?;
        } else if self.array_length > 0 {
            write!(f, "[{}]", self.array_length)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_scalar_ranks_one() {
        assert_eq!(Type::rank(&Type::INT, &Type::INT), 1);
    }

    #[test]
    fn incompatible_array_lengths_rank_zero() {
        let a = Type::INT.with_array_length(3);
        let b = Type::INT.with_array_length(4);
        assert_eq!(Type::rank(&a, &b), 0);
    }

    #[test]
    fn scalar_broadcast_beats_vector_truncation() {
        let scalar_to_vector = Type::rank(&Type::FLOAT, &Type::vector(BaseType::Float, 3));
        let vector_to_smaller_vector = Type::rank(
            &Type::vector(BaseType::Float, 4),
            &Type::vector(BaseType::Float, 2),
        );
        assert!(scalar_to_vector > 0);
        assert!(vector_to_smaller_vector > 0);
        assert!(scalar_to_vector < vector_to_smaller_vector);
    }

    #[test]
    fn bool_to_int_cheaper_than_int_to_bool() {
        let up = Type::rank(&Type::BOOL, &Type::INT);
        let down = Type::rank(&Type::INT, &Type::BOOL);
        assert!(up > 0 && down > 0);
        assert!(up < down);
    }

    #[test]
    fn non_numeric_mismatch_is_zero() {
        assert_eq!(Type::rank(&Type::sampler(), &Type::FLOAT), 0);
    }

    #[test]
    fn struct_rank_by_identity() {
        let mut a = Type::scalar(BaseType::Struct);
        a.definition = Some(1);
        let mut b = a;
        b.definition = Some(2);
        assert_eq!(Type::rank(&a, &a), 1);
        assert_eq!(Type::rank(&a, &b), 0);
    }

    #[test]
    fn lane_count_matches_shape_times_array_length() {
        let t = Type::vector(BaseType::Float, 3).with_array_length(4);
        assert_eq!(t.lane_count(), 12);
        assert_eq!(Type::FLOAT.lane_count(), 1);
    }
}
