//! The numeric conversion tables.
//!
//! Widening never loses range, so it is implicit; everything else between
//! numeric types requires a cast. `char` widens like a 16-bit unsigned
//! value but nothing converts into it implicitly.

use vesper_core::SpecialType;

/// Whether an implicit widening conversion takes `from` to `to`.
pub(crate) fn implicit_numeric(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;
    if from == to {
        return false;
    }
    match from {
        Int8 => matches!(to, Int16 | Int32 | Int64 | Float32 | Float64),
        UInt8 => matches!(
            to,
            Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Float32 | Float64
        ),
        Int16 => matches!(to, Int32 | Int64 | Float32 | Float64),
        UInt16 => matches!(to, Int32 | UInt32 | Int64 | UInt64 | Float32 | Float64),
        Int32 => matches!(to, Int64 | Float32 | Float64),
        UInt32 => matches!(to, Int64 | UInt64 | Float32 | Float64),
        Int64 | UInt64 => matches!(to, Float32 | Float64),
        Char => matches!(
            to,
            UInt16 | Int32 | UInt32 | Int64 | UInt64 | Float32 | Float64
        ),
        Float32 => matches!(to, Float64),
        _ => false,
    }
}

/// Whether a cast-only numeric conversion takes `from` to `to`: every
/// numeric pair that is neither identity nor an implicit widening.
pub(crate) fn explicit_numeric(from: SpecialType, to: SpecialType) -> bool {
    from.is_numeric() && to.is_numeric() && from != to && !implicit_numeric(from, to)
}
