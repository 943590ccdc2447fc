//! Numeric representations for label volumes.
//!
//! Labels are carried as `i64` in memory; [`LabelDtype`] is the on-disk
//! integer type chosen for the output, and [`VoxelType`] describes what the
//! input volume was stored as.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::LabelmergeError;

/// Integer storage type for an output label volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelDtype {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

/// Signed types tried in order when no output dtype is requested.
pub const INFERENCE_LADDER: [LabelDtype; 4] = [
    LabelDtype::Int8,
    LabelDtype::Int16,
    LabelDtype::Int32,
    LabelDtype::Int64,
];

impl LabelDtype {
    /// All supported dtypes, in the order they are listed to users.
    pub const ALL: [LabelDtype; 8] = [
        LabelDtype::Int8,
        LabelDtype::Int16,
        LabelDtype::Int32,
        LabelDtype::Int64,
        LabelDtype::UInt8,
        LabelDtype::UInt16,
        LabelDtype::UInt32,
        LabelDtype::UInt64,
    ];

    /// Canonical lowercase name (`int8`, `uint16`, ...).
    pub fn name(self) -> &'static str {
        match self {
            LabelDtype::Int8 => "int8",
            LabelDtype::Int16 => "int16",
            LabelDtype::Int32 => "int32",
            LabelDtype::Int64 => "int64",
            LabelDtype::UInt8 => "uint8",
            LabelDtype::UInt16 => "uint16",
            LabelDtype::UInt32 => "uint32",
            LabelDtype::UInt64 => "uint64",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            LabelDtype::Int8 | LabelDtype::UInt8 => 8,
            LabelDtype::Int16 | LabelDtype::UInt16 => 16,
            LabelDtype::Int32 | LabelDtype::UInt32 => 32,
            LabelDtype::Int64 | LabelDtype::UInt64 => 64,
        }
    }

    /// Smallest representable value.
    pub fn min_value(self) -> i128 {
        match self {
            LabelDtype::Int8 => i8::MIN as i128,
            LabelDtype::Int16 => i16::MIN as i128,
            LabelDtype::Int32 => i32::MIN as i128,
            LabelDtype::Int64 => i64::MIN as i128,
            _ => 0,
        }
    }

    /// Largest representable value.
    pub fn max_value(self) -> i128 {
        match self {
            LabelDtype::Int8 => i8::MAX as i128,
            LabelDtype::Int16 => i16::MAX as i128,
            LabelDtype::Int32 => i32::MAX as i128,
            LabelDtype::Int64 => i64::MAX as i128,
            LabelDtype::UInt8 => u8::MAX as i128,
            LabelDtype::UInt16 => u16::MAX as i128,
            LabelDtype::UInt32 => u32::MAX as i128,
            LabelDtype::UInt64 => u64::MAX as i128,
        }
    }

    /// Returns true if `value` is representable without wrapping.
    pub fn fits(self, value: i64) -> bool {
        let value = value as i128;
        value >= self.min_value() && value <= self.max_value()
    }

    /// Checks a single value, failing with [`LabelmergeError::DtypeRange`].
    pub fn check(self, value: i64) -> Result<(), LabelmergeError> {
        if self.fits(value) {
            Ok(())
        } else {
            Err(LabelmergeError::DtypeRange { value, dtype: self })
        }
    }

    /// The narrowest signed type with at least `bits` bits.
    pub fn signed_with_bits(bits: u32) -> LabelDtype {
        INFERENCE_LADDER
            .iter()
            .copied()
            .find(|d| d.bits() >= bits)
            .unwrap_or(LabelDtype::Int64)
    }

    /// Picks the narrowest signed type that holds `min..=max` and is at
    /// least as wide as `floor`.
    ///
    /// Every `i64` fits in `int64`, so inference cannot fail.
    pub fn infer(min: i64, max: i64, floor: LabelDtype) -> LabelDtype {
        let floor_bits = floor.bits();
        INFERENCE_LADDER
            .iter()
            .copied()
            .filter(|d| d.bits() >= floor_bits)
            .find(|d| d.fits(min) && d.fits(max))
            .unwrap_or(LabelDtype::Int64)
    }

    fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LabelDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LabelDtype {
    type Err = LabelmergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int8" | "i8" => Ok(LabelDtype::Int8),
            "int16" | "i16" => Ok(LabelDtype::Int16),
            "int32" | "i32" => Ok(LabelDtype::Int32),
            "int64" | "i64" => Ok(LabelDtype::Int64),
            "uint8" | "u8" => Ok(LabelDtype::UInt8),
            "uint16" | "u16" => Ok(LabelDtype::UInt16),
            "uint32" | "u32" => Ok(LabelDtype::UInt32),
            "uint64" | "u64" => Ok(LabelDtype::UInt64),
            _ => Err(LabelmergeError::UnsupportedDtype(format!(
                "'{}' (supported: {})",
                s,
                Self::supported_names()
            ))),
        }
    }
}

/// How the voxels of an input volume were stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoxelType {
    /// Stored as an integer type.
    Integer(LabelDtype),
    /// Stored as floats holding integral values.
    Float { bits: u32 },
}

impl VoxelType {
    /// The narrowest signed output type that never narrows the input.
    pub fn width_floor(self) -> LabelDtype {
        match self {
            VoxelType::Integer(dtype) => LabelDtype::signed_with_bits(dtype.bits()),
            VoxelType::Float { bits } => LabelDtype::signed_with_bits(bits),
        }
    }
}

impl fmt::Display for VoxelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxelType::Integer(dtype) => write!(f, "{}", dtype),
            VoxelType::Float { bits } => write!(f, "float{}", bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("int8".parse::<LabelDtype>().unwrap(), LabelDtype::Int8);
        assert_eq!("INT16".parse::<LabelDtype>().unwrap(), LabelDtype::Int16);
        assert_eq!("u32".parse::<LabelDtype>().unwrap(), LabelDtype::UInt32);
        assert_eq!(" int64 ".parse::<LabelDtype>().unwrap(), LabelDtype::Int64);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "float32".parse::<LabelDtype>().unwrap_err();
        assert!(matches!(err, LabelmergeError::UnsupportedDtype(_)));
        assert!(err.to_string().contains("float32"));
        assert!(err.to_string().contains("uint64"));
    }

    #[test]
    fn range_checks() {
        assert!(LabelDtype::Int8.fits(127));
        assert!(LabelDtype::Int8.fits(-128));
        assert!(!LabelDtype::Int8.fits(128));
        assert!(LabelDtype::UInt8.fits(255));
        assert!(!LabelDtype::UInt8.fits(-1));
        assert!(LabelDtype::UInt64.fits(i64::MAX));
        assert!(LabelDtype::Int64.fits(i64::MIN));
    }

    #[test]
    fn check_reports_value_and_dtype() {
        let err = LabelDtype::Int8.check(300).unwrap_err();
        match err {
            LabelmergeError::DtypeRange { value, dtype } => {
                assert_eq!(value, 300);
                assert_eq!(dtype, LabelDtype::Int8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn infer_picks_narrowest_signed() {
        assert_eq!(LabelDtype::infer(0, 5, LabelDtype::Int8), LabelDtype::Int8);
        assert_eq!(LabelDtype::infer(0, 127, LabelDtype::Int8), LabelDtype::Int8);
        assert_eq!(LabelDtype::infer(0, 128, LabelDtype::Int8), LabelDtype::Int16);
        assert_eq!(LabelDtype::infer(-129, 3, LabelDtype::Int8), LabelDtype::Int16);
        assert_eq!(LabelDtype::infer(0, 70_000, LabelDtype::Int8), LabelDtype::Int32);
        assert_eq!(
            LabelDtype::infer(0, i64::from(i32::MAX) + 1, LabelDtype::Int8),
            LabelDtype::Int64
        );
    }

    #[test]
    fn infer_respects_input_width_floor() {
        assert_eq!(LabelDtype::infer(0, 5, LabelDtype::Int32), LabelDtype::Int32);
        let floor = VoxelType::Integer(LabelDtype::UInt16).width_floor();
        assert_eq!(floor, LabelDtype::Int16);
        assert_eq!(LabelDtype::infer(0, 40_000, floor), LabelDtype::Int32);
        assert_eq!(VoxelType::Float { bits: 32 }.width_floor(), LabelDtype::Int32);
    }
}
