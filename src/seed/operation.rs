//! Operation — the AFL fuzzing stage that produced a seed
//!
//! Queue filenames carry a short stage code (`flip1`, `arith8`, `havoc`, ...).
//! The table below expands those codes to the stage names AFL prints in its UI.

use super::DecodeError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fuzzing stage recorded in the `op:` field of a queue filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Walking single-bit flips
    Flip1,
    /// Walking two-bit flips
    Flip2,
    /// Walking four-bit flips
    Flip4,
    /// Walking byte flips
    Flip8,
    /// Walking 16-bit flips
    Flip16,
    /// Walking 32-bit flips
    Flip32,
    /// 8-bit arithmetic
    Arith8,
    Arith16,
    Arith32,
    /// Interesting 8-bit values
    Interest8,
    Interest16,
    Interest32,
    /// User-supplied dictionary, overwriting
    UserExtrasOver,
    /// User-supplied dictionary, inserting
    UserExtrasInsert,
    /// Auto-detected tokens, overwriting
    AutoExtrasOver,
    /// Auto-detected tokens, inserting
    AutoExtrasInsert,
    /// Stacked random tweaks
    Havoc,
    /// Two queue entries spliced together
    Splice,
}

impl Operation {
    pub const ALL: [Operation; 18] = [
        Operation::Flip1,
        Operation::Flip2,
        Operation::Flip4,
        Operation::Flip8,
        Operation::Flip16,
        Operation::Flip32,
        Operation::Arith8,
        Operation::Arith16,
        Operation::Arith32,
        Operation::Interest8,
        Operation::Interest16,
        Operation::Interest32,
        Operation::UserExtrasOver,
        Operation::UserExtrasInsert,
        Operation::AutoExtrasOver,
        Operation::AutoExtrasInsert,
        Operation::Havoc,
        Operation::Splice,
    ];

    /// Look up a short stage code as written in a queue filename
    pub fn from_code(code: &str) -> Result<Self, DecodeError> {
        let op = match code {
            "flip1" => Operation::Flip1,
            "flip2" => Operation::Flip2,
            "flip4" => Operation::Flip4,
            "flip8" => Operation::Flip8,
            "flip16" => Operation::Flip16,
            "flip32" => Operation::Flip32,
            "arith8" => Operation::Arith8,
            "arith16" => Operation::Arith16,
            "arith32" => Operation::Arith32,
            "int8" => Operation::Interest8,
            "int16" => Operation::Interest16,
            "int32" => Operation::Interest32,
            // Some tooling spells the extras codes with a zero instead of `O`
            "ext_UO" | "ext_U0" => Operation::UserExtrasOver,
            "ext_UI" => Operation::UserExtrasInsert,
            "ext_AO" | "ext_A0" => Operation::AutoExtrasOver,
            "ext_AI" => Operation::AutoExtrasInsert,
            "havoc" => Operation::Havoc,
            "splice" => Operation::Splice,
            other => return Err(DecodeError::UnknownOperation(other.to_string())),
        };
        Ok(op)
    }

    /// Canonical short code, as AFL writes it
    pub fn code(&self) -> &'static str {
        match self {
            Operation::Flip1 => "flip1",
            Operation::Flip2 => "flip2",
            Operation::Flip4 => "flip4",
            Operation::Flip8 => "flip8",
            Operation::Flip16 => "flip16",
            Operation::Flip32 => "flip32",
            Operation::Arith8 => "arith8",
            Operation::Arith16 => "arith16",
            Operation::Arith32 => "arith32",
            Operation::Interest8 => "int8",
            Operation::Interest16 => "int16",
            Operation::Interest32 => "int32",
            Operation::UserExtrasOver => "ext_UO",
            Operation::UserExtrasInsert => "ext_UI",
            Operation::AutoExtrasOver => "ext_AO",
            Operation::AutoExtrasInsert => "ext_AI",
            Operation::Havoc => "havoc",
            Operation::Splice => "splice",
        }
    }

    /// Full human-readable stage name
    pub fn stage_name(&self) -> &'static str {
        match self {
            Operation::Flip1 => "bitflip 1/1",
            Operation::Flip2 => "bitflip 2/1",
            Operation::Flip4 => "bitflip 4/1",
            Operation::Flip8 => "bitflip 8/8",
            Operation::Flip16 => "bitflip 16/8",
            Operation::Flip32 => "bitflip 32/8",
            Operation::Arith8 => "arith 8/8",
            Operation::Arith16 => "arith 16/8",
            Operation::Arith32 => "arith 32/8",
            Operation::Interest8 => "interest 8/8",
            Operation::Interest16 => "interest 16/8",
            Operation::Interest32 => "interest 32/8",
            Operation::UserExtrasOver => "user extras (over)",
            Operation::UserExtrasInsert => "user extras (insert)",
            Operation::AutoExtrasOver => "auto extras (over)",
            Operation::AutoExtrasInsert => "auto extras (insert)",
            Operation::Havoc => "havoc",
            Operation::Splice => "splice",
        }
    }
}

impl FromStr for Operation {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::from_code(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage_name())
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.stage_name())
    }
}
