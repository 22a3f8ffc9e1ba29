//! Canonical patterns for handler parameter types.
//!
//! Digit classes are ASCII only: `\d` would accept digits the number parsers
//! reject. Every group is non-capturing, so a typed placeholder binds the
//! whole value.

use switchyard_core::ScalarKind;

/// One whole segment or value.
pub const WILDCARD: &str = ".*";

const BYTE: &str = "-?[0-9]{1,3}";
const SHORT: &str = "-?[0-9]{1,5}";
const INT: &str = "-?[0-9]{1,10}";
const LONG: &str = "-?[0-9]{1,19}";
const FLOAT: &str = "-?[0-9]{1,8}(?:\\.[0-9]{1,23})?";
const DOUBLE: &str = "-?[0-9]{1,15}(?:\\.[0-9]{1,46})?";
const BOOL: &str = "(?i:true|false)";
const STRING: &str = ".*";

/// The canonical pattern for `scalar`. `char` has none.
pub fn canonical_pattern(scalar: ScalarKind) -> Option<&'static str> {
    match scalar {
        ScalarKind::Byte => Some(BYTE),
        ScalarKind::Short => Some(SHORT),
        ScalarKind::Int => Some(INT),
        ScalarKind::Long => Some(LONG),
        ScalarKind::Float => Some(FLOAT),
        ScalarKind::Double => Some(DOUBLE),
        ScalarKind::Bool => Some(BOOL),
        ScalarKind::String => Some(STRING),
        ScalarKind::Char => None,
    }
}
