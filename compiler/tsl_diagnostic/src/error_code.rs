//! Error codes for every diagnostic the value engine emits.
//!
//! The first digit names the component that reported:
//! - E0xxx: literal decoding (escape sequences, string bodies)
//! - E1xxx: subvalue navigation
//! - E2xxx: folding and operator semantics
//! - E3xxx: container and field semantics
//! - E4xxx: circular references
//! - W....: warnings, numbered after the component they belong to

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Literal decoding (E0xxx)
    /// Unknown backslash escape
    E0001,
    /// `\x` without hex digits
    E0002,
    /// Octal escape above 255
    E0003,
    /// Malformed bit, hex or octet string body
    E0004,
    /// Malformed `char(g, p, r, c)` quadruple
    E0005,

    // Navigation (E1xxx)
    /// Reference to a field the type does not have
    E1001,
    /// Reference to an inactive union alternative
    E1002,
    /// Index expression is not an integer
    E1003,
    /// Negative index
    E1004,
    /// Index past the end of a list or string
    E1005,
    /// Array index below the dimension's lower bound
    E1006,
    /// Array index above the dimension's upper bound
    E1007,
    /// Sparse list has no element for the index
    E1008,
    /// Accessor kind not allowed on this value
    E1009,
    /// Mandatory field left out of a record or set value
    E1010,

    // Folding (E2xxx)
    /// Operand of the wrong kind
    E2001,
    /// Division by zero
    E2002,
    /// Reference that does not denote a definition
    E2003,
    /// Macro not allowed in this context
    E2004,
    /// Conversion argument out of range
    E2005,
    /// Operand lengths differ
    E2006,
    /// `substr` bounds outside the string
    E2007,
    /// Conversion input not in the expected format
    E2008,

    // Containers (E3xxx)
    /// Duplicate field name
    E3001,
    /// Duplicate index in a sparse list
    E3002,
    /// Universal charstring cannot be narrowed
    E3003,

    // Circularity (E4xxx)
    /// Circular reference
    E4001,

    // Warnings
    /// Narrowed character above 127
    W3001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E1010,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E4001,
        ErrorCode::W3001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E4001 => "E4001",
            ErrorCode::W3001 => "W3001",
        }
    }

    /// Subvalue navigation errors. These are the ones binding introspection
    /// turns into a plain `false`.
    pub fn is_navigation_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
                | ErrorCode::E1007
                | ErrorCode::E1008
                | ErrorCode::E1009
                | ErrorCode::E1010
        )
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E1001"` or `"w3001"`.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
