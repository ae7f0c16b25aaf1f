//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Type, template and module errors
/// - E3xxx: I/O errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated literal or comment
    E0001,
    /// Invalid character in source
    E0002,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,

    // Type Errors (E2xxx)
    /// Member not found
    E2001,
    /// Ambiguous call
    E2002,
    /// No matching overload
    E2003,
    /// Template recursion limit exceeded
    E2004,
    /// Wrong number of template arguments
    E2005,
    /// Template argument of the wrong kind
    E2006,
    /// Unknown type name
    E2007,
    /// Duplicate definition
    E2008,
    /// Unresolved import
    E2009,
    /// Import cycle
    E2010,
    /// Type has no layout yet
    E2011,
    /// Type contains itself by value
    E2012,

    // I/O Errors (E3xxx)
    /// Cannot read source file
    E3001,

    // Internal Errors (E9xxx)
    /// Invalid item cast
    E9001,
    /// Locator outside its source
    E9002,
    /// Too many errors
    E9003,
    /// Internal table exhausted or inconsistent
    E9004,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E1001,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E3001,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::E9003,
        ErrorCode::E9004,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::E9003 => "E9003",
            ErrorCode::E9004 => "E9004",
        }
    }

    /// One-line description for `--explain` style listings.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated literal or comment",
            ErrorCode::E0002 => "invalid character in source",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E2001 => "member not found",
            ErrorCode::E2002 => "ambiguous call",
            ErrorCode::E2003 => "no matching overload",
            ErrorCode::E2004 => "template recursion limit exceeded",
            ErrorCode::E2005 => "wrong number of template arguments",
            ErrorCode::E2006 => "template argument of the wrong kind",
            ErrorCode::E2007 => "unknown type name",
            ErrorCode::E2008 => "duplicate definition",
            ErrorCode::E2009 => "unresolved import",
            ErrorCode::E2010 => "import cycle",
            ErrorCode::E2011 => "incomplete type",
            ErrorCode::E2012 => "type contains itself by value",
            ErrorCode::E3001 => "cannot read source file",
            ErrorCode::E9001 => "invalid item cast",
            ErrorCode::E9002 => "locator outside its source",
            ErrorCode::E9003 => "too many errors",
            ErrorCode::E9004 => "internal table exhausted",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_io_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
