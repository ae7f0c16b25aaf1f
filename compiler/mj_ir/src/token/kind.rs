//! Token kind tags and their fixed encodings.

use std::fmt;

/// How a kind's payload bytes are interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PayloadClass {
    /// No payload; the kind byte is the whole token.
    None,
    /// One byte: indentation depth or whitespace run length.
    Count,
    /// Two bytes: a little-endian interned [`Name`](crate::Name).
    Name,
}

macro_rules! token_kinds {
    ($($(#[$doc:meta])* $variant:ident = $byte:literal => $text:expr,)*) => {
        /// Token kind, stored as the first byte of every encoded token.
        ///
        /// | Range   | Category                         | Encoded size |
        /// |---------|----------------------------------|--------------|
        /// | 0       | `None` sentinel                  | 1            |
        /// | 1       | Newline                          | 1            |
        /// | 2-3     | Indent / whitespace (count)      | 2            |
        /// | 8-15    | Interned text (name payload)     | 3            |
        /// | 32-79   | Keywords                         | 1            |
        /// | 96-159  | Punctuation and operators        | 1            |
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum TokenKind {
            $($(#[$doc])* $variant = $byte,)*
        }

        impl TokenKind {
            /// Every kind, in byte order.
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Decode a kind byte. Returns `None` for bytes no kind uses.
            #[inline]
            pub const fn from_byte(byte: u8) -> Option<TokenKind> {
                match byte {
                    $($byte => Some(TokenKind::$variant),)*
                    _ => None,
                }
            }

            /// Fixed source text of keywords, operators and newlines.
            #[inline]
            pub const fn builtin_text(self) -> Option<&'static str> {
                match self {
                    $(TokenKind::$variant => $text,)*
                }
            }

            /// Variant name, for debugging output.
            pub const fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

token_kinds! {
    /// End-of-stream sentinel.
    None = 0 => None,
    Newline = 1 => Some("\n"),
    /// Leading indentation; payload is the depth in levels.
    Indent = 2 => None,
    /// Run of spaces; payload is the run length.
    Whitespace = 3 => None,

    Identifier = 8 => None,
    IntLiteral = 9 => None,
    FloatLiteral = 10 => None,
    StringLiteral = 11 => None,
    CharLiteral = 12 => None,
    Comment = 13 => None,
    DocComment = 14 => None,

    KwIf = 32 => Some("if"),
    KwThen = 33 => Some("then"),
    KwElse = 34 => Some("else"),
    KwFor = 35 => Some("for"),
    KwWhile = 36 => Some("while"),
    KwDo = 37 => Some("do"),
    KwUntil = 38 => Some("until"),
    KwBreak = 39 => Some("break"),
    KwContinue = 40 => Some("continue"),
    KwGoto = 41 => Some("goto"),
    KwSwitch = 42 => Some("switch"),
    KwCase = 43 => Some("case"),
    KwDefault = 44 => Some("default"),
    KwReturn = 45 => Some("return"),
    KwYield = 46 => Some("yield"),
    KwTry = 47 => Some("try"),
    KwUse = 48 => Some("use"),
    KwImport = 49 => Some("import"),
    KwVar = 50 => Some("var"),
    KwFunc = 51 => Some("func"),
    KwMethod = 52 => Some("method"),
    KwClass = 53 => Some("class"),
    KwInterface = 54 => Some("interface"),
    KwStruct = 55 => Some("struct"),
    KwUnion = 56 => Some("union"),
    KwEnum = 57 => Some("enum"),
    KwType = 58 => Some("type"),
    KwTemplate = 59 => Some("template"),
    KwConst = 60 => Some("const"),
    KwVolatile = 61 => Some("volatile"),
    KwSafe = 62 => Some("safe"),
    KwMutable = 63 => Some("mutable"),
    KwTrue = 64 => Some("true"),
    KwFalse = 65 => Some("false"),
    KwNull = 66 => Some("null"),
    KwIn = 67 => Some("in"),

    LParen = 96 => Some("("),
    RParen = 97 => Some(")"),
    LBracket = 98 => Some("["),
    RBracket = 99 => Some("]"),
    LBrace = 100 => Some("{"),
    RBrace = 101 => Some("}"),
    Comma = 102 => Some(","),
    Semicolon = 103 => Some(";"),
    Colon = 104 => Some(":"),
    Dot = 105 => Some("."),
    Arrow = 106 => Some("->"),
    Question = 107 => Some("?"),
    At = 108 => Some("@"),
    Ellipsis = 109 => Some("..."),
    Assign = 110 => Some("="),
    EqEq = 111 => Some("=="),
    NotEq = 112 => Some("!="),
    Lt = 113 => Some("<"),
    LtEq = 114 => Some("<="),
    Gt = 115 => Some(">"),
    GtEq = 116 => Some(">="),
    Plus = 117 => Some("+"),
    Minus = 118 => Some("-"),
    Star = 119 => Some("*"),
    Slash = 120 => Some("/"),
    Percent = 121 => Some("%"),
    Amp = 122 => Some("&"),
    Pipe = 123 => Some("|"),
    Caret = 124 => Some("^"),
    Tilde = 125 => Some("~"),
    Bang = 126 => Some("!"),
    AndAnd = 127 => Some("&&"),
    OrOr = 128 => Some("||"),
    Shl = 129 => Some("<<"),
    Shr = 130 => Some(">>"),
    PlusPlus = 131 => Some("++"),
    MinusMinus = 132 => Some("--"),
    PlusAssign = 133 => Some("+="),
    MinusAssign = 134 => Some("-="),
    StarAssign = 135 => Some("*="),
    SlashAssign = 136 => Some("/="),
    PercentAssign = 137 => Some("%="),
    AmpAssign = 138 => Some("&="),
    PipeAssign = 139 => Some("|="),
    CaretAssign = 140 => Some("^="),
    ShlAssign = 141 => Some("<<="),
    ShrAssign = 142 => Some(">>="),
}

impl TokenKind {
    /// How the bytes after the kind byte are interpreted.
    #[inline]
    pub const fn payload_class(self) -> PayloadClass {
        match self as u8 {
            2 | 3 => PayloadClass::Count,
            8..=15 => PayloadClass::Name,
            _ => PayloadClass::None,
        }
    }

    /// Bytes one token of this kind occupies in the stream.
    #[inline]
    pub const fn encoded_size(self) -> usize {
        match self.payload_class() {
            PayloadClass::None => 1,
            PayloadClass::Count => 2,
            PayloadClass::Name => 3,
        }
    }

    /// Whether the text comes from the static table rather than the payload.
    #[inline]
    pub const fn has_builtin_text(self) -> bool {
        self.builtin_text().is_some()
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        let v = self as u8;
        v >= 32 && v < 80
    }

    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Newline
                | TokenKind::Indent
                | TokenKind::Whitespace
                | TokenKind::Comment
                | TokenKind::DocComment
        )
    }

    #[inline]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwNull
        )
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_text() {
            Some("\n") => f.write_str("newline"),
            Some(text) => write!(f, "`{text}`"),
            None => f.write_str(self.name()),
        }
    }
}
