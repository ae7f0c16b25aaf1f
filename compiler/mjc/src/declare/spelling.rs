//! Type spellings as written in declarations.
//!
//! ```text
//! ty   := ("const" | "volatile") ty
//!       | "*" ty
//!       | "[" ty (";" len)? "]"
//!       | ident ("<" arg ("," arg)* ">")?
//! arg  := int | "true" | "false" | ty
//! len  := int | ident
//! ```

use mj_types::Qualifiers;

/// A parsed type spelling, borrowing identifiers from the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Spelling<'s> {
    Named {
        name: &'s str,
        /// `None` without angle brackets, `Some(vec![])` for `Name<>`.
        args: Option<Vec<SpellingArg<'s>>>,
    },
    Pointer(Box<Spelling<'s>>),
    Slice(Box<Spelling<'s>>),
    Array(Box<Spelling<'s>>, ArrayLen<'s>),
    Qualified(Box<Spelling<'s>>, Qualifiers),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayLen<'s> {
    Literal(u64),
    /// A variable template parameter.
    Param(&'s str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpellingArg<'s> {
    Type(Spelling<'s>),
    Int(i128),
    Bool(bool),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected} at column {}", .offset + 1)]
pub struct SpellingError {
    pub offset: usize,
    pub expected: &'static str,
}

/// Parse a complete spelling; trailing input is an error.
pub fn parse(text: &str) -> Result<Spelling<'_>, SpellingError> {
    let mut cursor = Cursor { text, pos: 0 };
    let ty = cursor.ty()?;
    cursor.skip_ws();
    if cursor.pos == text.len() {
        Ok(ty)
    } else {
        Err(cursor.error("end of type"))
    }
}

struct Cursor<'s> {
    text: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn rest(&self) -> &'s str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, expected: &'static str) -> SpellingError {
        SpellingError {
            offset: self.pos,
            expected,
        }
    }

    fn eat(&mut self, punct: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(punct) {
            self.pos += punct.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: char, expected: &'static str) -> Result<(), SpellingError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn ident(&mut self) -> Option<&'s str> {
        self.skip_ws();
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
            _ => return None,
        }
        let end = chars
            .find(|&(_, c)| !(c == '_' || c.is_ascii_alphanumeric()))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        Some(&rest[..end])
    }

    fn int(&mut self) -> Option<i128> {
        self.skip_ws();
        let rest = self.rest();
        let digits_from = usize::from(rest.starts_with('-'));
        let end = rest[digits_from..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(rest.len(), |i| i + digits_from);
        if end == digits_from {
            return None;
        }
        let value = rest[..end].parse().ok()?;
        self.pos += end;
        Some(value)
    }

    fn ty(&mut self) -> Result<Spelling<'s>, SpellingError> {
        if self.eat('*') {
            return Ok(Spelling::Pointer(Box::new(self.ty()?)));
        }
        if self.eat('[') {
            let elem = Box::new(self.ty()?);
            if self.eat(']') {
                return Ok(Spelling::Slice(elem));
            }
            self.expect(';', "`;` or `]`")?;
            let len = match self.int() {
                Some(n) => ArrayLen::Literal(u64::try_from(n).map_err(|_| self.error("array length"))?),
                None => ArrayLen::Param(self.ident().ok_or(self.error("array length"))?),
            };
            self.expect(']', "`]`")?;
            return Ok(Spelling::Array(elem, len));
        }

        let start = self.pos;
        let name = self.ident().ok_or(self.error("type"))?;
        let quals = match name {
            "const" => Qualifiers::CONST,
            "volatile" => Qualifiers::VOLATILE,
            _ => Qualifiers::empty(),
        };
        if !quals.is_empty() {
            let inner = self.ty()?;
            return Ok(Spelling::Qualified(Box::new(inner), quals));
        }
        if matches!(name, "true" | "false") {
            self.pos = start;
            return Err(self.error("type"));
        }

        let args = if self.eat('<') {
            let mut args = Vec::new();
            if !self.eat('>') {
                loop {
                    args.push(self.arg()?);
                    if self.eat('>') {
                        break;
                    }
                    self.expect(',', "`,` or `>`")?;
                }
            }
            Some(args)
        } else {
            None
        };
        Ok(Spelling::Named { name, args })
    }

    fn arg(&mut self) -> Result<SpellingArg<'s>, SpellingError> {
        if let Some(n) = self.int() {
            return Ok(SpellingArg::Int(n));
        }
        let save = self.pos;
        match self.ident() {
            Some("true") => return Ok(SpellingArg::Bool(true)),
            Some("false") => return Ok(SpellingArg::Bool(false)),
            _ => self.pos = save,
        }
        Ok(SpellingArg::Type(self.ty()?))
    }
}
