//! A line-oriented outline language standing in for the real lexer and
//! parser.
//!
//! ```text
//! module shapes
//! import core
//! struct List<T>
//!     value: T
//!     next: *List<T>
//! class Circle : Base, Shape
//!     radius: f64
//!     method area() -> f64
//! enum Level : u8
//!     Low
//!     High = 10
//! type IntList = List<i32>
//! func sum(first: i32, rest: ...i32) -> i64
//! ```
//!
//! Template parameters are `T`, `T = Default`, `N: u32 = 4` or `C<1>` for a
//! template taking one argument.

#![allow(dead_code)]

use mj_ir::item::{DefinitionData, ItemPayload, TemplateParamSyntax};
use mj_ir::token::{TokenKind, TokenStreamBuilder};
use mj_ir::{
    ItemId, ItemKind, ItemTreeBuilder, LexError, Lexer, Name, SourceFile, SourceInput, StringInterner,
    TokenSpan, TokenStream,
};
use mjc::{BuildReport, ParseError, ParseOutput, Parser, Session, SessionConfig};

/// One identifier token per whitespace-separated word, a newline token per
/// line. `$` is rejected.
pub struct WordLexer;

impl Lexer for WordLexer {
    fn lex(&self, text: &str, interner: &StringInterner) -> Result<TokenStream, Vec<LexError>> {
        let errors: Vec<LexError> = text
            .match_indices('$')
            .map(|(offset, _)| LexError {
                offset,
                message: "unexpected character `$`".to_owned(),
                unterminated: false,
            })
            .collect();
        if !errors.is_empty() {
            return Err(errors);
        }
        let mut builder = TokenStreamBuilder::new();
        for line in text.lines() {
            for word in line.split_whitespace() {
                builder.push_interned(TokenKind::Identifier, interner.intern(word));
            }
            builder.push_simple(TokenKind::Newline);
        }
        Ok(builder.finish())
    }
}

pub struct OutlineParser;

impl Parser for OutlineParser {
    fn parse(&self, source: &SourceFile, tokens: &TokenStream, interner: &StringInterner) -> ParseOutput {
        let spans = line_spans(tokens);
        let mut outline = Outline {
            interner,
            builder: ItemTreeBuilder::new(source.id()),
            top: Vec::new(),
            open: None,
            module: Name::EMPTY,
            errors: Vec::new(),
        };
        for (index, line) in source.text().lines().enumerate() {
            let span = spans.get(index).copied().unwrap_or_default();
            outline.line(line, span);
        }
        outline.close();

        let Outline {
            mut builder,
            top,
            module,
            errors,
            ..
        } = outline;
        let root = builder.push(
            ItemKind::Module,
            TokenSpan::default(),
            ItemPayload::Module { name: module },
            &top,
        );
        let tree = root.and_then(|root| builder.finish(root));
        match tree {
            Ok(tree) => {
                let mut output = ParseOutput::from_tree(tree);
                output.errors = errors;
                output
            }
            Err(err) => ParseOutput::failed(vec![ParseError::new(TokenSpan::default(), err.to_string())]),
        }
    }
}

/// Span of each line's tokens, newline excluded.
fn line_spans(tokens: &TokenStream) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut start = None;
    let mut count = 0;
    for (offset, token) in tokens.cursor() {
        if token.kind() == TokenKind::Newline {
            spans.push(TokenSpan::new(start.unwrap_or(offset), count));
            start = None;
            count = 0;
        } else {
            start.get_or_insert(offset);
            count += 1;
        }
    }
    spans
}

/// A definition whose members are still being read.
struct Open {
    kind: ItemKind,
    data: DefinitionData,
    span: TokenSpan,
    children: Vec<ItemId>,
}

struct Outline<'i> {
    interner: &'i StringInterner,
    builder: ItemTreeBuilder,
    top: Vec<ItemId>,
    open: Option<Open>,
    module: Name,
    errors: Vec<ParseError>,
}

impl Outline<'_> {
    fn name(&self, text: &str) -> Name {
        self.interner.intern(text.trim())
    }

    fn push(&mut self, kind: ItemKind, span: TokenSpan, payload: ItemPayload, children: &[ItemId]) -> Option<ItemId> {
        match self.builder.push(kind, span, payload, children) {
            Ok(id) => Some(id),
            Err(err) => {
                self.errors.push(ParseError::new(span, err.to_string()));
                None
            }
        }
    }

    fn error(&mut self, span: TokenSpan, message: impl Into<String>) {
        self.errors.push(ParseError::new(span, message));
    }

    fn close(&mut self) {
        if let Some(open) = self.open.take() {
            if let Some(id) = self.push(open.kind, open.span, ItemPayload::definition(open.data), &open.children) {
                self.top.push(id);
            }
        }
    }

    fn line(&mut self, line: &str, span: TokenSpan) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        if line.starts_with(char::is_whitespace) {
            self.member(trimmed, span);
        } else {
            self.close();
            self.header(trimmed, span);
        }
    }

    fn header(&mut self, line: &str, span: TokenSpan) {
        let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match keyword {
            "module" => self.module = self.name(rest),
            "import" => {
                let path = self.name(rest);
                if let Some(id) = self.push(ItemKind::Import, span, ItemPayload::Import { path, alias: None }, &[]) {
                    self.top.push(id);
                }
            }
            "struct" | "union" | "class" | "interface" => {
                let kind = match keyword {
                    "struct" => ItemKind::StructureDefinition,
                    "union" => ItemKind::UnionDefinition,
                    "class" => ItemKind::ClassDefinition,
                    _ => ItemKind::InterfaceDefinition,
                };
                let (head, bases) = split_bases(rest);
                let (name, params) = self.name_and_params(head, span);
                let bases: Vec<Name> = split_top(bases).iter().map(|b| self.name(b)).collect();
                self.open(kind, DefinitionData::named(name).with_bases(bases), span, params);
            }
            "enum" => {
                let (head, index) = rest.split_once(':').unwrap_or((rest, ""));
                let mut data = DefinitionData::named(self.name(head));
                if !index.trim().is_empty() {
                    data = data.with_type(self.name(index));
                }
                self.open(ItemKind::EnumerationDefinition, data, span, None);
            }
            "type" => {
                let Some((head, target)) = rest.split_once('=') else {
                    self.error(span, "expected `=` in type alias");
                    return;
                };
                let (name, params) = self.name_and_params(head, span);
                let data = DefinitionData::named(name).with_type(self.name(target));
                self.open(ItemKind::TypeAliasDefinition, data, span, params);
            }
            "func" => {
                if let Some((data, children)) = self.callable(rest, span) {
                    self.open = Some(Open {
                        kind: ItemKind::FunctionDefinition,
                        data,
                        span,
                        children,
                    });
                }
            }
            other => self.error(span, format!("unknown declaration `{other}`")),
        }
    }

    fn open(&mut self, kind: ItemKind, data: DefinitionData, span: TokenSpan, params: Option<ItemId>) {
        self.open = Some(Open {
            kind,
            data,
            span,
            children: params.into_iter().collect(),
        });
    }

    fn member(&mut self, line: &str, span: TokenSpan) {
        let Some(kind) = self.open.as_ref().map(|o| o.kind) else {
            self.error(span, "member outside a definition");
            return;
        };
        let item = if let Some(rest) = line.strip_prefix("method ") {
            self.callable(rest, span).and_then(|(data, children)| {
                self.push(ItemKind::MethodDefinition, span, ItemPayload::definition(data), &children)
            })
        } else if kind == ItemKind::EnumerationDefinition {
            let (name, value) = line.split_once('=').unwrap_or((line, ""));
            let data = DefinitionData::named(self.name(name));
            let init = if value.trim().is_empty() {
                Vec::new()
            } else {
                let text = self.name(value);
                self.push(ItemKind::IntegerLiteral, span, ItemPayload::Literal(text), &[])
                    .into_iter()
                    .collect()
            };
            self.push(ItemKind::VariableDefinition, span, ItemPayload::definition(data), &init)
        } else if let Some((name, ty)) = line.split_once(':') {
            let data = DefinitionData::named(self.name(name)).with_type(self.name(ty));
            self.push(ItemKind::VariableDefinition, span, ItemPayload::definition(data), &[])
        } else {
            self.error(span, "expected `name: type`");
            None
        };
        if let (Some(item), Some(open)) = (item, self.open.as_mut()) {
            open.children.push(item);
        }
    }

    /// `name<params>(a: T, b: U) -> R`
    fn callable(&mut self, text: &str, span: TokenSpan) -> Option<(DefinitionData, Vec<ItemId>)> {
        let Some((head, rest)) = text.split_once('(') else {
            self.error(span, "expected `(`");
            return None;
        };
        let Some((params, ret)) = rest.rsplit_once(')') else {
            self.error(span, "expected `)`");
            return None;
        };
        let (name, template) = self.name_and_params(head, span);
        let mut data = DefinitionData::named(name);
        if let Some(ret) = ret.trim().strip_prefix("->") {
            data = data.with_type(self.name(ret));
        }
        let mut children: Vec<ItemId> = template.into_iter().collect();
        for param in split_top(params) {
            let Some((name, ty)) = param.split_once(':') else {
                self.error(span, format!("parameter `{param}` has no type"));
                continue;
            };
            let data = DefinitionData::named(self.name(name)).with_type(self.name(ty));
            children.extend(self.push(ItemKind::VariableDefinition, span, ItemPayload::definition(data), &[]));
        }
        Some((data, children))
    }

    /// `Name` or `Name<params>`, building the parameter list item.
    fn name_and_params(&mut self, head: &str, span: TokenSpan) -> (Name, Option<ItemId>) {
        let head = head.trim();
        let Some((name, params)) = head.split_once('<') else {
            return (self.name(head), None);
        };
        let params = params.strip_suffix('>').unwrap_or(params);
        let mut ids = Vec::new();
        for param in split_top(params) {
            ids.extend(self.template_param(&param, span));
        }
        let list = self.push(ItemKind::TemplateParameterList, span, ItemPayload::None, &ids);
        (self.name(name), list)
    }

    fn template_param(&mut self, text: &str, span: TokenSpan) -> Option<ItemId> {
        let (decl, default) = match text.split_once('=') {
            Some((decl, default)) => (decl.trim(), Some(default.trim())),
            None => (text.trim(), None),
        };
        let (name, kind) = if let Some((name, ty)) = decl.split_once(':') {
            (name, TemplateParamSyntax::Variable(self.name(ty)))
        } else if let Some((name, arity)) = decl.split_once('<') {
            let arity = arity.trim_end_matches('>').trim().parse().unwrap_or(1);
            (name, TemplateParamSyntax::Template(arity))
        } else {
            (decl, TemplateParamSyntax::Type)
        };
        let default = default.and_then(|value| self.value(value, span));
        let name = self.name(name);
        let children: Vec<ItemId> = default.into_iter().collect();
        self.push(
            ItemKind::TemplateParameter,
            span,
            ItemPayload::TemplateParameter { name, kind },
            &children,
        )
    }

    fn value(&mut self, text: &str, span: TokenSpan) -> Option<ItemId> {
        match text {
            "true" | "false" => self.push(ItemKind::BooleanLiteral, span, ItemPayload::Bool(text == "true"), &[]),
            _ if text.starts_with(|c: char| c.is_ascii_digit()) => {
                let literal = self.name(text);
                self.push(ItemKind::IntegerLiteral, span, ItemPayload::Literal(literal), &[])
            }
            _ => {
                let name = self.name(text);
                self.push(ItemKind::VariableReference, span, ItemPayload::Name(name), &[])
            }
        }
    }
}

/// `Name<params> : A, B` into the head and the base list; colons inside
/// the parameter list belong to the head.
fn split_bases(text: &str) -> (&str, &str) {
    let after = text.rfind('>').map_or(0, |close| close + 1);
    match text[after..].find(':') {
        Some(colon) => (&text[..after + colon], &text[after + colon + 1..]),
        None => (text, ""),
    }
}

/// Split on commas outside angle brackets.
fn split_top(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .collect()
}

/// A session with the given `(path, text)` sources, built with the outline
/// collaborators.
pub fn build(config: SessionConfig, files: &[(&str, &str)]) -> (Session, BuildReport) {
    let session = Session::new(config);
    let ids: Vec<_> = files
        .iter()
        .map(|(path, text)| {
            session
                .add_source(SourceInput::new(*path, *text))
                .unwrap_or_else(|e| panic!("{e}"))
        })
        .collect();
    let report = session.build(&WordLexer, &OutlineParser, &ids);
    (session, report)
}
