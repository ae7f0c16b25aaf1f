//! Declaration pass: turn a module's definitions into types.
//!
//! Runs in four steps so declarations may refer to each other in any order:
//!
//! 1. declare every nominal definition (structure, union, class, interface,
//!    enumeration) so its `Idx` exists
//! 2. register templates, then resolve aliases in source order
//! 3. attach bodies to the nominal definitions
//! 4. intern function signatures
//!
//! Names resolve against primitives, then the module's own declarations,
//! then each import in order.

mod error;
pub mod spelling;

use mj_diagnostic::DiagnosticQueue;
use mj_ir::item::views::{
    BooleanLiteral, ClassDefinition, EnumerationDefinition, FunctionDefinition, IntegerLiteral,
    InterfaceDefinition, MethodDefinition, TemplateParameterList, TypeAliasDefinition,
    VariableDefinition, VariableReference,
};
use mj_ir::item::{Definition, TemplateParamSyntax};
use mj_ir::{ItemId, ItemKind, ItemRef, ItemTree, Name, TokenSpan};
use mj_types::registry::{number_constants, Method};
use mj_types::template::{
    ArgExpr, ConstValue, FieldExpr, MethodExpr, TemplateBody, TemplateDef, TemplateParamKind,
    TemplateParameter, TypeExpr,
};
use mj_types::{DefBody, DefKind, DefRequest, Idx, Member, TemplateArgument, TemplateId, TypeContext};
use rustc_hash::FxHashMap;

pub use error::DeclareError;
use spelling::{ArrayLen, Spelling, SpellingArg};

/// A non-template function and its interned signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Name,
    pub signature: Idx,
    pub item: ItemId,
}

/// What a module makes visible to its importers.
#[derive(Clone, Debug, Default)]
pub struct Exports {
    types: FxHashMap<Name, Idx>,
    templates: FxHashMap<Name, TemplateId>,
    functions: Vec<FunctionDecl>,
}

impl Exports {
    /// A nominal type or alias declared under `name`.
    pub fn get_type(&self, name: Name) -> Option<Idx> {
        self.types.get(&name).copied()
    }

    pub fn get_template(&self, name: Name) -> Option<TemplateId> {
        self.templates.get(&name).copied()
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }

    /// Signatures of every function named `name`, for overload resolution.
    pub fn overloads(&self, name: Name) -> Vec<Idx> {
        self.functions
            .iter()
            .filter(|f| f.name == name)
            .map(|f| f.signature)
            .collect()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    fn is_declared(&self, name: Name) -> bool {
        self.types.contains_key(&name) || self.templates.contains_key(&name)
    }
}

/// Declare everything in `tree`, reporting problems to `queue`.
///
/// Declarations that fail resolve to [`Idx::ERROR`] so the rest of the
/// module is still declared.
#[tracing::instrument(level = "debug", skip_all, fields(source = ?tree.source()))]
pub(crate) fn declare_module(
    ctx: &TypeContext,
    tree: &ItemTree,
    imports: &[&Exports],
    queue: &mut DiagnosticQueue,
) -> Exports {
    let mut declarer = Declarer {
        ctx,
        tree,
        imports,
        exports: Exports::default(),
        queue,
    };
    declarer.run();
    tracing::debug!(
        types = declarer.exports.types.len(),
        templates = declarer.exports.templates.len(),
        functions = declarer.exports.functions.len(),
        "declared module"
    );
    declarer.exports
}

/// A name found in scope.
#[derive(Copy, Clone)]
enum Entry {
    Type(Idx),
    Template(TemplateId),
}

/// Parameters visible while building a template body.
struct TemplateScope<'s> {
    id: TemplateId,
    name: Name,
    params: Vec<&'s str>,
}

impl TemplateScope<'_> {
    fn param(&self, name: &str) -> Option<u16> {
        self.params
            .iter()
            .position(|p| *p == name)
            .and_then(|i| u16::try_from(i).ok())
    }
}

struct Declarer<'a> {
    ctx: &'a TypeContext,
    tree: &'a ItemTree,
    imports: &'a [&'a Exports],
    exports: Exports,
    queue: &'a mut DiagnosticQueue,
}

fn nominal_kind(kind: ItemKind) -> Option<DefKind> {
    match kind {
        ItemKind::StructureDefinition => Some(DefKind::Structure),
        ItemKind::UnionDefinition => Some(DefKind::Union),
        ItemKind::ClassDefinition => Some(DefKind::Class),
        ItemKind::InterfaceDefinition => Some(DefKind::Interface),
        ItemKind::EnumerationDefinition => Some(DefKind::Enumeration),
        _ => None,
    }
}

impl<'a> Declarer<'a> {
    fn run(&mut self) {
        let tree = self.tree;
        let definitions: Vec<Definition<'a>> = tree.root().items::<Definition<'a>>().collect();

        let mut pending = Vec::new();
        for &def in &definitions {
            if let Some(kind) = nominal_kind(def.kind()).filter(|_| !def.is_template()) {
                if let Some(ty) = self.declare_nominal(def, kind) {
                    pending.push((def, ty));
                }
            }
        }

        for &def in definitions.iter().filter(|d| d.is_template()) {
            self.declare_template(def);
        }
        for &def in &definitions {
            if def.kind() == ItemKind::TypeAliasDefinition && !def.is_template() {
                self.declare_alias(def);
            }
        }

        for (def, ty) in pending {
            self.define_nominal(def, ty);
        }

        for &def in &definitions {
            if def.kind() == ItemKind::FunctionDefinition && !def.is_template() {
                let function = def.cast::<FunctionDefinition<'a>>();
                let signature = self.signature(function);
                self.exports.functions.push(FunctionDecl {
                    name: def.name(),
                    signature,
                    item: def.id(),
                });
            }
        }
    }

    fn report(&mut self, err: DeclareError, span: TokenSpan) {
        self.queue
            .add(err.to_diagnostic(self.ctx, self.tree.source(), span));
    }

    // === Step 1: nominal declarations ===

    fn declare_nominal(&mut self, def: Definition<'a>, kind: DefKind) -> Option<Idx> {
        let name = def.name();
        let request = if name == Name::EMPTY {
            DefRequest::anonymous(kind)
        } else {
            if self.exports.is_declared(name) {
                self.report(DeclareError::Duplicate { name }, def.span());
                return None;
            }
            DefRequest::named(name, kind)
        };
        let request = match def.locator() {
            Ok(locator) => request.at(locator),
            Err(_) => request,
        };
        match self.ctx.declare(request) {
            Ok(declared) => {
                if name != Name::EMPTY {
                    self.exports.types.insert(name, declared.ty);
                }
                Some(declared.ty)
            }
            Err(err) => {
                self.report(err.into(), def.span());
                None
            }
        }
    }

    // === Step 2: templates and aliases ===

    fn declare_template(&mut self, def: Definition<'a>) {
        let name = def.name();
        if self.exports.is_declared(name) {
            self.report(DeclareError::Duplicate { name }, def.span());
            return;
        }
        let unsupported = match def.kind() {
            ItemKind::InterfaceDefinition => Some("interfaces"),
            ItemKind::EnumerationDefinition => Some("enumerations"),
            ItemKind::VariableDefinition | ItemKind::MethodDefinition => Some("variables and methods"),
            _ => None,
        };
        if let Some(what) = unsupported {
            self.report(DeclareError::UnsupportedTemplate { what }, def.span());
            return;
        }

        let Some(list) = def.template_parameters() else {
            return;
        };
        let params = self.template_params(list);
        let ctx = self.ctx;
        let names: Vec<&str> = params.iter().map(|p| ctx.name(p.name)).collect();

        // The closure runs under the template registry lock: it builds
        // expressions from names only.
        let mut errors = Vec::new();
        let this = &*self;
        let registered = ctx.register_template_with(|id| {
            let scope = TemplateScope { id, name, params: names };
            TemplateDef {
                name,
                params,
                body: this.template_body(def, &scope, &mut errors),
            }
        });
        for (err, span) in errors {
            self.report(err, span);
        }
        match registered {
            Ok(id) => {
                self.exports.templates.insert(name, id);
            }
            Err(err) => self.report(err.into(), def.span()),
        }
    }

    fn template_params(&mut self, list: TemplateParameterList<'a>) -> Vec<TemplateParameter> {
        list.parameters()
            .map(|param| {
                let kind = match param.syntax() {
                    TemplateParamSyntax::Type => TemplateParamKind::Type,
                    TemplateParamSyntax::Variable(ty) => TemplateParamKind::Variable {
                        ty: self.resolve_name(ty, param.span()),
                    },
                    TemplateParamSyntax::Template(arity) => TemplateParamKind::Template { arity },
                };
                TemplateParameter {
                    name: param.name(),
                    kind,
                    default: param.default_value().and_then(|value| self.default_argument(value)),
                }
            })
            .collect()
    }

    fn default_argument(&mut self, value: ItemRef<'a>) -> Option<TemplateArgument> {
        if let Ok(literal) = value.try_cast::<IntegerLiteral<'a>>() {
            return match self.integer(literal) {
                Some(n) => Some(TemplateArgument::Variable(ConstValue::Int(n))),
                None => {
                    let text = self.ctx.name(literal.text()).to_owned();
                    self.report(DeclareError::ConstantValue { name: text }, value.span());
                    None
                }
            };
        }
        if let Ok(literal) = value.try_cast::<BooleanLiteral<'a>>() {
            return Some(TemplateArgument::Variable(ConstValue::Bool(literal.value())));
        }
        let Ok(reference) = value.try_cast::<VariableReference<'a>>() else {
            self.report(
                DeclareError::MissingType {
                    name: "template default".to_owned(),
                },
                value.span(),
            );
            return None;
        };
        let text = self.ctx.name(reference.name());
        if let Some(Entry::Template(id)) = self.lookup(text) {
            return Some(TemplateArgument::Template(id));
        }
        Some(TemplateArgument::Type(self.resolve_name(reference.name(), value.span())))
    }

    fn template_body(
        &self,
        def: Definition<'a>,
        scope: &TemplateScope<'_>,
        errors: &mut Vec<(DeclareError, TokenSpan)>,
    ) -> TemplateBody {
        let mut expr = |name: Option<Name>, what: Name, span: TokenSpan| match name {
            Some(name) => self
                .template_expr_text(self.ctx.name(name), scope)
                .unwrap_or_else(|err| {
                    errors.push((err, span));
                    TypeExpr::Concrete(Idx::ERROR)
                }),
            None => {
                errors.push((self.missing(what), span));
                TypeExpr::Concrete(Idx::ERROR)
            }
        };

        match def.kind() {
            ItemKind::StructureDefinition | ItemKind::UnionDefinition => {
                let fields: Vec<FieldExpr> = def
                    .items::<VariableDefinition<'a>>()
                    .map(|field| FieldExpr::new(field.name(), expr(field.type_name(), field.name(), field.span())))
                    .collect();
                if def.kind() == ItemKind::UnionDefinition {
                    TemplateBody::Union(fields)
                } else {
                    TemplateBody::Structure(fields)
                }
            }
            ItemKind::ClassDefinition => {
                let class = def.cast::<ClassDefinition<'a>>();
                let base = class
                    .base()
                    .map(|base| expr(Some(base), base, def.span()));
                let fields = class
                    .fields()
                    .map(|field| FieldExpr::new(field.name(), expr(field.type_name(), field.name(), field.span())))
                    .collect();
                let methods = class
                    .methods()
                    .map(|method| {
                        let (params, _) = self.template_params_of(method.parameters(), scope, errors);
                        MethodExpr {
                            name: method.name(),
                            params,
                            ret: self.template_return(method.return_type(), scope, errors, method.span()),
                        }
                    })
                    .collect();
                TemplateBody::Class {
                    base,
                    fields,
                    methods,
                }
            }
            ItemKind::TypeAliasDefinition => {
                let alias = def.cast::<TypeAliasDefinition<'a>>();
                TemplateBody::Alias(expr(alias.target(), def.name(), def.span()))
            }
            // Other kinds were rejected before registration.
            _ => {
                let function = def.cast::<FunctionDefinition<'a>>();
                let (params, variadic) = self.template_params_of(function.parameters(), scope, errors);
                TemplateBody::Function {
                    params,
                    ret: self.template_return(function.return_type(), scope, errors, def.span()),
                    variadic,
                }
            }
        }
    }

    fn template_params_of(
        &self,
        params: impl Iterator<Item = VariableDefinition<'a>>,
        scope: &TemplateScope<'_>,
        errors: &mut Vec<(DeclareError, TokenSpan)>,
    ) -> (Vec<TypeExpr>, bool) {
        let params: Vec<VariableDefinition<'a>> = params.collect();
        let mut variadic = false;
        let exprs = params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let Some(ty) = param.type_name() else {
                    errors.push((self.missing(param.name()), param.span()));
                    return TypeExpr::Concrete(Idx::ERROR);
                };
                let text = self.ctx.name(ty);
                let (text, is_rest) = split_variadic(text);
                if is_rest && i + 1 != params.len() {
                    errors.push((misplaced_variadic(self.ctx.name(ty)), param.span()));
                    return TypeExpr::Concrete(Idx::ERROR);
                }
                variadic |= is_rest;
                match self.template_expr_text(text, scope) {
                    Ok(elem) if is_rest => TypeExpr::slice(elem),
                    Ok(ty) => ty,
                    Err(err) => {
                        errors.push((err, param.span()));
                        TypeExpr::Concrete(Idx::ERROR)
                    }
                }
            })
            .collect();
        (exprs, variadic)
    }

    fn template_return(
        &self,
        ret: Option<Name>,
        scope: &TemplateScope<'_>,
        errors: &mut Vec<(DeclareError, TokenSpan)>,
        span: TokenSpan,
    ) -> TypeExpr {
        let Some(ret) = ret else {
            return TypeExpr::Concrete(Idx::VOID);
        };
        self.template_expr_text(self.ctx.name(ret), scope)
            .unwrap_or_else(|err| {
                errors.push((err, span));
                TypeExpr::Concrete(Idx::ERROR)
            })
    }

    fn template_expr_text(&self, text: &str, scope: &TemplateScope<'_>) -> Result<TypeExpr, DeclareError> {
        let spelling = spelling::parse(text).map_err(|error| DeclareError::Malformed {
            spelling: text.to_owned(),
            error,
        })?;
        self.template_expr(&spelling, scope)
    }

    /// A spelling inside a template body, where parameters are in scope.
    fn template_expr(&self, spelling: &Spelling<'_>, scope: &TemplateScope<'_>) -> Result<TypeExpr, DeclareError> {
        Ok(match spelling {
            Spelling::Pointer(inner) => TypeExpr::pointer(self.template_expr(inner, scope)?),
            Spelling::Slice(inner) => TypeExpr::slice(self.template_expr(inner, scope)?),
            Spelling::Array(inner, ArrayLen::Literal(len)) => {
                TypeExpr::Array(Box::new(self.template_expr(inner, scope)?), *len)
            }
            Spelling::Array(inner, ArrayLen::Param(param)) => TypeExpr::ArrayOfParam {
                elem: Box::new(self.template_expr(inner, scope)?),
                len_param: scope.param(param).ok_or_else(|| unknown(param))?,
            },
            Spelling::Qualified(inner, quals) => {
                TypeExpr::Qualified(Box::new(self.template_expr(inner, scope)?), *quals)
            }
            Spelling::Named { name, args } => {
                if let Some(param) = scope.param(name) {
                    return Ok(match args {
                        None => TypeExpr::Param(param),
                        Some(args) => TypeExpr::ApplyParam {
                            param,
                            args: self.arg_exprs(args, scope)?,
                        },
                    });
                }
                if args.is_none() {
                    if let Some(primitive) = Idx::primitive_by_name(name) {
                        return Ok(TypeExpr::Concrete(primitive));
                    }
                }
                let target = if self.ctx.interner().get(name) == Some(scope.name) {
                    Some(Entry::Template(scope.id))
                } else {
                    self.lookup(name)
                };
                match (target, args) {
                    (Some(Entry::Type(ty)), None) => TypeExpr::Concrete(ty),
                    (Some(Entry::Type(_)), Some(_)) => {
                        return Err(DeclareError::NotATemplate {
                            name: (*name).to_owned(),
                        })
                    }
                    (Some(Entry::Template(template)), args) => TypeExpr::Apply {
                        template,
                        args: self.arg_exprs(args.as_deref().unwrap_or_default(), scope)?,
                    },
                    (None, _) => return Err(unknown(name)),
                }
            }
        })
    }

    fn arg_exprs(&self, args: &[SpellingArg<'_>], scope: &TemplateScope<'_>) -> Result<Vec<ArgExpr>, DeclareError> {
        args.iter()
            .map(|arg| {
                Ok(match arg {
                    SpellingArg::Int(n) => ArgExpr::Value(ConstValue::Int(*n)),
                    SpellingArg::Bool(b) => ArgExpr::Value(ConstValue::Bool(*b)),
                    SpellingArg::Type(Spelling::Named { name, args: None }) => {
                        match (scope.param(name), self.lookup(name)) {
                            (Some(param), _) => ArgExpr::Param(param),
                            (None, Some(Entry::Template(template))) => ArgExpr::Template(template),
                            _ => ArgExpr::Type(self.template_expr(
                                &Spelling::Named { name: *name, args: None },
                                scope,
                            )?),
                        }
                    }
                    SpellingArg::Type(ty) => ArgExpr::Type(self.template_expr(ty, scope)?),
                })
            })
            .collect()
    }

    fn declare_alias(&mut self, def: Definition<'a>) {
        let name = def.name();
        if self.exports.is_declared(name) {
            self.report(DeclareError::Duplicate { name }, def.span());
            return;
        }
        let alias = def.cast::<TypeAliasDefinition<'a>>();
        let target = self.declared_type(alias.target(), name, def.span());
        self.exports.types.insert(name, target);
    }

    // === Step 3: bodies ===

    fn define_nominal(&mut self, def: Definition<'a>, ty: Idx) {
        let body = match def.kind() {
            ItemKind::ClassDefinition => {
                let class = def.cast::<ClassDefinition<'a>>();
                let mut body = DefBody::with_members(self.fields(class.fields()));
                if let Some(base) = class.base() {
                    body = body.with_base(self.resolve_name(base, def.span()));
                }
                let interfaces: Vec<Idx> = class
                    .interfaces()
                    .iter()
                    .map(|&i| self.resolve_name(i, def.span()))
                    .collect();
                body = body.with_interfaces(interfaces);
                body.methods = self.methods(class.methods());
                body
            }
            ItemKind::InterfaceDefinition => {
                let interface = def.cast::<InterfaceDefinition<'a>>();
                let bases: Vec<Idx> = interface
                    .bases()
                    .iter()
                    .map(|&b| self.resolve_name(b, def.span()))
                    .collect();
                let mut body = DefBody::default().with_interfaces(bases);
                body.methods = self.methods(interface.methods());
                body
            }
            ItemKind::EnumerationDefinition => {
                let enumeration = def.cast::<EnumerationDefinition<'a>>();
                let index = match enumeration.index_type() {
                    Some(index) => self.resolve_name(index, def.span()),
                    None => Idx::I32,
                };
                let constants: Vec<(Name, Option<i128>)> = enumeration
                    .constants()
                    .map(|constant| (constant.name(), self.constant_value(constant)))
                    .collect();
                DefBody::enumeration(index, number_constants(constants))
            }
            _ => DefBody::with_members(self.fields(def.items::<VariableDefinition<'a>>())),
        };
        if let Err(err) = self.ctx.define(ty, body) {
            self.report(err.into(), def.span());
        }
    }

    fn fields(&mut self, fields: impl Iterator<Item = VariableDefinition<'a>>) -> Vec<Member> {
        fields
            .map(|field| Member {
                name: field.name(),
                ty: self.declared_type(field.type_name(), field.name(), field.span()),
            })
            .collect()
    }

    fn methods(&mut self, methods: impl Iterator<Item = MethodDefinition<'a>>) -> Vec<Method> {
        methods
            .map(|method| {
                let (params, variadic) = self.params(method.parameters());
                let ret = self.return_type(method.return_type(), method.span());
                Method {
                    name: method.name(),
                    signature: self.ctx.pool().function(params, ret, variadic),
                    is_static: false,
                }
            })
            .collect()
    }

    fn constant_value(&mut self, constant: VariableDefinition<'a>) -> Option<i128> {
        let init = constant.initializer()?;
        let value = init
            .try_cast::<IntegerLiteral<'a>>()
            .ok()
            .and_then(|literal| self.integer(literal));
        if value.is_none() {
            let name = self.ctx.name(constant.name()).to_owned();
            self.report(DeclareError::ConstantValue { name }, init.span());
        }
        value
    }

    fn integer(&self, literal: IntegerLiteral<'a>) -> Option<i128> {
        let text = self.ctx.name(literal.text()).replace('_', "");
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => i128::from_str_radix(hex, 16).ok(),
            None => text.parse().ok(),
        }
    }

    // === Step 4: functions ===

    fn signature(&mut self, function: FunctionDefinition<'a>) -> Idx {
        let (params, variadic) = self.params(function.parameters());
        let ret = self.return_type(function.return_type(), function.span());
        self.ctx.pool().function(params, ret, variadic)
    }

    /// Parameter types; a trailing `...T` makes the function variadic over `[T]`.
    fn params(&mut self, params: impl Iterator<Item = VariableDefinition<'a>>) -> (Vec<Idx>, bool) {
        let params: Vec<VariableDefinition<'a>> = params.collect();
        let mut variadic = false;
        let mut types = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let Some(ty) = param.type_name() else {
                self.report(self.missing(param.name()), param.span());
                types.push(Idx::ERROR);
                continue;
            };
            let full = self.ctx.name(ty);
            let (text, is_rest) = split_variadic(full);
            if is_rest && i + 1 != params.len() {
                self.report(misplaced_variadic(full), param.span());
                types.push(Idx::ERROR);
                continue;
            }
            let resolved = self.resolve_text(text).unwrap_or_else(|err| {
                self.report(err, param.span());
                Idx::ERROR
            });
            if is_rest {
                variadic = true;
                types.push(self.ctx.pool().slice(resolved));
            } else {
                types.push(resolved);
            }
        }
        (types, variadic)
    }

    fn return_type(&mut self, ret: Option<Name>, span: TokenSpan) -> Idx {
        match ret {
            Some(ret) => self.resolve_name(ret, span),
            None => Idx::VOID,
        }
    }

    // === Concrete resolution ===

    fn declared_type(&mut self, ty: Option<Name>, owner: Name, span: TokenSpan) -> Idx {
        match ty {
            Some(ty) => self.resolve_name(ty, span),
            None => {
                self.report(self.missing(owner), span);
                Idx::ERROR
            }
        }
    }

    fn resolve_name(&mut self, spelled: Name, span: TokenSpan) -> Idx {
        let text = self.ctx.name(spelled);
        self.resolve_text(text).unwrap_or_else(|err| {
            self.report(err, span);
            Idx::ERROR
        })
    }

    fn resolve_text(&self, text: &str) -> Result<Idx, DeclareError> {
        let spelling = spelling::parse(text).map_err(|error| DeclareError::Malformed {
            spelling: text.to_owned(),
            error,
        })?;
        self.concrete(&spelling)
    }

    fn concrete(&self, spelling: &Spelling<'_>) -> Result<Idx, DeclareError> {
        let pool = self.ctx.pool();
        Ok(match spelling {
            Spelling::Pointer(inner) => pool.pointer(self.concrete(inner)?),
            Spelling::Slice(inner) => pool.slice(self.concrete(inner)?),
            Spelling::Array(inner, ArrayLen::Literal(len)) => pool.array(self.concrete(inner)?, *len),
            Spelling::Array(_, ArrayLen::Param(param)) => return Err(unknown(param)),
            Spelling::Qualified(inner, quals) => pool.qualified(self.concrete(inner)?, *quals),
            Spelling::Named { name, args } => {
                if args.is_none() {
                    if let Some(primitive) = Idx::primitive_by_name(name) {
                        return Ok(primitive);
                    }
                }
                match (self.lookup(name), args) {
                    (Some(Entry::Type(ty)), None) => ty,
                    (Some(Entry::Type(_)), Some(_)) => {
                        return Err(DeclareError::NotATemplate {
                            name: (*name).to_owned(),
                        })
                    }
                    // A bare template name takes its defaults.
                    (Some(Entry::Template(template)), args) => {
                        let args = args
                            .iter()
                            .flatten()
                            .map(|arg| self.concrete_arg(arg))
                            .collect::<Result<Vec<_>, _>>()?;
                        self.ctx.specialize_type(template, &args)?
                    }
                    (None, _) => return Err(unknown(name)),
                }
            }
        })
    }

    fn concrete_arg(&self, arg: &SpellingArg<'_>) -> Result<TemplateArgument, DeclareError> {
        Ok(match arg {
            SpellingArg::Int(n) => TemplateArgument::Variable(ConstValue::Int(*n)),
            SpellingArg::Bool(b) => TemplateArgument::Variable(ConstValue::Bool(*b)),
            SpellingArg::Type(Spelling::Named { name, args: None }) => match self.lookup(name) {
                Some(Entry::Template(template)) => TemplateArgument::Template(template),
                _ => TemplateArgument::Type(self.concrete(&Spelling::Named {
                    name: *name,
                    args: None,
                })?),
            },
            SpellingArg::Type(ty) => TemplateArgument::Type(self.concrete(ty)?),
        })
    }

    /// Own declarations first, then imports in order.
    fn lookup(&self, name: &str) -> Option<Entry> {
        let name = self.ctx.interner().get(name)?;
        std::iter::once(&self.exports)
            .chain(self.imports.iter().copied())
            .find_map(|exports| {
                exports
                    .get_type(name)
                    .map(Entry::Type)
                    .or_else(|| exports.get_template(name).map(Entry::Template))
            })
    }

    fn missing(&self, name: Name) -> DeclareError {
        DeclareError::MissingType {
            name: self.ctx.name(name).to_owned(),
        }
    }
}

fn split_variadic(text: &str) -> (&str, bool) {
    match text.strip_prefix("...") {
        Some(rest) => (rest, true),
        None => (text, false),
    }
}

fn misplaced_variadic(text: &str) -> DeclareError {
    DeclareError::Malformed {
        spelling: text.to_owned(),
        error: spelling::SpellingError {
            offset: 0,
            expected: "a type (only the last parameter may be variadic)",
        },
    }
}

fn unknown(name: &str) -> DeclareError {
    DeclareError::UnknownType {
        spelling: name.to_owned(),
    }
}
