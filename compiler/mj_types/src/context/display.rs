//! Human-readable type names for diagnostics.

use std::fmt::Write;

use crate::template::{SpecializationKey, TemplateArgument, TemplateId};
use crate::{Idx, TypeContext, TypeData};

impl TypeContext {
    /// Render `ty` the way it would be written in source.
    pub fn display(&self, ty: Idx) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    /// Render a specialization as `Name<Arg, ...>`.
    pub fn display_key(&self, key: &SpecializationKey) -> String {
        let mut out = self.template_name(key.template).to_owned();
        self.write_args(&mut out, &key.args);
        out
    }

    /// Name of a template, or a placeholder for an unknown id.
    pub fn template_name(&self, template: TemplateId) -> &str {
        match self.templates().get(template) {
            Some(def) => self.interner().lookup(def.name),
            None => "<unknown template>",
        }
    }

    fn write_args(&self, out: &mut String, args: &[TemplateArgument]) {
        out.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match arg {
                TemplateArgument::Type(ty) => self.write_type(out, *ty),
                TemplateArgument::Variable(value) => {
                    let _ = write!(out, "{value}");
                }
                TemplateArgument::Template(template) => out.push_str(self.template_name(*template)),
            }
        }
        out.push('>');
    }

    fn write_type(&self, out: &mut String, ty: Idx) {
        if let Some(name) = ty.primitive_name() {
            out.push_str(name);
            return;
        }
        let Some(data) = self.pool().try_lookup(ty) else {
            out.push_str("<error>");
            return;
        };
        match data {
            TypeData::Nominal { kind, def } => match self.registry().get(def) {
                Some(def) => match (&def.specialization, def.name) {
                    (Some(key), _) => out.push_str(&self.display_key(key)),
                    (None, Some(name)) => out.push_str(self.interner().lookup(name)),
                    (None, None) => {
                        let _ = write!(out, "<anonymous {}#{}>", kind.keyword(), def.id.index());
                    }
                },
                None => out.push_str("<error>"),
            },
            TypeData::Pointer(inner) => {
                out.push('*');
                self.write_type(out, inner);
            }
            TypeData::Array { elem, len } => {
                out.push('[');
                self.write_type(out, elem);
                let _ = write!(out, "; {len}]");
            }
            TypeData::Slice(elem) => {
                out.push('[');
                self.write_type(out, elem);
                out.push(']');
            }
            TypeData::Function {
                params,
                ret,
                variadic,
            } => {
                out.push_str("func(");
                for (i, &param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if variadic && i + 1 == params.len() {
                        out.push_str("...");
                    }
                    self.write_type(out, param);
                }
                out.push(')');
                if ret != Idx::VOID {
                    out.push_str(" -> ");
                    self.write_type(out, ret);
                }
            }
            TypeData::Qualified { base, quals } => {
                let _ = write!(out, "{quals} ");
                self.write_type(out, base);
            }
            TypeData::Param { template, index } => {
                let name = self
                    .templates()
                    .get(template)
                    .and_then(|def| def.params.get(usize::from(index)).map(|p| p.name));
                match name {
                    Some(name) => out.push_str(self.interner().lookup(name)),
                    None => {
                        let _ = write!(out, "T{index}");
                    }
                }
            }
            // Primitives returned above.
            TypeData::Void
            | TypeData::Bool
            | TypeData::Int { .. }
            | TypeData::Float { .. }
            | TypeData::Error => out.push_str("<error>"),
        }
    }
}
