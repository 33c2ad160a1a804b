//! Canonical source-like rendering of values, used in diagnostics.

use std::fmt::Write as _;

use tsl_ir::StringInterner;

use crate::arena::ValueArena;
use crate::ustring::quote;
use crate::value::{Expression, NamedValues, Reference, SubReference, ValueKind, Values};
use crate::ValueId;

impl ValueArena {
    /// Render `id` the way it would be written in source.
    pub fn render(&self, id: ValueId, interner: &StringInterner) -> String {
        let mut out = String::new();
        Renderer {
            arena: self,
            interner,
            out: &mut out,
        }
        .value(id);
        out
    }

    pub fn render_reference(&self, reference: &Reference, interner: &StringInterner) -> String {
        let mut out = String::new();
        Renderer {
            arena: self,
            interner,
            out: &mut out,
        }
        .reference(reference);
        out
    }
}

pub(crate) fn render_real(value: f64) -> String {
    if value.is_nan() {
        "not_a_number".to_owned()
    } else if value.is_infinite() && value.is_sign_positive() {
        "infinity".to_owned()
    } else if value.is_infinite() {
        "-infinity".to_owned()
    } else {
        format!("{value:?}")
    }
}

struct Renderer<'a> {
    arena: &'a ValueArena,
    interner: &'a StringInterner,
    out: &'a mut String,
}

impl Renderer<'_> {
    fn name(&mut self, name: tsl_ir::Name) {
        self.out.push_str(self.interner.lookup(name));
    }

    fn value(&mut self, id: ValueId) {
        tsl_stack::ensure_sufficient_stack(|| self.value_inner(id));
    }

    fn value_inner(&mut self, id: ValueId) {
        match self.arena.kind(id) {
            ValueKind::Integer(i) => {
                let _ = write!(self.out, "{i}");
            }
            ValueKind::Real(r) => self.out.push_str(&render_real(*r)),
            ValueKind::Boolean(b) => {
                let _ = write!(self.out, "{b}");
            }
            ValueKind::Verdict(v) => self.out.push_str(v.as_str()),
            ValueKind::Charstring(s) => self.out.push_str(&quote(s.chars())),
            ValueKind::UniversalCharstring(s) => self.out.push_str(&s.to_source()),
            ValueKind::Bitstring(s) => {
                let _ = write!(self.out, "'{s}'B");
            }
            ValueKind::Hexstring(s) => {
                let _ = write!(self.out, "'{s}'H");
            }
            ValueKind::Octetstring(s) => {
                let _ = write!(self.out, "'{s}'O");
            }
            ValueKind::Enumerated(item) | ValueKind::LowerIdentifier(item) => self.name(*item),
            ValueKind::ObjectIdentifier(components) => {
                self.out.push_str("objid {");
                for component in components {
                    self.out.push(' ');
                    match (component.name, component.number) {
                        (Some(name), Some(number)) => {
                            self.name(name);
                            self.out.push('(');
                            self.value(number);
                            self.out.push(')');
                        }
                        (Some(name), None) => self.name(name),
                        (None, Some(number)) => self.value(number),
                        (None, None) => {}
                    }
                }
                self.out.push_str(" }");
            }
            ValueKind::Choice { alternative, value } | ValueKind::Anytype { alternative, value } => {
                self.out.push_str("{ ");
                self.name(*alternative);
                self.out.push_str(" := ");
                self.value(*value);
                self.out.push_str(" }");
            }
            ValueKind::Record(fields) | ValueKind::Set(fields) => self.fields(fields),
            ValueKind::RecordOf(values) | ValueKind::SetOf(values) | ValueKind::Array(values) => {
                self.list(values);
            }
            ValueKind::Referenced(reference) => self.reference(reference),
            ValueKind::Macro(kind) => self.out.push_str(kind.as_str()),
            ValueKind::Expression(expr) => self.expression(expr),
            ValueKind::Omit => self.out.push_str("omit"),
            ValueKind::NotUsed => self.out.push('-'),
        }
    }

    fn fields(&mut self, fields: &NamedValues) {
        if fields.is_empty() {
            self.out.push_str("{ }");
            return;
        }
        self.out.push_str("{ ");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.name(field.name);
            self.out.push_str(" := ");
            self.value(field.value);
        }
        self.out.push_str(" }");
    }

    fn list(&mut self, values: &Values) {
        if values.is_empty() {
            self.out.push_str("{ }");
            return;
        }
        self.out.push_str("{ ");
        match values {
            Values::Dense(elements) => {
                for (i, &element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.value(element);
                }
            }
            Values::Indexed(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push('[');
                    self.value(entry.index);
                    self.out.push_str("] := ");
                    self.value(entry.value);
                }
            }
        }
        self.out.push_str(" }");
    }

    fn reference(&mut self, reference: &Reference) {
        self.name(reference.id);
        for sub in &reference.subrefs {
            match sub {
                SubReference::Field { name, .. } => {
                    self.out.push('.');
                    self.name(*name);
                }
                SubReference::Index { index, .. } => {
                    self.out.push('[');
                    self.value(*index);
                    self.out.push(']');
                }
                SubReference::Parameterized { name, args, .. } => {
                    self.out.push('.');
                    self.name(*name);
                    self.args(args);
                }
            }
        }
    }

    fn args(&mut self, args: &[ValueId]) {
        self.out.push('(');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.value(arg);
        }
        self.out.push(')');
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Unary { op, operand } => {
                self.out.push('(');
                self.out.push_str(op.as_str());
                if op.as_str().ends_with(|c: char| c.is_ascii_alphanumeric()) {
                    self.out.push(' ');
                }
                self.value(*operand);
                self.out.push(')');
            }
            Expression::Binary { op, left, right } => {
                self.out.push('(');
                self.value(*left);
                let _ = write!(self.out, " {} ", op.as_str());
                self.value(*right);
                self.out.push(')');
            }
            Expression::Call { func, args } => {
                self.out.push_str(func.name());
                self.args(args);
            }
            Expression::Introspect { op, target } => {
                self.out.push_str(op.name());
                self.args(&[*target]);
            }
            Expression::Rnd { seed } => {
                self.out.push_str("rnd");
                match seed {
                    Some(seed) => self.args(&[*seed]),
                    None => self.out.push_str("()"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
