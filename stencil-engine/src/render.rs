//! Deterministic pretty-printing of generated units.
//!
//! The rendering is a neutral ML-flavoured syntax meant for inspection and
//! golden assertions, not for feeding a compiler; hosts targeting a concrete
//! language render the [`Code`] tree themselves.

use crate::code::{Arm, Code, Lit, Pat};
use crate::unit::{Generated, GeneratedUnit};

/// Indentation style for rendered code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(u8),
    Tab,
}

impl Indent {
    /// Append one indent level to `buffer`.
    pub fn push_onto(&self, buffer: &mut String) {
        match self {
            Self::Spaces(n) => {
                for _ in 0..*n {
                    buffer.push(' ');
                }
            }
            Self::Tab => buffer.push('\t'),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::Spaces(2)
    }
}

/// Line-oriented buffer with indentation tracking.
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    pub fn push_line(&mut self, s: &str) -> &mut Self {
        let indent = self.indent;
        for _ in 0..self.indent_level {
            indent.push_onto(&mut self.buffer);
        }
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    pub fn build(self) -> String {
        self.buffer
    }
}

/// Render one generated item.
pub fn render(item: &Generated) -> String {
    match item {
        Generated::Value(unit) => render_unit(unit),
        Generated::Type(decl) => format!("type {} = <mirrored>\n", decl.name),
    }
}

/// Render one generated value unit with its declared signature.
pub fn render_unit(unit: &GeneratedUnit) -> String {
    let mut builder = CodeBuilder::new(Indent::default());
    builder.push_line(&format!("let {} : {} =", unit.ident, unit.sig));
    builder.push_indent();
    for line in render_code(&unit.body).lines() {
        builder.push_line(line);
    }
    builder.build()
}

/// Render one expression to a (possibly multi-line) string.
pub fn render_code(code: &Code) -> String {
    let mut out = String::new();
    write_code(&mut out, code, 0);
    out
}

fn pad(out: &mut String, level: usize) {
    for _ in 0..level {
        Indent::default().push_onto(out);
    }
}

fn write_lit(out: &mut String, lit: &Lit) {
    match lit {
        Lit::Unit => out.push_str("()"),
        Lit::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Lit::Int(v) => out.push_str(&v.to_string()),
        Lit::Str(v) => out.push_str(&format!("{v:?}")),
    }
}

fn write_seq(out: &mut String, elems: &[Code], level: usize) {
    for (i, elem) in elems.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_code(out, elem, level);
    }
}

fn write_code(out: &mut String, code: &Code, level: usize) {
    match code {
        Code::Lit(lit) => write_lit(out, lit),
        Code::Ident(name) => out.push_str(name),
        Code::Lambda { params, body } => {
            out.push_str(&format!("fun ({}) ->\n", params.join(", ")));
            pad(out, level + 1);
            write_code(out, body, level + 1);
        }
        Code::Apply { func, args } => {
            let simple = matches!(**func, Code::Ident(_) | Code::Lit(_));
            if !simple {
                out.push('(');
            }
            write_code(out, func, level);
            if !simple {
                out.push(')');
            }
            out.push('(');
            write_seq(out, args, level);
            out.push(')');
        }
        Code::Let { name, value, body } => {
            out.push_str(&format!("let {name} = "));
            write_code(out, value, level);
            out.push_str(" in\n");
            pad(out, level);
            write_code(out, body, level);
        }
        Code::If {
            cond,
            then,
            otherwise,
        } => {
            out.push_str("if ");
            write_code(out, cond, level);
            out.push_str("\n");
            pad(out, level + 1);
            out.push_str("then ");
            write_code(out, then, level + 1);
            out.push('\n');
            pad(out, level + 1);
            out.push_str("else ");
            write_code(out, otherwise, level + 1);
        }
        Code::Match { scrutinee, arms } => {
            out.push_str("match ");
            write_code(out, scrutinee, level);
            out.push_str(" with");
            for Arm { pat, body } in arms {
                out.push('\n');
                pad(out, level);
                out.push_str("| ");
                write_pat(out, pat);
                out.push_str(" -> ");
                write_code(out, body, level + 1);
            }
        }
        Code::Tuple(elems) => {
            out.push('(');
            write_seq(out, elems, level);
            out.push(')');
        }
        Code::Record(fields) => {
            out.push('{');
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!("{name}: "));
                write_code(out, value, level);
            }
            out.push('}');
        }
        Code::Case { tag, args } => {
            out.push_str(tag);
            if !args.is_empty() {
                out.push('(');
                write_seq(out, args, level);
                out.push(')');
            }
        }
        Code::CaseRecord { tag, fields } => {
            out.push_str(&format!("{tag}{{"));
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!("{name}: "));
                write_code(out, value, level);
            }
            out.push('}');
        }
        Code::Poly { tag, args } => {
            out.push_str(&format!("`{tag}"));
            if !args.is_empty() {
                out.push('(');
                write_seq(out, args, level);
                out.push(')');
            }
        }
        Code::Fail(message) => out.push_str(&format!("fail {message:?}")),
    }
}

fn write_pat(out: &mut String, pat: &Pat) {
    match pat {
        Pat::Wild => out.push('_'),
        Pat::Bind(name) => out.push_str(name),
        Pat::Lit(lit) => write_lit(out, lit),
        Pat::Tuple(elems) => {
            out.push('(');
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_pat(out, elem);
            }
            out.push(')');
        }
        Pat::Record(fields) => {
            out.push('{');
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!("{name}: "));
                write_pat(out, value);
            }
            out.push('}');
        }
        Pat::Case { tag, args } => {
            out.push_str(tag);
            if !args.is_empty() {
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_pat(out, arg);
                }
                out.push(')');
            }
        }
        Pat::CaseRecord { tag, fields } => {
            out.push_str(&format!("{tag}{{"));
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!("{name}: "));
                write_pat(out, value);
            }
            out.push('}');
        }
        Pat::Poly { tag, args } => {
            out.push_str(&format!("`{tag}"));
            if !args.is_empty() {
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_pat(out, arg);
                }
                out.push(')');
            }
        }
        Pat::PolyInherit {
            binder,
            tags,
            excluding,
        } => {
            match tags {
                Some(tags) => out.push_str(&format!("#({})", tags.join("|"))),
                None => out.push_str("#_"),
            }
            if !excluding.is_empty() {
                out.push_str(&format!(" \\ ({})", excluding.join("|")));
            }
            out.push_str(&format!(" as {binder}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Arm, Pat};

    #[test]
    fn test_render_literal_and_apply() {
        let code = Code::call("json.arr", vec![Code::int(1), Code::str("x")]);
        assert_eq!(render_code(&code), "json.arr(1, \"x\")");
    }

    #[test]
    fn test_render_match() {
        let code = Code::match_(
            Code::ident("v"),
            vec![
                Arm::new(Pat::some(Pat::bind("x")), Code::ident("x")),
                Arm::new(Pat::none(), Code::fail("no match")),
            ],
        );
        let rendered = render_code(&code);
        assert!(rendered.contains("match v with"));
        assert!(rendered.contains("| Some(x) -> x"));
        assert!(rendered.contains("| None -> fail \"no match\""));
    }

    #[test]
    fn test_builder_indents() {
        let mut builder = CodeBuilder::new(Indent::Spaces(2));
        builder.push_line("a");
        builder.push_indent();
        builder.push_line("b");
        builder.push_dedent();
        builder.push_line("c");
        assert_eq!(builder.build(), "a\n  b\nc\n");
    }

    #[test]
    fn test_builder_honors_space_count() {
        let mut builder = CodeBuilder::new(Indent::Spaces(3));
        builder.push_line("a");
        builder.push_indent();
        builder.push_line("b");
        assert_eq!(builder.build(), "a\n   b\n");
    }
}
