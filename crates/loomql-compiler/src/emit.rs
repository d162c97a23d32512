//! Canonical document rendering.
//!
//! One line, single spaces, no trailing whitespace. Identical selection
//! trees always render to identical bytes; artifact caching and the
//! snapshot tests both rely on that.

use std::fmt::Write;

use loomql_core::{ArgValue, LitValue, OperationKind, SelectionNode};
use loomql_plan::VariableBinding;

/// Pre-order field names of a tree, in document order.
///
/// Matches the step order of the decode plan built from the same tree.
pub fn field_order(nodes: &[SelectionNode]) -> Vec<String> {
    fn walk(nodes: &[SelectionNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.name.clone());
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

/// Renders an expanded selection tree as query text.
#[must_use]
pub struct DocumentEmitter<'a> {
    kind: OperationKind,
    name: Option<&'a str>,
    variables: &'a [VariableBinding],
    selection: &'a [SelectionNode],
}

impl<'a> DocumentEmitter<'a> {
    pub fn new(kind: OperationKind, selection: &'a [SelectionNode]) -> Self {
        Self {
            kind,
            name: None,
            variables: &[],
            selection,
        }
    }

    pub fn named(mut self, name: Option<&'a str>) -> Self {
        self.name = name;
        self
    }

    pub fn with_variables(mut self, variables: &'a [VariableBinding]) -> Self {
        self.variables = variables;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        write!(w, "{}", self.kind)?;
        if let Some(name) = self.name {
            write!(w, " {name}")?;
        }
        if !self.variables.is_empty() {
            w.write_char('(')?;
            for (i, var) in self.variables.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                write!(w, "${}: {}", var.name, var.wire_type)?;
            }
            w.write_char(')')?;
        }
        w.write_str(" {")?;
        for node in self.selection {
            w.write_char(' ')?;
            write_node(w, node)?;
        }
        w.write_str(" }")
    }
}

fn write_node(w: &mut impl Write, node: &SelectionNode) -> std::fmt::Result {
    w.write_str(&node.name)?;
    if !node.args.is_empty() {
        w.write_char('(')?;
        for (i, arg) in node.args.iter().enumerate() {
            if i > 0 {
                w.write_str(", ")?;
            }
            write!(w, "{}: ", arg.name)?;
            write_value(w, &arg.value)?;
        }
        w.write_char(')')?;
    }
    if !node.children.is_empty() {
        w.write_str(" {")?;
        for child in &node.children {
            w.write_char(' ')?;
            write_node(w, child)?;
        }
        w.write_str(" }")?;
    }
    Ok(())
}

fn write_value(w: &mut impl Write, value: &ArgValue) -> std::fmt::Result {
    match value {
        ArgValue::Lit(lit) => write_literal(w, lit),
        ArgValue::Var(name) => write!(w, "${name}"),
        // Pre-lift values may still appear when dumping intermediate
        // trees; render them the way lifting would.
        ArgValue::Input { name, .. } | ArgValue::Param(name) => write!(w, "${name}"),
        ArgValue::Object(entries) => {
            w.write_char('{')?;
            for (i, (name, entry)) in entries.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                write!(w, "{name}: ")?;
                write_value(w, entry)?;
            }
            w.write_char('}')
        }
        ArgValue::List(items) => {
            w.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                write_value(w, item)?;
            }
            w.write_char(']')
        }
        ArgValue::Opaque(_) => w.write_str("null"),
    }
}

fn write_literal(w: &mut impl Write, lit: &LitValue) -> std::fmt::Result {
    match lit {
        LitValue::Null => w.write_str("null"),
        LitValue::Bool(b) => write!(w, "{b}"),
        LitValue::Int(i) => write!(w, "{i}"),
        LitValue::Float(x) => write!(w, "{x:?}"),
        LitValue::Str(s) => write_quoted(w, s),
        LitValue::Enum(name) => w.write_str(name),
    }
}

fn write_quoted(w: &mut impl Write, s: &str) -> std::fmt::Result {
    w.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => w.write_str("\\\"")?,
            '\\' => w.write_str("\\\\")?,
            '\n' => w.write_str("\\n")?,
            '\r' => w.write_str("\\r")?,
            '\t' => w.write_str("\\t")?,
            c if c.is_control() => write!(w, "\\u{:04x}", c as u32)?,
            c => w.write_char(c)?,
        }
    }
    w.write_char('"')
}
