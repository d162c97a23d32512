//! Human-readable artifact dump for debugging and snapshot tests.

use std::fmt::Write;

use super::plan::{CompiledOperation, DecodeStep};

/// Builder for rendering a compiled operation.
pub struct PlanPrinter<'p> {
    op: &'p CompiledOperation,
    document: bool,
    variables: bool,
}

impl<'p> PlanPrinter<'p> {
    pub fn new(op: &'p CompiledOperation) -> Self {
        Self {
            op,
            document: true,
            variables: true,
        }
    }

    pub fn with_document(mut self, value: bool) -> Self {
        self.document = value;
        self
    }

    pub fn with_variables(mut self, value: bool) -> Self {
        self.variables = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        write!(w, "{}", self.op.kind)?;
        if let Some(name) = &self.op.name {
            write!(w, " {}", name)?;
        }
        writeln!(w)?;

        if self.document {
            writeln!(w, "document: {}", self.op.document)?;
        }

        if self.variables && !self.op.variables.is_empty() {
            writeln!(w, "variables:")?;
            for var in &self.op.variables {
                writeln!(w, "  ${}: {} <- {}", var.name, var.wire_type, var.input)?;
            }
        }

        match &self.op.decode_plan.construction {
            loomql_core::Construction::Properties => {
                writeln!(w, "decode {}:", self.op.decode_plan.result_type)?;
            }
            construction => {
                writeln!(
                    w,
                    "decode {} ({}):",
                    self.op.decode_plan.result_type, construction
                )?;
            }
        }
        for step in &self.op.decode_plan.roots {
            self.format_step(step, 1, w)?;
        }
        Ok(())
    }

    fn format_step(&self, step: &DecodeStep, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let prefix = "  ".repeat(indent);
        match step {
            DecodeStep::Scalar { field, binding } => {
                writeln!(w, "{}{} -> {}", prefix, field, binding)?;
            }
            DecodeStep::Object {
                field,
                binding,
                construction,
                children,
            } => {
                writeln!(w, "{}{} -> {} ({})", prefix, field, binding, construction)?;
                for child in children {
                    self.format_step(child, indent + 1, w)?;
                }
            }
        }
        Ok(())
    }
}

impl CompiledOperation {
    pub fn printer(&self) -> PlanPrinter<'_> {
        PlanPrinter::new(self)
    }
}
