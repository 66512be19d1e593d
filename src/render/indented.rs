use std::fmt::Write;

use super::NarrativeRenderer;
use crate::event::{MethodSignature, ParameterCapture, TraceNode, TraceOutcome};
use crate::tree::TraceTree;

const BRANCH: &str = "├── ";
const CONTINUATION: &str = "│   ";
const CLOSING: &str = "└── ";

/// Box-drawing call tree, one line per call.
///
/// Leaves render their outcome inline; calls with children get a closing
/// `└──` line carrying the outcome after their last child.
///
/// ```text
/// OrderService.placeOrder(customerId: "C-123")
/// │   // Placing order for C-123
/// ├── InventoryService.checkStock(itemId: "ITEM-1") → true
/// └── → "order-42"
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IndentedTextRenderer {
    show_durations: bool,
}

impl Default for IndentedTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentedTextRenderer {
    /// Renderer that appends ` — Nms` to every call with a measured duration.
    pub fn new() -> Self {
        Self {
            show_durations: true,
        }
    }

    pub fn show_durations(mut self, show: bool) -> Self {
        self.show_durations = show;
        self
    }

    fn render_node(
        &self,
        node: &TraceNode,
        line_prefix: &str,
        cont_prefix: &str,
        out: &mut String,
    ) {
        let signature = node.signature();
        out.push_str(line_prefix);
        push_header(signature, out);

        if node.children().is_empty() {
            out.push(' ');
            push_outcome(node.outcome(), signature, out);
            self.push_duration(node, out);
            out.push('\n');
            return;
        }

        out.push('\n');
        if let Some(narration) = signature.narration() {
            let _ = writeln!(out, "{cont_prefix}{CONTINUATION}// {narration}");
        }
        let child_line = format!("{cont_prefix}{BRANCH}");
        let child_cont = format!("{cont_prefix}{CONTINUATION}");
        for child in node.children() {
            self.render_node(child, &child_line, &child_cont, out);
        }
        out.push_str(cont_prefix);
        out.push_str(CLOSING);
        push_outcome(node.outcome(), signature, out);
        self.push_duration(node, out);
        out.push('\n');
    }

    fn push_duration(&self, node: &TraceNode, out: &mut String) {
        if self.show_durations && node.duration_nanos() > 0 {
            let _ = write!(out, " — {}ms", node.duration_millis());
        }
    }
}

impl NarrativeRenderer for IndentedTextRenderer {
    fn render(&self, tree: &TraceTree) -> String {
        let mut out = String::new();
        for root in tree.roots() {
            self.render_node(root, "", "", &mut out);
        }
        out.truncate(out.trim_end().len());
        out
    }
}

fn push_header(signature: &MethodSignature, out: &mut String) {
    let params = signature
        .parameters()
        .iter()
        .map(render_param)
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(
        out,
        "{}.{}({})",
        signature.class_name(),
        signature.method_name(),
        params
    );
}

fn render_param(param: &ParameterCapture) -> String {
    if param.is_redacted() {
        format!("{}: [REDACTED]", param.name())
    } else {
        format!("{}: {}", param.name(), param.rendered_value())
    }
}

fn push_outcome(outcome: &TraceOutcome, signature: &MethodSignature, out: &mut String) {
    match outcome {
        TraceOutcome::Returned { rendered_value } => {
            let _ = write!(out, "→ {}", rendered_value.as_deref().unwrap_or("()"));
        }
        TraceOutcome::Threw { error, .. } => {
            let _ = write!(out, "!! {}: {}", error.type_name(), error.message());
            if let Some(context) = signature.error_context() {
                let _ = write!(out, " | {context}");
            }
        }
    }
}
