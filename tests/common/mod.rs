// Shared helpers for narrativetrace integration tests
#![allow(dead_code)]

use std::sync::Once;

use narrativetrace::{MethodSignature, NarrativeContext, TraceNode, TraceTree};

static INIT: Once = Once::new();

/// Route library diagnostics to the test writer, filtered by `RUST_LOG`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Enter and immediately return from `class.method`.
pub fn leaf_call<C: NarrativeContext + ?Sized>(context: &C, class: &str, method: &str) {
    context.enter_method(MethodSignature::new(class, method));
    context.exit_method_with_return(None);
}

/// Tree shape as indented method names, two spaces per level.
pub fn shape(tree: &TraceTree) -> Vec<String> {
    fn visit(node: &TraceNode, depth: usize, out: &mut Vec<String>) {
        out.push(format!("{}{}", "  ".repeat(depth), node.signature().method_name()));
        for child in node.children() {
            visit(child, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    for root in tree.roots() {
        visit(root, 0, &mut out);
    }
    out
}
