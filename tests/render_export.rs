//! Renderers and exporters over trees built by a live context.

mod common;

use indoc::indoc;
use narrativetrace::export::{JsonExporter, TraceMetadata};
use narrativetrace::instrument::{trace_call, trace_value};
use narrativetrace::render::{IndentedTextRenderer, NarrativeRenderer};
use narrativetrace::{MethodSignature, NarrativeContext, ThreadLocalContext, TracingLevel};
use pretty_assertions::assert_eq;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
#[error("card declined for {customer}")]
struct PaymentDeclined {
    customer: String,
}

fn place_order(context: &ThreadLocalContext, customer: &str) -> Result<String, PaymentDeclined> {
    trace_call(
        context,
        MethodSignature::new("OrderService", "placeOrder")
            .with_param("customerId", format!("{customer:?}"))
            .with_narration(format!("Placing order for {customer}")),
        |order: &String| format!("{order:?}"),
        || {
            let in_stock = trace_value(
                context,
                MethodSignature::new("InventoryService", "checkStock")
                    .with_param("itemId", "\"ITEM-1\""),
                |ok: &bool| ok.to_string(),
                || true,
            );
            assert!(in_stock);
            charge(context, customer)?;
            Ok("order-42".to_string())
        },
    )
}

fn charge(context: &ThreadLocalContext, customer: &str) -> Result<(), PaymentDeclined> {
    trace_call(
        context,
        MethodSignature::new("PaymentService", "charge")
            .with_param("customerId", format!("{customer:?}"))
            .with_redacted_param("cardNumber"),
        |_: &()| "()".to_string(),
        || {
            if customer == "C-999" {
                Err(PaymentDeclined {
                    customer: customer.to_string(),
                })
            } else {
                Ok(())
            }
        },
    )
}

fn text(context: &ThreadLocalContext) -> String {
    IndentedTextRenderer::new()
        .show_durations(false)
        .render(&context.capture_trace())
}

#[test]
fn test_successful_order_renders_as_indented_tree() {
    common::init_test_logging();
    let context = ThreadLocalContext::new();
    assert_eq!(place_order(&context, "C-123").unwrap(), "order-42");

    assert_eq!(
        text(&context),
        indoc! {r#"
            OrderService.placeOrder(customerId: "C-123")
            │   // Placing order for C-123
            ├── InventoryService.checkStock(itemId: "ITEM-1") → true
            ├── PaymentService.charge(customerId: "C-123", cardNumber: [REDACTED]) → ()
            └── → "order-42""#}
    );
}

#[test]
fn test_declined_order_renders_errors() {
    let context = ThreadLocalContext::new();
    let err = place_order(&context, "C-999").unwrap_err();
    assert_eq!(err.customer, "C-999");

    let rendered = text(&context);
    assert!(rendered.contains(concat!(
        "├── PaymentService.charge(customerId: \"C-999\", cardNumber: [REDACTED]) ",
        "!! PaymentDeclined: card declined for C-999"
    )));
    assert!(rendered.ends_with("└── !! PaymentDeclined: card declined for C-999"));
}

#[test]
fn test_narrative_level_renders_blank_values() {
    let context = ThreadLocalContext::with_level(TracingLevel::Narrative);
    place_order(&context, "C-123").unwrap();

    assert!(text(&context).starts_with("OrderService.placeOrder(customerId: )"));
}

#[test]
fn test_display_uses_indented_renderer() {
    let context = ThreadLocalContext::new();
    context.enter_method(MethodSignature::new("Svc", "run"));
    context.exit_method_with_return(Some("1".into()));

    let display = context.capture_trace().to_string();
    assert!(display.starts_with("Svc.run() → 1"));
}

#[test]
fn test_json_export_of_live_trace() -> anyhow::Result<()> {
    let context = ThreadLocalContext::new();
    let _ = place_order(&context, "C-999");

    let json: Value = serde_json::from_str(&JsonExporter::new().export(&context.capture_trace())?)?;
    let events = json["events"].as_array().cloned().unwrap_or_default();
    let kinds: Vec<_> = events
        .iter()
        .map(|event| {
            format!(
                "{}:{}",
                event["type"].as_str().unwrap_or(""),
                event["method"].as_str().unwrap_or("")
            )
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "enter:placeOrder",
            "enter:checkStock",
            "exit:checkStock",
            "enter:charge",
            "error:charge",
            "error:placeOrder",
        ]
    );
    assert_eq!(events[3]["params"]["cardNumber"], "[REDACTED]");
    assert_eq!(events[4]["error"]["type"], "PaymentDeclined");
    assert_eq!(events[4]["parentId"], 1);
    Ok(())
}

#[test]
fn test_json_document_and_file_output() -> anyhow::Result<()> {
    let context = ThreadLocalContext::new();
    place_order(&context, "C-123")?;
    let tree = context.capture_trace();

    let document = JsonExporter::new()
        .export_document(&tree, &TraceMetadata::new("Customer places order", "pass"))?;
    let json: Value = serde_json::from_str(&document)?;
    assert_eq!(json["scenario"]["name"], "Customer places order");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("traces").join("order.json");
    JsonExporter::new().write_to(&tree, &path)?;
    assert!(std::fs::read_to_string(&path)?.contains("\"placeOrder\""));
    Ok(())
}
