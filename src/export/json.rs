//! Flat JSON event stream.
//!
//! Each node becomes an `enter` event followed, after its descendants, by
//! an `exit` or `error` event. Ids are assigned in emission order starting
//! at 1; `parentId` points at the enclosing call's `enter` event.

use std::fs;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::event::{ParameterCapture, TraceNode, TraceOutcome};
use crate::tree::TraceTree;

const DOCUMENT_VERSION: &str = "1.0";

/// Scenario description attached by [`JsonExporter::export_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceMetadata {
    pub scenario: String,
    pub result: String,
}

impl TraceMetadata {
    pub fn new(scenario: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            result: result.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum EventType {
    Enter,
    Exit,
    Error,
}

#[derive(Debug, Serialize)]
struct ErrorRecord<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    message: &'a str,
}

/// Parameters in call order; redacted values become `"[REDACTED]"` and
/// blank values `null`.
#[derive(Debug)]
struct Params<'a>(&'a [ParameterCapture]);

impl Serialize for Params<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for param in self.0 {
            let value = if param.is_redacted() {
                Some("[REDACTED]")
            } else if param.rendered_value().is_empty() {
                None
            } else {
                Some(param.rendered_value())
            };
            map.serialize_entry(param.name(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Event<'a> {
    id: u64,
    #[serde(rename = "type")]
    event_type: EventType,
    class: &'a str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_value: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorRecord<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    depth: usize,
    parent_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct EventStream<'a> {
    events: Vec<Event<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Scenario<'a> {
    name: &'a str,
    result: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    version: &'static str,
    scenario: Scenario<'a>,
    events: Vec<Event<'a>>,
}

/// Serializes trees as a flat list of enter/exit/error events.
///
/// ```
/// use narrativetrace::context::{NarrativeContext, ThreadLocalContext};
/// use narrativetrace::event::MethodSignature;
/// use narrativetrace::export::JsonExporter;
///
/// let context = ThreadLocalContext::new();
/// context.enter_method(MethodSignature::new("OrderService", "placeOrder"));
/// context.exit_method_with_return(Some("\"order-42\"".into()));
///
/// let json = JsonExporter::new().export(&context.capture_trace()).unwrap();
/// assert!(json.contains("\"type\": \"enter\""));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        JsonExporter
    }

    /// `{"events": [...]}` for every root in order.
    pub fn export(&self, tree: &TraceTree) -> Result<String> {
        let stream = EventStream {
            events: flatten(tree),
        };
        Ok(serde_json::to_string_pretty(&stream)?)
    }

    /// Versioned document with scenario metadata. The scenario duration is
    /// the first root's.
    pub fn export_document(&self, tree: &TraceTree, metadata: &TraceMetadata) -> Result<String> {
        let document = Document {
            version: DOCUMENT_VERSION,
            scenario: Scenario {
                name: &metadata.scenario,
                result: &metadata.result,
                duration_ms: tree.roots().first().map(|root| root.duration_millis()),
            },
            events: flatten(tree),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Export `tree` to `path`, creating parent directories as needed.
    pub fn write_to(&self, tree: &TraceTree, path: &Path) -> Result<()> {
        let json = self.export(tree)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "wrote trace export");
        Ok(())
    }
}

fn flatten(tree: &TraceTree) -> Vec<Event<'_>> {
    let mut events = Vec::with_capacity(tree.node_count() * 2);
    let mut next_id = 1;
    for root in tree.roots() {
        flatten_node(root, 0, None, &mut next_id, &mut events);
    }
    events
}

fn flatten_node<'a>(
    node: &'a TraceNode,
    depth: usize,
    parent_id: Option<u64>,
    next_id: &mut u64,
    events: &mut Vec<Event<'a>>,
) {
    let signature = node.signature();
    let enter_id = take_id(next_id);
    events.push(Event {
        id: enter_id,
        event_type: EventType::Enter,
        class: signature.class_name(),
        method: signature.method_name(),
        params: Some(Params(signature.parameters())),
        return_value: None,
        error: None,
        duration_ms: None,
        depth,
        parent_id,
    });

    for child in node.children() {
        flatten_node(child, depth + 1, Some(enter_id), next_id, events);
    }

    let (event_type, return_value, error) = match node.outcome() {
        TraceOutcome::Returned { rendered_value } => {
            (EventType::Exit, Some(rendered_value.as_deref()), None)
        }
        TraceOutcome::Threw { error, .. } => (
            EventType::Error,
            None,
            Some(ErrorRecord {
                type_name: error.type_name(),
                message: error.message(),
            }),
        ),
    };
    events.push(Event {
        id: take_id(next_id),
        event_type,
        class: signature.class_name(),
        method: signature.method_name(),
        params: None,
        return_value,
        error,
        duration_ms: Some(node.duration_millis()),
        depth,
        parent_id,
    });
}

fn take_id(next_id: &mut u64) -> u64 {
    let id = *next_id;
    *next_id += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CapturedError, MethodSignature};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    fn sample_tree() -> TraceTree {
        let child = Arc::new(TraceNode::new(
            MethodSignature::new("InventoryService", "reserve"),
            Vec::new(),
            TraceOutcome::returned(Some("true".into())),
            24_000_000,
        ));
        let root = Arc::new(TraceNode::new(
            MethodSignature::new("OrderService", "placeOrder")
                .with_param("customerId", "\"C-123\""),
            vec![child],
            TraceOutcome::returned(Some("\"order-42\"".into())),
            412_000_000,
        ));
        TraceTree::new(vec![root])
    }

    #[test]
    fn test_nested_events_with_ids_and_parents() {
        let json = parse(&JsonExporter::new().export(&sample_tree()).unwrap());

        assert_eq!(
            json,
            json!({
                "events": [
                    {"id": 1, "type": "enter", "class": "OrderService", "method": "placeOrder",
                     "params": {"customerId": "\"C-123\""}, "depth": 0, "parentId": null},
                    {"id": 2, "type": "enter", "class": "InventoryService", "method": "reserve",
                     "params": {}, "depth": 1, "parentId": 1},
                    {"id": 3, "type": "exit", "class": "InventoryService", "method": "reserve",
                     "returnValue": "true", "durationMs": 24, "depth": 1, "parentId": 1},
                    {"id": 4, "type": "exit", "class": "OrderService", "method": "placeOrder",
                     "returnValue": "\"order-42\"", "durationMs": 412, "depth": 0, "parentId": null}
                ]
            })
        );
    }

    #[test]
    fn test_error_event() {
        let node = Arc::new(TraceNode::new(
            MethodSignature::new("PaymentGateway", "charge"),
            Vec::new(),
            TraceOutcome::Threw {
                error: CapturedError::new("CardExpired", "Card expired"),
                error_context_in_signature: false,
            },
            203_000_000,
        ));
        let json = parse(&JsonExporter::new().export(&TraceTree::new(vec![node])).unwrap());

        let exit = &json["events"][1];
        assert_eq!(exit["type"], "error");
        assert_eq!(exit["error"], json!({"type": "CardExpired", "message": "Card expired"}));
        assert_eq!(exit["durationMs"], 203);
        assert!(exit.get("returnValue").is_none());
    }

    #[test]
    fn test_params_keep_order_and_mask() {
        let node = Arc::new(TraceNode::new(
            MethodSignature::new("AuthService", "login")
                .with_param("username", "\"admin\"")
                .with_redacted_param("password")
                .with_param("blank", ""),
            Vec::new(),
            TraceOutcome::returned(None),
            0,
        ));
        let text = JsonExporter::new().export(&TraceTree::new(vec![node])).unwrap();

        let username = text.find("\"username\"").unwrap();
        let password = text.find("\"password\"").unwrap();
        assert!(username < password);
        let json = parse(&text);
        assert_eq!(
            json["events"][0]["params"],
            json!({"username": "\"admin\"", "password": "[REDACTED]", "blank": null})
        );
        assert_eq!(json["events"][1]["returnValue"], Value::Null);
    }

    #[test]
    fn test_document_metadata() {
        let metadata = TraceMetadata::new("Customer places order", "pass");
        let json = parse(&JsonExporter::new().export_document(&sample_tree(), &metadata).unwrap());

        assert_eq!(json["version"], "1.0");
        assert_eq!(
            json["scenario"],
            json!({"name": "Customer places order", "result": "pass", "durationMs": 412})
        );
        assert_eq!(json["events"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_empty_document_omits_duration() {
        let metadata = TraceMetadata::new("Empty", "pass");
        let json = parse(
            &JsonExporter::new()
                .export_document(&TraceTree::empty(), &metadata)
                .unwrap(),
        );

        assert!(json["scenario"].get("durationMs").is_none());
        assert_eq!(json["events"], json!([]));
    }

    #[test]
    fn test_write_to_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("trace.json");

        JsonExporter::new().write_to(&sample_tree(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse(&written)["events"].as_array().unwrap().len(), 4);
    }
}
