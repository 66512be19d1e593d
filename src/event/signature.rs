use serde::Serialize;

/// A captured method parameter with its pre-rendered value.
///
/// `rendered_value` is produced by whoever instruments the call (strings
/// usually arrive quoted, e.g. `"\"order-42\""`). An empty string means the
/// value was suppressed by the capture policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterCapture {
    name: String,
    rendered_value: String,
    redacted: bool,
}

impl ParameterCapture {
    pub fn new(name: impl Into<String>, rendered_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rendered_value: rendered_value.into(),
            redacted: false,
        }
    }

    /// A parameter whose value must never be shown.
    pub fn redacted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rendered_value: String::new(),
            redacted: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rendered_value(&self) -> &str {
        &self.rendered_value
    }

    pub fn is_redacted(&self) -> bool {
        self.redacted
    }

    /// Same parameter with its value blanked; name and redaction survive.
    pub(crate) fn without_value(&self) -> Self {
        Self {
            name: self.name.clone(),
            rendered_value: String::new(),
            redacted: self.redacted,
        }
    }
}

/// Identifies a traced call: declaring type, method, captured parameters
/// and optional narration / error-context text.
///
/// ```
/// use narrativetrace::event::MethodSignature;
///
/// let signature = MethodSignature::new("OrderService", "placeOrder")
///     .with_param("customerId", "\"C-123\"")
///     .with_redacted_param("cardNumber")
///     .with_narration("Placing an order for C-123");
/// assert_eq!(signature.parameters().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodSignature {
    class_name: String,
    method_name: String,
    parameters: Vec<ParameterCapture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    narration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_context: Option<String>,
}

impl MethodSignature {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            parameters: Vec::new(),
            narration: None,
            error_context: None,
        }
    }

    pub fn with_parameters(
        mut self,
        parameters: impl IntoIterator<Item = ParameterCapture>,
    ) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn with_param(
        mut self,
        name: impl Into<String>,
        rendered_value: impl Into<String>,
    ) -> Self {
        self.parameters.push(ParameterCapture::new(name, rendered_value));
        self
    }

    pub fn with_redacted_param(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(ParameterCapture::redacted(name));
        self
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }

    pub fn with_error_context(mut self, error_context: impl Into<String>) -> Self {
        self.error_context = Some(error_context.into());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameters(&self) -> &[ParameterCapture] {
        &self.parameters
    }

    pub fn narration(&self) -> Option<&str> {
        self.narration.as_deref()
    }

    pub fn error_context(&self) -> Option<&str> {
        self.error_context.as_deref()
    }

    /// `Class.method`, the form renderers and log lines use.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }

    pub(crate) fn without_parameter_values(mut self) -> Self {
        self.parameters = self.parameters.iter().map(ParameterCapture::without_value).collect();
        self
    }

    pub(crate) fn replace_error_context(&mut self, error_context: String) {
        self.error_context = Some(error_context);
    }
}
