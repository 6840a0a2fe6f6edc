use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::order::{LineItem, OrderCreatedEvent, OrderError, OrderRequest};

// ============================================================================
// Payload Validation
// ============================================================================
//
// Structural checks on inbound JSON, independent of domain invariants:
//
// - validate_request: gateway and internal HTTP bodies.
// - validate_event: consumed broker messages. Same shape plus optional
//   `correlationId` / `createdAt` strings.
//
// Undeclared top-level fields are ignored by both and dropped from the
// parsed value.
//
// Every violation is collected (not just the first) as a
// (path, message, code) issue. Validation has no side effects.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub code: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl From<&OrderError> for ValidationIssue {
    fn from(err: &OrderError) -> Self {
        Self::new(err.field(), err.to_string(), err.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid payload: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.message.clone()
            } else {
                format!("{}: {}", issue.path, issue.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

const EVENT_ENVELOPE_FIELDS: [&str; 2] = ["correlationId", "createdAt"];

/// Validate a gateway / internal HTTP body.
pub fn validate_request(value: &Value) -> Result<OrderRequest, ValidationError> {
    let mut issues = Vec::new();
    let parsed = parse_object(value, &mut issues);
    finish(issues, parsed.map(|(request, _)| request))
}

/// Validate a consumed `order_created` message.
pub fn validate_event(value: &Value) -> Result<OrderCreatedEvent, ValidationError> {
    let mut issues = Vec::new();
    let parsed = parse_object(value, &mut issues).map(|(request, obj)| {
        let [correlation_id, created_at] =
            EVENT_ENVELOPE_FIELDS.map(|key| optional_string(obj, key, &mut issues));
        OrderCreatedEvent {
            customer_id: request.customer_id,
            items: request.items,
            total_amount: request.total_amount,
            correlation_id,
            created_at,
        }
    });
    finish(issues, parsed)
}

fn parse_object<'a>(
    value: &'a Value,
    issues: &mut Vec<ValidationIssue>,
) -> Option<(OrderRequest, &'a Map<String, Value>)> {
    let Some(obj) = value.as_object() else {
        issues.push(ValidationIssue::new(
            "",
            format!("Expected object, received {}", type_name(value)),
            "invalid_type",
        ));
        return None;
    };

    let customer_id = required_string(obj, "customerId", "customerId", issues);
    let items = parse_items(obj, issues);
    let total_amount = required_number(obj, "totalAmount", issues);

    if let Some(customer_id) = &customer_id {
        check_customer_id(customer_id, issues);
    }
    if let Some(items) = &items {
        check_items(items, issues);
    }
    if let Some(total_amount) = total_amount {
        check_total_amount(total_amount, issues);
    }

    Some((
        OrderRequest {
            customer_id: customer_id?,
            items: items?,
            total_amount: total_amount?,
        },
        obj,
    ))
}

fn finish<T>(issues: Vec<ValidationIssue>, parsed: Option<T>) -> Result<T, ValidationError> {
    match parsed {
        Some(value) if issues.is_empty() => Ok(value),
        _ => Err(ValidationError { issues }),
    }
}

// ============================================================================
// Typed re-validation
// ============================================================================

/// Constraint checks on an already-typed payload. Used by the use cases to
/// re-check input they did not parse themselves.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for OrderRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_customer_id(&self.customer_id, &mut issues);
        check_items(&self.items, &mut issues);
        check_total_amount(self.total_amount, &mut issues);
        finish(issues, Some(()))
    }
}

impl Validate for OrderCreatedEvent {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_customer_id(&self.customer_id, &mut issues);
        check_items(&self.items, &mut issues);
        check_total_amount(self.total_amount, &mut issues);
        finish(issues, Some(()))
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            issues.push(ValidationIssue::new(path, "Required", "invalid_type"));
            None
        }
        Some(value) => Some(value),
    }
}

fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    let value = required(obj, key, path, issues)?;
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            issues.push(ValidationIssue::new(
                path,
                format!("Expected string, received {}", type_name(value)),
                "invalid_type",
            ));
            None
        }
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(ValidationIssue::new(
                key,
                format!("Expected string, received {}", type_name(other)),
                "invalid_type",
            ));
            None
        }
    }
}

fn required_number(
    obj: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<f64> {
    let value = required(obj, key, key, issues)?;
    match value.as_f64() {
        Some(n) => Some(n),
        None => {
            issues.push(ValidationIssue::new(
                key,
                format!("Expected number, received {}", type_name(value)),
                "invalid_type",
            ));
            None
        }
    }
}

fn required_integer(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<i64> {
    let value = required(obj, key, path, issues)?;
    let Some(number) = value.as_number() else {
        issues.push(ValidationIssue::new(
            path,
            format!("Expected integer, received {}", type_name(value)),
            "invalid_type",
        ));
        return None;
    };

    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    if number.as_u64().is_some() {
        issues.push(ValidationIssue::new(
            path,
            format!("Number must be less than or equal to {}", i64::MAX),
            "too_big",
        ));
        return None;
    }

    // Whole-valued floats such as `2.0` are accepted as integers.
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => {
            issues.push(ValidationIssue::new(
                path,
                "Expected integer, received float",
                "invalid_type",
            ));
            None
        }
    }
}

fn parse_items(obj: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) -> Option<Vec<LineItem>> {
    let value = required(obj, "items", "items", issues)?;
    let Some(raw_items) = value.as_array() else {
        issues.push(ValidationIssue::new(
            "items",
            format!("Expected array, received {}", type_name(value)),
            "invalid_type",
        ));
        return None;
    };

    let mut items = Vec::with_capacity(raw_items.len());
    let mut complete = true;

    for (index, raw) in raw_items.iter().enumerate() {
        let path = format!("items.{index}");
        let Some(item) = raw.as_object() else {
            issues.push(ValidationIssue::new(
                path,
                format!("Expected object, received {}", type_name(raw)),
                "invalid_type",
            ));
            complete = false;
            continue;
        };

        let sku = required_string(item, "sku", &format!("{path}.sku"), issues);
        let quantity = required_integer(item, "quantity", &format!("{path}.quantity"), issues);

        match (sku, quantity) {
            (Some(sku), Some(quantity)) => items.push(LineItem { sku, quantity }),
            _ => complete = false,
        }
    }

    complete.then_some(items)
}

fn check_customer_id(customer_id: &str, issues: &mut Vec<ValidationIssue>) {
    if Uuid::parse_str(customer_id).is_err() {
        issues.push(ValidationIssue::new("customerId", "Invalid uuid", "invalid_string"));
    }
}

fn check_items(items: &[LineItem], issues: &mut Vec<ValidationIssue>) {
    if items.is_empty() {
        issues.push(ValidationIssue::new(
            "items",
            "Order must have at least one item",
            "too_small",
        ));
    }

    for (index, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            issues.push(ValidationIssue::new(
                format!("items.{index}.quantity"),
                "Number must be greater than 0",
                "too_small",
            ));
        }
    }
}

fn check_total_amount(total_amount: f64, issues: &mut Vec<ValidationIssue>) {
    if !total_amount.is_finite() {
        issues.push(ValidationIssue::new(
            "totalAmount",
            "Expected finite number",
            "invalid_type",
        ));
    } else if total_amount <= 0.0 {
        issues.push(ValidationIssue::new(
            "totalAmount",
            "Number must be greater than 0",
            "too_small",
        ));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CUSTOMER: &str = "5b1f9d3e-4b8a-4c1e-9d7f-2a6b8c0e1f23";

    fn valid_body() -> Value {
        json!({
            "customerId": CUSTOMER,
            "items": [{ "sku": "SKU-1", "quantity": 1 }],
            "totalAmount": 120
        })
    }

    fn paths(err: &ValidationError) -> Vec<&str> {
        err.issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_valid_request_parses() {
        let request = validate_request(&valid_body()).unwrap();

        assert_eq!(request.customer_id, CUSTOMER);
        assert_eq!(request.items, vec![LineItem::new("SKU-1", 1)]);
        assert_eq!(request.total_amount, 120.0);
    }

    #[test]
    fn test_validation_is_repeatable() {
        let body = valid_body();
        let first = validate_request(&body).unwrap();
        let second = validate_request(&body).unwrap();
        assert_eq!(first, second);

        let bad = json!({ "customerId": "nope", "items": [], "totalAmount": 0 });
        assert_eq!(validate_request(&bad), validate_request(&bad));
    }

    #[test]
    fn test_collects_every_issue() {
        let body = json!({
            "customerId": "invalid-uuid",
            "items": [],
            "totalAmount": -10
        });

        let err = validate_request(&body).unwrap_err();

        assert_eq!(paths(&err), vec!["customerId", "items", "totalAmount"]);
        assert_eq!(err.issues[0].code, "invalid_string");
        assert_eq!(err.issues[1].message, "Order must have at least one item");
        assert_eq!(err.issues[1].code, "too_small");
        assert_eq!(err.issues[2].code, "too_small");
    }

    #[test]
    fn test_reports_missing_and_mistyped_fields() {
        let err = validate_request(&json!({ "items": "SKU-1", "totalAmount": "12" })).unwrap_err();

        assert_eq!(paths(&err), vec!["customerId", "items", "totalAmount"]);
        assert_eq!(err.issues[0].message, "Required");
        assert_eq!(err.issues[1].message, "Expected array, received string");
        assert_eq!(err.issues[2].message, "Expected number, received string");
        assert!(err.issues.iter().all(|i| i.code == "invalid_type"));
    }

    #[test]
    fn test_reports_item_level_paths() {
        let body = json!({
            "customerId": CUSTOMER,
            "items": [
                { "sku": "SKU-1", "quantity": 1 },
                { "sku": 7, "quantity": 1.5 },
                "SKU-3",
                { "sku": "SKU-4", "quantity": 0 }
            ],
            "totalAmount": 10
        });

        let err = validate_request(&body).unwrap_err();

        assert_eq!(
            paths(&err),
            vec!["items.1.sku", "items.1.quantity", "items.2"]
        );
        assert_eq!(err.issues[1].message, "Expected integer, received float");
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        let body = json!({
            "customerId": CUSTOMER,
            "items": [{ "sku": "SKU-1", "quantity": -2 }],
            "totalAmount": 10
        });

        let err = validate_request(&body).unwrap_err();

        assert_eq!(paths(&err), vec!["items.0.quantity"]);
        assert_eq!(err.issues[0].code, "too_small");
    }

    #[test]
    fn test_whole_float_quantity_is_accepted() {
        let body = json!({
            "customerId": CUSTOMER,
            "items": [{ "sku": "SKU-1", "quantity": 2.0 }],
            "totalAmount": 10
        });

        assert_eq!(validate_request(&body).unwrap().items[0].quantity, 2);
    }

    #[test]
    fn test_request_schema_strips_unknown_fields() {
        let mut body = valid_body();
        body["couponCode"] = json!("FREE");

        let request = validate_request(&body).unwrap();

        assert_eq!(request, validate_request(&valid_body()).unwrap());
    }

    #[test]
    fn test_non_object_payload() {
        let err = validate_request(&json!([1, 2])).unwrap_err();
        assert_eq!(err.issues, vec![ValidationIssue::new("", "Expected object, received array", "invalid_type")]);
    }

    #[test]
    fn test_event_schema_accepts_envelope_and_ignores_extras() {
        let mut body = valid_body();
        body["correlationId"] = json!("corr-1");
        body["createdAt"] = json!("2024-01-02T03:04:05.000Z");
        body["producer"] = json!({ "name": "api-gateway" });

        let event = validate_event(&body).unwrap();

        assert_eq!(event.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(event.created_at.as_deref(), Some("2024-01-02T03:04:05.000Z"));
        assert_eq!(event.items.len(), 1);

        body.as_object_mut().unwrap().remove("producer");
        assert_eq!(validate_event(&body).unwrap(), event);
    }

    #[test]
    fn test_event_schema_envelope_fields_are_optional() {
        let event = validate_event(&valid_body()).unwrap();
        assert_eq!(event.correlation_id, None);
        assert_eq!(event.created_at, None);
    }

    #[test]
    fn test_event_schema_type_checks_envelope_fields() {
        let mut body = valid_body();
        body["correlationId"] = json!(42);

        let err = validate_event(&body).unwrap_err();
        assert_eq!(paths(&err), vec!["correlationId"]);
    }

    #[test]
    fn test_typed_revalidation_matches_schema() {
        let request = OrderRequest {
            customer_id: "c1".to_string(),
            items: vec![],
            total_amount: f64::NAN,
        };

        let err = request.validate().unwrap_err();
        assert_eq!(paths(&err), vec!["customerId", "items", "totalAmount"]);

        let good = validate_request(&valid_body()).unwrap();
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_error_display_lists_issues() {
        let err = ValidationError {
            issues: vec![ValidationIssue::new("items", "Order must have at least one item", "too_small")],
        };
        assert_eq!(err.to_string(), "Invalid payload: items: Order must have at least one item");
    }

    #[test]
    fn test_issue_from_order_error() {
        let issue = ValidationIssue::from(&OrderError::InvalidSku);
        assert_eq!(issue.path, "items.sku");
        assert_eq!(issue.code, "invalid_sku");
    }
}
