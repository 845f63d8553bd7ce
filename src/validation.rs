use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::ThoughtData;

/// Thought counters that may arrive as whole-valued floats such as `2.0`
const COUNTER_FIELDS: [&str; 4] = [
    "thought_number",
    "total_thoughts",
    "revises_thought",
    "branch_from_thought",
];

/// Default cap on the length of a single thought, in characters
pub const DEFAULT_MAX_THOUGHT_LENGTH: usize = 100_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Input must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {field}")]
    Missing { field: String },

    #[error("Invalid type for {field}: expected {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: String },

    #[error("Invalid number for {field}: {value} (must be an integer between 1 and {max})", max = u32::MAX)]
    InvalidNumber { field: String, value: String },

    #[error("Thought content too long: {actual} chars (max: {max})")]
    ThoughtTooLong { actual: usize, max: usize },

    #[error("Malformed thought: {reason}")]
    Malformed { reason: String },
}

impl ValidationError {
    /// Path of the field that violated a constraint
    pub fn field(&self) -> &str {
        match self {
            ValidationError::NotAnObject | ValidationError::Malformed { .. } => "input",
            ValidationError::Missing { field }
            | ValidationError::WrongType { field, .. }
            | ValidationError::Empty { field }
            | ValidationError::InvalidNumber { field, .. } => field,
            ValidationError::ThoughtTooLong { .. } => "thought",
        }
    }
}

type Check<T = ()> = std::result::Result<T, ValidationError>;

/// Checks raw step submissions before they reach the tracker
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_thought_length: usize,
}

impl InputValidator {
    pub fn new(max_thought_length: usize) -> Self {
        Self { max_thought_length }
    }

    /// Validate a raw submission and convert it into a `ThoughtData`.
    ///
    /// Fields are checked in declaration order and the first violation is
    /// returned. Unknown fields are ignored.
    pub fn validate(&self, raw: &Value) -> Check<ThoughtData> {
        let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let thought = require_str(obj, "thought", "thought")?;
        self.validate_thought_content(thought)?;
        require_positive(obj, "thought_number", "thought_number")?;
        require_positive(obj, "total_thoughts", "total_thoughts")?;
        match obj.get("next_thought_needed") {
            None | Some(Value::Null) => {
                return Err(ValidationError::Missing {
                    field: "next_thought_needed".to_string(),
                })
            }
            Some(v) if !v.is_boolean() => {
                return Err(ValidationError::WrongType {
                    field: "next_thought_needed".to_string(),
                    expected: "boolean",
                })
            }
            Some(_) => {}
        }

        optional_bool(obj, "is_revision")?;
        optional_positive(obj, "revises_thought")?;
        optional_positive(obj, "branch_from_thought")?;
        if let Some(branch_id) = optional_str(obj, "branch_id", "branch_id")? {
            if branch_id.is_empty() {
                return Err(ValidationError::Empty {
                    field: "branch_id".to_string(),
                });
            }
        }
        optional_bool(obj, "needs_more_thoughts")?;
        if let Some(step) = present(obj, "current_step") {
            validate_step(step, "current_step")?;
        }
        if let Some(steps) = present(obj, "previous_steps") {
            let steps = steps.as_array().ok_or_else(|| ValidationError::WrongType {
                field: "previous_steps".to_string(),
                expected: "array",
            })?;
            for (i, step) in steps.iter().enumerate() {
                validate_step(step, &format!("previous_steps[{i}]"))?;
            }
        }
        optional_str_array(obj, "remaining_steps", "remaining_steps")?;
        optional_str_array(obj, "available_mcp_tools", "available_mcp_tools")?;

        let mut normalized = obj.clone();
        for key in COUNTER_FIELDS {
            if let Some(value) = normalized.get_mut(key) {
                if let Some(n) = whole_number(value) {
                    *value = Value::from(n);
                }
            }
        }

        serde_json::from_value(Value::Object(normalized)).map_err(|e| ValidationError::Malformed {
            reason: e.to_string(),
        })
    }

    pub fn validate_thought_content(&self, content: &str) -> Check {
        if content.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "thought".to_string(),
            });
        }

        let length = content.chars().count();
        if length > self.max_thought_length {
            return Err(ValidationError::ThoughtTooLong {
                actual: length,
                max: self.max_thought_length,
            });
        }

        Ok(())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_THOUGHT_LENGTH)
    }
}

fn validate_step(step: &Value, path: &str) -> Check {
    let obj = step.as_object().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "object",
    })?;

    require_str(obj, "step_description", &format!("{path}.step_description"))?;

    let tools_path = format!("{path}.recommended_tools");
    let tools = match obj.get("recommended_tools") {
        None | Some(Value::Null) => return Err(ValidationError::Missing { field: tools_path }),
        Some(v) => v.as_array().ok_or_else(|| ValidationError::WrongType {
            field: tools_path.clone(),
            expected: "array",
        })?,
    };
    for (i, tool) in tools.iter().enumerate() {
        validate_tool_recommendation(tool, &format!("{tools_path}[{i}]"))?;
    }

    require_str(obj, "expected_outcome", &format!("{path}.expected_outcome"))?;
    optional_str_array(obj, "next_step_conditions", &format!("{path}.next_step_conditions"))?;
    Ok(())
}

fn validate_tool_recommendation(tool: &Value, path: &str) -> Check {
    let obj = tool.as_object().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "object",
    })?;

    let name_path = format!("{path}.tool_name");
    if require_str(obj, "tool_name", &name_path)?.trim().is_empty() {
        return Err(ValidationError::Empty { field: name_path });
    }

    let priority_path = format!("{path}.priority");
    match obj.get("priority") {
        None | Some(Value::Null) => return Err(ValidationError::Missing { field: priority_path }),
        Some(v) if !v.is_number() => {
            return Err(ValidationError::WrongType {
                field: priority_path,
                expected: "number",
            })
        }
        Some(_) => {}
    }

    require_str(obj, "rationale", &format!("{path}.rationale"))?;
    optional_str_array(obj, "alternatives", &format!("{path}.alternatives"))?;
    // suggested_inputs is free-form
    Ok(())
}

/// Field value, treating an explicit null as absent
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn require_str<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Check<&'a str> {
    match present(obj, key) {
        None => Err(ValidationError::Missing {
            field: path.to_string(),
        }),
        Some(v) => v.as_str().ok_or_else(|| ValidationError::WrongType {
            field: path.to_string(),
            expected: "string",
        }),
    }
}

fn optional_str<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Check<Option<&'a str>> {
    present(obj, key)
        .map(|v| {
            v.as_str().ok_or_else(|| ValidationError::WrongType {
                field: path.to_string(),
                expected: "string",
            })
        })
        .transpose()
}

fn optional_bool(obj: &Map<String, Value>, key: &str) -> Check {
    match present(obj, key) {
        Some(v) if !v.is_boolean() => Err(ValidationError::WrongType {
            field: key.to_string(),
            expected: "boolean",
        }),
        _ => Ok(()),
    }
}

/// Non-negative integer value of a number, accepting floats without a
/// fractional part
fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u64)
    })
}

fn positive(value: &Value, path: &str) -> Check {
    if !value.is_number() {
        return Err(ValidationError::WrongType {
            field: path.to_string(),
            expected: "integer",
        });
    }
    match whole_number(value) {
        Some(n) if n >= 1 && n <= u64::from(u32::MAX) => Ok(()),
        _ => Err(ValidationError::InvalidNumber {
            field: path.to_string(),
            value: value.to_string(),
        }),
    }
}

fn require_positive(obj: &Map<String, Value>, key: &str, path: &str) -> Check {
    match present(obj, key) {
        None => Err(ValidationError::Missing {
            field: path.to_string(),
        }),
        Some(v) => positive(v, path),
    }
}

fn optional_positive(obj: &Map<String, Value>, key: &str) -> Check {
    match present(obj, key) {
        Some(v) => positive(v, key),
        None => Ok(()),
    }
}

fn optional_str_array(obj: &Map<String, Value>, key: &str, path: &str) -> Check {
    let Some(value) = present(obj, key) else {
        return Ok(());
    };
    let items = value.as_array().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "array of strings",
    })?;
    if items.iter().all(Value::is_string) {
        Ok(())
    } else {
        Err(ValidationError::WrongType {
            field: path.to_string(),
            expected: "array of strings",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "thought": "Look at the failing test first",
            "thought_number": 1,
            "total_thoughts": 3,
            "next_thought_needed": true
        })
    }

    #[test]
    fn test_valid_minimal_thought() {
        let validator = InputValidator::default();
        let thought = validator.validate(&base()).unwrap();
        assert_eq!(thought.thought_number, 1);
        assert_eq!(thought.total_thoughts, 3);
        assert!(thought.next_thought_needed);
        assert!(thought.current_step.is_none());
    }

    #[test]
    fn test_missing_thought() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw.as_object_mut().unwrap().remove("thought");
        assert_eq!(
            validator.validate(&raw),
            Err(ValidationError::Missing {
                field: "thought".to_string()
            })
        );
    }

    #[test]
    fn test_empty_thought_content() {
        let validator = InputValidator::default();
        assert!(matches!(
            validator.validate_thought_content("   "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_oversized_thought_content() {
        let validator = InputValidator::new(10);
        assert!(matches!(
            validator.validate_thought_content("x".repeat(11).as_str()),
            Err(ValidationError::ThoughtTooLong { actual: 11, max: 10 })
        ));
    }

    #[test]
    fn test_invalid_thought_numbers() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["thought_number"] = json!(0);
        assert!(matches!(
            validator.validate(&raw),
            Err(ValidationError::InvalidNumber { ref field, .. }) if field == "thought_number"
        ));

        let mut raw = base();
        raw["total_thoughts"] = json!(-2);
        assert!(matches!(
            validator.validate(&raw),
            Err(ValidationError::InvalidNumber { ref field, .. }) if field == "total_thoughts"
        ));

        let mut raw = base();
        raw["thought_number"] = json!("one");
        assert!(matches!(
            validator.validate(&raw),
            Err(ValidationError::WrongType { expected: "integer", .. })
        ));
    }

    #[test]
    fn test_whole_float_counters_are_accepted() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["thought_number"] = json!(2.0);
        raw["total_thoughts"] = json!(3.0);
        raw["revises_thought"] = json!(1.0);
        raw["branch_from_thought"] = json!(1.0);
        raw["branch_id"] = json!("alt");

        let thought = validator.validate(&raw).unwrap();
        assert_eq!(thought.thought_number, 2);
        assert_eq!(thought.total_thoughts, 3);
        assert_eq!(thought.revises_thought, Some(1));
        assert_eq!(thought.branch_from_thought, Some(1));

        let mut raw = base();
        raw["thought_number"] = json!(1.5);
        assert!(matches!(
            validator.validate(&raw),
            Err(ValidationError::InvalidNumber { ref field, .. }) if field == "thought_number"
        ));

        let mut raw = base();
        raw["revises_thought"] = json!(0.0);
        assert!(matches!(
            validator.validate(&raw),
            Err(ValidationError::InvalidNumber { ref field, .. }) if field == "revises_thought"
        ));
    }

    #[test]
    fn test_total_below_number_is_accepted() {
        // the tracker raises the estimate; the validator does not reject it
        let validator = InputValidator::default();
        let mut raw = base();
        raw["thought_number"] = json!(5);
        assert!(validator.validate(&raw).is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let validator = InputValidator::default();
        let raw = json!({ "thought_number": 0, "next_thought_needed": "yes" });
        assert_eq!(validator.validate(&raw).unwrap_err().field(), "thought");
    }

    #[test]
    fn test_next_thought_needed_must_be_bool() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["next_thought_needed"] = json!("true");
        assert_eq!(
            validator.validate(&raw).unwrap_err().field(),
            "next_thought_needed"
        );
    }

    #[test]
    fn test_nested_recommendation_paths() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["current_step"] = json!({
            "step_description": "Search the codebase",
            "recommended_tools": [
                { "tool_name": "grep", "priority": 1, "rationale": "fast" },
                { "tool_name": "read_file", "priority": "high", "rationale": "context" }
            ],
            "expected_outcome": "Call sites located"
        });
        let err = validator.validate(&raw).unwrap_err();
        assert_eq!(err.field(), "current_step.recommended_tools[1].priority");
    }

    #[test]
    fn test_previous_steps_shape() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["previous_steps"] = json!([{ "step_description": "x", "expected_outcome": "y" }]);
        assert_eq!(
            validator.validate(&raw).unwrap_err().field(),
            "previous_steps[0].recommended_tools"
        );
    }

    #[test]
    fn test_optional_fields_and_extras() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["is_revision"] = json!(true);
        raw["revises_thought"] = json!(1);
        raw["branch_id"] = Value::Null;
        raw["available_mcp_tools"] = json!(["grep", "read_file"]);
        raw["some_future_field"] = json!({ "ignored": true });
        raw["current_step"] = json!({
            "step_description": "Read the module",
            "recommended_tools": [{
                "tool_name": "read_file",
                "priority": 0.5,
                "rationale": "Need the source",
                "alternatives": ["cat"],
                "suggested_inputs": { "path": "src/lib.rs", "lines": [1, 40] }
            }],
            "expected_outcome": "Understand the API",
            "next_step_conditions": ["API is clear"]
        });

        let thought = validator.validate(&raw).unwrap();
        assert!(thought.is_revision());
        assert_eq!(thought.revises_thought, Some(1));
        assert!(thought.branch_id.is_none());
        let step = thought.current_step.unwrap();
        assert_eq!(step.recommended_tools[0].suggested_inputs.as_ref().unwrap()["lines"][1], 40);
    }

    #[test]
    fn test_string_array_fields() {
        let validator = InputValidator::default();
        let mut raw = base();
        raw["remaining_steps"] = json!(["a", 2]);
        assert!(matches!(
            validator.validate(&raw),
            Err(ValidationError::WrongType { ref field, .. }) if field == "remaining_steps"
        ));
    }

    #[test]
    fn test_not_an_object() {
        let validator = InputValidator::default();
        assert_eq!(validator.validate(&json!([1, 2])), Err(ValidationError::NotAnObject));
    }
}
