//! Validation schema for product attribute maps.
//!
//! Built from resolved definitions. Each field coerces its input to the
//! definition's type and checks its constraints. Failures are collected per
//! attribute key rather than stopping at the first one.

use axum_helpers::FieldErrors;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

use super::models::{AttributeConstraints, AttributeDefinition, AttributeType};

struct FieldSchema {
    key: String,
    value_type: AttributeType,
    constraints: AttributeConstraints,
    pattern: Option<Regex>,
}

pub struct AttributeSchema {
    fields: Vec<FieldSchema>,
}

impl AttributeSchema {
    pub fn new(definitions: &[AttributeDefinition]) -> Self {
        let fields = definitions
            .iter()
            .map(|def| FieldSchema {
                key: def.key.clone(),
                value_type: def.value_type,
                constraints: def.constraints.clone(),
                pattern: def
                    .constraints
                    .pattern
                    .as_deref()
                    .and_then(|p| Regex::new(p).ok()),
            })
            .collect();
        Self { fields }
    }

    /// Coerce `input` into a clean attribute map.
    ///
    /// Keys without a definition are dropped. A missing or `null` value
    /// fails when required and is omitted otherwise.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, FieldErrors> {
        let mut output = Map::new();
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            match input.get(&field.key) {
                None | Some(Value::Null) => {
                    if field.constraints.required {
                        errors.insert(field.key.clone(), vec!["is required".to_string()]);
                    }
                }
                Some(value) => match field.coerce(value) {
                    Ok(coerced) => {
                        output.insert(field.key.clone(), coerced);
                    }
                    Err(messages) => {
                        errors.insert(field.key.clone(), messages);
                    }
                },
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }
}

impl FieldSchema {
    fn coerce(&self, value: &Value) -> Result<Value, Vec<String>> {
        match self.value_type {
            AttributeType::String => self.coerce_string(value),
            AttributeType::Number => self.coerce_number(value),
            AttributeType::Boolean => coerce_bool(value),
            AttributeType::Date => coerce_date(value),
            AttributeType::Enum => self.coerce_enum(value),
            AttributeType::MultiEnum => self.coerce_multi_enum(value),
            AttributeType::Object => match value {
                Value::Object(_) => Ok(value.clone()),
                _ => Err(vec!["expected an object".to_string()]),
            },
            AttributeType::Array => match value {
                Value::Array(items) => {
                    self.check_bounds(items.len() as f64, "items")?;
                    Ok(value.clone())
                }
                _ => Err(vec!["expected an array".to_string()]),
            },
        }
    }

    fn coerce_string(&self, value: &Value) -> Result<Value, Vec<String>> {
        let Value::String(s) = value else {
            return Err(vec!["expected a string".to_string()]);
        };

        let mut errors = Vec::new();
        if let Err(mut e) = self.check_bounds(s.chars().count() as f64, "characters") {
            errors.append(&mut e);
        }
        if let Some(ref pattern) = self.pattern {
            if !pattern.is_match(s) {
                errors.push(format!("must match pattern {}", pattern.as_str()));
            }
        }

        if errors.is_empty() {
            Ok(value.clone())
        } else {
            Err(errors)
        }
    }

    fn coerce_number(&self, value: &Value) -> Result<Value, Vec<String>> {
        let number = match value {
            Value::Number(n) => n.clone(),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(number_from_f64)
                .ok_or_else(|| vec!["expected a number".to_string()])?,
            _ => return Err(vec!["expected a number".to_string()]),
        };

        let as_f64 = number
            .as_f64()
            .ok_or_else(|| vec!["expected a number".to_string()])?;
        self.check_bounds(as_f64, "")?;
        Ok(Value::Number(number))
    }

    fn coerce_enum(&self, value: &Value) -> Result<Value, Vec<String>> {
        match value {
            Value::String(s) if self.is_option(s) => Ok(value.clone()),
            Value::String(s) => Err(vec![format!("'{s}' is not an allowed option")]),
            _ => Err(vec!["expected a string".to_string()]),
        }
    }

    fn coerce_multi_enum(&self, value: &Value) -> Result<Value, Vec<String>> {
        let Value::Array(items) = value else {
            return Err(vec!["expected an array of options".to_string()]);
        };

        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        for item in items {
            match item {
                Value::String(s) if !self.is_option(s) => {
                    errors.push(format!("'{s}' is not an allowed option"))
                }
                Value::String(s) if !seen.insert(s.as_str()) => {
                    errors.push(format!("'{s}' is listed more than once"))
                }
                Value::String(_) => {}
                _ => errors.push("options must be strings".to_string()),
            }
        }
        if let Err(mut e) = self.check_bounds(items.len() as f64, "items") {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(value.clone())
        } else {
            Err(errors)
        }
    }

    fn is_option(&self, value: &str) -> bool {
        self.constraints.options.iter().any(|o| o.value == value)
    }

    /// `unit` is empty for plain numbers, otherwise names what is counted
    fn check_bounds(&self, measured: f64, unit: &str) -> Result<(), Vec<String>> {
        let suffix = if unit.is_empty() {
            String::new()
        } else {
            format!(" {unit}")
        };

        let mut errors = Vec::new();
        if let Some(min) = self.constraints.min {
            if measured < min {
                errors.push(format!("must be at least {min}{suffix}"));
            }
        }
        if let Some(max) = self.constraints.max {
            if measured > max {
                errors.push(format!("must be at most {max}{suffix}"));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn number_from_f64(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

fn coerce_bool(value: &Value) -> Result<Value, Vec<String>> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(vec!["expected a boolean".to_string()]),
        },
        _ => Err(vec!["expected a boolean".to_string()]),
    }
}

fn coerce_date(value: &Value) -> Result<Value, Vec<String>> {
    match value {
        Value::String(s)
            if s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() =>
        {
            Ok(value.clone())
        }
        _ => Err(vec!["expected a date as YYYY-MM-DD".to_string()]),
    }
}
