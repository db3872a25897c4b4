//! Argument schemas for tools.
//!
//! Each tool owns an [`ArgumentSchema`]: a small, explicit validator for its
//! JSON arguments that can also render itself as the JSON Schema the model
//! client advertises. Validation happens in the invoker, before a tool runs.

use serde_json::{Map, Value, json};

/// The accepted JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: String,
    kind: FieldKind,
    description: String,
    required: bool,
}

/// An object schema made of named, typed fields.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSchema {
    fields: Vec<Field>,
}

impl ArgumentSchema {
    /// An object schema with no fields yet.
    pub fn object() -> Self {
        Self::default()
    }

    pub fn required(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        });
        self
    }

    pub fn optional(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
        });
        self
    }

    /// Names of required fields, in declaration order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Check `arguments` against the schema, reporting the first violation.
    pub fn validate(&self, arguments: &Value) -> Result<(), String> {
        let Some(object) = arguments.as_object() else {
            return Err(format!(
                "expected arguments to be an object, got {}",
                describe(arguments)
            ));
        };

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(format!("missing required field `{}`", field.name));
                }
                None | Some(Value::Null) => {}
                Some(value) if !field.kind.accepts(value) => {
                    return Err(format!(
                        "field `{}` must be {}, got {}",
                        field.name,
                        field.kind.json_type(),
                        describe(value)
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Render as JSON Schema for the model client.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                json!({
                    "type": field.kind.json_type(),
                    "description": field.description,
                }),
            );
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields(),
        })
    }
}
