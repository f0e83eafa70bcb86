//! Typed parameter schemas and the builder that produces them
//!
//! Schemas are declared explicitly through [`SchemaBuilder`] (or parsed from
//! a JSON value for tools that carry a raw schema). There is no runtime type
//! inspection: everything the model sees about a function's parameters is
//! fixed when the function is declared.

use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Enum,
}

/// Recursive parameter schema
///
/// `properties` preserves declaration order; the order in which parameters
/// are declared is the order the model sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Kind of this node
    pub kind: SchemaKind,

    /// Optional description attached to this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Named child schemas, for object kinds
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    /// Names of required properties, for object kinds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Element schema, for array kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Allowed values, for enum kinds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl Schema {
    fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            properties: IndexMap::new(),
            required: Vec::new(),
            items: None,
            enum_values: Vec::new(),
        }
    }

    /// Create a string schema
    pub fn string() -> Self {
        Self::of_kind(SchemaKind::String)
    }

    /// Create an integer schema
    pub fn integer() -> Self {
        Self::of_kind(SchemaKind::Integer)
    }

    /// Create a number schema
    pub fn number() -> Self {
        Self::of_kind(SchemaKind::Number)
    }

    /// Create a boolean schema
    pub fn boolean() -> Self {
        Self::of_kind(SchemaKind::Boolean)
    }

    /// Create an array schema with the given element schema
    pub fn array(items: Schema) -> Self {
        let mut schema = Self::of_kind(SchemaKind::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    /// Create an empty object schema
    pub fn object() -> Self {
        Self::of_kind(SchemaKind::Object)
    }

    /// Create an enum schema over the given values
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::of_kind(SchemaKind::Enum);
        schema.enum_values = values.into_iter().map(Into::into).collect();
        schema
    }

    /// Attach a description
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a named property (object kinds)
    pub fn with_property<S: Into<String>>(mut self, name: S, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark property names as required (object kinds)
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check structural invariants
    ///
    /// Every name in `required` must exist in `properties`; the check
    /// recurses into child schemas.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(SchemaError::UnknownRequired { name: name.clone() });
            }
        }
        for child in self.properties.values() {
            child.validate()?;
        }
        if let Some(items) = &self.items {
            items.validate()?;
        }
        Ok(())
    }

    /// Render this schema as a JSON schema value
    ///
    /// Enum kinds render as a string type with an `enum` list, matching what
    /// generative model services accept.
    pub fn to_json_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        let type_name = match self.kind {
            SchemaKind::Object => "object",
            SchemaKind::String | SchemaKind::Enum => "string",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array => "array",
        };
        map.insert("type".to_string(), Value::String(type_name.to_string()));
        if let Some(description) = &self.description {
            map.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        if !self.enum_values.is_empty() {
            map.insert(
                "enum".to_string(),
                Value::Array(
                    self.enum_values
                        .iter()
                        .map(|v| Value::String(v.clone()))
                        .collect(),
                ),
            );
        }
        if !self.properties.is_empty() {
            let mut properties = serde_json::Map::new();
            for (name, child) in &self.properties {
                properties.insert(name.clone(), child.to_json_value());
            }
            map.insert("properties".to_string(), Value::Object(properties));
        }
        if !self.required.is_empty() {
            map.insert(
                "required".to_string(),
                Value::Array(
                    self.required
                        .iter()
                        .map(|n| Value::String(n.clone()))
                        .collect(),
                ),
            );
        }
        if let Some(items) = &self.items {
            map.insert("items".to_string(), items.to_json_value());
        }
        Value::Object(map)
    }

    /// Parse a JSON schema value into a typed schema tree
    ///
    /// Accepts the JSON-schema subset that tools commonly declare: `type`,
    /// `description`, `properties`, `required`, `items` and `enum`. A value
    /// whose type cannot be mapped to any schema kind fails with
    /// [`SchemaError::Unsupported`].
    pub fn from_json_value(value: &Value) -> Result<Self, SchemaError> {
        let map = value.as_object().ok_or_else(|| SchemaError::Unsupported {
            type_name: value_type_name(value).to_string(),
        })?;

        let enum_values: Vec<String> = map
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let type_name = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Unsupported {
                type_name: "schema without a type".to_string(),
            })?;

        let kind = match type_name.to_ascii_lowercase().as_str() {
            "object" => SchemaKind::Object,
            "string" if !enum_values.is_empty() => SchemaKind::Enum,
            "string" => SchemaKind::String,
            "integer" => SchemaKind::Integer,
            "number" => SchemaKind::Number,
            "boolean" => SchemaKind::Boolean,
            "array" => SchemaKind::Array,
            other => {
                return Err(SchemaError::Unsupported {
                    type_name: other.to_string(),
                })
            }
        };

        let mut schema = Schema::of_kind(kind);
        schema.enum_values = enum_values;
        schema.description = map
            .get("description")
            .and_then(Value::as_str)
            .map(String::from);

        if let Some(properties) = map.get("properties").and_then(Value::as_object) {
            for (name, child) in properties {
                schema
                    .properties
                    .insert(name.clone(), Schema::from_json_value(child)?);
            }
        }
        if let Some(required) = map.get("required").and_then(Value::as_array) {
            schema.required = required
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect();
        }
        if let Some(items) = map.get("items") {
            schema.items = Some(Box::new(Schema::from_json_value(items)?));
        }

        schema.validate()?;
        Ok(schema)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared parameter types mappable to a schema kind
///
/// Implemented for the types a bound function can accept. Types outside this
/// set cannot be described to the model and fail schema construction.
pub trait ParamType {
    fn schema() -> Result<Schema, SchemaError>;
}

impl ParamType for String {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::string())
    }
}

impl ParamType for i32 {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::integer())
    }
}

impl ParamType for i64 {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::integer())
    }
}

impl ParamType for u32 {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::integer())
    }
}

impl ParamType for f32 {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::number())
    }
}

impl ParamType for f64 {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::number())
    }
}

impl ParamType for bool {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::boolean())
    }
}

impl<T: ParamType> ParamType for Vec<T> {
    fn schema() -> Result<Schema, SchemaError> {
        Ok(Schema::array(T::schema()?))
    }
}

// An arbitrary JSON value carries no declarable shape.
impl ParamType for Value {
    fn schema() -> Result<Schema, SchemaError> {
        Err(SchemaError::Unsupported {
            type_name: "serde_json::Value".to_string(),
        })
    }
}

/// Builder for an object schema describing a function's parameters
///
/// The explicit registration step: each `param` call declares one named
/// parameter with a mapped type and an optional description. Parameters
/// declared without a default are required. Errors (an unmappable type, a
/// required name that was never declared) surface at [`SchemaBuilder::build`].
#[derive(Default)]
pub struct SchemaBuilder {
    description: Option<String>,
    properties: IndexMap<String, Schema>,
    required: Vec<String>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a description to the object schema
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a required parameter of type `T`
    pub fn param<T: ParamType>(self, name: &str, description: &str) -> Self {
        self.add::<T>(name, description, true)
    }

    /// Declare an optional parameter of type `T`
    pub fn optional_param<T: ParamType>(self, name: &str, description: &str) -> Self {
        self.add::<T>(name, description, false)
    }

    /// Declare a parameter with an explicit schema
    pub fn param_with_schema(mut self, name: &str, schema: Schema, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    fn add<T: ParamType>(mut self, name: &str, description: &str, required: bool) -> Self {
        match T::schema() {
            Ok(mut schema) => {
                if !description.is_empty() {
                    schema.description = Some(description.to_string());
                }
                self.properties.insert(name.to_string(), schema);
                if required {
                    self.required.push(name.to_string());
                }
            }
            Err(error) => {
                self.error.get_or_insert(error);
            }
        }
        self
    }

    /// Finish the builder, validating the resulting object schema
    pub fn build(self) -> Result<Schema, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut schema = Schema::object();
        schema.description = self.description;
        schema.properties = self.properties;
        schema.required = self.required;
        schema.validate()?;
        Ok(schema)
    }
}
