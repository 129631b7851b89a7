use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic payload shared by both tool declaration shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    /// Usually a string; any other JSON value is carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// JSON Schema object describing the function parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Which wire shape a tool declaration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolForm {
    /// Responses style: `{ "type": "function", "name", "description", "parameters" }`
    Flat,
    /// Chat Completions style: `{ "type": "function", "function": { ... } }`
    Nested,
}

/// A function tool declaration in either of the two wire shapes.
///
/// The shape carries no behaviour; `to_form` converts between them without
/// touching the name, description or parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolDeclaration {
    Flat(FunctionSpec),
    Nested(FunctionSpec),
}

impl ToolDeclaration {
    /// Parse one raw tool entry.
    ///
    /// Returns `None` for anything that is not a `function` tool with a
    /// non-empty name, either at top level or under `function`.
    /// A top-level `name` wins when both are present.
    pub fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        if obj.get("type").and_then(Value::as_str) != Some("function") {
            return None;
        }

        if let Some(spec) = spec_from_object(obj) {
            return Some(ToolDeclaration::Flat(spec));
        }
        obj.get("function")
            .and_then(Value::as_object)
            .and_then(spec_from_object)
            .map(ToolDeclaration::Nested)
    }

    pub fn form(&self) -> ToolForm {
        match self {
            ToolDeclaration::Flat(_) => ToolForm::Flat,
            ToolDeclaration::Nested(_) => ToolForm::Nested,
        }
    }

    pub fn spec(&self) -> &FunctionSpec {
        match self {
            ToolDeclaration::Flat(spec) | ToolDeclaration::Nested(spec) => spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec().name
    }

    /// Re-wrap the same payload in the requested shape.
    pub fn to_form(self, form: ToolForm) -> Self {
        match (self, form) {
            (ToolDeclaration::Flat(spec), ToolForm::Nested) => ToolDeclaration::Nested(spec),
            (ToolDeclaration::Nested(spec), ToolForm::Flat) => ToolDeclaration::Flat(spec),
            (same, _) => same,
        }
    }
}

fn spec_from_object(obj: &Map<String, Value>) -> Option<FunctionSpec> {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())?;
    Some(FunctionSpec {
        name: name.to_string(),
        description: obj.get("description").filter(|d| !d.is_null()).cloned(),
        parameters: obj.get("parameters").filter(|p| !p.is_null()).cloned(),
    })
}

impl Serialize for ToolDeclaration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut root = Map::new();
        root.insert("type".into(), Value::String("function".into()));

        let spec = serde_json::to_value(self.spec()).map_err(serde::ser::Error::custom)?;
        match self {
            ToolDeclaration::Flat(_) => {
                if let Value::Object(fields) = spec {
                    root.extend(fields);
                }
            }
            ToolDeclaration::Nested(_) => {
                root.insert("function".into(), spec);
            }
        }

        Value::Object(root).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToolDeclaration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        ToolDeclaration::from_value(&v)
            .ok_or_else(|| serde::de::Error::custom("expected a function tool with a name"))
    }
}
