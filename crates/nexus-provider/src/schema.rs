//! Attribute descriptors and plan resolution (defaults, type checks, validators).

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int32,
    StringSet,
    /// List of nested objects (data source results only).
    ObjectList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Set by the provider, never by the operator.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Keep the prior state value while the new one is unknown.
    UseStateForUnknown,
    /// Changing the value destroys and recreates the object.
    RequiresReplace,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    Regex {
        pattern: String,
        #[serde(skip)]
        regex: Regex,
    },
    MinLength {
        min: usize,
    },
    MinSetSize {
        min: usize,
    },
    /// Every set element must be one of `values`.
    SetMembers {
        values: Vec<&'static str>,
    },
    AtLeast {
        min: i64,
    },
}

impl Validator {
    /// Panics on an invalid pattern; patterns are compile-time constants.
    pub fn regex(pattern: &str) -> Self {
        Self::Regex {
            pattern: pattern.to_string(),
            regex: Regex::new(pattern).expect("attribute regex is valid"),
        }
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Self::Regex { pattern, regex }, Value::String(s)) => {
                if regex.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("value {s:?} must match regex {pattern}"))
                }
            }
            (Self::MinLength { min }, Value::String(s)) => {
                let len = s.chars().count();
                if len >= *min {
                    Ok(())
                } else {
                    Err(format!("string length must be at least {min}, got {len}"))
                }
            }
            (Self::MinSetSize { min }, Value::Array(items)) => {
                if items.len() >= *min {
                    Ok(())
                } else {
                    Err(format!(
                        "set must contain at least {min} element(s), got {}",
                        items.len()
                    ))
                }
            }
            (Self::SetMembers { values }, Value::Array(items)) => {
                for item in items.iter().filter_map(Value::as_str) {
                    if !values.contains(&item) {
                        return Err(format!(
                            "element {item:?} must be one of: {}",
                            values.join(", ")
                        ));
                    }
                }
                Ok(())
            }
            (Self::AtLeast { min }, Value::Number(n)) => match n.as_i64() {
                Some(v) if v >= *min => Ok(()),
                _ => Err(format!("value must be at least {min}, got {n}")),
            },
            _ => Ok(()),
        }
    }
}

/// Descriptor for one attribute.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
    pub description: String,
}

impl AttributeSchema {
    fn new(ty: AttributeType, presence: Presence) -> Self {
        Self {
            ty,
            presence,
            default: None,
            validators: Vec::new(),
            sensitive: false,
            plan_modifiers: Vec::new(),
            description: String::new(),
        }
    }

    pub fn required(ty: AttributeType) -> Self {
        Self::new(ty, Presence::Required)
    }

    pub fn optional(ty: AttributeType) -> Self {
        Self::new(ty, Presence::Optional)
    }

    pub fn computed(ty: AttributeType) -> Self {
        Self::new(ty, Presence::Computed)
    }

    /// Optional attribute that falls back to `default` when omitted.
    pub fn with_default(ty: AttributeType, default: impl Into<Value>) -> Self {
        let mut attr = Self::new(ty, Presence::Optional);
        attr.default = Some(default.into());
        attr
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Type-check and normalise a non-null value. String sets come back
    /// sorted and de-duplicated.
    fn normalise(&self, path: &str, value: &Value) -> ProviderResult<Value> {
        let mismatch = |expected: &str| {
            ProviderError::programming(format!("{path}: expected {expected}, got {value}"))
        };
        match self.ty {
            AttributeType::String => value
                .is_string()
                .then(|| value.clone())
                .ok_or_else(|| mismatch("string")),
            AttributeType::Bool => value
                .is_boolean()
                .then(|| value.clone())
                .ok_or_else(|| mismatch("bool")),
            AttributeType::Int32 => {
                let n = value.as_i64().ok_or_else(|| mismatch("integer"))?;
                i32::try_from(n).map_err(|_| {
                    ProviderError::validation(path, format!("value {n} does not fit in 32 bits"))
                })?;
                Ok(value.clone())
            }
            AttributeType::StringSet => {
                let items = value.as_array().ok_or_else(|| mismatch("set of string"))?;
                let set = items
                    .iter()
                    .map(|item| item.as_str().map(String::from).ok_or_else(|| mismatch("set of string")))
                    .collect::<ProviderResult<BTreeSet<String>>>()?;
                Ok(Value::Array(set.into_iter().map(Value::String).collect()))
            }
            AttributeType::ObjectList => value
                .as_array()
                .filter(|items| items.iter().all(Value::is_object))
                .map(|_| value.clone())
                .ok_or_else(|| mismatch("list of object")),
        }
    }
}

/// How strictly [`AttributeMap::resolve`] treats its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    /// Declared configuration: required checks and validators apply.
    Plan,
    /// Previously persisted state: type checks only.
    State,
}

/// Named attributes, ordered by name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<&'static str, AttributeSchema>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'static str, schema: AttributeSchema) -> Self {
        self.0.insert(name, schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve `input` against this schema.
    ///
    /// Unknown keys are a programming error. Missing optional attributes get
    /// their default (or null); missing required ones fail validation in
    /// [`Resolve::Plan`] mode. Attribute paths in errors are `prefix.name`.
    pub fn resolve(
        &self,
        prefix: &str,
        input: &Map<String, Value>,
        mode: Resolve,
    ) -> ProviderResult<Map<String, Value>> {
        if let Some(unknown) = input.keys().find(|k| !self.0.contains_key(k.as_str())) {
            return Err(ProviderError::programming(format!(
                "unknown attribute {}",
                join_path(prefix, unknown)
            )));
        }

        let mut resolved = Map::new();
        for (name, attr) in &self.0 {
            let path = join_path(prefix, name);
            let value = match input.get(*name).filter(|v| !v.is_null()) {
                Some(value) => attr.normalise(&path, value)?,
                None => match (&attr.default, attr.presence) {
                    (Some(default), _) => default.clone(),
                    (None, Presence::Required) if mode == Resolve::Plan => {
                        return Err(ProviderError::validation(path, "attribute is required"));
                    }
                    _ => Value::Null,
                },
            };

            if mode == Resolve::Plan && !value.is_null() {
                for validator in &attr.validators {
                    validator
                        .check(&value)
                        .map_err(|message| ProviderError::validation(&path, message))?;
                }
            }
            resolved.insert((*name).to_string(), value);
        }
        Ok(resolved)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Full schema of a resource or data source.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub description: String,
    pub attributes: AttributeMap,
    /// Nested `properties` block (capabilities only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AttributeMap>,
}
