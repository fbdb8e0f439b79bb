use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use declarg_metadata::{FieldRole, ShapeSpec, ValueType};

use crate::error::{ParseError, ParseResult};
use crate::target::Target;
use crate::value::Value;

/// A target record for shapes only known at runtime (e.g. loaded from JSON).
///
/// Switches start as `false`, list options as empty lists and every other
/// option as unset. Serializes as a JSON object keyed by field name.
#[derive(Debug, Clone)]
pub struct Record {
    spec: Arc<ShapeSpec>,
    types: IndexMap<String, ValueType>,
    values: IndexMap<String, Option<Value>>,
    plain: Option<(String, Vec<String>)>,
    subcommand: Option<(String, Box<Record>)>,
}

impl Record {
    pub fn new(spec: impl Into<Arc<ShapeSpec>>) -> Self {
        let spec = spec.into();
        let mut types = IndexMap::new();
        let mut values = IndexMap::new();
        let mut plain = None;

        for field in &spec.fields {
            match &field.role {
                FieldRole::Option(opt) => {
                    let initial = match &opt.value_type {
                        ValueType::Bool => Some(Value::Bool(false)),
                        ValueType::List(_) => Some(Value::List(Vec::new())),
                        _ => None,
                    };
                    types.insert(field.name.clone(), opt.value_type.clone());
                    values.insert(field.name.clone(), initial);
                }
                FieldRole::PlainArgs { .. } if plain.is_none() => {
                    plain = Some((field.name.clone(), Vec::new()));
                }
                _ => {}
            }
        }

        Self {
            spec,
            types,
            values,
            plain,
            subcommand: None,
        }
    }

    pub fn shape(&self) -> &ShapeSpec {
        &self.spec
    }

    /// Current value of an option field; `None` if unset or unknown.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field).and_then(|v| v.as_ref())
    }

    /// Collected plain arguments (empty if the shape has no sink).
    pub fn plain_values(&self) -> &[String] {
        self.plain
            .as_ref()
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// The subcommand taken during parsing, if any.
    pub fn subcommand(&self) -> Option<(&str, &Record)> {
        self.subcommand
            .as_ref()
            .map(|(name, rec)| (name.as_str(), &**rec))
    }
}

impl Target for Record {
    fn shape_name(&self) -> &str {
        &self.spec.name
    }

    fn set(&mut self, field: &str, value: Value) -> ParseResult<()> {
        let (Some(ty), Some(slot)) = (self.types.get(field), self.values.get_mut(field)) else {
            return Err(ParseError::unknown_field(&self.spec.name, field));
        };
        match (ty, slot) {
            (ValueType::List(_), Some(Value::List(items))) => items.push(value),
            (_, slot) => *slot = Some(value),
        }
        Ok(())
    }

    fn plain_args(&mut self) -> Option<&mut Vec<String>> {
        self.plain.as_mut().map(|(_, v)| v)
    }

    fn enter_subcommand(&mut self, field: &str) -> Option<&mut dyn Target> {
        let nested = self.spec.fields.iter().find_map(|f| match &f.role {
            FieldRole::Subcommand { shape } if f.name == field => Some(shape.clone()),
            _ => None,
        })?;
        let (_, record) = self
            .subcommand
            .insert((field.to_string(), Box::new(Record::new(nested))));
        Some(&mut **record)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (field, value) in &self.values {
            map.serialize_entry(field, value)?;
        }
        if let Some((field, args)) = &self.plain {
            map.serialize_entry(field, args)?;
        }
        if let Some((field, record)) = &self.subcommand {
            map.serialize_entry(field, &**record)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarg_metadata::OptionSpec;

    fn shape() -> ShapeSpec {
        ShapeSpec::new("tool")
            .switch("verbose", "")
            .option("name", OptionSpec::value(ValueType::Text))
            .option(
                "include",
                OptionSpec::value(ValueType::List(Box::new(ValueType::Text))),
            )
            .plain_args("files")
            .subcommand("run", ShapeSpec::new("run").switch("fast", ""))
    }

    #[test]
    fn starts_with_defaults() {
        let rec = Record::new(shape());
        assert_eq!(rec.shape_name(), "tool");
        assert_eq!(rec.get("verbose"), Some(&Value::Bool(false)));
        assert_eq!(rec.get("name"), None);
        assert_eq!(rec.get("include"), Some(&Value::List(Vec::new())));
        assert!(rec.plain_values().is_empty());
        assert!(rec.subcommand().is_none());
    }

    #[test]
    fn set_overwrites_scalars_and_appends_lists() {
        let mut rec = Record::new(shape());
        rec.set("name", Value::Text("a".into())).unwrap();
        rec.set("name", Value::Text("b".into())).unwrap();
        rec.set("include", Value::Text("x".into())).unwrap();
        rec.set("include", Value::Text("y".into())).unwrap();
        assert_eq!(rec.get("name"), Some(&Value::Text("b".into())));
        assert_eq!(
            rec.get("include"),
            Some(&Value::List(vec![
                Value::Text("x".into()),
                Value::Text("y".into())
            ]))
        );

        let err = rec.set("missing", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, ParseError::TargetMismatch(_)));
    }

    #[test]
    fn enter_subcommand_attaches_a_fresh_record() {
        let mut rec = Record::new(shape());
        let sub = rec.enter_subcommand("run").unwrap();
        assert_eq!(sub.shape_name(), "run");
        sub.set("fast", Value::Bool(true)).unwrap();

        let (name, run) = rec.subcommand().unwrap();
        assert_eq!(name, "run");
        assert_eq!(run.get("fast"), Some(&Value::Bool(true)));
        assert!(rec.enter_subcommand("verbose").is_none());
    }

    #[test]
    fn serializes_as_an_object() {
        let mut rec = Record::new(shape());
        rec.set("verbose", Value::Bool(true)).unwrap();
        rec.plain_args().unwrap().push("a.txt".to_string());
        rec.enter_subcommand("run").unwrap();

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "verbose": true,
                "name": null,
                "include": [],
                "files": ["a.txt"],
                "run": { "fast": false }
            })
        );
    }
}
