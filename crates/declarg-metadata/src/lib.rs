//! Shared shape model for declarg argument registries.
//!
//! A *shape* is the declarative description of a target record: which of its
//! fields are options, which one collects plain arguments, and which ones are
//! nested subcommands. This crate intentionally knows nothing about parsing;
//! it is used for:
//! - building shapes in code (builder API below, or `declare_shape!`)
//! - loading shapes from a JSON document (`ShapeDocumentV1`) in the CLI

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Current `format-version` of [`ShapeDocumentV1`].
pub const SHAPE_FORMAT_VERSION: u32 = 1;

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Bool,
    Text,
    Integer,
    Float,
    List(Box<ValueType>),
}

impl ValueType {
    /// Sequence of text values, the only type accepted for a plain-args sink.
    pub fn text_list() -> Self {
        Self::List(Box::new(Self::Text))
    }

    pub fn is_text_list(&self) -> bool {
        matches!(self, Self::List(inner) if **inner == Self::Text)
    }

    /// Whether an option of this type consumes a value token.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Bool)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Text => f.write_str("text"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

/// Option-level annotations of a field.
///
/// Empty `short`/`long` mean "derive from the field name".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub long: Vec<String>,
    #[serde(rename = "type", default = "default_option_type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

fn default_option_type() -> ValueType {
    ValueType::Bool
}

impl OptionSpec {
    /// A pure switch (`bool`).
    pub fn switch() -> Self {
        Self::value(ValueType::Bool)
    }

    /// An option of the given type.
    pub fn value(value_type: ValueType) -> Self {
        Self {
            short: Vec::new(),
            long: Vec::new(),
            value_type,
            mandatory: false,
            help: String::new(),
            value_name: None,
        }
    }

    pub fn short(mut self, name: impl Into<String>) -> Self {
        self.short.push(name.into());
        self
    }

    pub fn long(mut self, name: impl Into<String>) -> Self {
        self.long.push(name.into());
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }
}

/// What a field means to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldRole {
    /// Explicitly excluded from argument handling.
    Ignored,
    /// Generated artifact of the shape representation; never an argument.
    Synthetic,
    /// Nested command; the field name is the subcommand token.
    Subcommand { shape: ShapeSpec },
    /// Collector for positional arguments.
    PlainArgs {
        #[serde(rename = "type")]
        value_type: ValueType,
    },
    Option(OptionSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub role: FieldRole,
}

/// Declarative description of one target record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ShapeSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
}

impl ShapeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, role: FieldRole) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            role,
        });
        self
    }

    pub fn option(self, name: impl Into<String>, spec: OptionSpec) -> Self {
        self.field(name, FieldRole::Option(spec))
    }

    /// Shorthand for a switch with derived names.
    pub fn switch(self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.option(name, OptionSpec::switch().help(help))
    }

    /// A `list<text>` plain-args sink.
    pub fn plain_args(self, name: impl Into<String>) -> Self {
        self.field(
            name,
            FieldRole::PlainArgs {
                value_type: ValueType::text_list(),
            },
        )
    }

    pub fn subcommand(self, name: impl Into<String>, shape: ShapeSpec) -> Self {
        self.field(name, FieldRole::Subcommand { shape })
    }

    pub fn ignored(self, name: impl Into<String>) -> Self {
        self.field(name, FieldRole::Ignored)
    }

    pub fn synthetic(self, name: impl Into<String>) -> Self {
        self.field(name, FieldRole::Synthetic)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// On-disk JSON payload describing a shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShapeDocumentV1 {
    pub format_version: u32,
    pub shape: ShapeSpec,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid shape document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported shape format-version {0} (expected {SHAPE_FORMAT_VERSION})")]
    UnsupportedVersion(u32),
}

impl ShapeDocumentV1 {
    pub fn new(shape: ShapeSpec) -> Self {
        Self {
            format_version: SHAPE_FORMAT_VERSION,
            shape,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(raw)?;
        if doc.format_version != SHAPE_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion(doc.format_version));
        }
        Ok(doc)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_deserializes_kebab_case() {
        let json = r#"{
  "format-version": 1,
  "shape": {
    "name": "tool",
    "fields": [
      { "name": "verbose", "kind": "option", "help": "Be verbose" },
      { "name": "size", "kind": "option", "type": "integer", "short": ["s"],
        "mandatory": true, "value-name": "N" },
      { "name": "files", "kind": "plain-args", "type": { "list": "text" } },
      { "name": "cache", "kind": "ignored" },
      { "name": "build", "kind": "subcommand", "shape": { "name": "build" } }
    ]
  }
}"#;
        let doc = ShapeDocumentV1::from_json(json).unwrap();
        let shape = doc.shape;
        assert_eq!(shape.name, "tool");
        assert_eq!(shape.fields.len(), 5);

        let FieldRole::Option(verbose) = &shape.fields[0].role else {
            panic!("expected option");
        };
        assert_eq!(verbose.value_type, ValueType::Bool);
        assert!(verbose.short.is_empty());

        let FieldRole::Option(size) = &shape.fields[1].role else {
            panic!("expected option");
        };
        assert_eq!(size.value_type, ValueType::Integer);
        assert_eq!(size.short, vec!["s".to_string()]);
        assert!(size.mandatory);
        assert_eq!(size.value_name.as_deref(), Some("N"));

        assert_eq!(
            shape.fields[2].role,
            FieldRole::PlainArgs {
                value_type: ValueType::text_list()
            }
        );
        assert_eq!(shape.fields[3].role, FieldRole::Ignored);
        assert_eq!(
            shape.fields[4].role,
            FieldRole::Subcommand {
                shape: ShapeSpec::new("build")
            }
        );
    }

    #[test]
    fn document_rejects_unknown_version() {
        let json = r#"{ "format-version": 7, "shape": { "name": "x" } }"#;
        match ShapeDocumentV1::from_json(json) {
            Err(DocumentError::UnsupportedVersion(7)) => {}
            other => panic!("expected UnsupportedVersion, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_document_keeps_the_json_error() {
        let err = ShapeDocumentV1::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
        assert!(err.to_string().starts_with("invalid shape document: "));
        assert!(std::error::Error::source(&err).is_some());

        let err = DocumentError::UnsupportedVersion(3);
        assert_eq!(
            err.to_string(),
            "unsupported shape format-version 3 (expected 1)"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn nested_subcommand_survives_json() {
        let shape = ShapeSpec::new("git")
            .switch("verbose", "Be verbose")
            .subcommand(
                "commit",
                ShapeSpec::new("commit")
                    .option(
                        "message",
                        OptionSpec::value(ValueType::Text).short("m").mandatory(),
                    )
                    .plain_args("paths"),
            );
        let json = ShapeDocumentV1::new(shape.clone()).to_json_pretty().unwrap();
        assert!(json.contains("\"kind\": \"subcommand\""));
        let back = ShapeDocumentV1::from_json(&json).unwrap();
        assert_eq!(back.shape, shape);
    }

    #[test]
    fn value_type_display() {
        assert_eq!(ValueType::text_list().to_string(), "list<text>");
        assert!(ValueType::text_list().is_text_list());
        assert!(!ValueType::List(Box::new(ValueType::Integer)).is_text_list());
        assert!(!ValueType::Bool.takes_value());
        assert!(ValueType::Float.takes_value());
    }
}
