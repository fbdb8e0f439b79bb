use std::fmt;

use declarg_metadata::{OptionSpec, ValueType};

use crate::error::{ConfigError, ParseResult};
use crate::target::Target;
use crate::value::convert;

/// One recognized option of a shape.
#[derive(Debug, Clone)]
pub struct ArgDecl {
    field: String,
    short: Vec<String>,
    long: Vec<String>,
    default_short: bool,
    value_type: ValueType,
    mandatory: bool,
    help: String,
    value_name: Option<String>,
}

fn normalize(raw: &str, prefix: &str) -> String {
    raw.trim().trim_start_matches(prefix).to_string()
}

fn check_short(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.chars().count() != 1 {
        return Err(ConfigError::InvalidName {
            field: field.to_string(),
            name: name.to_string(),
            reason: "short names are a single character",
        });
    }
    Ok(())
}

fn check_long(field: &str, name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        "long names cannot be empty"
    } else if name.starts_with('-') {
        "long names cannot start with '-'"
    } else if name.contains('=') {
        "long names cannot contain '='"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidName {
        field: field.to_string(),
        name: name.to_string(),
        reason,
    })
}

impl ArgDecl {
    /// Build a declaration for `field` from its option annotations.
    ///
    /// Without explicit short names the first character of the field name
    /// becomes the default short name; without explicit long names the field
    /// name itself is the long name.
    pub fn from_option(field: &str, spec: &OptionSpec) -> Result<Self, ConfigError> {
        if let ValueType::List(inner) = &spec.value_type {
            if !matches!(
                **inner,
                ValueType::Text | ValueType::Integer | ValueType::Float
            ) {
                return Err(ConfigError::UnsupportedOptionType {
                    field: field.to_string(),
                    found: spec.value_type.to_string(),
                });
            }
        }

        let mut short: Vec<String> = spec.short.iter().map(|s| normalize(s, "-")).collect();
        let default_short = short.is_empty();
        if default_short {
            let Some(first) = field.chars().next() else {
                return Err(ConfigError::InvalidName {
                    field: field.to_string(),
                    name: String::new(),
                    reason: "field name cannot be empty",
                });
            };
            short.push(first.to_string());
        }
        for name in &short {
            check_short(field, name)?;
        }

        let mut long: Vec<String> = spec.long.iter().map(|s| normalize(s, "--")).collect();
        if long.is_empty() {
            long.push(field.to_string());
        }
        for name in &long {
            check_long(field, name)?;
        }

        Ok(Self {
            field: field.to_string(),
            short,
            long,
            default_short,
            value_type: spec.value_type.clone(),
            mandatory: spec.mandatory,
            help: spec.help.clone(),
            value_name: spec.value_name.clone(),
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn short_names(&self) -> &[String] {
        &self.short
    }

    pub fn long_names(&self) -> &[String] {
        &self.long
    }

    /// Whether the only short name was derived from the field name.
    pub fn has_default_short_name(&self) -> bool {
        self.default_short
    }

    pub(crate) fn clear_short_names(&mut self) {
        self.short.clear();
    }

    pub fn needs_value(&self) -> bool {
        self.value_type.takes_value()
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn value_name(&self) -> String {
        self.value_name
            .clone()
            .unwrap_or_else(|| self.field.to_ascii_uppercase())
    }

    /// Preferred user-facing spelling: first long name, then first short name.
    pub fn display_flag(&self) -> String {
        self.long
            .first()
            .map(|l| format!("--{l}"))
            .or_else(|| self.short.first().map(|s| format!("-{s}")))
            .unwrap_or_else(|| self.field.clone())
    }

    /// Convert `value` and hand it to the target's field.
    ///
    /// `flag` is the option as the user spelled it (`-o`, `--output`).
    pub fn apply(
        &self,
        target: &mut dyn Target,
        flag: &str,
        value: Option<&str>,
    ) -> ParseResult<()> {
        let value = convert(&self.value_type, flag, value)?;
        target.set(&self.field, value)
    }
}

impl fmt::Display for ArgDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .short
            .iter()
            .map(|s| format!("-{s}"))
            .chain(self.long.iter().map(|l| format!("--{l}")))
            .collect();
        write!(f, "{} ({})", self.field, names.join(", "))
    }
}
