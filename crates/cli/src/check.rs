use anyhow::{Context, Result};
use declarg::{Registry, ShapeSpec};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub shape: ShapeReport,
}

#[derive(Debug, Serialize)]
pub struct ShapeReport {
    pub name: String,
    pub summary: String,
    pub declarations: Vec<DeclReport>,
    pub plain_args: Option<String>,
    /// Fields that lost their default short name.
    pub downgraded: Vec<String>,
    pub subcommands: Vec<SubcommandReport>,
}

#[derive(Debug, Serialize)]
pub struct DeclReport {
    pub field: String,
    pub short: Vec<String>,
    pub long: Vec<String>,
    #[serde(rename = "type")]
    pub value_type: String,
    pub mandatory: bool,
}

#[derive(Debug, Serialize)]
pub struct SubcommandReport {
    pub field: String,
    #[serde(flatten)]
    pub shape: ShapeReport,
}

pub fn check_shape(shape: &ShapeSpec, source: &Path) -> Result<CheckReport> {
    let registry = Registry::build(shape)
        .with_context(|| format!("invalid shape '{}' in {}", shape.name, source.display()))?;

    Ok(CheckReport {
        source: source.display().to_string(),
        shape: shape_report(&registry),
    })
}

fn shape_report(registry: &Registry) -> ShapeReport {
    let declarations = registry
        .declarations()
        .iter()
        .map(|d| DeclReport {
            field: d.field().to_string(),
            short: d.short_names().to_vec(),
            long: d.long_names().to_vec(),
            value_type: d.value_type().to_string(),
            mandatory: d.is_mandatory(),
        })
        .collect();

    let subcommands = registry
        .subcommands()
        .map(|(field, nested)| SubcommandReport {
            field: field.to_string(),
            shape: shape_report(nested),
        })
        .collect();

    ShapeReport {
        name: registry.shape_name().to_string(),
        summary: registry.summary().to_string(),
        declarations,
        plain_args: registry.plain_args_field().map(str::to_string),
        downgraded: registry.downgraded_fields().to_vec(),
        subcommands,
    }
}

/// Human-readable lines for `report`, nested subcommands indented.
pub fn describe(report: &ShapeReport, indent: usize, out: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    out.push(format!(
        "{pad}{}: {} declaration(s), {} subcommand(s)",
        report.name,
        report.declarations.len(),
        report.subcommands.len()
    ));
    if let Some(field) = &report.plain_args {
        out.push(format!("{pad}  plain arguments -> {field}"));
    }
    for field in &report.downgraded {
        out.push(format!(
            "{pad}  note: '{field}' lost its default short name and is long-only"
        ));
    }
    for sub in &report.subcommands {
        describe(&sub.shape, indent + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarg::OptionSpec;

    #[test]
    fn report_lists_downgrades_and_subcommands() {
        let shape = ShapeSpec::new("tool")
            .switch("verbose", "")
            .switch("version", "")
            .option(
                "output",
                OptionSpec::value(declarg::ValueType::Text).short("o"),
            )
            .plain_args("files")
            .subcommand("run", ShapeSpec::new("run").switch("fast", ""));
        let report = check_shape(&shape, Path::new("shape.json")).unwrap();

        assert_eq!(report.source, "shape.json");
        assert_eq!(report.shape.declarations.len(), 3);
        assert_eq!(report.shape.downgraded, ["version".to_string()]);
        assert_eq!(report.shape.plain_args.as_deref(), Some("files"));
        assert_eq!(report.shape.subcommands[0].field, "run");

        let output = &report.shape.declarations[2];
        assert_eq!(output.short, ["o".to_string()]);
        assert_eq!(output.long, ["output".to_string()]);
        assert_eq!(output.value_type, "text");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["shape"]["subcommands"][0]["name"], "run");
        assert_eq!(json["shape"]["declarations"][0]["type"], "bool");
    }

    #[test]
    fn configuration_errors_fail_the_check() {
        let shape = ShapeSpec::new("tool").plain_args("a").plain_args("b");
        let err = check_shape(&shape, Path::new("shape.json")).unwrap_err();
        assert!(err.to_string().contains("invalid shape 'tool'"));
        assert!(format!("{err:#}").contains("plain-args specified twice"));
    }

    #[test]
    fn describe_indents_nested_shapes() {
        let shape = ShapeSpec::new("tool")
            .switch("verbose", "")
            .switch("version", "")
            .subcommand("run", ShapeSpec::new("run").switch("fast", ""));
        let report = check_shape(&shape, Path::new("shape.json")).unwrap();
        let mut lines = Vec::new();
        describe(&report.shape, 0, &mut lines);
        assert_eq!(lines[0], "tool: 2 declaration(s), 1 subcommand(s)");
        assert!(lines[1].contains("'version' lost its default short name"));
        assert_eq!(lines[2], "  run: 1 declaration(s), 0 subcommand(s)");
    }
}
