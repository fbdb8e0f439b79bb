use crate::decl::ArgDecl;
use crate::registry::Registry;

const NESTED_INDENT: &str = "    ";

fn format_decl_left(decl: &ArgDecl) -> String {
    let mut names: Vec<String> = Vec::new();
    for s in decl.short_names() {
        names.push(format!("-{s}"));
    }
    for l in decl.long_names() {
        names.push(format!("--{l}"));
    }
    let mut out = names.join(", ");
    if decl.needs_value() {
        out.push_str(&format!(" <{}>", decl.value_name()));
    }
    out
}

fn format_decl_help(decl: &ArgDecl) -> String {
    let mut out = decl.help().trim().to_string();
    if decl.is_mandatory() {
        if out.is_empty() {
            out.push_str("required");
        } else {
            out.push_str(" (required)");
        }
    }
    out
}

/// Render subcommands (recursively, each level indented further) followed by
/// this level's declarations. Every line starts with `prefix`.
pub fn render_help(registry: &Registry, prefix: &str) -> String {
    let mut out = String::new();

    for (name, nested) in registry.subcommands() {
        if nested.summary().trim().is_empty() {
            out.push_str(&format!("{prefix}{name}\n"));
        } else {
            out.push_str(&format!("{prefix}{name}  {}\n", nested.summary().trim()));
        }
        out.push_str(&render_help(nested, &format!("{prefix}{NESTED_INDENT}")));
    }

    let rows: Vec<(String, String)> = registry
        .declarations()
        .iter()
        .map(|d| (format_decl_left(d), format_decl_help(d)))
        .collect();
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("{prefix}{left}\n"));
        } else {
            out.push_str(&format!("{prefix}{left:width$}  {help}\n"));
        }
    }

    out
}

/// Full help text: header, usage line, then [`render_help`] indented once.
pub fn help(registry: &Registry) -> String {
    let mut out = String::new();
    let name = registry.shape_name();
    if registry.summary().trim().is_empty() {
        out.push_str(name);
        out.push('\n');
    } else {
        out.push_str(&format!("{name} - {}\n", registry.summary().trim()));
    }

    let mut usage = format!("\nUsage: {name}");
    if !registry.declarations().is_empty() {
        usage.push_str(" [OPTIONS]");
    }
    if registry.subcommands().next().is_some() {
        usage.push_str(" [COMMAND]");
    }
    if let Some(field) = registry.plain_args_field() {
        usage.push_str(&format!(" [{}]...", field.to_ascii_uppercase()));
    }
    out.push_str(&usage);
    out.push('\n');

    let body = render_help(registry, "  ");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarg_metadata::{OptionSpec, ShapeSpec, ValueType};

    fn registry() -> Registry {
        let shape = ShapeSpec::new("tool")
            .summary("Example tool")
            .switch("verbose", "Be verbose")
            .switch("version", "Print version")
            .option(
                "size",
                OptionSpec::value(ValueType::Integer)
                    .short("s")
                    .value_name("1..100")
                    .help("size of your shoes")
                    .mandatory(),
            )
            .plain_args("files")
            .subcommand(
                "build",
                ShapeSpec::new("build")
                    .summary("Build things")
                    .option("target", OptionSpec::value(ValueType::Text))
                    .subcommand("deep", ShapeSpec::new("deep").switch("x-ray", "")),
            );
        Registry::build(&shape).unwrap()
    }

    #[test]
    fn lists_every_retained_name() {
        let text = render_help(&registry(), "");
        assert!(text.contains("-v, --verbose"));
        // default short name lost to `verbose`
        assert!(text.contains("--version"));
        assert!(!text.contains("-v, --version"));
        assert!(text.contains("-s, --size <1..100>"));
        assert!(text.contains("size of your shoes (required)"));
        assert!(text.contains("-t, --target <TARGET>"));
    }

    #[test]
    fn nests_subcommands_with_increasing_indent() {
        let text = render_help(&registry(), "");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "build  Build things");
        assert_eq!(lines[1], "    deep");
        assert!(lines[2].starts_with("        -x, --x-ray"));
        assert!(lines[3].starts_with("    -t, --target"));
        assert!(lines.iter().any(|l| l.starts_with("-v, --verbose")));
    }

    #[test]
    fn full_help_has_usage() {
        let text = help(&registry());
        assert!(text.starts_with("tool - Example tool\n"));
        assert!(text.contains("Usage: tool [OPTIONS] [COMMAND] [FILES]..."));
        assert!(text.contains("  build  Build things"));
    }
}
