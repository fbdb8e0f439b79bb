use anyhow::{Context, Result, bail};
use declarg::{ShapeDocumentV1, ShapeSpec};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SHAPE_FILE: &str = "declarg.json";

declarg::declare_shape!(sample_shape, {
    name: "greet",
    summary: "Print a greeting",
    fields: [
        { name: "loud", help: "Shout the greeting" },
        { name: "name", type: "text", mandatory: true, help: "Who to greet", value_name: "NAME" },
        { name: "times", type: "integer", short: ["t"], help: "Repeat count" },
        { name: "extra", kind: "plain-args" },
        { name: "config", kind: "subcommand", shape: sample_config_shape },
    ],
});

declarg::declare_shape!(sample_config_shape, {
    name: "config",
    summary: "Change greeting defaults",
    fields: [
        { name: "set", type: "list<text>", help: "KEY=VALUE pair to store", value_name: "PAIR" },
        { name: "reset", help: "Forget stored defaults" },
    ],
});

#[derive(Debug, Clone)]
pub struct LoadedShape {
    pub path: PathBuf,
    pub shape: ShapeSpec,
}

pub fn load_shape(shape_path: Option<&Path>) -> Result<LoadedShape> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let path = match shape_path {
        Some(p) => {
            let path = resolve_against(&cwd, p);
            if !path.exists() {
                bail!("shape document not found: {}", path.display());
            }
            path
        }
        None => {
            let path = cwd.join(DEFAULT_SHAPE_FILE);
            if !path.exists() {
                bail!(
                    "no {DEFAULT_SHAPE_FILE} in {} (pass --shape or run `declarg init`)",
                    cwd.display()
                );
            }
            path
        }
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read shape document: {}", path.display()))?;
    let doc = ShapeDocumentV1::from_json(&contents)
        .with_context(|| format!("failed to load shape document: {}", path.display()))?;

    tracing::debug!(path = %path.display(), shape = %doc.shape.name, "loaded shape document");
    Ok(LoadedShape {
        path,
        shape: doc.shape,
    })
}

pub fn write_default_document(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_SHAPE_FILE);
    if dest.exists() && !overwrite {
        bail!(
            "{DEFAULT_SHAPE_FILE} already exists in {} (use --force to overwrite)",
            project_dir.display()
        );
    }

    let mut out = ShapeDocumentV1::new(sample_shape())
        .to_json_pretty()
        .context("failed to serialize shape document")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarg::{FieldRole, Registry};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("declarg-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sample_shape_builds() {
        let shape = sample_shape();
        let registry = Registry::build(&shape).unwrap();
        assert_eq!(registry.shape_name(), "greet");
        assert_eq!(registry.plain_args_field(), Some("extra"));
        assert!(registry.subcommand("config").is_some());
        assert!(matches!(
            shape.get("config").map(|f| &f.role),
            Some(FieldRole::Subcommand { .. })
        ));
    }

    #[test]
    fn default_document_loads_back() {
        let dir = make_temp_dir("document-defaults");
        let dest = write_default_document(&dir, false).unwrap();
        assert_eq!(dest, dir.join(DEFAULT_SHAPE_FILE));

        let loaded = load_shape(Some(dest.as_path())).unwrap();
        assert_eq!(loaded.path, dest);
        assert_eq!(loaded.shape, sample_shape());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn existing_document_requires_overwrite() {
        let dir = make_temp_dir("document-overwrite");
        let dest = dir.join(DEFAULT_SHAPE_FILE);
        fs::write(&dest, "{}").unwrap();

        assert!(write_default_document(&dir, false).is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "{}");

        write_default_document(&dir, true).unwrap();
        let contents = fs::read_to_string(&dest).unwrap();
        assert!(ShapeDocumentV1::from_json(&contents).is_ok());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_missing_document_is_an_error() {
        let dir = make_temp_dir("document-missing");
        let err = load_shape(Some(dir.join("nope.json").as_path())).unwrap_err();
        assert!(err.to_string().contains("shape document not found"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unsupported_version_is_reported() {
        let dir = make_temp_dir("document-version");
        let dest = dir.join("shape.json");
        fs::write(
            &dest,
            r#"{ "format-version": 9, "shape": { "name": "x", "fields": [] } }"#,
        )
        .unwrap();
        let err = load_shape(Some(dest.as_path())).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported shape format-version 9"));
        let _ = fs::remove_dir_all(&dir);
    }
}
