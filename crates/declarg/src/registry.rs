use indexmap::IndexMap;

use declarg_metadata::{FieldRole, ShapeSpec};

use crate::decl::ArgDecl;
use crate::error::{ConfigError, ParseResult};
use crate::target::Target;

/// Immutable lookup tables for one shape.
///
/// Built once per shape and shared across parses; see
/// [`RegistryCache`](crate::RegistryCache) for memoization.
#[derive(Debug, Clone)]
pub struct Registry {
    shape_name: String,
    summary: String,
    declarations: Vec<ArgDecl>,
    short_names: IndexMap<String, usize>,
    long_names: IndexMap<String, usize>,
    subcommands: IndexMap<String, Registry>,
    plain_args: Option<String>,
    downgraded: Vec<String>,
}

impl Registry {
    /// Build the registry for `shape`, failing on author mistakes.
    pub fn build(shape: &ShapeSpec) -> Result<Self, ConfigError> {
        let mut registry = Self {
            shape_name: shape.name.clone(),
            summary: shape.summary.clone(),
            declarations: Vec::new(),
            short_names: IndexMap::new(),
            long_names: IndexMap::new(),
            subcommands: IndexMap::new(),
            plain_args: None,
            downgraded: Vec::new(),
        };

        for field in &shape.fields {
            match &field.role {
                FieldRole::Ignored | FieldRole::Synthetic => continue,
                FieldRole::Subcommand { shape: nested } => {
                    let nested = Self::build(nested)?;
                    if registry.subcommands.contains_key(&field.name) {
                        return Err(ConfigError::DuplicateSubcommand {
                            name: field.name.clone(),
                        });
                    }
                    registry.subcommands.insert(field.name.clone(), nested);
                }
                FieldRole::PlainArgs { value_type } => {
                    if let Some(first) = &registry.plain_args {
                        return Err(ConfigError::DuplicatePlainArgs {
                            first: first.clone(),
                            second: field.name.clone(),
                        });
                    }
                    if !value_type.is_text_list() {
                        return Err(ConfigError::PlainArgsType {
                            field: field.name.clone(),
                            found: value_type.to_string(),
                        });
                    }
                    registry.plain_args = Some(field.name.clone());
                }
                FieldRole::Option(spec) => {
                    let decl = ArgDecl::from_option(&field.name, spec)?;
                    registry.register(decl)?;
                }
            }
        }

        tracing::debug!(
            shape = %registry.shape_name,
            declarations = registry.declarations.len(),
            subcommands = registry.subcommands.len(),
            "built argument registry"
        );

        Ok(registry)
    }

    fn register(&mut self, mut decl: ArgDecl) -> Result<(), ConfigError> {
        let idx = self.declarations.len();

        if decl.has_default_short_name() {
            // A derived short name loses silently to an earlier claim.
            let taken = decl
                .short_names()
                .first()
                .is_some_and(|s| self.short_names.contains_key(s));
            if taken {
                tracing::debug!(
                    shape = %self.shape_name,
                    field = decl.field(),
                    "default short name already taken; field is long-only"
                );
                decl.clear_short_names();
                self.downgraded.push(decl.field().to_string());
            }
        } else {
            for name in decl.short_names() {
                if let Some(&prev) = self.short_names.get(name) {
                    return Err(ConfigError::ShortNameCollision {
                        field: decl.field().to_string(),
                        contender: self.declarations[prev].field().to_string(),
                        name: name.clone(),
                    });
                }
            }
        }

        for name in decl.long_names() {
            if let Some(&prev) = self.long_names.get(name) {
                return Err(ConfigError::LongNameCollision {
                    field: decl.field().to_string(),
                    contender: self.declarations[prev].field().to_string(),
                    name: name.clone(),
                });
            }
        }

        for name in decl.short_names() {
            self.short_names.insert(name.clone(), idx);
        }
        for name in decl.long_names() {
            self.long_names.insert(name.clone(), idx);
        }
        self.declarations.push(decl);
        Ok(())
    }

    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Declarations in shape order.
    pub fn declarations(&self) -> &[ArgDecl] {
        &self.declarations
    }

    pub fn by_short(&self, name: &str) -> Option<&ArgDecl> {
        self.short_names
            .get(name)
            .map(|&idx| &self.declarations[idx])
    }

    pub fn by_long(&self, name: &str) -> Option<&ArgDecl> {
        self.long_names
            .get(name)
            .map(|&idx| &self.declarations[idx])
    }

    pub(crate) fn short_index(&self, name: &str) -> Option<usize> {
        self.short_names.get(name).copied()
    }

    pub(crate) fn long_index(&self, name: &str) -> Option<usize> {
        self.long_names.get(name).copied()
    }

    pub fn subcommand(&self, name: &str) -> Option<&Registry> {
        self.subcommands.get(name)
    }

    pub fn subcommands(&self) -> impl Iterator<Item = (&str, &Registry)> {
        self.subcommands.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field collecting plain arguments, if the shape declares one.
    pub fn plain_args_field(&self) -> Option<&str> {
        self.plain_args.as_deref()
    }

    /// Fields whose default short name was dropped because it was taken.
    pub fn downgraded_fields(&self) -> &[String] {
        &self.downgraded
    }

    /// Parse `args[offset..]` into `target`. See [`crate::engine::parse`].
    pub fn parse<S: AsRef<str>>(
        &self,
        args: &[S],
        offset: usize,
        target: &mut dyn Target,
    ) -> ParseResult<()> {
        crate::engine::parse(self, args, offset, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarg_metadata::{OptionSpec, ValueType};

    #[test]
    fn every_name_resolves_to_its_declaration() {
        let shape = ShapeSpec::new("tool")
            .switch("verbose", "Be verbose")
            .option(
                "output",
                OptionSpec::value(ValueType::Text)
                    .short("o")
                    .long("output")
                    .long("out"),
            )
            .option("size", OptionSpec::value(ValueType::Integer).mandatory())
            .plain_args("files");
        let reg = Registry::build(&shape).unwrap();

        assert_eq!(reg.declarations().len(), 3);
        assert_eq!(reg.by_short("v").unwrap().field(), "verbose");
        assert_eq!(reg.by_long("verbose").unwrap().field(), "verbose");
        assert_eq!(reg.by_short("o").unwrap().field(), "output");
        assert_eq!(reg.by_long("out").unwrap().field(), "output");
        assert_eq!(reg.by_short("s").unwrap().field(), "size");
        assert_eq!(reg.plain_args_field(), Some("files"));
        assert!(reg.downgraded_fields().is_empty());
    }

    #[test]
    fn explicit_short_collision_is_fatal() {
        let shape = ShapeSpec::new("tool")
            .option("verbose", OptionSpec::switch().short("v"))
            .option("version", OptionSpec::switch().short("v"));
        let err = Registry::build(&shape).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ShortNameCollision {
                field: "version".to_string(),
                contender: "verbose".to_string(),
                name: "v".to_string(),
            }
        );
    }

    #[test]
    fn explicit_short_colliding_with_a_default_is_fatal() {
        let shape = ShapeSpec::new("tool")
            .switch("verbose", "")
            .option("version", OptionSpec::switch().short("v"));
        assert!(matches!(
            Registry::build(&shape),
            Err(ConfigError::ShortNameCollision { .. })
        ));
    }

    #[test]
    fn default_short_collision_downgrades_silently() {
        let shape = ShapeSpec::new("tool")
            .switch("verbose", "")
            .switch("version", "");
        let reg = Registry::build(&shape).unwrap();

        assert_eq!(reg.by_short("v").unwrap().field(), "verbose");
        let version = reg.by_long("version").unwrap();
        assert!(version.short_names().is_empty());
        assert_eq!(reg.downgraded_fields(), ["version".to_string()]);
    }

    #[test]
    fn long_collision_is_fatal() {
        let shape = ShapeSpec::new("tool")
            .option("quiet", OptionSpec::switch().long("silent"))
            .switch("silent", "");
        match Registry::build(&shape).unwrap_err() {
            ConfigError::LongNameCollision {
                field,
                contender,
                name,
            } => {
                assert_eq!(field, "silent");
                assert_eq!(contender, "quiet");
                assert_eq!(name, "silent");
            }
            other => panic!("expected LongNameCollision, got: {other:?}"),
        }
    }

    #[test]
    fn plain_args_rules() {
        let twice = ShapeSpec::new("tool").plain_args("a").plain_args("b");
        assert_eq!(
            Registry::build(&twice).unwrap_err(),
            ConfigError::DuplicatePlainArgs {
                first: "a".to_string(),
                second: "b".to_string(),
            }
        );

        let wrong_type = ShapeSpec::new("tool").field(
            "nums",
            FieldRole::PlainArgs {
                value_type: ValueType::List(Box::new(ValueType::Integer)),
            },
        );
        assert!(matches!(
            Registry::build(&wrong_type),
            Err(ConfigError::PlainArgsType { .. })
        ));
    }

    #[test]
    fn ignored_and_synthetic_fields_are_skipped() {
        let shape = ShapeSpec::new("tool")
            .ignored("cache")
            .synthetic("this$0")
            .switch("color", "");
        let reg = Registry::build(&shape).unwrap();
        assert_eq!(reg.declarations().len(), 1);
        assert!(reg.by_long("cache").is_none());
        assert_eq!(reg.by_short("c").unwrap().field(), "color");
    }

    #[test]
    fn subcommands_are_built_recursively() {
        let shape = ShapeSpec::new("tool").switch("verbose", "").subcommand(
            "build",
            ShapeSpec::new("build").option("target", OptionSpec::value(ValueType::Text)),
        );
        let reg = Registry::build(&shape).unwrap();
        let build = reg.subcommand("build").unwrap();
        assert_eq!(build.shape_name(), "build");
        assert!(build.by_long("target").is_some());
        assert!(reg.by_long("target").is_none());
    }

    #[test]
    fn nested_configuration_errors_abort_the_parent() {
        let shape = ShapeSpec::new("tool").subcommand(
            "build",
            ShapeSpec::new("build").plain_args("a").plain_args("b"),
        );
        assert!(matches!(
            Registry::build(&shape),
            Err(ConfigError::DuplicatePlainArgs { .. })
        ));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
