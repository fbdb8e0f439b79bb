//! Declaration registry and token-dispatch engine for declarative
//! command-line shapes.
//!
//! A shape ([`ShapeSpec`]) declares which fields of a record are options,
//! which one collects plain arguments and which ones are subcommands.
//! [`Registry::build`] turns it into immutable lookup tables once; the
//! engine then fills any [`Target`] from an already-split token sequence.
//!
//! ```
//! use declarg::{OptionSpec, Record, Registry, ShapeSpec, Value, ValueType};
//!
//! let shape = ShapeSpec::new("tool")
//!     .switch("verbose", "Be verbose")
//!     .option("output", OptionSpec::value(ValueType::Text).short("o"))
//!     .plain_args("files");
//! let registry = Registry::build(&shape).unwrap();
//!
//! let mut record = Record::new(shape);
//! registry
//!     .parse(&["-v", "-o", "out.txt", "in.txt"], 0, &mut record)
//!     .unwrap();
//! assert_eq!(record.get("verbose"), Some(&Value::Bool(true)));
//! assert_eq!(record.get("output"), Some(&Value::Text("out.txt".into())));
//! assert_eq!(record.plain_values(), ["in.txt".to_string()]);
//! ```
//!
//! Default short names are the first character of the field name. When two
//! derived short names collide, the later field silently becomes long-only
//! (see [`Registry::downgraded_fields`]). Explicit names never downgrade;
//! their collisions are [`ConfigError`]s.
//!
//! Shapes can also be declared with [`declare_shape!`]. Keys that do not fit
//! the field's kind are rejected at compile time:
//!
//! ```compile_fail
//! declarg::declare_shape!(cache_shape, {
//!     name: "cache",
//!     fields: [ { name: "dir", kind: "ignored", type: "text" } ],
//! });
//! ```
//!
//! ```compile_fail
//! declarg::declare_shape!(tool_shape, {
//!     name: "tool",
//!     fields: [ { name: "files", kind: "plain-args", help: "Inputs" } ],
//! });
//! ```
//!
//! ```
//! declarg::declare_shape!(tool_shape, {
//!     name: "tool",
//!     fields: [
//!         { name: "verbose", help: "Be verbose" },
//!         { name: "files", kind: "plain-args", type: "list<text>" },
//!     ],
//! });
//! assert_eq!(tool_shape().fields.len(), 2);
//! ```

pub mod cache;
pub mod decl;
pub mod engine;
pub mod error;
pub mod help;
pub mod record;
pub mod registry;
pub mod target;
pub mod value;

pub use cache::RegistryCache;
pub use decl::ArgDecl;
pub use error::{ConfigError, Error, ParseError, ParseErrorKind, ParseResult};
pub use help::{help, render_help};
pub use record::Record;
pub use registry::Registry;
pub use target::{Shape, Target};
pub use value::Value;

pub use declarg_macros::declare_shape;
pub use declarg_metadata::{
    FieldRole, FieldSpec, OptionSpec, ShapeDocumentV1, ShapeSpec, ValueType,
};

/// Shape model, re-exported for `declare_shape!` expansions.
pub mod metadata {
    pub use declarg_metadata::*;
}

/// Build the registry for `T` and parse `args[offset..]` into `target`.
///
/// `target` is mutated in place and is unreliable after an error.
pub fn parse_args<T: Shape, S: AsRef<str>>(
    args: &[S],
    target: &mut T,
    offset: usize,
) -> Result<(), Error> {
    let registry = Registry::build(&T::shape())?;
    registry.parse(args, offset, target)?;
    Ok(())
}

/// Parse process-style `args` (the first one is the program name) into a
/// fresh `T`. Nothing is returned on failure.
pub fn parse_from<T: Shape + Default, S: AsRef<str>>(args: &[S]) -> Result<T, Error> {
    let mut target = T::default();
    parse_args(args, &mut target, 1)?;
    Ok(target)
}

/// Help text for `T`.
pub fn help_for<T: Shape>() -> Result<String, ConfigError> {
    Ok(help(&Registry::build(&T::shape())?))
}
