use declarg_metadata::ShapeSpec;

use crate::error::ParseResult;
use crate::value::Value;

/// A record the parse engine writes into.
///
/// Implemented by hand for typed structs, or by [`Record`](crate::Record)
/// for shapes only known at runtime.
pub trait Target {
    /// Name of the shape this record was built for. Must equal
    /// [`ShapeSpec::name`] of the registry it is parsed against.
    fn shape_name(&self) -> &str;

    /// Store a converted value in `field`.
    ///
    /// Single-valued fields overwrite (last occurrence wins); list fields
    /// append.
    fn set(&mut self, field: &str, value: Value) -> ParseResult<()>;

    /// The record's plain-args collection, if its shape declares one.
    fn plain_args(&mut self) -> Option<&mut Vec<String>> {
        None
    }

    /// Put a fresh instance of the subcommand shape into slot `field` and
    /// return it. `None` means the record has no such slot.
    fn enter_subcommand(&mut self, field: &str) -> Option<&mut dyn Target> {
        let _ = field;
        None
    }
}

/// A typed record that can describe its own shape.
pub trait Shape: Target + 'static {
    fn shape() -> ShapeSpec;
}
