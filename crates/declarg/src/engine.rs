//! Left-to-right token dispatch.
//!
//! Each token is classified exactly once, in this order:
//! - `---...`: malformed, the parse fails
//! - `--`: every remaining token is a plain argument
//! - `--name` / `--name=value`: long option
//! - `-name`: short option; a value-taking option consumes the next token
//! - a subcommand name: the rest of the tokens belong to the subcommand
//! - anything else: plain argument
//!
//! Short options are never clustered: `-abc` names the short option `abc`.

use crate::error::{ParseError, ParseResult};
use crate::registry::Registry;
use crate::target::Target;

/// Parse `args[offset..]` into `target` according to `registry`.
///
/// Mutates `target` in place. On error, fields applied before the failing
/// token stay applied.
pub fn parse<S: AsRef<str>>(
    registry: &Registry,
    args: &[S],
    offset: usize,
    target: &mut dyn Target,
) -> ParseResult<()> {
    if target.shape_name() != registry.shape_name() {
        return Err(ParseError::TargetMismatch(format!(
            "cannot fill record of shape '{}' (expected '{}')",
            target.shape_name(),
            registry.shape_name()
        )));
    }

    let has_sink = match registry.plain_args_field() {
        Some(field) => {
            if target.plain_args().is_none() {
                return Err(ParseError::TargetMismatch(format!(
                    "plain-args collection '{field}' is not available on '{}'",
                    registry.shape_name()
                )));
            }
            true
        }
        None => false,
    };

    let mut applied = vec![false; registry.declarations().len()];

    let mut idx = offset;
    while idx < args.len() {
        let arg = args[idx].as_ref();

        if arg.starts_with("---") {
            return Err(ParseError::Malformed {
                token: arg.to_string(),
            });
        }

        if arg == "--" {
            for rest in &args[idx + 1..] {
                push_plain(target, has_sink, rest.as_ref());
            }
            break;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            let flag = format!("--{name}");
            let Some(decl_idx) = registry.long_index(name) else {
                return Err(ParseError::Unrecognized { flag });
            };
            tracing::trace!(flag = %flag, "long option");
            registry.declarations()[decl_idx].apply(target, &flag, value)?;
            applied[decl_idx] = true;
            idx += 1;
            continue;
        }

        if arg.len() > 1 {
            if let Some(name) = arg.strip_prefix('-') {
                let flag = arg.to_string();
                let Some(decl_idx) = registry.short_index(name) else {
                    return Err(ParseError::Unrecognized { flag });
                };
                let decl = &registry.declarations()[decl_idx];
                let value = if decl.needs_value() {
                    idx += 1;
                    let Some(value) = args.get(idx) else {
                        return Err(ParseError::MissingValue { flag });
                    };
                    Some(value.as_ref())
                } else {
                    None
                };
                tracing::trace!(flag = %flag, "short option");
                decl.apply(target, &flag, value)?;
                applied[decl_idx] = true;
                idx += 1;
                continue;
            }
        }

        if let Some(nested) = registry.subcommand(arg) {
            tracing::debug!(
                shape = %registry.shape_name(),
                subcommand = arg,
                offset = idx + 1,
                "handing remaining tokens to subcommand"
            );
            let Some(sub_target) = target.enter_subcommand(arg) else {
                return Err(ParseError::TargetMismatch(format!(
                    "'{}' has no slot for subcommand '{arg}'",
                    registry.shape_name()
                )));
            };
            // The subcommand owns the rest of the tokens and runs its own
            // mandatory check; this level's check does not apply.
            return parse(nested, args, idx + 1, sub_target);
        }

        tracing::trace!(arg, "plain argument");
        push_plain(target, has_sink, arg);
        idx += 1;
    }

    for (decl, &seen) in registry.declarations().iter().zip(&applied) {
        if decl.is_mandatory() && !seen {
            return Err(ParseError::MandatoryMissing {
                field: decl.field().to_string(),
                flag: decl.display_flag(),
            });
        }
    }

    Ok(())
}

// Without a declared sink, plain arguments are collected nowhere.
fn push_plain(target: &mut dyn Target, has_sink: bool, arg: &str) {
    if !has_sink {
        return;
    }
    if let Some(sink) = target.plain_args() {
        sink.push(arg.to_string());
    }
}
