//! # Configuration Validation
//!
//! Validation for the configuration structures using the `validator` crate,
//! flattened into messages a terminal user can act on.

use crate::config::Config;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate configuration structure.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, validate};
///
/// let config = Config::default();
/// match validate(&config) {
///     Ok(()) => println!("Configuration is valid"),
///     Err(problems) => println!("Validation errors: {:?}", problems),
/// }
/// ```
///
/// ## Validation Rules
/// - `mode`: must be "direct" or "published"
/// - `memoryFilePath`, `completedFilePath`, `summaryFilePath`, `rulesDir`,
///   `history.dir`: non-empty, workspace-relative, no `..` segments
/// - `observability.loggingLevel`: must be "trace", "debug", "info", "warn",
///   or "error"
///
/// `history.maxEntries` is never rejected; out-of-range values fall back to
/// the default retention.
pub fn validate(config: &Config) -> Result<(), Vec<String>> {
    config.validate().map_err(|errors| describe(&errors))
}

/// One `key: message` line per failed field, nested keys in camelCase dotted
/// form, sorted for stable output.
pub fn describe(errors: &ValidationErrors) -> Vec<String> {
    let mut lines = Vec::new();
    collect(errors, "", &mut lines);
    lines.sort();
    lines
}

fn collect(errors: &ValidationErrors, prefix: &str, lines: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            to_camel_case(field)
        } else {
            format!("{prefix}.{}", to_camel_case(field))
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    lines.push(format!("{key}: {}", error.code));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &key, lines),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{key}[{index}]"), lines);
                }
            }
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
