//! Bind type inference and statement text checks.
//!
//! Every positional parameter gets a placeholder type chosen from the runtime
//! kind of its value. Composite values have no placeholder type; they are
//! rejected instead of being dropped from the argument list, which would shift
//! every following argument onto the wrong placeholder.

use rowkeep_domain::error::UnbindableParameterError;
use rowkeep_domain::value::Value;

/// Placeholder type of one bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    Int,
    Double,
    Text,
    /// No placeholder type exists for this kind.
    Skip,
}

impl BindType {
    /// Infer the placeholder type of `value`.
    ///
    /// Null, booleans and integers bind as integers, floats as doubles, text
    /// and date-times as text. Lists are skipped.
    #[must_use]
    pub const fn infer(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(_) | Value::Int(_) => Self::Int,
            Value::Float(_) => Self::Double,
            Value::Text(_) | Value::DateTime(_) => Self::Text,
            Value::List(_) => Self::Skip,
        }
    }

    /// Single-letter code used in type strings (`i`, `d`, `s`).
    #[must_use]
    pub const fn code(self) -> Option<char> {
        match self {
            Self::Int => Some('i'),
            Self::Double => Some('d'),
            Self::Text => Some('s'),
            Self::Skip => None,
        }
    }
}

/// A value paired with its inferred placeholder type.
#[derive(Debug, Clone, PartialEq)]
pub struct BindParameter {
    value: Value,
    bind_type: BindType,
}

impl BindParameter {
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Never [`BindType::Skip`]; such values are rejected by [`bind_parameters`].
    #[must_use]
    pub const fn bind_type(&self) -> BindType {
        self.bind_type
    }
}

/// Infer the bind type of every parameter.
///
/// # Errors
///
/// Returns [`UnbindableParameterError`] for the first parameter whose kind
/// maps to [`BindType::Skip`].
pub fn bind_parameters(params: &[Value]) -> Result<Vec<BindParameter>, UnbindableParameterError> {
    params
        .iter()
        .enumerate()
        .map(|(position, value)| match BindType::infer(value) {
            BindType::Skip => Err(UnbindableParameterError {
                position,
                kind: value.kind(),
            }),
            bind_type => Ok(BindParameter {
                value: value.clone(),
                bind_type,
            }),
        })
        .collect()
}

/// Concatenated type codes of `params`, e.g. `"isd"`.
#[must_use]
pub fn type_string(params: &[BindParameter]) -> String {
    params
        .iter()
        .filter_map(|param| param.bind_type.code())
        .collect()
}

#[derive(Clone, Copy)]
enum Scan {
    Code,
    Quoted(char),
    Escaped(char),
    LineComment,
    BlockComment,
}

/// Count `?` placeholders outside quoted literals, quoted identifiers and
/// comments (`-- `, `#` and `/* */`).
///
/// A line comment runs to the next newline, or to the end of a normalized
/// statement.
#[must_use]
pub fn count_placeholders(statement: &str) -> usize {
    let mut count = 0;
    let mut scan = Scan::Code;
    let mut chars = statement.chars().peekable();

    while let Some(ch) = chars.next() {
        scan = match scan {
            Scan::Code => match ch {
                '\'' | '"' | '`' => Scan::Quoted(ch),
                '#' => Scan::LineComment,
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    // MySQL needs whitespace after `--`.
                    if chars.peek().is_none_or(|next| next.is_whitespace()) {
                        Scan::LineComment
                    } else {
                        Scan::Code
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    Scan::BlockComment
                }
                '?' => {
                    count += 1;
                    Scan::Code
                }
                _ => Scan::Code,
            },
            Scan::Quoted(open) if ch == '\\' && open != '`' => Scan::Escaped(open),
            Scan::Quoted(open) if ch == open => Scan::Code,
            Scan::Escaped(open) | Scan::Quoted(open) => Scan::Quoted(open),
            Scan::LineComment if ch == '\n' => Scan::Code,
            Scan::BlockComment if ch == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                Scan::Code
            }
            other @ (Scan::LineComment | Scan::BlockComment) => other,
        };
    }

    count
}

/// Replace newlines, carriage returns and tabs with spaces and trim.
#[must_use]
pub fn normalize_statement(statement: &str) -> String {
    statement
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect::<String>()
        .trim()
        .to_string()
}
