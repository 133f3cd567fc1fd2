//! Bidirectional value transformers pluggable per column mapping
//!
//! A transformer is a pure function over a value and its sibling context —
//! the rest of the row or record the value came from. The same transformer
//! works in both directions: shaping query results and binding write
//! parameters.

pub mod convert;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::row::Row;
use crate::tree::Tree;
use crate::value::Value;

/// Sibling context available to a transformer alongside the value itself
///
/// Reads pass the full row, writes pass the record being persisted, and ad
/// hoc parameter transforms pass nothing. Transformers must tolerate an
/// empty or partial context.
#[derive(Debug, Clone, Copy, Default)]
pub enum Siblings<'a> {
    /// No context (ad hoc parameter transforms)
    #[default]
    Empty,
    /// The raw row the value was read from
    Row(&'a Row),
    /// The application record being persisted
    Record(&'a Tree),
}

impl Siblings<'_> {
    /// Look up a sibling value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Siblings::Empty => None,
            Siblings::Row(row) => row.get(key),
            Siblings::Record(tree) => tree.value(key),
        }
    }
}

/// Signature for user-supplied transformers
pub type TransformFn = fn(&Value, &Siblings) -> Value;

/// A named, reusable value transformer
///
/// All built-ins are side-effect free and absorb parse failures as
/// `Value::Null` (formatters yield an empty string); see
/// [`convert`] for the exact semantics of each.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Loose truthiness conversion
    ToBool,
    /// True iff non-null with a non-empty string form
    StrToBool,
    /// "Y"/"N" from loose truthiness
    ToYn,
    /// Integer parse, null on failure
    ToInt,
    /// Integer parse with a fallback default
    ToIntOrDefault(i64),
    /// Bare year promoted to the YYYYMMDD integer scale
    ToYearOrNull,
    /// Date rendering; `None` uses the default "%d %b %Y" format
    FormatDate(Option<String>),
    /// Decode 8-digit integers or canonical strings into a date
    ToDate,
    /// Encode a date as an 8-digit YYYYMMDD integer
    ToIntDate,
    /// Render only the 4-digit year
    DateToYear,
    /// Bare year into January 1 of that year
    YearToDate,
    /// Bare 4-character year into the 8-digit integer for January 1
    YearToIntDate,
    /// Lexical string form, empty string for null
    ToStrOrEmpty,
    /// User-supplied transformer
    Custom(TransformFn),
}

impl Transform {
    /// Apply this transformer to a value with its sibling context
    pub fn apply(&self, value: &Value, siblings: &Siblings) -> Value {
        match self {
            Transform::ToBool => Value::Bool(convert::to_bool(value)),
            Transform::StrToBool => Value::Bool(convert::str_to_bool(value)),
            Transform::ToYn => convert::to_yn(value),
            Transform::ToInt => convert::to_int(value),
            Transform::ToIntOrDefault(default) => convert::to_int_or_default(value, *default),
            Transform::ToYearOrNull => convert::to_year_or_null(value),
            Transform::FormatDate(format) => convert::format_date(
                value,
                format.as_deref().unwrap_or(convert::DEFAULT_DATE_FORMAT),
            ),
            Transform::ToDate => convert::to_date(value),
            Transform::ToIntDate => convert::to_int_date(value),
            Transform::DateToYear => convert::date_to_year(value),
            Transform::YearToDate => convert::year_to_date(value),
            Transform::YearToIntDate => convert::year_to_int_date(value),
            Transform::ToStrOrEmpty => convert::to_str_or_empty(value),
            Transform::Custom(f) => f(value, siblings),
        }
    }

    /// Look up a built-in transformer by registry name
    pub fn by_name(name: &str) -> Option<Transform> {
        REGISTRY.get(name).cloned()
    }
}

static REGISTRY: Lazy<HashMap<&'static str, Transform>> = Lazy::new(|| {
    HashMap::from([
        ("to_bool", Transform::ToBool),
        ("str_to_bool", Transform::StrToBool),
        ("to_yn", Transform::ToYn),
        ("to_int", Transform::ToInt),
        ("to_year_or_null", Transform::ToYearOrNull),
        ("format_date", Transform::FormatDate(None)),
        ("to_date", Transform::ToDate),
        ("to_int_date", Transform::ToIntDate),
        ("date_to_year", Transform::DateToYear),
        ("year_to_date", Transform::YearToDate),
        ("year_to_int_date", Transform::YearToIntDate),
        ("to_str_or_empty", Transform::ToStrOrEmpty),
    ])
});

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::ToBool => write!(f, "to_bool"),
            Transform::StrToBool => write!(f, "str_to_bool"),
            Transform::ToYn => write!(f, "to_yn"),
            Transform::ToInt => write!(f, "to_int"),
            Transform::ToIntOrDefault(d) => write!(f, "to_int_or_default({})", d),
            Transform::ToYearOrNull => write!(f, "to_year_or_null"),
            Transform::FormatDate(None) => write!(f, "format_date"),
            Transform::FormatDate(Some(fmt)) => write!(f, "format_date({})", fmt),
            Transform::ToDate => write!(f, "to_date"),
            Transform::ToIntDate => write!(f, "to_int_date"),
            Transform::DateToYear => write!(f, "date_to_year"),
            Transform::YearToDate => write!(f, "year_to_date"),
            Transform::YearToIntDate => write!(f, "year_to_int_date"),
            Transform::ToStrOrEmpty => write!(f, "to_str_or_empty"),
            Transform::Custom(_) => write!(f, "custom"),
        }
    }
}
