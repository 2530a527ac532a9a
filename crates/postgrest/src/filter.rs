//! Filter operators and the encoding of `[not.]operator.criteria` values

use std::fmt;

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than
    Gt,

    /// Greater than or equal to
    Gte,

    /// Less than
    Lt,

    /// Less than or equal to
    Lte,

    /// Like (case sensitive)
    Like,

    /// Like (case insensitive)
    ILike,

    /// Is (null, true, false, unknown)
    Is,

    /// In a list of values
    In,

    /// Full-text search using `to_tsquery`
    Fts,

    /// Full-text search using `plainto_tsquery`
    Plfts,

    /// Full-text search using `websearch_to_tsquery`
    Wfts,

    /// Contains
    Cs,

    /// Contained by
    Cd,

    /// Overlap
    Ov,

    /// Strictly left of
    Sl,

    /// Strictly right of
    Sr,

    /// Does not extend to the right of
    Nxl,

    /// Does not extend to the left of
    Nxr,

    /// Adjacent to
    Adj,
}

impl FilterOperator {
    /// Convert the operator to its wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::ILike => "ilike",
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
            FilterOperator::Fts => "fts",
            FilterOperator::Plfts => "plfts",
            FilterOperator::Wfts => "wfts",
            FilterOperator::Cs => "cs",
            FilterOperator::Cd => "cd",
            FilterOperator::Ov => "ov",
            FilterOperator::Sl => "sl",
            FilterOperator::Sr => "sr",
            FilterOperator::Nxl => "nxl",
            FilterOperator::Nxr => "nxr",
            FilterOperator::Adj => "adj",
        }
    }

    /// Every operator, in declaration order.
    pub const ALL: [FilterOperator; 21] = [
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Like,
        FilterOperator::ILike,
        FilterOperator::Is,
        FilterOperator::In,
        FilterOperator::Fts,
        FilterOperator::Plfts,
        FilterOperator::Wfts,
        FilterOperator::Cs,
        FilterOperator::Cd,
        FilterOperator::Ov,
        FilterOperator::Sl,
        FilterOperator::Sr,
        FilterOperator::Nxl,
        FilterOperator::Nxr,
        FilterOperator::Adj,
    ];
}

impl AsRef<str> for FilterOperator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the `(key, value)` query pair for one filter.
///
/// `negate` prefixes the operator with `not.`. Column and criteria are not
/// escaped here; PostgREST reports malformed input.
pub fn encode(column: &str, operator: &str, criteria: &str, negate: bool) -> (String, String) {
    let value = if negate {
        format!("not.{}.{}", operator, criteria)
    } else {
        format!("{}.{}", operator, criteria)
    };
    (column.to_string(), value)
}

/// `(a,b,c)` as used by `in`.
pub fn list<T: ToString>(values: &[T]) -> String {
    format!("({})", join(values))
}

/// `{a,b,c}` as used by the array/set operators.
pub fn set<T: ToString>(values: &[T]) -> String {
    format!("{{{}}}", join(values))
}

/// `(from,to)` as used by the range operators.
pub fn range(from: i64, to: i64) -> String {
    format!("({},{})", from, to)
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
