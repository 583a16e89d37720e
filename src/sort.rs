//! Sort resolution against the whitelist of sortable columns.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses `asc`/`desc` (case-insensitive). Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sort a table ends up applying.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: Option<String>,
    pub direction: SortDirection,
}

/// Resolves the sort for one build.
///
/// Field precedence: requested field when it is one of `sortable_fields`, then the
/// default sort field, then the first sortable field, then no sort at all.
/// Direction precedence: a valid requested direction, then the default's declared
/// direction, then ascending.
pub fn resolve_sort(
    sortable_fields: &[&str],
    requested_field: Option<&str>,
    requested_direction: Option<&str>,
    default_sort: Option<(&str, SortDirection)>,
) -> Sort {
    let requested = requested_field
        .map(str::trim)
        .filter(|field| sortable_fields.contains(field));

    let field = requested
        .or(default_sort.map(|(field, _)| field))
        .or(sortable_fields.first().copied())
        .map(str::to_string);

    let direction = requested_direction
        .and_then(SortDirection::parse)
        .or(default_sort.map(|(_, direction)| direction))
        .unwrap_or_default();

    if let Some(asked) = requested_field {
        if requested.is_none() {
            log::debug!("Ignoring sort request on non-sortable field `{}`", asked);
        }
    }

    Sort { field, direction }
}
