//! Watermark lookup: the highest value already present in a destination.
//!
//! Typically called from a `start` hook so that an incremental run resumes
//! where the previous one left off.

use crate::core::{BoundaryValue, Value};
use crate::errors::{ConfigurationError, EtlResult};
use crate::pipeline::Pipeline;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Column the aggregate is returned under.
pub const RESULT_COLUMN: &str = "the_max";

static DATE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}( \d{2}:\d{2}:\d{2}( ((-|\+)\d+)| UTC)?)?$")
        .expect("date pattern compiles")
});

/// Returns true if a literal reads as a date or timestamp.
#[must_use]
pub fn looks_like_date(literal: &str) -> bool {
    DATE_LIKE.is_match(literal)
}

/// Floor used when a column has no rows yet, chosen by naming convention.
///
/// `*_at` and `*_date` columns floor at the epoch date; `id` and `*_id`
/// columns floor at zero.
///
/// # Errors
///
/// Any other column name has no conventional floor.
pub fn default_floor_for(column: &str) -> Result<BoundaryValue, ConfigurationError> {
    if column.ends_with("_at") || column.ends_with("_date") {
        // NaiveDate's default is the epoch.
        return Ok(BoundaryValue::Date(NaiveDate::default()));
    }
    if column == "id" || column.ends_with("_id") {
        return Ok(BoundaryValue::Integer(0));
    }
    Err(ConfigurationError::no_floor(column))
}

/// Builder for a "maximum of column, or a floor when empty" query.
///
/// ```rust,ignore
/// etl.start(|etl| etl.max_for(&MaxFor::new("daily_totals", "the_date").database("reports")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxFor {
    database: Option<String>,
    table: String,
    column: String,
    default_floor: Option<BoundaryValue>,
    conditions: Option<String>,
}

impl MaxFor {
    /// Creates a lookup for `table.column`.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            database: None,
            table: table.into(),
            column: column.into(),
            default_floor: None,
            conditions: None,
        }
    }

    /// Qualifies the table with a database name.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the floor explicitly instead of deriving it from the column name.
    #[must_use]
    pub fn default_floor(mut self, floor: impl Into<BoundaryValue>) -> Self {
        self.default_floor = Some(floor.into());
        self
    }

    /// Restricts the rows considered, e.g. `"region = 'eu'"`.
    #[must_use]
    pub fn conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// The floor in effect.
    pub fn floor(&self) -> Result<BoundaryValue, ConfigurationError> {
        match &self.default_floor {
            Some(floor) => Ok(floor.clone()),
            None => default_floor_for(&self.column),
        }
    }

    /// Builds the query text.
    ///
    /// A date-like floor is cast with `DATE(..)` and so is the whole
    /// aggregate, so an empty table still yields a date rather than text.
    pub fn to_payload(&self) -> Result<String, ConfigurationError> {
        let floor = self.floor()?.render();
        let max = format!("MAX({}.{})", self.table, self.column);

        let expr = if looks_like_date(&floor) {
            format!("DATE(IFNULL({max}, DATE('{floor}')))")
        } else {
            format!("IFNULL({max}, {floor})")
        };

        let relation = match &self.database {
            Some(database) => format!("{database}.{}", self.table),
            None => self.table.clone(),
        };

        let mut payload = format!("SELECT {expr} AS {RESULT_COLUMN} FROM {relation}");
        if let Some(conditions) = &self.conditions {
            payload.push_str(" WHERE ");
            payload.push_str(conditions);
        }
        Ok(payload)
    }
}

impl Pipeline {
    /// Runs a [`MaxFor`] lookup through [`Pipeline::query`].
    ///
    /// Returns the `the_max` column of the first row, or [`Value::Null`]
    /// when the store returns no rows.
    pub fn max_for(&self, lookup: &MaxFor) -> EtlResult<Value> {
        let payload = lookup.to_payload()?;
        Ok(self.query(&payload)?.scalar(RESULT_COLUMN))
    }
}
