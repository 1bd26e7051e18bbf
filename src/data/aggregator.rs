//! Aggregation Engine Module
//! Turns the unified table and a filter selection into the three view tables
//! behind the map, trend and category charts.

use crate::data::{CrimeType, UnifiedTable, STATE_COLUMN, YEAR_COLUMN};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const ALL_STATES: &str = "All";

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Crime type '{crime}' has no '{column}' column in the loaded data")]
    UnknownCrimeColumn {
        crime: CrimeType,
        column: &'static str,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// State part of a filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum StateFilter {
    #[default]
    All,
    Named(String),
}

impl StateFilter {
    /// `"All"` (any case) selects every state; anything else names one.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case(ALL_STATES) || name.is_empty() {
            StateFilter::All
        } else {
            StateFilter::Named(name.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StateFilter::All => ALL_STATES,
            StateFilter::Named(name) => name,
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<StateFilter> for String {
    fn from(value: StateFilter) -> Self {
        value.label().to_string()
    }
}

/// One dashboard query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub year: i32,
    pub state: StateFilter,
    pub crime_type: CrimeType,
}

impl FilterSelection {
    pub fn new(year: i32, state: StateFilter, crime_type: CrimeType) -> Self {
        Self {
            year,
            state,
            crime_type,
        }
    }

    /// All states in the most recent year of the table.
    pub fn latest(table: &UnifiedTable, crime_type: CrimeType) -> Option<Self> {
        let (_, last_year) = table.year_range()?;
        Some(Self::new(last_year, StateFilter::All, crime_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTotal {
    pub state: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    #[serde(rename = "category")]
    pub crime_type: CrimeType,
    pub count: i64,
}

impl CategoryTotal {
    pub fn label(&self) -> &'static str {
        self.crime_type.label()
    }
}

/// The three tables for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AggregationResult {
    /// Selected year and state, sorted by state.
    pub state_totals: Vec<StateTotal>,
    /// Whole table, sorted by year.
    pub year_totals: Vec<YearTotal>,
    /// Whole table, in [`CrimeType::ALL`] order.
    pub category_totals: Vec<CategoryTotal>,
}

impl AggregationResult {
    pub fn state_total(&self, state: &str) -> Option<i64> {
        self.state_totals
            .iter()
            .find(|t| t.state == state)
            .map(|t| t.count)
    }

    pub fn state_sum(&self) -> i64 {
        self.state_totals.iter().map(|t| t.count).sum()
    }
}

/// Per-table outcome of one selection. A missing column in one table
/// leaves the other two usable.
#[derive(Debug)]
pub struct ViewTables {
    pub state_totals: Result<Vec<StateTotal>, AggregationError>,
    pub year_totals: Result<Vec<YearTotal>, AggregationError>,
    pub category_totals: Result<Vec<CategoryTotal>, AggregationError>,
}

impl ViewTables {
    /// All three tables, or the first error in map, trend, category order.
    pub fn into_result(self) -> Result<AggregationResult, AggregationError> {
        Ok(AggregationResult {
            state_totals: self.state_totals?,
            year_totals: self.year_totals?,
            category_totals: self.category_totals?,
        })
    }

    /// Whatever succeeded, with failed tables left empty, plus the errors.
    pub fn into_partial(self) -> (AggregationResult, Vec<AggregationError>) {
        let mut errors = Vec::new();
        let result = AggregationResult {
            state_totals: or_empty(self.state_totals, &mut errors),
            year_totals: or_empty(self.year_totals, &mut errors),
            category_totals: or_empty(self.category_totals, &mut errors),
        };
        (result, errors)
    }
}

fn or_empty<T>(
    table: Result<Vec<T>, AggregationError>,
    errors: &mut Vec<AggregationError>,
) -> Vec<T> {
    table.unwrap_or_else(|e| {
        errors.push(e);
        Vec::new()
    })
}

/// Stateless aggregation over a [`UnifiedTable`].
pub struct Aggregator;

impl Aggregator {
    /// Compute all three tables, failing if any one of them fails.
    pub fn aggregate(
        table: &UnifiedTable,
        selection: &FilterSelection,
    ) -> Result<AggregationResult, AggregationError> {
        Self::compute(table, selection).into_result()
    }

    /// Compute the three tables independently. They share only read access
    /// to the table, so they run in parallel.
    pub fn compute(table: &UnifiedTable, selection: &FilterSelection) -> ViewTables {
        log::debug!(
            "Aggregating {} for {} / {}",
            selection.crime_type,
            selection.year,
            selection.state
        );

        let (state_totals, (year_totals, category_totals)) = rayon::join(
            || Self::state_totals(table, selection),
            || {
                rayon::join(
                    || Self::year_totals(table, selection.crime_type),
                    || Self::category_totals(table),
                )
            },
        );

        ViewTables {
            state_totals,
            year_totals,
            category_totals,
        }
    }

    /// Per-state totals for the selected crime type, year and state.
    ///
    /// A selection matching no rows yields an empty table.
    pub fn state_totals(
        table: &UnifiedTable,
        selection: &FilterSelection,
    ) -> Result<Vec<StateTotal>, AggregationError> {
        let column = Self::crime_column(table, selection.crime_type)?;

        let mut predicate = col(YEAR_COLUMN).eq(lit(selection.year));
        if let StateFilter::Named(state) = &selection.state {
            predicate = predicate.and(col(STATE_COLUMN).eq(lit(state.as_str())));
        }

        let grouped = table
            .dataframe()
            .clone()
            .lazy()
            .filter(predicate)
            .group_by([col(STATE_COLUMN)])
            .agg([col(column).sum()])
            .collect()?;

        let states = grouped.column(STATE_COLUMN)?.str()?;
        let counts = grouped.column(column)?.i64()?;

        let mut totals: Vec<StateTotal> = states
            .into_iter()
            .zip(counts)
            .filter_map(|(state, count)| {
                Some(StateTotal {
                    state: state?.to_string(),
                    count: count.unwrap_or(0),
                })
            })
            .collect();
        totals.sort_by(|a, b| a.state.cmp(&b.state));

        Ok(totals)
    }

    /// Per-year totals for one crime type over every state and year.
    pub fn year_totals(
        table: &UnifiedTable,
        crime_type: CrimeType,
    ) -> Result<Vec<YearTotal>, AggregationError> {
        let column = Self::crime_column(table, crime_type)?;

        let grouped = table
            .dataframe()
            .clone()
            .lazy()
            .group_by([col(YEAR_COLUMN)])
            .agg([col(column).sum()])
            .collect()?;

        let years = grouped.column(YEAR_COLUMN)?.i32()?;
        let counts = grouped.column(column)?.i64()?;

        let mut totals: Vec<YearTotal> = years
            .into_iter()
            .zip(counts)
            .filter_map(|(year, count)| {
                Some(YearTotal {
                    year: year?,
                    count: count.unwrap_or(0),
                })
            })
            .collect();
        totals.sort_by_key(|t| t.year);

        Ok(totals)
    }

    /// Totals of every crime category over the whole table.
    pub fn category_totals(table: &UnifiedTable) -> Result<Vec<CategoryTotal>, AggregationError> {
        CrimeType::ALL
            .into_iter()
            .map(|crime_type| {
                let column = Self::crime_column(table, crime_type)?;
                let count = table.dataframe().column(column)?.i64()?.sum().unwrap_or(0);
                Ok(CategoryTotal { crime_type, count })
            })
            .collect()
    }

    fn crime_column(
        table: &UnifiedTable,
        crime_type: CrimeType,
    ) -> Result<&'static str, AggregationError> {
        let column = crime_type.column();
        if table.has_column(column) {
            Ok(column)
        } else {
            Err(AggregationError::UnknownCrimeColumn {
                crime: crime_type,
                column,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DISTRICT_COLUMN;

    fn all_crimes(
        states: &[&str],
        districts: &[&str],
        years: &[i32],
        murders: &[i64],
    ) -> anyhow::Result<UnifiedTable> {
        let mut columns = vec![
            Column::new(STATE_COLUMN.into(), states),
            Column::new(DISTRICT_COLUMN.into(), districts),
            Column::new(YEAR_COLUMN.into(), years),
        ];
        for (i, crime) in CrimeType::ALL.into_iter().enumerate() {
            let counts: Vec<i64> = if crime == CrimeType::Murder {
                murders.to_vec()
            } else {
                murders.iter().map(|m| m * (i as i64 + 1)).collect()
            };
            columns.push(Column::new(crime.column().into(), counts));
        }
        Ok(UnifiedTable::from_dataframe(DataFrame::new(columns)?)?)
    }

    fn sample_table() -> anyhow::Result<UnifiedTable> {
        all_crimes(
            &["Maharashtra", "Maharashtra", "Kerala", "Kerala", "Goa"],
            &["Pune", "Mumbai", "Kochi", "Kochi", "North Goa"],
            &[2013, 2013, 2013, 2012, 2012],
            &[10, 5, 7, 3, 1],
        )
    }

    #[test]
    fn state_totals_sum_rows_of_the_selected_year() -> anyhow::Result<()> {
        let table = all_crimes(
            &["Maharashtra", "Maharashtra"],
            &["Pune", "Mumbai"],
            &[2013, 2013],
            &[10, 5],
        )?;
        let selection = FilterSelection::new(2013, StateFilter::All, CrimeType::Murder);

        let totals = Aggregator::state_totals(&table, &selection)?;

        assert_eq!(
            totals,
            vec![StateTotal {
                state: "Maharashtra".to_string(),
                count: 15
            }]
        );
        Ok(())
    }

    #[test]
    fn state_totals_respect_year_and_state_filters() -> anyhow::Result<()> {
        let table = sample_table()?;

        let all = Aggregator::state_totals(
            &table,
            &FilterSelection::new(2013, StateFilter::All, CrimeType::Murder),
        )?;
        assert_eq!(
            all.iter().map(|t| t.state.as_str()).collect::<Vec<_>>(),
            vec!["Kerala", "Maharashtra"]
        );

        let kerala = Aggregator::state_totals(
            &table,
            &FilterSelection::new(2012, StateFilter::from_name("Kerala"), CrimeType::Murder),
        )?;
        assert_eq!(
            kerala,
            vec![StateTotal {
                state: "Kerala".to_string(),
                count: 3
            }]
        );
        Ok(())
    }

    #[test]
    fn unknown_state_yields_empty_table() -> anyhow::Result<()> {
        let table = sample_table()?;
        let selection =
            FilterSelection::new(2013, StateFilter::from_name("Nowhere"), CrimeType::Theft);

        let result = Aggregator::aggregate(&table, &selection)?;

        assert!(result.state_totals.is_empty());
        assert_eq!(result.state_sum(), 0);
        assert!(!result.year_totals.is_empty());
        Ok(())
    }

    #[test]
    fn year_totals_ignore_year_and_state() -> anyhow::Result<()> {
        let table = sample_table()?;

        let totals = Aggregator::year_totals(&table, CrimeType::Murder)?;
        assert_eq!(
            totals,
            vec![
                YearTotal {
                    year: 2012,
                    count: 4
                },
                YearTotal {
                    year: 2013,
                    count: 22
                },
            ]
        );

        let goa = Aggregator::aggregate(
            &table,
            &FilterSelection::new(2012, StateFilter::from_name("Goa"), CrimeType::Murder),
        )?;
        assert_eq!(goa.year_totals, totals);
        Ok(())
    }

    #[test]
    fn category_totals_use_labels_and_ignore_filters() -> anyhow::Result<()> {
        let table = sample_table()?;

        let a = Aggregator::aggregate(
            &table,
            &FilterSelection::new(2013, StateFilter::All, CrimeType::Murder),
        )?;
        let b = Aggregator::aggregate(
            &table,
            &FilterSelection::new(2012, StateFilter::from_name("Goa"), CrimeType::Riots),
        )?;

        assert_eq!(a.category_totals, b.category_totals);
        assert_eq!(a.category_totals.len(), CrimeType::ALL.len());
        assert_eq!(a.category_totals[0].label(), "Murder");
        assert_eq!(a.category_totals[0].count, 26);
        // Rape is the second column, seeded at twice the murder counts.
        assert_eq!(a.category_totals[1].count, 52);
        Ok(())
    }

    #[test]
    fn missing_crime_column_is_reported() -> anyhow::Result<()> {
        let df = df!(
            STATE_COLUMN => &["Goa"],
            DISTRICT_COLUMN => &["North Goa"],
            YEAR_COLUMN => &[2013i32],
            "MURDER" => &[2i64]
        )?;
        let table = UnifiedTable::from_dataframe(df)?;
        let selection = FilterSelection::new(2013, StateFilter::All, CrimeType::Rape);

        let err = Aggregator::aggregate(&table, &selection).unwrap_err();
        assert!(matches!(
            err,
            AggregationError::UnknownCrimeColumn {
                crime: CrimeType::Rape,
                column: "RAPE"
            }
        ));

        // The trend for a backed column still works.
        assert_eq!(
            Aggregator::year_totals(&table, CrimeType::Murder)?,
            vec![YearTotal {
                year: 2013,
                count: 2
            }]
        );
        Ok(())
    }

    #[test]
    fn backed_crime_keeps_map_and_trend_when_a_category_is_missing() -> anyhow::Result<()> {
        let df = df!(
            STATE_COLUMN => &["Goa", "Kerala"],
            DISTRICT_COLUMN => &["North Goa", "Kochi"],
            YEAR_COLUMN => &[2013i32, 2013],
            "MURDER" => &[2i64, 5]
        )?;
        let table = UnifiedTable::from_dataframe(df)?;
        let selection = FilterSelection::new(2013, StateFilter::All, CrimeType::Murder);

        let views = Aggregator::compute(&table, &selection);
        assert_eq!(views.state_totals.as_ref().map(Vec::len).ok(), Some(2));
        assert!(views.year_totals.is_ok());
        assert!(matches!(
            views.category_totals,
            Err(AggregationError::UnknownCrimeColumn {
                crime: CrimeType::Rape,
                ..
            })
        ));

        let (partial, errors) = views.into_partial();
        assert_eq!(partial.state_sum(), 7);
        assert_eq!(
            partial.year_totals,
            vec![YearTotal {
                year: 2013,
                count: 7
            }]
        );
        assert!(partial.category_totals.is_empty());
        assert_eq!(errors.len(), 1);
        Ok(())
    }

    #[test]
    fn state_filter_parsing() {
        assert_eq!(StateFilter::from_name("all"), StateFilter::All);
        assert_eq!(StateFilter::from_name(""), StateFilter::All);
        assert_eq!(
            StateFilter::from_name(" Kerala "),
            StateFilter::Named("Kerala".to_string())
        );
        assert_eq!(StateFilter::Named("Goa".to_string()).to_string(), "Goa");
    }

    #[test]
    fn latest_selection_uses_last_year() -> anyhow::Result<()> {
        let table = sample_table()?;
        let selection = FilterSelection::latest(&table, CrimeType::Theft);
        assert_eq!(
            selection,
            Some(FilterSelection::new(2013, StateFilter::All, CrimeType::Theft))
        );
        Ok(())
    }
}
