//! Dataset Loader Module
//! Reads the NCRB district-wise IPC crime CSV files with Polars and merges
//! them into one normalized, immutable table.

use crate::data::CrimeType;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATE_COLUMN: &str = "STATE/UT";
pub const DISTRICT_COLUMN: &str = "DISTRICT";
pub const YEAR_COLUMN: &str = "YEAR";

/// NCRB release covering 2001 to 2012.
pub const IPC_2001_2012_FILE: &str = "01_District_wise_crimes_committed_IPC_2001_2012.csv";
/// NCRB release covering 2013.
pub const IPC_2013_FILE: &str = "01_District_wise_crimes_committed_IPC_2013.csv";

const IN_MEMORY_ORIGIN: &str = "<in-memory table>";

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("No data sources configured")]
    NoSources,
    #[error("Data source not found: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("Failed to read CSV {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: PolarsError,
    },
    #[error("{origin} has no '{column}' column")]
    MissingColumn { origin: String, column: &'static str },
    #[error("{origin}: invalid year {value:?} in data row {row}")]
    InvalidYear {
        origin: String,
        row: usize,
        value: String,
    },
    #[error("Failed to process {origin}: {source}")]
    Frame {
        origin: String,
        #[source]
        source: PolarsError,
    },
}

/// Reads a fixed list of CSV sources into a [`UnifiedTable`].
///
/// Loading is all-or-nothing: the first failing source aborts the load.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    sources: Vec<PathBuf>,
}

impl DatasetLoader {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self { sources }
    }

    /// Loader for the two NCRB IPC releases stored in `data_dir`.
    pub fn ncrb_ipc(data_dir: &Path) -> Self {
        Self::new(vec![
            data_dir.join(IPC_2001_2012_FILE),
            data_dir.join(IPC_2013_FILE),
        ])
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Read every source and concatenate the rows in source order.
    pub fn load(&self) -> Result<UnifiedTable, DataLoadError> {
        if self.sources.is_empty() {
            return Err(DataLoadError::NoSources);
        }

        if let Some(missing) = self.sources.iter().find(|path| !path.is_file()) {
            return Err(DataLoadError::MissingSource(missing.clone()));
        }

        let frames = self
            .sources
            .par_iter()
            .map(|path| Self::read_source(path))
            .collect::<Result<Vec<_>, _>>()?;

        // Diagonal concat keeps rows from releases that lack a crime column.
        let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(DataFrame::lazy).collect();
        let df = concat_lf_diagonal(lazy_frames, UnionArgs::default())
            .and_then(LazyFrame::collect)
            .map_err(|source| DataLoadError::Frame {
                origin: "unified table".to_string(),
                source,
            })?;

        let table = UnifiedTable::from_normalized(df, "unified table")?;
        log::info!(
            "Loaded {} rows from {} sources ({} states, years {:?})",
            table.height(),
            self.sources.len(),
            table.states().len(),
            table.year_range()
        );
        Ok(table)
    }

    fn read_source(path: &Path) -> Result<DataFrame, DataLoadError> {
        let origin = path.display().to_string();
        log::info!("Reading {}", origin);

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| DataLoadError::Csv {
                origin: origin.clone(),
                source,
            })?;

        let df = normalize(&df, &origin)?;
        log::debug!("{}: {} rows after normalization", origin, df.height());
        Ok(df)
    }
}

/// Keep the key columns and the known crime columns, with parsed years,
/// trimmed names and `Int64` counts.
fn normalize(df: &DataFrame, origin: &str) -> Result<DataFrame, DataLoadError> {
    for column in [STATE_COLUMN, DISTRICT_COLUMN, YEAR_COLUMN] {
        if df.column(column).is_err() {
            return Err(DataLoadError::MissingColumn {
                origin: origin.to_string(),
                column,
            });
        }
    }

    let frame_error = |source: PolarsError| DataLoadError::Frame {
        origin: origin.to_string(),
        source,
    };

    let mut columns = vec![
        trimmed_column(df, STATE_COLUMN).map_err(frame_error)?,
        trimmed_column(df, DISTRICT_COLUMN).map_err(frame_error)?,
        year_column(df, origin)?,
    ];

    for crime in CrimeType::ALL {
        if let Ok(counts) = df.column(crime.column()) {
            columns.push(counts.cast(&DataType::Int64).map_err(frame_error)?);
        }
    }

    DataFrame::new(columns).map_err(frame_error)
}

fn trimmed_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
    let raw = df.column(name)?.cast(&DataType::String)?;
    let values: Vec<Option<String>> = raw
        .str()?
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()))
        .collect();
    Ok(Column::new(name.into(), values))
}

fn year_column(df: &DataFrame, origin: &str) -> Result<Column, DataLoadError> {
    let frame_error = |source: PolarsError| DataLoadError::Frame {
        origin: origin.to_string(),
        source,
    };

    let raw = df
        .column(YEAR_COLUMN)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(frame_error)?;

    let years = raw
        .str()
        .map_err(frame_error)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            parse_year(value).ok_or_else(|| DataLoadError::InvalidYear {
                origin: origin.to_string(),
                row: row + 1,
                value: value.unwrap_or("null").to_string(),
            })
        })
        .collect::<Result<Vec<i32>, _>>()?;

    Ok(Column::new(YEAR_COLUMN.into(), years))
}

/// Parse a four-digit calendar year.
pub fn parse_year(value: Option<&str>) -> Option<i32> {
    let value = value?.trim();
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// The merged crime records, immutable once built.
#[derive(Debug, Clone)]
pub struct UnifiedTable {
    df: DataFrame,
    states: Vec<String>,
    years: Vec<i32>,
}

impl PartialEq for UnifiedTable {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

impl UnifiedTable {
    /// Normalize an arbitrary frame with the same rules the loader applies.
    pub fn from_dataframe(df: DataFrame) -> Result<Self, DataLoadError> {
        let df = normalize(&df, IN_MEMORY_ORIGIN)?;
        Self::from_normalized(df, IN_MEMORY_ORIGIN)
    }

    fn from_normalized(df: DataFrame, origin: &str) -> Result<Self, DataLoadError> {
        let frame_error = |source: PolarsError| DataLoadError::Frame {
            origin: origin.to_string(),
            source,
        };

        let states: BTreeSet<String> = df
            .column(STATE_COLUMN)
            .and_then(|c| c.str().map(|ca| ca.into_iter().flatten().map(str::to_string).collect()))
            .map_err(frame_error)?;

        let years: BTreeSet<i32> = df
            .column(YEAR_COLUMN)
            .and_then(|c| c.i32().map(|ca| ca.into_iter().flatten().collect()))
            .map_err(frame_error)?;

        Ok(Self {
            df,
            states: states.into_iter().collect(),
            years: years.into_iter().collect(),
        })
    }

    /// Get a reference to the underlying DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Distinct states, sorted.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.df.column(column).is_ok()
    }

    /// Crime types that have a backing count column.
    pub fn crime_types(&self) -> Vec<CrimeType> {
        CrimeType::ALL
            .into_iter()
            .filter(|crime| self.has_column(crime.column()))
            .collect()
    }
}
