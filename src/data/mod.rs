//! Data module - CSV loading and aggregation

mod aggregator;
mod crime_type;
mod loader;

pub use aggregator::{
    AggregationError, AggregationResult, Aggregator, CategoryTotal, FilterSelection, StateFilter,
    StateTotal, ViewTables, YearTotal,
};
pub use crime_type::{CrimeType, ParseCrimeTypeError};
pub use loader::{
    parse_year, DataLoadError, DatasetLoader, UnifiedTable, DISTRICT_COLUMN, IPC_2001_2012_FILE,
    IPC_2013_FILE, STATE_COLUMN, YEAR_COLUMN,
};
