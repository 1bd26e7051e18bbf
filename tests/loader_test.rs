mod common;

use common::{drop_column, Fixture, IPC_2001_2012, IPC_2013};
use crime_dashboard::data::{
    CrimeType, DataLoadError, DatasetLoader, IPC_2013_FILE, STATE_COLUMN, YEAR_COLUMN,
};
use polars::prelude::ChunkAgg;

#[test]
fn test_load_concatenates_both_releases() -> anyhow::Result<()> {
    let fixture = Fixture::new()?;
    let table = fixture.loader().load()?;

    assert_eq!(table.height(), 8);
    assert_eq!(table.states(), ["Delhi UT", "Kerala", "Maharashtra"]);
    assert_eq!(table.years(), [2011, 2012, 2013]);
    assert_eq!(table.year_range(), Some((2011, 2013)));
    assert_eq!(table.crime_types(), CrimeType::ALL.to_vec());

    // Rows keep source order: older release first.
    let years = table.dataframe().column(YEAR_COLUMN)?.i32()?.clone();
    assert_eq!(years.get(0), Some(2011));
    assert_eq!(years.get(7), Some(2013));
    Ok(())
}

#[test]
fn test_state_names_are_trimmed() -> anyhow::Result<()> {
    let fixture = Fixture::new()?;
    let table = fixture.loader().load()?;

    let states = table.dataframe().column(STATE_COLUMN)?.str()?.clone();
    assert!(states
        .into_iter()
        .flatten()
        .all(|state| state == state.trim()));
    Ok(())
}

#[test]
fn test_load_is_deterministic() -> anyhow::Result<()> {
    let fixture = Fixture::new()?;
    let first = fixture.loader().load()?;
    let second = fixture.loader().load()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_missing_source_is_reported() -> anyhow::Result<()> {
    let fixture = Fixture::new()?;
    std::fs::remove_file(fixture.path().join(IPC_2013_FILE))?;

    match fixture.loader().load() {
        Err(DataLoadError::MissingSource(path)) => {
            assert_eq!(path, fixture.path().join(IPC_2013_FILE))
        }
        other => panic!("expected MissingSource, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_no_sources_is_an_error() {
    let result = DatasetLoader::new(Vec::new()).load();
    assert!(matches!(result, Err(DataLoadError::NoSources)));
}

#[test]
fn test_unparseable_year_names_the_row() -> anyhow::Result<()> {
    let broken = IPC_2013.replace("Kerala,Kochi,2013", "Kerala,Kochi,20X3");
    let fixture = Fixture::with_files(IPC_2001_2012, &broken)?;

    match fixture.loader().load() {
        Err(DataLoadError::InvalidYear { row, value, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(value, "20X3");
        }
        other => panic!("expected InvalidYear, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_key_column_is_reported() -> anyhow::Result<()> {
    let fixture = Fixture::with_files(&drop_column(IPC_2001_2012, "DISTRICT"), IPC_2013)?;

    match fixture.loader().load() {
        Err(DataLoadError::MissingColumn { column, .. }) => assert_eq!(column, "DISTRICT"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_release_without_a_crime_column_still_loads() -> anyhow::Result<()> {
    let fixture = Fixture::with_files(IPC_2001_2012, &drop_column(IPC_2013, "RIOTS"))?;
    let table = fixture.loader().load()?;

    assert_eq!(table.height(), 8);
    assert!(table.has_column(CrimeType::Riots.column()));

    let riots = table
        .dataframe()
        .column(CrimeType::Riots.column())?
        .i64()?
        .clone();
    assert_eq!(riots.null_count(), 3);
    assert_eq!(riots.sum(), Some(15));
    Ok(())
}
