//! Shared fixtures: small NCRB-shaped CSV files and a boundary file.

#![allow(dead_code)]

use crime_dashboard::data::{DatasetLoader, IPC_2001_2012_FILE, IPC_2013_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HEADER: &str = "STATE/UT,DISTRICT,YEAR,MURDER,RAPE,KIDNAPPING & ABDUCTION,ROBBERY,BURGLARY,THEFT,RIOTS,DOWRY DEATHS,ASSAULT ON WOMEN WITH INTENT TO OUTRAGE HER MODESTY,CRUELTY BY HUSBAND OR HIS RELATIVES";

/// 2001-2012 release. State names carry the stray padding seen in the real files.
pub const IPC_2001_2012: &str = "\
STATE/UT,DISTRICT,YEAR,MURDER,RAPE,KIDNAPPING & ABDUCTION,ROBBERY,BURGLARY,THEFT,RIOTS,DOWRY DEATHS,ASSAULT ON WOMEN WITH INTENT TO OUTRAGE HER MODESTY,CRUELTY BY HUSBAND OR HIS RELATIVES
Maharashtra ,Pune,2011,10,4,3,7,20,90,2,1,6,12
Maharashtra,Mumbai,2011,5,6,2,9,25,150,1,0,8,10
Kerala,Kochi,2011,3,2,1,1,8,40,5,0,4,9
Maharashtra,Pune,2012,12,5,4,6,18,80,3,2,7,11
Kerala, Kochi ,2012,4,3,1,2,9,45,4,1,5,8
";

/// 2013 release with a spelling change for Delhi.
pub const IPC_2013: &str = "\
STATE/UT,DISTRICT,YEAR,MURDER,RAPE,KIDNAPPING & ABDUCTION,ROBBERY,BURGLARY,THEFT,RIOTS,DOWRY DEATHS,ASSAULT ON WOMEN WITH INTENT TO OUTRAGE HER MODESTY,CRUELTY BY HUSBAND OR HIS RELATIVES
Maharashtra,Pune,2013,11,7,5,8,22,95,2,1,9,13
Kerala,Kochi,2013,2,4,2,1,7,38,6,0,5,7
Delhi UT,New Delhi,2013,9,12,10,6,30,200,1,3,14,20
";

pub const BOUNDARIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "ST_NM": "Maharashtra" },
      "geometry": { "type": "Polygon", "coordinates": [[[73.0, 16.0], [80.0, 16.0], [80.0, 21.0], [73.0, 21.0], [73.0, 16.0]]] }
    },
    {
      "type": "Feature",
      "properties": { "ST_NM": "Kerala" },
      "geometry": { "type": "Polygon", "coordinates": [[[75.0, 8.0], [77.0, 8.0], [77.0, 12.0], [75.0, 12.0], [75.0, 8.0]]] }
    },
    {
      "type": "Feature",
      "properties": { "ST_NM": "Delhi" },
      "geometry": { "type": "Polygon", "coordinates": [[[76.8, 28.4], [77.3, 28.4], [77.3, 28.9], [76.8, 28.9], [76.8, 28.4]]] }
    },
    {
      "type": "Feature",
      "properties": { "ST_NM": "Goa" },
      "geometry": { "type": "Polygon", "coordinates": [[[73.7, 14.9], [74.3, 14.9], [74.3, 15.8], [73.7, 15.8], [73.7, 14.9]]] }
    }
  ]
}"#;

/// Temporary data directory holding both NCRB files.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_files(IPC_2001_2012, IPC_2013)
    }

    pub fn with_files(older: &str, newer: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(IPC_2001_2012_FILE), older)?;
        fs::write(dir.path().join(IPC_2013_FILE), newer)?;
        fs::write(dir.path().join("india_states.geojson"), BOUNDARIES)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn boundaries(&self) -> PathBuf {
        self.dir.path().join("india_states.geojson")
    }

    pub fn loader(&self) -> DatasetLoader {
        DatasetLoader::ncrb_ipc(self.path())
    }
}

/// Remove one column from CSV text with no quoted fields.
pub fn drop_column(csv: &str, column: &str) -> String {
    let mut lines = csv.lines();
    let Some(header) = lines.next() else {
        return String::new();
    };
    let index = header.split(',').position(|name| name == column);

    let strip = |line: &str| -> String {
        let fields: Vec<&str> = line.split(',').collect();
        fields
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != index)
            .map(|(_, field)| *field)
            .collect::<Vec<_>>()
            .join(",")
    };

    std::iter::once(header)
        .chain(lines)
        .map(|line| strip(line) + "\n")
        .collect()
}
