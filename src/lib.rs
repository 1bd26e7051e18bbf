//! India Crime Dashboard
//!
//! Loads the NCRB district-wise IPC crime tables, aggregates them by state,
//! year and crime category, and shows the result as a choropleth map, a
//! trend line and a category bar chart.

pub mod charts;
pub mod config;
pub mod data;
pub mod geo;
pub mod gui;
