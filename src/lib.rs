//! Store vs competitor price and SKU checker.
//!
//! Reads link pairs from a spreadsheet, scrapes both product pages through a
//! Chrome DevTools session and reports price or SKU mismatches.

pub mod app;
pub mod browser;
pub mod compare;
pub mod config;
pub mod logging;
pub mod models;
pub mod notify;
pub mod parsers;
pub mod runner;
pub mod scrapers;
pub mod sheet;
pub mod ui;
