//! Normalizes heterogeneous spreadsheet workbooks into flat, month-tagged
//! JSON records and stores them one by one.
pub mod config;
pub mod crm;
pub mod error;
pub mod process;
pub mod record;
pub mod store;
