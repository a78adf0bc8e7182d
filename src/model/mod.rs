pub mod config;
pub mod document;
pub mod mode;
pub mod workbook;
