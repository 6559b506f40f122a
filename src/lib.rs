pub mod calendar;
pub mod config;
pub mod error;
pub mod input;
pub mod parser;
pub mod startup;
