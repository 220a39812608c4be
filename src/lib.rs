pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod focus;
pub mod lifecycle;
pub mod models;
pub mod ordering;
pub mod output;
