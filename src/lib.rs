pub mod clean;
pub mod config;
pub mod extract;
pub mod output;
pub mod statement;
