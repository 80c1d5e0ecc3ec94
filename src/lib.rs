#[macro_use]
extern crate diesel;
#[macro_use]
extern crate log;

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod records;
pub mod reports;
pub mod schema;

#[cfg(test)]
mod fixtures;
