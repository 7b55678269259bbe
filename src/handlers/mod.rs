//! HTTP handlers

pub mod health;
pub mod scan;
pub mod history;
pub mod stats;

#[cfg(test)]
mod tests;
