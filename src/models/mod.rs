//! Data models

pub mod prediction;
pub mod verdict;
pub mod scan;

pub use prediction::*;
pub use verdict::*;
pub use scan::*;
