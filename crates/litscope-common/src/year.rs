//! Publication counts bucketed by year.

use serde::{Deserialize, Serialize};

/// One row of the year-count table: how many publications appeared in `year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

impl YearCount {
    pub fn new(year: i32, count: usize) -> Self {
        Self { year, count }
    }
}
