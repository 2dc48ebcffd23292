//! Utility modules for zest.
//!
//! - [`datetime`] - Due date parsing and start-of-day normalisation

pub mod datetime;
