//! HTML parsers for the portal pages. Each parser takes a raw body and never
//! performs I/O.

pub mod activities;
pub mod courses;
pub mod date;
pub mod due_date;
pub(crate) mod helpers;
pub mod login;
pub mod units;
