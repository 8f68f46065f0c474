//! API handlers

pub mod health;
pub mod labeling;
pub mod records;
