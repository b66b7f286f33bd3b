//! Application services around the core engines.

pub mod access;
pub mod catalog;
pub mod editor;
pub mod format;
