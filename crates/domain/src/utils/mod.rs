//! Domain utility functions

pub mod text;
