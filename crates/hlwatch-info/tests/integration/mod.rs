//! Integration test support for hlwatch-info.

pub mod common;
