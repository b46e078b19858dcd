//! Common utilities shared across macro modules.
//!
//! This module provides shared helper functions used by both the `Record` and
//! `FromRow` derive macros.

pub mod syn_types;
