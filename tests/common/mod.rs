//! Common test utilities for rgbmaker.
//!
//! Shared float assertions, PNG checks and synthetic survey data.

#![allow(dead_code)]

pub mod assertions;
pub mod image_utils;
pub mod test_data;
