//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use datagraph_rs::structure::{DataStructure, HierarchyEntry};

/// Structural snapshot used to prove an operation left a structure untouched
pub fn snapshot(ds: &DataStructure) -> (Vec<HierarchyEntry>, u64) {
    (ds.hierarchy(), ds.next_id().value())
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
