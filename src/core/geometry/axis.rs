//! Axis

#![allow(dead_code)]

/// A coordinate axis, used by the BVH to record which axis a node was split
/// along.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Default for Axis {
    fn default() -> Self {
        Axis::X
    }
}
