//! Acceleration structures over static shape sets.

pub mod bvh;

pub use bvh::{Bvh, BvhObject};
