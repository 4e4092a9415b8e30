#![warn(missing_docs)]

//! Math kernels for the bridge drawing generator.
//!
//! Thin wrappers around nalgebra: the world-to-paper [`Projection`] used by
//! every geometry builder, and the [`Skew`] kernel that rotates plan
//! geometry about a support axis.

pub mod projection;
pub mod skew;

pub use projection::Projection;
pub use skew::{rotate, Skew};

/// Smallest |cos(skew)| accepted before a skew is considered degenerate.
pub const MIN_SKEW_COSINE: f64 = 1e-3;
