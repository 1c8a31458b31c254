//! systolic-golden library
//!
//! Bit-accurate golden model and test-vector toolkit for weight-stationary
//! systolic-array matrix-multiply accelerators.
//!
//! - [`arith`] - saturating fixed-width multiply and accumulate
//! - [`matrix`] - dense matrices plus the stagger, pad and flip layout transforms
//! - [`golden`] - reference `A x B` and `A x B + P` with per-step saturation
//! - [`codec`] - two's-complement hex/binary fields and packed DMA words
//! - [`generator`] - random stimulus, memory streams and control descriptors
//! - [`verify`] - compares hardware output dumps against the golden images

pub mod arith;
pub mod codec;
pub mod config;
pub mod error;
pub mod generator;
pub mod golden;
pub mod matrix;
pub mod verify;

pub use arith::Saturation;
pub use error::{Error, Result};
pub use generator::{TileDims, VectorGenerator};
pub use golden::{golden_matmul, GoldenOutput};
pub use matrix::Matrix;
pub use verify::{CompareTarget, Verifier};
