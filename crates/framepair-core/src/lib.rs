//! # framepair-core
//!
//! Core value types shared by the framepair crates.
//!
//! This crate provides:
//! - [`Shape`]: n-dimensional shape with row-major strides
//! - [`Tensor`]: dense, contiguous `f32` tensor (reshape, transpose,
//!   unsqueeze, concatenation along the batch dimension)
//! - [`Error`] / [`Result`]: the single error type used across framepair

pub mod error;
pub mod shape;
pub mod tensor;

pub use error::{Error, Result};
pub use shape::Shape;
pub use tensor::Tensor;
