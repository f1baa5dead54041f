#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod infer;

pub use error::SniffError;
pub use infer::format::StructuralFormat;
pub use infer::format_detector::{detect, detect_with};
pub use infer::sample::Sample;
pub use infer::sampler::CellSampler;
pub use infer::{Detection, SnifferOptions, sniff, sniff_concurrently};
