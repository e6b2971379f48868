//! Utilities around an annotated single-cell matrix: spatial tissue
//! segmentation, ROI labeling, biotype percentages, feature renaming,
//! differential-expression export and 10x input.

pub mod adata;
pub mod error;
pub mod input;
pub mod logging;
pub mod ops;
pub mod report;

pub use adata::AnnData;
pub use error::{Error, Result};
