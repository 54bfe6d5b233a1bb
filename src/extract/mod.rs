//! Nearest-cell selection and point extraction from an opened dataset.

pub mod locate_cell;
pub mod point_extractor;
