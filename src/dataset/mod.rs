//! A minimal client for GrADS Data Server (OPeNDAP) datasets.

pub mod address;
pub mod ascii;
pub mod das;
pub mod dds;
pub mod error;
pub mod loader;
pub mod time_units;
