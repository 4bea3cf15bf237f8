//! Video catalog with per-parent playlist ordering.

pub mod library;

pub use library::VideoLibrary;
