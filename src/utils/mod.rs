//! Utility functions
//!
//! Provides logging setup and lenient text decoding.

pub mod logging;
pub mod text;

pub use logging::setup_logging;
pub use text::LossyUtf8Decoder;
