//! Utility layer

pub mod errors;
pub mod logging;
