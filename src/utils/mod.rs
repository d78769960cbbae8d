// Shared utilities

pub mod logging;
pub mod validation;
