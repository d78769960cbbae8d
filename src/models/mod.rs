// Data models

pub mod category;
pub mod fields;
pub mod record;
