pub mod api;
pub mod records;
