pub mod resume;
pub mod version;
