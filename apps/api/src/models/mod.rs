pub mod chunk;
pub mod provider;
pub mod resume;
