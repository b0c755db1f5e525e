// Model-free extraction: regex and keyword heuristics over resume text.

pub mod offline;
pub mod patterns;

pub use offline::offline_extract;
