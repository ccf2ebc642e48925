pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod json_extract;
pub mod markup;
pub mod pipeline;
pub mod render;
pub mod storage;
pub mod text_extract;
pub mod types;

pub use error::CaseError;
pub use types::*;
