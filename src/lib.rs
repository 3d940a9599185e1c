pub mod api;
pub mod ast;
pub mod config;
pub mod error;
pub mod imports;
pub mod model;
pub mod parser;
pub mod publish;
pub mod resolver;
pub mod symbols;
pub mod utils;
pub mod validator;

pub use api::{analyze, analyze_with_imports, AnalysisResult};
pub use error::SpecError;
