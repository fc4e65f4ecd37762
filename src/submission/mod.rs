pub mod extractor;
pub mod parser;
pub mod pipeline;
pub mod validator;
