pub mod ast;
mod context;
mod environment;
mod error;
mod interpreter;
mod output;
mod parser;
mod resolver;
mod stack;
mod value;

#[cfg(test)]
mod test_utils;

pub use context::EvaluationContext;
pub use environment::Environment;
pub use error::{MintError, RuntimeError};
pub use interpreter::DEFAULT_MAX_CALL_DEPTH;
pub use output::{JsonChannel, OutputChannel, WriterChannel};
pub use parser::parse;
pub use value::{Closure, MintValue, Value};
