use log::debug;

use crate::{
    ast::Stmt,
    environment::Environment,
    error::MintError,
    interpreter::{Interpreter, DEFAULT_MAX_CALL_DEPTH},
    output::OutputChannel,
    parser::parse,
    value::MintValue,
};

/// An evaluation context that takes programs and runs them against one
/// global environment.
///
/// Definitions persist from one call to the next, so a context can be fed
/// a program line by line. Printed values go to the output channel `O`.
pub struct EvaluationContext<O: OutputChannel> {
    globals: Globals,
    output: O,
    max_call_depth: usize,
}

// Closures that escaped into the global scope point back at it. Clearing the
// bindings when the context goes away breaks those cycles
struct Globals(Environment);

impl Drop for Globals {
    fn drop(&mut self) {
        self.0.clear();
    }
}

impl<O: OutputChannel> EvaluationContext<O> {
    pub fn new(output: O) -> Self {
        Self {
            globals: Globals(Environment::root()),
            output,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Parses and runs `source`. Returns the value of the last statement when
    /// it is an expression statement.
    pub fn evaluate_str(&mut self, source: &str) -> Result<Option<MintValue>, MintError> {
        let program = parse(source)?;
        self.execute(&program)
    }

    /// Runs a program produced by [`parse`], whose variables have already been
    /// bound to their scopes.
    pub fn execute(&mut self, program: &[Stmt]) -> Result<Option<MintValue>, MintError> {
        debug!("executing {} top-level statements", program.len());
        let globals = &self.globals.0;
        let mut interpreter = Interpreter::new(&mut self.output, globals.clone(), self.max_call_depth);
        let mut last = None;

        // Top-level `return` is rejected by the parser, so the flow is
        // always normal here
        for statement in program {
            last = match statement {
                Stmt::Expression(expr) => Some(interpreter.evaluate(expr, globals)?.into()),
                statement => {
                    interpreter.execute(statement, globals)?;
                    None
                }
            };
        }

        Ok(last)
    }

    pub fn globals(&self) -> &Environment {
        &self.globals.0
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}
