use std::rc::Rc;

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    ast::{BinaryOp, Expr, FunctionDecl, Literal, Stmt, UnaryOp},
    environment::Environment,
    error::{MintError, RuntimeError},
    output::OutputChannel,
    stack::ensure_sufficient_stack,
    value::{Closure, Value},
};

pub(crate) type EvaluationResult = Result<Value, MintError>;
pub(crate) type ExecutionResult = Result<Flow, MintError>;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// How control leaves a statement
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Return(Value),
}

/// Walks statements and expressions. The only state it carries across nodes
/// is where `print` goes, the globals unresolved names live in and how deep
/// the current call chain is.
pub(crate) struct Interpreter<'o> {
    output: &'o mut dyn OutputChannel,
    globals: Environment,
    depth: usize,
    max_depth: usize,
}

impl<'o> Interpreter<'o> {
    pub(crate) fn new(output: &'o mut dyn OutputChannel, globals: Environment, max_depth: usize) -> Self {
        Self {
            output,
            globals,
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn execute_all(&mut self, statements: &[Stmt], environment: &Environment) -> ExecutionResult {
        for statement in statements {
            if let Flow::Return(value) = self.execute(statement, environment)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn execute(&mut self, statement: &Stmt, environment: &Environment) -> ExecutionResult {
        ensure_sufficient_stack(|| self.execute_statement(statement, environment))
    }

    fn execute_statement(&mut self, statement: &Stmt, environment: &Environment) -> ExecutionResult {
        match statement {
            Stmt::Let { name, initializer, .. } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr, environment)?,
                    None => Value::Unit,
                };
                trace!("let {} = {:?}", name, value);
                environment.define(name, value);
            }
            Stmt::Function(declaration) => {
                let name = declaration.name.as_deref().unwrap_or_default();
                environment.define(name, make_closure(declaration, environment));
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr, environment)?;
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, environment)?;
                self.output.emit(&value)?;
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, environment)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body, environment)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition, environment)?.is_truthy() {
                    return self.execute(then_branch, environment);
                }
                if let Some(branch) = else_branch {
                    return self.execute(branch, environment);
                }
            }
            Stmt::Block(statements) => return self.execute_all(statements, &environment.child_scope()),
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, environment)?,
                    None => Value::Unit,
                };
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    pub(crate) fn evaluate(&mut self, expr: &Expr, environment: &Environment) -> EvaluationResult {
        ensure_sufficient_stack(|| self.evaluate_expression(expr, environment))
    }

    fn evaluate_expression(&mut self, expr: &Expr, environment: &Environment) -> EvaluationResult {
        match expr {
            Expr::Literal(literal) => Ok(evaluate_literal(literal)),
            Expr::Variable { name, line, distance } => {
                let value = match distance {
                    Some(distance) => environment.get_at(*distance, name),
                    None => self.globals.get(name),
                };
                value.map_err(|error| error.at(*line))
            }
            Expr::Assign { name, value, line, distance } => {
                let value = self.evaluate(value, environment)?;
                let assigned = match distance {
                    Some(distance) => environment.assign_at(*distance, name, value.clone()),
                    None => self.globals.assign(name, value.clone()),
                };
                assigned.map_err(|error| error.at(*line))?;
                Ok(value)
            }
            Expr::Unary { op, operand, line } => {
                let operand = self.evaluate(operand, environment)?;
                evaluate_unary(*op, operand).map_err(|error| error.at(*line))
            }
            Expr::Binary { op: op @ (BinaryOp::And | BinaryOp::Or), left, right, .. } => {
                // The left operand decides unless it is truthy for `&&` or falsy for `||`
                let left = self.evaluate(left, environment)?;
                if left.is_truthy() == (*op == BinaryOp::Or) {
                    return Ok(left);
                }
                self.evaluate(right, environment)
            }
            Expr::Binary { op, left, right, line } => {
                let left = self.evaluate(left, environment)?;
                let right = self.evaluate(right, environment)?;
                evaluate_binary(*op, left, right).map_err(|error| error.at(*line))
            }
            Expr::Call { callee, arguments, line } => {
                let callee = self.evaluate(callee, environment)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument, environment))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callee, arguments, *line)
            }
            Expr::Function(declaration) => Ok(make_closure(declaration, environment)),
        }
    }

    pub(crate) fn call(&mut self, callee: Value, arguments: Vec<Value>, line: usize) -> EvaluationResult {
        let closure = match callee {
            Value::Closure(closure) => closure,
            other => return Err(RuntimeError::NotCallable(other.kind().to_owned()).at(line)),
        };

        if arguments.len() != closure.arity() {
            let error = RuntimeError::ArityMismatch {
                expected: closure.arity(),
                actual: arguments.len(),
            };
            return Err(error.at(line));
        }
        if self.depth >= self.max_depth {
            return Err(RuntimeError::StackOverflow(self.max_depth).at(line));
        }

        debug!("call {:?}({})", closure, arguments.iter().join(", "));

        // The frame hangs off the environment the function was defined in,
        // not the caller's
        let frame = closure.environment.child_scope();
        for (parameter, argument) in closure.declaration.parameters.iter().zip(arguments) {
            frame.define(parameter, argument);
        }

        self.depth += 1;
        let result = self.execute_all(&closure.declaration.body, &frame);
        self.depth -= 1;

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Unit),
        }
    }
}

fn make_closure(declaration: &Rc<FunctionDecl>, environment: &Environment) -> Value {
    Value::Closure(Closure::new(Rc::clone(declaration), environment.clone()))
}

fn evaluate_literal(literal: &Literal) -> Value {
    match literal {
        Literal::Number(number) => Value::Number(*number),
        Literal::String(string) => Value::String(string.as_str().into()),
        Literal::Boolean(value) => Value::Boolean(*value),
        Literal::Nil => Value::Unit,
    }
}

fn evaluate_unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Not, operand) => Ok(Value::Boolean(!operand.is_truthy())),
        (UnaryOp::Negate, Value::Number(number)) => Ok(Value::Number(-number)),
        (UnaryOp::Negate, operand) => Err(RuntimeError::TypeMismatch {
            operation: "-".to_owned(),
            operands: operand.kind().to_owned(),
        }),
    }
}

fn evaluate_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let value = match (op, &left, &right) {
        (BinaryOp::Equal, _, _) => Value::Boolean(left.equals(&right)),
        (BinaryOp::NotEqual, _, _) => Value::Boolean(!left.equals(&right)),
        (BinaryOp::Add, Value::String(a), Value::String(b)) => Value::String(format!("{}{}", a, b).into()),
        (_, Value::Number(a), Value::Number(b)) => match op {
            BinaryOp::Add => Value::Number(a + b),
            BinaryOp::Subtract => Value::Number(a - b),
            BinaryOp::Multiply => Value::Number(a * b),
            BinaryOp::Divide => Value::Number(a / b),
            BinaryOp::Modulo => Value::Number(a % b),
            BinaryOp::Less => Value::Boolean(a < b),
            BinaryOp::LessEqual => Value::Boolean(a <= b),
            BinaryOp::Greater => Value::Boolean(a > b),
            BinaryOp::GreaterEqual => Value::Boolean(a >= b),
            _ => return Err(mismatch(op, &left, &right)),
        },
        _ => return Err(mismatch(op, &left, &right)),
    };

    Ok(value)
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        operation: op.symbol().to_owned(),
        operands: format!("{} and {}", left.kind(), right.kind()),
    }
}
