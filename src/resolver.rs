use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, FunctionDecl, Stmt},
    error::MintError,
    stack::ensure_sufficient_stack,
};

type ResolveResult<T> = Result<T, MintError>;

/// Binds every variable use to the scope it refers to, as the source reads at
/// the point of definition. Top-level names stay unresolved and are looked up
/// in the globals when the program runs.
///
/// Also rejects `return` outside functions, a second `let` of a name in the
/// same local scope and reading a local inside its own initializer.
#[derive(Default)]
struct Resolver {
    // Local scopes, innermost last. A name maps to whether its initializer
    // has finished
    scopes: Vec<HashMap<String, bool>>,
    in_function: bool,
}

pub(crate) fn resolve(program: Vec<Stmt>) -> ResolveResult<Vec<Stmt>> {
    Resolver::default().statements(program)
}

impl Resolver {
    fn statements(&mut self, statements: Vec<Stmt>) -> ResolveResult<Vec<Stmt>> {
        statements.into_iter().map(|statement| self.statement(statement)).collect()
    }

    fn statement(&mut self, statement: Stmt) -> ResolveResult<Stmt> {
        ensure_sufficient_stack(|| self.resolve_statement(statement))
    }

    fn resolve_statement(&mut self, statement: Stmt) -> ResolveResult<Stmt> {
        let statement = match statement {
            Stmt::Let { name, initializer, line } => {
                self.declare(&name, line)?;
                let initializer = initializer.map(|expr| self.expression(expr)).transpose()?;
                self.define(&name);
                Stmt::Let { name, initializer, line }
            }
            Stmt::Function(declaration) => {
                if let Some(name) = &declaration.name {
                    self.declare(name, declaration.line)?;
                    self.define(name);
                }
                Stmt::Function(self.function(declaration)?)
            }
            Stmt::Expression(expr) => Stmt::Expression(self.expression(expr)?),
            Stmt::Print(expr) => Stmt::Print(self.expression(expr)?),
            Stmt::While { condition, body } => Stmt::While {
                condition: self.expression(condition)?,
                body: Box::new(self.statement(*body)?),
            },
            Stmt::If { condition, then_branch, else_branch } => Stmt::If {
                condition: self.expression(condition)?,
                then_branch: Box::new(self.statement(*then_branch)?),
                else_branch: match else_branch {
                    Some(branch) => Some(Box::new(self.statement(*branch)?)),
                    None => None,
                },
            },
            Stmt::Block(statements) => {
                self.scopes.push(HashMap::new());
                let statements = self.statements(statements);
                self.scopes.pop();
                Stmt::Block(statements?)
            }
            Stmt::Return { value, line } => {
                if !self.in_function {
                    return Err(MintError::syntax(line, " at 'return'".to_owned(), "Can't return from top-level code."));
                }
                Stmt::Return {
                    value: value.map(|expr| self.expression(expr)).transpose()?,
                    line,
                }
            }
        };

        Ok(statement)
    }

    fn expression(&mut self, expr: Expr) -> ResolveResult<Expr> {
        ensure_sufficient_stack(|| self.resolve_expression(expr))
    }

    fn resolve_expression(&mut self, expr: Expr) -> ResolveResult<Expr> {
        let expr = match expr {
            Expr::Literal(literal) => Expr::Literal(literal),
            Expr::Variable { name, line, .. } => {
                if self.scopes.last().and_then(|scope| scope.get(&name)) == Some(&false) {
                    return Err(MintError::syntax(
                        line,
                        format!(" at '{}'", name),
                        "Can't read local variable in its own initializer.",
                    ));
                }
                let distance = self.distance(&name);
                Expr::Variable { name, line, distance }
            }
            Expr::Assign { name, value, line, .. } => {
                let value = Box::new(self.expression(*value)?);
                let distance = self.distance(&name);
                Expr::Assign { name, value, line, distance }
            }
            Expr::Unary { op, operand, line } => Expr::Unary {
                op,
                operand: Box::new(self.expression(*operand)?),
                line,
            },
            Expr::Binary { op, left, right, line } => Expr::Binary {
                op,
                left: Box::new(self.expression(*left)?),
                right: Box::new(self.expression(*right)?),
                line,
            },
            Expr::Call { callee, arguments, line } => Expr::Call {
                callee: Box::new(self.expression(*callee)?),
                arguments: arguments
                    .into_iter()
                    .map(|argument| self.expression(argument))
                    .collect::<ResolveResult<_>>()?,
                line,
            },
            Expr::Function(declaration) => Expr::Function(self.function(declaration)?),
        };

        Ok(expr)
    }

    // Parameters and body share one scope, the one a call frame provides
    fn function(&mut self, declaration: Rc<FunctionDecl>) -> ResolveResult<Rc<FunctionDecl>> {
        let FunctionDecl { name, parameters, body, line } = Rc::unwrap_or_clone(declaration);

        let enclosing = std::mem::replace(&mut self.in_function, true);
        self.scopes.push(HashMap::new());
        let body = self.function_body(&parameters, body, line);
        self.scopes.pop();
        self.in_function = enclosing;

        Ok(Rc::new(FunctionDecl {
            name,
            parameters,
            body: body?,
            line,
        }))
    }

    fn function_body(&mut self, parameters: &[String], body: Vec<Stmt>, line: usize) -> ResolveResult<Vec<Stmt>> {
        for parameter in parameters {
            self.declare(parameter, line)?;
            self.define(parameter);
        }
        self.statements(body)
    }

    fn declare(&mut self, name: &str, line: usize) -> ResolveResult<()> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if scope.contains_key(name) {
            return Err(MintError::syntax(
                line,
                format!(" at '{}'", name),
                "Already a variable with this name in this scope.",
            ));
        }
        scope.insert(name.to_owned(), false);
        Ok(())
    }

    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned(), true);
        }
    }

    fn distance(&self, name: &str) -> Option<usize> {
        self.scopes.iter().rev().position(|scope| scope.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use crate::parser::parse;

    use super::*;

    fn error(source: &str) -> Option<String> {
        parse(source).err().map(|err| err.to_string())
    }

    #[test]
    fn locals_resolve_to_their_scope_distance() -> anyhow::Result<()> {
        let program = parse("fn outer(a) { { return a + b; } }")?;
        let [Stmt::Function(outer)] = program.as_slice() else { bail!("expected a function, got {:?}", program) };
        let [Stmt::Block(block)] = outer.body.as_slice() else { bail!("expected a block, got {:?}", outer.body) };
        let [Stmt::Return { value: Some(Expr::Binary { left, right, .. }), .. }] = block.as_slice() else {
            bail!("expected a return, got {:?}", block)
        };

        assert!(matches!(&**left, Expr::Variable { name, distance: Some(1), .. } if name == "a"));
        assert!(matches!(&**right, Expr::Variable { name, distance: None, .. } if name == "b"));
        Ok(())
    }

    #[test]
    fn top_level_names_stay_global() -> anyhow::Result<()> {
        let program = parse("let a = 1; a = a;")?;
        assert!(matches!(
            &program[1],
            Stmt::Expression(Expr::Assign { distance: None, value, .. })
                if matches!(**value, Expr::Variable { distance: None, .. })
        ));
        Ok(())
    }

    #[test]
    fn diagnostics() {
        assert_eq!(
            error("fn f() {\n  let a = 1;\n  let a = 2;\n}"),
            Some("[Line 3] Error at 'a': Already a variable with this name in this scope.".to_owned())
        );
        assert_eq!(
            error("fn f(a, a) {}"),
            Some("[Line 1] Error at 'a': Already a variable with this name in this scope.".to_owned())
        );
        assert_eq!(
            error("{ let b = b + 1; }"),
            Some("[Line 1] Error at 'b': Can't read local variable in its own initializer.".to_owned())
        );
        assert_eq!(
            error("while (1) {\n return;\n}"),
            Some("[Line 2] Error at 'return': Can't return from top-level code.".to_owned())
        );
    }

    #[test]
    fn globals_may_be_redeclared() {
        assert!(parse("let a = 1; let a = a + 1;").is_ok());
        assert!(parse("fn f() { while (1) { return; } }").is_ok());
    }
}
