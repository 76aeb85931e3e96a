use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    // Short-circuiting, the right operand is only evaluated when needed
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// A function as written in source. It is shared between the syntax tree and
/// every closure created from it, so closures stay valid after the program
/// that defined them has been dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub parameters: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

/// Expressions. `distance` on variables counts the scopes between the use and
/// the binding; it is `None` for globals and filled in by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable {
        name: String,
        line: usize,
        distance: Option<usize>,
    },
    Assign {
        name: String,
        value: Box<Expr>,
        line: usize,
        distance: Option<usize>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        line: usize,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        line: usize,
    },
    Function(Rc<FunctionDecl>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: String,
        initializer: Option<Expr>,
        line: usize,
    },
    Expression(Expr),
    /// `function name(..) {..}`, sugar for `let name = fn (..) {..}`
    Function(Rc<FunctionDecl>),
    Print(Expr),
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    Block(Vec<Stmt>),
    Return {
        value: Option<Expr>,
        line: usize,
    },
}
