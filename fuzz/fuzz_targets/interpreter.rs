#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Literals and loads from variables
#[derive(Arbitrary, Debug)]
enum MintAtom {
    True, False, Nil,
    Identifier(Name),
    Number(u8),
    Text(String),
}

// A small pool of names so that programs reuse their variables
#[derive(Arbitrary, Debug, Clone, Copy)]
enum Name { A, B, C, F, G }

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Name::A => "a",
            Name::B => "b",
            Name::C => "c",
            Name::F => "f",
            Name::G => "g",
        })
    }
}

impl fmt::Display for MintAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintAtom::True => write!(f, "true"),
            MintAtom::False => write!(f, "false"),
            MintAtom::Nil => write!(f, "nil"),
            MintAtom::Identifier(name) => write!(f, "{}", name),
            MintAtom::Number(value) => write!(f, "{}", value),
            MintAtom::Text(text) => write!(f, "\"{}\"", text.replace('"', "")),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum MintExpr {
    Atom(MintAtom),
    Binary(Box<MintExpr>, Operator, Box<MintExpr>),
    Not(Box<MintExpr>),
    Assign(Name, Box<MintExpr>),
    Call(Box<MintExpr>, Vec<MintExpr>),
    Function(Vec<Name>, Vec<MintStmt>),
}

#[derive(Arbitrary, Debug)]
enum Operator { Add, Sub, Mul, Div, Mod, Less, Greater, Eq, NotEq, And, Or }

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::And => "&&",
            Operator::Or => "||",
        })
    }
}

impl fmt::Display for MintExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintExpr::Atom(atom) => write!(f, "{}", atom),
            MintExpr::Binary(left, op, right) => write!(f, "({} {} {})", left, op, right),
            MintExpr::Not(operand) => write!(f, "!({})", operand),
            MintExpr::Assign(name, value) => write!(f, "({} = {})", name, value),
            MintExpr::Call(callee, arguments) => write!(f, "({})({})", callee, arguments.iter().join(", ")),
            MintExpr::Function(parameters, body) => write!(
                f,
                "(fn ({}) {{ {} }})",
                parameters.iter().unique_by(|name| name.to_string()).join(", "),
                body.iter().join(" ")
            ),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum MintStmt {
    Let(Name, MintExpr),
    Expression(MintExpr),
    Print(MintExpr),
    Function(Name, Vec<Name>, Vec<MintStmt>),
    // Loops are bounded so that a generated program always terminates
    While(u8, Vec<MintStmt>),
    If(MintExpr, Vec<MintStmt>, Vec<MintStmt>),
    Return(Option<MintExpr>),
}

impl fmt::Display for MintStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintStmt::Let(name, value) => write!(f, "let {} = {};", name, value),
            MintStmt::Expression(expr) => write!(f, "{};", expr),
            MintStmt::Print(expr) => write!(f, "print {};", expr),
            MintStmt::Function(name, parameters, body) => write!(
                f,
                "fn {}({}) {{ {} }}",
                name,
                parameters.iter().unique_by(|name| name.to_string()).join(", "),
                body.iter().join(" ")
            ),
            MintStmt::While(limit, body) => write!(
                f,
                "{{ let n = 0; while (n < {}) {{ n = n + 1; {} }} }}",
                limit % 8,
                body.iter().join(" ")
            ),
            MintStmt::If(condition, then_branch, else_branch) => write!(
                f,
                "if ({}) {{ {} }} else {{ {} }}",
                condition,
                then_branch.iter().join(" "),
                else_branch.iter().join(" ")
            ),
            MintStmt::Return(Some(value)) => write!(f, "return {};", value),
            MintStmt::Return(None) => write!(f, "return;"),
        }
    }
}

fuzz_target!(|statements: Vec<MintStmt>| {
    let program = statements.iter().join("\n");
    let mut context = mint::EvaluationContext::new(Vec::<mint::MintValue>::new()).with_max_call_depth(32);

    // Top-level returns are syntax errors, everything else must either run
    // or fail with a runtime error, never panic
    let _ = context.evaluate_str(&program);
});
