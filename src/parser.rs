use std::rc::Rc;

use logos::Logos;

use crate::{
    ast::{BinaryOp, Expr, FunctionDecl, Literal, Stmt, UnaryOp},
    error::MintError,
    resolver::resolve,
    stack::ensure_sufficient_stack,
};

#[derive(Debug, Clone, Copy, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub(crate) enum Token<'a> {
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    #[token("and")]
    And,
    #[token("||")]
    #[token("or")]
    Or,

    #[token("let")]
    Let,
    #[token("fn")]
    #[token("function")]
    Fn,
    #[token("return")]
    Return,
    #[token("while")]
    While,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("print")]
    Print,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""[^"]*""#, |lex| { let slice = lex.slice(); &slice[1..slice.len() - 1] })]
    Str(&'a str),

    // A string missing its closing quote. A complete string is always the
    // longer match
    #[regex(r#""[^"]*"#)]
    UnterminatedString,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Identifier(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Lexeme<'a> {
    token: Token<'a>,
    text: &'a str,
    line: usize,
}

type ParseResult<O> = Result<O, MintError>;

// Every parser takes the remaining tokens and returns what is left after it
// together with what it produced
type Parsed<'a, 'b, O> = ParseResult<(&'a [Lexeme<'b>], O)>;

// Errors raised on an exhausted token stream carry this line until `parse`
// knows where the input ends
const END_OF_INPUT: usize = 0;

// Parentheses, blocks, bodies and prefix operators may nest this deep
const MAX_NESTING: usize = 256;

fn lexer(input: &str) -> ParseResult<Vec<Lexeme<'_>>> {
    let mut lexemes = vec![];
    let mut tokenizer = Token::lexer(input);
    let mut line = 1;
    let mut scanned = 0;

    while let Some(result) = tokenizer.next() {
        let span = tokenizer.span();
        line += input[scanned..span.start].matches('\n').count();
        scanned = span.start;

        match result {
            Ok(Token::UnterminatedString) => {
                let end_line = line + tokenizer.slice().matches('\n').count();
                return Err(MintError::syntax(end_line, String::new(), "Unterminated string."));
            }
            Ok(token) => lexemes.push(Lexeme { token, text: tokenizer.slice(), line }),
            Err(_) => {
                return Err(MintError::syntax(
                    line,
                    format!(" at '{}'", tokenizer.slice()),
                    "Unexpected character.",
                ))
            }
        }
    }

    Ok(lexemes)
}

fn error_at<O>(tokens: &[Lexeme], message: &str) -> ParseResult<O> {
    Err(match tokens.first() {
        Some(lexeme) => MintError::syntax(lexeme.line, format!(" at '{}'", lexeme.text), message),
        None => MintError::syntax(END_OF_INPUT, " at end".to_owned(), message),
    })
}

fn peek<'b>(tokens: &[Lexeme<'b>]) -> Option<Token<'b>> {
    tokens.first().map(|lexeme| lexeme.token)
}

fn line_of(tokens: &[Lexeme]) -> usize {
    tokens.first().map_or(END_OF_INPUT, |lexeme| lexeme.line)
}

// One level deeper, or an error once past MAX_NESTING
fn nested(tokens: &[Lexeme], depth: usize) -> ParseResult<usize> {
    if depth >= MAX_NESTING {
        return error_at(tokens, "Too much nesting.");
    }
    Ok(depth + 1)
}

fn consume<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], expected: Token<'b>, message: &str) -> Parsed<'a, 'b, &'a Lexeme<'b>> {
    match tokens.first() {
        Some(lexeme) if lexeme.token == expected => Ok((&tokens[1..], lexeme)),
        _ => error_at(tokens, message),
    }
}

fn parse_identifier<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>]) -> Parsed<'a, 'b, String> {
    match peek(tokens) {
        Some(Token::Identifier(name)) => Ok((&tokens[1..], name.to_owned())),
        _ => error_at(tokens, "Expect identifier."),
    }
}

// Comma separated items up to and including the closing token
fn parse_separated<'a, 'b: 'a, O>(
    item: impl Fn(&'a [Lexeme<'b>], usize) -> Parsed<'a, 'b, O>,
    close: Token<'b>,
    message: &'static str,
) -> impl Fn(&'a [Lexeme<'b>], usize) -> Parsed<'a, 'b, Vec<O>> {
    move |mut tokens, depth| {
        let mut items = vec![];

        if peek(tokens) != Some(close) {
            loop {
                let (rest, value) = item(tokens, depth)?;
                items.push(value);
                tokens = rest;

                if peek(tokens) != Some(Token::Comma) {
                    break;
                }
                tokens = &tokens[1..];
            }
        }

        let (tokens, _) = consume(tokens, close, message)?;
        Ok((tokens, items))
    }
}

// A left associative chain of operands joined by the operators `operator`
// recognizes
fn parse_binary<'a, 'b: 'a>(
    operand: impl Fn(&'a [Lexeme<'b>], usize) -> Parsed<'a, 'b, Expr>,
    operator: impl Fn(&Token<'b>) -> Option<BinaryOp>,
) -> impl Fn(&'a [Lexeme<'b>], usize) -> Parsed<'a, 'b, Expr> {
    move |tokens, depth| {
        let (mut tokens, mut expr) = operand(tokens, depth)?;

        while let Some(op) = tokens.first().and_then(|lexeme| operator(&lexeme.token)) {
            let line = tokens[0].line;
            let (rest, right) = operand(&tokens[1..], depth)?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
            tokens = rest;
        }

        Ok((tokens, expr))
    }
}

fn parse_primary<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    let rest = tokens.get(1..).unwrap_or_default();
    let literal = match peek(tokens) {
        Some(Token::Number(number)) => Literal::Number(number),
        Some(Token::Str(string)) => Literal::String(string.to_owned()),
        Some(Token::True) => Literal::Boolean(true),
        Some(Token::False) => Literal::Boolean(false),
        Some(Token::Nil) => Literal::Nil,
        Some(Token::Identifier(name)) => {
            let variable = Expr::Variable {
                name: name.to_owned(),
                line: line_of(tokens),
                distance: None,
            };
            return Ok((rest, variable));
        }
        Some(Token::LeftParen) => {
            let (rest, expr) = parse_expression(rest, nested(tokens, depth)?)?;
            let (rest, _) = consume(rest, Token::RightParen, "Expect ')' after expression.")?;
            return Ok((rest, expr));
        }
        Some(Token::Fn) => {
            let (rest, function) = parse_function(rest, None, line_of(tokens), depth)?;
            return Ok((rest, Expr::Function(function)));
        }
        _ => return error_at(tokens, "Expect expression."),
    };

    Ok((rest, Expr::Literal(literal)))
}

fn parse_call<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    let (mut tokens, mut expr) = parse_primary(tokens, depth)?;

    while peek(tokens) == Some(Token::LeftParen) {
        let line = tokens[0].line;
        let arguments = parse_separated(parse_expression, Token::RightParen, "Expect ')' after arguments.");
        let (rest, arguments) = arguments(&tokens[1..], nested(tokens, depth)?)?;
        expr = Expr::Call {
            callee: Box::new(expr),
            arguments,
            line,
        };
        tokens = rest;
    }

    Ok((tokens, expr))
}

fn parse_unary<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    let op = match peek(tokens) {
        Some(Token::Minus) => UnaryOp::Negate,
        Some(Token::Bang) => UnaryOp::Not,
        _ => return parse_call(tokens, depth),
    };

    let (rest, operand) = parse_unary(&tokens[1..], nested(tokens, depth)?)?;
    Ok((rest, Expr::Unary {
        op,
        operand: Box::new(operand),
        line: line_of(tokens),
    }))
}

fn parse_factor<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    parse_binary(parse_unary, |token| match token {
        Token::Star => Some(BinaryOp::Multiply),
        Token::Slash => Some(BinaryOp::Divide),
        Token::Percent => Some(BinaryOp::Modulo),
        _ => None,
    })(tokens, depth)
}

fn parse_term<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    parse_binary(parse_factor, |token| match token {
        Token::Plus => Some(BinaryOp::Add),
        Token::Minus => Some(BinaryOp::Subtract),
        _ => None,
    })(tokens, depth)
}

fn parse_comparison<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    parse_binary(parse_term, |token| match token {
        Token::Less => Some(BinaryOp::Less),
        Token::LessEqual => Some(BinaryOp::LessEqual),
        Token::Greater => Some(BinaryOp::Greater),
        Token::GreaterEqual => Some(BinaryOp::GreaterEqual),
        _ => None,
    })(tokens, depth)
}

fn parse_equality<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    parse_binary(parse_comparison, |token| match token {
        Token::EqualEqual => Some(BinaryOp::Equal),
        Token::BangEqual => Some(BinaryOp::NotEqual),
        _ => None,
    })(tokens, depth)
}

fn parse_and<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    parse_binary(parse_equality, |token| matches!(token, Token::And).then_some(BinaryOp::And))(tokens, depth)
}

fn parse_or<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    parse_binary(parse_and, |token| matches!(token, Token::Or).then_some(BinaryOp::Or))(tokens, depth)
}

fn parse_assignment<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    let (rest, target) = parse_or(tokens, depth)?;
    if peek(rest) != Some(Token::Equal) {
        return Ok((rest, target));
    }

    // Assignment is right associative: `a = b = 1`
    let (after, value) = parse_assignment(&rest[1..], nested(rest, depth)?)?;
    match target {
        Expr::Variable { name, line, .. } => Ok((after, Expr::Assign {
            name,
            value: Box::new(value),
            line,
            distance: None,
        })),
        _ => error_at(rest, "Invalid assignment target."),
    }
}

fn parse_expression<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    ensure_sufficient_stack(|| parse_assignment(tokens, depth))
}

// Statements up to and including the closing brace, the opening one has
// already been consumed
fn parse_block<'a, 'b: 'a>(mut tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Vec<Stmt>> {
    let mut statements = vec![];

    loop {
        match peek(tokens) {
            Some(Token::RightBrace) => return Ok((&tokens[1..], statements)),
            None => return error_at(tokens, "Expect '}' after block."),
            Some(_) => {
                let (rest, statement) = parse_declaration(tokens, depth)?;
                statements.push(statement);
                tokens = rest;
            }
        }
    }
}

// Parameter list and body, following the `fn` keyword and the optional name
fn parse_function<'a, 'b: 'a>(
    tokens: &'a [Lexeme<'b>],
    name: Option<String>,
    line: usize,
    depth: usize,
) -> Parsed<'a, 'b, Rc<FunctionDecl>> {
    let depth = nested(tokens, depth)?;
    let parameters = parse_separated(|tokens, _| parse_identifier(tokens), Token::RightParen, "Expect ')' after parameters.");

    let (tokens, _) = consume(tokens, Token::LeftParen, "Expect '(' before parameters.")?;
    let (tokens, parameters) = parameters(tokens, depth)?;
    let (tokens, _) = consume(tokens, Token::LeftBrace, "Expect '{' before function body.")?;
    let (tokens, body) = parse_block(tokens, depth)?;

    Ok((tokens, Rc::new(FunctionDecl {
        name,
        parameters,
        body,
        line,
    })))
}

fn parse_expression_statement<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Expr> {
    let (tokens, expr) = parse_expression(tokens, depth)?;
    let (tokens, _) = consume(tokens, Token::Semicolon, "Expect ';' after expression.")?;
    Ok((tokens, expr))
}

fn parse_condition<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], keyword: &str, depth: usize) -> Parsed<'a, 'b, Expr> {
    let (tokens, _) = consume(tokens, Token::LeftParen, &format!("Expect '(' after '{}'.", keyword))?;
    let (tokens, condition) = parse_expression(tokens, depth)?;
    let (tokens, _) = consume(tokens, Token::RightParen, "Expect ')' after condition.")?;
    Ok((tokens, condition))
}

fn parse_statement<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Stmt> {
    let Some(first) = tokens.first() else {
        return error_at(tokens, "Expect statement.");
    };
    let rest = &tokens[1..];

    ensure_sufficient_stack(|| -> Parsed<'a, 'b, Stmt> {
        match first.token {
            Token::Print => {
                let (rest, expr) = parse_expression_statement(rest, depth)?;
                Ok((rest, Stmt::Print(expr)))
            }
            Token::Return => {
                if peek(rest) == Some(Token::Semicolon) {
                    return Ok((&rest[1..], Stmt::Return { value: None, line: first.line }));
                }
                let (rest, expr) = parse_expression_statement(rest, depth)?;
                Ok((rest, Stmt::Return { value: Some(expr), line: first.line }))
            }
            Token::While => {
                let (rest, condition) = parse_condition(rest, "while", depth)?;
                let (rest, body) = parse_statement(rest, nested(tokens, depth)?)?;
                Ok((rest, Stmt::While {
                    condition,
                    body: Box::new(body),
                }))
            }
            Token::If => {
                let (rest, condition) = parse_condition(rest, "if", depth)?;
                let (rest, then_branch) = parse_statement(rest, nested(tokens, depth)?)?;
                let (rest, else_branch) = match peek(rest) {
                    Some(Token::Else) => {
                        let (after, branch) = parse_statement(&rest[1..], nested(rest, depth)?)?;
                        (after, Some(Box::new(branch)))
                    }
                    _ => (rest, None),
                };
                Ok((rest, Stmt::If {
                    condition,
                    then_branch: Box::new(then_branch),
                    else_branch,
                }))
            }
            Token::LeftBrace => {
                let (rest, statements) = parse_block(rest, nested(tokens, depth)?)?;
                Ok((rest, Stmt::Block(statements)))
            }
            _ => {
                let (rest, expr) = parse_expression_statement(tokens, depth)?;
                Ok((rest, Stmt::Expression(expr)))
            }
        }
    })
}

fn parse_let<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Stmt> {
    let line = line_of(tokens);
    let (tokens, name) = parse_identifier(tokens)?;

    let (tokens, initializer) = match peek(tokens) {
        Some(Token::Equal) => {
            let (tokens, expr) = parse_expression(&tokens[1..], depth)?;
            (tokens, Some(expr))
        }
        _ => (tokens, None),
    };

    let (tokens, _) = consume(tokens, Token::Semicolon, "Expect ';' after variable declaration.")?;
    Ok((tokens, Stmt::Let { name, initializer, line }))
}

fn parse_declaration<'a, 'b: 'a>(tokens: &'a [Lexeme<'b>], depth: usize) -> Parsed<'a, 'b, Stmt> {
    match (peek(tokens), tokens.get(1)) {
        (Some(Token::Let), _) => parse_let(&tokens[1..], depth),
        // A named function is a declaration, `fn (..) {..}` is an expression
        (Some(Token::Fn), Some(Lexeme { token: Token::Identifier(name), line, .. })) => {
            let (rest, function) = parse_function(&tokens[2..], Some((*name).to_owned()), *line, depth)?;
            Ok((rest, Stmt::Function(function)))
        }
        _ => parse_statement(tokens, depth),
    }
}

fn parse_program<'a, 'b: 'a>(mut tokens: &'a [Lexeme<'b>]) -> ParseResult<Vec<Stmt>> {
    let mut statements = vec![];

    while !tokens.is_empty() {
        let (rest, statement) = parse_declaration(tokens, 0)?;
        statements.push(statement);
        tokens = rest;
    }

    Ok(statements)
}

/// Turns source text into a resolved program, ready to run.
pub fn parse(input: &str) -> ParseResult<Vec<Stmt>> {
    let tokens = lexer(input)?;
    let end_line = tokens.last().map_or(1, |lexeme| lexeme.line);

    let program = parse_program(&tokens).map_err(|err| match err {
        MintError::SyntaxError { line: END_OF_INPUT, location, message } => MintError::SyntaxError {
            line: end_line,
            location,
            message,
        },
        other => other,
    })?;

    resolve(program)
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use crate::test_utils::{all_testcases, load_test_pair};

    use super::*;

    fn tokens(input: &str) -> anyhow::Result<Vec<Token<'_>>> {
        Ok(lexer(input)?.into_iter().map(|lexeme| lexeme.token).collect())
    }

    fn number(value: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Literal::Number(value)))
    }

    fn error(source: &str) -> Option<String> {
        parse(source).err().map(|err| err.to_string())
    }

    #[test]
    fn lex_declaration() -> anyhow::Result<()> {
        assert_eq!(tokens("let str = \"Hello, World\";")?, vec![
            Token::Let,
            Token::Identifier("str"),
            Token::Equal,
            Token::Str("Hello, World"),
            Token::Semicolon,
        ]);
        Ok(())
    }

    #[test]
    fn lex_keywords_and_operators() -> anyhow::Result<()> {
        assert_eq!(tokens("function fn letter <= == != && and || or // comment")?, vec![
            Token::Fn,
            Token::Fn,
            Token::Identifier("letter"),
            Token::LessEqual,
            Token::EqualEqual,
            Token::BangEqual,
            Token::And,
            Token::And,
            Token::Or,
            Token::Or,
        ]);
        Ok(())
    }

    #[test]
    fn lex_tracks_lines() -> anyhow::Result<()> {
        let lexemes = lexer("let a = 1;\n\n\"two\nlines\" b")?;
        let lines: Vec<usize> = lexemes.iter().map(|lexeme| lexeme.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 1, 1, 3, 4]);
        Ok(())
    }

    #[test]
    fn unexpected_character() {
        assert_eq!(lexer("let a = 1;\nlet b = #;").err(), Some(MintError::SyntaxError {
            line: 2,
            location: " at '#'".to_owned(),
            message: "Unexpected character.".to_owned(),
        }));
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(error("print \"open;\n\nprint 1;"), Some("[Line 3] Error: Unterminated string.".to_owned()));
        assert_eq!(error("print \"\";"), None);
    }

    #[test]
    fn precedence() -> anyhow::Result<()> {
        let program = parse("1 + 2 * 3 < 4;")?;
        let expected = Expr::Binary {
            op: BinaryOp::Less,
            left: Box::new(Expr::Binary {
                op: BinaryOp::Add,
                left: number(1.0),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Multiply,
                    left: number(2.0),
                    right: number(3.0),
                    line: 1,
                }),
                line: 1,
            }),
            right: number(4.0),
            line: 1,
        };
        assert_eq!(program, vec![Stmt::Expression(expected)]);
        Ok(())
    }

    #[test]
    fn assignment_is_right_associative() -> anyhow::Result<()> {
        let program = parse("a = b = 1;")?;
        assert_eq!(program, vec![Stmt::Expression(Expr::Assign {
            name: "a".to_owned(),
            value: Box::new(Expr::Assign {
                name: "b".to_owned(),
                value: number(1.0),
                line: 1,
                distance: None,
            }),
            line: 1,
            distance: None,
        })]);
        Ok(())
    }

    #[test]
    fn nodes_remember_their_line() -> anyhow::Result<()> {
        let program = parse("let a =\n  1 +\n  -b;")?;
        let [Stmt::Let { line: 1, initializer: Some(Expr::Binary { line: 2, right, .. }), .. }] = program.as_slice() else {
            bail!("unexpected lines in {:?}", program);
        };
        assert!(matches!(**right, Expr::Unary { line: 3, .. }));
        Ok(())
    }

    #[test]
    fn function_declaration() -> anyhow::Result<()> {
        let program = parse("function add(a, b) { return a + b; }")?;
        let [Stmt::Function(function)] = program.as_slice() else {
            bail!("expected a single function declaration, got {:?}", program);
        };
        assert_eq!(function.name.as_deref(), Some("add"));
        assert_eq!(function.parameters, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(function.body.len(), 1);
        Ok(())
    }

    #[test]
    fn anonymous_function_is_an_expression() -> anyhow::Result<()> {
        let program = parse("let twice = fn (f) { f(); f(); };")?;
        let [Stmt::Let { initializer: Some(Expr::Function(function)), .. }] = program.as_slice() else {
            bail!("expected a function expression, got {:?}", program);
        };
        assert_eq!(function.name, None);
        Ok(())
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(error("let = 1;"), Some("[Line 1] Error at '=': Expect identifier.".to_owned()));
        assert_eq!(error("print 1"), Some("[Line 1] Error at end: Expect ';' after expression.".to_owned()));
        assert_eq!(error("1 = 2;"), Some("[Line 1] Error at '=': Invalid assignment target.".to_owned()));
        assert_eq!(error("{\nprint 1;\n"), Some("[Line 2] Error at end: Expect '}' after block.".to_owned()));
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let parens = format!("print {}1{};", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(error(&parens), Some("[Line 1] Error at '(': Too much nesting.".to_owned()));

        let blocks = format!("{}{}", "{".repeat(10_000), "}".repeat(10_000));
        assert_eq!(error(&blocks), Some("[Line 1] Error at '{': Too much nesting.".to_owned()));

        let negations = format!("print {}1;", "-".repeat(10_000));
        assert_eq!(error(&negations), Some("[Line 1] Error at '-': Too much nesting.".to_owned()));
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let depth = MAX_NESTING - 1;
        assert!(parse(&format!("print {}1{};", "(".repeat(depth), ")".repeat(depth))).is_ok());
        assert!(parse(&format!("{}{}", "{".repeat(depth), "}".repeat(depth))).is_ok());
    }

    #[test]
    fn parse_testcases() -> anyhow::Result<()> {
        for testcase in all_testcases() {
            println!("Running testcase {}", testcase);
            let (source, expected) = load_test_pair(testcase)?;
            let expects_syntax_error = expected.error.as_deref() == Some("SyntaxError");

            match parse(&source) {
                Ok(program) if expects_syntax_error => bail!("Testcase {} - Expected a syntax error but got {:?}", testcase, program),
                Err(err) if !expects_syntax_error => bail!("Testcase {} - Expected to parse but got {}", testcase, err),
                _ => {}
            }
        }

        Ok(())
    }
}
