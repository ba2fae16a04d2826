//! Expression parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ExpressionError;
use crate::expr::ast::*;
use crate::expr::lexer::{lex, Token};

/// Suffix applied to an atom: `.name`, `.name(args)` or `[index]`
#[derive(Debug, Clone)]
enum Postfix {
    Member(String),
    Method(String, Vec<Expr>),
    Index(Expr),
}

/// Parse expression text into an [`Expr`]
pub fn parse(input: &str) -> Result<Expr, Vec<ExpressionError>> {
    let len = input.len();

    let token_iter = lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn expression_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let identifier = select! {
            Token::Ident(s) => s,
        };

        let literal = select! {
            Token::Null => Literal::Null,
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Number(n) => Literal::Number(n),
            Token::String(s) => Literal::String(s),
        }
        .map(Expr::Literal);

        // Comma separated expressions, shared by calls and array literals
        let items = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>();

        let args = items
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let array = items
            .clone()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map(Expr::Array);

        // Object entries: `key: value`, `"key": value` or shorthand `key`
        let key = choice((
            identifier.clone(),
            select! { Token::String(s) => s },
        ));
        let entry = choice((
            key.then_ignore(just(Token::Colon)).then(expr.clone()),
            identifier.clone().map(|name| (name.clone(), Expr::Ident(name))),
        ));
        let object = entry
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(Expr::Object);

        let call = identifier
            .clone()
            .then(args.clone())
            .map(|(function, args)| Expr::Call { function, args });

        // Call must come before plain identifiers, both start with an identifier
        let atom = choice((
            literal,
            call,
            identifier.clone().map(Expr::Ident),
            array,
            object,
            expr.clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ))
        .boxed();

        let postfix = choice((
            just(Token::Dot)
                .ignore_then(identifier.clone())
                .then(args)
                .map(|(name, args)| Postfix::Method(name, args)),
            just(Token::Dot)
                .ignore_then(identifier.clone())
                .map(Postfix::Member),
            expr.clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(Postfix::Index),
        ));

        let access = atom
            .foldl(postfix.repeated(), |lhs, suffix| match suffix {
                Postfix::Member(property) => Expr::Member {
                    object: Box::new(lhs),
                    property,
                },
                Postfix::Method(method, args) => Expr::MethodCall {
                    receiver: Box::new(lhs),
                    method,
                    args,
                },
                Postfix::Index(index) => Expr::Index {
                    object: Box::new(lhs),
                    index: Box::new(index),
                },
            })
            .boxed();

        let unary = choice((
            just(Token::Bang).to(UnaryOp::Not),
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Plus).to(UnaryOp::Pos),
        ))
        .repeated()
        .foldr(access, |op, operand| Expr::Unary {
            op,
            operand: Box::new(operand),
        })
        .boxed();

        let product = unary
            .clone()
            .foldl(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                    just(Token::Percent).to(BinaryOp::Rem),
                ))
                .then(unary)
                .repeated(),
                |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
            )
            .boxed();

        let sum = product
            .clone()
            .foldl(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated(),
                |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
            )
            .boxed();

        let comparison = sum
            .clone()
            .foldl(
                choice((
                    just(Token::LessOrEqual).to(BinaryOp::LessOrEqual),
                    just(Token::GreaterOrEqual).to(BinaryOp::GreaterOrEqual),
                    just(Token::Less).to(BinaryOp::Less),
                    just(Token::Greater).to(BinaryOp::Greater),
                ))
                .then(sum)
                .repeated(),
                |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
            )
            .boxed();

        let equality = comparison
            .clone()
            .foldl(
                choice((
                    just(Token::StrictEq).to(BinaryOp::StrictEq),
                    just(Token::StrictNotEq).to(BinaryOp::StrictNotEq),
                    just(Token::Eq).to(BinaryOp::Eq),
                    just(Token::NotEq).to(BinaryOp::NotEq),
                ))
                .then(comparison)
                .repeated(),
                |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
            )
            .boxed();

        let and = equality
            .clone()
            .foldl(
                just(Token::And).to(BinaryOp::And).then(equality).repeated(),
                |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
            )
            .boxed();

        let or = and
            .clone()
            .foldl(
                just(Token::Or).to(BinaryOp::Or).then(and).repeated(),
                |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
            )
            .boxed();

        // Ternary conditional binds loosest and is right associative
        or.then(
            just(Token::Question)
                .ignore_then(expr.clone())
                .then_ignore(just(Token::Colon))
                .then(expr.clone())
                .or_not(),
        )
        .map(|(cond, branches)| match branches {
            Some((then, otherwise)) => Expr::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            None => cond,
        })
        .boxed()
    })
}
