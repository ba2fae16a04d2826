//! Builds the instruction tree from a flat token stream
//!
//! Blocks are matched with an explicit stack of open `if`/`for` frames; its
//! length is the current nesting depth. Mis-nested directives are rejected.

use tracing::{debug, trace};

use crate::compiler::program::{Arm, Expression, Instruction};
use crate::error::CompileError;
use crate::syntax::{Span, Spanned, Token};

/// A block whose closing directive has not been seen yet
enum Block {
    Chain {
        arms: Vec<Arm>,
        guard: Option<Expression>,
        has_else: bool,
        body: Vec<Instruction>,
        span: Span,
    },
    Loop {
        index: String,
        value: String,
        collection: Expression,
        body: Vec<Instruction>,
        span: Span,
    },
}

/// Instruction list the next instruction is appended to
fn current<'b>(root: &'b mut Vec<Instruction>, open: &'b mut [Block]) -> &'b mut Vec<Instruction> {
    match open.last_mut() {
        Some(Block::Chain { body, .. }) | Some(Block::Loop { body, .. }) => body,
        None => root,
    }
}

fn unbalanced(directive: &'static str, reason: &str, span: Span) -> CompileError {
    CompileError::UnbalancedBlock {
        directive,
        reason: reason.to_string(),
        span,
    }
}

/// Generate the instruction tree for one template
pub fn generate(tokens: Vec<Spanned<Token>>) -> Result<Vec<Instruction>, CompileError> {
    let mut root = Vec::new();
    let mut open: Vec<Block> = Vec::new();

    for Spanned { node, span } in tokens {
        match node {
            Token::Literal(text) => current(&mut root, &mut open).push(Instruction::Literal(text)),
            Token::Print(payload) => {
                current(&mut root, &mut open).push(Instruction::Print(Expression::from(payload)))
            }
            Token::Include { path, context } => {
                current(&mut root, &mut open).push(Instruction::Include {
                    path,
                    context: context.map(Expression::from),
                })
            }
            Token::If(payload) => {
                open.push(Block::Chain {
                    arms: Vec::new(),
                    guard: Some(Expression::from(payload)),
                    has_else: false,
                    body: Vec::new(),
                    span,
                });
                trace!(depth = open.len(), "open if");
            }
            Token::ElseIf(payload) => match open.last_mut() {
                Some(Block::Chain {
                    arms,
                    guard,
                    has_else,
                    body,
                    ..
                }) => {
                    if *has_else {
                        return Err(unbalanced("elseif", "`elseif` after `else`", span));
                    }
                    arms.push(Arm {
                        guard: guard.take(),
                        body: std::mem::take(body),
                    });
                    *guard = Some(Expression::from(payload));
                }
                _ => return Err(unbalanced("elseif", "no open `if`", span)),
            },
            Token::Else => match open.last_mut() {
                Some(Block::Chain {
                    arms,
                    guard,
                    has_else,
                    body,
                    ..
                }) => {
                    if *has_else {
                        return Err(unbalanced("else", "second `else` in one chain", span));
                    }
                    arms.push(Arm {
                        guard: guard.take(),
                        body: std::mem::take(body),
                    });
                    *has_else = true;
                }
                _ => return Err(unbalanced("else", "no open `if`", span)),
            },
            Token::EndIf => match open.pop() {
                Some(Block::Chain {
                    mut arms,
                    guard,
                    body,
                    ..
                }) => {
                    arms.push(Arm { guard, body });
                    current(&mut root, &mut open).push(Instruction::Branch(arms));
                    trace!(depth = open.len(), "close if");
                }
                Some(Block::Loop { .. }) => {
                    return Err(unbalanced("endif", "expected `endfor` first", span))
                }
                None => return Err(unbalanced("endif", "no open `if`", span)),
            },
            Token::For {
                index,
                value,
                collection,
            } => {
                open.push(Block::Loop {
                    index,
                    value,
                    collection: Expression::from(collection),
                    body: Vec::new(),
                    span,
                });
                trace!(depth = open.len(), "open for");
            }
            Token::EndFor => match open.pop() {
                Some(Block::Loop {
                    index,
                    value,
                    collection,
                    body,
                    ..
                }) => {
                    current(&mut root, &mut open).push(Instruction::Loop {
                        index,
                        value,
                        collection,
                        body,
                    });
                    trace!(depth = open.len(), "close for");
                }
                Some(Block::Chain { .. }) => {
                    return Err(unbalanced("endfor", "expected `endif` first", span))
                }
                None => return Err(unbalanced("endfor", "no open `for`", span)),
            },
        }
    }

    match open.pop() {
        Some(Block::Chain { span, .. }) => Err(unbalanced("if", "missing `endif`", span)),
        Some(Block::Loop { span, .. }) => Err(unbalanced("for", "missing `endfor`", span)),
        None => {
            debug!(instructions = root.len(), "generated instruction tree");
            Ok(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenize;
    use pretty_assertions::assert_eq;

    fn gen(source: &str) -> Result<Vec<Instruction>, CompileError> {
        generate(tokenize(source).expect("Should tokenize"))
    }

    fn lit(s: &str) -> Instruction {
        Instruction::Literal(s.to_string())
    }

    #[test]
    fn test_flat_sequence() {
        let program = gen("a ${name} b").expect("Should generate");
        assert_eq!(
            program,
            vec![
                lit("a "),
                Instruction::Print(Expression::compile("name", 4)),
                lit(" b"),
            ]
        );
    }

    #[test]
    fn test_if_elseif_else_chain() {
        let program = gen("${if a}A${elseif b}B${else}C${endif}").expect("Should generate");
        assert_eq!(
            program,
            vec![Instruction::Branch(vec![
                Arm {
                    guard: Some(Expression::compile("a", 5)),
                    body: vec![lit("A")],
                },
                Arm {
                    guard: Some(Expression::compile("b", 17)),
                    body: vec![lit("B")],
                },
                Arm {
                    guard: None,
                    body: vec![lit("C")],
                },
            ])]
        );
    }

    #[test]
    fn test_nested_loop_in_branch() {
        let program = gen("${if ok}${for i, v in xs}[${v}]${endfor}${endif}!").expect("Should generate");
        assert_eq!(program.len(), 2);
        match &program[0] {
            Instruction::Branch(arms) => {
                assert_eq!(arms.len(), 1);
                match &arms[0].body[..] {
                    [Instruction::Loop { index, value, body, .. }] => {
                        assert_eq!(index, "i");
                        assert_eq!(value, "v");
                        assert_eq!(body.len(), 3);
                    }
                    other => panic!("Expected loop, got {:?}", other),
                }
            }
            other => panic!("Expected branch, got {:?}", other),
        }
        assert_eq!(program[1], lit("!"));
    }

    #[test]
    fn test_invalid_expression_is_deferred() {
        let program = gen("${ a + }").expect("Should generate");
        match &program[0] {
            Instruction::Print(expr) => {
                assert!(!expr.is_valid());
                assert_eq!(expr.source(), "a +");
                assert_eq!(expr.offset(), 3);
            }
            other => panic!("Expected print, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_endif() {
        let err = gen("x ${if a}y").expect_err("Should fail");
        assert_eq!(
            err,
            CompileError::UnbalancedBlock {
                directive: "if",
                reason: "missing `endif`".to_string(),
                span: 2..9,
            }
        );
    }

    #[test]
    fn test_stray_closers() {
        assert!(matches!(
            gen("${endif}"),
            Err(CompileError::UnbalancedBlock { directive: "endif", .. })
        ));
        assert!(matches!(
            gen("${endfor}"),
            Err(CompileError::UnbalancedBlock { directive: "endfor", .. })
        ));
        assert!(matches!(
            gen("${else}"),
            Err(CompileError::UnbalancedBlock { directive: "else", .. })
        ));
    }

    #[test]
    fn test_crossed_blocks() {
        assert!(matches!(
            gen("${if a}${for i, v in xs}${endif}${endfor}"),
            Err(CompileError::UnbalancedBlock { directive: "endif", .. })
        ));
        assert!(matches!(
            gen("${for i, v in xs}${if a}${endfor}"),
            Err(CompileError::UnbalancedBlock { directive: "endfor", .. })
        ));
    }

    #[test]
    fn test_else_must_be_last() {
        assert!(matches!(
            gen("${if a}${else}${elseif b}${endif}"),
            Err(CompileError::UnbalancedBlock { directive: "elseif", .. })
        ));
        assert!(matches!(
            gen("${if a}${else}${else}${endif}"),
            Err(CompileError::UnbalancedBlock { directive: "else", .. })
        ));
    }

    #[test]
    fn test_elseif_inside_loop_needs_own_if() {
        assert!(matches!(
            gen("${if a}${for i, v in xs}${elseif b}${endfor}${endif}"),
            Err(CompileError::UnbalancedBlock { directive: "elseif", .. })
        ));
    }
}
