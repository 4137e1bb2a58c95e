//! Label definitions and statement blocks
//!
//! ```text
//! functionDef ::= IDENT ':' block
//! block       ::= '{' statement* '}'
//! ```
//!
//! A label's name is visible inside its own body, so a label may jump to
//! itself. Each block runs in a nested [`Environment`](super::environment::Environment)
//! scope.

use crate::parser::ast::{Block, FunctionDef};
use crate::parser::parser::{ParseError, Parser};
use crate::parser::token::TokenKind;
use std::rc::Rc;

impl Parser<'_> {
    /// Parse `name: { ... }`
    pub(crate) fn parse_function_definition(&mut self) -> Result<Option<FunctionDef>, ParseError> {
        self.attempt(|p| {
            let Some(ident) = p.leading(TokenKind::Identifier)? else {
                return Ok(None);
            };
            p.expect(TokenKind::Operator(':'), &ident, "Function name missing colon")?;

            // Registered before the body so the body may refer to it
            p.env.define(ident.text.clone(), None);

            let Some(body) = p.parse_block()? else {
                return Err(p.missing(&ident, "Function name missing statement block")?);
            };

            let body = Rc::new(body);
            p.env.define(ident.text.clone(), Some(Rc::clone(&body)));
            Ok(Some(FunctionDef {
                name: ident.text,
                body,
                line: ident.line,
            }))
        })
    }

    /// Parse `{ statement* }` in its own label scope
    pub(crate) fn parse_block(&mut self) -> Result<Option<Block>, ParseError> {
        self.attempt(|p| {
            let Some(open) = p.leading(TokenKind::Operator('{'))? else {
                return Ok(None);
            };

            p.env.nest();
            let mut statements = Vec::new();
            while let Some(statement) = p.parse_statement()? {
                statements.push(statement);
            }
            p.env.unnest();

            p.expect(TokenKind::Operator('}'), &open, "Unmatched {")?;
            Ok(Some(Block {
                statements,
                line: open.line,
            }))
        })
    }
}
