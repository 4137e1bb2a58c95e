//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, its error type, the
//! backtracking helpers and the program entry point [`Parser::build_tree`].
//!
//! # Parser Architecture
//!
//! Recursive descent over a [`Lexer`], split across `impl Parser` blocks:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: label definitions and statement blocks
//! - `statements`: move, write, goto, if, while, halt
//! - `expressions`: prefix-notation expressions
//!
//! # Failure modes
//!
//! Every production runs inside a lexer scope via [`Parser::attempt`]. A
//! production whose leading token does not fit returns `Ok(None)` and its
//! scope is rewound so the next alternative sees the same lexemes. Once the
//! leading token matched the production is committed, and any missing piece
//! after that is a [`ParseError`].

use crate::parser::ast::{Block, Item, Program};
use crate::parser::environment::Environment;
use crate::parser::lexer::{LexError, Lexeme, Lexer};
use crate::parser::token::TokenKind;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input that is no token at all
    Lex,
    TypeMismatch,
    /// A committed production is missing a required token
    MissingToken,
    UnresolvedLabel,
    /// Input left over after the last complete statement
    UnexpectedToken,
    InvalidLiteral,
}

/// Parser error type
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub text: String,
    pub source: Rc<str>,
}

impl ParseError {
    /// Error located at `lexeme`
    pub fn at(lexeme: &Lexeme, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            line: lexeme.line,
            text: lexeme.text.clone(),
            source: lexeme.source.clone(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error in {} at line {} near '{}': {}",
            self.source, self.line, self.text, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            kind: ParseErrorKind::Lex,
            message: err.message,
            line: err.line,
            text: err.text,
            source: err.source,
        }
    }
}

/// Recursive descent parser for the tape language
pub struct Parser<'t> {
    pub(crate) lexer: Lexer<'t>,
    /// Labels visible at the current point; `None` while the body is still being parsed
    pub(crate) env: Environment<Option<Rc<Block>>>,
}

impl<'t> Parser<'t> {
    pub fn new(lexer: Lexer<'t>) -> Self {
        Parser {
            lexer,
            env: Environment::new(),
        }
    }

    /// Parse the whole input into a program.
    ///
    /// Anything left over once no statement or label definition matches is an
    /// error.
    pub fn build_tree(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        loop {
            if let Some(def) = self.parse_function_definition()? {
                program.items.push(Item::Function(def));
            } else if let Some(statement) = self.parse_statement()? {
                program.items.push(Item::Statement(statement));
            } else {
                break;
            }
        }

        if self.lexer.has_next()? {
            if let Some(lexeme) = self.lexer.next()? {
                return Err(ParseError::at(
                    &lexeme,
                    ParseErrorKind::UnexpectedToken,
                    "Unexpected token",
                ));
            }
        }

        Ok(program)
    }

    /// Label table built so far
    pub fn environment(&self) -> &Environment<Option<Rc<Block>>> {
        &self.env
    }

    // ===== Helper methods =====

    /// Run `production` inside a lexer scope, rewinding it on a soft failure
    pub(crate) fn attempt<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<Option<T>, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        self.lexer.open_scope();
        let result = production(self);
        if let Ok(None) = result {
            self.lexer.rewind_scope();
        }
        self.lexer.close_scope();
        result
    }

    /// Next lexeme if it is of `kind`, without committing to anything
    pub(crate) fn leading(&mut self, kind: TokenKind) -> Result<Option<Lexeme>, ParseError> {
        Ok(self.lexer.next()?.filter(|lexeme| lexeme.kind == kind))
    }

    /// Required token of a committed production
    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        after: &Lexeme,
        message: &str,
    ) -> Result<Lexeme, ParseError> {
        match self.lexer.next()? {
            Some(lexeme) if lexeme.kind == kind => Ok(lexeme),
            Some(lexeme) => Err(ParseError::at(&lexeme, ParseErrorKind::MissingToken, message)),
            None => Err(ParseError::at(after, ParseErrorKind::MissingToken, message)),
        }
    }
}
