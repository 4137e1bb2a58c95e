//! Lexer with scoped backtracking
//!
//! Turns a [`Buffer`] into [`Lexeme`]s using a [`TokenTable`]. Whitespace and
//! comments are stripped and never reach the parser.
//!
//! # Backtracking
//!
//! Every lexeme that has been materialized is kept in a replay vector with a
//! read cursor. The parser brackets each alternative production with a scope:
//!
//! - [`Lexer::open_scope`] remembers the cursor
//! - [`Lexer::rewind_scope`] moves the cursor back to that mark, so the same
//!   lexemes are returned again
//! - [`Lexer::close_scope`] drops the mark and keeps everything consumed, which
//!   merges it into the enclosing scope
//!
//! Scopes nest to any depth. Once no scope is open, replayed lexemes that have
//! been consumed are discarded.

use super::buffer::Buffer;
use super::token::{TokenCode, TokenKind, TokenTable};
use std::fmt;
use std::rc::Rc;

/// One concrete token occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub source: Rc<str>,
}

impl Lexeme {
    pub fn code(&self) -> TokenCode {
        self.kind.code()
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line {} token {} text {}",
            self.source,
            self.line,
            self.code(),
            self.text
        )
    }
}

/// Input that matches no token and is not a comment
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub text: String,
    pub source: Rc<str>,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error in {} at line {} near '{}': {}",
            self.source, self.line, self.text, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer over a buffer, with replay for the parser's backtracking
pub struct Lexer<'t> {
    buffer: Buffer,
    table: &'t TokenTable,
    lexemes: Vec<Lexeme>,
    cursor: usize,
    scopes: Vec<usize>,
}

impl<'t> Lexer<'t> {
    pub fn new(buffer: Buffer, table: &'t TokenTable) -> Self {
        Lexer {
            buffer,
            table,
            lexemes: Vec::new(),
            cursor: 0,
            scopes: Vec::new(),
        }
    }

    /// Line the lexer has reached in the underlying buffer
    pub fn line(&self) -> usize {
        self.buffer.line()
    }

    pub fn source(&self) -> Rc<str> {
        self.buffer.name()
    }

    /// Skip whitespace and comments until real input or the end.
    fn skip_trivia(&mut self) {
        loop {
            while self.buffer.peek(0).is_some_and(char::is_whitespace) {
                self.buffer.read_char();
            }

            match self.table.classify(&mut self.buffer) {
                Some(matcher) if matcher.kind() == TokenKind::Comment => {
                    matcher.extract(&mut self.buffer);
                }
                _ => return,
            }
        }
    }

    fn classification_error(&mut self) -> LexError {
        LexError {
            message: "Does not match any valid token".to_string(),
            line: self.buffer.line(),
            text: self.buffer.peek(0).map(String::from).unwrap_or_default(),
            source: self.buffer.name(),
        }
    }

    /// Whether another non-comment token follows.
    ///
    /// Running out of input is not an error; input that matches nothing is.
    pub fn has_next(&mut self) -> Result<bool, LexError> {
        if self.cursor < self.lexemes.len() {
            return Ok(true);
        }

        self.skip_trivia();
        if self.buffer.is_empty() {
            return Ok(false);
        }

        match self.table.classify(&mut self.buffer) {
            Some(_) => Ok(true),
            None => Err(self.classification_error()),
        }
    }

    /// Next lexeme: replayed if the parser backtracked over it, fresh otherwise.
    pub fn next(&mut self) -> Result<Option<Lexeme>, LexError> {
        if let Some(lexeme) = self.lexemes.get(self.cursor) {
            self.cursor += 1;
            return Ok(Some(lexeme.clone()));
        }

        if !self.has_next()? {
            return Ok(None);
        }

        let table = self.table;
        let Some(matcher) = table.classify(&mut self.buffer) else {
            return Err(self.classification_error());
        };
        let line = self.buffer.line();
        let Some(text) = matcher.extract(&mut self.buffer) else {
            return Err(self.classification_error());
        };

        let lexeme = Lexeme {
            kind: matcher.kind(),
            text,
            line,
            source: self.buffer.name(),
        };

        if self.scopes.is_empty() {
            self.lexemes.clear();
            self.cursor = 0;
            return Ok(Some(lexeme));
        }

        self.lexemes.push(lexeme.clone());
        self.cursor += 1;
        Ok(Some(lexeme))
    }

    /// Start recording lexemes for a possible backtrack.
    pub fn open_scope(&mut self) {
        self.scopes.push(self.cursor);
    }

    /// Backtrack: lexemes read since the innermost scope opened are returned again.
    pub fn rewind_scope(&mut self) {
        if let Some(&mark) = self.scopes.last() {
            self.cursor = mark;
        }
    }

    /// Keep what the innermost scope consumed and hand it to the enclosing scope.
    pub fn close_scope(&mut self) {
        self.scopes.pop();
        if self.scopes.is_empty() && self.cursor > 0 {
            self.lexemes.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    /// Depth of open scopes
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Lex the rest of the input
    pub fn tokenize(&mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut lexemes = Vec::new();
        while let Some(lexeme) = self.next()? {
            lexemes.push(lexeme);
        }
        Ok(lexemes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::Keyword;

    fn lex(source: &str) -> Vec<Lexeme> {
        let table = TokenTable::standard();
        let mut lexer = Lexer::new(Buffer::new(source), &table);
        lexer.tokenize().unwrap()
    }

    #[test]
    fn test_write_statement() {
        let tokens = lex("write 'A';");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Write));
        assert_eq!(tokens[0].text, "write");
        assert_eq!(tokens[1].kind, TokenKind::Literal);
        assert_eq!(tokens[1].text, "'A'");
        assert_eq!(tokens[2].kind, TokenKind::Operator(';'));
        assert_eq!(&*tokens[2].source, "String");
    }

    #[test]
    fn test_comments_are_stripped() {
        let tokens = lex("# header\nhalt; # trailing\n# another\n;");
        let kinds: Vec<TokenKind> = tokens.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Halt),
                TokenKind::Operator(';'),
                TokenKind::Operator(';'),
            ]
        );
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn test_lines_follow_source() {
        let tokens = lex("right 1;\n\nleft\n2;");
        let lines: Vec<usize> = tokens.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 3, 4, 4]);
    }

    #[test]
    fn test_has_next_on_exhausted_and_comment_only_input() {
        let table = TokenTable::standard();
        let mut lexer = Lexer::new(Buffer::new("   # only a comment"), &table);
        assert_eq!(lexer.has_next(), Ok(false));
        assert_eq!(lexer.next(), Ok(None));
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let table = TokenTable::standard();
        let mut lexer = Lexer::new(Buffer::new("halt;\n  @"), &table);
        assert!(lexer.next().unwrap().is_some());
        assert!(lexer.next().unwrap().is_some());

        let err = lexer.has_next().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "@");
    }

    #[test]
    fn test_scopes_rewind_and_merge() {
        let table = TokenTable::standard();
        let mut lexer = Lexer::new(Buffer::new("if ( true ) { halt; }"), &table);

        lexer.open_scope();
        assert_eq!(lexer.next().unwrap().unwrap().text, "if");
        lexer.open_scope();
        assert_eq!(lexer.next().unwrap().unwrap().text, "(");
        assert_eq!(lexer.next().unwrap().unwrap().text, "true");
        lexer.rewind_scope();
        assert_eq!(lexer.next().unwrap().unwrap().text, "(");
        lexer.close_scope();

        // The outer scope now owns "if" and "("
        lexer.rewind_scope();
        assert_eq!(lexer.next().unwrap().unwrap().text, "if");
        assert_eq!(lexer.next().unwrap().unwrap().text, "(");
        assert_eq!(lexer.next().unwrap().unwrap().text, "true");
        lexer.close_scope();
        assert_eq!(lexer.scope_depth(), 0);

        let rest: Vec<String> = lexer.tokenize().unwrap().into_iter().map(|l| l.text).collect();
        assert_eq!(rest, vec![")", "{", "halt", ";", "}"]);
    }

    #[test]
    fn test_operators_use_longest_match() {
        let texts: Vec<String> = lex("<= >= != << >> < > = ! & |")
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(
            texts,
            vec!["<=", ">=", "!=", "<<", ">>", "<", ">", "=", "!", "&", "|"]
        );
    }
}
