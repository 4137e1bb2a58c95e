//! Token registry
//!
//! A [`TokenTable`] is an ordered, immutable list of [`Matcher`]s. Each matcher
//! recognises one lexical category directly on a [`Buffer`]:
//!
//! - [`Matcher::matches`] looks ahead and always restores the buffer position
//! - [`Matcher::extract`] consumes the match, or restores the position and
//!   returns `None` when the match does not hold
//!
//! Fixed strings are resolved by longest match (`<=` wins over `<`) and
//! alphabetic keywords need a word boundary (`writer` is an identifier).
//!
//! # Category codes
//!
//! | Category                  | Code                     |
//! |---------------------------|--------------------------|
//! | single-character operator | the character's value    |
//! | keyword                   | 303 and up, table order  |
//! | quoted literal            | 300                      |
//! | integer                   | 301                      |
//! | identifier                | 302                      |
//! | comment                   | -1 (never surfaced)      |

use super::buffer::Buffer;
use std::fmt;

/// Numeric category code carried by every lexeme
pub type TokenCode = i32;

pub const LITERAL_CODE: TokenCode = 300;
pub const INTEGER_CODE: TokenCode = 301;
pub const IDENTIFIER_CODE: TokenCode = 302;
pub const KEYWORD_BASE: TokenCode = 303;
pub const COMMENT_CODE: TokenCode = -1;

/// Single-character operators, in table order
pub const OPERATORS: [char; 13] = [
    ';', '^', '>', '<', ':', '=', '!', '{', '}', '(', ')', '&', '|',
];

/// Fixed-string keywords. Declaration order fixes their codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Else,
    While,
    Read,
    Write,
    Goto,
    Left,
    Right,
    NotEq,
    ShiftLeft,
    ShiftRight,
    LessEq,
    GreaterEq,
    True,
    False,
    Halt,
}

impl Keyword {
    pub const ALL: [Keyword; 16] = [
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::Read,
        Keyword::Write,
        Keyword::Goto,
        Keyword::Left,
        Keyword::Right,
        Keyword::NotEq,
        Keyword::ShiftLeft,
        Keyword::ShiftRight,
        Keyword::LessEq,
        Keyword::GreaterEq,
        Keyword::True,
        Keyword::False,
        Keyword::Halt,
    ];

    pub fn text(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Read => "read",
            Keyword::Write => "write",
            Keyword::Goto => "goto",
            Keyword::Left => "left",
            Keyword::Right => "right",
            Keyword::NotEq => "!=",
            Keyword::ShiftLeft => "<<",
            Keyword::ShiftRight => ">>",
            Keyword::LessEq => "<=",
            Keyword::GreaterEq => ">=",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Halt => "halt",
        }
    }

    pub fn code(self) -> TokenCode {
        KEYWORD_BASE + self as TokenCode
    }
}

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Operator(char),
    Keyword(Keyword),
    Literal,
    Integer,
    Identifier,
    Comment,
}

impl TokenKind {
    pub fn code(self) -> TokenCode {
        match self {
            TokenKind::Operator(c) => c as TokenCode,
            TokenKind::Keyword(k) => k.code(),
            TokenKind::Literal => LITERAL_CODE,
            TokenKind::Integer => INTEGER_CODE,
            TokenKind::Identifier => IDENTIFIER_CODE,
            TokenKind::Comment => COMMENT_CODE,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Operator(c) => write!(f, "'{}'", c),
            TokenKind::Keyword(k) => write!(f, "'{}'", k.text()),
            TokenKind::Literal => write!(f, "character literal"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Comment => write!(f, "comment"),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Recogniser for one token category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Fixed { kind: TokenKind, text: &'static str },
    Literal,
    Comment,
    Identifier,
    Integer,
}

impl Matcher {
    pub fn kind(&self) -> TokenKind {
        match self {
            Matcher::Fixed { kind, .. } => *kind,
            Matcher::Literal => TokenKind::Literal,
            Matcher::Comment => TokenKind::Comment,
            Matcher::Identifier => TokenKind::Identifier,
            Matcher::Integer => TokenKind::Integer,
        }
    }

    /// Non-destructive lookahead
    pub fn matches(&self, buffer: &mut Buffer) -> bool {
        let hit = self.extract(buffer).is_some();
        buffer.rewind();
        hit
    }

    /// Consume the match and return its text.
    ///
    /// On a miss the buffer is rewound to where it was and `None` is returned.
    pub fn extract(&self, buffer: &mut Buffer) -> Option<String> {
        buffer.set_checkpoint();
        let text = match self {
            Matcher::Fixed { text, .. } => Self::extract_fixed(buffer, text),
            Matcher::Literal => Self::extract_literal(buffer),
            Matcher::Comment => Self::extract_comment(buffer),
            Matcher::Identifier => {
                Self::extract_run(buffer, is_identifier_start, is_identifier_continue)
            }
            Matcher::Integer => {
                Self::extract_run(buffer, |c| c.is_ascii_digit(), |c| c.is_ascii_digit())
            }
        };

        if text.is_none() {
            buffer.rewind();
        }
        text
    }

    fn extract_fixed(buffer: &mut Buffer, text: &str) -> Option<String> {
        for expected in text.chars() {
            if buffer.read_char() != Some(expected) {
                return None;
            }
        }

        // `if` must not swallow the front of `iffy`
        let is_word = text.chars().all(is_identifier_continue);
        if is_word && buffer.peek(0).is_some_and(is_identifier_continue) {
            return None;
        }

        Some(text.to_string())
    }

    fn extract_literal(buffer: &mut Buffer) -> Option<String> {
        if buffer.read_char()? != '\'' {
            return None;
        }
        let glyph = buffer.read_char()?;
        if buffer.read_char()? != '\'' {
            return None;
        }
        Some(format!("'{}'", glyph))
    }

    fn extract_comment(buffer: &mut Buffer) -> Option<String> {
        if buffer.read_char()? != '#' {
            return None;
        }
        let mut text = String::from("#");
        while let Some(c) = buffer.read_char() {
            text.push(c);
            if c == '\n' || c == '\x0c' {
                break;
            }
        }
        Some(text)
    }

    /// One `first` character followed by any number of `rest` characters.
    /// The character that ends the run is handed back to the buffer.
    fn extract_run(
        buffer: &mut Buffer,
        first: impl Fn(char) -> bool,
        rest: impl Fn(char) -> bool,
    ) -> Option<String> {
        let c = buffer.read_char()?;
        if !first(c) {
            return None;
        }

        let mut text = String::new();
        text.push(c);
        while let Some(c) = buffer.read_char() {
            if rest(c) {
                text.push(c);
            } else {
                buffer.push_str(&c.to_string(), false, false);
                break;
            }
        }
        Some(text)
    }
}

/// Ordered, immutable list of matchers
#[derive(Debug, Clone)]
pub struct TokenTable {
    matchers: Vec<Matcher>,
}

impl TokenTable {
    /// The language's table: operators, keywords, literal, comment,
    /// identifier, integer.
    pub fn standard() -> Self {
        let mut matchers = Vec::new();

        for (op, text) in OPERATORS.iter().zip([
            ";", "^", ">", "<", ":", "=", "!", "{", "}", "(", ")", "&", "|",
        ]) {
            matchers.push(Matcher::Fixed {
                kind: TokenKind::Operator(*op),
                text,
            });
        }
        for keyword in Keyword::ALL {
            matchers.push(Matcher::Fixed {
                kind: TokenKind::Keyword(keyword),
                text: keyword.text(),
            });
        }
        matchers.push(Matcher::Literal);
        matchers.push(Matcher::Comment);
        matchers.push(Matcher::Identifier);
        matchers.push(Matcher::Integer);

        TokenTable { matchers }
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Pick the matcher for the input at the buffer's read position.
    ///
    /// The longest fixed string wins (earlier entries break ties). Otherwise
    /// the first other matcher that matches, in table order.
    pub fn classify(&self, buffer: &mut Buffer) -> Option<&Matcher> {
        let mut best: Option<(&Matcher, usize)> = None;
        for matcher in &self.matchers {
            if let Matcher::Fixed { text, .. } = matcher {
                let len = text.chars().count();
                if best.map_or(true, |(_, best_len)| len > best_len) && matcher.matches(buffer) {
                    best = Some((matcher, len));
                }
            }
        }
        if let Some((matcher, _)) = best {
            return Some(matcher);
        }

        self.matchers
            .iter()
            .filter(|m| !matches!(m, Matcher::Fixed { .. }))
            .find(|m| m.matches(buffer))
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::standard()
    }
}
