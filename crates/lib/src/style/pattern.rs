//! Class-name pattern parsing.
//!
//! A pattern is literal text interleaved with bracketed placeholders:
//!
//! - `[local]` - the class name as written in the source stylesheet (required)
//! - `[hash]` - a uniqueness token derived from the source path and local name
//! - `[name]` - the source stylesheet's file stem
//! - `[format]` - the module format of the pass (makes names format-dependent)
//!
//! ```
//! use distmatrix_lib::style::pattern::{StylePattern, Token};
//!
//! let pattern = StylePattern::parse("tip__[local]_[hash]").unwrap();
//! assert_eq!(pattern.tokens()[0], Token::Literal("tip__".to_string()));
//! assert_eq!(pattern.tokens()[1], Token::Local);
//! ```

use thiserror::Error;

/// One parsed piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  Literal(String),
  Local,
  Hash,
  Name,
  Format,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
  #[error("class-name pattern is empty")]
  Empty,

  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("unknown placeholder '[{0}]'")]
  UnknownPlaceholder(String),

  #[error("class-name pattern must contain [local]")]
  MissingLocal,

  #[error("character {0:?} is not allowed in a class name")]
  InvalidCharacter(char),
}

/// A validated class-name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePattern {
  raw: String,
  tokens: Vec<Token>,
}

impl StylePattern {
  pub fn parse(input: &str) -> Result<Self, StyleError> {
    if input.is_empty() {
      return Err(StyleError::Empty);
    }

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = input.char_indices();

    while let Some((pos, ch)) = chars.next() {
      if ch != '[' {
        if ch.is_whitespace() || matches!(ch, '.' | ',' | ':' | '{' | '}' | ']' | '#') {
          return Err(StyleError::InvalidCharacter(ch));
        }
        literal.push(ch);
        continue;
      }

      let mut name = String::new();
      let mut closed = false;
      for (_, c) in chars.by_ref() {
        if c == ']' {
          closed = true;
          break;
        }
        name.push(c);
      }
      if !closed {
        return Err(StyleError::Unclosed(pos));
      }

      if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(&mut literal)));
      }

      tokens.push(match name.as_str() {
        "local" => Token::Local,
        "hash" => Token::Hash,
        "name" => Token::Name,
        "format" => Token::Format,
        _ => return Err(StyleError::UnknownPlaceholder(name)),
      });
    }

    if !literal.is_empty() {
      tokens.push(Token::Literal(literal));
    }

    if !tokens.contains(&Token::Local) {
      return Err(StyleError::MissingLocal);
    }

    Ok(Self {
      raw: input.to_string(),
      tokens,
    })
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  pub fn tokens(&self) -> &[Token] {
    &self.tokens
  }

  pub fn uses(&self, token: &Token) -> bool {
    self.tokens.contains(token)
  }
}
