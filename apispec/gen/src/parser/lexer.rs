//! Tokenizer for schema units.
//!
//! Whitespace, `//` line comments and plain `/* */` block comments are
//! dropped. `/** */` doc blocks are kept as [`TokenKind::Doc`] so the parser
//! can attach them to the declaration that follows.

use tracing::trace;

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident(String),
    /// Quoted string literal, without the quotes.
    Str(String),
    /// Numeric literal.
    Number(String),
    /// Contents of a `/** ... */` block, without the delimiters.
    Doc(String),
    /// Any other single character.
    Punct(char),
}

/// A token with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// A failure that prevents tokenizing the rest of the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl Cursor<'_> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consumes through the closing `*/` and returns the text before it.
    fn block_comment(&mut self, start: usize) -> Result<String, LexError> {
        let mut text = String::new();
        while let Some(c) = self.bump() {
            if c == '*' && self.peek() == Some('/') {
                self.bump();
                return Ok(text);
            }
            text.push(c);
        }
        Err(LexError {
            line: start,
            message: "unterminated block comment".to_string(),
        })
    }
}

/// Splits a schema unit into tokens.
///
/// ## Examples
///
/// ```
/// use apispec_gen::parser::lexer::{TokenKind, tokenize};
///
/// let tokens = tokenize("enum A { b = 'c' }").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Ident("enum".into()));
/// assert_eq!(tokens[5].kind, TokenKind::Str("c".into()));
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor {
        chars: source.chars().peekable(),
        line: 1,
    };
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek() {
        let line = cursor.line;

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        if c == '/' {
            cursor.bump();
            match cursor.peek() {
                Some('/') => {
                    while let Some(c) = cursor.peek() {
                        if c == '\n' {
                            break;
                        }
                        cursor.bump();
                    }
                }
                Some('*') => {
                    cursor.bump();
                    // `/**` opens a doc block, except for the empty `/**/`.
                    let is_doc = cursor.peek() == Some('*');
                    let mut text = cursor.block_comment(line)?;
                    if is_doc && !text.is_empty() {
                        text.remove(0);
                        trace!(line, "doc block");
                        tokens.push(Token {
                            kind: TokenKind::Doc(text),
                            line,
                        });
                    }
                }
                _ => tokens.push(Token {
                    kind: TokenKind::Punct('/'),
                    line,
                }),
            }
            continue;
        }

        if c == '\'' || c == '"' || c == '`' {
            cursor.bump();
            let mut value = String::new();
            loop {
                match cursor.bump() {
                    Some('\\') => {
                        if let Some(escaped) = cursor.bump() {
                            value.push(escaped);
                        }
                    }
                    Some(q) if q == c => break,
                    Some('\n') if c != '`' => {
                        return Err(LexError {
                            line,
                            message: "unterminated string literal".to_string(),
                        });
                    }
                    Some(other) => value.push(other),
                    None => {
                        return Err(LexError {
                            line,
                            message: "unterminated string literal".to_string(),
                        });
                    }
                }
            }
            tokens.push(Token {
                kind: TokenKind::Str(value),
                line,
            });
            continue;
        }

        if c.is_ascii_digit() {
            let mut value = String::new();
            while let Some(d) = cursor.peek() {
                if d.is_ascii_alphanumeric() || d == '.' || d == '_' {
                    value.push(d);
                    cursor.bump();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Number(value),
                line,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut value = String::new();
            while let Some(d) = cursor.peek() {
                if d.is_alphanumeric() || d == '_' || d == '$' {
                    value.push(d);
                    cursor.bump();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Ident(value),
                line,
            });
            continue;
        }

        cursor.bump();
        tokens.push(Token {
            kind: TokenKind::Punct(c),
            line,
        });
    }

    trace!(count = tokens.len(), "tokenized unit");
    Ok(tokens)
}
