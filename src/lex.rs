use std::fmt::Display;

use miette::SourceSpan;

use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of the first character of `literal` in the expression.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Ident,
    /// A numeric literal. The value is parsed during evaluation, so a
    /// malformed literal like `3.2.1` still lexes as one token.
    Number,
}

impl Token<'_> {
    pub(crate) fn span(&self) -> SourceSpan {
        (self.offset..self.offset + self.literal.len()).into()
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
            TokenKind::Plus => write!(f, "PLUS {lit}"),
            TokenKind::Minus => write!(f, "MINUS {lit}"),
            TokenKind::Star => write!(f, "STAR {lit}"),
            TokenKind::Slash => write!(f, "SLASH {lit}"),
            TokenKind::Ident => write!(f, "IDENTIFIER {lit}"),
            TokenKind::Number => write!(f, "NUMBER {lit}"),
        }
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let literal = &self.rest[..c.len_utf8()];
            let offset = self.byte;
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Start {
                Ident,
                Number,
            }

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            let started = match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '+' => return process(TokenKind::Plus),
                '-' => return process(TokenKind::Minus),
                '*' => return process(TokenKind::Star),
                '/' => return process(TokenKind::Slash),
                'a'..='z' | 'A'..='Z' => Start::Ident,
                '0'..='9' | '.' => Start::Number,
                ' ' | '\r' | '\t' | '\n' => continue, // Skip whitespace
                c => {
                    return Some(Err(EvalError::InvalidCharacter {
                        src: EvalError::source_of(self.whole),
                        at: SourceSpan::from(self.byte - c.len_utf8()..self.byte),
                        token: c,
                    }));
                }
            };

            // A literal keeps absorbing letters, digits, and dots until the
            // next operator, parenthesis, or whitespace; its first character
            // decides whether it reads as a number or a name. `x1` is one
            // variable, `1x` is one (bad) numeric literal.
            let first_non_literal = cur
                .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '.'))
                .unwrap_or(cur.len());

            let literal = &cur[..first_non_literal];

            let extra_bytes = literal.len() - c.len_utf8();
            self.byte += extra_bytes;
            self.rest = &self.rest[extra_bytes..];

            let kind = match started {
                Start::Ident => TokenKind::Ident,
                Start::Number => TokenKind::Number,
            };

            return Some(Ok(Token {
                kind,
                literal,
                offset,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .map(|token| token.expect("expected a clean token stream").kind)
            .collect()
    }

    #[test]
    fn single_character_tokens() {
        assert_eq!(
            kinds("()+-*/"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn numbers_and_identifiers_split_on_operators() {
        let tokens: Vec<_> = Lexer::new("3.5*sin(x)")
            .collect::<Result<_, _>>()
            .expect("lexes cleanly");
        let literals: Vec<_> = tokens.iter().map(|t| t.literal).collect();
        assert_eq!(literals, vec!["3.5", "*", "sin", "(", "x", ")"]);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn whitespace_separates_runs() {
        let tokens: Vec<_> = Lexer::new("  12 \t foo\n3 ")
            .collect::<Result<_, _>>()
            .expect("lexes cleanly");
        let literals: Vec<_> = tokens.iter().map(|t| t.literal).collect();
        assert_eq!(literals, vec!["12", "foo", "3"]);
    }

    #[test]
    fn first_character_classifies_a_run() {
        let tokens: Vec<_> = Lexer::new("x1 1x 3.2.1")
            .collect::<Result<_, _>>()
            .expect("lexes cleanly");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].literal, "x1");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].literal, "1x");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].literal, "3.2.1");
    }

    #[test]
    fn offsets_point_into_the_source() {
        let tokens: Vec<_> = Lexer::new("10 + abc")
            .collect::<Result<_, _>>()
            .expect("lexes cleanly");
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 3);
        assert_eq!(tokens[2].offset, 5);
    }

    #[test]
    fn rejects_foreign_characters() {
        let result: Result<Vec<_>, _> = Lexer::new("3 + @").collect();
        assert!(matches!(
            result,
            Err(EvalError::InvalidCharacter { token: '@', .. })
        ));
    }
}
