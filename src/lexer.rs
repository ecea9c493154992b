use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Minus,
    Plus,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    Integer,
    Str,

    // Keywords
    Else,
    False,
    Fn,
    If,
    Let,
    Null,
    Return,
    True,

    // Special
    Illegal,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Identifier => "IDENT",
            TokenKind::Integer => "INT",
            TokenKind::Str => "STRING",
            TokenKind::Else => "ELSE",
            TokenKind::False => "FALSE",
            TokenKind::Fn => "FN",
            TokenKind::If => "IF",
            TokenKind::Let => "LET",
            TokenKind::Null => "NULL",
            TokenKind::Return => "RETURN",
            TokenKind::True => "TRUE",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
        };
        write!(f, "{}", text)
    }
}

/// A token is a pair of kind and literal text. Identifiers, integers and
/// strings keep their exact source slice; punctuation keeps its operator
/// text; `Eof` carries an empty literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    fn symbol(kind: TokenKind, ch: u8) -> Self {
        Self::new(kind, String::from_utf8_lossy(&[ch]))
    }
}

/// Byte-driven lexer with one character of lookahead.
///
/// Tokens are pulled on demand with [`Lexer::next_token`]; once the input is
/// exhausted the lexer produces `Eof` forever. It never fails: bytes that
/// start no token come back as `Illegal` tokens carrying the offending byte.
pub struct Lexer {
    input: Vec<u8>,
    pos: usize,
    read_pos: usize,
    ch: u8,
    keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("let", TokenKind::Let);
        keywords.insert("fn", TokenKind::Fn);
        keywords.insert("if", TokenKind::If);
        keywords.insert("else", TokenKind::Else);
        keywords.insert("return", TokenKind::Return);
        keywords.insert("true", TokenKind::True);
        keywords.insert("false", TokenKind::False);
        keywords.insert("null", TokenKind::Null);

        let mut lexer = Self {
            input: input.as_bytes().to_vec(),
            pos: 0,
            read_pos: 0,
            ch: 0,
            keywords,
        };
        lexer.read_char();
        lexer
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let token = match self.ch {
            b'=' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::EqualEqual, "==")
                } else {
                    Token::symbol(TokenKind::Equal, self.ch)
                }
            }
            b'!' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::BangEqual, "!=")
                } else {
                    Token::symbol(TokenKind::Bang, self.ch)
                }
            }
            b'<' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::LessEqual, "<=")
                } else {
                    Token::symbol(TokenKind::Less, self.ch)
                }
            }
            b'>' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::GreaterEqual, ">=")
                } else {
                    Token::symbol(TokenKind::Greater, self.ch)
                }
            }
            b'/' => {
                if self.peek_char() == b'/' {
                    // Comment goes until end of line
                    self.read_char();
                    self.read_char();
                    self.skip_comment();
                    return self.next_token();
                } else {
                    Token::symbol(TokenKind::Slash, self.ch)
                }
            }
            b'+' => Token::symbol(TokenKind::Plus, self.ch),
            b'-' => Token::symbol(TokenKind::Minus, self.ch),
            b'*' => Token::symbol(TokenKind::Star, self.ch),
            b',' => Token::symbol(TokenKind::Comma, self.ch),
            b';' => Token::symbol(TokenKind::Semicolon, self.ch),
            b'(' => Token::symbol(TokenKind::LeftParen, self.ch),
            b')' => Token::symbol(TokenKind::RightParen, self.ch),
            b'{' => Token::symbol(TokenKind::LeftBrace, self.ch),
            b'}' => Token::symbol(TokenKind::RightBrace, self.ch),
            b'"' => {
                let literal = self.read_string();
                if self.ch == 0 {
                    // Input ended before the closing quote
                    return Token::symbol(TokenKind::Illegal, b'"');
                }
                Token::new(TokenKind::Str, literal)
            }
            0 => Token::new(TokenKind::Eof, ""),
            _ => {
                if is_ident_char(self.ch) && !self.ch.is_ascii_digit() {
                    let literal = self.read_identifier();
                    let kind = self.lookup_identifier(&literal);
                    return Token::new(kind, literal);
                } else if self.ch.is_ascii_digit() {
                    let literal = self.read_integer();
                    return Token::new(TokenKind::Integer, literal);
                } else {
                    Token::symbol(TokenKind::Illegal, self.ch)
                }
            }
        };

        self.read_char();
        token
    }

    fn read_char(&mut self) {
        if self.read_pos >= self.input.len() {
            self.ch = 0;
        } else {
            self.ch = self.input[self.read_pos];
        }
        self.pos = self.read_pos;
        self.read_pos += 1;
    }

    fn peek_char(&self) -> u8 {
        if self.read_pos >= self.input.len() {
            0
        } else {
            self.input[self.read_pos]
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\n' | b'\r') {
            self.read_char();
        }
    }

    fn skip_comment(&mut self) {
        while self.ch != b'\n' && self.ch != 0 {
            self.read_char();
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while is_ident_char(self.ch) {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn read_integer(&mut self) -> String {
        let start = self.pos;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn read_string(&mut self) -> String {
        let start = self.pos + 1;
        loop {
            self.read_char();
            if self.ch == b'"' || self.ch == 0 {
                break;
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn lookup_identifier(&self, identifier: &str) -> TokenKind {
        self.keywords
            .get(identifier)
            .cloned()
            .unwrap_or(TokenKind::Identifier)
    }
}

fn is_ident_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        lex_all(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            lex_kinds("+ - * / , ; ( ) { }"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            lex_kinds("== != <= >="),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
        // The single-char forms must still come through on their own
        assert_eq!(
            lex_kinds("= ! < >"),
            vec![
                TokenKind::Equal,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            lex_kinds("let fn if else return true false null"),
            vec![
                TokenKind::Let,
                TokenKind::Fn,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Return,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_an_identifier() {
        let tokens = lex_all("letx");
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "letx"));
    }

    #[test]
    fn identifiers_and_integers() {
        let tokens = lex_all("let total_2 = 451;");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Let, "let"),
                Token::new(TokenKind::Identifier, "total_2"),
                Token::new(TokenKind::Equal, "="),
                Token::new(TokenKind::Integer, "451"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::new(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = lex_all("1 // two\n + 3");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Integer, "1"),
                Token::new(TokenKind::Plus, "+"),
                Token::new(TokenKind::Integer, "3"),
                Token::new(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn comment_at_end_of_input() {
        assert_eq!(
            lex_kinds("1 // trailing"),
            vec![TokenKind::Integer, TokenKind::Eof]
        );
    }

    #[test]
    fn string_literal() {
        let tokens = lex_all("\"hi there\"");
        assert_eq!(tokens[0], Token::new(TokenKind::Str, "hi there"));
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let tokens = lex_all("\"abc");
        assert_eq!(tokens[0], Token::new(TokenKind::Illegal, "\""));
    }

    #[test]
    fn stray_byte_is_illegal() {
        let tokens = lex_all("@");
        assert_eq!(tokens[0], Token::new(TokenKind::Illegal, "@"));
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new("1");
        assert_eq!(lexer.next_token().kind, TokenKind::Integer);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
