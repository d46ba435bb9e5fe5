// ============================================================================
// Lexer
// ============================================================================

/// A raw token. String tokens keep their quotes and escapes; the parser
/// decodes them so that an unterminated string fails at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `~@`
    SpliceUnquote,
    /// One of `[ ] { } ( ) ' ` ~ ^ @`
    Special(char),
    /// A double-quoted string, possibly missing its closing quote
    Str(String),
    /// Any other maximal run of non-delimiter characters
    Atom(String),
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> char {
        if self.position < self.input.len() {
            self.input[self.position]
        } else {
            '\0'
        }
    }

    fn peek_ahead(&self, n: usize) -> char {
        if self.position + n < self.input.len() {
            self.input[self.position + n]
        } else {
            '\0'
        }
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Whitespace and commas separate tokens; `;` comments run to end of line
    fn skip_whitespace(&mut self) {
        loop {
            while !self.is_eof() && is_separator(self.current_char()) {
                self.advance();
            }

            if !self.is_eof() && self.current_char() == ';' {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while !self.is_eof() && self.current_char() != '\n' {
            self.advance();
        }
    }

    /// Read a string token verbatim. A backslash always takes the next
    /// character with it, so `\"` does not terminate the string.
    fn read_string(&mut self) -> Token {
        let mut text = String::from('"');
        self.advance();

        while !self.is_eof() {
            let ch = self.current_char();
            text.push(ch);
            self.advance();
            match ch {
                '\\' if !self.is_eof() => {
                    text.push(self.current_char());
                    self.advance();
                }
                '"' => break,
                _ => {}
            }
        }

        Token::Str(text)
    }

    fn read_atom(&mut self) -> Token {
        let mut text = String::new();
        while !self.is_eof() && !is_delimiter(self.current_char()) {
            text.push(self.current_char());
            self.advance();
        }
        Token::Atom(text)
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        if self.is_eof() {
            return None;
        }

        let ch = self.current_char();
        let token = match ch {
            '~' if self.peek_ahead(1) == '@' => {
                self.advance();
                self.advance();
                Token::SpliceUnquote
            }
            '[' | ']' | '{' | '}' | '(' | ')' | '\'' | '`' | '~' | '^' | '@' => {
                self.advance();
                Token::Special(ch)
            }
            '"' => self.read_string(),
            _ => self.read_atom(),
        };
        Some(token)
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Characters that end an atom. `~`, `^` and `@` only start a token; inside
/// an atom they are ordinary characters.
fn is_delimiter(c: char) -> bool {
    is_separator(c) || matches!(c, '[' | ']' | '{' | '}' | '(' | ')' | '\'' | '"' | '`' | ';')
}

/// Split `input` into tokens, discarding whitespace, commas and comments
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}
