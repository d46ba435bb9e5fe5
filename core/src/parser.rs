use im::Vector as ImVector;

use crate::error::{Error, Result};
use crate::language::{KEYWORD_PREFIX, ListKind, MapValue, Value};
use crate::lexer::{Token, tokenize};
use crate::stack::guarded;

// ============================================================================
// Parser
// ============================================================================

/// Recursive-descent reader over a token buffer
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            tokens: tokenize(input),
            position: 0,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Result<&Token> {
        self.tokens
            .get(self.position)
            .ok_or_else(|| Error::syntax("unexpected EOF"))
    }

    fn next(&mut self) -> Result<Token> {
        let token = self.peek()?.clone();
        self.position += 1;
        Ok(token)
    }

    /// Read one form. Nesting deeper than the thread's recursion limit is an
    /// error rather than a host stack overflow.
    pub fn read_form(&mut self) -> Result<Value> {
        guarded(|| self.read_form_unguarded())
    }

    fn read_form_unguarded(&mut self) -> Result<Value> {
        match self.peek()? {
            Token::Special('(') => self.read_list(ListKind::List, ')'),
            Token::Special('[') => self.read_list(ListKind::Vector, ']'),
            Token::Special('{') => self.read_map(),
            Token::Special('\'') => self.read_wrapped("quote"),
            Token::Special('`') => self.read_wrapped("quasiquote"),
            Token::Special('~') => self.read_wrapped("unquote"),
            Token::SpliceUnquote => self.read_wrapped("splice-unquote"),
            Token::Special('@') => self.read_wrapped("deref"),
            Token::Special('^') => {
                self.next()?;
                let meta = self.read_form()?;
                let target = self.read_form()?;
                Ok(Value::list(vec![Value::symbol("with-meta"), target, meta]))
            }
            Token::Special(close @ (')' | ']' | '}')) => {
                Err(Error::syntax(format!("unexpected '{close}'")))
            }
            _ => {
                let token = self.next()?;
                read_atom(token)
            }
        }
    }

    /// `'x` and friends: consume the sigil and wrap the next form
    fn read_wrapped(&mut self, head: &str) -> Result<Value> {
        self.next()?;
        let form = self.read_form()?;
        Ok(Value::list(vec![Value::symbol(head), form]))
    }

    /// Read forms up to `close`. A closer of another kind is a SyntaxError.
    fn read_seq(&mut self, close: char) -> Result<ImVector<Value>> {
        self.next()?;
        let mut items = ImVector::new();

        loop {
            match self.peek()? {
                Token::Special(c) if *c == close => {
                    self.next()?;
                    return Ok(items);
                }
                Token::Special(c @ (')' | ']' | '}')) => {
                    return Err(Error::syntax(format!(
                        "unexpected '{c}', expected '{close}'"
                    )));
                }
                _ => items.push_back(self.read_form()?),
            }
        }
    }

    fn read_list(&mut self, kind: ListKind, close: char) -> Result<Value> {
        let items = self.read_seq(close)?;
        Ok(Value::sequence(items, kind))
    }

    fn read_map(&mut self) -> Result<Value> {
        let items = self.read_seq('}')?;
        if items.len() % 2 != 0 {
            return Err(Error::syntax(format!(
                "map literal requires an even number of forms, got {}",
                items.len()
            )));
        }
        let map = MapValue::from_values(items.into_iter().collect())?;
        Ok(Value::map(map))
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn read_atom(token: Token) -> Result<Value> {
    let text = match token {
        Token::Str(text) => return read_string(&text),
        Token::Atom(text) => text,
        other => return Err(Error::syntax(format!("unexpected token {other:?}"))),
    };

    if is_integer(&text) {
        return text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| Error::syntax(format!("integer literal out of range: {text}")));
    }

    Ok(match text.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "nil" => Value::Nil,
        _ => match text.strip_prefix(':') {
            Some(name) => Value::keyword(name),
            None => Value::symbol(&text),
        },
    })
}

/// Decode a quoted string token, which still carries both quotes
fn read_string(token: &str) -> Result<Value> {
    if token.len() < 2 || !token.ends_with('"') {
        return Err(Error::syntax("unexpected EOF while reading string"));
    }

    let body = &token[1..token.len() - 1];
    let mut decoded = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => decoded.push('\\'),
            Some('n') => decoded.push('\n'),
            Some('"') => decoded.push('"'),
            Some(other) => {
                return Err(Error::syntax(format!(
                    "unsupported escape sequence: \\{other}"
                )));
            }
            None => return Err(Error::syntax("unexpected EOF while reading string")),
        }
    }

    if decoded.starts_with(KEYWORD_PREFIX) {
        return Err(Error::syntax(format!(
            "string literal may not begin with '{KEYWORD_PREFIX}'"
        )));
    }
    Ok(Value::string(decoded))
}

/// Read the first form of `input`.
///
/// Fails with `EmptyInput` when the text holds no tokens at all (only
/// whitespace or comments).
pub fn read_str(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    if parser.is_at_end() {
        return Err(Error::EmptyInput);
    }
    parser.read_form()
}

/// Read every top-level form of `input`, in order
pub fn read_all(input: &str) -> Result<Vec<Value>> {
    let mut parser = Parser::new(input);
    let mut forms = Vec::new();
    while !parser.is_at_end() {
        forms.push(parser.read_form()?);
    }
    Ok(forms)
}
