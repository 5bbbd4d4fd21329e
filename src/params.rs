//! Parameter expression parsing
//!
//! Fixture cells carry request parameters as literal expressions such as
//! `{'user': 'alice', 'roles': ['admin'], 'active': True}`. They are
//! evaluated by a literal-only parser: containers, strings, numbers,
//! booleans and null. Names, calls and operators are rejected, so a cell
//! can never run code.
//!
//! Tuples and sets become JSON arrays. Dict keys that are not strings are
//! rendered as their literal text.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Containers nested deeper than this are rejected
const MAX_DEPTH: usize = 100;

/// Syntax or value error in a parameter expression
#[derive(Error, Debug, PartialEq)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parses raw parameter cells into request payload values
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamParser {
    strip_all_spaces: bool,
}

impl ParamParser {
    /// Parser that keeps whitespace inside string literals
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that deletes every space and newline before parsing
    ///
    /// This matches fixtures written for the legacy runner, at the price of
    /// turning `"hello world"` into `"helloworld"`.
    pub fn strip_all_spaces(strip: bool) -> Self {
        Self {
            strip_all_spaces: strip,
        }
    }

    /// Parse a raw cell, returning `None` for blank or invalid input
    pub fn parse(&self, raw: Option<&str>) -> Option<Value> {
        let raw = raw?;
        if raw.trim().is_empty() {
            return None;
        }

        let result = if self.strip_all_spaces {
            let cleaned: String = raw.chars().filter(|c| *c != '\n' && *c != ' ').collect();
            parse_literal(&cleaned)
        } else {
            parse_literal(raw)
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Failed to parse parameters {:?}: {}", raw, e);
                None
            }
        }
    }
}

/// Evaluate a literal expression
pub fn parse_literal(src: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        chars: src.chars().collect(),
        pos: 0,
        depth: 0,
    };

    parser.skip_ws();
    let first = parser.value()?;
    parser.skip_ws();

    // A bare `a, b` at top level is a tuple
    let value = if parser.eat(',') {
        let mut items = vec![first];
        items.extend(parser.items(None)?);
        Value::Array(items)
    } else {
        first
    };

    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') | Some('[') | Some('(') => self.nested(),
            Some('"') | Some('\'') => self.strings(),
            Some('+') | Some('-') => self.signed(),
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(false),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    /// Container literal, at most [`MAX_DEPTH`] levels deep
    fn nested(&mut self) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = match self.peek() {
            Some('{') => self.brace(),
            Some('(') => self.paren(),
            _ => {
                self.pos += 1;
                self.items(Some(']')).map(Value::Array)
            }
        };
        self.depth -= 1;
        value
    }

    /// Comma-separated values up to `close` (or end of input when `None`)
    fn items(&mut self, close: Option<char>) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.at_close(close) {
                break;
            }
            items.push(self.value()?);
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
        }
        self.skip_ws();
        self.close(close)?;
        Ok(items)
    }

    fn at_close(&self, close: Option<char>) -> bool {
        match close {
            Some(c) => self.peek() == Some(c),
            None => self.peek().is_none(),
        }
    }

    fn close(&mut self, close: Option<char>) -> Result<(), LiteralError> {
        match close {
            Some(c) => self.expect(c),
            None if self.peek().is_none() => Ok(()),
            None => Err(self.error("expected ',' or end of input")),
        }
    }

    fn paren(&mut self) -> Result<Value, LiteralError> {
        self.expect('(')?;
        self.skip_ws();
        if self.eat(')') {
            return Ok(Value::Array(Vec::new()));
        }

        let first = self.value()?;
        self.skip_ws();
        if self.eat(')') {
            // Parenthesized expression, not a tuple
            return Ok(first);
        }
        self.expect(',')?;
        let mut items = vec![first];
        items.extend(self.items(Some(')'))?);
        Ok(Value::Array(items))
    }

    /// Dict or set literal
    fn brace(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        self.skip_ws();
        if self.eat('}') {
            return Ok(Value::Object(Map::new()));
        }

        let first = self.value()?;
        self.skip_ws();
        if self.eat(':') {
            let mut map = Map::new();
            let value = self.value()?;
            map.insert(key_text(first), value);
            loop {
                self.skip_ws();
                if !self.eat(',') {
                    break;
                }
                self.skip_ws();
                if self.peek() == Some('}') {
                    break;
                }
                let key = self.value()?;
                self.skip_ws();
                self.expect(':')?;
                let value = self.value()?;
                map.insert(key_text(key), value);
            }
            self.skip_ws();
            self.expect('}')?;
            return Ok(Value::Object(map));
        }

        let mut items = vec![first];
        if self.eat(',') {
            items.extend(self.items(Some('}'))?);
        } else {
            self.expect('}')?;
        }
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Ok(Value::Array(unique))
    }

    /// One or more adjacent string literals, concatenated
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut out = String::new();
        loop {
            self.string_into(&mut out)?;
            let save = self.pos;
            self.skip_ws();
            if !matches!(self.peek(), Some('"') | Some('\'')) {
                self.pos = save;
                break;
            }
        }
        Ok(Value::String(out))
    }

    fn string_into(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string"));
        };

        loop {
            match self.bump() {
                None => {
                    return Err(LiteralError {
                        offset: start,
                        message: "unterminated string".to_string(),
                    })
                }
                Some(c) if c == quote => return Ok(()),
                Some('\\') => self.escape_into(out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape_into(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'x' => out.push(self.hex_escape(2)?),
            'u' => out.push(self.hex_escape(4)?),
            'U' => out.push(self.hex_escape(8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code =
            u32::from_str_radix(&hex, 16).map_err(|_| self.error("invalid escape sequence"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?;
        self.pos = end;
        Ok(c)
    }

    fn signed(&mut self) -> Result<Value, LiteralError> {
        let negative = self.bump() == Some('-');
        self.skip_ws();
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(negative),
            Some('+') | Some('-') => {
                let inner = self.signed()?;
                negate(inner, negative).ok_or_else(|| self.error("invalid number"))
            }
            _ => Err(self.error("expected number after sign")),
        }
    }

    fn number(&mut self, negative: bool) -> Result<Value, LiteralError> {
        let start = self.pos;
        let radix = match (self.peek(), self.chars.get(self.pos + 1).copied()) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('o' | 'O')) => 8,
            (Some('0'), Some('b' | 'B')) => 2,
            _ => 10,
        };

        if radix != 10 {
            self.pos += 2;
            let digits = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            let digits = digits.replace('_', "");
            let n = i64::from_str_radix(&digits, radix).map_err(|_| LiteralError {
                offset: start,
                message: "invalid integer literal".to_string(),
            })?;
            return Ok(Value::from(if negative { -n } else { n }));
        }

        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;
        if self.eat('.') {
            is_float = true;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            text.push('e');
            self.pos += 1;
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.pos += 1;
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            return Err(self.error("invalid number literal"));
        }

        let text = text.replace('_', "");
        let invalid = || LiteralError {
            offset: start,
            message: format!("invalid number literal '{}'", text),
        };
        if text == "." || text.is_empty() {
            return Err(invalid());
        }

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::from(if negative { -n } else { n }));
            }
        }
        let f: f64 = text.parse().map_err(|_| invalid())?;
        let f = if negative { -f } else { f };
        Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
        match word.as_str() {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => Err(LiteralError {
                offset: start,
                message: format!("'{}' is not a literal", word),
            }),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}

fn negate(value: Value, negative: bool) -> Option<Value> {
    if !negative {
        return Some(value);
    }
    let n = value.as_number()?;
    if let Some(i) = n.as_i64() {
        Some(Value::from(-i))
    } else {
        Number::from_f64(-n.as_f64()?).map(Value::Number)
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}
