//! Permissive literal syntax for group specifications.
//!
//! Accepts the bracket notation people type on a command line when JSON is
//! too strict: `[[1, 2], (3,)]`, `{10: [1, 2], 20: {4, 5}}`, single-quoted
//! strings, trailing commas and `#` comments. The result is a
//! [`serde_json::Value`] so the shape checks downstream are shared with the
//! JSON path.
//!
//! - `[..]` and `(..,)` become arrays; `(x)` without a comma is just `x`.
//! - `{k: v, ..}` becomes an object with stringified keys.
//! - `{a, b}` (a set) becomes an array.
//! - `True`, `False` and `None` become booleans and null.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Nesting deeper than this is rejected instead of recursing further.
const MAX_DEPTH: usize = 64;

/// A literal parse failure with a 1-based source position.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct LiteralError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parses a complete literal document.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser { src: text, pos: 0 };
    parser.skip_ws();
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> LiteralError {
        let before = &self.src[..pos];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        LiteralError {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// Consumes a separator comma. Returns true when the container closes
    /// with `close` (a trailing comma is allowed before it).
    fn separator(&mut self, close: char) -> Result<bool, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == close => {
                self.bump();
                Ok(true)
            }
            Some(',') => {
                self.bump();
                self.skip_ws();
                if self.peek() == Some(close) {
                    self.bump();
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Some(c) => Err(self.error(format!("expected ',' or '{}', found '{}'", close, c))),
            None => Err(self.error(format!("expected ',' or '{}', found end of input", close))),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.skip_ws();
        match self.peek() {
            Some('[') => self.list(depth),
            Some('(') => self.paren(depth),
            Some('{') => self.brace(depth),
            Some('\'') | Some('"') => self.string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.ident(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn list(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.value(depth + 1)?);
            if self.separator(']')? {
                return Ok(Value::Array(items));
            }
        }
    }

    fn paren(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect('(')?;
        self.skip_ws();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value(depth + 1)?;
        self.skip_ws();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(first);
        }
        let mut items = vec![first];
        if self.separator(')')? {
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.value(depth + 1)?);
            if self.separator(')')? {
                return Ok(Value::Array(items));
            }
        }
    }

    fn brace(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect('{')?;
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Object(Map::new()));
        }

        let key_pos = self.pos;
        let first = self.value(depth + 1)?;
        self.skip_ws();
        if self.peek() != Some(':') {
            // A set literal.
            let mut items = vec![first];
            if self.separator('}')? {
                return Ok(Value::Array(items));
            }
            loop {
                items.push(self.value(depth + 1)?);
                if self.separator('}')? {
                    return Ok(Value::Array(items));
                }
            }
        }

        let mut map = Map::new();
        let mut key = self.key_string(first, key_pos)?;
        loop {
            self.expect(':')?;
            let value = self.value(depth + 1)?;
            map.insert(key, value);
            if self.separator('}')? {
                return Ok(Value::Object(map));
            }
            self.skip_ws();
            let key_pos = self.pos;
            let raw = self.value(depth + 1)?;
            key = self.key_string(raw, key_pos)?;
        }
    }

    fn key_string(&self, key: Value, pos: usize) -> Result<String, LiteralError> {
        match key {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(self.error_at(pos, "mapping keys must be numbers or strings")),
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let quote = self.bump().unwrap_or('"');
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(self.error_at(start, "unterminated string"))
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('-') | Some('+')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let text: String = self.src[start..self.pos]
            .chars()
            .filter(|&c| c != '_' && c != '+')
            .collect();
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                let raw = &self.src[start..self.pos];
                self.error_at(start, format!("invalid number '{}'", raw))
            })
    }

    fn ident(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            other => Err(self.error_at(start, format!("unexpected identifier '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_lists_and_tuples() {
        let v = parse_literal("[[1, 2, 3], (4, 5), (6,)]").unwrap();
        assert_eq!(v, json!([[1, 2, 3], [4, 5], [6]]));
    }

    #[test]
    fn parenthesized_scalar_is_not_a_tuple() {
        assert_eq!(parse_literal("[(7)]").unwrap(), json!([7]));
        assert_eq!(parse_literal("()").unwrap(), json!([]));
    }

    #[test]
    fn parses_dict_with_integer_keys() {
        let v = parse_literal("{10: [1, 2, 3], 20: [4, 5]}").unwrap();
        assert_eq!(v, json!({"10": [1, 2, 3], "20": [4, 5]}));
    }

    #[test]
    fn parses_sets_as_arrays() {
        let v = parse_literal("{1: {2, 3}, 4: {5,}}").unwrap();
        assert_eq!(v, json!({"1": [2, 3], "4": [5]}));
        assert_eq!(parse_literal("[{1, 2}]").unwrap(), json!([[1, 2]]));
    }

    #[test]
    fn accepts_trailing_commas_and_comments() {
        let text = "# cortex, then ventricles\n[\n  [3, 42,],  # cortex\n  [4, 43],\n]\n";
        assert_eq!(parse_literal(text).unwrap(), json!([[3, 42], [4, 43]]));
    }

    #[test]
    fn parses_quoted_keys_and_signed_numbers() {
        let v = parse_literal("{'1': [-2, +3], \"5\": 1_000}").unwrap();
        assert_eq!(v, json!({"1": [-2, 3], "5": 1000}));
    }

    #[test]
    fn parses_floats_and_keywords() {
        assert_eq!(parse_literal("[1.0, 2e1]").unwrap(), json!([1.0, 20.0]));
        assert_eq!(
            parse_literal("[True, False, None]").unwrap(),
            json!([true, false, null])
        );
    }

    #[test]
    fn reports_position_of_errors() {
        let err = parse_literal("[[1, 2],\n [3 4]]").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 5);
        assert!(err.message.contains("expected ','"));
    }

    #[test]
    fn rejects_trailing_input() {
        let err = parse_literal("[1] [2]").unwrap_err();
        assert!(err.message.contains("trailing"));
    }

    #[test]
    fn rejects_unterminated_containers() {
        assert!(parse_literal("[[1, 2]").is_err());
        assert!(parse_literal("{1: [2]").is_err());
        assert!(parse_literal("'abc").is_err());
    }

    #[test]
    fn rejects_unhashable_keys() {
        let err = parse_literal("{[1]: 2}").unwrap_err();
        assert!(err.message.contains("mapping keys"));
    }

    #[test]
    fn rejects_deep_nesting() {
        let text = format!("{}{}", "[".repeat(200), "]".repeat(200));
        assert!(parse_literal(&text).is_err());
    }
}
