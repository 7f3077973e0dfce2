//! Recursive descent expression parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and (("or" | "或") and)*
//! and     := not (("and" | "且") not)*
//! not     := ("not" | "非") not | compare
//! compare := add (cmp-op add)?          right side in value context
//! add     := mul (("+" | "-") mul)*
//! mul     := unary (("*" | "/") unary)*
//! unary   := ("+" | "-") unary | primary
//! primary := literal | "(" expr ")" | list | dict | name  ("[" expr "]")*
//! ```
//!
//! In *value context* a bare word is a variable only if it is a known name;
//! otherwise it is read as the string it spells.

use super::ast::{BinaryOp, DictEntry, Expr, UnaryOp};
use super::names::KnownNames;
use crate::errors::{CatError, CatResult, SourceSpan};
use crate::lexer::keyword;
use crate::lexer::{is_colon, tokenize_expression};

/// Parser over one line's expression tokens
pub struct ExprParser<'a> {
    tokens: &'a [String],
    pos: usize,
    known: &'a KnownNames,
    /// Span of the source line, attached to every error
    span: SourceSpan,
}

impl<'a> ExprParser<'a> {
    pub fn new(tokens: &'a [String], known: &'a KnownNames, span: SourceSpan) -> Self {
        Self {
            tokens,
            pos: 0,
            known,
            span,
        }
    }

    /// Whether every token has been consumed
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // ==================== Helpers ====================

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn check(&self, s: &str) -> bool {
        self.peek() == Some(s)
    }

    fn check_with(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.peek().is_some_and(pred)
    }

    fn error(&self, message: impl Into<String>) -> CatError {
        CatError::parser(message, self.span)
    }

    fn expect(&mut self, s: &str, msg: &str) -> CatResult<()> {
        if self.check(s) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(match self.peek() {
                Some(found) => format!("{}, found '{}'", msg, found),
                None => format!("{}, found end of expression", msg),
            }))
        }
    }

    // ==================== Precedence levels ====================

    /// Parse one expression starting at the current position
    pub fn parse_expression(&mut self, value: bool) -> CatResult<Expr> {
        self.parse_or(value)
    }

    fn parse_or(&mut self, value: bool) -> CatResult<Expr> {
        let mut left = self.parse_and(value)?;
        while self.check_with(keyword::is_or) {
            self.pos += 1;
            let right = self.parse_and(value)?;
            left = Expr::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self, value: bool) -> CatResult<Expr> {
        let mut left = self.parse_not(value)?;
        while self.check_with(keyword::is_and) {
            self.pos += 1;
            let right = self.parse_not(value)?;
            left = Expr::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self, value: bool) -> CatResult<Expr> {
        if self.check_with(keyword::is_not) {
            self.pos += 1;
            let operand = self.parse_not(value)?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_compare(value)
    }

    /// Comparisons do not chain: at most one operator is consumed
    fn parse_compare(&mut self, value: bool) -> CatResult<Expr> {
        let left = self.parse_add(value)?;
        let op = self
            .peek()
            .and_then(keyword::compare_op)
            .and_then(BinaryOp::comparison);
        if let Some(op) = op {
            self.pos += 1;
            let right = self.parse_add(true)?;
            return Ok(Expr::binary(op, left, right));
        }
        Ok(left)
    }

    fn parse_add(&mut self, value: bool) -> CatResult<Expr> {
        let mut left = self.parse_mul(value)?;
        loop {
            let op = match self.peek() {
                Some("+") => BinaryOp::Add,
                Some("-") => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_mul(value)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_mul(&mut self, value: bool) -> CatResult<Expr> {
        let mut left = self.parse_unary(value)?;
        loop {
            let op = match self.peek() {
                Some("*") => BinaryOp::Mul,
                Some("/") => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary(value)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    /// A sign is only an operator when something follows it
    fn parse_unary(&mut self, value: bool) -> CatResult<Expr> {
        let op = match self.peek() {
            Some("-") => Some(UnaryOp::Neg),
            Some("+") => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op
            && self.pos + 1 < self.tokens.len()
        {
            self.pos += 1;
            let operand = self.parse_unary(value)?;
            return Ok(Expr::unary(op, operand));
        }
        self.parse_postfix(value)
    }

    fn parse_postfix(&mut self, value: bool) -> CatResult<Expr> {
        let mut expr = self.parse_primary(value)?;

        while self.check("[") {
            self.pos += 1;
            let index = self.parse_expression(true)?;
            self.expect("]", "expected ']' in index access")?;
            expr = Expr::Index {
                container: Box::new(expr),
                index: Box::new(index),
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self, value: bool) -> CatResult<Expr> {
        let Some(token) = self.peek() else {
            return Err(self.error("unexpected end of expression"));
        };

        if keyword::is_true(token) {
            self.pos += 1;
            return Ok(Expr::Bool { value: true });
        }
        if keyword::is_false(token) {
            self.pos += 1;
            return Ok(Expr::Bool { value: false });
        }
        if keyword::is_none(token) {
            self.pos += 1;
            return Ok(Expr::None);
        }
        if let Some(text) = backtick_string(token) {
            self.pos += 1;
            return Ok(Expr::quoted(text));
        }
        if is_numeric(token) {
            self.pos += 1;
            return Ok(Expr::number(token));
        }
        if token == "(" {
            return self.parse_group();
        }
        if keyword::is_map_prefix(token)
            && self.tokens.get(self.pos + 1).is_some_and(|t| t == "[")
        {
            return self.parse_dict_literal();
        }
        if token == "[" {
            return self.parse_list_or_dict();
        }

        self.pos += 1;
        if is_identifier(token) {
            if !value || self.known.contains(token) {
                return Ok(Expr::ident(token));
            }
            return Ok(Expr::string(token));
        }
        Ok(Expr::string(token))
    }

    /// `( ... )` may only wrap a genuine operator combination
    fn parse_group(&mut self) -> CatResult<Expr> {
        let open = self.pos;
        let close = match self.find_matching_paren(open) {
            Some(close) if close > open + 1 => close,
            Some(_) => return Err(self.error("empty parentheses")),
            None => return Err(self.error("unmatched '('")),
        };

        let inner = &self.tokens[open + 1..close];
        self.pos = close + 1;

        match try_parse_tokens(inner, false, self.known, self.span)? {
            None => Err(self.error("invalid parenthesized expression")),
            Some(node) if !node.is_grouping_target() => {
                Err(CatError::Grouping { span: self.span })
            }
            Some(node) => Ok(node),
        }
    }

    fn find_matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            match token.as_str() {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// `[ ... ]`: a colon after the first element makes it a dictionary
    fn parse_list_or_dict(&mut self) -> CatResult<Expr> {
        self.pos += 1;
        if self.check("]") {
            self.pos += 1;
            return Ok(Expr::List {
                elements: Vec::new(),
            });
        }

        let start = self.pos;
        let first = self.parse_expression(true)?;
        if self.check_with(is_colon) {
            self.pos = start;
            return self.parse_dict_entries();
        }

        let mut elements = vec![first];
        while self.check("|") {
            self.pos += 1;
            elements.push(self.parse_expression(true)?);
        }

        self.expect("]", "expected ']' in list literal")?;
        Ok(Expr::List { elements })
    }

    /// `map[ ... ]` / `映[ ... ]`
    fn parse_dict_literal(&mut self) -> CatResult<Expr> {
        self.pos += 1;
        self.expect("[", "expected '[' after map prefix")?;
        if self.check("]") {
            self.pos += 1;
            return Ok(Expr::Dict {
                entries: Vec::new(),
            });
        }
        self.parse_dict_entries()
    }

    fn parse_dict_entries(&mut self) -> CatResult<Expr> {
        let mut entries = Vec::new();
        loop {
            let key = self.parse_expression(true)?;
            if !self.check_with(is_colon) {
                return Err(self.error("expected ':' in dict entry"));
            }
            self.pos += 1;
            let value = self.parse_expression(true)?;
            entries.push(DictEntry { key, value });

            if !self.check("|") {
                break;
            }
            self.pos += 1;
        }

        self.expect("]", "expected ']' in dict literal")?;
        Ok(Expr::Dict { entries })
    }
}

/// Body of a ``` ``text`` ``` token
fn backtick_string(token: &str) -> Option<&str> {
    if token.len() > 4 {
        token.strip_prefix("``")?.strip_suffix("``")
    } else {
        None
    }
}

/// A float spelling with at least one digit; the text itself is kept verbatim.
///
/// Overflowing exponents (`1e500`) count, and so do underscores between
/// digits (`1_000`). Digit-free spellings such as `inf` and `nan` stay names.
pub fn is_numeric(token: &str) -> bool {
    if !token.bytes().any(|b| b.is_ascii_digit()) {
        return false;
    }
    let bytes = token.as_bytes();
    let mut digits = String::with_capacity(token.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'_' {
            let between_digits = i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
            if !between_digits {
                return false;
            }
            continue;
        }
        digits.push(char::from(b));
    }
    digits.parse::<f64>().is_ok()
}

/// Letters (any script) or `_`, then letters, digits or `_`
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Drop a trailing `:` from the last word (`若 x > 3:`)
pub fn strip_trailing_colon<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
    if let Some(last) = cleaned.last_mut()
        && let Some(stripped) = last.strip_suffix(':')
    {
        *last = stripped.to_string();
        if last.is_empty() {
            cleaned.pop();
        }
    }
    cleaned
}

/// Parse a whole token list.
///
/// Returns `Ok(None)` when the tokens do not form one expression. A bare
/// name followed by more tokens is read as a call: `f a b` → `f(a, b)`.
/// The grouping-parentheses error is the only error that escapes.
pub fn try_parse_tokens(
    tokens: &[String],
    value: bool,
    known: &KnownNames,
    span: SourceSpan,
) -> CatResult<Option<Expr>> {
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = ExprParser::new(tokens, known, span);
    match parse_whole(&mut parser, value) {
        Err(e) if e.is_grouping() => Err(e),
        Err(_) => Ok(None),
        Ok(node) => Ok(node),
    }
}

fn parse_whole(parser: &mut ExprParser<'_>, value: bool) -> CatResult<Option<Expr>> {
    let node = parser.parse_expression(value)?;
    if parser.is_at_end() {
        return Ok(Some(node));
    }
    if let Expr::Ident { name } = node {
        let mut args = Vec::new();
        while !parser.is_at_end() {
            args.push(parser.parse_expression(true)?);
        }
        return Ok(Some(Expr::Call { func: name, args }));
    }
    Ok(None)
}

/// Tokenize raw argument words, then [`try_parse_tokens`]
pub fn try_parse_full<S: AsRef<str>>(
    args: &[S],
    value: bool,
    known: &KnownNames,
    span: SourceSpan,
) -> CatResult<Option<Expr>> {
    if args.is_empty() {
        return Ok(None);
    }
    let tokens = tokenize_expression(args);
    try_parse_tokens(&tokens, value, known, span)
}

/// Condition of `if` / `elif` / `while`
pub fn parse_condition<S: AsRef<str>>(
    args: &[S],
    known: &KnownNames,
    span: SourceSpan,
) -> CatResult<Expr> {
    let args = strip_trailing_colon(args);
    if args.is_empty() {
        return Err(CatError::parser("empty condition", span));
    }
    let tokens = tokenize_expression(&args);
    match try_parse_tokens(&tokens, true, known, span)? {
        Some(node) => Ok(node),
        None => Err(CatError::parser(
            format!("cannot parse condition: {}", args.join(" ")),
            span,
        )),
    }
}

/// Right-hand side of `置 name ...`, already tokenized
pub fn parse_set_value(tokens: &[String], known: &KnownNames, span: SourceSpan) -> CatResult<Expr> {
    let Some(first) = tokens.first() else {
        return Err(CatError::parser("SET missing value", span));
    };

    if tokens.len() == 3
        && let Some(op) = keyword::legacy_arith_op(first)
    {
        let op = match op {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            _ => BinaryOp::Div,
        };
        let left = ExprParser::new(&tokens[1..2], known, span).parse_expression(true)?;
        let right = ExprParser::new(&tokens[2..3], known, span).parse_expression(true)?;
        return Ok(Expr::binary(op, left, right));
    }

    match try_parse_tokens(tokens, true, known, span)? {
        Some(node) => Ok(node),
        None => Ok(Expr::string(tokens.join(" "))),
    }
}

/// Argument of `印 ...`; `None` prints an empty line
pub fn parse_print_value<S: AsRef<str>>(
    args: &[S],
    known: &KnownNames,
    span: SourceSpan,
) -> CatResult<Option<Expr>> {
    let tokens = tokenize_expression(args);
    if tokens.is_empty() {
        return Ok(None);
    }

    if let [token] = tokens.as_slice() {
        let token = token.as_str();
        if keyword::is_true(token) {
            return Ok(Some(Expr::Bool { value: true }));
        }
        if keyword::is_false(token) {
            return Ok(Some(Expr::Bool { value: false }));
        }
        if keyword::is_none(token) {
            return Ok(Some(Expr::None));
        }
        if is_numeric(token) {
            return Ok(Some(Expr::number(token)));
        }
        if is_identifier(token) {
            if known.contains(token) {
                return Ok(Some(Expr::ident(token)));
            }
            return Ok(Some(Expr::string(token)));
        }
    }

    let mut parser = ExprParser::new(&tokens, known, span);
    match parser.parse_expression(true) {
        Ok(node) if parser.is_at_end() => return Ok(Some(node)),
        Err(e) if e.is_grouping() => return Err(e),
        _ => {}
    }

    let text = args
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Some(Expr::string(text)))
}
