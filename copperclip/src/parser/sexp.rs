use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unexpected token at line {line}, column {column}: {message}")]
    UnexpectedToken { line: usize, column: usize, message: String },
    #[error("Trailing content after root node at line {line}, column {column}")]
    TrailingContent { line: usize, column: usize },
}

/// One node of an S-expression tree.
///
/// Bare tokens (`round`, `0.2`, uuids) and quoted strings (`"GND"`) are kept
/// apart so that printing a parsed tree reproduces the same quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExp {
    Token(String),
    Str(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn token(value: impl Into<String>) -> Self {
        SExp::Token(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        SExp::Str(value.into())
    }

    /// `(name)` ready for children to be appended.
    pub fn node(name: &str) -> Self {
        SExp::List(vec![SExp::token(name)])
    }

    /// `(name value)` where value is a bare token.
    pub fn pair(name: &str, value: impl ToString) -> Self {
        SExp::List(vec![SExp::token(name), SExp::token(value.to_string())])
    }

    /// `(name "value")`.
    pub fn string_pair(name: &str, value: impl Into<String>) -> Self {
        SExp::List(vec![SExp::token(name), SExp::string(value)])
    }

    /// Builder style append; no-op on atoms.
    pub fn with(mut self, child: SExp) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: SExp) {
        if let SExp::List(items) = self {
            items.push(child);
        }
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Token(s) | SExp::Str(s) => Some(s),
            SExp::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// Tag of a list node, i.e. its leading token.
    pub fn name(&self) -> Option<&str> {
        match self {
            SExp::List(items) => match items.first() {
                Some(SExp::Token(tag)) => Some(tag),
                _ => None,
            },
            _ => None,
        }
    }

    /// Positional argument `index` after the tag.
    pub fn arg(&self, index: usize) -> Option<&SExp> {
        self.as_list().and_then(|items| items.get(index + 1))
    }

    /// First child list whose tag is `key`.
    pub fn get(&self, key: &str) -> Option<&SExp> {
        self.as_list()?.iter().skip(1).find(|item| item.name() == Some(key))
    }

    /// All child lists whose tag is `key`, in document order.
    pub fn get_all(&self, key: &str) -> Vec<&SExp> {
        match self.as_list() {
            Some(items) => items.iter().skip(1).filter(|item| item.name() == Some(key)).collect(),
            None => Vec::new(),
        }
    }

    /// Follow a `/`-separated path of child tags, e.g. `"from/via"`.
    pub fn get_path(&self, path: &str) -> Option<&SExp> {
        path.split('/').try_fold(self, |node, key| node.get(key))
    }

    /// Atom value of the first argument of the node at `path`.
    pub fn value_at(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(|node| node.arg(0)).and_then(SExp::as_atom)
    }

    fn is_flat(&self) -> bool {
        match self {
            SExp::List(items) => items.iter().all(|i| !matches!(i, SExp::List(_))),
            _ => true,
        }
    }

    fn has_grandchildren(&self) -> bool {
        match self {
            SExp::List(items) => items.iter().any(|i| !i.is_flat()),
            _ => false,
        }
    }

    /// Multi-line rendering: nodes that contain nested lists two levels
    /// deep or more are broken up with one list child per line.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out.push('\n');
        out
    }

    fn write_pretty(&self, out: &mut String, indent: usize) {
        match self {
            SExp::List(items) if self.has_grandchildren() || self.inline_len() > 100 => {
                out.push('(');
                let mut broke = false;
                for (i, item) in items.iter().enumerate() {
                    if matches!(item, SExp::List(_)) {
                        out.push('\n');
                        out.push_str(&" ".repeat(indent + 1));
                        item.write_pretty(out, indent + 1);
                        broke = true;
                    } else {
                        if i > 0 {
                            out.push(' ');
                        }
                        out.push_str(&item.to_string());
                    }
                }
                if broke {
                    out.push('\n');
                    out.push_str(&" ".repeat(indent));
                }
                out.push(')');
            }
            _ => out.push_str(&self.to_string()),
        }
    }

    fn inline_len(&self) -> usize {
        self.to_string().len()
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    write!(f, "\"")
}

fn needs_quotes(token: &str) -> bool {
    token.is_empty() || token.chars().any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

impl fmt::Display for SExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExp::Token(s) if !needs_quotes(s) => write!(f, "{}", s),
            // A token that cannot be printed bare degrades to a string.
            SExp::Token(s) | SExp::Str(s) => write_escaped(f, s),
            SExp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

pub struct SExpParser {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl SExpParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Parse exactly one root node; anything but whitespace after it is an
    /// error.
    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }
        let root = self.parse_sexp()?;
        self.skip_whitespace();
        if !self.is_eof() {
            return Err(ParseError::TrailingContent {
                line: self.line,
                column: self.column,
            });
        }
        Ok(root)
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();

        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }

        match self.peek() {
            '(' => self.parse_list(),
            ')' => Err(self.unexpected("unbalanced ')'")),
            '"' => self.parse_string(),
            _ => self.parse_symbol(),
        }
    }

    fn parse_list(&mut self) -> Result<SExp, ParseError> {
        self.expect_char('(')?;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_eof() {
                return Err(ParseError::UnexpectedEof);
            }

            if self.peek() == ')' {
                self.advance();
                break;
            }

            items.push(self.parse_sexp()?);
        }

        Ok(SExp::List(items))
    }

    fn parse_string(&mut self) -> Result<SExp, ParseError> {
        self.expect_char('"')?;
        let mut s = String::new();
        let mut escaped = false;

        loop {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            let ch = self.peek();
            self.advance();

            if escaped {
                match ch {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    _ => s.push(ch),
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                break;
            } else {
                s.push(ch);
            }
        }

        Ok(SExp::Str(s))
    }

    fn parse_symbol(&mut self) -> Result<SExp, ParseError> {
        let mut s = String::new();

        while !self.is_eof() {
            let ch = self.peek();
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            s.push(ch);
            self.advance();
        }

        if s.is_empty() {
            Err(self.unexpected("empty symbol"))
        } else {
            Ok(SExp::Token(s))
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if let Some(&ch) = self.input.get(self.pos) {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn unexpected(&self, message: &str) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line,
            column: self.column,
            message: message.to_string(),
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }

        let ch = self.peek();
        if ch == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{}', found '{}'", expected, ch)))
        }
    }
}

/// Parse a complete document.
pub fn parse(input: &str) -> Result<SExp, ParseError> {
    SExpParser::new(input).parse()
}
