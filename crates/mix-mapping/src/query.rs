//! Source queries
//!
//! A small, namespace-aware subset of XPath location paths, compiled once
//! and evaluated against owned element trees:
//!
//! - `/a/b`, `a/b` (child steps from the document), `//a` and `a//b`
//!   (descendant steps)
//! - name tests `name`, `prefix:name`, `*`, `prefix:*`; an unprefixed name
//!   matches that local name in any namespace
//! - predicates `[local-name()='x']`, `[@attr]`, `[@attr='v']`, `[child]`,
//!   `[child='v']` and `[N]` (1-based), chained left to right
//! - a trailing `text()` step, which selects the same value as its parent
//!
//! Results come back in document order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use mix_ir::{Descendants, Element};

/// Error raised when a query cannot be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub expression: String,
    /// Character offset where compilation stopped
    pub position: usize,
    pub message: String,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in query '{}' at offset {}",
            self.message, self.expression, self.position
        )
    }
}

impl std::error::Error for QueryError {}

/// A compiled source query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    expression: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// `//` before this step: search every descendant-or-self of the context
    descendant: bool,
    test: NameTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    AnyIn(String),
    Local(String),
    Qualified { uri: String, local: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    local: String,
    uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    LocalName(String),
    HasAttribute(AttributeTest),
    AttributeEquals(AttributeTest, String),
    HasChild(NameTest),
    ChildEquals(NameTest, String),
    Position(usize),
}

impl SourceQuery {
    /// Compile `expression`, resolving prefixes through `namespaces`
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for syntax errors and undeclared prefixes.
    pub fn compile(
        expression: &str,
        namespaces: &BTreeMap<String, String>,
    ) -> Result<Self, QueryError> {
        let mut parser = QueryParser {
            expression,
            input: expression.chars().collect(),
            pos: 0,
            namespaces,
        };
        let steps = parser.parse()?;
        Ok(Self {
            expression: expression.to_string(),
            steps,
        })
    }

    /// The expression this query was compiled from
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// All elements selected below (and including) `root`, in document order
    #[must_use]
    pub fn select<'a>(&self, root: &'a Element) -> Vec<&'a Element> {
        // `None` stands for the document node above `root`.
        let mut contexts: Vec<Option<&'a Element>> = vec![None];

        for step in &self.steps {
            let mut matched = Vec::new();
            for &context in &contexts {
                let scopes: Vec<Option<&'a Element>> = match (step.descendant, context) {
                    (false, _) => vec![context],
                    (true, None) => std::iter::once(None)
                        .chain(Descendants::new(root).map(Some))
                        .collect(),
                    (true, Some(element)) => Descendants::new(element).map(Some).collect(),
                };
                for scope in scopes {
                    let children: &'a [Element] = match scope {
                        None => std::slice::from_ref(root),
                        Some(element) => &element.children,
                    };
                    matched.extend(step.evaluate(children));
                }
            }
            contexts = in_document_order(root, &matched)
                .into_iter()
                .map(Some)
                .collect();
        }

        contexts.into_iter().flatten().collect()
    }

    /// The first selected element in document order
    #[must_use]
    pub fn first<'a>(&self, root: &'a Element) -> Option<&'a Element> {
        self.select(root).into_iter().next()
    }
}

impl fmt::Display for SourceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl Step {
    fn evaluate<'a>(&self, children: &'a [Element]) -> Vec<&'a Element> {
        let mut candidates: Vec<&'a Element> =
            children.iter().filter(|c| self.test.matches(c)).collect();
        for predicate in &self.predicates {
            candidates = match predicate {
                Predicate::Position(n) => candidates.get(n - 1).copied().into_iter().collect(),
                other => candidates.into_iter().filter(|c| other.holds(c)).collect(),
            };
        }
        candidates
    }
}

impl NameTest {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Any => true,
            Self::AnyIn(uri) => element.namespace_uri() == Some(uri.as_str()),
            Self::Local(local) => element.name == *local,
            Self::Qualified { uri, local } => {
                element.name == *local && element.namespace_uri() == Some(uri.as_str())
            }
        }
    }
}

impl AttributeTest {
    fn value<'a>(&self, element: &'a Element) -> Option<&'a str> {
        element
            .attributes
            .iter()
            .find(|a| {
                a.name == self.local
                    && (self.uri.is_none() || a.namespace.as_deref() == self.uri.as_deref())
            })
            .map(|a| a.value.as_str())
    }
}

impl Predicate {
    fn holds(&self, element: &Element) -> bool {
        match self {
            Self::LocalName(name) => element.name == *name,
            Self::HasAttribute(test) => test.value(element).is_some(),
            Self::AttributeEquals(test, value) => test.value(element) == Some(value.as_str()),
            Self::HasChild(test) => element.children.iter().any(|c| test.matches(c)),
            Self::ChildEquals(test, value) => element
                .children
                .iter()
                .any(|c| test.matches(c) && c.text() == value),
            Self::Position(_) => true,
        }
    }
}

fn in_document_order<'a>(root: &'a Element, matched: &[&'a Element]) -> Vec<&'a Element> {
    if matched.len() < 2 {
        return matched.to_vec();
    }
    let wanted: HashSet<*const Element> = matched.iter().map(|e| std::ptr::from_ref(*e)).collect();
    Descendants::new(root)
        .filter(|e| wanted.contains(&std::ptr::from_ref(*e)))
        .collect()
}

struct QueryParser<'q> {
    expression: &'q str,
    input: Vec<char>,
    pos: usize,
    namespaces: &'q BTreeMap<String, String>,
}

impl QueryParser<'_> {
    fn parse(&mut self) -> Result<Vec<Step>, QueryError> {
        self.skip_ws();
        if self.at_end() {
            return Err(self.error("empty query"));
        }

        let mut steps = Vec::new();
        let mut descendant = if self.eat_str("//") {
            true
        } else {
            self.eat('/');
            false
        };

        loop {
            self.skip_ws();
            if self.eat_str("text()") {
                if steps.is_empty() || descendant {
                    return Err(self.error("text() must follow an element step"));
                }
                self.skip_ws();
                if !self.at_end() {
                    return Err(self.error("text() must be the final step"));
                }
                break;
            }

            let test = self.parse_name_test()?;
            let mut predicates = Vec::new();
            loop {
                self.skip_ws();
                if !self.eat('[') {
                    break;
                }
                predicates.push(self.parse_predicate()?);
            }
            steps.push(Step {
                descendant,
                test,
                predicates,
            });

            self.skip_ws();
            if self.at_end() {
                break;
            }
            if self.eat_str("//") {
                descendant = true;
            } else if self.eat('/') {
                descendant = false;
            } else {
                return Err(self.unexpected());
            }
        }

        Ok(steps)
    }

    fn parse_name_test(&mut self) -> Result<NameTest, QueryError> {
        if self.eat('*') {
            return Ok(NameTest::Any);
        }
        let first = self.parse_ncname()?;
        if !self.eat(':') {
            return Ok(NameTest::Local(first));
        }
        let uri = self.resolve_prefix(&first)?;
        if self.eat('*') {
            return Ok(NameTest::AnyIn(uri));
        }
        let local = self.parse_ncname()?;
        Ok(NameTest::Qualified { uri, local })
    }

    fn parse_attribute_test(&mut self) -> Result<AttributeTest, QueryError> {
        let first = self.parse_ncname()?;
        if !self.eat(':') {
            return Ok(AttributeTest {
                local: first,
                uri: None,
            });
        }
        let uri = self.resolve_prefix(&first)?;
        let local = self.parse_ncname()?;
        Ok(AttributeTest {
            local,
            uri: Some(uri),
        })
    }

    fn parse_predicate(&mut self) -> Result<Predicate, QueryError> {
        self.skip_ws();
        let predicate = if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let position = self.parse_number()?;
            if position == 0 {
                return Err(self.error("positions start at 1"));
            }
            Predicate::Position(position)
        } else if self.eat_str("local-name()") {
            if !self.eat_equals() {
                return Err(self.error("expected '=' after local-name()"));
            }
            Predicate::LocalName(self.parse_literal()?)
        } else if self.eat('@') {
            let test = self.parse_attribute_test()?;
            if self.eat_equals() {
                Predicate::AttributeEquals(test, self.parse_literal()?)
            } else {
                Predicate::HasAttribute(test)
            }
        } else {
            let test = self.parse_name_test()?;
            if self.eat_equals() {
                Predicate::ChildEquals(test, self.parse_literal()?)
            } else {
                Predicate::HasChild(test)
            }
        };

        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(predicate)
    }

    fn parse_ncname(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += 1,
            _ => return Err(self.error("expected a name")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.pos += 1;
        }
        Ok(self.input[start..self.pos].iter().collect())
    }

    fn parse_number(&mut self) -> Result<usize, QueryError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.input[start..self.pos].iter().collect();
        digits
            .parse()
            .map_err(|_| self.error(format!("invalid position '{digits}'")))
    }

    fn parse_literal(&mut self) -> Result<String, QueryError> {
        let quote = match self.peek() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.at_end() {
            return Err(self.error("unterminated string"));
        }
        let literal = self.input[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(literal)
    }

    fn resolve_prefix(&self, prefix: &str) -> Result<String, QueryError> {
        self.namespaces
            .get(prefix)
            .cloned()
            .ok_or_else(|| self.error(format!("undeclared namespace prefix '{prefix}'")))
    }

    fn eat_equals(&mut self) -> bool {
        self.skip_ws();
        if self.eat('=') {
            self.skip_ws();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let end = self.pos + expected.chars().count();
        if end <= self.input.len() && self.input[self.pos..end].iter().copied().eq(expected.chars())
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn unexpected(&self) -> QueryError {
        match self.peek() {
            Some(c) => self.error(format!("unexpected character '{c}'")),
            None => self.error("unexpected end of query"),
        }
    }

    fn error(&self, message: impl Into<String>) -> QueryError {
        QueryError {
            expression: self.expression.to_string(),
            position: self.pos,
            message: message.into(),
        }
    }
}
