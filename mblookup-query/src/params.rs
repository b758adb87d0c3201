//! Builder for the filter string sent with every page request.
//!
//! The catalog service takes a Lucene query. Field values are quoted and
//! escaped so user input such as `AC/DC` or `(What's the Story)` cannot
//! change the query structure.

use std::fmt;

/// Characters with meaning in Lucene query syntax.
const LUCENE_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Field { name: String, value: String },
    Text(String),
}

/// An AND-combination of field constraints and free-text terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    terms: Vec<Term>,
}

impl QueryParameters {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to match the phrase `value`. Blank values are ignored.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.terms.push(Term::Field {
                name: name.to_owned(),
                value: value.to_owned(),
            });
        }
        self
    }

    /// Add free text matched against the entity's default fields.
    pub fn text(mut self, text: &str) -> Self {
        let text = text.trim();
        if !text.is_empty() {
            self.terms.push(Term::Text(text.to_owned()));
        }
        self
    }

    /// Whether no constraint has been added.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Render the Lucene filter string.
    pub fn to_filter(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            match term {
                Term::Field { name, value } => write!(f, "{name}:\"{}\"", escape_lucene(value))?,
                Term::Text(text) => f.write_str(&escape_lucene(text))?,
            }
        }
        Ok(())
    }
}

/// Backslash-escape every Lucene special character in `value`.
pub fn escape_lucene(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if LUCENE_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
