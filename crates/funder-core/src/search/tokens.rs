//! Text normalization for the search index.

/// A lowercased word and where it sits in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub chars: Vec<char>,
    /// Char offset of the first character in the source text.
    pub start: usize,
}

impl Token {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Lowercase one character without changing the char count, so offsets into
/// the normalized text are offsets into the original.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Split `text` into alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;

    for (offset, c) in text.chars().enumerate() {
        if c.is_alphanumeric() {
            current
                .get_or_insert_with(|| Token {
                    chars: Vec::new(),
                    start: offset,
                })
                .chars
                .push(fold(c));
        } else if let Some(token) = current.take() {
            tokens.push(token);
        }
    }
    if let Some(token) = current {
        tokens.push(token);
    }

    tokens
}

/// Query terms in query order, duplicates removed.
pub fn query_terms(query: &str) -> Vec<Vec<char>> {
    let mut terms: Vec<Vec<char>> = Vec::new();
    for token in tokenize(query) {
        if !terms.contains(&token.chars) {
            terms.push(token.chars);
        }
    }
    terms
}
