use std::fmt;

use crate::model::TIME_COLUMN;

/// A lexical piece of a raw column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelToken {
    /// A run of ASCII digits, e.g. the mass number in `88Sr`.
    Number(u32),
    /// A run of ASCII letters, e.g. `Sr`, `Mass` or `Time`.
    Word(String),
}

/// Splits a header into digit runs and letter runs; every other character
/// separates tokens.
pub fn tokenize_header(raw: &str) -> Vec<ChannelToken> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&d) = chars.peek().filter(|c| c.is_ascii_digit()) {
                digits.push(d);
                chars.next();
            }
            // digit runs longer than u32 cannot be masses; keep them as words
            match digits.parse::<u32>() {
                Ok(number) => tokens.push(ChannelToken::Number(number)),
                Err(_) => tokens.push(ChannelToken::Word(digits)),
            }
        } else if ch.is_ascii_alphabetic() {
            let mut word = String::new();
            while let Some(&c) = chars.peek().filter(|c| c.is_ascii_alphabetic()) {
                word.push(c);
                chars.next();
            }
            tokens.push(ChannelToken::Word(word));
        } else {
            chars.next();
        }
    }

    tokens
}

/// Canonical column name derived from a raw Agilent header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelName {
    Time,
    Isotope { element: String, mass: u32 },
}

impl ChannelName {
    /// Classifies a header from its tokens. `None` when the header carries
    /// neither a `Time` marker nor a mass number plus element symbol.
    pub fn from_tokens(tokens: &[ChannelToken]) -> Option<Self> {
        if tokens
            .iter()
            .any(|token| matches!(token, ChannelToken::Word(word) if word == TIME_COLUMN))
        {
            return Some(ChannelName::Time);
        }

        let mass = tokens.iter().find_map(|token| match token {
            ChannelToken::Number(number) => Some(*number),
            ChannelToken::Word(_) => None,
        })?;
        let element = tokens.iter().find_map(|token| match token {
            ChannelToken::Word(word) if is_element_symbol(word) => Some(word.clone()),
            _ => None,
        })?;

        Some(ChannelName::Isotope { element, mass })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::from_tokens(&tokenize_header(raw))
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelName::Time => f.write_str(TIME_COLUMN),
            ChannelName::Isotope { element, mass } => write!(f, "{element}{mass}"),
        }
    }
}

fn is_element_symbol(word: &str) -> bool {
    let mut chars = word.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(first), None, None) => first.is_ascii_uppercase(),
        (Some(first), Some(second), None) => {
            first.is_ascii_uppercase() && second.is_ascii_lowercase()
        }
        _ => false,
    }
}
