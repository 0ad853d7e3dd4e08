//! Invocation parsing — message text to flags, options and parameters
//!
//! `firewall --zone=public --add-forward-port=80:tcp:80:10.0.0.1 --permanent`
//!
//! Tokens starting with `--` or `/` are flags, or options when they contain a
//! separator (`=` or `:`; the earliest one splits name from value). Options
//! may repeat. Everything else is a positional parameter. Quotes (`"…"`,
//! `“…”`, `「…」`) group text containing whitespace into one token.

use std::collections::{BTreeMap, BTreeSet};

const PREFIXES: [&str; 2] = ["--", "/"];
const SEPARATORS: [char; 2] = ['=', ':'];
const QUOTES: [(char, char); 3] = [('"', '"'), ('“', '”'), ('「', '」')];

/// A parsed command request. Built once per command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    parameters: Vec<String>,
    flags: BTreeSet<String>,
    options: BTreeMap<String, Vec<String>>,
}

impl Invocation {
    pub fn parse(text: &str) -> Self {
        let mut invocation = Self::default();
        for token in tokenize(text) {
            invocation.push_token(token);
        }
        invocation
    }

    fn push_token(&mut self, token: Token) {
        if token.quoted {
            self.parameters.push(token.text);
            return;
        }

        let body = PREFIXES
            .iter()
            .find_map(|p| token.text.strip_prefix(p))
            .filter(|body| !body.is_empty())
            .map(str::to_string);
        let Some(body) = body else {
            self.parameters.push(token.text);
            return;
        };

        match body.find(|c: char| SEPARATORS.contains(&c)) {
            Some(at) => {
                let (name, value) = (&body[..at], &body[at + 1..]);
                self.options
                    .entry(name.to_string())
                    .or_default()
                    .push(value.to_string());
            }
            None => {
                self.flags.insert(body);
            }
        }
    }

    /// The command name: the first positional parameter.
    pub fn command(&self) -> Option<&str> {
        self.parameters.first().map(String::as_str)
    }

    /// Positional parameters after the command name.
    pub fn arguments(&self) -> &[String] {
        self.parameters.get(1..).unwrap_or_default()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Last value given for an option.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Every value given for a repeatable option, in order.
    pub fn options(&self, name: &str) -> &[String] {
        self.options.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// True when no flag and no option was given.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.options.is_empty()
    }
}

struct Token {
    text: String,
    quoted: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if let Some(&(_, close)) = QUOTES.iter().find(|(open, _)| *open == c) {
            chars.next();
            let text: String = chars.by_ref().take_while(|&ch| ch != close).collect();
            tokens.push(Token { text, quoted: true });
            continue;
        }

        let mut text = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() {
                break;
            }
            if let Some(&(_, close)) = QUOTES.iter().find(|(open, _)| *open == ch) {
                // A quote inside a word, e.g. --zone="my zone", extends the word.
                chars.next();
                text.extend(chars.by_ref().take_while(|&q| q != close));
                continue;
            }
            text.push(ch);
            chars.next();
        }
        tokens.push(Token {
            text,
            quoted: false,
        });
    }

    tokens
}
