//! Command line lexing.
//!
//! [`split_words`] cuts a line into words, honouring single and double quotes
//! and backslash escapes inside quotes. [`classify`] then tells option tokens
//! (`--flag`, `--flag=value`, `-f`, `-abc`) apart from plain words.

use std::mem;

/// A classified word from the argument part of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A plain word (value or positional argument).
    Word(String),
    /// A long option (`--name` or `--name=value`).
    LongOption { name: String, value: Option<String> },
    /// One or more short options (`-a` or `-abc`).
    ShortOptions(Vec<char>),
    /// The `--` marker; everything after it is a plain word.
    EndOfOptions,
}

/// Lexer position while splitting a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    /// Between words.
    Gap,
    /// Inside a word, outside quotes.
    Bare,
    /// Inside a quoted span opened by the given quote.
    Quoted(char),
    /// Right after a backslash inside a quoted span.
    Escape(char),
}

/// Splits a command line into words.
///
/// `say "hello world"` gives `say` and `hello world`. Quotes may be glued to
/// text (`name="John Doe"` is the single word `name=John Doe`), and `""` is an
/// empty word. An unterminated quote runs to the end of the line.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut state = Lex::Gap;

    for c in input.chars() {
        state = match state {
            Lex::Escape(quote) => {
                match unescape(c) {
                    Some(unescaped) => current.push(unescaped),
                    None => {
                        current.push('\\');
                        current.push(c);
                    }
                }
                Lex::Quoted(quote)
            }
            Lex::Quoted(quote) if c == '\\' => Lex::Escape(quote),
            Lex::Quoted(quote) if c == quote => Lex::Bare,
            Lex::Quoted(quote) => {
                current.push(c);
                Lex::Quoted(quote)
            }
            Lex::Gap | Lex::Bare if c.is_whitespace() => {
                if state == Lex::Bare {
                    words.push(mem::take(&mut current));
                }
                Lex::Gap
            }
            Lex::Gap | Lex::Bare if c == '"' || c == '\'' => Lex::Quoted(c),
            Lex::Gap | Lex::Bare => {
                current.push(c);
                Lex::Bare
            }
        };
    }

    if state != Lex::Gap {
        words.push(current);
    }
    words
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' | '"' | '\'' => Some(c),
        _ => None,
    }
}

/// Classifies a single word as an option token or a plain word.
///
/// A lone `-`, and dash-prefixed numerals such as `-5`, `-1.5` or `-.5`, are
/// plain words. `-inf` and `-nan` are short options.
pub fn classify(word: &str) -> Token {
    if word == "--" {
        return Token::EndOfOptions;
    }

    if let Some(rest) = word.strip_prefix("--") {
        return match rest.split_once('=') {
            Some((name, value)) => Token::LongOption {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => Token::LongOption {
                name: rest.to_string(),
                value: None,
            },
        };
    }

    if let Some(rest) = word.strip_prefix('-') {
        if rest.is_empty() || is_numeral(rest) {
            return Token::Word(word.to_string());
        }
        return Token::ShortOptions(rest.chars().collect());
    }

    Token::Word(word.to_string())
}

fn is_numeral(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '.') && text.parse::<f64>().is_ok()
}

/// Classifies every word, treating all words after `--` as plain words.
pub fn tokenize(words: &[String]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(words.len());
    let mut options_ended = false;

    for word in words {
        if options_ended {
            tokens.push(Token::Word(word.clone()));
            continue;
        }
        let token = classify(word);
        if token == Token::EndOfOptions {
            options_ended = true;
        }
        tokens.push(token);
    }

    tokens
}
