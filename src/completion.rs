//! Tab completion.
//!
//! Completion works on a [`CompletionContext`]: the words typed so far, the
//! index of the word under the cursor and the cursor offset within it.
//! Command names are completed word by word against the catalog; once a full
//! command name precedes the cursor, every [`CompletionResolver`] adds
//! proposals for that command's options.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::trace;

use crate::commands::catalog::{find_command, Registrations};
use crate::commands::registration::CommandRegistration;
use crate::commands::tokenizer::split_words;

/// The words of a partially typed line and the cursor within them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    words: Vec<String>,
    word_index: usize,
    position: usize,
}

impl CompletionContext {
    /// Creates a context. The word index and the position are clamped so
    /// that they always point into `words`.
    pub fn new(words: Vec<String>, word_index: usize, position: usize) -> Self {
        let mut words = words;
        if words.is_empty() {
            words.push(String::new());
        }
        let word_index = word_index.min(words.len() - 1);
        let position = position.min(words[word_index].chars().count());
        Self {
            words,
            word_index,
            position,
        }
    }

    /// Context for a cursor at the end of `text`. Trailing whitespace starts
    /// a new, empty word.
    pub fn for_line(text: &str) -> Self {
        let mut words = split_words(text);
        if text.is_empty() || text.ends_with(char::is_whitespace) {
            words.push(String::new());
        }
        let word_index = words.len().saturating_sub(1);
        let position = words
            .get(word_index)
            .map(|w| w.chars().count())
            .unwrap_or(0);
        Self::new(words, word_index, position)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The full word under the cursor.
    pub fn current_word(&self) -> &str {
        &self.words[self.word_index]
    }

    /// The part of the current word before the cursor.
    pub fn current_word_prefix(&self) -> String {
        self.current_word().chars().take(self.position).collect()
    }

    /// Words before the one under the cursor.
    pub fn preceding_words(&self) -> &[String] {
        &self.words[..self.word_index]
    }
}

/// One candidate for the word under the cursor.
///
/// Equality and ordering only consider [`value`](Self::value).
#[derive(Debug, Clone)]
pub struct CompletionProposal {
    value: String,
    display: Option<String>,
    description: Option<String>,
    complete: bool,
}

impl CompletionProposal {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: None,
            description: None,
            complete: true,
        }
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks whether accepting the proposal finishes the word.
    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Label shown in candidate lists, the value when none was given.
    pub fn display_text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.value)
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl PartialEq for CompletionProposal {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for CompletionProposal {}

impl PartialOrd for CompletionProposal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompletionProposal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

/// Produces proposals for a matched command.
pub trait CompletionResolver: Send + Sync {
    fn resolve(
        &self,
        registration: &CommandRegistration,
        context: &CompletionContext,
    ) -> Vec<CompletionProposal>;
}

/// Proposes every option name of the command: all `--long` names in
/// declaration order, then all `-s` short names. Filtering by what was
/// already typed is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompletionResolver;

impl CompletionResolver for DefaultCompletionResolver {
    fn resolve(
        &self,
        registration: &CommandRegistration,
        _context: &CompletionContext,
    ) -> Vec<CompletionProposal> {
        let options = registration.options();
        let long = options.iter().flat_map(|o| {
            o.long_names().iter().map(move |name| {
                with_description(CompletionProposal::new(format!("--{name}")), o.description())
            })
        });
        let short = options.iter().flat_map(|o| {
            o.short_names().iter().map(move |name| {
                with_description(CompletionProposal::new(format!("-{name}")), o.description())
            })
        });
        long.chain(short).collect()
    }
}

fn with_description(proposal: CompletionProposal, description: Option<&str>) -> CompletionProposal {
    match description {
        Some(description) => proposal.description(description),
        None => proposal,
    }
}

/// Completes the word under the cursor against the catalog.
///
/// Command proposals are the remaining words of every visible command whose
/// earlier words equal the typed ones and whose word at the cursor starts
/// with the typed prefix; they come sorted by value. Option proposals from
/// `resolvers` follow when a full command name precedes the cursor.
pub fn complete(
    registrations: &Registrations,
    resolvers: &[Arc<dyn CompletionResolver>],
    context: &CompletionContext,
) -> Vec<CompletionProposal> {
    let index = context.word_index();
    let prefix = context.current_word_prefix();
    let typed = context.preceding_words();

    let mut proposals: Vec<CompletionProposal> = registrations
        .values()
        .filter(|r| !r.is_hidden())
        .filter(|r| {
            let words = r.words();
            words.len() > index && words[..index] == *typed && words[index].starts_with(&prefix)
        })
        .map(|r| {
            let value = r.words()[index..].join(" ");
            with_description(CompletionProposal::new(value), r.description())
        })
        .collect();
    proposals.sort();
    proposals.dedup();

    if let Some(registration) = find_command(registrations, typed) {
        for resolver in resolvers {
            proposals.extend(
                resolver
                    .resolve(registration, context)
                    .into_iter()
                    .filter(|p| p.value().starts_with(&prefix)),
            );
        }
    }

    trace!(
        word_index = index,
        prefix = %prefix,
        count = proposals.len(),
        "Completed"
    );
    proposals
}
