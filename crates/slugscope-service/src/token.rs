//! Sources of the short tokens appended to colliding candidates.

use std::sync::atomic::{AtomicUsize, Ordering};

use slugscope_core::constants::TOKEN_LENGTH;

pub trait TokenSource {
    /// Produces a fresh token. Callers keep only the first few characters.
    fn next_token(&self) -> String;
}

impl<T: TokenSource + ?Sized> TokenSource for &T {
    fn next_token(&self) -> String {
        (**self).next_token()
    }
}

/// Tokens cut from random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn next_token(&self) -> String {
        uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(TOKEN_LENGTH)
            .collect()
    }
}

/// Replays a fixed list of tokens in order, wrapping around at the end.
#[derive(Debug, Default)]
pub struct SequenceTokenSource {
    tokens: Vec<String>,
    issued: AtomicUsize,
}

impl SequenceTokenSource {
    #[must_use]
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            issued: AtomicUsize::new(0),
        }
    }

    /// Number of tokens handed out so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }
}

impl TokenSource for SequenceTokenSource {
    fn next_token(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed);
        if self.tokens.is_empty() {
            return format!("{n:0width$}", width = TOKEN_LENGTH);
        }
        self.tokens[n % self.tokens.len()].clone()
    }
}
