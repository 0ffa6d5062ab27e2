// src/queue/token.rs

//! Opaque handles naming submitted tasks.

use std::fmt;

/// Internal sequence number issued by the queue for every submission.
pub(crate) type TaskKey = u64;

/// Handle to a task returned by [`TaskQueue::submit`](super::TaskQueue::submit).
///
/// Tokens are the only way to name a task as a dependency or to wait on it.
/// They cannot be built outside this crate, so every token in circulation was
/// issued by some queue. A token does not keep its task alive: once the task
/// has finished and its entry was reclaimed, the token simply stops matching
/// anything, which the queue reads as "already finished".
///
/// Callers cannot mint a token from a raw number:
///
/// ```compile_fail
/// let forged = depqueue::Token::new(5);
/// ```
///
/// ```compile_fail
/// let forged = depqueue::Token { key: 5 };
/// ```
///
/// Reading the number back is allowed:
///
/// ```
/// # fn main() -> depqueue::errors::Result<()> {
/// let queue = depqueue::TaskQueue::new()?;
/// let token = queue.submit(|| {})?;
/// assert_eq!(token.key(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    key: TaskKey,
}

impl Token {
    pub(crate) fn new(key: TaskKey) -> Self {
        Self { key }
    }

    /// The sequence number this token wraps.
    pub fn key(&self) -> u64 {
        self.key
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_sequence_number() {
        let a = Token::new(3);
        let b = Token::new(10);

        assert!(a < b);
        assert_eq!(a, Token::new(3));
        assert_eq!(b.key(), 10);
        assert_eq!(a.to_string(), "task#3");
    }
}
