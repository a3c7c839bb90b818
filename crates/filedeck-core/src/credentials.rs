//! Credential sources
//!
//! The upload orchestrator and the dashboard fetch never read ambient state for the
//! bearer token. They receive a [`TokenSource`] and ask it at the moment the token
//! is needed, so a token that appears (login) or disappears (logout) between two
//! submissions is honoured.

use std::fmt;

/// Accessor for the current bearer token.
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` when the user is not authenticated.
    fn token(&self) -> Option<String>;
}

/// Fixed token, e.g. taken from a command-line flag.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(token))
        }
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.0.as_ref().map(|_| "<redacted>");
        f.debug_tuple("StaticToken").field(&shown).finish()
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads an environment variable on every call.
#[derive(Clone, Debug)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub const DEFAULT_VAR: &'static str = "FILEDECK_TOKEN";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl TokenSource for EnvToken {
    fn token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}
