//! Argument model for invoking the external media engine.
//!
//! A [`CommandBuilder`] collects an ordered list of tokens whose first entry is
//! always the program name. Tokens are passed to the process verbatim: no
//! quoting or escaping is performed, so callers must not rely on [`CommandSpec::build`]
//! producing a shell-safe string for tokens that contain whitespace.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("command argument must not be blank")]
    BlankArgument,

    #[error("argument list must not be empty")]
    EmptyArguments,
}

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tokens: Vec<String>,
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Result<Self> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(CommandError::BlankArgument);
        }
        Ok(Self {
            tokens: vec![program],
        })
    }

    /// Append a single token. `None` and blank strings are rejected.
    pub fn add_argument<S: AsRef<str>>(&mut self, token: Option<S>) -> Result<&mut Self> {
        let token = token.ok_or(CommandError::BlankArgument)?;
        self.push(token.as_ref())?;
        Ok(self)
    }

    /// Shorthand for [`add_argument`](Self::add_argument) with a present value.
    pub fn arg(&mut self, token: impl AsRef<str>) -> Result<&mut Self> {
        self.push(token.as_ref())?;
        Ok(self)
    }

    /// Append a key and its value as two tokens.
    pub fn add_pair(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<&mut Self> {
        let (key, value) = (key.as_ref(), value.as_ref());
        if key.trim().is_empty() || value.trim().is_empty() {
            return Err(CommandError::BlankArgument);
        }
        self.tokens.push(key.to_string());
        self.tokens.push(value.to_string());
        Ok(self)
    }

    /// Append every token from a non-empty list. Nothing is appended if any
    /// token is blank.
    pub fn add_all<I, S>(&mut self, tokens: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect();
        if tokens.is_empty() {
            return Err(CommandError::EmptyArguments);
        }
        if tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(CommandError::BlankArgument);
        }
        self.tokens.extend(tokens);
        Ok(self)
    }

    pub fn finish(&self) -> CommandSpec {
        CommandSpec {
            tokens: self.tokens.clone(),
        }
    }

    pub fn build(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn list(&self) -> Vec<String> {
        self.tokens.clone()
    }

    fn push(&mut self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(CommandError::BlankArgument);
        }
        self.tokens.push(token.to_string());
        Ok(())
    }
}

/// An immutable, non-empty command line. The first token is the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn build(&self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

/// Builder preloaded with the engine invocation prefix
/// `<engine> -v <loglevel> -i <input>`.
pub fn engine_command(
    engine: &str,
    log_level: &str,
    input: &std::path::Path,
) -> Result<CommandBuilder> {
    let mut builder = CommandBuilder::new(engine)?;
    builder
        .add_pair("-v", log_level)?
        .add_pair("-i", input.to_string_lossy())?;
    Ok(builder)
}
