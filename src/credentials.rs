//! Access token acquisition
//!
//! Tokens come from [`TOKEN_ENV_VAR`] or, failing that, a single interactive prompt.
//! Input is read through an explicit [`InputReader`] so the prompt can be driven by
//! anything implementing `BufRead`.

use std::fmt;
use std::io::{BufRead, Write};

/// Environment variable holding the API token
pub const TOKEN_ENV_VAR: &str = "REPOSIFT_GITHUB_TOKEN";

/// A non-blank access token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// `None` if `token` is blank
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self { token })
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for an HTTP `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Read the token from the environment
    pub fn from_env() -> Option<Self> {
        std::env::var(TOKEN_ENV_VAR).ok().and_then(Self::new)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Line-oriented interactive input
pub struct InputReader<R> {
    input: R,
}

impl<R: BufRead> InputReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Print `prompt` to `out` and read one line, without its terminator
    ///
    /// Returns `None` at end of input.
    pub fn prompt_line<W: Write>(&mut self, out: &mut W, prompt: &str) -> std::io::Result<Option<String>> {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

impl InputReader<std::io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock())
    }
}

/// Environment token if present, otherwise ask once
///
/// A blank answer or end of input continues without credentials.
pub fn acquire_or_prompt<R: BufRead, W: Write>(
    reader: &mut InputReader<R>,
    out: &mut W,
) -> std::io::Result<Option<Credentials>> {
    if let Some(credentials) = Credentials::from_env() {
        log::info!("Using API token from {}", TOKEN_ENV_VAR);
        return Ok(Some(credentials));
    }

    writeln!(out, "Enter a GitHub access token for more favorable rate limits.")?;
    writeln!(out, "Leave it blank to continue without authentication.")?;
    writeln!(out, "(The token can also be set in the {} environment variable.)", TOKEN_ENV_VAR)?;

    let credentials = reader
        .prompt_line(out, "GitHub access token: ")?
        .and_then(Credentials::new);
    writeln!(out)?;

    if credentials.is_none() {
        log::info!("No credentials provided");
    }
    Ok(credentials)
}
