//! Account token validation and session header construction

use base64::{engine::general_purpose, Engine as _};
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use std::error::Error;
use std::fmt;
use std::io::{BufRead, Write};
use tracing::{debug, error};

const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
];

#[derive(Debug, PartialEq, Eq)]
pub enum CredentialError {
    Missing,
    Numeric,
    Malformed(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Missing => write!(f, "Token not given"),
            CredentialError::Numeric => write!(f, "Token can't be numeric"),
            CredentialError::Malformed(token) => write!(f, "{token} is not a valid token"),
        }
    }
}

impl Error for CredentialError {}

/// A validated account token
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            return Err(CredentialError::Numeric);
        }
        if token.split('.').count() != 3 {
            return Err(CredentialError::Malformed(token.to_string()));
        }

        let credentials = Self {
            token: token.to_string(),
        };
        if let Some(account_id) = credentials.account_id() {
            debug!("Token belongs to account {}", account_id);
        }
        Ok(credentials)
    }

    /// Keep asking on `input` until a valid token is entered
    pub fn prompt<R: BufRead, W: Write>(mut input: R, mut output: W) -> std::io::Result<Self> {
        loop {
            writeln!(output, "Enter your Discord token:")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "no token given before end of input",
                ));
            }

            match Self::parse(&line) {
                Ok(credentials) => return Ok(credentials),
                Err(e) => error!("{}", e),
            }
        }
    }

    /// The account id encoded in the first token segment, when it decodes
    pub fn account_id(&self) -> Option<String> {
        let segment = self.token.split('.').next()?;
        let decoded = general_purpose::STANDARD_NO_PAD
            .decode(segment.trim_end_matches('='))
            .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')))
            .ok()?;
        let id = String::from_utf8(decoded).ok()?;
        (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
    }

    /// Headers attached to every request of the session
    pub fn headers(&self) -> Result<HeaderMap, Box<dyn Error + Send + Sync>> {
        let mut auth = HeaderValue::from_str(&self.token)?;
        auth.set_sensitive(true);

        let agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(USER_AGENT, HeaderValue::from_static(agent));
        Ok(headers)
    }
}
