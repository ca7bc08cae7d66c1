use std::env;
use std::fmt;

use crate::error::Error;

pub const SESSION_ID_VAR: &str = "CSC_SESSION_ID";

/// A pre-obtained platform session. There is no login flow; the token is sent as-is.
#[derive(Clone)]
pub struct Creds {
    session_id: String,
}

impl Creds {
    pub fn from_env() -> Result<Self, Error> {
        let session_id = env::var(SESSION_ID_VAR).map_err(|source| Error::MissingVar {
            name: SESSION_ID_VAR,
            source,
        })?;
        Ok(Self::new(session_id))
    }

    pub fn new(session_id: String) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl fmt::Debug for Creds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creds")
            .field("session_id", &"<hidden>")
            .finish()
    }
}
