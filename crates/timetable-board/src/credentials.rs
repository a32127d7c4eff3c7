//! The single persisted credential: the journal API bearer token.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use timetable_core::{Result, TimetableError};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    api_token: String,
    saved_at: String,
}

/// JSON file holding the API token, e.g. `~/.timetable/token.json`.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, or `None` when the file is missing, unreadable or blank.
    pub fn load(&self) -> Option<String> {
        let stored: StoredToken = std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())?;
        let token = stored.api_token.trim().to_string();
        (!token.is_empty()).then_some(token)
    }

    pub fn save(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TimetableError::Credential("refusing to store an empty token".to_string()));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            api_token: token.to_string(),
            saved_at: chrono::Local::now().to_rfc3339(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        info!(path = %self.path.display(), "API token stored");
        Ok(())
    }

    /// Forget the token, e.g. after the API rejected it.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                warn!(path = %self.path.display(), "API token removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ask for a token until a non-blank line is entered.
///
/// Returns [`TimetableError::MissingToken`] when input ends first.
pub fn prompt_token(mut input: impl BufRead, mut output: impl Write) -> Result<String> {
    loop {
        write!(output, "API-Token für \"Beste Schule\" eingeben: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(TimetableError::MissingToken);
        }
        let token = line.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("nested").join("token.json"))
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        assert!(store.load().is_none());

        store.save("  abc.def.ghi \n").expect("save");
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = store_in(&dir).save("   ").unwrap_err();
        assert_eq!(err.code(), "CREDENTIAL_ERROR");
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path().join("token.json"));
        std::fs::write(store.path(), "not json").expect("write");
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save("tok").expect("save");
        store.clear().expect("clear");
        store.clear().expect("second clear");
        assert!(store.load().is_none());
    }

    #[test]
    fn prompt_skips_blank_lines() {
        let input = std::io::Cursor::new("\n   \n secret \n");
        let mut output = Vec::new();
        let token = prompt_token(input, &mut output).expect("token");
        assert_eq!(token, "secret");
        assert!(String::from_utf8(output).unwrap().contains("API-Token"));
    }

    #[test]
    fn prompt_fails_on_eof() {
        let input = std::io::Cursor::new("");
        let err = prompt_token(input, Vec::new()).unwrap_err();
        assert!(matches!(err, TimetableError::MissingToken));
    }
}
