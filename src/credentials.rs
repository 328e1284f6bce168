//! Reserved usernames and their password hashes.
//!
//! Entries are loaded once at startup from a `username=hash` file and are
//! read-only afterwards, so the store is shared without locking.
//!
//! Hashes use the `pbkdf2:sha256[:iterations]$salt$hexdigest` layout
//! (PBKDF2-HMAC-SHA256 with a 32-byte key).

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::Sha256;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

const METHOD_PREFIX: &str = "pbkdf2:sha256";
pub const DEFAULT_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
    // Any stored hash; verified against when the username is unknown.
    decoy: Option<String>,
}

impl CredentialStore {
    /// Read `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let store = Self::parse(&contents);
                info!(
                    "Loaded {} reserved username(s) from {}",
                    store.len(),
                    path.display()
                );
                store
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No credentials file at {}, no usernames reserved", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Could not read credentials file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse newline-delimited `key=value` text. Lines without `=` are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                skipped += 1;
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                skipped += 1;
                continue;
            }
            entries.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        if skipped > 0 {
            warn!("Skipped {} malformed credential line(s)", skipped);
        }

        let decoy = entries.values().next().cloned();
        Self { entries, decoy }
    }

    pub fn is_reserved(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    /// True only when `username` is reserved and `password` matches its hash.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.entries.get(username) {
            Some(stored) => check_password_hash(stored, password),
            None => {
                if let Some(decoy) = &self.decoy {
                    let _ = check_password_hash(decoy, password);
                }
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Hash `password` with a fresh random salt and the default iteration count.
pub fn hash_password(password: &str) -> String {
    hash_password_with(password, &random_salt(), DEFAULT_ITERATIONS)
}

fn random_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

pub fn hash_password_with(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{}:{}${}${}",
        METHOD_PREFIX,
        iterations,
        salt,
        derive_hex(password, salt, iterations)
    )
}

/// Check `password` against a stored hash. Malformed hashes never match.
pub fn check_password_hash(stored: &str, password: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(method), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Some(iterations) = parse_method(method) else {
        return false;
    };

    let expected = expected.to_ascii_lowercase();
    let actual = derive_hex(password, salt, iterations);
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn parse_method(method: &str) -> Option<u32> {
    let rest = method.strip_prefix(METHOD_PREFIX)?;
    if rest.is_empty() {
        return Some(DEFAULT_ITERATIONS);
    }
    rest.strip_prefix(':')?
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
}

fn derive_hex(password: &str, salt: &str, iterations: u32) -> String {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);

    let mut hex = String::with_capacity(KEY_LEN * 2);
    for byte in key {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}
