//! CLI command implementations.

pub mod admin;
pub mod api;
pub mod migrate;

use std::io::BufRead;

use secrecy::SecretString;

/// Get database URL from `ADMIN_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Read a password from `env_key`, or from one line of stdin.
///
/// The trailing newline is stripped; an empty line yields an empty string,
/// which the API rejects as a missing field.
fn read_password(env_key: &str, prompt: &str) -> std::io::Result<String> {
    if let Ok(password) = std::env::var(env_key) {
        return Ok(password);
    }

    #[allow(clippy::print_stderr)]
    {
        eprint!("{prompt}: ");
    }

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
