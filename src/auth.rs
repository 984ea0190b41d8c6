use std::process::Command;

/// Environment variable consulted before falling back to the gh CLI.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Resolves a GitHub token from `GITHUB_TOKEN`, then from `gh auth token`.
///
/// Returns `None` when neither source yields a token; the caller decides
/// whether that is fatal.
pub fn resolve_token() -> Option<String> {
    resolve_token_with(|name| std::env::var(name).ok(), gh_auth_token)
}

/// Token resolution with injectable sources.
pub fn resolve_token_with<E, H>(env: E, helper: H) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
    H: FnOnce() -> Option<String>,
{
    if let Some(token) = env(TOKEN_ENV_VAR).filter(|t| !t.is_empty()) {
        tracing::debug!("using token from {TOKEN_ENV_VAR}");
        return Some(token);
    }

    let token = helper()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if token.is_some() {
        tracing::debug!("using token from gh CLI");
    }

    token
}

fn gh_auth_token() -> Option<String> {
    let output = match Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!("gh CLI unavailable: {err}");
            return None;
        }
    };

    if !output.status.success() {
        tracing::debug!("gh auth token exited with {}", output.status);
        return None;
    }

    String::from_utf8(output.stdout).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(token: Option<&str>) -> impl Fn(&str) -> Option<String> {
        let token = token.map(str::to_string);
        move |name| {
            assert_eq!(name, TOKEN_ENV_VAR);
            token.clone()
        }
    }

    #[test]
    fn test_env_token_used_verbatim() {
        let token = resolve_token_with(env_with(Some("env-token-123")), || {
            panic!("gh CLI must not be consulted when the env var is set")
        });
        assert_eq!(token.as_deref(), Some("env-token-123"));
    }

    #[test]
    fn test_falls_back_to_cli_and_trims() {
        let token = resolve_token_with(env_with(None), || Some("  cli-token-789  \n".to_string()));
        assert_eq!(token.as_deref(), Some("cli-token-789"));
    }

    #[test]
    fn test_empty_env_var_falls_back_to_cli() {
        let token = resolve_token_with(env_with(Some("")), || Some("cli-token".to_string()));
        assert_eq!(token.as_deref(), Some("cli-token"));
    }

    #[test]
    fn test_no_credential_anywhere() {
        assert_eq!(resolve_token_with(env_with(None), || None), None);
        assert_eq!(
            resolve_token_with(env_with(None), || Some("\n".to_string())),
            None
        );
    }
}
