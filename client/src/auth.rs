use std::env;

/// Builds the token scope requested for this application.
pub fn api_scope(app_id: &str) -> String {
    format!("api://{}/api", app_id)
}

/// Why no token could be produced. Both variants collapse to the same
/// unauthenticated fallback; the distinction exists for the log only.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("no signed-in identity")]
    NotSignedIn,
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Source of bearer tokens for the currently signed-in identity.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    async fn acquire_token(&self, scope: &str) -> Result<String, TokenError>;
}

/// Provider that always hands out the same token. Useful for tests and for
/// piping a token obtained elsewhere.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    async fn acquire_token(&self, _scope: &str) -> Result<String, TokenError> {
        Ok(self.token.clone())
    }
}

/// Provider that reads the token from an environment variable; an unset
/// variable means nobody is signed in.
pub struct EnvTokenProvider {
    variable: String,
}

impl EnvTokenProvider {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl TokenProvider for EnvTokenProvider {
    async fn acquire_token(&self, _scope: &str) -> Result<String, TokenError> {
        env::var(&self.variable).map_err(|_| TokenError::NotSignedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_embeds_application_id() {
        assert_eq!(api_scope("my-app"), "api://my-app/api");
    }

    #[tokio::test]
    async fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("tok");
        assert_eq!(provider.acquire_token("api://x/api").await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn unset_variable_means_not_signed_in() {
        let provider = EnvTokenProvider::new("IQENGINE_TEST_TOKEN_THAT_IS_NEVER_SET");
        let result = provider.acquire_token("api://x/api").await;
        assert!(matches!(result, Err(TokenError::NotSignedIn)));
    }
}
