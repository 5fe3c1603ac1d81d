use std::collections::HashMap;

/// Credentials required to authenticate against the broker. Held by the
/// Supervisor (via the session interface), never by DGW itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub activation_key: String,
    pub user: String,
    pub password: String,
}

/// [`Credentials`] could not be assembled from the supplied environment map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("missing required variable: {0}")]
    Missing(&'static str),
}

impl Credentials {
    /// Builds [`Credentials`] from a raw environment-variable map.
    ///
    /// Takes a `HashMap` rather than reading `std::env` directly so it can be
    /// exercised in tests without mutating process-global state; the actual
    /// env-file loading is an external collaborator's responsibility.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, CredentialsError> {
        let user = vars
            .get("BROKER_USER")
            .cloned()
            .ok_or(CredentialsError::Missing("BROKER_USER"))?;
        let password = vars
            .get("BROKER_PASSWORD")
            .cloned()
            .ok_or(CredentialsError::Missing("BROKER_PASSWORD"))?;
        let activation_key = vars.get("BROKER_ACTIVATION_KEY").cloned().unwrap_or_default();
        Ok(Self {
            activation_key,
            user,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_env_map() {
        let mut vars = HashMap::new();
        vars.insert("BROKER_USER".into(), "alice".into());
        vars.insert("BROKER_PASSWORD".into(), "secret".into());
        let creds = Credentials::from_env_map(&vars).unwrap();
        assert_eq!(creds.user, "alice");
        assert_eq!(creds.activation_key, "");
    }

    #[test]
    fn rejects_missing_password() {
        let mut vars = HashMap::new();
        vars.insert("BROKER_USER".into(), "alice".into());
        assert!(Credentials::from_env_map(&vars).is_err());
    }
}
