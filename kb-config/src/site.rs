use std::fmt;

/// A resolved Kuboard endpoint. Immutable once resolved; several clusters may
/// share one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSite {
    pub name: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub credentials: Credentials,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    /// Cookie header value Kuboard expects on every request.
    pub fn cookie(&self) -> String {
        format!(
            "KuboardUsername={}; KuboardAccessKey={}.{}",
            self.username, self.access_key, self.secret_key
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_format() {
        let creds = Credentials {
            username: "admin".into(),
            access_key: "ak123".into(),
            secret_key: "sk456".into(),
        };
        assert_eq!(
            creds.cookie(),
            "KuboardUsername=admin; KuboardAccessKey=ak123.sk456"
        );
        assert!(!format!("{creds:?}").contains("sk456"));
    }
}
