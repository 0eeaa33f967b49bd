use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub username: String,
    /// `None` for accounts on the local domain.
    #[serde(default)]
    pub domain: Option<String>,
    pub url: String,
}

impl Reference {
    pub fn new(username: impl Into<String>, domain: Option<&str>, url: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            domain: domain.map(str::to_string),
            url: url.into(),
        }
    }

    pub fn acct(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}@{}", self.username, domain),
            None => self.username.clone(),
        }
    }
}

pub trait Directory: Send + Sync {
    fn local_domain(&self) -> &str;

    /// Looks up `username` on `domain`; `None` means the local domain.
    fn resolve(&self, username: &str, domain: Option<&str>) -> Option<Reference>;

    fn is_local_domain(&self, domain: &str) -> bool {
        domain.eq_ignore_ascii_case(self.local_domain())
    }

    /// Case-insensitive; an explicit local-domain suffix equals no suffix.
    fn same_handle(&self, a: &str, b: &str) -> bool {
        let (a_user, a_domain) = self.split_handle(a);
        let (b_user, b_domain) = self.split_handle(b);
        if !a_user.eq_ignore_ascii_case(b_user) {
            return false;
        }
        match (a_domain, b_domain) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    fn split_handle<'h>(&self, handle: &'h str) -> (&'h str, Option<&'h str>) {
        let handle = handle.strip_prefix('@').unwrap_or(handle);
        match handle.split_once('@') {
            Some((user, domain)) if !self.is_local_domain(domain) => (user, Some(domain)),
            Some((user, _)) => (user, None),
            None => (handle, None),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticDirectory {
    local_domain: String,
    entries: HashMap<(String, Option<String>), Reference>,
}

impl StaticDirectory {
    pub fn new(local_domain: impl Into<String>) -> Self {
        Self {
            local_domain: local_domain.into(),
            entries: HashMap::new(),
        }
    }

    pub fn with_references<I>(local_domain: impl Into<String>, references: I) -> Self
    where
        I: IntoIterator<Item = Reference>,
    {
        let mut directory = Self::new(local_domain);
        for reference in references {
            directory.insert(reference);
        }
        directory
    }

    pub fn insert(&mut self, reference: Reference) {
        let key = self.key(&reference.username, reference.domain.as_deref());
        self.entries.insert(key, reference);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(&self, username: &str, domain: Option<&str>) -> (String, Option<String>) {
        let domain = domain
            .filter(|domain| !self.is_local_domain(domain))
            .map(str::to_ascii_lowercase);
        (username.to_ascii_lowercase(), domain)
    }
}

impl Directory for StaticDirectory {
    fn local_domain(&self) -> &str {
        &self.local_domain
    }

    fn resolve(&self, username: &str, domain: Option<&str>) -> Option<Reference> {
        self.entries.get(&self.key(username, domain)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{Directory, Reference, StaticDirectory};

    fn directory() -> StaticDirectory {
        StaticDirectory::with_references(
            "social.example",
            [
                Reference::new("alice", None, "https://social.example/@alice"),
                Reference::new("bob", Some("Remote.example"), "https://remote.example/@bob"),
            ],
        )
    }

    #[test]
    fn local_suffix_is_equivalent_to_none() {
        let directory = directory();
        assert!(directory.same_handle("Alice", "alice@social.example"));
        assert!(directory.same_handle("@alice", "ALICE@SOCIAL.EXAMPLE"));
        assert!(!directory.same_handle("alice", "alice@remote.example"));
    }

    #[test]
    fn resolve_ignores_case_and_local_suffix() {
        let directory = directory();
        assert_eq!(
            directory.resolve("ALICE", Some("social.example")).map(|r| r.url),
            Some("https://social.example/@alice".to_string())
        );
        assert!(directory.resolve("bob", Some("remote.example")).is_some());
        assert!(directory.resolve("bob", None).is_none());
    }

    #[test]
    fn acct_includes_remote_domain() {
        let bob = Reference::new("bob", Some("remote.example"), "https://remote.example/@bob");
        assert_eq!(bob.acct(), "bob@remote.example");
    }
}
