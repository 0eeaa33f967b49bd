use crate::directory::Reference;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Local,
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentUnit {
    pub origin: Origin,
    pub text: String,
    /// Accounts the author mentioned; only these are linked.
    pub references: Vec<Reference>,
}

impl ContentUnit {
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Local,
            text: text.into(),
            references: Vec::new(),
        }
    }

    pub fn remote(html: impl Into<String>) -> Self {
        Self {
            origin: Origin::Remote,
            text: html.into(),
            references: Vec::new(),
        }
    }

    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }
}
