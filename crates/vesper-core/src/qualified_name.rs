//! Namespace-qualified names.

use std::fmt;

/// A name qualified by its namespace path, used when declaring symbols and
/// when resolving `A::B::C` paths.
///
/// # Examples
///
/// ```
/// use vesper_core::QualifiedName;
///
/// let plain = QualifiedName::global("Widget");
/// assert_eq!(plain.to_string(), "Widget");
///
/// let nested = QualifiedName::parse("Ui::Controls::Widget");
/// assert_eq!(nested.namespace, vec!["Ui".to_string(), "Controls".to_string()]);
/// assert_eq!(nested.name, "Widget");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Simple name, the last path segment.
    pub name: String,
    /// Namespace path; empty for the global namespace.
    pub namespace: Vec<String>,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// A name in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
        }
    }

    /// Split a `::`-separated path. A leading `::` (absolute path) is
    /// normalized away.
    pub fn parse(s: &str) -> Self {
        let parts: Vec<&str> = s.split("::").filter(|p| !p.is_empty()).collect();
        match parts.split_last() {
            None => Self::global(""),
            Some((name, namespace)) => Self {
                name: (*name).to_string(),
                namespace: namespace.iter().map(|s| (*s).to_string()).collect(),
            },
        }
    }

    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    /// All segments, namespace first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.namespace
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{part}::")?;
        }
        write!(f, "{}", self.name)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
