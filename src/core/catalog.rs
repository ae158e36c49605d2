//! The closed set of service names a contractor may offer.

use crate::utils::error::Result;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/services.txt");

#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    names: HashSet<String>,
}

impl ServiceCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Loads a replacement catalog, one name per line.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let catalog = Self::parse(&text);
        tracing::debug!(
            "Loaded {} services from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Blank lines and `#` comments are ignored. Names are trimmed but
    /// otherwise kept as written.
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = ServiceCatalog::builtin();
        assert_eq!(catalog.len(), 203);
        assert!(catalog.contains("Plumbing"));
        assert!(catalog.contains("Move-In/Move-Out Cleaning"));
        assert!(catalog.contains("Dog Run Installation"));
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let catalog = ServiceCatalog::builtin();
        assert!(!catalog.contains("plumbing"));
        assert!(!catalog.contains("Plumbing "));
        assert!(!catalog.contains("FooBar"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let catalog = ServiceCatalog::parse("# header\n\n  Plumbing  \nFencing\n");
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("Plumbing"));
        assert!(!catalog.contains("# header"));
    }
}
