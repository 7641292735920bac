use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::CatalogError;

/// Where one slice of the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Url(Url),
    File(PathBuf),
}

impl CatalogSource {
    /// Interpret a configured source string. `http://` and `https://` values
    /// are URLs; anything else is a file path, resolved against `base_dir`
    /// when relative (the browser resolves the same names against the page).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidUrl`] if an `http(s)://` value does not parse.
    pub fn parse(raw: &str, base_dir: &Path) -> Result<Self, CatalogError> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| CatalogError::InvalidUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Self::Url(url));
        }

        let path = Path::new(raw);
        if path.is_absolute() {
            Ok(Self::File(path.to_path_buf()))
        } else {
            Ok(Self::File(base_dir.join(path)))
        }
    }

    /// Parse every configured source, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptySources`] for an empty list, or the first
    /// parse failure.
    pub fn parse_all<S: AsRef<str>>(raw: &[S], base_dir: &Path) -> Result<Vec<Self>, CatalogError> {
        if raw.is_empty() {
            return Err(CatalogError::EmptySources);
        }
        raw.iter().map(|s| Self::parse(s.as_ref(), base_dir)).collect()
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_values_are_urls() {
        let src = CatalogSource::parse("https://example.com/stores.json", Path::new("/srv"))
            .expect("valid url");
        assert!(matches!(src, CatalogSource::Url(ref u) if u.path() == "/stores.json"));
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let src = CatalogSource::parse(" store_milk.json ", Path::new("/srv/store-map"))
            .expect("valid path");
        assert_eq!(
            src,
            CatalogSource::File(PathBuf::from("/srv/store-map/store_milk.json"))
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        let src = CatalogSource::parse("/data/a.json", Path::new("/srv")).expect("valid path");
        assert_eq!(src, CatalogSource::File(PathBuf::from("/data/a.json")));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let err = CatalogSource::parse("http://", Path::new("/srv")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl { .. }), "got {err:?}");
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = CatalogSource::parse_all::<&str>(&[], Path::new("/srv")).unwrap_err();
        assert!(matches!(err, CatalogError::EmptySources));
    }

    #[test]
    fn parse_all_preserves_order() {
        let sources =
            CatalogSource::parse_all(&["b.json", "a.json"], Path::new("/x")).expect("valid");
        let shown: Vec<String> = sources.iter().map(ToString::to_string).collect();
        assert_eq!(shown, ["/x/b.json", "/x/a.json"]);
    }
}
