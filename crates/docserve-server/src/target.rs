//! Which module, and optionally which item, a request asks for

use crate::error::ApiError;

/// Separates the module URL from the item path in path-form requests.
pub const ITEM_SEPARATOR: &str = "/~/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTarget {
    pub url: String,
    pub item: Option<String>,
}

impl DocTarget {
    /// From the `url` and `item` query parameters of `/doc`.
    pub fn from_query(url: Option<String>, item: Option<String>) -> Result<Self, ApiError> {
        let url = url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing \"url\" query."))?;
        Ok(DocTarget {
            url,
            item: item.filter(|i| !i.is_empty()),
        })
    }

    /// From a request path such as `/https://deno.land/std/http/mod.ts/~/serve`.
    ///
    /// Proxies sometimes collapse the `//` after the scheme; that form is
    /// repaired. A query string belongs to the module URL.
    pub fn from_path(path: &str, query: Option<&str>) -> Option<Self> {
        let path = path.trim_start_matches('/');
        let path = repair_scheme(path)?;

        let (module, item) = match path.split_once(ITEM_SEPARATOR) {
            Some((module, item)) => (module, Some(item)),
            None => (path.as_str(), None),
        };
        let (_, rest) = module.split_once("://")?;
        if rest.split('/').next().unwrap_or("").is_empty() {
            return None;
        }

        let url = match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{module}?{query}"),
            None => module.to_string(),
        };
        Some(DocTarget {
            url,
            item: item
                .map(|i| i.trim_matches('/'))
                .filter(|i| !i.is_empty())
                .map(str::to_string),
        })
    }
}

fn repair_scheme(path: &str) -> Option<String> {
    for scheme in ["https:", "http:"] {
        let Some(rest) = path.strip_prefix(scheme) else {
            continue;
        };
        let rest = rest.trim_start_matches('/');
        return Some(format!("{scheme}//{rest}"));
    }
    None
}
