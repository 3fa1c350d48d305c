//! Recognise well-known module registry URLs

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Package coordinates extracted from a registry URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryUrl {
    pub registry: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "deno.land/x",
            r"^https://deno\.land/x/(?P<pkg>[^@/]+)(?:@(?P<ver>[^/]*))?(?:/(?P<mod>.*))?$",
        ),
        (
            "deno.land/std",
            r"^https://deno\.land/std(?:@(?P<ver>[^/]*))?(?:/(?P<mod>.*))?$",
        ),
        (
            "nest.land",
            r"^https://x\.nest\.land/(?P<pkg>[^@/]+)@(?P<ver>[^/]+)(?:/(?P<mod>.*))?$",
        ),
        (
            "github.com",
            r"^https://raw\.githubusercontent\.com/(?P<org>[^/]+)/(?P<pkg>[^/]+)/(?P<ver>[^/]+)(?:/(?P<mod>.*))?$",
        ),
        (
            "esm.sh",
            r"^https://esm\.sh/(?P<pkg>[^@/]+)(?:@(?P<ver>[^/]*))?(?:/(?P<mod>[^/]*))?$",
        ),
        (
            "skypack.dev",
            r"^https://cdn\.skypack\.dev/(?P<pkg>[^@/]+)(?:@(?P<ver>[^/]*))?(?:/(?P<mod>[^/]*))?$",
        ),
    ]
    .into_iter()
    .map(|(registry, pattern)| {
        let re = Regex::new(pattern).expect("registry patterns are valid");
        (registry, re)
    })
    .collect()
});

/// Match `url` against the known registries, first match wins.
pub fn parse_registry_url(url: &str) -> Option<RegistryUrl> {
    PATTERNS.iter().find_map(|(registry, re)| {
        let caps = re.captures(url)?;
        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(RegistryUrl {
            registry: *registry,
            org: group("org"),
            package: group("pkg"),
            version: group("ver"),
            module: group("mod"),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deno_land_x() {
        let parsed = parse_registry_url("https://deno.land/x/oak@v10.0.0/mod.ts").unwrap();
        assert_eq!(parsed.registry, "deno.land/x");
        assert_eq!(parsed.package.as_deref(), Some("oak"));
        assert_eq!(parsed.version.as_deref(), Some("v10.0.0"));
        assert_eq!(parsed.module.as_deref(), Some("mod.ts"));
        assert_eq!(parsed.org, None);
    }

    #[test]
    fn test_deno_land_x_unversioned() {
        let parsed = parse_registry_url("https://deno.land/x/oak/mod.ts").unwrap();
        assert_eq!(parsed.version, None);
        assert_eq!(parsed.module.as_deref(), Some("mod.ts"));
    }

    #[test]
    fn test_std() {
        let parsed = parse_registry_url("https://deno.land/std@0.114.0/fmt/colors.ts").unwrap();
        assert_eq!(parsed.registry, "deno.land/std");
        assert_eq!(parsed.package, None);
        assert_eq!(parsed.version.as_deref(), Some("0.114.0"));
        assert_eq!(parsed.module.as_deref(), Some("fmt/colors.ts"));
    }

    #[test]
    fn test_github_raw() {
        let parsed = parse_registry_url(
            "https://raw.githubusercontent.com/denoland/deno_doc/main/mod.ts",
        )
        .unwrap();
        assert_eq!(parsed.registry, "github.com");
        assert_eq!(parsed.org.as_deref(), Some("denoland"));
        assert_eq!(parsed.package.as_deref(), Some("deno_doc"));
        assert_eq!(parsed.version.as_deref(), Some("main"));
    }

    #[test]
    fn test_esm_sh_and_unknown() {
        let parsed = parse_registry_url("https://esm.sh/preact@10.5.15").unwrap();
        assert_eq!(parsed.registry, "esm.sh");
        assert_eq!(parsed.package.as_deref(), Some("preact"));
        assert_eq!(parsed.version.as_deref(), Some("10.5.15"));

        assert_eq!(parse_registry_url("https://example.com/mod.ts"), None);
    }
}
