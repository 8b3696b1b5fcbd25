//! `npm publish` invocation.

use crate::command::{PackageManagerResult, npm};
use beachball_release::{Access, BeachballOptions};
use std::path::Path;

/// Registry settings for `npm publish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishArgs {
    /// Registry URL.
    pub registry: String,
    /// Dist-tag.
    pub tag: String,
    /// Package access.
    pub access: Access,
    /// Auth token, if any.
    pub token: Option<String>,
}

impl PublishArgs {
    /// Registry settings from resolved options.
    #[must_use]
    pub fn from_options(options: &BeachballOptions) -> Self {
        Self {
            registry: options.registry.clone(),
            tag: options.tag.clone(),
            access: options.access,
            token: Some(options.token.clone()).filter(|t| !t.is_empty()),
        }
    }

    /// Arguments for `npm`, starting with `publish`.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "publish".to_string(),
            "--registry".to_string(),
            self.registry.clone(),
            "--tag".to_string(),
            self.tag.clone(),
            "--access".to_string(),
            self.access.as_str().to_string(),
        ];
        if let Some(token) = &self.token {
            args.push(format!("--{}:_authToken={token}", auth_prefix(&self.registry)));
        }
        args
    }
}

/// The npmrc key prefix for a registry: scheme stripped, with a trailing slash
/// (`https://registry.npmjs.org` gives `//registry.npmjs.org/`).
#[must_use]
pub fn auth_prefix(registry: &str) -> String {
    let without_scheme = registry
        .split_once("://")
        .map_or(registry, |(_, rest)| rest);
    let trimmed = without_scheme.trim_end_matches('/');
    format!("//{trimmed}/")
}

/// Publish the package in `package_dir`.
pub async fn publish_package(package_dir: &Path, args: &PublishArgs) -> PackageManagerResult {
    let owned = args.to_args();
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    tracing::info!(
        dir = %package_dir.display(),
        registry = %args.registry,
        tag = %args.tag,
        "Publishing package"
    );
    npm(&refs, package_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(token: Option<&str>) -> PublishArgs {
        PublishArgs {
            registry: "https://registry.npmjs.org/".to_string(),
            tag: "latest".to_string(),
            access: Access::Public,
            token: token.map(String::from),
        }
    }

    #[test]
    fn test_publish_args_without_token() {
        assert_eq!(
            args(None).to_args(),
            vec![
                "publish",
                "--registry",
                "https://registry.npmjs.org/",
                "--tag",
                "latest",
                "--access",
                "public"
            ]
        );
    }

    #[test]
    fn test_publish_args_with_token() {
        let built = args(Some("secret")).to_args();
        assert_eq!(
            built.last().map(String::as_str),
            Some("--//registry.npmjs.org/:_authToken=secret")
        );
    }

    #[test]
    fn test_auth_prefix() {
        assert_eq!(auth_prefix("http://localhost:4873"), "//localhost:4873/");
        assert_eq!(
            auth_prefix("https://pkgs.example.com/npm/registry/"),
            "//pkgs.example.com/npm/registry/"
        );
    }

    #[test]
    fn test_from_options_drops_empty_token() {
        let options = BeachballOptions::defaults(Path::new("/repo"));
        let built = PublishArgs::from_options(&options);
        assert!(built.token.is_none());
        assert_eq!(built.access, Access::Restricted);
    }
}
