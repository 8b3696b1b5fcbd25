//! Publish ordering.
//!
//! A dependent must never reach the registry before the version of an in-repo
//! dependency it was bumped against, so packages are published dependencies
//! first. Dependencies on packages outside the plan impose no order.

use crate::bump::BumpInfo;
use crate::error::{Error, Result};
use crate::version::Version;
use beachball_workspaces::Workspace;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::path::PathBuf;

/// A package version headed for the registry.
#[derive(Debug, Clone)]
pub struct PublishPackage {
    /// npm package name.
    pub name: String,
    /// Directory holding its package.json.
    pub path: PathBuf,
    /// Version being published.
    pub version: Version,
    /// Names from every dependency map of the manifest.
    pub dependencies: Vec<String>,
}

/// Packages in publish order.
#[derive(Debug, Clone, Default)]
pub struct PublishPlan {
    /// Dependencies before dependents.
    pub packages: Vec<PublishPackage>,
}

impl PublishPlan {
    /// Order `packages` so every package follows its in-plan dependencies.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming a package on a dependency cycle.
    pub fn from_packages(mut packages: Vec<PublishPackage>) -> Result<Self> {
        // stable input order keeps the output stable among independent packages
        packages.sort_by(|a, b| a.name.cmp(&b.name));

        let mut graph = DiGraph::<usize, ()>::with_capacity(packages.len(), 0);
        let nodes: HashMap<&str, _> = packages
            .iter()
            .enumerate()
            .map(|(i, pkg)| (pkg.name.as_str(), graph.add_node(i)))
            .collect();

        for pkg in &packages {
            let dependent = nodes[pkg.name.as_str()];
            for dependency in pkg.dependencies.iter().filter_map(|d| nodes.get(d.as_str())) {
                graph.update_edge(*dependency, dependent, ());
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            let name = &packages[graph[cycle.node_id()]].name;
            Error::config(
                format!("Dependency cycle detected in packages to publish, involving {name}"),
                "Break the cycle between the packages' dependencies before publishing",
            )
        })?;

        let mut slots: Vec<Option<PublishPackage>> = packages.into_iter().map(Some).collect();
        let packages = order
            .into_iter()
            .filter_map(|node| slots[graph[node]].take())
            .collect();
        Ok(Self { packages })
    }

    /// Plan the public packages bumped in `info`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bumped packages depend on each other cyclically.
    pub fn from_bump(workspace: &Workspace, info: &BumpInfo) -> Result<Self> {
        let packages = info
            .new_versions
            .iter()
            .filter_map(|(name, version)| {
                let pkg = workspace.get(name).filter(|pkg| !pkg.private)?;
                Some(PublishPackage {
                    name: name.clone(),
                    path: pkg.path.clone(),
                    version: version.clone(),
                    dependencies: pkg.all_dependency_names().cloned().collect(),
                })
            })
            .collect();
        Self::from_packages(packages)
    }

    /// Number of packages to publish.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether there is nothing to publish.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in publish order.
    pub fn iter(&self) -> impl Iterator<Item = &PublishPackage> {
        self.packages.iter()
    }
}
