//! Walks the contain clause of a request into the set of association
//! paths (and repositories) the encoder may render.

use crate::logic::inflect;
use crate::model::{AssociationDef, EncodeError, Inflection, Payload, Record, RepositoryRegistry, Result};
use itertools::Itertools;
use std::collections::HashSet;

/// One contained association, addressed by its dot-separated path of
/// association names (e.g. `Cultures.Country`)
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationNode {
    pub path: String,
    /// Repository declaring the association
    pub owner: String,
    pub association: AssociationDef,
    pub parent: Option<String>,
    /// Record properties from the root down to this association
    properties: Vec<String>,
}

impl AssociationNode {
    pub fn name(&self) -> &str {
        &self.association.name
    }

    pub fn repository(&self) -> &str {
        &self.association.target
    }

    pub fn is_to_many(&self) -> bool {
        self.association.kind.is_to_many()
    }

    /// Path as a client would spell it in an include list
    pub fn member_path(&self, inflection: Inflection) -> String {
        self.properties
            .iter()
            .map(|property| inflect::member_name(property, inflection))
            .join(".")
    }
}

/// Join a parent path and an association name
pub fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssociationGraph {
    root: String,
    nodes: Vec<AssociationNode>,
    repositories: Vec<String>,
}

impl AssociationGraph {
    /// Resolve every contain path against the registry. Each path is
    /// visited once, so cyclic associations terminate.
    pub fn build(registry: &RepositoryRegistry, root: &str, contain: &[String]) -> Result<Self> {
        if registry.get(root).is_none() {
            return Err(EncodeError::AssociationResolution(format!(
                "Repository \"{}\" is not registered",
                root
            )));
        }

        let mut graph = Self {
            root: root.to_string(),
            nodes: Vec::new(),
            repositories: vec![root.to_string()],
        };
        let mut visited: HashSet<String> = HashSet::new();

        for entry in contain {
            let mut owner = root.to_string();
            let mut path = String::new();
            let mut properties: Vec<String> = Vec::new();

            for name in entry.split('.').map(str::trim).filter(|s| !s.is_empty()) {
                let repository = registry.get(&owner).ok_or_else(|| {
                    EncodeError::AssociationResolution(format!(
                        "Repository \"{}\" is not registered",
                        owner
                    ))
                })?;
                let association = repository.association(name).ok_or_else(|| {
                    EncodeError::AssociationResolution(format!(
                        "Repository \"{}\" has no association named \"{}\"",
                        owner, name
                    ))
                })?;
                if registry.get(&association.target).is_none() {
                    return Err(EncodeError::AssociationResolution(format!(
                        "Association \"{}\" of repository \"{}\" targets unknown repository \"{}\"",
                        name, owner, association.target
                    )));
                }

                let parent = (!path.is_empty()).then(|| path.clone());
                path = child_path(&path, name);
                properties.push(association.property.clone());

                if visited.insert(path.clone()) {
                    if !graph.repositories.contains(&association.target) {
                        graph.repositories.push(association.target.clone());
                    }
                    graph.nodes.push(AssociationNode {
                        path: path.clone(),
                        owner: owner.clone(),
                        association: association.clone(),
                        parent,
                        properties: properties.clone(),
                    });
                }
                owner = association.target.clone();
            }
        }

        log::debug!(
            "association graph for {}: {} paths across {} repositories",
            root,
            graph.nodes.len(),
            graph.repositories.len()
        );
        Ok(graph)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Reachable repositories, root first, each listed once
    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    pub fn nodes(&self) -> &[AssociationNode] {
        &self.nodes
    }

    pub fn node(&self, path: &str) -> Option<&AssociationNode> {
        self.nodes.iter().find(|node| node.path == path)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.node(path).is_some()
    }
}

/// Translate client include paths (inflected property names such as
/// `cultures.country`) into contain paths of association names
pub fn contain_for_include(
    registry: &RepositoryRegistry,
    root: &str,
    include: &[String],
    inflection: Inflection,
) -> Result<Vec<String>> {
    let mut contain = Vec::with_capacity(include.len());

    for entry in include {
        let mut owner = root.to_string();
        let mut names: Vec<String> = Vec::new();

        for segment in entry.split('.').filter(|s| !s.is_empty()) {
            let repository = registry.get(&owner).ok_or_else(|| {
                EncodeError::AssociationResolution(format!(
                    "Repository \"{}\" is not registered",
                    owner
                ))
            })?;
            let association = repository
                .associations
                .iter()
                .find(|a| inflect::member_name(&a.property, inflection) == segment)
                .ok_or_else(|| {
                    EncodeError::AssociationResolution(format!(
                        "Repository \"{}\" has no relationship \"{}\"",
                        owner, segment
                    ))
                })?;
            names.push(association.name.clone());
            owner = association.target.clone();
        }

        if !names.is_empty() {
            contain.push(names.join("."));
        }
    }
    Ok(contain)
}

/// Contain paths implied by the associations actually loaded on a payload,
/// for callers that hand over hydrated records without a contain clause
pub fn loaded_paths(registry: &RepositoryRegistry, payload: &Payload) -> Vec<String> {
    fn walk(
        registry: &RepositoryRegistry,
        record: &Record,
        prefix: &str,
        paths: &mut Vec<String>,
    ) {
        let Some(repository) = registry.get(&record.source) else {
            return;
        };
        for association in &repository.associations {
            let Some(related) = record.associated.get(&association.property) else {
                continue;
            };
            let path = child_path(prefix, &association.name);
            for child in related.records() {
                walk(registry, child, &path, paths);
            }
            paths.push(path);
        }
    }

    let mut paths = Vec::new();
    for record in payload.records() {
        walk(registry, record, "", &mut paths);
    }
    paths.into_iter().unique().sorted().collect()
}
