use crate::logic::inflect;
use crate::model::EntityClass;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Kind of association declared between two repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

impl AssociationKind {
    pub fn is_to_many(&self) -> bool {
        matches!(self, AssociationKind::HasMany | AssociationKind::BelongsToMany)
    }
}

/// An association declared on a repository (e.g. Countries belongsTo Currency)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDef {
    /// Association name as used in contain clauses (e.g. "Currency")
    pub name: String,
    pub kind: AssociationKind,
    /// Name of the target repository (e.g. "Currencies")
    pub target: String,
    /// Property holding the loaded data on a record (e.g. "currency")
    pub property: String,
    /// For belongsTo the key lives on the owner, otherwise on the target
    pub foreign_key: String,
    /// Junction table for belongsToMany
    #[serde(skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,
    /// Junction column pointing at the target for belongsToMany
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_foreign_key: Option<String>,
}

/// How the routing layer exposes a repository's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    /// REST resource routes: `/countries/1`
    #[default]
    Resource,
    /// Controller/action fallback routes: `/national_capitals/view/1`
    Action,
}

impl RouteStyle {
    pub fn resource_path(&self, table: &str, id: &str) -> String {
        match self {
            RouteStyle::Resource => format!("/{}/{}", table, id),
            RouteStyle::Action => format!("/{}/view/{}", table, id),
        }
    }

    pub fn index_path(&self, table: &str) -> String {
        format!("/{}", table)
    }
}

/// Metadata about a repository (a table and its declared associations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name, plural and camel cased (e.g. "NationalCapitals")
    pub name: String,
    /// Underlying table (e.g. "national_capitals")
    pub table: String,
    pub primary_key: String,
    /// Class of the records this repository hydrates
    pub entity_class: EntityClass,
    /// Columns in declaration order
    pub fields: Vec<String>,
    /// Columns that are never exposed
    #[serde(default)]
    pub hidden: Vec<String>,
    pub associations: Vec<AssociationDef>,
    #[serde(default)]
    pub route_style: RouteStyle,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = inflect::underscore(&name);
        let entity_class =
            EntityClass::Named(inflect::camelize(&inflect::singularize(&table)));

        Self {
            name,
            table,
            primary_key: "id".to_string(),
            entity_class,
            fields: Vec::new(),
            hidden: Vec::new(),
            associations: Vec::new(),
            route_style: RouteStyle::Resource,
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_hidden(mut self, hidden: &[&str]) -> Self {
        self.hidden = hidden.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_entity_class(mut self, entity_class: EntityClass) -> Self {
        self.entity_class = entity_class;
        self
    }

    pub fn with_route_style(mut self, route_style: RouteStyle) -> Self {
        self.route_style = route_style;
        self
    }

    pub fn belongs_to(mut self, name: &str, target: &str) -> Self {
        let property = inflect::underscore(name);
        let foreign_key = format!("{}_id", inflect::singularize(&property));
        self.associations.push(AssociationDef {
            name: name.to_string(),
            kind: AssociationKind::BelongsTo,
            target: target.to_string(),
            property,
            foreign_key,
            through: None,
            target_foreign_key: None,
        });
        self
    }

    pub fn has_one(mut self, name: &str, target: &str) -> Self {
        let association = self.owned_association(name, target, AssociationKind::HasOne);
        self.associations.push(association);
        self
    }

    pub fn has_many(mut self, name: &str, target: &str) -> Self {
        let association = self.owned_association(name, target, AssociationKind::HasMany);
        self.associations.push(association);
        self
    }

    pub fn belongs_to_many(mut self, name: &str, target: &str) -> Self {
        let mut association =
            self.owned_association(name, target, AssociationKind::BelongsToMany);
        let target_table = inflect::underscore(target);
        let mut tables = [self.table.clone(), target_table.clone()];
        tables.sort();
        association.through = Some(tables.join("_"));
        association.target_foreign_key = Some(format!("{}_id", inflect::singularize(&target_table)));
        self.associations.push(association);
        self
    }

    fn owned_association(&self, name: &str, target: &str, kind: AssociationKind) -> AssociationDef {
        AssociationDef {
            name: name.to_string(),
            kind,
            target: target.to_string(),
            property: inflect::underscore(name),
            foreign_key: format!("{}_id", inflect::singularize(&self.table)),
            through: None,
            target_foreign_key: None,
        }
    }

    /// Find an association by its contain name
    pub fn association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Foreign keys that only exist to link belongsTo associations
    pub fn link_only_fields(&self) -> Vec<&str> {
        self.associations
            .iter()
            .filter(|a| a.kind == AssociationKind::BelongsTo)
            .map(|a| a.foreign_key.as_str())
            .collect()
    }
}

/// Lookup of live repositories by name, the equivalent of a table registry
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    repositories: HashMap<String, Arc<Repository>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, repository: Repository) -> Arc<Repository> {
        let repository = Arc::new(repository);
        self.repositories
            .insert(repository.name.clone(), repository.clone());
        repository
    }

    pub fn get(&self, name: &str) -> Option<Arc<Repository>> {
        self.repositories.get(name).cloned()
    }

    pub fn by_table(&self, table: &str) -> Option<Arc<Repository>> {
        self.repositories
            .values()
            .find(|repository| repository.table == table)
            .cloned()
    }

    /// Registered repository names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.repositories.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
