use crate::logic::inflect;
use crate::model::{
    AssociationDef, EncodeError, Inflection, Record, Repository, RepositoryRegistry, Result,
    RouteStyle,
};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Describes how records of one repository become resource objects
pub trait SchemaProvider: Send + Sync + fmt::Debug {
    fn repository(&self) -> &str;

    fn resource_type(&self) -> &str;

    /// Derived schemas infer everything from the record's class, so they
    /// refuse generic records
    fn requires_named_entity(&self) -> bool {
        true
    }

    fn resource_id(&self, record: &Record) -> Result<String>;

    fn attributes(&self, record: &Record) -> Map<String, Value>;

    fn relationships(&self) -> &[RelationshipField];

    /// Path of the resource's own URL, before any prefix
    fn self_path(&self, id: &str) -> String;
}

/// One relationship member of a resource, resolved against its target repository
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipField {
    pub name: String,
    pub association: AssociationDef,
    pub target_table: String,
    pub target_route: RouteStyle,
}

impl RelationshipField {
    pub fn new(association: &AssociationDef, target: &Repository, inflection: Inflection) -> Self {
        Self {
            name: inflect::member_name(&association.property, inflection),
            association: association.clone(),
            target_table: target.table.clone(),
            target_route: target.route_style,
        }
    }

    pub fn is_to_many(&self) -> bool {
        self.association.kind.is_to_many()
    }
}

/// Coerce a primary key value to its string form
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn primary_key_of(record: &Record, primary_key: &str, repository: &str) -> Result<String> {
    record.get(primary_key).and_then(id_string).ok_or_else(|| {
        EncodeError::Schema(format!(
            "Record of repository \"{}\" has no usable value for primary key \"{}\"",
            repository, primary_key
        ))
    })
}

fn resolve_relationships(
    repository: &Repository,
    registry: &RepositoryRegistry,
    inflection: Inflection,
) -> Result<Vec<RelationshipField>> {
    repository
        .associations
        .iter()
        .map(|association| {
            let target = registry.get(&association.target).ok_or_else(|| {
                EncodeError::AssociationResolution(format!(
                    "Association \"{}\" of repository \"{}\" targets unknown repository \"{}\"",
                    association.name, repository.name, association.target
                ))
            })?;
            Ok(RelationshipField::new(association, &target, inflection))
        })
        .collect()
}

/// Schema synthesised from a repository's fields and associations.
/// Built once per (repository, inflection) and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DerivedSchema {
    repository: String,
    table: String,
    route_style: RouteStyle,
    resource_type: String,
    primary_key: String,
    inflection: Inflection,
    excluded: HashSet<String>,
    relationships: Vec<RelationshipField>,
}

impl DerivedSchema {
    pub fn build(
        repository: &Repository,
        registry: &RepositoryRegistry,
        inflection: Inflection,
    ) -> Result<Self> {
        let mut excluded: HashSet<String> = HashSet::new();
        excluded.insert(repository.primary_key.clone());
        excluded.extend(repository.hidden.iter().cloned());
        excluded.extend(repository.link_only_fields().into_iter().map(String::from));
        excluded.extend(repository.associations.iter().map(|a| a.property.clone()));

        Ok(Self {
            repository: repository.name.clone(),
            table: repository.table.clone(),
            route_style: repository.route_style,
            resource_type: inflect::resource_type(&repository.table, inflection),
            primary_key: repository.primary_key.clone(),
            inflection,
            excluded,
            relationships: resolve_relationships(repository, registry, inflection)?,
        })
    }
}

impl SchemaProvider for DerivedSchema {
    fn repository(&self) -> &str {
        &self.repository
    }

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn resource_id(&self, record: &Record) -> Result<String> {
        primary_key_of(record, &self.primary_key, &self.repository)
    }

    fn attributes(&self, record: &Record) -> Map<String, Value> {
        record
            .visible_fields()
            .filter(|(name, _)| !self.excluded.contains(name.as_str()))
            .map(|(name, value)| (inflect::member_name(name, self.inflection), value.clone()))
            .collect()
    }

    fn relationships(&self) -> &[RelationshipField] {
        &self.relationships
    }

    fn self_path(&self, id: &str) -> String {
        self.route_style.resource_path(&self.table, id)
    }
}

/// Explicitly declared schema; used as-is, without inflection
#[derive(Debug, Clone)]
pub struct StaticSchema {
    repository: String,
    table: String,
    route_style: RouteStyle,
    resource_type: String,
    primary_key: String,
    /// (record field, member name)
    attributes: Vec<(String, String)>,
    relationships: Vec<RelationshipField>,
}

impl StaticSchema {
    pub fn new(repository: &Repository, resource_type: impl Into<String>) -> Self {
        Self {
            repository: repository.name.clone(),
            table: repository.table.clone(),
            route_style: repository.route_style,
            resource_type: resource_type.into(),
            primary_key: repository.primary_key.clone(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn attribute(mut self, field: &str, member: &str) -> Self {
        self.attributes.push((field.to_string(), member.to_string()));
        self
    }

    pub fn relationship(mut self, field: RelationshipField) -> Self {
        self.relationships.push(field);
        self
    }
}

impl SchemaProvider for StaticSchema {
    fn repository(&self) -> &str {
        &self.repository
    }

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn requires_named_entity(&self) -> bool {
        false
    }

    fn resource_id(&self, record: &Record) -> Result<String> {
        primary_key_of(record, &self.primary_key, &self.repository)
    }

    fn attributes(&self, record: &Record) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter_map(|(field, member)| {
                record
                    .get(field)
                    .map(|value| (member.clone(), value.clone()))
            })
            .collect()
    }

    fn relationships(&self) -> &[RelationshipField] {
        &self.relationships
    }

    fn self_path(&self, id: &str) -> String {
        self.route_style.resource_path(&self.table, id)
    }
}

/// Type, id and attributes of one record, plus the schema that produced them
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub schema: Arc<dyn SchemaProvider>,
    pub resource_type: String,
    pub id: String,
    pub attributes: Map<String, Value>,
}

/// Hands out schemas per repository: registered static schemas first,
/// otherwise a derived schema built on first use and cached
#[derive(Debug)]
pub struct SchemaResolver {
    registry: Arc<RepositoryRegistry>,
    static_schemas: HashMap<String, Arc<StaticSchema>>,
    derived: RwLock<HashMap<(String, Inflection), Arc<DerivedSchema>>>,
}

impl SchemaResolver {
    pub fn new(registry: Arc<RepositoryRegistry>) -> Self {
        Self {
            registry,
            static_schemas: HashMap::new(),
            derived: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_static_schema(mut self, schema: StaticSchema) -> Self {
        self.static_schemas
            .insert(schema.repository.clone(), Arc::new(schema));
        self
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn schema_for(
        &self,
        repository: &str,
        inflection: Inflection,
    ) -> Result<Arc<dyn SchemaProvider>> {
        if let Some(schema) = self.static_schemas.get(repository) {
            return Ok(schema.clone());
        }

        let key = (repository.to_string(), inflection);
        {
            let derived = self.derived.read();
            if let Some(schema) = derived.get(&key) {
                return Ok(schema.clone());
            }
        }

        let definition = self.registry.get(repository).ok_or_else(|| {
            EncodeError::Schema(format!("No repository registered under \"{}\"", repository))
        })?;
        let built = Arc::new(DerivedSchema::build(&definition, &self.registry, inflection)?);
        log::debug!("derived schema for repository {} ({:?})", repository, inflection);

        // Another request may have raced us here; keep whichever landed first
        let schema = self.derived.write().entry(key).or_insert(built).clone();
        Ok(schema)
    }

    /// Resolve type, id and attributes for a record
    pub fn resolve(&self, record: &Record, inflection: Inflection) -> Result<ResolvedResource> {
        let schema = self.schema_for(&record.source, inflection)?;
        if schema.requires_named_entity() && record.is_generic() {
            return Err(EncodeError::generic_entity(&record.source));
        }

        Ok(ResolvedResource {
            resource_type: schema.resource_type().to_string(),
            id: schema.resource_id(record)?,
            attributes: schema.attributes(record),
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityClass;
    use serde_json::json;

    fn registry() -> Arc<RepositoryRegistry> {
        let mut registry = RepositoryRegistry::new();
        registry.register(
            Repository::new("Countries")
                .with_fields(&["id", "code", "name", "dummy_counter", "currency_id"])
                .belongs_to("Currency", "Currencies")
                .has_many("Cultures", "Cultures"),
        );
        registry.register(Repository::new("Currencies").with_fields(&["id", "code", "name"]));
        registry.register(
            Repository::new("Cultures")
                .with_fields(&["id", "code", "country_id"])
                .belongs_to("Country", "Countries"),
        );
        Arc::new(registry)
    }

    fn country() -> Record {
        Record::new("Countries", EntityClass::Named("Country".into()))
            .with_field("id", 1)
            .with_field("code", "NL")
            .with_field("name", "The Netherlands")
            .with_field("dummy_counter", 11111)
            .with_field("currency_id", 1)
    }

    #[test]
    fn test_derived_schema_type_id_and_attributes() {
        let resolver = SchemaResolver::new(registry());
        let resolved = resolver.resolve(&country(), Inflection::Dasherize).unwrap();

        assert_eq!(resolved.resource_type, "countries");
        assert_eq!(resolved.id, "1");
        assert_eq!(
            Value::Object(resolved.attributes),
            json!({"code": "NL", "name": "The Netherlands", "dummy-counter": 11111})
        );
        let names: Vec<&str> = resolved
            .schema
            .relationships()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["currency", "cultures"]);
    }

    #[test]
    fn test_attribute_order_follows_record_fields() {
        let resolver = SchemaResolver::new(registry());
        let keys: Vec<String> = resolver
            .resolve(&country(), Inflection::Underscore)
            .unwrap()
            .attributes
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["code", "name", "dummy_counter"]);
    }

    #[test]
    fn test_generic_entity_is_rejected() {
        let resolver = SchemaResolver::new(registry());
        let mut record = country();
        record.class = EntityClass::Generic;

        let err = resolver.resolve(&record, Inflection::Dasherize).unwrap_err();
        assert!(matches!(err, EncodeError::Schema(_)));
        assert!(err.to_string().contains("repository \"Countries\""));
    }

    #[test]
    fn test_static_schema_takes_precedence() {
        let registry = registry();
        let countries = registry.get("Countries").unwrap();
        let resolver = SchemaResolver::new(registry.clone())
            .with_static_schema(StaticSchema::new(&countries, "nations").attribute("code", "iso"));

        let mut record = country();
        record.class = EntityClass::Generic;
        let resolved = resolver.resolve(&record, Inflection::Dasherize).unwrap();
        assert_eq!(resolved.resource_type, "nations");
        assert_eq!(Value::Object(resolved.attributes), json!({"iso": "NL"}));
    }

    #[test]
    fn test_derived_schema_is_cached_per_inflection() {
        let resolver = SchemaResolver::new(registry());
        let first = resolver.schema_for("Countries", Inflection::Dasherize).unwrap();
        let second = resolver.schema_for("Countries", Inflection::Dasherize).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = resolver.schema_for("Countries", Inflection::Variable).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_missing_primary_key_is_a_schema_error() {
        let resolver = SchemaResolver::new(registry());
        let record = Record::new("Currencies", EntityClass::Named("Currency".into()))
            .with_field("code", "EUR");
        let err = resolver.resolve(&record, Inflection::Dasherize).unwrap_err();
        assert!(matches!(err, EncodeError::Schema(_)));
    }
}
