//! Assembles JSON:API documents from resolved view data.

use crate::logic::associations::{self, child_path, AssociationGraph, AssociationNode};
use crate::logic::json_format::{to_json_string, JsonFlags};
use crate::logic::pagination::{pagination_links, pagination_meta};
use crate::logic::request::RenderRequest;
use crate::logic::schema::{id_string, RelationshipField, ResolvedResource, SchemaResolver};
use crate::model::{
    AssociationKind, Document, JsonApiObject, Linkage, Links, Payload, PresentationOptions,
    PrimaryData, Record, Related, RelationshipObject, Relationships, ResourceIdentifier,
    ResourceObject, Result, VersionOption, ViewVars,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Stateless between calls; share freely across requests
#[derive(Debug, Clone)]
pub struct JsonApiEncoder {
    resolver: Arc<SchemaResolver>,
}

impl JsonApiEncoder {
    pub fn new(resolver: Arc<SchemaResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Build the document for a request without serializing it
    pub fn build_document(&self, request: &RenderRequest) -> Result<Document> {
        let options = &request.options;
        let mut document = Document::default();

        if let Some(payload) = &request.data {
            let (data, included) = self.encode_payload(request, payload)?;
            document.data = Some(data);
            document.included = included;
        }

        if let Some(pagination) = &request.pagination {
            document.links = pagination_links(pagination);
        }

        let mut meta = options.meta.payload().cloned().unwrap_or_default();
        if let Some(pagination) = &request.pagination {
            meta.extend(pagination_meta(pagination));
        }
        document.meta = (!meta.is_empty()).then_some(meta);

        document.jsonapi = match &options.with_json_api_version {
            VersionOption::Flag(false) => None,
            VersionOption::Flag(true) => Some(JsonApiObject::new(None)),
            VersionOption::WithMeta(meta) => {
                Some(JsonApiObject::new((!meta.is_empty()).then(|| meta.clone())))
            }
        };

        document.query = request.query_log.clone();
        Ok(document)
    }

    /// Serialize the document for a request. `None` means there is nothing
    /// to send: no data, no meta and no jsonapi node.
    pub fn render(&self, request: &RenderRequest) -> Result<Option<String>> {
        let document = self.build_document(request)?;
        if document.is_empty() {
            log::debug!("nothing to render, skipping response body");
            return Ok(None);
        }

        let flags = JsonFlags::for_options(&request.options);
        to_json_string(&document, flags).map(Some)
    }

    /// Render straight from a view-variable bag
    pub fn render_view_vars(
        &self,
        vars: &ViewVars,
        base: &PresentationOptions,
    ) -> Result<Option<String>> {
        let request = RenderRequest::from_view_vars(vars, base)?;
        self.render(&request)
    }

    fn encode_payload(
        &self,
        request: &RenderRequest,
        payload: &Payload,
    ) -> Result<(PrimaryData, Vec<ResourceObject>)> {
        let options = &request.options;
        let graph = match payload.source() {
            Some(root) => {
                let contain = match &request.contain {
                    Some(contain) => contain.clone(),
                    None => associations::loaded_paths(self.resolver.registry(), payload),
                };
                AssociationGraph::build(self.resolver.registry(), root, &contain)?
            }
            None => AssociationGraph::default(),
        };

        // Every reachable repository must yield a schema before anything is emitted
        for repository in graph.repositories() {
            self.resolver.schema_for(repository, options.inflect)?;
        }

        let mut pass = EncodePass {
            resolver: &self.resolver,
            options,
            graph: &graph,
            seen: HashSet::new(),
            expanded: HashSet::new(),
            included: Vec::new(),
        };

        let data = match payload {
            Payload::One(record) => PrimaryData::One(pass.primary(record)?),
            Payload::Many(records) => PrimaryData::Many(
                records
                    .iter()
                    .map(|record| pass.primary(record))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        pass.collect_included(payload)?;

        Ok((data, pass.included))
    }
}

/// State of one encode call
struct EncodePass<'a> {
    resolver: &'a SchemaResolver,
    options: &'a PresentationOptions,
    graph: &'a AssociationGraph,
    /// Resources already present in `data` or `included`
    seen: HashSet<ResourceIdentifier>,
    /// (resource, path) pairs whose loaded associations were walked
    expanded: HashSet<(ResourceIdentifier, String)>,
    included: Vec<ResourceObject>,
}

impl<'a> EncodePass<'a> {
    fn primary(&mut self, record: &Record) -> Result<ResourceObject> {
        let resource = self.resource(record)?;
        self.seen.insert(resource.identifier());
        Ok(resource)
    }

    /// Breadth first over loaded associations, restricted to contained and
    /// whitelisted paths
    fn collect_included(&mut self, payload: &Payload) -> Result<()> {
        let mut queue: VecDeque<(&Record, String)> = payload
            .records()
            .into_iter()
            .map(|record| (record, String::new()))
            .collect();

        while let Some((record, prefix)) = queue.pop_front() {
            let schema = self.resolver.schema_for(&record.source, self.options.inflect)?;

            for field in schema.relationships() {
                let Some(related) = record.associated.get(&field.association.property) else {
                    continue;
                };
                let path = child_path(&prefix, &field.association.name);
                match self.graph.node(&path) {
                    Some(node) if self.include_allowed(node) => {}
                    _ => continue,
                }

                for child in related.records() {
                    let resource = self.resource(child)?;
                    let identifier = resource.identifier();

                    if self.expanded.insert((identifier.clone(), path.clone())) {
                        queue.push_back((child, path.clone()));
                    }
                    if self.seen.insert(identifier) {
                        self.included.push(resource);
                    }
                }
            }
        }
        Ok(())
    }

    fn include_allowed(&self, node: &AssociationNode) -> bool {
        if self.options.include.is_empty() {
            return true;
        }
        let path = node.member_path(self.options.inflect);
        self.options
            .include
            .iter()
            .any(|entry| *entry == path || entry.starts_with(&format!("{}.", path)))
    }

    fn resource(&self, record: &Record) -> Result<ResourceObject> {
        let resolved = self.resolver.resolve(record, self.options.inflect)?;

        let mut relationships = Vec::new();
        for field in resolved.schema.relationships() {
            if let Some(relationship) = self.relationship(record, &resolved, field)? {
                relationships.push((field.name.clone(), relationship));
            }
        }

        let links = Links::new().with("self", self.link(&resolved.schema.self_path(&resolved.id)));
        let mut resource = ResourceObject {
            resource_type: resolved.resource_type,
            id: resolved.id,
            attributes: resolved.attributes,
            relationships: Relationships(relationships),
            links,
        };

        if let Some(fields) = self.options.field_sets.get(&resource.resource_type) {
            resource.retain_fields(fields);
        }
        Ok(resource)
    }

    fn relationship(
        &self,
        record: &Record,
        owner: &ResolvedResource,
        field: &RelationshipField,
    ) -> Result<Option<RelationshipObject>> {
        let loaded = record.associated.get(&field.association.property);
        let reverse_path = format!(
            "{}?{}={}",
            field.target_route.index_path(&field.target_table),
            field.association.foreign_key,
            owner.id
        );

        if field.is_to_many() {
            let Some(related) = loaded else {
                return Ok(None);
            };
            let identifiers = related
                .records()
                .into_iter()
                .map(|child| self.identifier(field, child))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Some(RelationshipObject {
                links: Links::new().with("self", self.link(&reverse_path)),
                data: Linkage::Many(identifiers),
            }));
        }

        let mut data = match loaded {
            Some(Related::One(child)) => Linkage::One(self.identifier(field, child)?),
            Some(Related::Many(children)) => match children.first() {
                Some(child) => Linkage::One(self.identifier(field, child)?),
                None => Linkage::Null,
            },
            Some(Related::Empty) => Linkage::Null,
            None if field.association.kind == AssociationKind::BelongsTo => {
                match record.get(&field.association.foreign_key).and_then(id_string) {
                    Some(id) => Linkage::One(ResourceIdentifier {
                        resource_type: self.target_type(field)?,
                        id,
                    }),
                    None => Linkage::Null,
                }
            }
            // Without the foreign key there is nothing to link an unloaded hasOne to
            None => return Ok(None),
        };

        let related_path = match &data {
            Linkage::One(identifier) => Some(
                field
                    .target_route
                    .resource_path(&field.target_table, &identifier.id),
            ),
            _ if field.association.kind == AssociationKind::HasOne => Some(reverse_path),
            _ => None,
        };
        let relationship_path = format!(
            "{}/relationships/{}",
            owner.schema.self_path(&owner.id),
            field.name
        );

        let mut links = Links::new();
        if self.options.json_api_belongs_to_links {
            links.insert("self", self.link(&relationship_path));
            if let Some(related_path) = &related_path {
                links.insert("related", self.link(related_path));
            }
            if loaded.is_none() {
                data = Linkage::Omitted;
            }
        } else {
            let path = related_path.as_deref().unwrap_or(&relationship_path);
            links.insert("self", self.link(path));
        }

        Ok(Some(RelationshipObject { links, data }))
    }

    fn target_type(&self, field: &RelationshipField) -> Result<String> {
        let schema = self
            .resolver
            .schema_for(&field.association.target, self.options.inflect)?;
        Ok(schema.resource_type().to_string())
    }

    fn identifier(&self, field: &RelationshipField, record: &Record) -> Result<ResourceIdentifier> {
        let schema = self
            .resolver
            .schema_for(&field.association.target, self.options.inflect)?;
        Ok(ResourceIdentifier {
            resource_type: schema.resource_type().to_string(),
            id: schema.resource_id(record)?,
        })
    }

    /// Apply the url prefix and, for absolute links, the base url
    fn link(&self, path: &str) -> String {
        let prefix = self
            .options
            .url_prefix
            .as_deref()
            .unwrap_or("")
            .trim_end_matches('/');
        if self.options.absolute_links {
            format!(
                "{}{}{}",
                self.options.full_base_url.trim_end_matches('/'),
                prefix,
                path
            )
        } else {
            format!("{}{}", prefix, path)
        }
    }
}
