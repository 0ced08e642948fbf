pub mod associations;
pub mod encoder;
pub mod inflect;
pub mod input;
pub mod json_format;
pub mod pagination;
pub mod request;
pub mod schema;

pub use associations::{AssociationGraph, AssociationNode};
pub use encoder::JsonApiEncoder;
pub use input::{domain_vars, resolve_data, special_vars};
pub use json_format::{to_json_string, JsonFlags};
pub use pagination::{paginate, pagination_links, pagination_meta};
pub use request::RenderRequest;
pub use schema::{
    DerivedSchema, RelationshipField, ResolvedResource, SchemaProvider, SchemaResolver,
    StaticSchema,
};
