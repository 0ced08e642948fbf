//! Reads the special view variables once into a typed render request.

use crate::logic::input::{self, SERIALIZE_VAR};
use crate::model::{
    EncodeError, Inflection, JsonOptions, MetaOption, PaginationInfo, Payload,
    PresentationOptions, Result, VersionOption, ViewVar, ViewVars, QUERY_LOG_VAR,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything one encode pass needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    pub options: PresentationOptions,
    pub data: Option<Payload>,
    /// Contain paths of association names; inferred from the loaded
    /// associations when unset
    pub contain: Option<Vec<String>>,
    pub pagination: Option<PaginationInfo>,
    pub query_log: Option<Value>,
}

impl RenderRequest {
    pub fn new(options: PresentationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_contain(mut self, contain: &[&str]) -> Self {
        self.contain = Some(contain.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationInfo) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_query_log(mut self, query_log: impl Into<Value>) -> Self {
        self.query_log = Some(query_log.into());
        self
    }

    /// Build a request from a view-variable bag, starting from `base`
    /// options and overriding whatever the special variables set
    pub fn from_view_vars(vars: &ViewVars, base: &PresentationOptions) -> Result<Self> {
        let mut options = base.clone();

        if let Some(prefix) = read::<Option<String>>(vars, "_urlPrefix")? {
            options.url_prefix = prefix;
        }
        if let Some(version) = read::<VersionOption>(vars, "_withJsonApiVersion")? {
            options.with_json_api_version = version;
        }
        if let Some(meta) = read::<MetaOption>(vars, "_meta")? {
            options.meta = meta;
        }
        if let Some(absolute) = read::<bool>(vars, "_absoluteLinks")? {
            options.absolute_links = absolute;
        }
        if let Some(links) = read::<bool>(vars, "_jsonApiBelongsToLinks")? {
            options.json_api_belongs_to_links = links;
        }
        if let Some(include) = read::<StringList>(vars, "_include")? {
            options.include = include.into_vec();
        }
        if let Some(field_sets) = read::<BTreeMap<String, StringList>>(vars, "_fieldSets")? {
            options.field_sets = field_sets
                .into_iter()
                .map(|(resource_type, fields)| (resource_type, fields.into_vec()))
                .collect();
        }
        if let Some(json_options) = read::<JsonOptions>(vars, "_jsonOptions")? {
            options.json_options = json_options;
        }
        if let Some(pretty) = read::<bool>(vars, "_debugPrettyPrint")? {
            options.debug_pretty_print = pretty;
        }
        if let Some(inflection) = read::<Inflection>(vars, "_inflect")? {
            options.inflect = inflection;
        }

        let directive = match vars.get(SERIALIZE_VAR) {
            Some(ViewVar::Records(_)) => return Err(EncodeError::object_serialize_directive()),
            Some(ViewVar::Value(value)) => Some(value),
            None => None,
        };
        let data = match input::resolve_data(vars, directive)? {
            None => None,
            Some((_, ViewVar::Records(payload))) => Some(payload.clone()),
            Some((_, ViewVar::Value(Value::Null))) => None,
            Some((name, ViewVar::Value(_))) => {
                return Err(EncodeError::UnsupportedData(name.to_string()))
            }
        };

        Ok(Self {
            options,
            data,
            contain: read::<StringList>(vars, "_contain")?.map(StringList::into_vec),
            pagination: read::<PaginationInfo>(vars, "_pagination")?,
            query_log: vars.value(QUERY_LOG_VAR).cloned(),
        })
    }
}

/// A list of names given either as an array or as one comma separated string
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum StringList {
    Joined(String),
    List(Vec<String>),
}

impl StringList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            StringList::List(list) => list,
        }
    }
}

fn read<T: DeserializeOwned>(vars: &ViewVars, name: &str) -> Result<Option<T>> {
    match vars.get(name) {
        None => Ok(None),
        Some(ViewVar::Records(_)) => Err(EncodeError::InvalidOption {
            name: name.to_string(),
            reason: "expected a plain value, got records".to_string(),
        }),
        Some(ViewVar::Value(value)) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| EncodeError::InvalidOption {
                name: name.to_string(),
                reason: e.to_string(),
            }),
    }
}
