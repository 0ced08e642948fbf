use crate::logic::schema::id_string;
use crate::model::{AssociationKind, Record, Related, Repository, RepositoryRegistry};
use crate::store::traits::{FindQuery, FoundPage, RecordStore};
use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

type Row = Map<String, Value>;

/// Rows kept per table, including junction tables
#[derive(Debug)]
pub struct MemoryStore {
    registry: Arc<RepositoryRegistry>,
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new(registry: Arc<RepositoryRegistry>) -> Self {
        Self {
            registry,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Append a row; `row` must be a JSON object
    pub fn insert(&self, table: &str, row: Value) -> Result<()> {
        let Value::Object(row) = row else {
            return Err(anyhow!("Rows for table {} must be JSON objects", table));
        };
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    pub fn count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }

    fn repository(&self, name: &str) -> Result<Arc<Repository>> {
        self.registry
            .get(name)
            .ok_or_else(|| anyhow!("Repository {} is not registered", name))
    }
}

fn same_id(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left.and_then(id_string), right.and_then(id_string)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Split contain paths into first segment -> remaining paths, keeping order
fn contain_tree(contain: &[String]) -> Vec<(String, Vec<String>)> {
    let mut tree: Vec<(String, Vec<String>)> = Vec::new();
    for path in contain {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path.as_str(), None),
        };
        let index = match tree.iter().position(|(name, _)| name == head) {
            Some(index) => index,
            None => {
                tree.push((head.to_string(), Vec::new()));
                tree.len() - 1
            }
        };
        if let Some(rest) = rest {
            tree[index].1.push(rest.to_string());
        }
    }
    tree
}

struct Hydrator<'a> {
    registry: &'a RepositoryRegistry,
    tables: &'a HashMap<String, Vec<Row>>,
}

impl<'a> Hydrator<'a> {
    fn rows(&self, table: &str) -> &'a [Row] {
        self.tables.get(table).map_or(&[], Vec::as_slice)
    }

    fn record(&self, repository: &Repository, row: &Row, contain: &[String]) -> Result<Record> {
        let mut record = Record::new(repository.name.clone(), repository.entity_class.clone());
        if repository.fields.is_empty() {
            record.fields = row.clone();
        } else {
            for field in &repository.fields {
                if let Some(value) = row.get(field) {
                    record.fields.insert(field.clone(), value.clone());
                }
            }
        }

        for (name, nested) in contain_tree(contain) {
            let association = repository.association(&name).ok_or_else(|| {
                anyhow!("Repository {} has no association named {}", repository.name, name)
            })?;
            let target = self
                .registry
                .get(&association.target)
                .ok_or_else(|| anyhow!("Repository {} is not registered", association.target))?;
            let key = row.get(&repository.primary_key);

            let matches: Vec<&Row> = match association.kind {
                AssociationKind::BelongsTo => {
                    let foreign_key = row.get(&association.foreign_key);
                    self.rows(&target.table)
                        .iter()
                        .filter(|candidate| same_id(candidate.get(&target.primary_key), foreign_key))
                        .take(1)
                        .collect()
                }
                AssociationKind::HasOne | AssociationKind::HasMany => self
                    .rows(&target.table)
                    .iter()
                    .filter(|candidate| same_id(candidate.get(&association.foreign_key), key))
                    .collect(),
                AssociationKind::BelongsToMany => {
                    let through = association.through.as_deref().unwrap_or_default();
                    let target_key = association
                        .target_foreign_key
                        .as_deref()
                        .unwrap_or_default();
                    let linked: Vec<&Value> = self
                        .rows(through)
                        .iter()
                        .filter(|link| same_id(link.get(&association.foreign_key), key))
                        .filter_map(|link| link.get(target_key))
                        .collect();
                    self.rows(&target.table)
                        .iter()
                        .filter(|candidate| {
                            linked
                                .iter()
                                .any(|id| same_id(candidate.get(&target.primary_key), Some(id)))
                        })
                        .collect()
                }
            };

            let mut records = matches
                .into_iter()
                .map(|related| self.record(&target, related, &nested))
                .collect::<Result<Vec<_>>>()?;

            let related = if association.kind.is_to_many() {
                Related::Many(records)
            } else if records.is_empty() {
                Related::Empty
            } else {
                Related::One(Box::new(records.remove(0)))
            };
            record.associated.insert(association.property.clone(), related);
        }

        Ok(record)
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    fn registry(&self) -> Arc<RepositoryRegistry> {
        self.registry.clone()
    }

    async fn find_all(&self, repository: &str, query: &FindQuery) -> Result<FoundPage> {
        let repository = self.repository(repository)?;
        let tables = self.tables.read();
        let hydrator = Hydrator {
            registry: &self.registry,
            tables: &tables,
        };

        let rows = hydrator.rows(&repository.table);
        let total = rows.len() as u64;
        let (skip, take) = match (query.page, query.limit) {
            (page, Some(limit)) => {
                let limit = limit.max(1);
                ((page.unwrap_or(1).max(1) - 1).saturating_mul(limit), limit)
            }
            (_, None) => (0, total),
        };

        let records = rows
            .iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(take).unwrap_or(usize::MAX))
            .map(|row| hydrator.record(&repository, row, &query.contain))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "found {} of {} {} records",
            records.len(),
            total,
            repository.name
        );
        Ok(FoundPage { records, total })
    }

    async fn get(&self, repository: &str, id: &str, contain: &[String]) -> Result<Option<Record>> {
        let repository = self.repository(repository)?;
        let tables = self.tables.read();
        let hydrator = Hydrator {
            registry: &self.registry,
            tables: &tables,
        };

        let wanted = Value::String(id.to_string());
        hydrator
            .rows(&repository.table)
            .iter()
            .find(|row| same_id(row.get(&repository.primary_key), Some(&wanted)))
            .map(|row| hydrator.record(&repository, row, contain))
            .transpose()
    }
}
