use crate::model::{RepositoryRegistry, Repository, RouteStyle};
use crate::store::MemoryStore;
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

/// Countries, their currencies, cultures and capitals
pub fn registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();

    registry.register(
        Repository::new("Countries")
            .with_fields(&[
                "id",
                "code",
                "name",
                "dummy_counter",
                "currency_id",
                "national_capital_id",
            ])
            .belongs_to("Currency", "Currencies")
            .belongs_to("NationalCapital", "NationalCapitals")
            .has_many("Cultures", "Cultures"),
    );
    registry.register(
        Repository::new("Currencies")
            .with_fields(&["id", "code", "name"])
            .has_many("Countries", "Countries"),
    );
    registry.register(
        Repository::new("Cultures")
            .with_fields(&["id", "code", "name", "country_id"])
            .belongs_to("Country", "Countries"),
    );
    registry.register(
        Repository::new("NationalCapitals")
            .with_fields(&["id", "name", "description"])
            .with_route_style(RouteStyle::Action)
            .has_many("Countries", "Countries"),
    );

    registry
}

pub fn load_seed_data(store: &MemoryStore) -> Result<()> {
    log::info!("Loading seed data...");

    store.insert(
        "countries",
        json!({"id": 1, "code": "NL", "name": "The Netherlands", "dummy_counter": 11111, "currency_id": 1, "national_capital_id": 1}),
    )?;
    store.insert(
        "countries",
        json!({"id": 2, "code": "BE", "name": "Belgium", "dummy_counter": 22222, "currency_id": 1, "national_capital_id": 2}),
    )?;

    store.insert("currencies", json!({"id": 1, "code": "EUR", "name": "Euro"}))?;
    store.insert("currencies", json!({"id": 2, "code": "USD", "name": "US Dollar"}))?;

    store.insert(
        "cultures",
        json!({"id": 1, "code": "nl-NL", "name": "Dutch (Netherlands)", "country_id": 1}),
    )?;
    store.insert(
        "cultures",
        json!({"id": 2, "code": "nl-BE", "name": "Dutch (Belgium)", "country_id": 2}),
    )?;
    store.insert(
        "cultures",
        json!({"id": 3, "code": "fr-BE", "name": "French (Belgium)", "country_id": 2}),
    )?;

    store.insert(
        "national_capitals",
        json!({"id": 1, "name": "Amsterdam", "description": "National capital of the Netherlands"}),
    )?;
    store.insert(
        "national_capitals",
        json!({"id": 2, "name": "Brussels", "description": "National capital of Belgium"}),
    )?;

    log::info!("Seed data loaded successfully");
    Ok(())
}

/// A store holding the seed registry and rows
pub fn seeded_store() -> Result<MemoryStore> {
    let store = MemoryStore::new(Arc::new(registry()));
    load_seed_data(&store)?;
    Ok(store)
}
