//! Seed a data directory.
//!
//! Creates the four domain collections and appends records from the demo
//! set and/or a fixtures file. Records whose id is already taken are
//! skipped, so seeding twice with the same input changes nothing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use sneako_core::{DOMAIN_RESOURCES, PRODUCTS, Record, USERS};
use sneako_mockserver::store::{IdStrategy, ResourceStore, StoreError};
use tracing::{debug, info};

use super::CommandError;

/// What to seed.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Add the built-in demo records.
    pub demo: bool,
    /// YAML or JSON fixtures file.
    pub fixtures: Option<PathBuf>,
    /// Id strategy for records without an id.
    pub id_strategy: IdStrategy,
}

/// Result of a seed run.
#[derive(Debug, Default)]
pub struct SeedSummary {
    /// Records appended, per resource.
    pub inserted: BTreeMap<String, usize>,
    /// Records skipped because their id already existed.
    pub skipped: usize,
    /// Record count of every collection after seeding.
    pub totals: BTreeMap<String, usize>,
}

impl SeedSummary {
    /// Log the summary.
    pub fn log(&self) {
        info!("Seeding complete!");
        for (resource, count) in &self.inserted {
            info!("  {resource}: {count} inserted");
        }
        info!("  Records skipped (id already exists): {}", self.skipped);
        for (resource, total) in &self.totals {
            info!("  {resource}: {total} total");
        }
    }
}

type Batch = (String, Vec<Record>);

/// Seed `data_dir`.
///
/// # Errors
///
/// Returns `CommandError` if the fixtures file cannot be read or parsed, or
/// if a collection cannot be opened or written.
pub fn run(data_dir: &Path, options: &SeedOptions) -> Result<SeedSummary, CommandError> {
    let mut batches: Vec<Batch> = Vec::new();
    if options.demo {
        batches.extend(demo_records());
    }
    if let Some(path) = &options.fixtures {
        batches.extend(read_fixtures(path)?);
    }

    let mut required: Vec<&str> = DOMAIN_RESOURCES.to_vec();
    required.extend(batches.iter().map(|(resource, _)| resource.as_str()));

    let store = ResourceStore::open(data_dir, options.id_strategy.allocator(), &required)?;
    info!(path = %data_dir.display(), "Opened data directory");

    let mut summary = SeedSummary::default();
    for (resource, records) in batches {
        for record in records {
            match store.append(&resource, record) {
                Ok(_) => *summary.inserted.entry(resource.clone()).or_default() += 1,
                Err(StoreError::DuplicateId { id, .. }) => {
                    debug!(resource = %resource, id = %id, "skipping existing record");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    summary.totals = store
        .resources()
        .map(|name| (name.to_string(), store.load(name.as_str()).len()))
        .collect();
    Ok(summary)
}

/// Parse a fixtures file: a map from resource name to a list of objects.
fn read_fixtures(path: &Path) -> Result<Vec<Batch>, CommandError> {
    let content = std::fs::read_to_string(path).map_err(|source| CommandError::ReadFixtures {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| CommandError::InvalidFixtures {
        path: path.to_path_buf(),
        reason,
    };

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let parsed: BTreeMap<String, Vec<Value>> = if is_json {
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?
    };

    parsed
        .into_iter()
        .map(|(resource, values)| {
            let records = values
                .into_iter()
                .map(Record::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| invalid(format!("{resource}: {e}")))?;
            Ok((resource, records))
        })
        .collect()
}

/// A demo admin who can log in as `admin` / `sneako123`, and three products.
fn demo_records() -> Vec<Batch> {
    let users = [json!({
        "id": "1",
        "name": "admin",
        "password": "sneako123",
        "phone": "5550100",
        "email": "admin@sneako.dev",
        "address": "1 Demo Street",
        "role": "admin"
    })];
    let products = [
        json!({"id": "1", "name": "Court Classic", "price": 89.99, "category": "casual", "stock": 25, "image": "/images/court-classic.png"}),
        json!({"id": "2", "name": "Trail Runner", "price": 129.0, "category": "running", "stock": 12, "image": "/images/trail-runner.png"}),
        json!({"id": "3", "name": "City High-Top", "price": 109.5, "category": "lifestyle", "stock": 0, "image": "/images/city-high-top.png"}),
    ];

    let records = |values: &[Value]| {
        values
            .iter()
            .filter_map(|v| Record::from_value(v.clone()).ok())
            .collect()
    };
    vec![
        (USERS.to_owned(), records(&users)),
        (PRODUCTS.to_owned(), records(&products)),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn options(demo: bool, fixtures: Option<PathBuf>) -> SeedOptions {
        SeedOptions {
            demo,
            fixtures,
            id_strategy: IdStrategy::Sequential,
        }
    }

    #[test]
    fn test_seed_empty_creates_domain_files() {
        let dir = TempDir::new().unwrap();
        let summary = run(dir.path(), &options(false, None)).unwrap();

        assert!(summary.inserted.is_empty());
        for name in DOMAIN_RESOURCES {
            assert!(dir.path().join(format!("{name}.json")).exists());
            assert_eq!(summary.totals.get(name), Some(&0));
        }
    }

    #[test]
    fn test_seed_demo_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let first = run(dir.path(), &options(true, None)).unwrap();
        assert_eq!(first.inserted.get(USERS), Some(&1));
        assert_eq!(first.inserted.get(PRODUCTS), Some(&3));

        let second = run(dir.path(), &options(true, None)).unwrap();
        assert!(second.inserted.is_empty());
        assert_eq!(second.skipped, 4);
        assert_eq!(second.totals.get(PRODUCTS), Some(&3));
    }

    #[test]
    fn test_seed_yaml_fixtures() {
        let dir = TempDir::new().unwrap();
        let fixtures = dir.path().join("fixtures.yaml");
        std::fs::write(
            &fixtures,
            "orders:\n  - userId: \"1\"\n    total: 89.99\nreviews:\n  - productId: \"1\"\n    stars: 5\n",
        )
        .unwrap();
        let data = dir.path().join("data");

        let summary = run(&data, &options(false, Some(fixtures))).unwrap();
        assert_eq!(summary.inserted.get("orders"), Some(&1));
        assert_eq!(summary.inserted.get("reviews"), Some(&1));
        assert!(data.join("reviews.json").exists());
    }

    #[test]
    fn test_seed_rejects_non_object_fixture() {
        let dir = TempDir::new().unwrap();
        let fixtures = dir.path().join("fixtures.json");
        std::fs::write(&fixtures, r#"{"products": [1, 2]}"#).unwrap();

        let err = run(&dir.path().join("data"), &options(false, Some(fixtures))).unwrap_err();
        assert!(matches!(err, CommandError::InvalidFixtures { .. }));
    }
}
