use std::{collections::HashMap, io, path::PathBuf, sync::Arc};

use qb_core::{
    AppState, CoreConfig,
    import::import_bank,
    source::{DocumentSource, ReadFuture},
};
use qb_db::Store;
use serde_json::{Value, json};

/// Name the default bank asset is registered under in tests
pub const DEFAULT_ASSET: &str = "default_bank.json";

/// Document source backed by a map of file names to contents
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn with_file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), bytes);
        self
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{name} not found")))
    }
}

impl DocumentSource for MemorySource {
    fn open_for_read<'a>(&'a self, source_ref: &'a str) -> ReadFuture<'a> {
        let result = self.read(source_ref);
        Box::pin(async move { result })
    }

    fn read_bundled_asset<'a>(&'a self, name: &'a str) -> ReadFuture<'a> {
        let result = self.read(name);
        Box::pin(async move { result })
    }
}

/// Test state builder for creating an AppState over a private in-memory database
pub struct TestStateBuilder {
    config: CoreConfig,
    source: MemorySource,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            config: CoreConfig::default(),
            source: MemorySource::default(),
        }
    }

    pub fn with_file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.source = self.source.with_file(name, bytes);
        self
    }

    pub fn with_default_bank(self, bytes: Vec<u8>) -> Self {
        self.with_file(DEFAULT_ASSET, bytes)
    }

    /// Build the state. Each call gets its own empty, migrated database.
    pub async fn build(self) -> anyhow::Result<AppState> {
        let pool = qb_db::create_memory_pool().await?;

        Ok(AppState::from_parts(
            self.config,
            Store::new(pool),
            Arc::new(self.source),
        ))
    }

    /// Build the state over a file database shared by several connections.
    pub async fn build_with_database(self, database_url: &str) -> anyhow::Result<AppState> {
        let pool = qb_db::create_pool(database_url, 4).await?;
        qb_db::ensure_db_and_migrate(database_url, &pool).await?;

        Ok(AppState::from_parts(
            self.config,
            Store::new(pool),
            Arc::new(self.source),
        ))
    }
}

/// Temporary on-disk database, removed with its WAL files on drop
pub struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    pub fn new() -> Self {
        let name = format!("quizbank-test-{}.db", uuid::Uuid::now_v7().simple());
        Self {
            path: std::env::temp_dir().join(name),
        }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

fn four_options() -> Value {
    json!([
        {"tag": "A", "value": "alpha", "valuelist": []},
        {"tag": "B", "value": "beta", "valuelist": []},
        {"tag": "C", "value": "gamma", "valuelist": []},
        {"tag": "D", "value": "delta", "valuelist": []}
    ])
}

fn document(doc_id: &str, list: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "status": 200,
        "msg": "ok",
        "obj": {"id": doc_id, "type": 1, "list": list}
    }))
    .unwrap()
}

/// `count` single-choice questions, all answered by "B", stems "Question 1".."Question n"
pub fn single_choice_document(doc_id: &str, count: usize) -> Vec<u8> {
    let list = (1..=count)
        .map(|i| {
            json!({
                "id": format!("q{i}"),
                "stemlist": [{"text": format!("Question {i}"), "type": 1}],
                "answer": "B",
                "options": four_options(),
                "type": 1,
                "jx": format!("Explanation {i}")
            })
        })
        .collect();

    document(doc_id, list)
}

/// One question of each kind: single choice "B", multiple choice "A,C", true/false "A"
pub fn mixed_document(doc_id: &str) -> Vec<u8> {
    let list = vec![
        json!({
            "id": "single",
            "stemlist": [{"text": "Which planet is closest to the sun?", "type": 1}],
            "answer": "B",
            "options": four_options(),
            "type": 1,
            "jx": "Mercury."
        }),
        json!({
            "id": "multi",
            "stemlist": [{"text": "Which of these are primes?", "type": 1}],
            "answer": "A,C",
            "options": [
                {"tag": "D", "value": "9"},
                {"tag": "A", "value": "2"},
                {"tag": "C", "value": "7"},
                {"tag": "B", "value": "4"}
            ],
            "type": 2
        }),
        json!({
            "id": "truefalse",
            "stemlist": [{"text": "Water boils at 100 C at sea level.", "type": 1}],
            "answer": "A",
            "options": [
                {"tag": "A", "value": "True"},
                {"tag": "B", "value": "False"}
            ],
            "type": 3
        }),
    ];

    document(doc_id, list)
}

/// Import `bytes` as a user bank and return its id.
pub async fn import(state: &AppState, bytes: &[u8], name: &str) -> anyhow::Result<String> {
    let summary = import_bank(state, bytes, name).await?;
    summary
        .bank_id
        .ok_or_else(|| anyhow::anyhow!("import of {name} was skipped"))
}
