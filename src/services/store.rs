//! Persistence of extracted records and figure images.
//!
//! [`PaperStore`] is the narrow interface the pipelines write through.
//! [`SupabaseStore`] speaks the Supabase PostgREST and Storage REST APIs;
//! [`MemoryStore`] keeps everything in process.

use crate::error::{Error, Result};
use crate::tei::divisions::DivisionRecord;
use crate::tei::metadata::MetadataRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

/// A paper row, as far as the pipelines need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper summary id
    pub id: String,
    /// URL of the source PDF
    #[serde(default)]
    pub pdf_file_path: Option<String>,
    /// Every other column of the row
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PaperRecord {
    /// Create a record with only an id and PDF URL.
    pub fn new(id: impl Into<String>, pdf_file_path: Option<String>) -> Self {
        Self {
            id: id.into(),
            pdf_file_path,
            extra: serde_json::Map::new(),
        }
    }
}

/// A figure or table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    /// Store-assigned id, present after insertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Owning paper summary id
    pub paper_summary_id: String,
    /// `"figure"` or `"table"`
    pub figure_type: String,
    /// Position-derived id, e.g. `fig-2-0` or `table-4-1`
    pub figure_id: String,
    /// Heading text (may be empty)
    pub head: String,
    /// Caption text (may be empty)
    pub description: String,
    /// Local path of the saved crop
    pub extracted_image_path: String,
    /// One-based page number
    pub page_number: u32,
    /// Local path of the source PDF
    pub source_file: String,
    /// Public URL of the uploaded crop
    pub image_url: Option<String>,
}

/// Table names used by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTables {
    /// Paper rows holding the PDF URL
    pub papers: String,
    /// Division rows
    pub divisions: String,
    /// Metadata rows
    pub metadata: String,
    /// Figure and table rows
    pub figures: String,
}

impl Default for StoreTables {
    fn default() -> Self {
        Self {
            papers: "PaperMainStructure".to_string(),
            divisions: "PaperContentGrobid".to_string(),
            metadata: "PaperMetadataGrobid".to_string(),
            figures: "PaperFigures".to_string(),
        }
    }
}

/// Backing store for papers, extracted records and images.
pub trait PaperStore {
    /// Look up a paper by id.
    fn fetch_paper(&self, id: &str) -> Result<Option<PaperRecord>>;

    /// Insert division rows, returning the stored rows.
    fn insert_divisions(&self, rows: &[DivisionRecord]) -> Result<Vec<Value>>;

    /// Insert a metadata row, returning the stored row.
    fn insert_metadata(&self, row: &MetadataRecord) -> Result<Value>;

    /// Insert a figure row, returning its id (`None` if the store returned no row).
    fn insert_figure(&self, row: &FigureRecord) -> Result<Option<Value>>;

    /// Upload PNG bytes to `bucket/path`, returning the public URL.
    fn upload_image(&self, bucket: &str, path: &str, png: &[u8]) -> Result<String>;
}

/// Store backed by a Supabase project.
pub struct SupabaseStore {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    tables: StoreTables,
}

impl SupabaseStore {
    /// Create a store for the project at `base_url` authenticated with `api_key`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            tables: StoreTables::default(),
        })
    }

    /// Override table names.
    pub fn with_tables(mut self, tables: StoreTables) -> Self {
        self.tables = tables;
        self
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }

    fn authorized(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Error::ServiceStatus {
            service: "Supabase",
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }

    fn insert_rows<T: Serialize + ?Sized>(&self, table: &str, rows: &T) -> Result<Vec<Value>> {
        let request = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(rows);
        let response = Self::check(self.authorized(request).send()?)?;
        match response.json::<Value>()? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

impl PaperStore for SupabaseStore {
    fn fetch_paper(&self, id: &str) -> Result<Option<PaperRecord>> {
        let request = self
            .client
            .get(self.rest_url(&self.tables.papers))
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())]);
        let response = Self::check(self.authorized(request).send()?)?;
        let mut rows: Vec<PaperRecord> = response.json()?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    fn insert_divisions(&self, rows: &[DivisionRecord]) -> Result<Vec<Value>> {
        self.insert_rows(&self.tables.divisions, rows)
    }

    fn insert_metadata(&self, row: &MetadataRecord) -> Result<Value> {
        self.insert_rows(&self.tables.metadata, row)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Store("metadata insert returned no row".to_string()))
    }

    fn insert_figure(&self, row: &FigureRecord) -> Result<Option<Value>> {
        let rows = self.insert_rows(&self.tables.figures, row)?;
        Ok(rows.into_iter().next().and_then(|r| r.get("id").cloned()))
    }

    fn upload_image(&self, bucket: &str, path: &str, png: &[u8]) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let request = self
            .client
            .post(url)
            .header("Content-Type", "image/png")
            .body(png.to_vec());
        Self::check(self.authorized(request).send()?)?;
        Ok(self.public_url(bucket, path))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    papers: HashMap<String, PaperRecord>,
    divisions: Vec<DivisionRecord>,
    metadata: Vec<MetadataRecord>,
    figures: Vec<FigureRecord>,
    objects: BTreeMap<String, Vec<u8>>,
    next_id: u64,
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paper row.
    pub fn with_paper(self, paper: PaperRecord) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.papers.insert(paper.id.clone(), paper);
        }
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))
    }

    /// Stored division rows.
    pub fn divisions(&self) -> Vec<DivisionRecord> {
        self.lock().map(|s| s.divisions.clone()).unwrap_or_default()
    }

    /// Stored metadata rows.
    pub fn metadata(&self) -> Vec<MetadataRecord> {
        self.lock().map(|s| s.metadata.clone()).unwrap_or_default()
    }

    /// Stored figure rows.
    pub fn figures(&self) -> Vec<FigureRecord> {
        self.lock().map(|s| s.figures.clone()).unwrap_or_default()
    }

    /// Uploaded object keys (`bucket/path`).
    pub fn object_keys(&self) -> Vec<String> {
        self.lock()
            .map(|s| s.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Bytes of an uploaded object.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().ok().and_then(|s| s.objects.get(key).cloned())
    }
}

impl PaperStore for MemoryStore {
    fn fetch_paper(&self, id: &str) -> Result<Option<PaperRecord>> {
        Ok(self.lock()?.papers.get(id).cloned())
    }

    fn insert_divisions(&self, rows: &[DivisionRecord]) -> Result<Vec<Value>> {
        let mut state = self.lock()?;
        state.divisions.extend_from_slice(rows);
        rows.iter()
            .map(|r| serde_json::to_value(r).map_err(Error::from))
            .collect()
    }

    fn insert_metadata(&self, row: &MetadataRecord) -> Result<Value> {
        let mut state = self.lock()?;
        state.metadata.push(row.clone());
        Ok(serde_json::to_value(row)?)
    }

    fn insert_figure(&self, row: &FigureRecord) -> Result<Option<Value>> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = Value::from(state.next_id);
        let mut stored = row.clone();
        stored.id = Some(id.clone());
        state.figures.push(stored);
        Ok(Some(id))
    }

    fn upload_image(&self, bucket: &str, path: &str, png: &[u8]) -> Result<String> {
        let key = format!("{}/{}", bucket, path);
        self.lock()?.objects.insert(key.clone(), png.to_vec());
        Ok(format!("memory://{}", key))
    }
}
