#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use lumen_core::models::{Identity, Ordering};
use lumen_core::{
    AppContext, AuthProvider, BackendError, BlobStore, FunctionInvoker, Launch, NoticeBuffer,
    Services, SpeechError, SpeechInput, SpeechOutput, TableStore, Utterance,
};

pub const USER_ID: &str = "0b6a6a9e-1111-4c4c-8888-000000000001";

// ============================================================================
// FakeBackend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CurrentUser,
    SignOut,
    Select { table: String, column: String, ascending: bool },
    Insert { table: String, row: Value },
    Update { table: String, id: String, fields: Value },
    Delete { table: String, id: String },
    Upload { bucket: String, path: String, content_type: String, size: usize },
    Remove { bucket: String, path: String },
    Invoke { name: String, body: Value },
}

/// In-memory backend that records every call. Rows get an `id` and a
/// monotonically increasing `created_at` when inserted without one.
pub struct FakeBackend {
    user: Mutex<Option<Identity>>,
    tables: Mutex<HashMap<String, Vec<Value>>>,
    blobs: Mutex<HashMap<(String, String), Bytes>>,
    functions: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<Call>>,
    clock: Mutex<i64>,
}

impl FakeBackend {
    pub fn signed_in() -> Self {
        Self::with_user(Some(Identity {
            id: USER_ID.to_string(),
            email: Some("ada@example.com".to_string()),
        }))
    }

    pub fn signed_out() -> Self {
        Self::with_user(None)
    }

    fn with_user(user: Option<Identity>) -> Self {
        Self {
            user: Mutex::new(user),
            tables: Mutex::new(HashMap::new()),
            blobs: Mutex::new(HashMap::new()),
            functions: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            clock: Mutex::new(0),
        }
    }

    pub fn set_user(&self, user: Option<Identity>) {
        *self.user.lock().unwrap() = user;
    }

    /// Seeds rows without recording a call.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn blob(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.blobs
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn respond(&self, function: &str, body: Value) {
        self.functions
            .lock()
            .unwrap()
            .insert(function.to_string(), body);
    }

    /// Makes every later `op` call fail with `message` until `recover` is called.
    pub fn fail(&self, op: &str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op.to_string(), message.to_string());
    }

    pub fn recover(&self, op: &str) {
        self.failures.lock().unwrap().remove(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn inserts(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Insert { table, row } => Some((table, row)),
                _ => None,
            })
            .collect()
    }

    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Invoke { name, body } => Some((name, body)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &str) -> Result<(), BackendError> {
        match self.failures.lock().unwrap().get(op) {
            Some(message) => Err(BackendError::Api {
                code: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_timestamp(&self) -> String {
        let mut clock = self.clock.lock().unwrap();
        *clock += 1;
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        (base + Duration::seconds(*clock)).to_rfc3339()
    }
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl AuthProvider for FakeBackend {
    async fn current_user(&self) -> Result<Option<Identity>, BackendError> {
        self.record(Call::CurrentUser);
        self.check("current_user")?;
        Ok(self.user.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.record(Call::SignOut);
        self.check("sign_out")?;
        *self.user.lock().unwrap() = None;
        Ok(())
    }
}

#[async_trait]
impl TableStore for FakeBackend {
    async fn select(&self, table: &str, order: Ordering) -> Result<Vec<Value>, BackendError> {
        self.record(Call::Select {
            table: table.to_string(),
            column: order.column.to_string(),
            ascending: order.ascending,
        });
        self.check("select")?;

        let mut rows = self.rows(table);
        rows.sort_by(|a, b| sort_key(a, order.column).cmp(&sort_key(b, order.column)));
        if !order.ascending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError> {
        self.record(Call::Insert {
            table: table.to_string(),
            row: row.clone(),
        });
        self.check("insert")?;

        let mut row = row;
        if let Some(obj) = row.as_object_mut() {
            if !obj.contains_key("id") {
                obj.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
            }
            if !obj.contains_key("created_at") {
                obj.insert("created_at".to_string(), Value::String(self.next_timestamp()));
            }
        }
        self.seed(table, vec![row]);
        Ok(())
    }

    async fn update(&self, table: &str, id: &str, fields: Value) -> Result<(), BackendError> {
        self.record(Call::Update {
            table: table.to_string(),
            id: id.to_string(),
            fields: fields.clone(),
        });
        self.check("update")?;

        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| r["id"] == id) {
                if let (Some(target), Some(patch)) = (row.as_object_mut(), fields.as_object()) {
                    for (key, value) in patch {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        self.record(Call::Delete {
            table: table.to_string(),
            id: id.to_string(),
        });
        self.check("delete")?;

        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|r| r["id"] != id);
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FakeBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError> {
        self.record(Call::Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });
        self.check("upload")?;

        self.blobs
            .lock()
            .unwrap()
            .insert((bucket.to_string(), path.to_string()), bytes);
        Ok(())
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), BackendError> {
        self.record(Call::Remove {
            bucket: bucket.to_string(),
            path: path.to_string(),
        });
        self.check("remove")?;

        self.blobs
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), path.to_string()));
        Ok(())
    }
}

#[async_trait]
impl FunctionInvoker for FakeBackend {
    async fn invoke(&self, name: &str, body: Value) -> Result<Value, BackendError> {
        self.record(Call::Invoke {
            name: name.to_string(),
            body,
        });
        self.check("invoke")?;

        self.functions
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                code: 404,
                message: format!("Function {} not found", name),
            })
    }
}

// ============================================================================
// Speech doubles
// ============================================================================

/// Synthesizer that logs `cancel` / `start:<text>` and counts overlapping utterances.
#[derive(Default)]
pub struct RecordingSpeech {
    pub unsupported: bool,
    events: Mutex<Vec<String>>,
    active: Mutex<Option<String>>,
    overlaps: Mutex<usize>,
}

impl RecordingSpeech {
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn overlaps(&self) -> usize {
        *self.overlaps.lock().unwrap()
    }

    pub fn active(&self) -> Option<String> {
        self.active.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    async fn cancel(&self) {
        self.events.lock().unwrap().push("cancel".to_string());
        *self.active.lock().unwrap() = None;
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let mut active = self.active.lock().unwrap();
        if active.is_some() {
            *self.overlaps.lock().unwrap() += 1;
        }
        self.events
            .lock()
            .unwrap()
            .push(format!("start:{}", utterance.text));
        *active = Some(utterance.text);
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }
}

/// Recognizer that replays queued transcripts (or errors) one per call.
/// A hanging recognizer never resolves once its script is exhausted.
#[derive(Default)]
pub struct ScriptedRecognizer {
    pub unsupported: bool,
    pub hanging: bool,
    script: Mutex<VecDeque<Result<String, String>>>,
    stops: Mutex<usize>,
}

impl ScriptedRecognizer {
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hanging: true,
            ..Self::default()
        }
    }

    pub fn push(&self, outcome: Result<&str, &str>) {
        self.script
            .lock()
            .unwrap()
            .push_back(outcome.map(str::to_string).map_err(str::to_string));
    }

    pub fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

#[async_trait]
impl SpeechInput for ScriptedRecognizer {
    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    async fn recognize(&self) -> Result<String, SpeechError> {
        let next = self.script.lock().unwrap().pop_front();
        if next.is_none() && self.hanging {
            std::future::pending::<()>().await;
        }
        match next {
            Some(Ok(transcript)) => Ok(transcript),
            Some(Err(message)) => Err(SpeechError::Recognition(message)),
            None => Err(SpeechError::Recognition("no-speech".to_string())),
        }
    }

    async fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub notices: NoticeBuffer,
    pub speech: Arc<RecordingSpeech>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub ctx: AppContext,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_speech(RecordingSpeech::default(), ScriptedRecognizer::default()).await
    }

    pub async fn with_speech(speech: RecordingSpeech, recognizer: ScriptedRecognizer) -> Self {
        let backend = Arc::new(FakeBackend::signed_in());
        let notices = NoticeBuffer::new();
        let speech = Arc::new(speech);
        let recognizer = Arc::new(recognizer);

        let services = Services::new(backend.clone(), Arc::new(notices.clone()))
            .with_speech(recognizer.clone(), speech.clone());
        let ctx = match AppContext::resolve(services).await {
            Ok(Launch::Ready(ctx)) => ctx,
            Ok(Launch::SignIn) => panic!("Expected a signed-in session"),
            Err(e) => panic!("Failed to resolve context: {}", e),
        };
        backend.reset_calls();

        Self {
            backend,
            notices,
            speech,
            recognizer,
            ctx,
        }
    }

    pub fn notice_titles(&self) -> Vec<String> {
        self.notices
            .snapshot()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }
}

pub fn notification_row(id: &str, message: &str, is_read: bool, created_at: &str) -> Value {
    serde_json::json!({
        "id": id,
        "user_id": USER_ID,
        "message": message,
        "is_read": is_read,
        "created_at": created_at,
    })
}
