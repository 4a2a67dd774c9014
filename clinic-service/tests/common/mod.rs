//! In-process test application: the real router and services wired to
//! in-memory port implementations, driven through `tower::oneshot`.
//! No database, mail relay or filesystem is involved, so the suite runs
//! anywhere.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::PasswordHasher;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use clinic_service::domain::auth::errors::AuthError;
use clinic_service::domain::auth::models::PasswordReset;
use clinic_service::domain::auth::models::RefreshSession;
use clinic_service::domain::auth::ports::Clock;
use clinic_service::domain::auth::ports::MailError;
use clinic_service::domain::auth::ports::Mailer;
use clinic_service::domain::auth::ports::SessionStore;
use clinic_service::domain::auth::service::AuthService;
use clinic_service::domain::auth::service::AuthSettings;
use clinic_service::domain::document::errors::DocumentError;
use clinic_service::domain::document::models::Document;
use clinic_service::domain::document::models::DocumentAudience;
use clinic_service::domain::document::models::DocumentFilter;
use clinic_service::domain::document::models::DocumentScope;
use clinic_service::domain::document::models::DocumentStatus;
use clinic_service::domain::document::models::NewDocumentRecord;
use clinic_service::domain::document::ports::DocumentRepository;
use clinic_service::domain::document::ports::FileStore;
use clinic_service::domain::document::ports::FileStoreError;
use clinic_service::domain::document::service::DocumentService;
use clinic_service::domain::link::errors::LinkError;
use clinic_service::domain::link::models::LinkedPatient;
use clinic_service::domain::link::ports::LinkRepository;
use clinic_service::domain::link::service::LinkService;
use clinic_service::domain::paging::Page;
use clinic_service::domain::user::errors::UserError;
use clinic_service::domain::user::models::EmailAddress;
use clinic_service::domain::user::models::NewUserRecord;
use clinic_service::domain::user::models::Role;
use clinic_service::domain::user::models::User;
use clinic_service::domain::user::models::UserFilter;
use clinic_service::domain::user::models::UserStatus;
use clinic_service::domain::user::ports::UserRepository;
use clinic_service::domain::user::service::UserService;
use clinic_service::inbound::http::router::create_router;
use clinic_service::inbound::http::router::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"integration_secret_at_least_32_bytes!";
pub const TEST_PEPPER: &str = "integration-pepper";
pub const BASE_URL: &str = "https://api.clinic.test";

// ---------------------------------------------------------------------------
// Clock

pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Users

#[derive(Default)]
struct UsersInner {
    rows: Vec<User>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryUsers {
    inner: Mutex<UsersInner>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, record: NewUserRecord) -> Result<User, UserError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.rows.iter().any(|u| u.email == record.email.as_str()) {
            return Err(UserError::EmailExists);
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name: record.name,
            email: record.email.into_string(),
            password_hash: record.password_hash,
            role: record.role,
            status: record.status,
            photo_url: record.photo_url,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, UserError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<User> = inner
            .rows
            .iter()
            .filter(|u| {
                filter.status.map_or(true, |s| u.status == s)
                    && filter.role.map_or(true, |r| u.role == r)
                    && filter.q.as_deref().map_or(true, |q| {
                        let q = q.to_lowercase();
                        u.name.to_lowercase().contains(&q) || u.email.contains(&q)
                    })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        let total = rows.len() as i64;
        let start = ((filter.page - 1) * filter.per_page) as usize;
        let data: Vec<User> = rows
            .into_iter()
            .skip(start)
            .take(filter.per_page as usize)
            .collect();
        Ok(Page::new(data, filter.page, filter.per_page, total))
    }

    async fn update(&self, user: &User) -> Result<(), UserError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .rows
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(UserError::EmailExists);
        }
        match inner.rows.iter_mut().find(|u| u.id == user.id) {
            Some(row) => {
                *row = user.clone();
                row.updated_at = Utc::now();
                Ok(())
            }
            None => Err(UserError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), UserError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|u| u.id != id);
        if inner.rows.len() == before {
            return Err(UserError::NotFound);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sessions

#[derive(Default)]
struct SessionsInner {
    refresh: Vec<RefreshSession>,
    resets: Vec<PasswordReset>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemorySessions {
    inner: Mutex<SessionsInner>,
}

impl InMemorySessions {
    pub fn active_session_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.refresh.iter().filter(|s| s.revoked_at.is_none()).count()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn create_refresh_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AuthError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.refresh.push(RefreshSession {
            id,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_active_refresh_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, AuthError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .refresh
            .iter()
            .find(|s| s.token_hash == token_hash && s.revoked_at.is_none())
            .cloned())
    }

    async fn find_refresh_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, AuthError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .refresh
            .iter()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_refresh_session(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // One mutex guards the whole store, so the compare-and-set below
        // is atomic exactly like the SQL conditional update.
        let mut inner = self.inner.lock().unwrap();
        match inner.refresh.iter_mut().find(|s| s.id == id) {
            Some(session) if session.revoked_at.is_none() => {
                session.revoked_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_password_reset(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AuthError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.resets.push(PasswordReset {
            id,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            used_at: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_unused_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, AuthError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .resets
            .iter()
            .find(|r| r.token_hash == token_hash && r.used_at.is_none())
            .cloned())
    }

    async fn mark_password_reset_used(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(reset) = inner.resets.iter_mut().find(|r| r.id == id) {
            if reset.used_at.is_none() {
                reset.used_at = Some(at);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mailer

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub fn fail_next_send(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn last(&self) -> Option<SentMail> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(MailError("simulated delivery failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Links

pub struct InMemoryLinkRepo {
    pairs: Mutex<Vec<(i64, i64)>>,
    users: Arc<InMemoryUsers>,
}

impl InMemoryLinkRepo {
    pub fn new(users: Arc<InMemoryUsers>) -> Self {
        Self {
            pairs: Mutex::new(Vec::new()),
            users,
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepo {
    async fn list_patients(&self, nutritionist_id: i64) -> Result<Vec<LinkedPatient>, LinkError> {
        let patient_ids: Vec<i64> = self
            .pairs
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| *n == nutritionist_id)
            .map(|(_, p)| *p)
            .collect();

        let mut patients = Vec::new();
        for id in patient_ids {
            if let Some(user) = self.users.find_by_id(id).await? {
                patients.push(LinkedPatient {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    status: user.status,
                    photo_url: user.photo_url,
                });
            }
        }
        Ok(patients)
    }

    async fn exists(&self, nutritionist_id: i64, patient_id: i64) -> Result<bool, LinkError> {
        Ok(self
            .pairs
            .lock()
            .unwrap()
            .contains(&(nutritionist_id, patient_id)))
    }

    async fn insert(
        &self,
        nutritionist_id: i64,
        patient_id: i64,
        _created_at: DateTime<Utc>,
    ) -> Result<(), LinkError> {
        let mut pairs = self.pairs.lock().unwrap();
        if !pairs.contains(&(nutritionist_id, patient_id)) {
            pairs.push((nutritionist_id, patient_id));
        }
        Ok(())
    }

    async fn delete(&self, nutritionist_id: i64, patient_id: i64) -> Result<(), LinkError> {
        self.pairs
            .lock()
            .unwrap()
            .retain(|pair| *pair != (nutritionist_id, patient_id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Documents

#[derive(Default)]
struct DocsInner {
    docs: Vec<Document>,
    assignments: Vec<(i64, i64)>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryDocs {
    inner: Mutex<DocsInner>,
}

impl InMemoryDocs {
    /// Seed a document row directly (bypassing the upload flow).
    pub fn seed(
        &self,
        uploaded_by: i64,
        scope: DocumentScope,
        status: DocumentStatus,
        storage_path: &str,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.docs.push(Document {
            id,
            title: format!("Document {}", id),
            description: None,
            file_type: "pdf".to_string(),
            storage_path: storage_path.to_string(),
            download_url: format!("{}/documents/{}/download", BASE_URL, id),
            size_bytes: 8,
            scope,
            status,
            uploaded_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn assign(&self, document_id: i64, patient_id: i64) {
        self.inner
            .lock()
            .unwrap()
            .assignments
            .push((document_id, patient_id));
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocs {
    async fn create(&self, record: NewDocumentRecord) -> Result<Document, DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let doc = Document {
            id: inner.next_id,
            title: record.title,
            description: record.description,
            file_type: record.file_type,
            storage_path: record.storage_path,
            download_url: String::new(),
            size_bytes: record.size_bytes,
            scope: record.scope,
            status: record.status,
            uploaded_by: record.uploaded_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.docs.push(doc.clone());
        Ok(doc)
    }

    async fn set_download_url(&self, id: i64, url: &str) -> Result<(), DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(doc) = inner.docs.iter_mut().find(|d| d.id == id) {
            doc.download_url = url.to_string();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DocumentError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.docs.iter().find(|d| d.id == id).cloned())
    }

    async fn list(
        &self,
        audience: &DocumentAudience,
        filter: &DocumentFilter,
    ) -> Result<Page<Document>, DocumentError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Document> = inner
            .docs
            .iter()
            .filter(|d| match audience {
                DocumentAudience::All => true,
                DocumentAudience::UploadedBy(user_id) => d.uploaded_by == *user_id,
                DocumentAudience::VisibleToPatient(patient_id) => {
                    d.status == DocumentStatus::Active
                        && (d.scope == DocumentScope::General
                            || inner.assignments.contains(&(d.id, *patient_id)))
                }
            })
            .filter(|d| {
                filter.scope.map_or(true, |s| d.scope == s)
                    && filter.status.map_or(true, |s| d.status == s)
                    && filter.q.as_deref().map_or(true, |q| {
                        let q = q.to_lowercase();
                        d.title.to_lowercase().contains(&q)
                            || d.description
                                .as_deref()
                                .map_or(false, |desc| desc.to_lowercase().contains(&q))
                    })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        let total = rows.len() as i64;
        let start = ((filter.page - 1) * filter.per_page) as usize;
        let data: Vec<Document> = rows
            .into_iter()
            .skip(start)
            .take(filter.per_page as usize)
            .collect();
        Ok(Page::new(data, filter.page, filter.per_page, total))
    }

    async fn update(&self, document: &Document) -> Result<(), DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.docs.iter_mut().find(|d| d.id == document.id) {
            Some(row) => {
                *row = document.clone();
                Ok(())
            }
            None => Err(DocumentError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.docs.len();
        inner.docs.retain(|d| d.id != id);
        if inner.docs.len() == before {
            return Err(DocumentError::NotFound);
        }
        Ok(())
    }

    async fn replace_assignments(
        &self,
        document_id: i64,
        patient_ids: &[i64],
    ) -> Result<(), DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.assignments.retain(|(d, _)| *d != document_id);
        for patient_id in patient_ids.iter().filter(|id| **id > 0) {
            inner.assignments.push((document_id, *patient_id));
        }
        Ok(())
    }

    async fn is_assigned(
        &self,
        document_id: i64,
        patient_id: i64,
    ) -> Result<bool, DocumentError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.assignments.contains(&(document_id, patient_id)))
    }

    async fn clear_assignments(&self, document_id: i64) -> Result<(), DocumentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.assignments.retain(|(d, _)| *d != document_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Files

#[derive(Default)]
pub struct InMemoryFiles {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryFiles {
    pub fn put(&self, path: &str, content: &[u8]) {
        self.blobs
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_vec());
    }
}

#[async_trait]
impl FileStore for InMemoryFiles {
    async fn save(&self, relative_path: &str, content: &[u8]) -> Result<(), FileStoreError> {
        self.put(relative_path, content);
        Ok(())
    }

    async fn read(&self, relative_path: &str) -> Result<Vec<u8>, FileStoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(relative_path)
            .cloned()
            .ok_or(FileStoreError::NotFound)
    }

    async fn remove(&self, relative_path: &str) -> Result<(), FileStoreError> {
        self.blobs
            .lock()
            .unwrap()
            .remove(relative_path)
            .map(|_| ())
            .ok_or(FileStoreError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// TestApp

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub sessions: Arc<InMemorySessions>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<TestClock>,
    pub docs: Arc<InMemoryDocs>,
    pub files: Arc<InMemoryFiles>,
    hasher: PasswordHasher,
}

impl TestApp {
    pub fn spawn() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let sessions = Arc::new(InMemorySessions::default());
        let mailer = Arc::new(RecordingMailer::default());
        let clock = Arc::new(TestClock::new());
        let docs = Arc::new(InMemoryDocs::default());
        let files = Arc::new(InMemoryFiles::default());
        let links = Arc::new(InMemoryLinkRepo::new(Arc::clone(&users)));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&sessions),
            Arc::clone(&users),
            Arc::clone(&mailer),
            Arc::clone(&clock),
            TEST_SECRET,
            AuthSettings {
                issuer: format!("{}/", BASE_URL),
                token_pepper: Some(TEST_PEPPER.to_string()),
                access_token_ttl_secs: 900,
                refresh_token_ttl_days: 30,
                reset_token_ttl_minutes: 60,
                reset_link_url: "https://clinic.test/reset.html".to_string(),
            },
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&users)));
        let link_service = Arc::new(LinkService::new(
            links,
            Arc::clone(&users),
            Arc::clone(&clock),
        ));
        let document_service = Arc::new(DocumentService::new(
            Arc::clone(&docs),
            Arc::clone(&files),
            Arc::clone(&clock),
            BASE_URL.to_string(),
        ));

        let state = AppState {
            auth_service,
            user_service,
            link_service,
            document_service,
            users: Arc::clone(&users) as Arc<dyn UserRepository>,
            jwt: Arc::new(auth::JwtHandler::new(TEST_SECRET)),
        };

        Self {
            router: create_router(state),
            users,
            sessions,
            mailer,
            clock,
            docs,
            files,
            hasher: PasswordHasher::new(),
        }
    }

    pub async fn seed_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        status: UserStatus,
    ) -> i64 {
        let record = NewUserRecord {
            name: name.to_string(),
            email: EmailAddress::new(email).unwrap(),
            password_hash: self.hasher.hash(password).unwrap(),
            role,
            status,
            photo_url: None,
        };
        self.users.create(record).await.unwrap().id
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.raw_request(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn raw_request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, bytes)
    }

    /// Multipart POST for document uploads.
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        file: (&str, &[u8]),
    ) -> (StatusCode, Value) {
        const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file.0
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.1);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// GET that keeps the response headers (downloads).
    pub async fn download(
        &self,
        uri: &str,
        token: &str,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, headers, bytes)
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Login and return the access token, for tests that just need a
    /// valid bearer credential.
    pub async fn access_token(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }
}
