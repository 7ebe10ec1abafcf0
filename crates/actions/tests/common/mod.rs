//! In-memory gateway and data server shared by the integration tests.
//!
//! The fake gateway and the axum data server share one storage map, so a
//! payload written over the data plane is visible to `stat` and listings.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use storegate_actions::paths;
use storegate_protocol::constants::{ACCESS_TOKEN_HEADER, COMBINED_PATH_KEY, COMBINED_TOKEN_KEY};
use storegate_protocol::messages::{
    AuthenticateRequest, AuthenticateResponse, CreateContainerRequest, CreateContainerResponse,
    DeleteRequest, DeleteResponse, InitiateFileDownloadRequest, InitiateFileDownloadResponse,
    InitiateFileUploadRequest, InitiateFileUploadResponse, ListAuthProvidersResponse,
    ListContainerRequest, ListContainerResponse, MoveRequest, MoveResponse, StatRequest,
    StatResponse,
};
use storegate_protocol::{
    CallContext, CallError, CallFuture, ChecksumPriority, Code, GatewayApi, Opaque, OpaqueEntry,
    Reference, ResourceInfo, ResourceType, Status, TransferEndpoint,
};
use storegate_session::{Connector, Session, SessionConfig};

pub const ACCESS_TOKEN: &str = "access-token";
pub const DAV_TOKEN: &str = "dav-token";

// ---------------------------------------------------------------------------
// Shared storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Entry {
    pub resource_type: ResourceType,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct TusUpload {
    target: String,
    length: u64,
    data: Vec<u8>,
}

#[derive(Default)]
pub struct Storage {
    entries: BTreeMap<String, Entry>,
    /// Data-plane URL path -> gateway path.
    slots: HashMap<String, String>,
    tus: HashMap<String, TusUpload>,
    next_slot: u64,
    requests: Vec<RecordedRequest>,
    fail_data: bool,
}

impl Storage {
    fn store_file(&mut self, path: &str, data: Vec<u8>) {
        self.entries.insert(
            path.to_string(),
            Entry {
                resource_type: ResourceType::File,
                data,
            },
        );
    }

    fn slot(&mut self, prefix: &str, target: &str) -> String {
        self.next_slot += 1;
        let path = format!("/{prefix}/{}", self.next_slot);
        self.slots.insert(path.clone(), target.to_string());
        path
    }

    fn info(&self, path: &str) -> Option<ResourceInfo> {
        if path == "/" {
            return Some(ResourceInfo {
                path: "/".into(),
                resource_type: ResourceType::Container,
                ..Default::default()
            });
        }
        self.entries.get(path).map(|e| ResourceInfo {
            path: path.to_string(),
            resource_type: e.resource_type,
            size: e.data.len() as u64,
            ..Default::default()
        })
    }
}

type Shared = Arc<Mutex<Storage>>;

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// How the fake gateway describes the data plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintMode {
    /// No opaque hints: direct HTTP or resumable upload.
    Plain,
    /// Both combined-protocol hints present.
    Combined,
    /// Only the token hint present.
    PartialCombined,
    /// Both hints present, token with a foreign decoder.
    MalformedCombined,
}

pub struct FakeGateway {
    storage: Shared,
    base_url: String,
    auth_methods: Vec<String>,
    mode: Mutex<HintMode>,
    checksums: Mutex<Vec<ChecksumPriority>>,
    forced: Mutex<HashMap<&'static str, Code>>,
    fail_stat_path: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn set_mode(&self, mode: HintMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn offer_checksums(&self, checksums: Vec<ChecksumPriority>) {
        *self.checksums.lock().unwrap() = checksums;
    }

    /// Makes every later call of `op` return `code`.
    pub fn force_status(&self, op: &'static str, code: Code) {
        self.forced.lock().unwrap().insert(op, code);
    }

    /// Makes `stat` of `path` fail with an internal error.
    pub fn fail_stat_of(&self, path: &str) {
        *self.fail_stat_path.lock().unwrap() = Some(path.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn begin(&self, op: &'static str) -> Option<Status> {
        self.calls.lock().unwrap().push(op.to_string());
        self.forced
            .lock()
            .unwrap()
            .get(op)
            .map(|code| Status::new(*code, format!("forced {op} failure")).with_trace("trace-1"))
    }

    fn endpoint(&self, target: &str, slot_prefix: &str) -> TransferEndpoint {
        let mode = *self.mode.lock().unwrap();
        let available_checksums = self.checksums.lock().unwrap().clone();
        let combined = Opaque::new()
            .with_plain(COMBINED_TOKEN_KEY, DAV_TOKEN)
            .with_plain(COMBINED_PATH_KEY, target);

        let (endpoint, opaque) = match mode {
            HintMode::Combined => (format!("{}/dav", self.base_url), Some(combined)),
            HintMode::MalformedCombined => (
                format!("{}/dav", self.base_url),
                Some(combined.with_entry(
                    COMBINED_TOKEN_KEY,
                    OpaqueEntry {
                        decoder: "json".into(),
                        value: format!("\"{DAV_TOKEN}\"").into_bytes(),
                    },
                )),
            ),
            HintMode::Plain | HintMode::PartialCombined => {
                let slot = self.storage.lock().unwrap().slot(slot_prefix, target);
                let opaque = (mode == HintMode::PartialCombined)
                    .then(|| Opaque::new().with_plain(COMBINED_TOKEN_KEY, DAV_TOKEN));
                (format!("{}{slot}", self.base_url), opaque)
            }
        };

        TransferEndpoint {
            endpoint,
            token: "transfer-token".into(),
            resumable_token: None,
            available_checksums,
            opaque,
        }
    }
}

fn path_of(reference: &Reference) -> String {
    match reference {
        Reference::Path(p) => p.clone(),
        Reference::Id { opaque_id, .. } => opaque_id.clone(),
    }
}

fn is_under(path: &str, dir: &str) -> bool {
    path.strip_prefix(dir)
        .is_some_and(|rest| rest.starts_with('/'))
}

impl GatewayApi for FakeGateway {
    fn list_auth_providers<'a>(
        &'a self,
        _ctx: &'a CallContext,
    ) -> CallFuture<'a, ListAuthProvidersResponse> {
        Box::pin(async move {
            let status = self.begin("list_auth_providers").unwrap_or_else(Status::ok);
            Ok(ListAuthProvidersResponse {
                status,
                types: self.auth_methods.clone(),
            })
        })
    }

    fn authenticate<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: AuthenticateRequest,
    ) -> CallFuture<'a, AuthenticateResponse> {
        Box::pin(async move {
            let status = self.begin("authenticate").unwrap_or_else(Status::ok);
            if req.client_secret != "secret" {
                return Ok(AuthenticateResponse {
                    status: Status::new(Code::PermissionDenied, "bad credentials"),
                    token: String::new(),
                });
            }
            Ok(AuthenticateResponse {
                status,
                token: ACCESS_TOKEN.into(),
            })
        })
    }

    fn stat<'a>(&'a self, ctx: &'a CallContext, req: StatRequest) -> CallFuture<'a, StatResponse> {
        Box::pin(async move {
            if ctx.access_token() != Some(ACCESS_TOKEN) {
                return Err(CallError::Failed("missing access token".into()));
            }
            if let Some(status) = self.begin("stat") {
                return Ok(StatResponse { status, info: None });
            }
            let path = path_of(&req.reference);
            if self.fail_stat_path.lock().unwrap().as_deref() == Some(path.as_str()) {
                return Ok(StatResponse {
                    status: Status::new(Code::Internal, "stat unavailable"),
                    info: None,
                });
            }
            let info = self.storage.lock().unwrap().info(&path);
            let status = match info {
                Some(_) => Status::ok(),
                None => Status::new(Code::NotFound, format!("{path} not found")),
            };
            Ok(StatResponse { status, info })
        })
    }

    fn create_container<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: CreateContainerRequest,
    ) -> CallFuture<'a, CreateContainerResponse> {
        Box::pin(async move {
            if let Some(status) = self.begin("create_container") {
                return Ok(CreateContainerResponse { status });
            }
            let path = path_of(&req.reference);
            let mut storage = self.storage.lock().unwrap();
            let status = if storage.info(&path).is_some() {
                Status::new(Code::AlreadyExists, "exists")
            } else if storage.info(paths::parent(&path)).is_none() {
                Status::new(Code::FailedPrecondition, "parent missing")
            } else {
                storage.entries.insert(
                    path,
                    Entry {
                        resource_type: ResourceType::Container,
                        data: Vec::new(),
                    },
                );
                Status::ok()
            };
            Ok(CreateContainerResponse { status })
        })
    }

    fn delete<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: DeleteRequest,
    ) -> CallFuture<'a, DeleteResponse> {
        Box::pin(async move {
            if let Some(status) = self.begin("delete") {
                return Ok(DeleteResponse { status });
            }
            let path = path_of(&req.reference);
            let mut storage = self.storage.lock().unwrap();
            let status = if storage.entries.remove(&path).is_some() {
                storage.entries.retain(|p, _| !is_under(p, &path));
                Status::ok()
            } else {
                Status::new(Code::NotFound, "not found")
            };
            Ok(DeleteResponse { status })
        })
    }

    fn move_resource<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: MoveRequest,
    ) -> CallFuture<'a, MoveResponse> {
        Box::pin(async move {
            if let Some(status) = self.begin("move") {
                return Ok(MoveResponse { status });
            }
            let source = path_of(&req.source);
            let destination = path_of(&req.destination);
            let mut storage = self.storage.lock().unwrap();
            let moved: Vec<String> = storage
                .entries
                .keys()
                .filter(|p| **p == source || is_under(p, &source))
                .cloned()
                .collect();
            if moved.is_empty() {
                return Ok(MoveResponse {
                    status: Status::new(Code::NotFound, "not found"),
                });
            }
            for old in moved {
                if let Some(entry) = storage.entries.remove(&old) {
                    let new = format!("{destination}{}", &old[source.len()..]);
                    storage.entries.insert(new, entry);
                }
            }
            Ok(MoveResponse {
                status: Status::ok(),
            })
        })
    }

    fn list_container<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: ListContainerRequest,
    ) -> CallFuture<'a, ListContainerResponse> {
        Box::pin(async move {
            if let Some(status) = self.begin("list_container") {
                return Ok(ListContainerResponse {
                    status,
                    infos: Vec::new(),
                });
            }
            let path = path_of(&req.reference);
            let storage = self.storage.lock().unwrap();
            match storage.info(&path) {
                Some(info) if info.is_container() => {
                    let infos = storage
                        .entries
                        .keys()
                        .filter(|p| p.as_str() != path && paths::parent(p) == path)
                        .filter_map(|p| storage.info(p))
                        .collect();
                    Ok(ListContainerResponse {
                        status: Status::ok(),
                        infos,
                    })
                }
                _ => Ok(ListContainerResponse {
                    status: Status::new(Code::NotFound, "no such container"),
                    infos: Vec::new(),
                }),
            }
        })
    }

    fn initiate_file_upload<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: InitiateFileUploadRequest,
    ) -> CallFuture<'a, InitiateFileUploadResponse> {
        Box::pin(async move {
            let forced = self.begin("initiate_file_upload");
            if req.upload_length().is_none() {
                return Ok(InitiateFileUploadResponse {
                    status: Status::new(Code::InvalidArgument, "missing Upload-Length"),
                    endpoint: TransferEndpoint::default(),
                });
            }
            if let Some(status) = forced {
                return Ok(InitiateFileUploadResponse {
                    status,
                    endpoint: TransferEndpoint::default(),
                });
            }
            let target = path_of(&req.reference);
            Ok(InitiateFileUploadResponse {
                status: Status::ok(),
                endpoint: self.endpoint(&target, "upload"),
            })
        })
    }

    fn initiate_file_download<'a>(
        &'a self,
        _ctx: &'a CallContext,
        req: InitiateFileDownloadRequest,
    ) -> CallFuture<'a, InitiateFileDownloadResponse> {
        Box::pin(async move {
            if let Some(status) = self.begin("initiate_file_download") {
                return Ok(InitiateFileDownloadResponse {
                    status,
                    endpoint: TransferEndpoint::default(),
                });
            }
            let target = path_of(&req.reference);
            let exists = self
                .storage
                .lock()
                .unwrap()
                .info(&target)
                .is_some_and(|i| i.is_file());
            if !exists {
                return Ok(InitiateFileDownloadResponse {
                    status: Status::new(Code::NotFound, "no such file"),
                    endpoint: TransferEndpoint::default(),
                });
            }
            Ok(InitiateFileDownloadResponse {
                status: Status::ok(),
                endpoint: self.endpoint(&target, "download"),
            })
        })
    }
}

struct FakeConnector {
    gateway: Arc<FakeGateway>,
}

impl Connector for FakeConnector {
    fn connect<'a>(
        &'a self,
        _host: &'a str,
        _insecure: bool,
    ) -> CallFuture<'a, Arc<dyn GatewayApi>> {
        Box::pin(async move { Ok(self.gateway.clone() as Arc<dyn GatewayApi>) })
    }
}

// ---------------------------------------------------------------------------
// Data server
// ---------------------------------------------------------------------------

async fn data_plane(
    State(storage): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut storage = storage.lock().unwrap();
    let path = uri.path().to_string();
    storage.requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers: headers.clone(),
    });
    if storage.fail_data {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let header_u64 = |name: &str| -> Option<u64> { headers.get(name)?.to_str().ok()?.parse().ok() };

    if let Some(target) = path.strip_prefix("/dav") {
        if headers.get(ACCESS_TOKEN_HEADER).and_then(|v| v.to_str().ok()) != Some(DAV_TOKEN) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        return match method {
            Method::PUT => {
                storage.store_file(target, body.to_vec());
                StatusCode::CREATED.into_response()
            }
            Method::GET => match storage.entries.get(target) {
                Some(entry) => (StatusCode::OK, entry.data.clone()).into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            },
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        };
    }

    if method == Method::PATCH {
        let Some(upload) = storage.tus.get_mut(&path) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        if header_u64("Upload-Offset") != Some(upload.data.len() as u64) {
            return StatusCode::CONFLICT.into_response();
        }
        upload.data.extend_from_slice(&body);
        let offset = upload.data.len() as u64;
        if offset > upload.length {
            return StatusCode::BAD_REQUEST.into_response();
        }
        if offset == upload.length {
            let (target, data) = (upload.target.clone(), upload.data.clone());
            storage.store_file(&target, data);
        }
        return (StatusCode::NO_CONTENT, [("Upload-Offset", offset.to_string())]).into_response();
    }

    let Some(target) = storage.slots.get(&path).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match method {
        Method::PUT => {
            storage.store_file(&target, body.to_vec());
            StatusCode::CREATED.into_response()
        }
        Method::GET => match storage.entries.get(&target) {
            Some(entry) => (StatusCode::OK, entry.data.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        Method::POST => {
            let Some(length) = header_u64("Upload-Length") else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let location = format!("{path}/tus");
            if length == 0 {
                storage.store_file(&target, Vec::new());
            }
            storage.tus.insert(
                location.clone(),
                TusUpload {
                    target,
                    length,
                    data: Vec::new(),
                },
            );
            (StatusCode::CREATED, [("Location", location)]).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Test environment
// ---------------------------------------------------------------------------

pub struct TestEnv {
    pub gateway: Arc<FakeGateway>,
    storage: Shared,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::start_with_methods(&["basic"]).await
    }

    pub async fn start_with_methods(methods: &[&str]) -> Self {
        let storage: Shared = Arc::default();
        let app = Router::new()
            .fallback(data_plane)
            .with_state(storage.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let gateway = Arc::new(FakeGateway {
            storage: storage.clone(),
            base_url: format!("http://{addr}"),
            auth_methods: methods.iter().map(|m| m.to_string()).collect(),
            mode: Mutex::new(HintMode::Plain),
            checksums: Mutex::new(Vec::new()),
            forced: Mutex::new(HashMap::new()),
            fail_stat_path: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        });
        Self { gateway, storage }
    }

    /// A session that is initiated but not logged in.
    pub async fn initiated_session(&self, config: SessionConfig) -> Session {
        let connector = Arc::new(FakeConnector {
            gateway: self.gateway.clone(),
        });
        let mut session = Session::new(config, connector).unwrap();
        session.initiate("gateway.test:19000", true).await.unwrap();
        session
    }

    pub async fn session_with(&self, config: SessionConfig) -> Session {
        let mut session = self.initiated_session(config).await;
        session.basic_login("alice", "secret").await.unwrap();
        session
    }

    pub async fn session(&self) -> Session {
        self.session_with(SessionConfig::default()).await
    }

    pub fn put_file(&self, path: &str, data: &[u8]) {
        self.storage.lock().unwrap().store_file(path, data.to_vec());
    }

    pub fn put_dir(&self, path: &str) {
        self.storage.lock().unwrap().entries.insert(
            path.to_string(),
            Entry {
                resource_type: ResourceType::Container,
                data: Vec::new(),
            },
        );
    }

    pub fn put_entry(&self, path: &str, resource_type: ResourceType) {
        self.storage.lock().unwrap().entries.insert(
            path.to_string(),
            Entry {
                resource_type,
                data: Vec::new(),
            },
        );
    }

    pub fn entry(&self, path: &str) -> Option<Entry> {
        self.storage.lock().unwrap().entries.get(path).cloned()
    }

    pub fn data_requests(&self) -> Vec<RecordedRequest> {
        self.storage.lock().unwrap().requests.clone()
    }

    pub fn fail_data_plane(&self) {
        self.storage.lock().unwrap().fail_data = true;
    }
}
