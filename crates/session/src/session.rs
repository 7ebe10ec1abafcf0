//! Session lifecycle: initiate, login, then hand out call contexts.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use storegate_protocol::constants::{ACCESS_TOKEN_HEADER, BASIC_LOGIN_METHOD};
use storegate_protocol::messages::AuthenticateRequest;
use storegate_protocol::{CallContext, GatewayApi};
use storegate_transfer::TransferContext;

use crate::config::SessionConfig;
use crate::connector::Connector;
use crate::error::SessionError;
use crate::status::check_rpc_status;

/// An authenticated connection to the storage gateway.
///
/// Valid once [`Session::initiate`] and a login have both succeeded. Login
/// mutates the token and context, so it must complete before other calls
/// are issued on the same session.
pub struct Session {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    http: reqwest::Client,
    cancel: CancellationToken,
    client: Option<Arc<dyn GatewayApi>>,
    ctx: Option<CallContext>,
    token: String,
}

impl Session {
    /// Builds an unconnected session and its data-plane HTTP client.
    pub fn new(config: SessionConfig, connector: Arc<dyn Connector>) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.transfer_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            config,
            connector,
            http,
            cancel: CancellationToken::new(),
            client: None,
            ctx: None,
            token: String::new(),
        })
    }

    /// Uses `cancel` for every call made through this session.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Dials the control plane. Any previous login is discarded.
    pub async fn initiate(&mut self, host: &str, insecure: bool) -> Result<(), SessionError> {
        if host.trim().is_empty() {
            return Err(SessionError::Connection("no host specified".into()));
        }
        if insecure {
            warn!(%host, "using an insecure control-plane channel");
        }

        let client = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(SessionError::Connection("cancelled while connecting".into()));
            }
            result = self.connector.connect(host, insecure) => result.map_err(|e| {
                SessionError::Connection(format!("unable to connect to {host}: {e}"))
            })?,
        };

        self.client = Some(client);
        self.ctx = Some(CallContext::new(self.cancel.clone()));
        self.token.clear();
        info!(%host, insecure, "gateway channel established");
        Ok(())
    }

    /// Channel and context of an initiated session, authenticated or not.
    fn channel(&self) -> Result<(&dyn GatewayApi, &CallContext), SessionError> {
        match (&self.client, &self.ctx) {
            (Some(client), Some(ctx)) => Ok((client.as_ref(), ctx)),
            _ => Err(SessionError::Auth("session has not been initiated".into())),
        }
    }

    /// Lists the login methods the gateway accepts.
    pub async fn login_methods(&self) -> Result<Vec<String>, SessionError> {
        let (client, ctx) = self.channel()?;
        let resp = ctx.run(client.list_auth_providers(ctx)).await?;
        check_rpc_status("listing auth providers", &resp.status)?;
        Ok(resp.types)
    }

    /// Authenticates and attaches the returned token to every later call.
    pub async fn login(
        &mut self,
        method: &str,
        username: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let (client, ctx) = self.channel()?;
        let req = AuthenticateRequest {
            method: method.to_string(),
            client_id: username.to_string(),
            client_secret: password.to_string(),
        };
        let resp = ctx.run(client.authenticate(ctx, req)).await?;
        check_rpc_status("authenticating", &resp.status)?;

        if resp.token.is_empty() {
            return Err(SessionError::Auth(format!(
                "gateway returned an empty token for {method} login"
            )));
        }

        let ctx = ctx.with_metadata(ACCESS_TOKEN_HEADER, resp.token.as_str());
        self.ctx = Some(ctx);
        self.token = resp.token;
        info!(%method, user = %username, "logged in");
        Ok(())
    }

    /// Logs in with username and password, if the gateway offers `basic`.
    pub async fn basic_login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let methods = self.login_methods().await?;
        if !methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(BASIC_LOGIN_METHOD))
        {
            debug!(offered = ?methods, "basic login not offered");
            return Err(SessionError::Auth(format!(
                "unsupported login method: {BASIC_LOGIN_METHOD}"
            )));
        }
        self.login(BASIC_LOGIN_METHOD, username, password).await
    }

    /// `true` once the session has a channel, a context and a token.
    pub fn is_valid(&self) -> bool {
        self.client.is_some() && self.ctx.is_some() && !self.token.is_empty()
    }

    /// Access token; empty until logged in.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn context(&self) -> Option<&CallContext> {
        self.ctx.as_ref()
    }

    /// Gateway client and call context of a valid session.
    pub fn gateway(&self) -> Result<(&dyn GatewayApi, &CallContext), SessionError> {
        if !self.is_valid() {
            return Err(SessionError::Auth("session is not logged in".into()));
        }
        self.channel()
    }

    /// `GET` on a data-plane endpoint with both token headers set.
    pub fn new_read_request(
        &self,
        endpoint: &str,
        transport_token: &str,
    ) -> Result<reqwest::RequestBuilder, SessionError> {
        self.authorize(self.http.get(endpoint), transport_token)
    }

    /// `PUT` on a data-plane endpoint with both token headers set.
    pub fn new_write_request(
        &self,
        endpoint: &str,
        transport_token: &str,
    ) -> Result<reqwest::RequestBuilder, SessionError> {
        self.authorize(self.http.put(endpoint), transport_token)
    }

    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        transport_token: &str,
    ) -> Result<reqwest::RequestBuilder, SessionError> {
        if !self.is_valid() {
            return Err(SessionError::Auth("session is not logged in".into()));
        }
        Ok(self.transfer_context().authorize(request, transport_token))
    }

    /// Data-plane context carrying this session's client, token and cancellation.
    pub fn transfer_context(&self) -> TransferContext {
        TransferContext::new(self.http.clone(), self.token.as_str())
            .with_cancellation(self.cancel.clone())
            .with_chunk_size(self.config.chunk_size)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("initiated", &self.client.is_some())
            .field("logged_in", &!self.token.is_empty())
            .finish()
    }
}
