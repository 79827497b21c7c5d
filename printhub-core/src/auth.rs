//! 登录校验、会话存储，以及供路由使用的会话提取器。

use crate::config::AuthConfig;
use crate::structs::{Role, Session};
use crate::traits::SessionStore;
use crate::web_server::SharedState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

pub const SESSION_COOKIE: &str = "printhub_session";

/// The only message shown for a failed login, whichever field was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// 检查用户名与密码；管理员凭据优先匹配
pub fn authenticate(config: &AuthConfig, username: &str, password: &str) -> Option<Role> {
    if config.admin.matches(username, password) {
        Some(Role::Admin)
    } else if config.client.matches(username, password) {
        Some(Role::Client)
    } else {
        None
    }
}

struct StoredSession {
    session: Session,
    expires_at: Instant,
}

/// 内存会话存储，令牌为随机 UUID
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        // 顺便清理过期会话
        sessions.retain(|_, stored| stored.expires_at > now);
        sessions.insert(
            token.clone(),
            StoredSession {
                session,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    async fn load(&self, token: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(stored) if stored.expires_at > Instant::now() => {
                    return Some(stored.session.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        tracing::debug!("Dropping expired session");
        self.sessions.write().await.remove(token);
        None
    }

    async fn destroy(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}

async fn session_from_parts(parts: &Parts, state: &SharedState) -> Option<Session> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    state
        .sessions
        .load(&token)
        .await
        .filter(|session| session.logged_in)
}

/// Session required by page routes; otherwise redirects to `/login`.
#[derive(Debug, Clone)]
pub struct PageSession(pub Session);

impl FromRequestParts<SharedState> for PageSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state)
            .await
            .map(PageSession)
            .ok_or_else(|| Redirect::to("/login").into_response())
    }
}

/// Session required by JSON routes; otherwise `401 {"error":"Unauthorized"}`.
#[derive(Debug, Clone)]
pub struct ApiSession(pub Session);

impl FromRequestParts<SharedState> for ApiSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state)
            .await
            .map(ApiSession)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "error": "Unauthorized" })),
                )
                    .into_response()
            })
    }
}

/// 管理员会话；未登录或非管理员都静默重定向到首页，不返回错误信息
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl FromRequestParts<SharedState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        match session_from_parts(parts, state).await {
            Some(session) if session.is_admin() => Ok(AdminSession(session)),
            Some(session) => {
                tracing::info!(role = session.role.as_str(), "Non-admin attempted an admin route");
                Err(Redirect::to("/").into_response())
            }
            None => Err(Redirect::to("/").into_response()),
        }
    }
}
