use std::sync::{Arc, Mutex};
use std::task::Poll;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::watch;

use crate::credentials::{CredentialStore, Credentials};
use crate::error::{NamecardError, RefreshFailure};
use crate::transport::{ApiRequest, ApiResponse, Transport};

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh-token";
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Path (or absolute URL) of the endpoint that trades a refresh token
    /// for a new access token.
    pub refresh_path: String,
    /// Upper bound on a single refresh call. Every request waiting on the
    /// refresh fails with [`NamecardError::RefreshFailed`] when it elapses.
    pub refresh_timeout: Duration,
    /// Prefix for the `Authorization` value, e.g. `Bearer`. `None` sends the
    /// bare token.
    pub auth_scheme: Option<String>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            auth_scheme: None,
        }
    }
}

type RefreshOutcome = Result<Credentials, RefreshFailure>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
struct RefreshState {
    next_epoch: u64,
    in_flight: Option<InFlightRefresh>,
}

struct InFlightRefresh {
    epoch: u64,
    outcome: SharedRefresh,
    replays: Arc<ReplayQueue>,
}

enum RefreshTicket {
    /// The token the request was sent with has already been replaced.
    Settled(Credentials),
    /// Wait for this refresh, which may have been started by another request,
    /// then replay when `turn` comes up.
    Pending {
        outcome: SharedRefresh,
        turn: ReplayTurn,
    },
}

/// Replay order for one refresh episode.
///
/// Requests that join a running refresh replay in the order they joined.
/// The request that started the refresh replays after all of them.
#[derive(Debug)]
struct ReplayQueue {
    released: watch::Sender<Vec<bool>>,
}

impl ReplayQueue {
    fn new() -> Arc<Self> {
        let (released, _) = watch::channel(Vec::new());
        Arc::new(Self { released })
    }

    fn starter(self: &Arc<Self>) -> ReplayTurn {
        ReplayTurn {
            queue: Arc::clone(self),
            position: None,
        }
    }

    fn join(self: &Arc<Self>) -> ReplayTurn {
        let mut position = 0;
        self.released.send_modify(|released| {
            position = released.len();
            released.push(false);
        });
        ReplayTurn {
            queue: Arc::clone(self),
            position: Some(position),
        }
    }

    fn len(&self) -> usize {
        self.released.borrow().len()
    }
}

/// A request's place in a [`ReplayQueue`]. Dropping it lets the next
/// request go, so a cancelled caller never stalls the queue.
#[derive(Debug)]
struct ReplayTurn {
    queue: Arc<ReplayQueue>,
    /// `None` for the request that started the refresh.
    position: Option<usize>,
}

impl ReplayTurn {
    /// Resolves once every request ahead of this one has been handed to
    /// the transport. Call only after the refresh has settled, when the
    /// queue can no longer grow.
    async fn wait(&self) {
        let mut turns = self.queue.released.subscribe();
        let position = self.position;
        // The sender lives in `self.queue`, so the channel cannot close.
        let _ = turns
            .wait_for(|released| {
                let ahead = position.unwrap_or(released.len());
                released[..ahead].iter().all(|done| *done)
            })
            .await;
    }
}

impl Drop for ReplayTurn {
    fn drop(&mut self) {
        if let Some(position) = self.position.take() {
            self.queue
                .released
                .send_modify(|released| released[position] = true);
        }
    }
}

/// Sends API requests with the session's access token and hides expired
/// tokens from callers.
///
/// A `401` answer starts a credential refresh, or joins the one already in
/// flight, and then replays the request once with the new token. However
/// many requests fail at the same time, a single refresh call is made for
/// the episode. A `403` is returned to the caller untouched.
pub struct AuthenticatedRequestCoordinator {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    options: Arc<CoordinatorOptions>,
    refresh: Arc<Mutex<RefreshState>>,
}

impl std::fmt::Debug for AuthenticatedRequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedRequestCoordinator")
            .field("options", &self.options)
            .field("refresh_in_flight", &self.refresh_in_flight())
            .field("queued_replays", &self.queued_replays())
            .finish_non_exhaustive()
    }
}

impl AuthenticatedRequestCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            transport,
            store,
            options: Arc::new(options),
            refresh: Arc::new(Mutex::new(RefreshState::default())),
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.lock_state().in_flight.is_some()
    }

    /// Send a request and return the response body of a successful answer.
    pub async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, NamecardError> {
        let sent_with = self.store.get();
        let response = self
            .dispatch(&request, sent_with.as_ref().map(|c| c.access.as_str()))
            .await?;
        if response.status != 401 {
            return settle(&request, response);
        }

        tracing::debug!(path = %request.path, "access token rejected, waiting for refresh");
        let (credentials, turn) = match self.refresh_ticket(sent_with.as_ref()) {
            RefreshTicket::Settled(credentials) => (credentials, None),
            RefreshTicket::Pending { outcome, turn } => {
                let credentials = outcome.await?;
                turn.wait().await;
                (credentials, Some(turn))
            }
        };

        let mut retry = std::pin::pin!(self.dispatch(&request, Some(&credentials.access)));
        // Once polled, the replay is with the transport and the next queued
        // request may go.
        let first_poll = futures::poll!(retry.as_mut());
        drop(turn);
        let retry = match first_poll {
            Poll::Ready(response) => response,
            Poll::Pending => retry.await,
        }?;
        settle(&request, retry)
    }

    /// Send a request that needs no session, such as login or a public
    /// card lookup. No token is attached and a `401` is returned as is.
    pub async fn send_unauthenticated(
        &self,
        request: ApiRequest,
    ) -> Result<serde_json::Value, NamecardError> {
        let response = self.dispatch(&request, None).await?;
        settle(&request, response)
    }

    /// [`send`](Self::send), then deserialize the body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, NamecardError> {
        let path = request.path.clone();
        let body = self.send(request).await?;
        serde_json::from_value(body).map_err(|e| {
            NamecardError::ProtocolError(format!("Unexpected response body from {path}: {e}"))
        })
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access: Option<&str>,
    ) -> Result<ApiResponse, NamecardError> {
        let mut outgoing = request.clone();
        match access {
            Some(token) => outgoing.set_header(AUTHORIZATION, self.authorization_value(token)),
            None => outgoing
                .headers
                .retain(|k, _| !k.eq_ignore_ascii_case(AUTHORIZATION)),
        }
        self.transport.execute(&outgoing).await
    }

    fn authorization_value(&self, token: &str) -> String {
        match self.options.auth_scheme.as_deref() {
            Some(scheme) if !scheme.is_empty() => format!("{scheme} {token}"),
            _ => token.to_string(),
        }
    }

    /// Decide how a request rejected with `401` gets its next token.
    ///
    /// Everything here runs under the state lock with no await point, so two
    /// rejected requests can never both see "no refresh in flight".
    fn refresh_ticket(&self, sent_with: Option<&Credentials>) -> RefreshTicket {
        let mut state = self.lock_state();

        let current = self.store.get();
        if let Some(ref current) = current {
            if sent_with.map(|c| c.access.as_str()) != Some(current.access.as_str()) {
                return RefreshTicket::Settled(current.clone());
            }
        }

        if let Some(ref in_flight) = state.in_flight {
            return RefreshTicket::Pending {
                outcome: in_flight.outcome.clone(),
                turn: in_flight.replays.join(),
            };
        }

        let epoch = state.next_epoch;
        state.next_epoch += 1;
        let outcome = self.start_refresh(epoch, current.map(|c| c.refresh));
        let replays = ReplayQueue::new();
        let turn = replays.starter();
        state.in_flight = Some(InFlightRefresh {
            epoch,
            outcome: outcome.clone(),
            replays,
        });
        tracing::debug!(epoch, "starting session refresh");
        RefreshTicket::Pending { outcome, turn }
    }

    /// Requests waiting on the in-flight refresh besides the one that
    /// started it.
    fn queued_replays(&self) -> usize {
        self.lock_state()
            .in_flight
            .as_ref()
            .map_or(0, |in_flight| in_flight.replays.len())
    }

    fn start_refresh(&self, epoch: u64, refresh_token: Option<String>) -> SharedRefresh {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let options = Arc::clone(&self.options);
        let state = Arc::clone(&self.refresh);

        async move {
            let outcome = match tokio::time::timeout(
                options.refresh_timeout,
                request_refresh(transport.as_ref(), refresh_token, &options),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(RefreshFailure::timed_out(options.refresh_timeout)),
            };

            match outcome {
                Ok(ref credentials) => {
                    store.set(credentials.clone());
                    tracing::debug!(epoch, "session refreshed");
                }
                Err(ref failure) => tracing::warn!(epoch, "Session refresh failed: {failure}"),
            }

            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.in_flight.as_ref().is_some_and(|f| f.epoch == epoch) {
                state.in_flight = None;
            }
            outcome
        }
        .boxed()
        .shared()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Map a final response onto the caller's result.
fn settle(request: &ApiRequest, response: ApiResponse) -> Result<serde_json::Value, NamecardError> {
    match response.status {
        s if (200..300).contains(&s) => Ok(response.body),
        401 => Err(NamecardError::Unauthorized {
            path: request.path.clone(),
        }),
        403 => Err(NamecardError::Forbidden {
            path: request.path.clone(),
            message: response.message(),
        }),
        status => Err(NamecardError::Http {
            status,
            path: request.path.clone(),
            message: response.message(),
        }),
    }
}

async fn request_refresh(
    transport: &dyn Transport,
    refresh_token: Option<String>,
    options: &CoordinatorOptions,
) -> RefreshOutcome {
    let refresh_token = refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(RefreshFailure::missing_refresh_token)?;

    let request = ApiRequest::post(&options.refresh_path)
        .header("Cookie", format!("refreshToken={refresh_token}"))
        .json(json!({ "refreshToken": refresh_token }));

    let response = transport
        .execute(&request)
        .await
        .map_err(|e| RefreshFailure::new(None, e.to_string()))?;

    if !response.is_success() {
        return Err(RefreshFailure::new(Some(response.status), response.message()));
    }

    let access = token_field(&response.body, "accessToken").ok_or_else(|| {
        RefreshFailure::new(
            Some(response.status),
            "refresh response did not include an access token",
        )
    })?;
    let refresh = token_field(&response.body, "refreshToken").unwrap_or(refresh_token);
    Ok(Credentials::new(access, refresh))
}

/// Tokens arrive either wrapped in a `data` envelope or at the top level.
fn token_field(body: &serde_json::Value, key: &str) -> Option<String> {
    body.get("data")
        .and_then(|data| data.get(key))
        .or_else(|| body.get(key))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
