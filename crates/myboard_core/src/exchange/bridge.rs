//! Request/response bridge to the budget sub-context.
//!
//! # Invariants
//! - `request_remote_state` registers one one-shot listener per call and
//!   removes it on settlement (response, timeout or failed post) or when
//!   the caller drops the request future.
//! - The fallback key is written with the complete payload in one write.

use super::message::ChannelMessage;
use super::port::{ChannelError, SubContextPort};
use crate::config::{BUDGET_FALLBACK_KEY, DEFAULT_EXCHANGE_TIMEOUT};
use crate::model::theme::ThemeMode;
use crate::repo::kv_repo::{KvRepository, RepoResult};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Where a budget snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    Channel,
    FallbackKey,
}

/// Settled result of [`BudgetBridge::request_remote_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteState {
    pub source: StateSource,
    /// `None` when the sub-context sent `null` or the fallback key is
    /// absent or unreadable.
    pub payload: Option<Value>,
}

/// Route taken by [`BudgetBridge::push_remote_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRoute {
    Channel,
    FallbackKey,
}

/// What [`BudgetBridge::dispatch_inbound`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundDisposition {
    /// Settled the pending request with this id.
    Resolved(Uuid),
    /// A state response nobody is waiting for (late or duplicate).
    Unclaimed,
    /// Import acknowledgement; informational only.
    Acknowledged,
    /// Not a message the core consumes.
    Ignored,
}

struct PendingRequest {
    request_id: Uuid,
    reply: oneshot::Sender<Value>,
}

pub struct BudgetBridge<R: KvRepository> {
    fallback: R,
    timeout: Duration,
    port: Option<Box<dyn SubContextPort>>,
    pending: Mutex<VecDeque<PendingRequest>>,
}

impl<R: KvRepository> BudgetBridge<R> {
    pub fn new(fallback: R) -> Self {
        Self::with_timeout(fallback, DEFAULT_EXCHANGE_TIMEOUT)
    }

    pub fn with_timeout(fallback: R, timeout: Duration) -> Self {
        Self {
            fallback,
            timeout,
            port: None,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attaches (or replaces) the sub-context port.
    pub fn attach(&mut self, port: Box<dyn SubContextPort>) {
        self.port = Some(port);
        info!("event=budget_attach module=exchange status=ok");
    }

    pub fn detach(&mut self) {
        self.port = None;
        info!("event=budget_detach module=exchange status=ok");
    }

    pub fn is_attached(&self) -> bool {
        self.attached_port().is_some()
    }

    /// Number of state requests still waiting for a response.
    pub fn pending_requests(&self) -> usize {
        lock_pending(&self.pending).len()
    }

    /// Fetches the sub-context's budget state.
    ///
    /// Posts `requestBudget` and waits up to the configured timeout for the
    /// matching `budgetDataResponse`. Without a response, or without an
    /// attached sub-context, the value under the fallback key is returned.
    /// Never fails: every failure path ends in the fallback.
    pub async fn request_remote_state(&self) -> RemoteState {
        if !self.is_attached() {
            debug!("event=budget_request module=exchange status=fallback reason=detached");
            return self.read_fallback();
        }

        let request_id = Uuid::new_v4();
        let (reply, reply_rx) = oneshot::channel();
        lock_pending(&self.pending).push_back(PendingRequest { request_id, reply });
        // Deregisters on every exit, including when the caller drops this future.
        let _listener = ListenerGuard {
            pending: &self.pending,
            request_id,
        };

        let request = ChannelMessage::RequestBudget {
            request_id: Some(request_id),
        };
        if let Err(err) = self.post(&request) {
            warn!("event=budget_request module=exchange status=fallback reason=post_failed request_id={request_id} error={err}");
            return self.read_fallback();
        }

        match tokio::time::timeout(self.timeout, reply_rx).await {
            Ok(Ok(payload)) => {
                info!("event=budget_request module=exchange status=ok source=channel request_id={request_id}");
                RemoteState {
                    source: StateSource::Channel,
                    payload: non_null(payload),
                }
            }
            Ok(Err(_)) | Err(_) => {
                info!(
                    "event=budget_request module=exchange status=fallback reason=timeout request_id={request_id} timeout_ms={}",
                    self.timeout.as_millis()
                );
                self.read_fallback()
            }
        }
    }

    /// Sends imported budget state to the sub-context without waiting for
    /// an acknowledgement. Falls back to writing the fallback key when no
    /// sub-context is attached or the post fails.
    pub fn push_remote_state(&self, payload: &Value) -> RepoResult<PushRoute> {
        let message = ChannelMessage::ImportBudget {
            payload: payload.clone(),
        };
        match self.post(&message) {
            Ok(()) => {
                info!("event=budget_push module=exchange status=ok route=channel");
                return Ok(PushRoute::Channel);
            }
            Err(ChannelError::Detached) => {}
            Err(err) => {
                warn!("event=budget_push module=exchange status=degraded route=fallback_key error={err}");
            }
        }

        self.fallback
            .put_value(BUDGET_FALLBACK_KEY, &payload.to_string())?;
        info!("event=budget_push module=exchange status=ok route=fallback_key");
        Ok(PushRoute::FallbackKey)
    }

    /// Tells the sub-context about a theme switch. Returns whether the
    /// message was handed to an attached sub-context.
    pub fn notify_theme_change(&self, mode: ThemeMode) -> bool {
        match self.post(&ChannelMessage::SetTheme { mode }) {
            Ok(()) => true,
            Err(ChannelError::Detached) => false,
            Err(err) => {
                debug!("event=theme_notify module=exchange status=dropped error={err}");
                false
            }
        }
    }

    /// Routes one inbound channel message.
    ///
    /// A response echoing a `requestId` settles only that request; one
    /// without it settles the oldest pending request. Settled listeners are
    /// removed before the payload is delivered.
    pub fn dispatch_inbound(&self, raw: &Value) -> InboundDisposition {
        match ChannelMessage::from_wire(raw) {
            Some(ChannelMessage::BudgetDataResponse {
                payload,
                request_id,
            }) => {
                let claimed = {
                    let mut pending = lock_pending(&self.pending);
                    match request_id {
                        Some(id) => pending
                            .iter()
                            .position(|entry| entry.request_id == id)
                            .and_then(|index| pending.remove(index)),
                        None => pending.pop_front(),
                    }
                };
                let Some(entry) = claimed else {
                    debug!("event=budget_response module=exchange status=unclaimed request_id={request_id:?}");
                    return InboundDisposition::Unclaimed;
                };
                if entry.reply.send(payload).is_err() {
                    debug!(
                        "event=budget_response module=exchange status=receiver_gone request_id={}",
                        entry.request_id
                    );
                }
                InboundDisposition::Resolved(entry.request_id)
            }
            Some(ChannelMessage::ImportBudgetAck) => {
                info!("event=budget_import_ack module=exchange status=ok");
                InboundDisposition::Acknowledged
            }
            _ => InboundDisposition::Ignored,
        }
    }

    fn attached_port(&self) -> Option<&dyn SubContextPort> {
        self.port.as_deref().filter(|port| port.is_attached())
    }

    fn post(&self, message: &ChannelMessage) -> Result<(), ChannelError> {
        self.attached_port()
            .ok_or(ChannelError::Detached)?
            .post(message.to_wire())
    }

    fn read_fallback(&self) -> RemoteState {
        let payload = match self.fallback.get_value(BUDGET_FALLBACK_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => non_null(value),
                Err(err) => {
                    warn!("event=budget_fallback_read module=exchange status=degraded reason=malformed error={err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("event=budget_fallback_read module=exchange status=degraded reason=read_failed error={err}");
                None
            }
        };
        RemoteState {
            source: StateSource::FallbackKey,
            payload,
        }
    }
}

struct ListenerGuard<'a> {
    pending: &'a Mutex<VecDeque<PendingRequest>>,
    request_id: Uuid,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        let request_id = self.request_id;
        lock_pending(self.pending).retain(|entry| entry.request_id != request_id);
    }
}

fn lock_pending(pending: &Mutex<VecDeque<PendingRequest>>) -> MutexGuard<'_, VecDeque<PendingRequest>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::BudgetBridge;
    use crate::db::open_db_in_memory;
    use crate::exchange::message::ChannelMessage;
    use crate::exchange::port::{ChannelError, ChannelPort};
    use crate::model::theme::ThemeMode;
    use crate::repo::kv_repo::SqliteKvRepository;

    #[test]
    fn post_without_port_reports_detached() {
        let conn = open_db_in_memory().unwrap();
        let mut bridge = BudgetBridge::new(SqliteKvRepository::new(&conn));
        let message = ChannelMessage::SetTheme {
            mode: ThemeMode::Dark,
        };

        assert_eq!(bridge.post(&message), Err(ChannelError::Detached));

        let (port, rx) = ChannelPort::new();
        bridge.attach(Box::new(port));
        drop(rx);
        assert_eq!(bridge.post(&message), Err(ChannelError::Detached));
    }
}
