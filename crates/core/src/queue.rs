//! Task Queue Transport.
//!
//! Two ports — `TaskQueue` (Dispatcher/Router → Worker) and `ResultQueue`
//! (Worker → Dispatcher/Router) — each implemented either by an in-process
//! local FIFO or, behind the `aws` feature, by SQS FIFO queues partitioned
//! by account/correlation id.

use crate::types::{ResultEnvelope, TaskEnvelope};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout as tokio_timeout;

/// Delivery handle returned by `TaskQueue::receive`. `ack_token` is opaque to
/// the caller and only meaningful to the issuing queue implementation.
#[derive(Debug, Clone)]
pub struct TaskDelivery {
    pub envelope: TaskEnvelope,
    pub ack_token: String,
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn send(&self, account_id: &str, env: TaskEnvelope) -> Result<()>;
    async fn receive(&self, account_id: &str, timeout: Duration) -> Result<Option<TaskDelivery>>;
    async fn ack(&self, account_id: &str, ack_token: &str) -> Result<()>;
    async fn nack(&self, account_id: &str, ack_token: &str, requeue_delay: Duration) -> Result<()>;
}

#[async_trait]
pub trait ResultQueue: Send + Sync {
    async fn send(&self, res: ResultEnvelope) -> Result<()>;
    async fn try_recv(&self, account_id: &str) -> Result<Option<ResultEnvelope>>;
}

/// In-process bounded FIFO per account.
///
/// `ack`/`nack` are no-ops: once `receive` hands a message out, local
/// delivery is already guaranteed-once by the channel dequeue.
pub struct LocalQueue {
    tasks: Mutex<HashMap<String, (mpsc::Sender<TaskEnvelope>, mpsc::Receiver<TaskEnvelope>)>>,
    results: Mutex<HashMap<String, (mpsc::Sender<ResultEnvelope>, mpsc::Receiver<ResultEnvelope>)>>,
    capacity: usize,
}

impl LocalQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            results: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn register_account(&self, account_id: &str) {
        self.tasks
            .lock()
            .unwrap()
            .entry(account_id.to_string())
            .or_insert_with(|| mpsc::channel(self.capacity));
        self.results
            .lock()
            .unwrap()
            .entry(account_id.to_string())
            .or_insert_with(|| mpsc::channel(self.capacity));
    }
}

#[async_trait]
impl TaskQueue for LocalQueue {
    async fn send(&self, account_id: &str, env: TaskEnvelope) -> Result<()> {
        self.register_account(account_id);
        let sender = {
            let guard = self.tasks.lock().unwrap();
            guard.get(account_id).map(|(tx, _)| tx.clone())
        };
        let sender = sender.ok_or_else(|| Error::not_found(format!("unknown account {account_id}")))?;
        sender
            .send(env)
            .await
            .map_err(|_| Error::msg("local task queue closed"))
    }

    async fn receive(&self, account_id: &str, timeout: Duration) -> Result<Option<TaskDelivery>> {
        self.register_account(account_id);
        // The receiver half cannot be cloned; briefly lock, take it out, poll,
        // and put it back so concurrent callers on other accounts keep running.
        let mut rx = {
            let mut guard = self.tasks.lock().unwrap();
            let (_, rx) = guard.get_mut(account_id).expect("registered above");
            std::mem::replace(rx, mpsc::channel(1).1)
        };
        let received = tokio_timeout(timeout, rx.recv()).await;
        {
            let mut guard = self.tasks.lock().unwrap();
            if let Some((_, slot)) = guard.get_mut(account_id) {
                *slot = rx;
            }
        }
        match received {
            Ok(Some(env)) => Ok(Some(TaskDelivery {
                ack_token: env.id.clone(),
                envelope: env,
            })),
            Ok(None) => Ok(None),
            Err(_) => Ok(None),
        }
    }

    async fn ack(&self, _account_id: &str, _ack_token: &str) -> Result<()> {
        Ok(())
    }

    async fn nack(&self, _account_id: &str, _ack_token: &str, _requeue_delay: Duration) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ResultQueue for LocalQueue {
    async fn send(&self, res: ResultEnvelope) -> Result<()> {
        self.register_account(&res.account_id);
        let sender = {
            let guard = self.results.lock().unwrap();
            guard.get(&res.account_id).map(|(tx, _)| tx.clone())
        };
        let sender =
            sender.ok_or_else(|| Error::not_found(format!("unknown account {}", res.account_id)))?;
        sender
            .send(res)
            .await
            .map_err(|_| Error::msg("local result queue closed"))
    }

    async fn try_recv(&self, account_id: &str) -> Result<Option<ResultEnvelope>> {
        self.register_account(account_id);
        let mut guard = self.results.lock().unwrap();
        let (_, rx) = guard.get_mut(account_id).expect("registered above");
        match rx.try_recv() {
            Ok(env) => Ok(Some(env)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobKind;
    use serde_json::json;

    #[tokio::test]
    async fn task_round_trips_through_send_and_receive() {
        let queue = LocalQueue::new(4);
        let env = TaskEnvelope {
            id: "t1".into(),
            task: JobKind::AnalyzeProfile,
            correlation_id: "j1".into(),
            account_id: "acct-1".into(),
            payload: json!({"username": "alice"}),
        };
        TaskQueue::send(&queue, "acct-1", env.clone()).await.unwrap();

        let delivery = queue
            .receive("acct-1", Duration::from_millis(200))
            .await
            .unwrap()
            .expect("message delivered within timeout");
        assert_eq!(delivery.envelope.id, env.id);
        assert_eq!(delivery.ack_token, env.id);
    }

    #[tokio::test]
    async fn receive_times_out_when_nothing_queued() {
        let queue = LocalQueue::new(4);
        let delivery = queue.receive("acct-1", Duration::from_millis(20)).await.unwrap();
        assert!(delivery.is_none());
    }

    #[tokio::test]
    async fn result_try_recv_is_empty_until_a_result_is_sent() {
        let queue = LocalQueue::new(4);
        assert!(queue.try_recv("acct-1").await.unwrap().is_none());

        ResultQueue::send(&queue, ResultEnvelope::heartbeat("acct-1")).await.unwrap();
        let res = queue.try_recv("acct-1").await.unwrap().expect("heartbeat delivered");
        assert!(res.is_heartbeat());
        assert!(queue.try_recv("acct-1").await.unwrap().is_none());
    }
}
