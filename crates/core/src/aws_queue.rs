//! External FIFO Transport backed by Amazon SQS.
//!
//! Per-account ordering uses `MessageGroupId = account_id` for tasks and
//! `MessageGroupId = correlation_id` for results; message-level dedup uses
//! `MessageDeduplicationId = task_id` (or result id). Redelivery is governed
//! by the queue's visibility timeout; `nack` shortens it back down so the
//! message becomes visible again after `requeue_delay`.

use crate::queue::{ResultQueue, TaskDelivery, TaskQueue};
use crate::types::{ResultEnvelope, TaskEnvelope};
use crate::{Error, Result};
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use std::time::Duration;

pub struct SqsTaskQueue {
    client: Client,
    queue_url: String,
}

impl SqsTaskQueue {
    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl TaskQueue for SqsTaskQueue {
    async fn send(&self, account_id: &str, env: TaskEnvelope) -> Result<()> {
        let body = serde_json::to_string(&env).map_err(|e| Error::Other(e.into()))?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_group_id(account_id)
            .message_deduplication_id(&env.id)
            .message_body(body)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;
        Ok(())
    }

    async fn receive(&self, account_id: &str, timeout: Duration) -> Result<Option<TaskDelivery>> {
        let wait_secs = timeout.as_secs().min(20) as i32;
        let resp = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait_secs)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;

        let Some(msg) = resp.messages.unwrap_or_default().into_iter().next() else {
            return Ok(None);
        };
        let Some(body) = msg.body else {
            return Ok(None);
        };
        let Some(receipt) = msg.receipt_handle else {
            return Ok(None);
        };

        match serde_json::from_str::<TaskEnvelope>(&body) {
            Ok(envelope) if envelope.account_id == account_id => Ok(Some(TaskDelivery {
                envelope,
                ack_token: receipt,
            })),
            // Corrupt payload or wrong partition: ack (delete) to avoid a poison-pill cycle.
            _ => {
                self.ack(account_id, &receipt).await?;
                Ok(None)
            }
        }
    }

    async fn ack(&self, _account_id: &str, ack_token: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(ack_token)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;
        Ok(())
    }

    async fn nack(&self, _account_id: &str, ack_token: &str, requeue_delay: Duration) -> Result<()> {
        self.client
            .change_message_visibility()
            .queue_url(&self.queue_url)
            .receipt_handle(ack_token)
            .visibility_timeout(requeue_delay.as_secs() as i32)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;
        Ok(())
    }
}

pub struct SqsResultQueue {
    client: Client,
    queue_url: String,
}

impl SqsResultQueue {
    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl ResultQueue for SqsResultQueue {
    async fn send(&self, res: ResultEnvelope) -> Result<()> {
        let group = res.correlation_id.clone().unwrap_or_else(|| "none".to_string());
        let dedup = res
            .id
            .clone()
            .unwrap_or_else(|| format!("{}:{}", res.account_id, uuid::Uuid::new_v4()));
        let body = serde_json::to_string(&res).map_err(|e| Error::Other(e.into()))?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_group_id(group)
            .message_deduplication_id(dedup)
            .message_body(body)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;
        Ok(())
    }

    async fn try_recv(&self, account_id: &str) -> Result<Option<ResultEnvelope>> {
        let resp = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(0)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;

        let Some(msg) = resp.messages.unwrap_or_default().into_iter().next() else {
            return Ok(None);
        };
        let Some(body) = msg.body else {
            return Ok(None);
        };
        let Some(receipt) = msg.receipt_handle else {
            return Ok(None);
        };

        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(&receipt)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!(e.to_string())))?;

        match serde_json::from_str::<ResultEnvelope>(&body) {
            Ok(env) if env.account_id == account_id => Ok(Some(env)),
            Ok(_) => Ok(None),
            Err(_) => Ok(None),
        }
    }
}
