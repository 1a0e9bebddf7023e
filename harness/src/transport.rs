//! Picks the Task Queue Transport backend: local in-process
//! FIFO by default, or SQS when both queue URLs are configured and the
//! binary was built with the `aws` feature.

use std::sync::Arc;

use scrapcore_core::{LocalQueue, ResultQueue, TaskQueue};

use crate::config::AppConfig;

pub struct Transports {
    pub tasks: Arc<dyn TaskQueue>,
    pub results: Arc<dyn ResultQueue>,
}

#[cfg(feature = "aws")]
async fn build_sqs(task_url: String, result_url: String) -> anyhow::Result<Transports> {
    let shared_config = aws_config::load_from_env().await;
    let client = aws_sdk_sqs::Client::new(&shared_config);
    Ok(Transports {
        tasks: Arc::new(scrapcore_core::aws_queue::SqsTaskQueue::new(client.clone(), task_url)),
        results: Arc::new(scrapcore_core::aws_queue::SqsResultQueue::new(client, result_url)),
    })
}

pub async fn build(cfg: &AppConfig) -> anyhow::Result<Transports> {
    #[cfg(feature = "aws")]
    if let (Some(task_url), Some(result_url)) = (&cfg.sqs_task_queue_url, &cfg.sqs_result_queue_url) {
        return build_sqs(task_url.clone(), result_url.clone()).await;
    }

    let local = Arc::new(LocalQueue::new(cfg.local_queue_capacity));
    for account in &cfg.accounts_usernames {
        local.register_account(account);
    }
    Ok(Transports { tasks: local.clone(), results: local })
}
