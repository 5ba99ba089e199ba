// src/store/cache.rs

use std::{future::Future, time::Duration};

use moka::future::Cache;

use crate::{error::AppError, models::question::Topic};

const MAX_TOPICS: u64 = 1_000;

/// Time-bounded cache of topic documents. Every served question needs its topic.
#[derive(Debug, Clone)]
pub struct TopicCache {
    inner: Cache<i64, Topic>,
}

#[derive(Debug)]
enum TopicMiss {
    NotFound,
    Failed(String),
}

impl TopicCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_TOPICS)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the cached topic or loads it with `load`.
    ///
    /// Missing topics and load failures are not cached. Concurrent misses for the same
    /// id share a single load.
    pub async fn get_or_load<F>(&self, topic_id: i64, load: F) -> Result<Option<Topic>, AppError>
    where
        F: Future<Output = Result<Option<Topic>, AppError>>,
    {
        let result = self
            .inner
            .try_get_with(topic_id, async move {
                match load.await {
                    Ok(Some(topic)) => Ok(topic),
                    Ok(None) => Err(TopicMiss::NotFound),
                    Err(err) => Err(TopicMiss::Failed(err.to_string())),
                }
            })
            .await;

        match result {
            Ok(topic) => Ok(Some(topic)),
            Err(miss) => match miss.as_ref() {
                TopicMiss::NotFound => Ok(None),
                TopicMiss::Failed(msg) => Err(AppError::InternalServerError(msg.clone())),
            },
        }
    }

    pub async fn invalidate(&self, topic_id: i64) {
        self.inner.invalidate(&topic_id).await;
    }
}
