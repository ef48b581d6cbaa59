use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use futures::future::try_join_all;

use crate::domain::pull_request::RawPullRequest;
use crate::error::AppResult;
use crate::services::SourceHost;

pub const DETAIL_CONCURRENCY: usize = 5;

/// Fetches full details for every number with at most `workers` requests in
/// flight. Each worker claims the next unclaimed index and writes into that
/// slot, so the output follows `numbers` regardless of completion order.
/// The first failure aborts the whole fetch.
pub async fn fetch_details(
    host: &dyn SourceHost,
    repo: &str,
    numbers: &[u64],
    workers: usize,
) -> AppResult<Vec<RawPullRequest>> {
    if numbers.is_empty() {
        return Ok(Vec::new());
    }

    let slots: Mutex<Vec<Option<RawPullRequest>>> = Mutex::new(vec![None; numbers.len()]);
    let next = AtomicUsize::new(0);

    let worker = || async {
        loop {
            let index = next.fetch_add(1, Ordering::SeqCst);
            let Some(&number) = numbers.get(index) else {
                return AppResult::Ok(());
            };
            let detail = host.pull_request(repo, number).await?;
            let mut guard = slots.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = guard.get_mut(index) {
                *slot = Some(detail);
            }
        }
    };

    let pool = workers.clamp(1, numbers.len());
    tracing::debug!(count = numbers.len(), workers = pool, "fetching pull request details");
    try_join_all((0..pool).map(|_| worker())).await?;

    Ok(slots
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        .flatten()
        .collect())
}
