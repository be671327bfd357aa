//! Fixed-size concurrent batches with a pause between them.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

/// Run `f` over `items` in batches of `size`.
///
/// Items within a batch run concurrently on the current task; batches run
/// one after another with `delay` between consecutive batches and none after
/// the last. Output order matches input order. A `size` of zero is treated
/// as one.
pub async fn run_in_batches<T, R, F, Fut>(
    items: Vec<T>,
    size: usize,
    delay: Duration,
    mut f: F,
) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let size = size.max(1);
    let total_batches = items.len().div_ceil(size);
    let mut results = Vec::with_capacity(items.len());
    let mut items = items.into_iter().peekable();
    let mut batch = 0;

    while items.peek().is_some() {
        if batch > 0 {
            tokio::time::sleep(delay).await;
        }
        batch += 1;

        let futures: Vec<Fut> = items.by_ref().take(size).map(&mut f).collect();
        debug!(batch, total_batches, size = futures.len(), "Running batch");
        results.extend(join_all(futures).await);
    }

    results
}
