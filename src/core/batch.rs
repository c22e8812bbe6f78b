//! Apply one async operation to a batch of items.

use std::future::Future;

use futures::future;
use tracing::warn;

use crate::core::config::ConcurrencyMode;
use crate::core::diagnostics::describe_failure;
use crate::core::errors::Result;

/// Run `process` for every item.
///
/// Sequential mode awaits each item before starting the next and stops at the
/// first error. Concurrent mode starts every item, waits for all of them to
/// finish, then reports the first error in item order; later errors are only
/// logged. A batch of one item is processed directly.
pub async fn process_items<T, F, Fut>(items: Vec<T>, mode: ConcurrencyMode, process: F) -> Result<()>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if items.len() <= 1 {
        return match items.into_iter().next() {
            Some(item) => process(item).await,
            None => Ok(()),
        };
    }

    match mode {
        ConcurrencyMode::Sequential => {
            for item in items {
                process(item).await?;
            }
            Ok(())
        }
        ConcurrencyMode::Concurrent => {
            let results = future::join_all(items.into_iter().map(&process)).await;
            let mut errors = results.into_iter().filter_map(std::result::Result::err);
            match errors.next() {
                None => Ok(()),
                Some(first) => {
                    for other in errors {
                        warn!("{}", describe_failure("Additional batch failure", &other));
                    }
                    Err(first)
                }
            }
        }
    }
}
