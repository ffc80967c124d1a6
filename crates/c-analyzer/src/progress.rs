//! Work-done progress over `$/progress`.
//!
//! A [`ProgressToken`] sends `Begin`, any number of `Report`s and one `End`.
//! Dropping it without `end` still closes the indicator.

use std::{
    panic::AssertUnwindSafe,
    sync::atomic::{AtomicU64, Ordering},
};

use futures::FutureExt;
use tower_lsp::{Client, lsp_types::*};
use tracing::{debug, warn};

static NEXT_PROGRESS_ID: AtomicU64 = AtomicU64::new(1);
const PROGRESS_TITLE_PREFIX: &str = "c-analyzer:";

pub struct ProgressToken {
    client: Option<Client>,
    token: Option<NumberOrString>,
    last_percentage: Option<u32>,
}

impl ProgressToken {
    pub async fn begin(
        client: &Client,
        title: &str,
        message: Option<String>,
    ) -> Self {
        let id = NEXT_PROGRESS_ID.fetch_add(1, Ordering::Relaxed);
        let token = NumberOrString::String(format!("cAnalyzer/{}/{id}", title.trim()));
        let display_title = prefixed_progress_title(title);

        // The create request runs detached; its response must still be awaited
        // by someone or tower-lsp drops the pending entry.
        let create_client = client.clone();
        let create_token = token.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(create_client.send_request::<request::WorkDoneProgressCreate>(
                WorkDoneProgressCreateParams {
                    token: create_token,
                },
            ))
            .catch_unwind()
            .await;
            match result {
                Ok(Ok(())) => {},
                Ok(Err(error)) => debug!("workDoneProgress/create rejected: {error}"),
                Err(_) => warn!("workDoneProgress/create panicked (client may have disconnected)"),
            }
        });

        let sent = AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
            token: token.clone(),
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: display_title.clone(),
                cancellable: Some(false),
                message,
                percentage: Some(0),
            })),
        }))
        .catch_unwind()
        .await;

        if sent.is_err() {
            warn!("progress begin notification panicked (client may have disconnected)");
            return Self {
                client: None,
                token: None,
                last_percentage: None,
            };
        }
        debug!("progress begin: {display_title}");

        Self {
            client: Some(client.clone()),
            token: Some(token),
            last_percentage: Some(0),
        }
    }

    /// Report `done` of `total` files. Repeated percentages are not resent.
    pub async fn report_files(
        &mut self,
        done: usize,
        total: usize,
    ) {
        let percentage = percentage_of(done, total);
        if self.last_percentage == Some(percentage) {
            return;
        }
        self.last_percentage = Some(percentage);
        self.report(Some(format!("{done}/{total} files")), Some(percentage)).await;
    }

    pub async fn report(
        &self,
        message: Option<String>,
        percentage: Option<u32>,
    ) {
        let (Some(client), Some(token)) = (&self.client, &self.token) else {
            return;
        };
        let _ = AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
            token: token.clone(),
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::Report(WorkDoneProgressReport {
                cancellable: Some(false),
                message,
                percentage: percentage.map(|p| p.min(100)),
            })),
        }))
        .catch_unwind()
        .await;
    }

    pub async fn end(
        mut self,
        message: Option<String>,
    ) {
        let (Some(client), Some(token)) = (self.client.take(), self.token.take()) else {
            return;
        };
        debug!("progress end: {token:?}");
        let _ = AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
            token,
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                message,
            })),
        }))
        .catch_unwind()
        .await;
    }
}

impl Drop for ProgressToken {
    fn drop(&mut self) {
        if let (Some(client), Some(token)) = (self.client.take(), self.token.take()) {
            debug!("progress dropped: {token:?}");
            tokio::spawn(async move {
                let _ = AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
                    token,
                    value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                        message: Some("Cancelled".to_string()),
                    })),
                }))
                .catch_unwind()
                .await;
            });
        }
    }
}

fn prefixed_progress_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.starts_with(PROGRESS_TITLE_PREFIX) {
        return trimmed.to_owned();
    }
    format!("{PROGRESS_TITLE_PREFIX} {trimmed}")
}

fn percentage_of(
    done: usize,
    total: usize,
) -> u32 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u32
}

#[cfg(test)]
#[path = "../tests/src/progress_tests.rs"]
mod tests;
