use futures::stream::{self, StreamExt};
use shared::{
    domain::{AgendaItem, ItemId},
    protocol::ItemDraft,
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    error::{ClientError, Result},
    store::ResourceStore,
};

pub const DEFAULT_IMPORT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportProgress {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ImportProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Position of the draft in the input.
    pub index: usize,
    pub title: String,
    /// Created item id, or the failure detail.
    pub result: std::result::Result<ItemId, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn created_ids(&self) -> Vec<ItemId> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().copied())
            .collect()
    }
}

/// Creates agenda items from drafts with bounded concurrency. Items created
/// before a failure are kept.
pub struct BulkImporter<'a> {
    items: &'a ResourceStore<AgendaItem>,
    concurrency: usize,
    progress: watch::Sender<ImportProgress>,
}

impl<'a> BulkImporter<'a> {
    pub fn new(items: &'a ResourceStore<AgendaItem>) -> Self {
        let (progress, _) = watch::channel(ImportProgress::default());
        Self {
            items,
            concurrency: DEFAULT_IMPORT_CONCURRENCY,
            progress,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn progress(&self) -> watch::Receiver<ImportProgress> {
        self.progress.subscribe()
    }

    /// Runs the import. Outcomes are reported in input order.
    pub async fn run(&self, drafts: Vec<ItemDraft>) -> ImportReport {
        self.progress.send_replace(ImportProgress {
            total: drafts.len(),
            ..ImportProgress::default()
        });

        let outcomes: Vec<ImportOutcome> = stream::iter(drafts.into_iter().enumerate())
            .map(|(index, draft)| async move {
                let result = self.create_one(&draft).await;
                self.progress.send_modify(|progress| {
                    progress.completed += 1;
                    if result.is_ok() {
                        progress.succeeded += 1;
                    } else {
                        progress.failed += 1;
                    }
                });
                if let Err(err) = &result {
                    warn!(index, title = %draft.title, %err, "agenda import item failed");
                }
                ImportOutcome {
                    index,
                    title: draft.title,
                    result: result.map_err(|err| err.detail()),
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = ImportReport { outcomes };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "agenda import finished"
        );
        report
    }

    async fn create_one(&self, draft: &ItemDraft) -> Result<ItemId> {
        if draft.title.trim().is_empty() {
            return Err(ClientError::Validation("title must not be empty".into()));
        }
        let item = self.items.create(draft).await?;
        Ok(item.id)
    }
}
