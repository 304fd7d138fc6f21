//! The reconciliation algorithm
//!
//! One pass per entity kind: reports run a push phase (deletions, creations,
//! updates, in that order) followed by an incremental pull; activities are a
//! read-only mirror and only pull. Every step keys off persistent local
//! state, so an aborted pass leaves nothing to undo — the next pass retries
//! exactly the rows still flagged.

use crate::db::{ActivityRepository, ReportRepository};
use crate::error::Result;
use crate::models::SyncState;
use crate::remote::wire::{self, ReportRow};
use crate::remote::{ActivityRemote, ReportRemote};

/// Rows requested per pull page
pub const PULL_PAGE_SIZE: usize = 10;

/// History bound (days) sent on the very first pull of an empty store
pub const FIRST_SYNC_MAX_AGE_DAYS: i64 = 90;

/// Counters from one report sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSyncSummary {
    /// Tombstones pushed to the server
    pub pushed_deletes: usize,
    /// Local-only rows created remotely
    pub pushed_creates: usize,
    /// Dirty rows updated remotely
    pub pushed_updates: usize,
    /// Remote rows applied locally (inserts and overwrites)
    pub pulled: usize,
    /// Local rows removed by remote tombstones
    pub removed: usize,
    /// Watermark after the pass
    pub watermark: i64,
}

/// Run one full report sync pass: push, then pull.
///
/// Aborts on the first failing step; local writes from completed steps stand
/// and are safe to leave applied.
pub fn sync_reports<S, R>(repo: &S, remote: &R) -> Result<ReportSyncSummary>
where
    S: ReportRepository,
    R: ReportRemote + ?Sized,
{
    let mut summary = ReportSyncSummary {
        pushed_deletes: push_deletions(repo, remote)?,
        ..ReportSyncSummary::default()
    };
    summary.pushed_creates = push_creations(repo, remote)?;
    summary.pushed_updates = push_updates(repo, remote)?;

    let (pulled, removed, watermark) = pull_reports(repo, remote)?;
    summary.pulled = pulled;
    summary.removed = removed;
    summary.watermark = watermark;

    tracing::debug!(
        "report sync pass done: {} deletes, {} creates, {} updates pushed; \
         {} pulled, {} removed, watermark {}",
        summary.pushed_deletes,
        summary.pushed_creates,
        summary.pushed_updates,
        summary.pulled,
        summary.removed,
        summary.watermark,
    );

    Ok(summary)
}

/// Push local tombstones to the server.
///
/// The local row keeps its `PendingDelete` state; the following pull phase
/// removes it through the regular tombstone path. That keeps at most one
/// deletion in flight per row and survives an interrupted pull.
fn push_deletions<S, R>(repo: &S, remote: &R) -> Result<usize>
where
    S: ReportRepository,
    R: ReportRemote + ?Sized,
{
    let mut pushed = 0;
    for report in repo.pending_deletes()? {
        let Some(server_id) = report.server_id else {
            continue;
        };
        tracing::debug!("pushing tombstone for report {server_id}");
        remote.update(server_id, &wire::report_to_wire(&report))?;
        pushed += 1;
    }
    Ok(pushed)
}

/// Push local-only rows as creations, persisting the assigned id per row.
fn push_creations<S, R>(repo: &S, remote: &R) -> Result<usize>
where
    S: ReportRepository,
    R: ReportRemote + ?Sized,
{
    let mut pushed = 0;
    for report in repo.unsent()? {
        let Some(local_id) = report.local_id else {
            continue;
        };
        tracing::debug!("pushing new report (local id {local_id})");
        let server_id = remote.create(&wire::report_to_wire(&report))?;
        repo.set_server_id(local_id, server_id)?;
        pushed += 1;
    }
    Ok(pushed)
}

/// Push dirty rows as updates, clearing the dirty state per row.
fn push_updates<S, R>(repo: &S, remote: &R) -> Result<usize>
where
    S: ReportRepository,
    R: ReportRemote + ?Sized,
{
    let mut pushed = 0;
    for report in repo.dirty()? {
        let (Some(local_id), Some(server_id)) = (report.local_id, report.server_id) else {
            continue;
        };
        tracing::debug!("pushing updated report {server_id}");
        remote.update(server_id, &wire::report_to_wire(&report))?;
        repo.set_state(local_id, SyncState::Clean)?;
        pushed += 1;
    }
    Ok(pushed)
}

/// Pull remote changes newer than the local watermark, in pages.
///
/// The watermark of the request window stays fixed for the whole pull;
/// paging advances by offset over rows ordered by remote primary key. The
/// persisted watermark advances after each fully processed page, so an abort
/// resumes from the last complete page.
fn pull_reports<S, R>(repo: &S, remote: &R) -> Result<(usize, usize, i64)>
where
    S: ReportRepository,
    R: ReportRemote + ?Sized,
{
    let watermark = repo.watermark()?;
    let max_age_days = (watermark == 0).then_some(FIRST_SYNC_MAX_AGE_DAYS);

    let mut committed = watermark;
    let mut seen_max = watermark;
    let mut offset = 0;
    let mut pulled = 0;
    let mut removed = 0;

    loop {
        let page = remote.fetch_changed(watermark, PULL_PAGE_SIZE, offset, max_age_days)?;
        let page_len = page.len();

        for row in &page {
            // Tombstones must advance the watermark too, or a deleted row
            // would be re-fetched forever.
            if row.seq > seen_max {
                seen_max = row.seq;
            }
            apply_remote_report(repo, row, &mut pulled, &mut removed)?;
        }

        if seen_max > committed {
            repo.set_watermark(seen_max)?;
            committed = seen_max;
        }

        if page_len < PULL_PAGE_SIZE {
            break;
        }
        offset += page_len;
    }

    Ok((pulled, removed, committed))
}

fn apply_remote_report<S: ReportRepository>(
    repo: &S,
    row: &ReportRow,
    pulled: &mut usize,
    removed: &mut usize,
) -> Result<()> {
    match repo.find_by_server_id(row.id)? {
        Some(local) => {
            if row.deleted {
                tracing::debug!("remote tombstone for report {}, removing locally", row.id);
                if let Some(local_id) = local.local_id {
                    repo.delete(local_id)?;
                    *removed += 1;
                }
            } else {
                // Remote wins: any dirty local copy was already pushed in
                // the push phase of this same pass.
                let mut incoming = wire::report_from_wire(row);
                incoming.local_id = local.local_id;
                repo.update(&incoming)?;
                *pulled += 1;
            }
        }
        None => {
            if !row.deleted {
                repo.insert(&wire::report_from_wire(row))?;
                *pulled += 1;
            }
        }
    }
    Ok(())
}

/// Refresh the local activity mirror from the server.
///
/// Full pull, no push: unknown rows are inserted, changed rows overwritten,
/// local rows never deleted. Returns the number of rows written.
pub fn sync_activities<S, R>(repo: &S, remote: &R) -> Result<usize>
where
    S: ActivityRepository,
    R: ActivityRemote + ?Sized,
{
    let rows = remote.fetch_all()?;
    let mut refreshed = 0;

    for row in &rows {
        match repo.get_by_server_id(row.id)? {
            Some(local) => {
                if local.mirror_differs(&row.name, &row.description, row.active) {
                    repo.update_mirrored(&wire::activity_from_wire(row))?;
                    refreshed += 1;
                }
            }
            None => {
                repo.insert_mirrored(&wire::activity_from_wire(row))?;
                refreshed += 1;
            }
        }
    }

    tracing::debug!("activity refresh done: {refreshed} of {} rows written", rows.len());
    Ok(refreshed)
}
