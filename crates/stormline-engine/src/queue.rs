//! Priority queue with redundancy collapse.
//!
//! Alerts are scored once at admission and kept in descending priority
//! order, most recent first among equals. After every admission the
//! queue collapses entries that share a hazard type and district into a
//! single summary entry, so a review surface shows
//! "4 Flood alerts in Castries" instead of four rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{Alert, AlertType, District};
use crate::scoring;

/// One queue entry: an alert plus its admission metadata.
#[derive(Debug, Clone)]
struct QueueEntry {
    alert: Alert,
    priority: f64,
    enqueued_at: DateTime<Utc>,
    /// Admission order; breaks ties between identical timestamps
    seq: u64,
    /// How many original alerts this entry stands for
    merged: u64,
}

/// Ordered alert queue with per-(type, district) redundancy collapse.
///
/// Not synchronized; [`AlertHub`] wraps one behind a lock for shared
/// use.
///
/// [`AlertHub`]: crate::hub::AlertHub
#[derive(Debug, Default)]
pub struct AlertQueue {
    entries: Vec<QueueEntry>,
    next_seq: u64,
}

impl AlertQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an alert: score it, collapse redundancy, restore order.
    ///
    /// Alerts are assumed well-formed; field validation belongs to the
    /// parse boundary.
    pub fn enqueue(&mut self, alert: Alert) {
        let priority = scoring::priority(&alert);
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::debug!(alert_id = %alert.id, priority, "alert enqueued");
        self.entries.push(QueueEntry {
            alert,
            priority,
            enqueued_at: Utc::now(),
            seq,
            merged: 1,
        });
        self.collapse_redundant();
        self.sort_entries();
    }

    /// Remove and return the highest-priority alert.
    ///
    /// A summary entry comes back in its merged form, counted title
    /// included. `None` when the queue is empty.
    pub fn dequeue(&mut self) -> Option<Alert> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.remove(0).alert)
    }

    /// The highest-priority alert, without removing it
    pub fn peek(&self) -> Option<&Alert> {
        self.entries.first().map(|entry| &entry.alert)
    }

    /// Number of queue entries; a summary entry counts once
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered view of the queued alerts
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter().map(|entry| &entry.alert)
    }

    /// Ordered (alert, priority) view for display surfaces
    pub fn ranked(&self) -> impl Iterator<Item = (&Alert, f64)> {
        self.entries.iter().map(|entry| (&entry.alert, entry.priority))
    }

    /// Descending priority; most recent admission first among equals.
    fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            b.priority
                .total_cmp(&a.priority)
                .then_with(|| b.enqueued_at.cmp(&a.enqueued_at))
                .then_with(|| b.seq.cmp(&a.seq))
        });
    }

    /// Merge entries that share (hazard type, district) into summaries.
    fn collapse_redundant(&mut self) {
        if self.entries.len() < 2 {
            return;
        }
        let mut order: Vec<(AlertType, District)> = Vec::new();
        let mut groups: HashMap<(AlertType, District), Vec<QueueEntry>> = HashMap::new();
        for entry in self.entries.drain(..) {
            let key = (entry.alert.alert_type, entry.alert.district.clone());
            match groups.get_mut(&key) {
                Some(group) => group.push(entry),
                None => {
                    order.push(key.clone());
                    groups.insert(key, vec![entry]);
                }
            }
        }
        for key in order {
            if let Some(group) = groups.remove(&key) {
                self.entries.push(Self::merge_group(group));
            }
        }
    }

    /// Collapse one non-empty (type, district) group to a single entry.
    ///
    /// The summary carries the group's best priority, the most recent
    /// admission time, and the most recent member's remaining fields
    /// under a counted title. Counts accumulate across repeated merges.
    fn merge_group(mut group: Vec<QueueEntry>) -> QueueEntry {
        if group.len() == 1 {
            return group.remove(0);
        }
        let total: u64 = group.iter().map(|entry| entry.merged).sum();
        let best_priority = group
            .iter()
            .map(|entry| entry.priority)
            .fold(f64::NEG_INFINITY, f64::max);
        let latest = group
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.enqueued_at
                    .cmp(&b.enqueued_at)
                    .then_with(|| a.seq.cmp(&b.seq))
            })
            .map(|(index, _)| index)
            .unwrap_or(0);
        let mut summary = group.swap_remove(latest);
        summary.alert.title = format!(
            "{} {} alerts in {}",
            total, summary.alert.alert_type, summary.alert.district
        );
        summary.priority = best_priority;
        summary.merged = total;
        tracing::debug!(
            count = total,
            hazard = %summary.alert.alert_type,
            district = %summary.alert.district,
            "collapsed redundant alerts"
        );
        summary
    }
}
