//! Replaying a channel's entries into a request.
//!
//! The log is public, append-only and writable by untrusted parties, so
//! every participant must be able to fold the same sorted entries and
//! reach the exact same request. The fold therefore never fails: entries
//! it cannot decode or attribute are skipped with a reason, attributed
//! actions that break the rules are skipped but audited as events, and
//! folding always continues.

use crate::domain::{apply_action, event_for, Request};
use crate::extensions::ExtensionRegistry;
use rl_01_transaction_codec::{recover_signer, transaction_digest};
use rl_03_channel_log::LogEnvelope;
use shared_types::{hash_to_hex, Hash, PersistedEntry};
use std::collections::HashSet;
use tracing::debug;

/// An entry the fold could not attribute to a signer or decode at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredEntry {
    pub id: Hash,
    pub reason: String,
}

/// Result of folding one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldOutcome {
    /// `None` when no valid CREATE was ever folded.
    pub request: Option<Request>,
    pub ignored: Vec<IgnoredEntry>,
}

/// Fold entries, already sorted ascending by `(timestamp, id)`, into a
/// request.
///
/// When `expected_request_id` is given, CREATE actions whose derived id
/// differs are rejected; this stops an entry persisted under a foreign
/// channel topic from initializing someone else's request.
pub fn fold_entries(
    entries: &[PersistedEntry],
    expected_request_id: Option<Hash>,
    registry: &ExtensionRegistry,
) -> FoldOutcome {
    let mut request: Option<Request> = None;
    let mut ignored = Vec::new();
    let mut seen_actions: HashSet<Hash> = HashSet::new();

    for entry in entries {
        let envelope = match LogEnvelope::parse(&entry.content) {
            Ok(envelope) => envelope,
            Err(error) => {
                ignored.push(IgnoredEntry {
                    id: entry.id,
                    reason: error.to_string(),
                });
                continue;
            }
        };
        let signed = envelope.transaction;

        let digest = match transaction_digest(&signed) {
            Ok(digest) => digest,
            Err(error) => {
                ignored.push(IgnoredEntry {
                    id: entry.id,
                    reason: error.to_string(),
                });
                continue;
            }
        };
        // Replay protection: the same signed transaction persisted twice
        // counts once. Signing is deterministic, so a replay carries the
        // exact same signature bytes.
        if !seen_actions.insert(digest) {
            ignored.push(IgnoredEntry {
                id: entry.id,
                reason: "duplicate action".into(),
            });
            continue;
        }

        let signer = match recover_signer(&signed) {
            Ok(signer) => signer,
            Err(error) => {
                ignored.push(IgnoredEntry {
                    id: entry.id,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        let event = event_for(&signed.data, &signer, entry.meta.timestamp);
        match apply_action(
            &request,
            &signed.data,
            &signer,
            entry.meta.timestamp,
            expected_request_id,
            registry,
        ) {
            Ok(mut updated) => {
                updated.events.push(event);
                request = Some(updated);
            }
            Err(error) => {
                debug!(
                    "[rl-04] entry {} rejected: {}",
                    hash_to_hex(&entry.id),
                    error
                );
                match &mut request {
                    // Attempted but rejected: still part of the audit
                    // trail.
                    Some(existing) => existing.events.push(event),
                    None => ignored.push(IgnoredEntry {
                        id: entry.id,
                        reason: error.to_string(),
                    }),
                }
            }
        }
    }

    FoldOutcome { request, ignored }
}
