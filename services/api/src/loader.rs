//! services/api/src/loader.rs
//!
//! Fetches judge statistics for a username and turns them into a `ProgressView`.
//!
//! Three rules apply to every fetch:
//! - only one gated fetch per username runs at a time; a duplicate gets `InFlight`;
//! - each fetch takes a sequence number when it starts, and a result is only committed
//!   if no fetch that started later has committed already (last request wins);
//! - a fetch whose `CancellationToken` fires is discarded and never committed.
//!
//! Committed results are kept for at most `capacity` usernames; the entry committed
//! longest ago is evicted first.

use coursehub_core::payload::JudgeProfile;
use coursehub_core::ports::{JudgeProfileService, PortError};
use coursehub_core::{normalize, normalize_judge, ProgressView};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Usernames whose latest result is kept when no capacity is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// A normalized view plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProgress {
    pub view: ProgressView,
    /// Name of the judge source that answered, `None` when nothing did.
    pub source: Option<String>,
    /// A non-blocking message for the user when remote data could not be used.
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The fetch finished and its result is now the latest for the username.
    Applied(LoadedProgress),
    /// A fetch that started later already committed; this carries that newer result.
    Stale(LoadedProgress),
    /// Another gated fetch for the same username is still running.
    InFlight,
    /// The caller went away before the fetch finished.
    Discarded,
}

struct Committed {
    sequence: u64,
    loaded: LoadedProgress,
}

pub struct ProgressLoader {
    primary: Arc<dyn JudgeProfileService>,
    fallback: Arc<dyn JudgeProfileService>,
    next_sequence: AtomicU64,
    in_flight: Mutex<HashSet<String>>,
    latest: Mutex<HashMap<String, Committed>>,
    capacity: usize,
}

/// Holds a username's in-flight slot (when gated) for the duration of one fetch.
struct Ticket<'a> {
    loader: &'a ProgressLoader,
    username: String,
    sequence: u64,
    gated: bool,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if self.gated {
            self.loader
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.username);
        }
    }
}

impl ProgressLoader {
    pub fn new(
        primary: Arc<dyn JudgeProfileService>,
        fallback: Arc<dyn JudgeProfileService>,
    ) -> Self {
        Self::with_capacity(primary, fallback, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(
        primary: Arc<dyn JudgeProfileService>,
        fallback: Arc<dyn JudgeProfileService>,
        capacity: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            next_sequence: AtomicU64::new(1),
            in_flight: Mutex::new(HashSet::new()),
            latest: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Loads progress for `username` unless a gated fetch for it is already running.
    pub async fn load(&self, username: &str, cancel: &CancellationToken) -> LoadOutcome {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_string());
        if !inserted {
            info!(username, "Judge fetch already in flight; skipping duplicate");
            return LoadOutcome::InFlight;
        }
        let ticket = self.ticket(username, true);
        self.run(ticket, cancel).await
    }

    /// Loads progress for `username` even if another fetch is running. Ordering between
    /// the two is settled by sequence number at commit time.
    pub async fn refresh(&self, username: &str, cancel: &CancellationToken) -> LoadOutcome {
        let ticket = self.ticket(username, false);
        self.run(ticket, cancel).await
    }

    /// The most recently committed result for `username`, if any.
    pub fn latest(&self, username: &str) -> Option<LoadedProgress> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .map(|c| c.loaded.clone())
    }

    pub fn is_in_flight(&self, username: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(username)
    }

    fn ticket(&self, username: &str, gated: bool) -> Ticket<'_> {
        Ticket {
            loader: self,
            username: username.to_string(),
            sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst),
            gated,
        }
    }

    async fn run(&self, ticket: Ticket<'_>, cancel: &CancellationToken) -> LoadOutcome {
        let fetched = tokio::select! {
            _ = cancel.cancelled() => None,
            fetched = self.fetch(&ticket.username) => Some(fetched),
        };
        let Some(loaded) = fetched.filter(|_| !cancel.is_cancelled()) else {
            info!(
                username = %ticket.username,
                sequence = ticket.sequence,
                "Judge fetch discarded after cancellation"
            );
            return LoadOutcome::Discarded;
        };
        self.commit(&ticket, loaded)
    }

    fn commit(&self, ticket: &Ticket<'_>, loaded: LoadedProgress) -> LoadOutcome {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = latest.get(&ticket.username) {
            if existing.sequence > ticket.sequence {
                info!(
                    username = %ticket.username,
                    sequence = ticket.sequence,
                    newer = existing.sequence,
                    "Dropping stale judge result"
                );
                return LoadOutcome::Stale(existing.loaded.clone());
            }
        }
        latest.insert(
            ticket.username.clone(),
            Committed {
                sequence: ticket.sequence,
                loaded: loaded.clone(),
            },
        );
        if latest.len() > self.capacity {
            let oldest = latest
                .iter()
                .filter(|(username, _)| **username != ticket.username)
                .min_by_key(|(_, committed)| committed.sequence)
                .map(|(username, _)| username.clone());
            if let Some(oldest) = oldest {
                debug!(username = %oldest, "Evicting oldest committed judge result");
                latest.remove(&oldest);
            }
        }
        LoadOutcome::Applied(loaded)
    }

    /// Tries the primary source, then the fallback. Failure of both is treated the same
    /// as an absent profile: the view is built from synthesized data plus a notice.
    async fn fetch(&self, username: &str) -> LoadedProgress {
        let mut last_error = None;
        for source in [&self.primary, &self.fallback] {
            match source.fetch_profile(username).await {
                Ok(profile) => {
                    info!(username, source = source.name(), "Judge profile fetched");
                    return Self::from_profile(Some(profile), Some(source.name().to_string()), None);
                }
                Err(e) => {
                    warn!(
                        username,
                        source = source.name(),
                        error = %e,
                        "Judge profile fetch failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        let notice = match last_error {
            Some(PortError::NotFound(_)) => format!(
                "No judge profile was found for '{}'. Showing sample data for now.",
                username
            ),
            _ => "Your judge statistics could not be loaded. Showing sample data for now."
                .to_string(),
        };
        Self::from_profile(None, None, Some(notice))
    }

    fn from_profile(
        profile: Option<JudgeProfile>,
        source: Option<String>,
        notice: Option<String>,
    ) -> LoadedProgress {
        LoadedProgress {
            view: profile.map_or_else(|| normalize(None), normalize_judge),
            source,
            notice,
        }
    }
}
