// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Region Resolver.
//!
//! Picks the active region at startup from medium content alone. The
//! normal cases only look at slot 0 of each region: a retired region is
//! always erased in full before its partner takes over. Both regions being
//! non-erased means a compaction was interrupted between writing the
//! snapshot and erasing the old log; that case surveys both regions and
//! reports the losing one as stale, even when content could not decide.
//! The medium is never written here.

use crate::config::Layout;
use crate::region::{is_first_slot_erased, survey_region, RegionSurvey};
use crate::storage::Medium;
use crate::types::RegionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveOutcome {
    /// Both regions erased.
    Fresh,
    /// Exactly one region holds data.
    Clean,
    /// Both regions held data; content identified the interrupted compaction.
    Recovered,
    /// Both regions held data and content could not tell them apart.
    Ambiguous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub active: RegionId,
    /// Region that lost the resolution. It must be erased before the active
    /// region takes another write.
    pub stale: Option<RegionId>,
    pub outcome: ResolveOutcome,
}

impl Resolution {
    fn new(active: RegionId, stale: Option<RegionId>, outcome: ResolveOutcome) -> Self {
        Self { active, stale, outcome }
    }
}

pub fn resolve_active_region<M: Medium + ?Sized>(medium: &M, param_count: usize, layout: Layout) -> Resolution {
    let a_erased = is_first_slot_erased(medium, RegionId::A);
    let b_erased = is_first_slot_erased(medium, RegionId::B);

    match (a_erased, b_erased) {
        (true, false) => Resolution::new(RegionId::B, None, ResolveOutcome::Clean),
        (false, true) => Resolution::new(RegionId::A, None, ResolveOutcome::Clean),
        (true, true) => Resolution::new(RegionId::A, None, ResolveOutcome::Fresh),
        (false, false) => {
            let a = survey_region(medium, RegionId::A, param_count, layout);
            let b = survey_region(medium, RegionId::B, param_count, layout);
            let resolution = match layout {
                Layout::Plain => resolve_plain(&a, &b),
                Layout::Generational => resolve_generational(&a, &b),
            };
            tracing::warn!(
                active = %resolution.active,
                outcome = ?resolution.outcome,
                "both regions hold data, compaction was interrupted"
            );
            resolution
        }
    }
}

/// Without markers: a compaction target is either a complete snapshot
/// that still has room, or a partial one sitting next to a full log.
fn resolve_plain(a: &RegionSurvey, b: &RegionSurvey) -> Resolution {
    let completed_target = |s: &RegionSurvey| s.snapshot_complete && !s.is_full();

    let winner = if completed_target(a) && b.is_full() {
        Some(a.region)
    } else if completed_target(b) && a.is_full() {
        Some(b.region)
    } else if a.is_full() && !b.is_full() {
        Some(a.region)
    } else if b.is_full() && !a.is_full() {
        Some(b.region)
    } else {
        None
    };

    settle(winner)
}

/// With markers: the highest committed generation wins. A region without a
/// marker is the pre-compaction log of a fresh device (generation 0), unless
/// it holds no valid record at all (a marker torn mid-write). A marked
/// region only counts once its snapshot is complete.
fn resolve_generational(a: &RegionSurvey, b: &RegionSurvey) -> Resolution {
    let committed = |s: &RegionSurvey| match s.generation {
        Some(generation) => s.snapshot_complete.then_some(generation),
        None => (s.valid > 0).then_some(0),
    };

    let winner = match (committed(a), committed(b)) {
        (Some(ga), Some(gb)) if ga > gb => Some(RegionId::A),
        (Some(ga), Some(gb)) if gb > ga => Some(RegionId::B),
        (Some(_), None) => Some(RegionId::A),
        (None, Some(_)) => Some(RegionId::B),
        _ => None,
    };

    settle(winner)
}

/// An undecidable pair still names B as stale: once A has been picked, B
/// must never be replayed again, or saves made on top of A would be lost.
fn settle(winner: Option<RegionId>) -> Resolution {
    match winner {
        Some(active) => Resolution::new(active, Some(active.other()), ResolveOutcome::Recovered),
        None => Resolution::new(RegionId::A, Some(RegionId::B), ResolveOutcome::Ambiguous),
    }
}
