//! Per-turn strength comparison between our faction and its rivals.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ai::oracle::{NationSummary, StrengthAppraisal};
use crate::game::{NationId, NationKind};

#[derive(Debug, Default, Clone)]
pub struct NationIntelligence {
    own: Option<NationId>,
    summaries: BTreeMap<NationId, NationSummary>,
    kinds: BTreeMap<NationId, NationKind>,
}

impl NationIntelligence {
    /// Re-appraises ourselves and every rival.
    ///
    /// A rival whose report fails is skipped with a warning; the remaining
    /// entries are still refreshed.
    pub fn refresh(
        &mut self,
        own: NationId,
        rivals: &[(NationId, NationKind)],
        appraisal: &dyn StrengthAppraisal,
    ) {
        self.clear();
        self.own = Some(own);
        match appraisal.appraise(own) {
            Ok(summary) => {
                self.summaries.insert(own, summary);
            }
            Err(err) => warn!("{} cannot appraise itself: {}", own, err),
        }
        for &(rival, kind) in rivals {
            if rival == own {
                continue;
            }
            self.kinds.insert(rival, kind);
            match appraisal.appraise(rival) {
                Ok(summary) => {
                    self.summaries.insert(rival, summary);
                }
                Err(err) => warn!("{} skipped in intelligence refresh: {}", rival, err),
            }
        }
    }

    pub fn summary(&self, nation: NationId) -> Option<&NationSummary> {
        self.summaries.get(&nation)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Our share of the combined strength of us and `other`, in `[0, 1]`.
    ///
    /// `None` when either side is unknown or both are powerless.
    pub fn strength_ratio(&self, other: NationId) -> Option<f64> {
        let own = self.summary(self.own?)?.strength;
        let theirs = self.summary(other)?.strength;
        let total = own + theirs;
        (total > 0.0).then(|| own / total)
    }

    /// Our naval strength against the average rival navy, crown forces excluded.
    pub fn naval_strength_ratio(&self) -> Option<f64> {
        let own_id = self.own?;
        let own = self.summary(own_id)?.naval_strength;
        let rivals: Vec<f64> = self
            .summaries
            .iter()
            .filter(|(id, _)| {
                **id != own_id && self.kinds.get(*id).is_some_and(|k| *k != NationKind::Royal)
            })
            .map(|(_, summary)| summary.naval_strength)
            .collect();
        if rivals.is_empty() {
            return None;
        }
        let average = rivals.iter().sum::<f64>() / rivals.len() as f64;
        (average > 0.0).then(|| own / average)
    }

    pub fn clear(&mut self) {
        self.own = None;
        self.summaries.clear();
        self.kinds.clear();
    }
}
