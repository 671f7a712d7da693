//! Quest book - per-quest status and objective progress
//!
//! Quests move Locked → Unlocked → InProgress → Completed. At most one quest
//! is InProgress; activating another demotes the current one to Unlocked.
//! Rewards are returned to the caller, which applies them to the village.

use hearthvale_logic::quests::{
    objective_met, requirements_met, standard_chapters, standard_quests, QuestChapter, QuestDef,
    QuestRewards, QuestStatus, WorldSnapshot,
};
use serde::{Deserialize, Serialize};

/// Mutable state for one quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub status: QuestStatus,
    /// One flag per objective, sticky once set.
    pub objectives: Vec<bool>,
}

/// Saved form of a quest's progress, keyed by quest id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRecord {
    pub id: String,
    pub status: QuestStatus,
    pub objectives: Vec<bool>,
}

/// Quests whose status changed during an unlock sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub unlocked: Vec<String>,
    pub activated: Option<String>,
}

/// A quest that just completed, with the rewards still to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestCompletion {
    pub quest_id: String,
    pub rewards: QuestRewards,
    /// Result of the downstream unlock sweep.
    pub sweep: SweepResult,
}

#[derive(Debug, Clone)]
pub struct QuestBook {
    defs: Vec<QuestDef>,
    progress: Vec<QuestProgress>,
    chapters: Vec<QuestChapter>,
    active: Option<usize>,
}

impl QuestBook {
    pub fn new(defs: Vec<QuestDef>, chapters: Vec<QuestChapter>) -> Self {
        let progress = defs
            .iter()
            .map(|d| QuestProgress {
                status: QuestStatus::Locked,
                objectives: vec![false; d.objectives.len()],
            })
            .collect();
        Self {
            defs,
            progress,
            chapters,
            active: None,
        }
    }

    /// The six-quest restoration story.
    pub fn standard() -> Self {
        Self::new(standard_quests(), standard_chapters())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.defs.iter().position(|d| d.id == id)
    }

    pub fn def(&self, id: &str) -> Option<&QuestDef> {
        self.index_of(id).map(|i| &self.defs[i])
    }

    pub fn defs(&self) -> &[QuestDef] {
        &self.defs
    }

    pub fn status(&self, id: &str) -> Option<QuestStatus> {
        self.index_of(id).map(|i| self.progress[i].status)
    }

    pub fn objective_flags(&self, id: &str) -> Option<&[bool]> {
        self.index_of(id).map(|i| self.progress[i].objectives.as_slice())
    }

    pub fn active(&self) -> Option<&QuestDef> {
        self.active.map(|i| &self.defs[i])
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active().map(|d| d.id.as_str())
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Prerequisites completed and every building-level requirement met.
    pub fn check_unlockable(&self, id: &str, snapshot: &WorldSnapshot) -> bool {
        let Some(def) = self.def(id) else {
            return false;
        };
        let prerequisites_done = def
            .prerequisites
            .iter()
            .all(|p| self.status(p) == Some(QuestStatus::Completed));
        prerequisites_done && requirements_met(def, snapshot)
    }

    /// Unlock every Locked quest that now qualifies. The first of them, in
    /// catalog order, becomes active if nothing else is.
    pub fn unlock_sweep(&mut self, snapshot: &WorldSnapshot) -> SweepResult {
        let mut result = SweepResult::default();
        let mut first_new = None;
        for i in 0..self.defs.len() {
            if self.progress[i].status != QuestStatus::Locked {
                continue;
            }
            if !self.check_unlockable(&self.defs[i].id, snapshot) {
                continue;
            }
            self.progress[i].status = QuestStatus::Unlocked;
            result.unlocked.push(self.defs[i].id.clone());
            first_new.get_or_insert(i);
        }
        if self.active.is_none() {
            if let Some(i) = first_new {
                self.progress[i].status = QuestStatus::InProgress;
                self.active = Some(i);
                result.activated = Some(self.defs[i].id.clone());
            }
        }
        result
    }

    /// Mark satisfied objectives of an InProgress quest; complete it when
    /// all are satisfied. Any other status is a no-op.
    pub fn evaluate_objectives(
        &mut self,
        id: &str,
        snapshot: &WorldSnapshot,
    ) -> Option<QuestCompletion> {
        let i = self.index_of(id)?;
        if self.progress[i].status != QuestStatus::InProgress {
            return None;
        }

        for (flag, objective) in self.progress[i]
            .objectives
            .iter_mut()
            .zip(&self.defs[i].objectives)
        {
            if !*flag && objective_met(&objective.objective, snapshot) {
                *flag = true;
            }
        }
        if !self.progress[i].objectives.iter().all(|f| *f) {
            return None;
        }

        self.progress[i].status = QuestStatus::Completed;
        if self.active == Some(i) {
            self.active = None;
        }
        let sweep = self.unlock_sweep(snapshot);
        Some(QuestCompletion {
            quest_id: self.defs[i].id.clone(),
            rewards: self.defs[i].rewards.clone(),
            sweep,
        })
    }

    /// Make `id` the single active quest. Locked and Completed quests are
    /// rejected; the previous active quest drops back to Unlocked.
    pub fn set_active(&mut self, id: &str) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        match self.progress[i].status {
            QuestStatus::Locked | QuestStatus::Completed => return false,
            QuestStatus::InProgress if self.active == Some(i) => return true,
            _ => {}
        }
        if let Some(prev) = self.active {
            self.progress[prev].status = QuestStatus::Unlocked;
        }
        self.progress[i].status = QuestStatus::InProgress;
        self.active = Some(i);
        true
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn chapters(&self) -> &[QuestChapter] {
        &self.chapters
    }

    /// (completed, total) quests in a chapter.
    pub fn chapter_progress(&self, chapter: u8) -> (usize, usize) {
        let in_chapter = self
            .defs
            .iter()
            .zip(&self.progress)
            .filter(|(d, _)| d.chapter == chapter);
        let mut done = 0;
        let mut total = 0;
        for (_, p) in in_chapter {
            total += 1;
            if p.status == QuestStatus::Completed {
                done += 1;
            }
        }
        (done, total)
    }

    pub fn completed_count(&self) -> usize {
        self.progress
            .iter()
            .filter(|p| p.status == QuestStatus::Completed)
            .count()
    }

    /// Completed quests as a rounded percentage.
    pub fn progress_percent(&self) -> u32 {
        if self.defs.is_empty() {
            return 0;
        }
        ((self.completed_count() as f64 / self.defs.len() as f64) * 100.0).round() as u32
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    pub fn records(&self) -> Vec<QuestRecord> {
        self.defs
            .iter()
            .zip(&self.progress)
            .map(|(d, p)| QuestRecord {
                id: d.id.clone(),
                status: p.status,
                objectives: p.objectives.clone(),
            })
            .collect()
    }

    /// Apply saved progress. Records for unknown quests are returned so the
    /// caller can report them.
    pub fn restore(&mut self, records: Vec<QuestRecord>, active: Option<&str>) -> Vec<String> {
        let mut unknown = Vec::new();
        for record in records {
            let Some(i) = self.index_of(&record.id) else {
                unknown.push(record.id);
                continue;
            };
            let mut objectives = record.objectives;
            objectives.resize(self.defs[i].objectives.len(), false);
            self.progress[i] = QuestProgress {
                status: record.status,
                objectives,
            };
        }
        self.active = active
            .and_then(|id| self.index_of(id))
            .filter(|i| self.progress[*i].status == QuestStatus::InProgress);
        // Only the active quest may stay in progress
        for (i, progress) in self.progress.iter_mut().enumerate() {
            if progress.status == QuestStatus::InProgress && self.active != Some(i) {
                progress.status = QuestStatus::Unlocked;
            }
        }
        unknown
    }
}

impl Default for QuestBook {
    fn default() -> Self {
        Self::standard()
    }
}
