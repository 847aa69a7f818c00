//! Session state and the progress rollup over the four modules.

use crate::quiz::{ModuleId, ModuleState, Outcome, QuizModule};
use crate::stage::{Answer, StageSpec};
use serde::Serialize;
use std::collections::BTreeMap;

/// Highest total across all modules.
pub const MAX_TOTAL_SCORE: u32 = 40;

/// Everything a learner has done in one session. Module engines are created
/// on first mutable access; totals are always derived, never stored.
#[derive(Debug, Clone, Default)]
pub struct Session {
    modules: BTreeMap<ModuleId, QuizModule>,
    achievements: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressAggregate {
    pub total_score: u32,
    pub max_score: u32,
    pub completed_count: usize,
    /// Display names, in module order.
    pub completed_modules: Vec<&'static str>,
    pub completion_fraction: f64,
    pub achievements: Vec<&'static str>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialise a module's engine if it has not been touched yet.
    /// Calling it again is a no-op.
    pub fn init(&mut self, id: ModuleId) -> &mut QuizModule {
        self.modules.entry(id).or_insert_with(|| {
            tracing::debug!(module = %id, "initialising module state");
            QuizModule::new(id)
        })
    }

    pub fn module(&self, id: ModuleId) -> Option<&QuizModule> {
        self.modules.get(&id)
    }

    /// Read-only state accessor; untouched modules report the initial state.
    pub fn get_state(&self, id: ModuleId) -> ModuleState {
        self.modules
            .get(&id)
            .map(|m| *m.state())
            .unwrap_or_default()
    }

    /// The stage awaiting an answer for `id`, `None` once completed.
    pub fn current_stage(&self, id: ModuleId) -> Option<&'static StageSpec> {
        match self.modules.get(&id) {
            Some(m) => m.current_stage(),
            None => id.def().stage(1),
        }
    }

    /// The sole mutator: evaluate one answer for one module.
    pub fn submit_answer(&mut self, id: ModuleId, stage_index: u32, answer: &Answer) -> Outcome {
        let mut outcome = self.init(id).evaluate(stage_index, answer);
        if outcome.completed_module {
            let badge = id.def().achievement;
            if !self.achievements.contains(&badge) {
                self.achievements.push(badge);
                outcome.achievement = Some(badge);
                tracing::info!(module = %id, achievement = badge, "achievement unlocked");
            }
        }
        outcome
    }

    /// Submit with no answer: the stage's sentinel goes through the normal
    /// path and registers as a (usually wrong) answer.
    pub fn submit_blank(&mut self, id: ModuleId, stage_index: u32) -> Outcome {
        let sentinel = self
            .current_stage(id)
            .map(StageSpec::sentinel)
            .unwrap_or(Answer::Number(0.0));
        self.submit_answer(id, stage_index, &sentinel)
    }

    /// Drop every module's state and all achievements in one step.
    pub fn reset_all(&mut self) {
        *self = Session::new();
        tracing::info!("session reset");
    }

    pub fn total_score(&self) -> u32 {
        self.modules.values().map(|m| m.state().score).sum()
    }

    pub fn completed_modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules
            .values()
            .filter(|m| m.state().completed)
            .map(QuizModule::id)
    }

    pub fn is_completed(&self, id: ModuleId) -> bool {
        self.get_state(id).completed
    }

    pub fn completion_fraction(&self) -> f64 {
        self.completed_modules().count() as f64 / ModuleId::ALL.len() as f64
    }

    pub fn achievements(&self) -> &[&'static str] {
        &self.achievements
    }

    pub fn aggregate(&self) -> ProgressAggregate {
        let completed_modules: Vec<&'static str> =
            self.completed_modules().map(ModuleId::name).collect();
        ProgressAggregate {
            total_score: self.total_score(),
            max_score: MAX_TOTAL_SCORE,
            completed_count: completed_modules.len(),
            completed_modules,
            completion_fraction: self.completion_fraction(),
            achievements: self.achievements.clone(),
        }
    }
}
