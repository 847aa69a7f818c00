//! Quiz module engine – one module's progression through its six stages.
//!
//! States are stage numbers 1..=6 plus the terminal `completed` flag. A
//! correct answer moves `stage -> stage + 1` (or completes the module on
//! stage 6); a wrong one only sets the stage's hint. Nothing but a session
//! reset moves a module backwards.

use crate::catalog::{module_def, ModuleDef};
use crate::stage::{Answer, StageSpec, StageView, STAGE_COUNT};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    Solar,
    Wind,
    Hydro,
    Biomass,
}

impl ModuleId {
    pub const ALL: [ModuleId; 4] = [
        ModuleId::Solar,
        ModuleId::Wind,
        ModuleId::Hydro,
        ModuleId::Biomass,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ModuleId::Solar => "solar",
            ModuleId::Wind => "wind",
            ModuleId::Hydro => "hydro",
            ModuleId::Biomass => "biomass",
        }
    }

    pub fn def(self) -> &'static ModuleDef {
        module_def(self)
    }

    /// Display name, e.g. "Wind Energy".
    pub fn name(self) -> &'static str {
        self.def().name
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module: {0} (available: solar, wind, hydro, biomass)")]
pub struct UnknownModule(pub String);

impl FromStr for ModuleId {
    type Err = UnknownModule;

    /// Accepts the short key or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ModuleId::ALL
            .into_iter()
            .find(|id| {
                id.key().eq_ignore_ascii_case(wanted) || id.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Mutable per-module state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModuleState {
    pub stage: u32,
    pub score: u32,
    pub completed: bool,
    pub hint: Option<&'static str>,
}

impl Default for ModuleState {
    fn default() -> Self {
        Self {
            stage: 1,
            score: 0,
            completed: false,
            hint: None,
        }
    }
}

/// What a single submission did, for the shell to render feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// False when the submission targeted a stage that is not current.
    pub accepted: bool,
    pub correct: bool,
    pub advanced: bool,
    pub awarded_points: u32,
    pub completed_module: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<&'static str>,
    /// Achievement newly earned by this submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<&'static str>,
    pub stage: u32,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Done,
    Current,
    Locked,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageProgress {
    pub number: u32,
    pub title: &'static str,
    pub points: u32,
    pub status: StageStatus,
}

/// One module's engine: a fixed stage table plus its state.
#[derive(Debug, Clone)]
pub struct QuizModule {
    def: &'static ModuleDef,
    state: ModuleState,
}

impl QuizModule {
    pub fn new(id: ModuleId) -> Self {
        Self {
            def: id.def(),
            state: ModuleState::default(),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.def.id
    }

    pub fn def(&self) -> &'static ModuleDef {
        self.def
    }

    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    /// The stage awaiting an answer, or `None` once completed.
    pub fn current_stage(&self) -> Option<&'static StageSpec> {
        if self.state.completed {
            return None;
        }
        self.def.stage(self.state.stage)
    }

    pub fn current_view(&self) -> Option<StageView> {
        self.current_stage().map(|spec| spec.view(self.state.stage))
    }

    /// Evaluate a submission for `stage_index` (1-based).
    ///
    /// Submissions for any stage other than the current one, or against a
    /// completed module, leave the state untouched and come back with
    /// `accepted == false`.
    pub fn evaluate(&mut self, stage_index: u32, answer: &Answer) -> Outcome {
        let spec = match self.current_stage() {
            Some(spec) if stage_index == self.state.stage => spec,
            _ => {
                tracing::debug!(
                    module = %self.id(),
                    submitted = stage_index,
                    current = self.state.stage,
                    completed = self.state.completed,
                    "ignoring submission for non-current stage"
                );
                return self.outcome(false, false, 0);
            }
        };

        if !spec.is_correct(answer) {
            self.state.hint = Some(spec.hint);
            tracing::debug!(module = %self.id(), stage = stage_index, "incorrect answer");
            let mut out = self.outcome(true, false, 0);
            out.feedback = Some(spec.feedback);
            return out;
        }

        self.state.score += spec.points;
        self.state.hint = None;
        if stage_index as usize == STAGE_COUNT {
            self.state.completed = true;
            tracing::info!(
                module = %self.id(),
                score = self.state.score,
                "module completed"
            );
        } else {
            self.state.stage += 1;
            tracing::info!(
                module = %self.id(),
                stage = self.state.stage,
                score = self.state.score,
                "advanced to next stage"
            );
        }
        self.outcome(true, true, spec.points)
    }

    /// Per-stage status list for progress markers.
    pub fn stage_progress(&self) -> Vec<StageProgress> {
        self.def
            .stages
            .iter()
            .zip(1u32..)
            .map(|(spec, number)| {
                let status = if self.state.completed || number < self.state.stage {
                    StageStatus::Done
                } else if number == self.state.stage {
                    StageStatus::Current
                } else {
                    StageStatus::Locked
                };
                StageProgress {
                    number,
                    title: spec.title,
                    points: spec.points,
                    status,
                }
            })
            .collect()
    }

    fn outcome(&self, accepted: bool, correct: bool, awarded_points: u32) -> Outcome {
        Outcome {
            accepted,
            correct,
            advanced: correct,
            awarded_points,
            completed_module: correct && self.state.completed,
            hint: self.state.hint,
            feedback: None,
            achievement: None,
            stage: self.state.stage,
            score: self.state.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_to_stage(module: &mut QuizModule, stage: u32) {
        while module.state().stage < stage {
            let n = module.state().stage;
            let answer = module.current_stage().unwrap().solution();
            assert!(module.evaluate(n, &answer).advanced);
        }
    }

    #[test]
    fn test_module_id_parsing() {
        assert_eq!("solar".parse::<ModuleId>(), Ok(ModuleId::Solar));
        assert_eq!("Wind Energy".parse::<ModuleId>(), Ok(ModuleId::Wind));
        assert_eq!(" HYDRO ".parse::<ModuleId>(), Ok(ModuleId::Hydro));
        let err = "geothermal".parse::<ModuleId>().unwrap_err();
        assert!(err.to_string().contains("geothermal"));
    }

    #[test]
    fn test_initial_state() {
        let m = QuizModule::new(ModuleId::Biomass);
        assert_eq!(*m.state(), ModuleState::default());
        assert_eq!(m.state().stage, 1);
        assert_eq!(m.state().hint, None);
        assert_eq!(m.id(), ModuleId::Biomass);
    }

    #[test]
    fn test_solar_correct_arrangement_advances() {
        let mut m = QuizModule::new(ModuleId::Solar);
        let out = m.evaluate(
            1,
            &Answer::from(["PV Panel", "Charge Controller", "Battery", "Inverter"]),
        );
        assert!(out.accepted && out.advanced);
        assert_eq!(out.awarded_points, 2);
        assert!(!out.completed_module);
        assert_eq!(m.state().stage, 2);
        assert_eq!(m.state().score, 2);
    }

    #[test]
    fn test_solar_wrong_arrangement_sets_hint() {
        let mut m = QuizModule::new(ModuleId::Solar);
        let out = m.evaluate(
            1,
            &Answer::from(["Inverter", "PV Panel", "Charge Controller", "Battery"]),
        );
        assert!(out.accepted);
        assert!(!out.advanced);
        assert_eq!(out.awarded_points, 0);
        assert_eq!(out.hint, Some("Capture → Control → Store → Convert"));
        assert_eq!(out.feedback, Some("Wrong order."));
        assert_eq!(m.state().stage, 1);
        assert_eq!(m.state().score, 0);
        assert_eq!(m.state().hint, Some("Capture → Control → Store → Convert"));
    }

    #[test]
    fn test_hint_cleared_on_advance() {
        let mut m = QuizModule::new(ModuleId::Solar);
        play_to_stage(&mut m, 4);
        m.evaluate(4, &Answer::from("To drain water"));
        assert!(m.state().hint.is_some());
        let out = m.evaluate(4, &Answer::from("To maximize sunlight capture throughout the day"));
        assert!(out.advanced);
        assert_eq!(out.hint, None);
        assert_eq!(m.state().hint, None);
    }

    #[test]
    fn test_solar_numeric_tolerance() {
        let mut m = QuizModule::new(ModuleId::Solar);
        play_to_stage(&mut m, 3);
        assert!(!m.evaluate(3, &Answer::Number(1.52)).advanced);
        assert_eq!(m.state().stage, 3);
        assert!(m.evaluate(3, &Answer::Number(1.5)).advanced);
        assert_eq!(m.state().stage, 4);
    }

    #[test]
    fn test_wind_final_stage_completes() {
        let mut m = QuizModule::new(ModuleId::Wind);
        play_to_stage(&mut m, 6);
        assert_eq!(m.state().score, 9);
        let miss = m.evaluate(6, &Answer::Number(0.5));
        assert!(!miss.correct);
        assert!(m.state().hint.is_some());
        let out = m.evaluate(6, &Answer::Number(0.25));
        assert!(out.completed_module);
        assert_eq!(out.awarded_points, 1);
        assert_eq!(out.score, 10);
        assert!(m.state().completed);
        assert_eq!(m.state().stage, 6);
        assert!(m.current_stage().is_none());
        assert_eq!(m.state().hint, None);
        assert_eq!(out.hint, None);
    }

    #[test]
    fn test_non_current_and_out_of_range_submissions_are_ignored() {
        let mut m = QuizModule::new(ModuleId::Hydro);
        for stage in [0, 2, 6, 7, u32::MAX] {
            let out = m.evaluate(stage, &Answer::from("2×"));
            assert!(!out.accepted);
            assert!(!out.advanced);
        }
        assert_eq!(*m.state(), ModuleState::default());
    }

    #[test]
    fn test_resubmitting_after_completion_is_ignored() {
        let mut m = QuizModule::new(ModuleId::Hydro);
        play_to_stage(&mut m, 6);
        assert!(m.evaluate(6, &Answer::Number(100.0)).completed_module);
        let again = m.evaluate(6, &Answer::Number(100.0));
        assert!(!again.accepted);
        assert!(!again.completed_module);
        assert_eq!(m.state().score, 10);
    }

    #[test]
    fn test_score_and_stage_are_monotonic() {
        let mut m = QuizModule::new(ModuleId::Biomass);
        let attempts: Vec<(u32, Answer)> = vec![
            (1, Answer::from(["Generator", "Furnace", "Boiler", "Turbine"])),
            (1, Answer::from(["Furnace", "Boiler", "Turbine", "Generator"])),
            (1, Answer::from(["Furnace", "Boiler", "Turbine", "Generator"])),
            (2, Answer::from("Burns hotter")),
            (2, Answer::from("Less latent heat loss")),
            (3, Answer::Number(49.5)),
            (4, Answer::Number(1.0)),
            (4, Answer::from("Wood pellets from forestry waste")),
        ];
        let (mut last_stage, mut last_score) = (1, 0);
        for (stage, answer) in attempts {
            let out = m.evaluate(stage, &answer);
            let s = *m.state();
            assert!(s.score >= last_score);
            assert!(s.stage >= last_stage);
            if out.advanced {
                assert_eq!(s.stage, last_stage + 1);
            } else {
                assert_eq!(s.stage, last_stage);
            }
            last_stage = s.stage;
            last_score = s.score;
        }
        assert_eq!(m.state().stage, 5);
        assert_eq!(m.state().score, 7);
    }

    #[test]
    fn test_completion_coincides_with_full_score() {
        for id in ModuleId::ALL {
            let mut m = QuizModule::new(id);
            play_to_stage(&mut m, 6);
            assert!(!m.state().completed);
            assert!(m.state().score < 10);
            let answer = m.current_stage().unwrap().solution();
            m.evaluate(6, &answer);
            assert!(m.state().completed);
            assert_eq!(m.state().score, 10);
        }
    }

    #[test]
    fn test_stage_progress_markers() {
        let mut m = QuizModule::new(ModuleId::Wind);
        play_to_stage(&mut m, 3);
        let statuses: Vec<StageStatus> = m.stage_progress().iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                StageStatus::Done,
                StageStatus::Done,
                StageStatus::Current,
                StageStatus::Locked,
                StageStatus::Locked,
                StageStatus::Locked,
            ]
        );
        play_to_stage(&mut m, 6);
        m.evaluate(6, &Answer::Number(0.25));
        assert!(m.stage_progress().iter().all(|p| p.status == StageStatus::Done));
    }
}
