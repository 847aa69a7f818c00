//! Stage definitions, submitted answers and the correctness rules.

use serde::{Deserialize, Serialize};

/// Every module is a fixed sequence of this many stages.
pub const STAGE_COUNT: usize = 6;

/// One staged question. Immutable, defined in the module catalog.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub title: &'static str,
    pub points: u32,
    /// Shown after an incorrect submission, until the stage is passed.
    pub hint: &'static str,
    /// Short corrective message accompanying a wrong answer.
    pub feedback: &'static str,
    pub kind: StageKind,
}

#[derive(Debug, Clone)]
pub enum StageKind {
    /// Put `components` into slots; one label per slot.
    Ordering {
        components: &'static [&'static str],
        correct_order: &'static [&'static str],
    },
    Choice {
        prompt: &'static str,
        options: &'static [&'static str],
        correct_index: usize,
    },
    Numeric {
        prompt: &'static str,
        unit: &'static str,
        expected: f64,
        tolerance: f64,
        /// Input bounds offered to the learner.
        range: (f64, f64),
    },
}

/// A learner's submission. JSON form is untagged: number, string or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Choice(String),
    Order(Vec<String>),
}

impl From<f64> for Answer {
    fn from(value: f64) -> Self {
        Answer::Number(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Choice(value.to_string())
    }
}

impl From<&[&str]> for Answer {
    fn from(value: &[&str]) -> Self {
        Answer::Order(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Answer {
    fn from(value: [&str; N]) -> Self {
        Answer::from(&value[..])
    }
}

impl StageSpec {
    /// Check a submission against this stage. An answer of the wrong kind is
    /// simply incorrect.
    pub fn is_correct(&self, answer: &Answer) -> bool {
        match (&self.kind, answer) {
            (StageKind::Ordering { correct_order, .. }, Answer::Order(submitted)) => {
                submitted.len() == correct_order.len()
                    && submitted.iter().zip(correct_order.iter()).all(|(a, b)| a == b)
            }
            (
                StageKind::Choice {
                    options,
                    correct_index,
                    ..
                },
                Answer::Choice(selected),
            ) => options
                .get(*correct_index)
                .is_some_and(|correct| selected == correct),
            (
                StageKind::Numeric {
                    expected,
                    tolerance,
                    ..
                },
                Answer::Number(value),
            ) => (value - expected).abs() < *tolerance,
            _ => false,
        }
    }

    /// The value a shell substitutes when the learner submits nothing:
    /// zero, the first option, or the first component in every slot.
    pub fn sentinel(&self) -> Answer {
        match &self.kind {
            StageKind::Ordering { components, .. } => {
                let first = components.first().copied().unwrap_or_default();
                Answer::Order(vec![first.to_string(); components.len()])
            }
            StageKind::Choice { options, .. } => {
                Answer::Choice(options.first().copied().unwrap_or_default().to_string())
            }
            StageKind::Numeric { .. } => Answer::Number(0.0),
        }
    }

    #[cfg(test)]
    pub(crate) fn solution(&self) -> Answer {
        match &self.kind {
            StageKind::Ordering { correct_order, .. } => Answer::from(*correct_order),
            StageKind::Choice {
                options,
                correct_index,
                ..
            } => Answer::from(options[*correct_index]),
            StageKind::Numeric { expected, .. } => Answer::Number(*expected),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StageKind::Ordering { .. } => "ordering",
            StageKind::Choice { .. } => "choice",
            StageKind::Numeric { .. } => "numeric",
        }
    }

    /// Render-facing view of the stage, without the correct answer.
    pub fn view(&self, number: u32) -> StageView {
        let (prompt, choices, unit, range) = match &self.kind {
            StageKind::Ordering { components, .. } => (None, *components, None, None),
            StageKind::Choice {
                prompt, options, ..
            } => (Some(*prompt), *options, None, None),
            StageKind::Numeric {
                prompt,
                unit,
                range,
                ..
            } => (Some(*prompt), NO_CHOICES, Some(*unit), Some(*range)),
        };
        StageView {
            number,
            title: self.title,
            points: self.points,
            kind: self.kind_name(),
            prompt,
            choices,
            unit,
            range,
        }
    }
}

const NO_CHOICES: &[&str] = &[];

fn no_choices(choices: &&'static [&'static str]) -> bool {
    choices.is_empty()
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub number: u32,
    pub title: &'static str,
    pub points: u32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'static str>,
    /// Options for a choice stage, components for an ordering stage.
    #[serde(skip_serializing_if = "no_choices")]
    pub choices: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}
