//! Text-to-outcome driver.
//!
//! Every change of the input text runs validation followed by aggregation.
//! [`process`] is that step as a pure function. [`Pipeline`] wraps it for
//! callers that re-run on every keystroke: unchanged text reuses the previous
//! outcome, and results handed back from asynchronous work are discarded when
//! a newer input has been submitted since.

use std::sync::Arc;

use tracing::debug;

use crate::parser::{Node, ValidationErrors, Validator, ValidatorConfig};
use crate::table::{flatten, FlattenCache, FlattenedRow};

/// Monotonic sequence number of a submitted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Result of processing one input text.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The text is a valid tree; `rows` is its pre-order flattening.
    Valid {
        tree: Arc<Node>,
        rows: Arc<[FlattenedRow]>,
    },
    /// The text was rejected. Nothing else is rendered.
    Invalid(ValidationErrors),
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid { .. })
    }

    pub fn tree(&self) -> Option<&Arc<Node>> {
        match self {
            Outcome::Valid { tree, .. } => Some(tree),
            Outcome::Invalid(_) => None,
        }
    }

    pub fn rows(&self) -> Option<&[FlattenedRow]> {
        match self {
            Outcome::Valid { rows, .. } => Some(&rows[..]),
            Outcome::Invalid(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Outcome::Valid { .. } => None,
            Outcome::Invalid(errors) => Some(errors),
        }
    }

    /// The root's total weight, the denominator for percentages.
    pub fn root_total(&self) -> Option<f64> {
        self.tree().map(|tree| tree.value)
    }
}

/// Validates and flattens `text`. Pure: same text, same outcome.
pub fn process(text: &str, config: &ValidatorConfig) -> Outcome {
    match Validator::new(*config).validate(text) {
        Ok(tree) => {
            let rows: Arc<[FlattenedRow]> = flatten(&tree).into();
            Outcome::Valid {
                tree: Arc::new(tree),
                rows,
            }
        }
        Err(errors) => Outcome::Invalid(errors),
    }
}

/// The outcome currently on display and the text it was computed from.
#[derive(Debug)]
struct Current {
    generation: Generation,
    text: String,
    outcome: Outcome,
}

/// Memoizing driver around [`process`].
#[derive(Debug, Default)]
pub struct Pipeline {
    validator: Validator,
    cache: FlattenCache,
    /// Latest generation handed out.
    latest: Generation,
    /// Input reserved by `begin`, awaiting `accept`.
    pending: Option<(Generation, String)>,
    current: Option<Current>,
}

impl Pipeline {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            validator: Validator::new(config),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        self.validator.config()
    }

    /// Processes `text` synchronously and makes it the current outcome.
    ///
    /// Text identical to the current outcome's input reuses that outcome
    /// (the same `Arc`s) without re-validating. Different text that still
    /// yields the last valid tree reuses its `Arc` and rows without
    /// re-flattening.
    pub fn submit(&mut self, text: &str) -> Generation {
        self.latest = self.latest.next();
        self.pending = None;
        let generation = self.latest;

        if let Some(current) = self.current.as_mut() {
            if current.text == text {
                debug!(generation = generation.value(), "input unchanged, reusing outcome");
                current.generation = generation;
                return generation;
            }
        }

        let outcome = match self.validator.validate(text) {
            Ok(tree) => {
                let tree = self.cache.share(tree);
                let rows = self.cache.rows(&tree);
                Outcome::Valid { tree, rows }
            }
            Err(errors) => Outcome::Invalid(errors),
        };
        debug!(
            generation = generation.value(),
            valid = outcome.is_valid(),
            "processed input"
        );

        self.current = Some(Current {
            generation,
            text: text.to_string(),
            outcome,
        });
        generation
    }

    /// Reserves a generation for `text` that will be processed elsewhere,
    /// typically with [`process`] on another thread.
    ///
    /// Pair with [`Pipeline::accept`] once the outcome is ready.
    pub fn begin(&mut self, text: &str) -> Generation {
        self.latest = self.latest.next();
        self.pending = Some((self.latest, text.to_string()));
        self.latest
    }

    /// Installs an outcome computed for `generation`.
    ///
    /// Returns false, leaving the current outcome untouched, when a newer
    /// input has been submitted since `generation` was handed out.
    pub fn accept(&mut self, generation: Generation, outcome: Outcome) -> bool {
        if generation < self.latest {
            debug!(
                stale = generation.value(),
                latest = self.latest.value(),
                "discarding stale outcome"
            );
            return false;
        }

        match self.pending.take() {
            Some((pending, text)) if pending == generation => {
                self.current = Some(Current {
                    generation,
                    text,
                    outcome,
                });
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// The outcome for the latest accepted input, if any.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.current.as_ref().map(|current| &current.outcome)
    }

    /// Generation of the current outcome.
    pub fn current_generation(&self) -> Option<Generation> {
        self.current.as_ref().map(|current| current.generation)
    }

    /// Latest generation handed out by `submit` or `begin`.
    pub fn latest_generation(&self) -> Generation {
        self.latest
    }
}
