//! State machine for the explanation pipeline.
//!
//! The engine is pure and synchronous: intents and resolution events mutate
//! the session state and return an [`Effect`] describing the asynchronous
//! work the caller (the view coroutine) should start next. Every timer and
//! network response carries the generation it was spawned with; a mismatch
//! against the current generation means the response was superseded and is
//! dropped before it can touch any state.

use crate::core::catalog;
use crate::core::remote::{ExplanationRequest, RemoteError};

/// Quiet window after the last keystroke before work starts.
pub const DEBOUNCE_MS: u64 = 800;

pub const MIN_AGE: u8 = 2;
pub const MAX_AGE: u8 = 10;
pub const DEFAULT_AGE: u8 = 3;

/// Fixed user-facing message for a failed explanation fetch. Raw error
/// detail never reaches the display.
pub const APOLOGY: &str = "Oops! I couldn't get an explanation right now. Try again in a moment.";

/// The one current outcome shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExplanationResult {
    /// Input is blank; nothing to explain.
    #[default]
    Empty,
    /// A detection/explanation chain is in flight.
    Pending,
    Success {
        text: String,
    },
    Failure {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Detecting,
    Explaining,
    Displaying,
}

/// Asynchronous work requested by an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Arm (or re-arm) the debounce timer for this generation.
    ArmDebounce { generation: u64 },
    /// Start a detection call for this generation.
    Detect { generation: u64, text: String },
    /// Start an explanation call for this generation.
    Explain {
        generation: u64,
        request: ExplanationRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainEngine {
    pub raw_text: String,
    pub age: u8,
    /// Selected catalog code, or the `auto` sentinel.
    pub selected: String,
    /// Last detection outcome; only meaningful while `selected` is `auto`.
    pub detected: String,
    pub result: ExplanationResult,
    pub phase: Phase,
    pub selector_open: bool,
    generation: u64,
}

impl Default for ExplainEngine {
    fn default() -> Self {
        Self {
            raw_text: String::new(),
            age: DEFAULT_AGE,
            selected: catalog::AUTO.to_string(),
            detected: catalog::DEFAULT.to_string(),
            result: ExplanationResult::Empty,
            phase: Phase::Idle,
            selector_open: false,
            generation: 0,
        }
    }
}

impl ExplainEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keystroke intent. Supersedes any pending debounce and any in-flight
    /// chain; the last keystroke within a quiet window wins.
    pub fn text_changed(&mut self, text: impl Into<String>) -> Effect {
        self.raw_text = text.into();
        let generation = self.bump();

        if self.raw_text.trim().is_empty() {
            // Blank input must read as empty right away; a late response
            // from the superseded chain is discarded by generation.
            self.result = ExplanationResult::Empty;
        }

        self.phase = Phase::Debouncing;
        Effect::ArmDebounce { generation }
    }

    /// The debounce timer for `generation` elapsed.
    pub fn debounce_elapsed(&mut self, generation: u64) -> Effect {
        if generation != self.generation {
            return Effect::None;
        }

        if self.raw_text.trim().is_empty() {
            self.result = ExplanationResult::Empty;
            self.phase = Phase::Displaying;
            return Effect::None;
        }

        self.begin_lookup()
    }

    /// Detection for `generation` resolved with `code`.
    pub fn detection_resolved(&mut self, generation: u64, code: &str) -> Effect {
        if generation != self.generation {
            return Effect::None;
        }

        self.detected = code.to_string();
        self.phase = Phase::Explaining;

        let effective = if self.selected == catalog::AUTO {
            &self.detected
        } else {
            &self.selected
        };

        Effect::Explain {
            generation,
            request: ExplanationRequest {
                word: self.raw_text.clone(),
                age: self.age,
                language: catalog::display_name(effective).to_string(),
            },
        }
    }

    /// Explanation for `generation` resolved.
    pub fn explanation_resolved(
        &mut self,
        generation: u64,
        outcome: Result<String, RemoteError>,
    ) -> Effect {
        if generation != self.generation {
            return Effect::None;
        }

        self.phase = Phase::Displaying;
        self.result = match outcome {
            Ok(text) => ExplanationResult::Success { text },
            Err(_) => ExplanationResult::Failure {
                message: APOLOGY.to_string(),
            },
        };
        Effect::None
    }

    /// Age selector intent. Out-of-range values are clamped rather than
    /// propagated. Re-triggers immediately: selector changes are discrete
    /// low-frequency events that need no quiet-window coalescing.
    pub fn age_changed(&mut self, age: u8) -> Effect {
        self.age = age.clamp(MIN_AGE, MAX_AGE);
        self.retrigger()
    }

    /// Language selector intent. Out-of-catalog codes are kept but render
    /// as the "Unknown" placeholder.
    pub fn language_changed(&mut self, code: impl Into<String>) -> Effect {
        self.selected = code.into();
        self.selector_open = false;
        self.retrigger()
    }

    pub fn selector_toggled(&mut self) -> Effect {
        self.selector_open = !self.selector_open;
        Effect::None
    }

    /// Whether the view should show the loading spinner.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Detecting | Phase::Explaining)
    }

    fn retrigger(&mut self) -> Effect {
        if self.raw_text.trim().is_empty() {
            return Effect::None;
        }
        self.begin_lookup()
    }

    /// Mint a fresh generation and start a detection → explanation chain.
    fn begin_lookup(&mut self) -> Effect {
        let generation = self.bump();
        self.phase = Phase::Detecting;
        self.result = ExplanationResult::Pending;
        Effect::Detect {
            generation,
            text: self.raw_text.clone(),
        }
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debounce_generation(effect: Effect) -> u64 {
        match effect {
            Effect::ArmDebounce { generation } => generation,
            other => panic!("expected ArmDebounce, got {other:?}"),
        }
    }

    fn detect_effect(effect: Effect) -> (u64, String) {
        match effect {
            Effect::Detect { generation, text } => (generation, text),
            other => panic!("expected Detect, got {other:?}"),
        }
    }

    fn explain_effect(effect: Effect) -> (u64, ExplanationRequest) {
        match effect {
            Effect::Explain {
                generation,
                request,
            } => (generation, request),
            other => panic!("expected Explain, got {other:?}"),
        }
    }

    /// Drive a fresh engine up to the point where an explanation call for
    /// `word` is in flight, returning its generation.
    fn in_flight(engine: &mut ExplainEngine, word: &str) -> u64 {
        let timer = debounce_generation(engine.text_changed(word));
        let (gen, _) = detect_effect(engine.debounce_elapsed(timer));
        let (gen, _) = explain_effect(engine.detection_resolved(gen, "en"));
        gen
    }

    #[test]
    fn rapid_edits_coalesce_into_one_lookup() {
        let mut engine = ExplainEngine::new();

        // Keystrokes at t=0, 100, 300, 750 ms; each re-arms the timer.
        let g1 = debounce_generation(engine.text_changed("f"));
        let g2 = debounce_generation(engine.text_changed("fa"));
        let g3 = debounce_generation(engine.text_changed("fad"));
        let g4 = debounce_generation(engine.text_changed("faded"));

        // Superseded timers fire into the void.
        assert_eq!(engine.debounce_elapsed(g1), Effect::None);
        assert_eq!(engine.debounce_elapsed(g2), Effect::None);
        assert_eq!(engine.debounce_elapsed(g3), Effect::None);
        assert_eq!(engine.result, ExplanationResult::Empty);

        // Only the final quiet window triggers work, with the final text.
        let (_, text) = detect_effect(engine.debounce_elapsed(g4));
        assert_eq!(text, "faded");
        assert_eq!(engine.phase, Phase::Detecting);
        assert_eq!(engine.result, ExplanationResult::Pending);
    }

    #[test]
    fn blank_input_displays_empty_without_network() {
        let mut engine = ExplainEngine::new();

        let timer = debounce_generation(engine.text_changed("   "));
        assert_eq!(engine.result, ExplanationResult::Empty);

        assert_eq!(engine.debounce_elapsed(timer), Effect::None);
        assert_eq!(engine.phase, Phase::Displaying);
        assert_eq!(engine.result, ExplanationResult::Empty);
    }

    #[test]
    fn auto_detection_feeds_the_display_name_through() {
        let mut engine = ExplainEngine::new();
        engine.age = 3;

        let timer = debounce_generation(engine.text_changed("faded"));
        let (gen, text) = detect_effect(engine.debounce_elapsed(timer));
        assert_eq!(text, "faded");

        let (gen, request) = explain_effect(engine.detection_resolved(gen, "en"));
        assert_eq!(engine.phase, Phase::Explaining);
        assert_eq!(
            request,
            ExplanationRequest {
                word: "faded".into(),
                age: 3,
                language: "English".into(),
            }
        );

        engine.explanation_resolved(gen, Ok("It got lighter.".into()));
        assert_eq!(engine.phase, Phase::Displaying);
        assert_eq!(
            engine.result,
            ExplanationResult::Success {
                text: "It got lighter.".into()
            }
        );
    }

    #[test]
    fn explicit_selection_overrides_the_detected_code() {
        let mut engine = ExplainEngine::new();
        engine.language_changed("es");

        let timer = debounce_generation(engine.text_changed("gato"));
        let (gen, _) = detect_effect(engine.debounce_elapsed(timer));

        // Detection still runs and is recorded, but the selection wins.
        let (_, request) = explain_effect(engine.detection_resolved(gen, "ru"));
        assert_eq!(engine.detected, "ru");
        assert_eq!(request.language, "Spanish");
    }

    #[test]
    fn failure_surfaces_the_apology_and_keeps_the_text() {
        let mut engine = ExplainEngine::new();
        let gen = in_flight(&mut engine, "faded");

        engine.explanation_resolved(gen, Err(RemoteError::Transport("boom".into())));
        assert_eq!(engine.phase, Phase::Displaying);
        assert_eq!(
            engine.result,
            ExplanationResult::Failure {
                message: APOLOGY.to_string()
            }
        );
        assert_eq!(engine.raw_text, "faded");
    }

    #[test]
    fn timeout_is_just_another_failure() {
        let mut engine = ExplainEngine::new();
        let gen = in_flight(&mut engine, "faded");

        engine.explanation_resolved(gen, Err(RemoteError::Timeout(15_000)));
        assert_eq!(
            engine.result,
            ExplanationResult::Failure {
                message: APOLOGY.to_string()
            }
        );
    }

    #[test]
    fn stale_explanation_cannot_overwrite_a_newer_chain() {
        let mut engine = ExplainEngine::new();
        let stale = in_flight(&mut engine, "faded");

        // Selector change supersedes the in-flight chain, no debounce.
        let (fresh, _) = detect_effect(engine.language_changed("fr"));
        assert_ne!(stale, fresh);

        // The superseded response arrives late and is dropped whole.
        assert_eq!(
            engine.explanation_resolved(stale, Ok("stale".into())),
            Effect::None
        );
        assert_eq!(engine.result, ExplanationResult::Pending);

        // Only the fresh chain's outcome lands.
        let (fresh, request) = explain_effect(engine.detection_resolved(fresh, "en"));
        assert_eq!(request.language, "French");
        engine.explanation_resolved(fresh, Ok("frais".into()));
        assert_eq!(
            engine.result,
            ExplanationResult::Success {
                text: "frais".into()
            }
        );
    }

    #[test]
    fn stale_detection_cannot_restart_an_explanation() {
        let mut engine = ExplainEngine::new();
        let timer = debounce_generation(engine.text_changed("faded"));
        let (stale, _) = detect_effect(engine.debounce_elapsed(timer));

        let timer = debounce_generation(engine.text_changed("fade"));
        assert_eq!(engine.detection_resolved(stale, "ru"), Effect::None);
        assert_eq!(engine.detected, "en");

        let (_, text) = detect_effect(engine.debounce_elapsed(timer));
        assert_eq!(text, "fade");
    }

    #[test]
    fn clearing_the_text_discards_the_in_flight_chain() {
        let mut engine = ExplainEngine::new();
        let stale = in_flight(&mut engine, "faded");

        let timer = debounce_generation(engine.text_changed(""));
        assert_eq!(engine.result, ExplanationResult::Empty);

        // The in-flight resolution lands after the clear and is ignored.
        assert_eq!(
            engine.explanation_resolved(stale, Ok("late".into())),
            Effect::None
        );
        assert_eq!(engine.result, ExplanationResult::Empty);

        assert_eq!(engine.debounce_elapsed(timer), Effect::None);
        assert_eq!(engine.phase, Phase::Displaying);
        assert_eq!(engine.result, ExplanationResult::Empty);
    }

    #[test]
    fn age_change_retriggers_immediately_and_clamps() {
        let mut engine = ExplainEngine::new();
        engine.raw_text = "faded".into();

        let (_, text) = detect_effect(engine.age_changed(14));
        assert_eq!(engine.age, MAX_AGE);
        assert_eq!(text, "faded");

        detect_effect(engine.age_changed(0));
        assert_eq!(engine.age, MIN_AGE);
    }

    #[test]
    fn selector_changes_without_text_do_nothing() {
        let mut engine = ExplainEngine::new();
        assert_eq!(engine.age_changed(5), Effect::None);
        assert_eq!(engine.language_changed("fr"), Effect::None);
        assert_eq!(engine.result, ExplanationResult::Empty);
    }

    #[test]
    fn out_of_catalog_selection_fails_closed() {
        let mut engine = ExplainEngine::new();
        engine.raw_text = "faded".into();

        let (gen, _) = detect_effect(engine.language_changed("xx"));
        let (_, request) = explain_effect(engine.detection_resolved(gen, "en"));
        assert_eq!(request.language, "Unknown");
    }

    #[test]
    fn identical_resolutions_yield_identical_results() {
        let run = || {
            let mut engine = ExplainEngine::new();
            let gen = in_flight(&mut engine, "faded");
            engine.explanation_resolved(gen, Ok("It got lighter.".into()));
            engine.result
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn selector_flag_toggles_and_closes_on_selection() {
        let mut engine = ExplainEngine::new();
        engine.selector_toggled();
        assert!(engine.selector_open);
        engine.language_changed("fr");
        assert!(!engine.selector_open);
    }
}
