//! Simulated AI backend for offline use and deterministic testing.
//!
//! Answers come from fixed pools with randomized latency and a configurable
//! failure rate. All randomness flows through a single injectable
//! [`RandomSource`], so tests can force every branch:
//!
//! ```rust
//! use notewise_ai::simulated::{LatencyProfile, ScriptedRandom, SimulatedAiService};
//! use notewise_core::AiService;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // First draw decides failure (0.05 < 0.1 fails), nothing else is drawn.
//! let service = SimulatedAiService::new()
//!     .with_latency(LatencyProfile::none())
//!     .with_random_source(ScriptedRandom::new(vec![0.05]));
//!
//! assert!(service.generate_response("hello", None).await.is_err());
//! # }
//! ```
//!
//! Draw order per call, after the latency draw (skipped when the latency
//! range is empty):
//! - `generate_response`: failure roll, then response index
//! - `analyze_note`: sentiment, then tag count
//! - `summarize_text`: nothing

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use notewise_core::{AiService, Error, NoteAnalysis, Result, Sentiment, ServiceStatus};

use crate::retry::delay;

/// Message of the error injected by the failure roll.
pub const SIMULATED_ERROR_MESSAGE: &str = "Mock service error for testing";

/// Default probability that `generate_response` fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Tag pool; analyses return a 2–4 element prefix of it.
pub const TAG_POOL: [&str; 6] = [
    "productivity",
    "ideas",
    "research",
    "personal",
    "work",
    "learning",
];

/// Key points returned by every analysis.
pub const KEY_POINTS: [&str; 3] = [
    "Main theme: Organization and productivity",
    "Secondary theme: Knowledge management",
    "Suggested action: Review and categorize",
];

const GREETING: &str = "Hello! How can I assist you with your notes today?";
const ANALYSIS: &str = "This note appears to be about productivity and organization. Key points include task management and prioritization.";
const SUMMARY: &str = "This text discusses the importance of effective note-taking strategies for knowledge management.";
const ORGANIZE: &str =
    "Based on the context provided, I can help you organize your thoughts and ideas.";
const FOLLOW_UP: &str = "Would you like me to help summarize or analyze this content further?";

/// Prompt characters echoed back before truncation.
const ECHO_LIMIT: usize = 50;

/// Uniform random draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;
}

impl<R: RngCore + Send> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    position: usize,
}

impl ScriptedRandom {
    /// An empty script always yields 0.0.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Inclusive-exclusive latency window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRange {
    pub min: Duration,
    pub max: Duration,
}

impl LatencyRange {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    fn is_empty(&self) -> bool {
        self.max <= self.min
    }
}

/// Per-operation latency windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub response: LatencyRange,
    pub analysis: LatencyRange,
    pub summary: LatencyRange,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            response: LatencyRange::from_millis(500, 1500),
            analysis: LatencyRange::from_millis(800, 2000),
            summary: LatencyRange::from_millis(600, 1500),
        }
    }
}

impl LatencyProfile {
    /// Answer immediately without consuming draws.
    pub const fn none() -> Self {
        let zero = LatencyRange::from_millis(0, 0);
        Self {
            response: zero,
            analysis: zero,
            summary: zero,
        }
    }
}

/// Simulated implementation of [`AiService`].
pub struct SimulatedAiService {
    rng: Mutex<Box<dyn RandomSource>>,
    latency: LatencyProfile,
    failure_rate: f64,
    last_error: Mutex<Option<String>>,
}

impl SimulatedAiService {
    /// Entropy-seeded randomness, default latency and a 10% failure rate.
    pub fn new() -> Self {
        let rng: Box<dyn RandomSource> = Box::new(StdRng::from_entropy());
        Self {
            rng: Mutex::new(rng),
            latency: LatencyProfile::default(),
            failure_rate: DEFAULT_FAILURE_RATE,
            last_error: Mutex::new(None),
        }
    }

    /// Reproducible randomness from a seed.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random_source(StdRng::seed_from_u64(seed))
    }

    /// Replace the random source.
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        let rng: Box<dyn RandomSource> = Box::new(source);
        self.rng = Mutex::new(rng);
        self
    }

    /// Set simulated latency windows.
    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    /// Set failure rate (0.0 - 1.0) for `generate_response`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    fn draw(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_f64()
    }

    fn pick_index(&self, len: usize) -> usize {
        ((self.draw() * len as f64) as usize).min(len.saturating_sub(1))
    }

    async fn simulate_latency(&self, range: LatencyRange) {
        if range.is_empty() {
            return;
        }
        let span = range.max - range.min;
        delay(range.min + span.mul_f64(self.draw())).await;
    }

    fn record_error(&self, message: &str) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }
}

impl Default for SimulatedAiService {
    fn default() -> Self {
        Self::new()
    }
}

fn echo_prompt(prompt: &str) -> String {
    let mut echoed: String = prompt.chars().take(ECHO_LIMIT).collect();
    if prompt.chars().count() > ECHO_LIMIT {
        echoed.push_str("...");
    }
    format!("I understand you're asking about: \"{}\"", echoed)
}

#[async_trait]
impl AiService for SimulatedAiService {
    async fn generate_response(&self, prompt: &str, context: Option<&str>) -> Result<String> {
        self.simulate_latency(self.latency.response).await;

        if self.draw() < self.failure_rate {
            warn!(
                subsystem = "ai",
                component = "mock",
                op = "generate_response",
                "Injecting simulated failure"
            );
            self.record_error(SIMULATED_ERROR_MESSAGE);
            return Err(Error::Simulated(SIMULATED_ERROR_MESSAGE.to_string()));
        }

        let responses = [
            GREETING.to_string(),
            ANALYSIS.to_string(),
            SUMMARY.to_string(),
            echo_prompt(prompt),
            ORGANIZE.to_string(),
            FOLLOW_UP.to_string(),
        ];
        let index = self.pick_index(responses.len());

        debug!(
            subsystem = "ai",
            component = "mock",
            op = "generate_response",
            prompt_len = prompt.len(),
            has_context = context.is_some(),
            index,
            "Simulated response selected"
        );
        Ok(responses[index].clone())
    }

    async fn analyze_note(&self, note_content: &str) -> Result<NoteAnalysis> {
        self.simulate_latency(self.latency.analysis).await;

        let sentiment = Sentiment::ALL[self.pick_index(Sentiment::ALL.len())];
        let tag_count = 2 + self.pick_index(3);
        let ideas = note_content.chars().count().div_ceil(50);

        Ok(NoteAnalysis {
            summary: format!(
                "This note contains {} key ideas about various topics.",
                ideas
            ),
            key_points: KEY_POINTS.iter().map(|p| p.to_string()).collect(),
            suggested_tags: TAG_POOL[..tag_count].iter().map(|t| t.to_string()).collect(),
            sentiment,
        })
    }

    async fn summarize_text(&self, text: &str) -> Result<String> {
        self.simulate_latency(self.latency.summary).await;

        let points = text.chars().count().div_ceil(100);
        Ok(format!(
            "This text discusses {} main points about an important topic. The key ideas include fundamental concepts and practical applications that are relevant to the subject matter.",
            points
        ))
    }

    fn service_status(&self) -> ServiceStatus {
        ServiceStatus {
            available: true,
            rate_limit: None,
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn clear_last_error(&self) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
