//! Posting gate — interval + daily-quota admission control for the external
//! posting side effect.
//!
//! The gate owns the posting budget: a minimum interval between posts and a
//! per-calendar-day quota (local time, not a rolling 24 h window). It also
//! applies a best-effort content-suitability filter and fits accepted text
//! to the transport's length limit. Gate state is process-lifetime only; a
//! restart restarts the budget window.

mod format;
mod http;

pub use format::fit_to_limit;
pub use http::{HttpPostTransport, NullTransport};

use chrono::{DateTime, Duration, Local, NaiveDate};
use driftmind_core::{PostTransport, RecordKind};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Time source for the gate. Injected so tests can drive the calendar.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// The budget policy the gate enforces.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub enabled: bool,

    /// Minimum spacing between two successful posts
    pub min_interval: Duration,

    /// Maximum successful posts per local calendar day
    pub daily_limit: u32,

    /// Character limit of the posting service
    pub length_limit: usize,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: Duration::seconds(3600),
            daily_limit: 6,
            length_limit: 280,
        }
    }
}

/// What came out of an emission attempt. Every variant is non-fatal.
#[derive(Debug, Clone)]
pub enum EmitOutcome {
    /// The transport accepted the post
    Posted { id: Option<String>, text: String },

    /// The budget or the suitability filter said no
    Skipped { reason: String },

    /// The transport call failed
    Failed { error: String },
}

impl EmitOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, EmitOutcome::Posted { .. })
    }
}

// Suitability heuristics. Best-effort filtering, not correctness-critical.
const MIN_LENGTH: usize = 20;
const STANDALONE_LENGTH: usize = 120;
const ERROR_MARKERS: [&str; 4] = ["error", "failed", "exception", "traceback"];
const SHARE_KEYWORDS: [&str; 8] = [
    "create", "imagine", "wonder", "dream", "art", "story", "poem", "idea",
];

/// The rate-limited posting gate.
pub struct RateGate {
    transport: Arc<dyn PostTransport>,
    clock: Box<dyn Clock>,
    policy: GatePolicy,
    last_emit: Option<DateTime<Local>>,
    emits_today: u32,
    /// Which local calendar day `emits_today` counts for
    last_day: Option<NaiveDate>,
}

impl RateGate {
    pub fn new(transport: Arc<dyn PostTransport>, policy: GatePolicy) -> Self {
        Self {
            transport,
            clock: Box::new(SystemClock),
            policy,
            last_emit: None,
            emits_today: 0,
            last_day: None,
        }
    }

    /// Replace the time source (tests drive a manual clock through this).
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Why an emission would be denied right now, if it would be.
    fn deny_reason(&self, now: DateTime<Local>) -> Option<&'static str> {
        if !self.policy.enabled {
            return Some("posting disabled");
        }

        if let Some(last) = self.last_emit
            && now.signed_duration_since(last) < self.policy.min_interval
        {
            return Some("minimum interval not met");
        }

        let today_count = match self.last_day {
            Some(day) if day == now.date_naive() => self.emits_today,
            _ => 0,
        };
        if today_count >= self.policy.daily_limit {
            return Some("daily limit reached");
        }

        None
    }

    /// Whether the budget currently admits an emission.
    pub fn can_emit(&self) -> bool {
        self.deny_reason(self.clock.now()).is_none()
    }

    /// Content-suitability filter.
    ///
    /// Rejects short text and anything carrying operational-error markers.
    /// Creative kinds pass unconditionally after that; everything else needs
    /// a keyword hit or enough length to stand on its own.
    pub fn should_emit(&self, content: &str, kind: RecordKind) -> bool {
        let trimmed = content.trim();
        if trimmed.chars().count() < MIN_LENGTH {
            return false;
        }

        let lower = trimmed.to_lowercase();
        if ERROR_MARKERS.iter().any(|m| lower.contains(m)) {
            return false;
        }

        if matches!(
            kind,
            RecordKind::Curiosity | RecordKind::Achievement | RecordKind::Reflection
        ) {
            return true;
        }

        if SHARE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return true;
        }

        trimmed.chars().count() > STANDALONE_LENGTH
    }

    /// Attempt an emission: re-check the budget, fit the text to the length
    /// limit, call the transport, and advance the budget on success.
    pub async fn emit(&mut self, content: &str, kind: RecordKind) -> EmitOutcome {
        let now = self.clock.now();

        if let Some(reason) = self.deny_reason(now) {
            debug!(reason, ?kind, "Emission skipped");
            return EmitOutcome::Skipped {
                reason: reason.into(),
            };
        }

        let text = fit_to_limit(content, self.policy.length_limit);
        match self.transport.post(&text).await {
            Ok(receipt) => {
                let today = now.date_naive();
                self.emits_today = match self.last_day {
                    Some(day) if day == today => self.emits_today + 1,
                    _ => 1,
                };
                self.last_day = Some(today);
                self.last_emit = Some(now);

                info!(
                    transport = self.transport.name(),
                    emits_today = self.emits_today,
                    chars = text.chars().count(),
                    "Posted"
                );
                EmitOutcome::Posted {
                    id: receipt.id,
                    text,
                }
            }
            Err(e) => {
                warn!(error = %e, "Posting transport failed");
                EmitOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Posts counted against today's quota (0 if the day has rolled over).
    pub fn emits_today(&self) -> u32 {
        match self.last_day {
            Some(day) if day == self.clock.now().date_naive() => self.emits_today,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use driftmind_core::{PostReceipt, TransportError};
    use std::sync::Mutex;

    /// Transport that records every post; optionally fails.
    struct MockTransport {
        posts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                posts: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                posts: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PostTransport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn post(&self, text: &str) -> Result<PostReceipt, TransportError> {
            if self.fail {
                return Err(TransportError::Network("connection reset".into()));
            }
            self.posts.lock().unwrap().push(text.to_string());
            Ok(PostReceipt {
                id: Some("post-1".into()),
            })
        }
    }

    /// A clock the test advances by hand.
    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<DateTime<Local>>>);

    impl ManualClock {
        fn at_noon() -> Self {
            let start = Local.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
            Self(Arc::new(Mutex::new(start)))
        }

        fn advance(&self, delta: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += delta;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.0.lock().unwrap()
        }
    }

    fn policy_ms(min_interval_ms: i64, daily_limit: u32) -> GatePolicy {
        GatePolicy {
            enabled: true,
            min_interval: Duration::milliseconds(min_interval_ms),
            daily_limit,
            length_limit: 280,
        }
    }

    const LONG_ENOUGH: &str = "a thought that is comfortably past the minimum length";

    #[tokio::test]
    async fn interval_then_daily_limit_deny_in_order() {
        let transport = MockTransport::new();
        let clock = ManualClock::at_noon();
        let mut gate = RateGate::new(transport.clone(), policy_ms(1000, 1))
            .with_clock(Box::new(clock.clone()));

        // First emission goes through
        assert!(gate.emit(LONG_ENOUGH, RecordKind::Thought).await.is_posted());

        // Immediately again: the interval has not elapsed
        match gate.emit(LONG_ENOUGH, RecordKind::Thought).await {
            EmitOutcome::Skipped { reason } => assert!(reason.contains("interval")),
            other => panic!("expected interval skip, got {other:?}"),
        }

        // After the interval the daily quota is the binding constraint
        clock.advance(Duration::milliseconds(1000));
        match gate.emit(LONG_ENOUGH, RecordKind::Thought).await {
            EmitOutcome::Skipped { reason } => assert!(reason.contains("daily limit")),
            other => panic!("expected daily-limit skip, got {other:?}"),
        }

        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn quota_resets_on_calendar_day_change() {
        let transport = MockTransport::new();
        let clock = ManualClock::at_noon();
        let mut gate = RateGate::new(transport.clone(), policy_ms(1000, 1))
            .with_clock(Box::new(clock.clone()));

        assert!(gate.emit(LONG_ENOUGH, RecordKind::Thought).await.is_posted());
        assert_eq!(gate.emits_today(), 1);

        // Crossing midnight resets the day count
        clock.advance(Duration::hours(13));
        assert_eq!(gate.emits_today(), 0);
        assert!(gate.emit(LONG_ENOUGH, RecordKind::Thought).await.is_posted());
        assert_eq!(transport.count(), 2);
    }

    #[tokio::test]
    async fn emits_today_never_exceeds_daily_limit() {
        let transport = MockTransport::new();
        let clock = ManualClock::at_noon();
        let mut gate = RateGate::new(transport.clone(), policy_ms(10, 3))
            .with_clock(Box::new(clock.clone()));

        for _ in 0..20 {
            gate.emit(LONG_ENOUGH, RecordKind::Thought).await;
            clock.advance(Duration::milliseconds(10));
        }

        assert!(gate.emits_today() <= 3);
        assert_eq!(transport.count(), 3);
    }

    #[tokio::test]
    async fn disabled_gate_skips_everything() {
        let transport = MockTransport::new();
        let mut gate = RateGate::new(
            transport.clone(),
            GatePolicy {
                enabled: false,
                ..GatePolicy::default()
            },
        );

        assert!(!gate.can_emit());
        match gate.emit(LONG_ENOUGH, RecordKind::Curiosity).await {
            EmitOutcome::Skipped { reason } => assert!(reason.contains("disabled")),
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_does_not_spend_budget() {
        let transport = MockTransport::failing();
        let clock = ManualClock::at_noon();
        let mut gate =
            RateGate::new(transport, policy_ms(1000, 1)).with_clock(Box::new(clock.clone()));

        match gate.emit(LONG_ENOUGH, RecordKind::Thought).await {
            EmitOutcome::Failed { error } => assert!(error.contains("connection reset")),
            other => panic!("expected failure, got {other:?}"),
        }

        // The failed attempt did not advance the budget
        assert_eq!(gate.emits_today(), 0);
        assert!(gate.can_emit());
    }

    #[tokio::test]
    async fn emitted_text_respects_length_limit() {
        let transport = MockTransport::new();
        let mut gate = RateGate::new(
            transport.clone(),
            GatePolicy {
                length_limit: 40,
                ..GatePolicy::default()
            },
        );

        let rambling = "word ".repeat(100);
        assert!(gate.emit(&rambling, RecordKind::Thought).await.is_posted());
        let posts = transport.posts.lock().unwrap();
        assert!(posts[0].chars().count() <= 40);
    }

    #[test]
    fn suitability_rejects_short_and_error_text() {
        let gate = RateGate::new(MockTransport::new(), GatePolicy::default());

        assert!(!gate.should_emit("too short", RecordKind::Curiosity));
        assert!(!gate.should_emit(
            "the command failed with a strange exit code today",
            RecordKind::Curiosity
        ));
    }

    #[test]
    fn suitability_accepts_creative_kinds_unconditionally() {
        let gate = RateGate::new(MockTransport::new(), GatePolicy::default());

        let plain = "the afternoon light moved across the desk slowly";
        assert!(gate.should_emit(plain, RecordKind::Curiosity));
        assert!(gate.should_emit(plain, RecordKind::Achievement));
        assert!(gate.should_emit(plain, RecordKind::Reflection));
    }

    #[test]
    fn suitability_for_plain_thoughts_needs_keyword_or_length() {
        let gate = RateGate::new(MockTransport::new(), GatePolicy::default());

        // No keyword, short of the standalone threshold
        assert!(!gate.should_emit(
            "the afternoon light moved across the desk slowly",
            RecordKind::Thought
        ));

        // A keyword is enough
        assert!(gate.should_emit(
            "there is a poem hiding somewhere in this log file",
            RecordKind::Thought
        ));

        // Long enough stands on its own
        let long = "and ".repeat(40);
        assert!(gate.should_emit(&long, RecordKind::Thought));
    }
}
