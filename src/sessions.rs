// src/sessions.rs

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{Mutex, RwLock},
    task::{AbortHandle, JoinHandle},
};
use uuid::Uuid;

use crate::{
    config::DEFAULT_SESSION_TTL,
    error::AppError,
    quiz::{GradeOutcome, Generated, ParseFailure, Quiz, QuizGenerator, QuizSession},
};

const SUPERSEDED_MESSAGE: &str = "Superseded by a newer topic submission";
const ENDED_MESSAGE: &str = "Session ended before the quiz was ready";

/// State kept for one browser session. Nothing here outlives the process.
#[derive(Debug)]
struct SessionSlot {
    quiz: QuizSession,
    /// Bumped on every topic submission; only the newest may load its result.
    epoch: u64,
    in_flight: Option<AbortHandle>,
    /// Set once the slot leaves the store, by deletion or expiry.
    ended: bool,
    created_at: DateTime<Utc>,
    loaded_at: Option<DateTime<Utc>>,
    last_active: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            quiz: QuizSession::new(),
            epoch: 0,
            in_flight: None,
            ended: false,
            created_at: Utc::now(),
            loaded_at: None,
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn end(&mut self) {
        self.ended = true;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Aborts the wrapped task when dropped unless disarmed first.
///
/// Held across the await in `submit_topic`, so a request future dropped by a
/// client disconnect takes its generation task down with it.
struct AbortOnDrop(Option<AbortHandle>);

impl AbortOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

/// Outcome of a topic submission that was not superseded.
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub generated: Generated,
    pub loaded: Result<Quiz, ParseFailure>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// The quiz currently loaded in a session.
#[derive(Debug, Clone)]
pub struct LoadedQuiz {
    pub quiz: Quiz,
    pub loaded_at: DateTime<Utc>,
}

/// In-memory registry of quiz sessions keyed by id.
///
/// Sessions idle for longer than the TTL are swept on `create` and by the
/// background sweeper.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Mutex<SessionSlot>>>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
        }
    }

    pub async fn create(&self) -> (Uuid, DateTime<Utc>) {
        self.sweep_expired().await;

        let id = Uuid::new_v4();
        let slot = SessionSlot::new();
        let created_at = slot.created_at;
        self.inner
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(slot)));
        tracing::info!(session = %id, "Session created");
        (id, created_at)
    }

    /// Ends a session, cancelling any generation still running for it.
    pub async fn remove(&self, id: Uuid) -> bool {
        let Some(slot) = self.inner.write().await.remove(&id) else {
            return false;
        };
        slot.lock().await.end();
        tracing::info!(session = %id, "Session ended");
        true
    }

    /// Drops sessions idle for longer than the TTL and returns how many went.
    ///
    /// A slot locked by a running request is in use and stays.
    pub async fn sweep_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|id, slot| {
            let Ok(mut guard) = slot.try_lock() else {
                return true;
            };
            if guard.last_active.elapsed() < ttl {
                return true;
            }
            guard.end();
            tracing::info!(session = %id, "Session expired");
            false
        });
        before - map.len()
    }

    /// Runs `sweep_expired` every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let swept = store.sweep_expired().await;
                if swept > 0 {
                    tracing::debug!(swept, "Expired sessions removed");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    async fn slot(&self, id: Uuid) -> Result<Arc<Mutex<SessionSlot>>, AppError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Generates a quiz for `topic` and loads it into the session.
    ///
    /// A newer submission for the same session aborts this one; the caller of
    /// the superseded request gets `AppError::Conflict` and the session keeps
    /// whatever the newest submission loads. If the session is deleted or
    /// expires meanwhile the caller gets `AppError::NotFound`.
    pub async fn submit_topic(
        &self,
        id: Uuid,
        generator: &QuizGenerator,
        topic: &str,
    ) -> Result<TopicOutcome, AppError> {
        let slot = self.slot(id).await?;

        let (epoch, task) = {
            let mut guard = slot.lock().await;
            if let Some(previous) = guard.in_flight.take() {
                tracing::info!(session = %id, "Cancelling stale quiz generation");
                previous.abort();
            }
            guard.epoch += 1;
            guard.touch();

            let generator = generator.clone();
            let topic = topic.to_owned();
            let task = tokio::spawn(async move { generator.generate(&topic).await });
            guard.in_flight = Some(task.abort_handle());

            (guard.epoch, task)
        };

        let cancel_on_drop = AbortOnDrop(Some(task.abort_handle()));
        let joined = task.await;
        cancel_on_drop.disarm();

        let mut guard = slot.lock().await;
        if guard.ended {
            return Err(AppError::NotFound(ENDED_MESSAGE.to_string()));
        }
        let generated = match joined {
            Ok(generated) => generated,
            Err(e) if e.is_cancelled() => {
                return Err(AppError::Conflict(SUPERSEDED_MESSAGE.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if guard.epoch != epoch {
            return Err(AppError::Conflict(SUPERSEDED_MESSAGE.to_string()));
        }
        guard.in_flight = None;
        guard.touch();

        let loaded = guard.quiz.load(generated.text()).cloned();
        guard.loaded_at = loaded.as_ref().ok().map(|_| Utc::now());

        match &loaded {
            Ok(quiz) => {
                tracing::info!(session = %id, questions = quiz.len(), "Quiz loaded")
            }
            Err(e) => tracing::warn!(session = %id, "Quiz not loaded: {:?}", e),
        }

        Ok(TopicOutcome {
            generated,
            loaded,
            loaded_at: guard.loaded_at,
        })
    }

    pub async fn current_quiz(&self, id: Uuid) -> Result<Option<LoadedQuiz>, AppError> {
        let slot = self.slot(id).await?;
        let mut guard = slot.lock().await;
        guard.touch();
        let loaded_at = guard.loaded_at;
        Ok(guard
            .quiz
            .current()
            .cloned()
            .zip(loaded_at)
            .map(|(quiz, loaded_at)| LoadedQuiz { quiz, loaded_at }))
    }

    pub async fn grade(
        &self,
        id: Uuid,
        submissions: &[Option<String>],
    ) -> Result<GradeOutcome, AppError> {
        let slot = self.slot(id).await?;
        let outcome = {
            let mut guard = slot.lock().await;
            guard.touch();
            guard.quiz.grade(submissions)
        };
        if let GradeOutcome::Scored(score) = &outcome {
            tracing::info!(session = %id, "Graded: {}", score.summary());
        }
        Ok(outcome)
    }
}
