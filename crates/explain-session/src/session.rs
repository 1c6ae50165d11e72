//! [`Session`] -- one invocation's worth of queue work.
//!
//! The queue is handed in after loading and handed back with
//! [`Session::into_queue`] for saving; the session itself never persists.

use chrono::Utc;
use tracing::{debug, info, warn};

use explain_core::{
    NormalizedTopic, Normalizer, Topic, TopicKind, TopicState, parse_topics, route,
};
use explain_storage::TopicQueue;

use crate::error::{Result, SessionError};
use crate::explainer::{Explainer, Explanation};

/// Result of [`Session::seed`].
#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub topic: NormalizedTopic,
    pub explanation: Explanation,
    /// Number of follow-up topics newly queued.
    pub added: usize,
}

/// Result of [`Session::next`].
#[derive(Debug, Clone)]
pub enum NextOutcome {
    /// The front topic was skipped.
    Skipped {
        topic: Topic,
        /// The topic the next `next` will explain.
        up_next: Option<Topic>,
    },
    /// The front topic was explained and marked done.
    Explained {
        topic: Topic,
        explanation: Explanation,
        added: usize,
    },
}

/// Drives parsing, queueing and dispatch around an [`Explainer`].
#[derive(Debug)]
pub struct Session {
    queue: TopicQueue,
    normalizer: Normalizer,
}

impl Session {
    pub fn new(queue: TopicQueue, normalizer: Normalizer) -> Self {
        Self { queue, normalizer }
    }

    pub fn queue(&self) -> &TopicQueue {
        &self.queue
    }

    /// Ends the session, returning the (possibly modified) queue.
    pub fn into_queue(self) -> TopicQueue {
        self.queue
    }

    /// Explains a user-chosen target, records it as done and queues the
    /// follow-ups it surfaces with the seed's key as their source.
    ///
    /// On failure the queue is untouched.
    pub fn seed(
        &mut self,
        kind: TopicKind,
        target: &str,
        explainer: &mut dyn Explainer,
    ) -> Result<SeedOutcome> {
        let normalized = self
            .normalizer
            .normalize(&kind, target)
            .map_err(|source| SessionError::InvalidTarget {
                kind: kind.to_string(),
                target: target.to_string(),
                source,
            })?;

        let probe = Topic {
            kind: normalized.kind.clone(),
            target: normalized.target.clone(),
            title: String::new(),
            source_ref: None,
            state: TopicState::Pending,
            order: self.queue.next_order(),
            added_at: Utc::now(),
        };
        let route = route(&probe)?;
        info!(key = %normalized.key, handler = route.handler_name(), "seeding");

        let explanation =
            explainer
                .explain(&route)
                .map_err(|source| SessionError::ExplanationFailed {
                    key: normalized.key.clone(),
                    source,
                })?;

        self.queue.record_seed(normalized.clone());
        let added = self.enqueue_from_text(&explanation.text, &normalized.key);

        Ok(SeedOutcome {
            topic: normalized,
            explanation,
            added,
        })
    }

    /// Processes the earliest pending topic.
    ///
    /// With `skip` the topic is marked skipped without explaining it.
    /// Otherwise it is routed and explained; follow-ups are queued with its
    /// key as source and it is marked done. If routing or the explanation
    /// fails the topic stays pending and the error is returned.
    pub fn next(&mut self, skip: bool, explainer: &mut dyn Explainer) -> Result<NextOutcome> {
        let front = self.queue.pop_front()?.clone();
        let key = front.canonical_key();

        if skip {
            self.queue.mark_skipped(&key)?;
            info!(%key, "skipped");
            return Ok(NextOutcome::Skipped {
                topic: self.finished(&key, front),
                up_next: self.queue.pop_front().ok().cloned(),
            });
        }

        let route = route(&front).inspect_err(|e| warn!(%key, error = %e, "cannot route topic"))?;
        info!(%key, handler = route.handler_name(), "explaining");

        let explanation =
            explainer
                .explain(&route)
                .map_err(|source| SessionError::ExplanationFailed {
                    key: key.clone(),
                    source,
                })?;

        let added = self.enqueue_from_text(&explanation.text, &key);
        self.queue.mark_done(&key)?;

        Ok(NextOutcome::Explained {
            topic: self.finished(&key, front),
            explanation,
            added,
        })
    }

    /// Read-only view of the queue.
    pub fn topics(&self, include_all: bool) -> Vec<&Topic> {
        self.queue.all(include_all)
    }

    /// Parses `text` for follow-up topics and queues the new ones with
    /// `source` as their origin. Returns how many were inserted.
    ///
    /// All candidates are parsed and normalized before the first insert.
    pub fn enqueue_from_text(&mut self, text: &str, source: &str) -> usize {
        let candidates = parse_topics(text);
        let topics = self.normalizer.normalize_all(&candidates);
        debug!(
            %source,
            candidates = candidates.len(),
            normalized = topics.len(),
            "parsed follow-up topics"
        );
        topics
            .into_iter()
            .filter(|topic| self.queue.enqueue(topic.clone(), Some(source)))
            .count()
    }

    fn finished(&self, key: &str, fallback: Topic) -> Topic {
        self.queue.get(key).cloned().unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use explain_core::Route;
    use explain_storage::{MemoryStore, QueueStorage};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ExplainError;

    /// Replies with canned results in order and records every route.
    #[derive(Default)]
    struct Scripted {
        replies: VecDeque<std::result::Result<String, ExplainError>>,
        routes: Vec<Route>,
    }

    impl Scripted {
        fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                replies: replies.into_iter().map(|r| Ok(r.to_string())).collect(),
                routes: Vec::new(),
            }
        }

        fn then_fail(mut self) -> Self {
            self.replies
                .push_back(Err(ExplainError::model("fake", "exit status 1")));
            self
        }
    }

    impl Explainer for Scripted {
        fn explain(&mut self, route: &Route) -> std::result::Result<Explanation, ExplainError> {
            self.routes.push(route.clone());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
                .map(Explanation::new)
        }
    }

    const THREE_TOPICS: &str = "\
Overview of the project.

## Topics to Explore

- src/auth/client.py
- src/router.py:ComplexityRouter
- refactor the retry logic
";

    fn session() -> Session {
        Session::new(TopicQueue::new(), Normalizer::new())
    }

    fn pending_keys(s: &Session) -> Vec<String> {
        s.topics(false).iter().map(|t| t.canonical_key()).collect()
    }

    #[test]
    fn three_entry_walkthrough() {
        let mut s = session();
        assert_eq!(s.enqueue_from_text(THREE_TOPICS, "repo:."), 3);
        let kinds: Vec<TopicKind> = s.topics(false).iter().map(|t| t.kind.clone()).collect();
        assert_eq!(kinds, [TopicKind::File, TopicKind::Function, TopicKind::General]);

        let mut explainer = Scripted::replying(["no follow-ups", "none here either"]);
        s.next(false, &mut explainer).unwrap();
        s.next(false, &mut explainer).unwrap();

        let pending = s.topics(false);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order, 2);
        assert_eq!(pending[0].kind, TopicKind::General);
        assert_eq!(
            explainer.routes,
            [
                Route::File {
                    path: "src/auth/client.py".into()
                },
                Route::Function {
                    path: "src/router.py".into(),
                    symbol: "ComplexityRouter".into()
                },
            ]
        );
    }

    #[test]
    fn seed_records_itself_and_sources_follow_ups() {
        let mut s = session();
        let mut explainer = Scripted::replying([THREE_TOPICS]);
        let outcome = s.seed(TopicKind::Repo, "./", &mut explainer).unwrap();

        assert_eq!(outcome.topic.key, "repo:.");
        assert_eq!(outcome.added, 3);
        assert_eq!(explainer.routes, [Route::Repo { path: ".".into() }]);

        let seed = s.queue().get("repo:.").unwrap();
        assert_eq!(seed.state, TopicState::Done);
        assert_eq!(seed.source_ref, None);
        assert!(
            s.topics(false)
                .iter()
                .all(|t| t.source_ref.as_deref() == Some("repo:."))
        );
    }

    #[test]
    fn failed_seed_leaves_queue_untouched() {
        let mut s = session();
        let mut explainer = Scripted::default().then_fail();
        let err = s.seed(TopicKind::File, "src/a.py", &mut explainer).unwrap_err();
        assert!(err.is_explanation_failed());
        assert!(s.queue().is_empty());
        assert!(!s.queue().is_dirty());
    }

    #[test]
    fn invalid_seed_target_is_rejected() {
        let mut s = session();
        let mut explainer = Scripted::default();
        let err = s
            .seed(TopicKind::Function, "src/a.py", &mut explainer)
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTarget { .. }));
        assert!(explainer.routes.is_empty());
    }

    #[test]
    fn failed_explanation_keeps_topic_pending() {
        let mut s = session();
        s.enqueue_from_text(THREE_TOPICS, "repo:.");

        let mut failing = Scripted::default().then_fail();
        let err = s.next(false, &mut failing).unwrap_err();
        assert!(err.is_explanation_failed());
        assert_eq!(pending_keys(&s).len(), 3);

        let mut ok = Scripted::replying(["fine"]);
        match s.next(false, &mut ok).unwrap() {
            NextOutcome::Explained { topic, .. } => {
                assert_eq!(topic.canonical_key(), "file:src/auth/client.py");
                assert_eq!(topic.state, TopicState::Done);
            }
            other => panic!("expected Explained, got {other:?}"),
        }
    }

    #[test]
    fn first_source_wins() {
        let mut s = session();
        let text = "## Topics to Explore\n- src/a.py\n";
        assert_eq!(s.enqueue_from_text(text, "repo:."), 1);
        assert_eq!(s.enqueue_from_text(text, "file:src/b.py"), 0);
        let topics = s.topics(true);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].source_ref.as_deref(), Some("repo:."));
    }

    #[test]
    fn next_sources_follow_ups_with_its_own_key() {
        let mut s = session();
        s.enqueue_from_text("## Topics to Explore\n- src/a.py\n", "repo:.");
        let mut explainer = Scripted::replying(["## Topics to Explore\n- src/b.py\n- src/a.py\n"]);
        match s.next(false, &mut explainer).unwrap() {
            NextOutcome::Explained { added, .. } => assert_eq!(added, 1),
            other => panic!("expected Explained, got {other:?}"),
        }
        let b = s.queue().get("file:src/b.py").unwrap();
        assert_eq!(b.source_ref.as_deref(), Some("file:src/a.py"));
    }

    #[test]
    fn skip_reports_up_next() {
        let mut s = session();
        s.enqueue_from_text(THREE_TOPICS, "repo:.");
        let mut explainer = Scripted::default();
        match s.next(true, &mut explainer).unwrap() {
            NextOutcome::Skipped { topic, up_next } => {
                assert_eq!(topic.state, TopicState::Skipped);
                assert_eq!(
                    up_next.map(|t| t.canonical_key()).as_deref(),
                    Some("function:src/router.py:ComplexityRouter")
                );
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
        assert!(explainer.routes.is_empty());
    }

    #[test]
    fn skip_on_empty_queue_writes_nothing() {
        let store = MemoryStore::with_contents(r#"{"topics":[]}"#);
        let mut s = Session::new(TopicQueue::load(&store).unwrap(), Normalizer::new());
        let err = s.next(true, &mut Scripted::default()).unwrap_err();
        assert!(err.is_empty_queue());

        let mut queue = s.into_queue();
        assert!(!queue.save(&store).unwrap());
        assert_eq!(store.writes(), 0);
        assert_eq!(store.load_raw().unwrap().as_deref(), Some(r#"{"topics":[]}"#));
    }

    #[test]
    fn unroutable_topic_stays_pending() {
        let store = MemoryStore::with_contents(
            r#"{"topics":[{"kind":"module","target":"src/db","state":"pending","order":0}]}"#,
        );
        let mut s = Session::new(TopicQueue::load(&store).unwrap(), Normalizer::new());
        let mut explainer = Scripted::default();
        let err = s.next(false, &mut explainer).unwrap_err();
        assert!(err.is_unroutable());
        assert!(explainer.routes.is_empty());
        assert_eq!(pending_keys(&s), ["module:src/db"]);

        // The user can still skip past it.
        assert!(matches!(
            s.next(true, &mut explainer).unwrap(),
            NextOutcome::Skipped { up_next: None, .. }
        ));
    }

    #[test]
    fn closures_are_explainers() {
        let mut s = session();
        s.enqueue_from_text("## Topics to Explore\n- how errors propagate\n", "repo:.");
        let mut seen = Vec::new();
        let mut explainer = |route: &Route| {
            seen.push(route.handler_name());
            Ok::<_, ExplainError>(Explanation::new("done"))
        };
        s.next(false, &mut explainer).unwrap();
        assert_eq!(seen, ["general"]);
    }
}
