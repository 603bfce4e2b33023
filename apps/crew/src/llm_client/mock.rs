use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationRequest, Generator, LlmError};

/// A canned reply for one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail { status: u16, message: String },
    Delayed(Duration, String),
}

/// What a call looked like from the generator's side.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: String,
    pub prompt: String,
    pub expected_output: String,
}

/// Test generator: replies are queued per agent role (FIFO) and every call is
/// recorded. A role with no queued reply fails the call.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, role: &str, reply: MockReply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(role.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn reply(&self, role: &str, text: &str) -> &Self {
        self.enqueue(role, MockReply::Text(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompt_for(&self, role: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.role == role)
            .map(|c| c.prompt.clone())
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, LlmError> {
        let role = request.agent.role().to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            role: role.clone(),
            prompt: request.prompt.to_string(),
            expected_output: request.expected_output.to_string(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&role)
            .and_then(|queue| queue.pop_front());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        match reply {
            Some(MockReply::Text(text)) => {
                tokio::task::yield_now().await;
                Ok(text)
            }
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(MockReply::Fail { status, message }) => Err(LlmError::Api { status, message }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

/// Decrements the in-flight counter even when the call is cancelled mid-sleep.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
