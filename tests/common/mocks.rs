use assistive_flows::{
    Error, Result,
    flows::{EventLevel, FlowEvent, FlowObserver},
    llm::{ModelClient, Prompt},
    schema::Schema,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum StubReply {
    Output(Value),
    Absent,
    Fail(String),
}

/// Deterministic model stub that always gives the same reply
#[derive(Debug)]
pub struct StubModelClient {
    pub reply: StubReply,
    pub delay: Option<Duration>,
    pub prompts: Arc<Mutex<Vec<Prompt>>>,
    pub schemas: Arc<Mutex<Vec<&'static str>>>,
}

impl StubModelClient {
    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
            schemas: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn returning(output: Value) -> Self {
        Self::new(StubReply::Output(output))
    }

    pub fn absent() -> Self {
        Self::new(StubReply::Absent)
    }

    pub fn failing(error: &str) -> Self {
        Self::new(StubReply::Fail(error.to_string()))
    }

    pub fn timing_out() -> Self {
        Self::failing("model call timed out after 30s")
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Prompt {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("model was never called")
    }

    pub fn schemas(&self) -> Vec<&'static str> {
        self.schemas.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn generate(
        &self,
        prompt: &Prompt,
        output_schema: &'static Schema,
    ) -> Result<Option<Value>> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.schemas.lock().unwrap().push(output_schema.name);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            StubReply::Output(value) => Ok(Some(value.clone())),
            StubReply::Absent => Ok(None),
            StubReply::Fail(message) => Err(Error::remote(message.clone())),
        }
    }
}

/// In-memory observer that keeps every recorded event
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<FlowEvent>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<FlowEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == EventLevel::Error)
            .collect()
    }
}

impl FlowObserver for MemoryObserver {
    fn record(&self, event: FlowEvent) {
        self.events.lock().unwrap().push(event);
    }
}
