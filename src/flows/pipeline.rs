use super::{
    fsm::{FlowMachine, FlowSignal},
    guard::guard,
    observer::{FlowEvent, FlowObserver},
};
use crate::{
    Result,
    llm::{ModelClient, Prompt},
    schema::Schema,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    ContentRelevance,
    SceneDescription,
    PersonalAssistant,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentRelevance => f.write_str("content_relevance"),
            Self::SceneDescription => f.write_str("scene_description"),
            Self::PersonalAssistant => f.write_str("personal_assistant"),
        }
    }
}

/// One prompt template bound to a request/response schema pair.
pub trait Flow: Send + Sync + 'static {
    type Request: Serialize + DeserializeOwned + Send + Sync;
    type Response: Serialize + DeserializeOwned + Send;

    const KIND: FlowKind;

    fn request_schema() -> &'static Schema;

    fn response_schema() -> &'static Schema;

    fn render(request: &Self::Request) -> Prompt;

    /// Static, schema-valid payload returned whenever the pipeline fails.
    fn fallback() -> Self::Response;

    fn summarize_request(request: &Self::Request) -> String;

    fn summarize_response(response: &Self::Response) -> String;
}

/// Runs flows end to end and absorbs every pipeline failure into the
/// flow's fallback response.
#[derive(Clone)]
pub struct FlowRunner {
    model: Arc<dyn ModelClient>,
    observer: Arc<dyn FlowObserver>,
}

impl FlowRunner {
    pub fn new(model: Arc<dyn ModelClient>, observer: Arc<dyn FlowObserver>) -> Self {
        Self { model, observer }
    }

    /// Validates `input`, invokes the model and guards its output.
    ///
    /// Never fails: any error along the way yields `F::fallback()` and an
    /// error event carrying the original message.
    pub async fn run<F: Flow>(&self, input: Value) -> F::Response {
        let call_id = Uuid::new_v4();
        let mut machine = FlowMachine::new(F::KIND);

        match self.execute::<F>(call_id, &mut machine, &input).await {
            Ok(response) => {
                self.observer.record(FlowEvent::info(
                    call_id,
                    F::KIND,
                    machine.current_state(),
                    format!("{} result: {}", F::KIND, F::summarize_response(&response)),
                ));
                response
            }
            Err(err) => {
                let stage = machine.current_state();
                if let Err(fsm_err) = machine.transition(FlowSignal::Failed) {
                    debug!("Fallback after terminal state: {}", fsm_err);
                }
                self.observer.record(FlowEvent::error(
                    call_id,
                    F::KIND,
                    stage,
                    format!("Error in {}: {}", F::KIND, err),
                ));
                F::fallback()
            }
        }
    }

    /// Typed entry point; the request still goes through schema validation.
    pub async fn run_typed<F: Flow>(&self, request: &F::Request) -> F::Response {
        let input = serde_json::to_value(request).unwrap_or(Value::Null);
        self.run::<F>(input).await
    }

    async fn execute<F: Flow>(
        &self,
        call_id: Uuid,
        machine: &mut FlowMachine,
        input: &Value,
    ) -> Result<F::Response> {
        machine.transition(FlowSignal::Begin)?;
        let request: F::Request = F::request_schema().parse(input)?;

        machine.transition(FlowSignal::InputAccepted)?;
        self.observer.record(FlowEvent::info(
            call_id,
            F::KIND,
            machine.current_state(),
            format!("Processing {}: {}", F::KIND, F::summarize_request(&request)),
        ));

        let prompt = F::render(&request);
        let raw = self.model.generate(&prompt, F::response_schema()).await?;

        machine.transition(FlowSignal::OutputReceived)?;
        let response = guard(F::response_schema(), raw)?;

        machine.transition(FlowSignal::OutputAccepted)?;
        Ok(response)
    }
}
