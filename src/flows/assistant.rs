use super::{Flow, FlowKind, FlowRunner, observer::summarize};
use crate::{
    llm::Prompt,
    schema::{Constraint, Field, FieldKind, Schema},
};
use serde::{Deserialize, Serialize};

pub const ASSISTANT_FALLBACK_RESPONSE: &str =
    "I'm sorry, Vision Buddy didn't understand that. Could you please try again?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub speech: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub response: String,
}

pub static ASSISTANT_REQUEST_SCHEMA: Schema = Schema {
    name: "PersonalAssistantInput",
    description: "Transcribed user speech and optional location",
    fields: &[
        Field {
            name: "speech",
            kind: FieldKind::String,
            required: true,
            description: "The transcribed speech from the user.",
            constraints: &[Constraint::MinLength {
                min: 1,
                message: "Speech cannot be empty",
            }],
        },
        Field {
            name: "location",
            kind: FieldKind::String,
            required: false,
            description: "The current location of the user (e.g., \"Latitude: 40.71, \
                          Longitude: -74.00\" or \"New York City\").",
            constraints: &[],
        },
    ],
};

pub static ASSISTANT_RESPONSE_SCHEMA: Schema = Schema {
    name: "PersonalAssistantOutput",
    description: "Spoken reply from the assistant",
    fields: &[Field {
        name: "response",
        kind: FieldKind::String,
        required: true,
        description: "The helpful and empathetic response from the personal assistant.",
        constraints: &[Constraint::MinLength {
            min: 1,
            message: "Response cannot be empty",
        }],
    }],
};

/// "Vision Buddy", the voice assistant answering transcribed speech.
pub struct PersonalAssistant;

impl Flow for PersonalAssistant {
    type Request = AssistantRequest;
    type Response = AssistantResponse;

    const KIND: FlowKind = FlowKind::PersonalAssistant;

    fn request_schema() -> &'static Schema {
        &ASSISTANT_REQUEST_SCHEMA
    }

    fn response_schema() -> &'static Schema {
        &ASSISTANT_RESPONSE_SCHEMA
    }

    fn render(request: &AssistantRequest) -> Prompt {
        let mut text = format!(
            "You are \"Vision Buddy\", a friendly and helpful voice assistant for the \
             AssistiveVisions app, designed to help users who may have visual impairments.\n\
             Listen carefully to the user's speech. Respond clearly, concisely, and empathetically.\n\
             If their location is provided and relevant to their query, use it to give a more \
             helpful answer.\n\
             Return a JSON object with a 'response' (string) field.\n\
             \n\
             User's speech: {}\n",
            request.speech
        );

        if let Some(location) = request
            .location
            .as_deref()
            .filter(|location| !location.is_empty())
        {
            text.push_str(&format!("User's current location: {}\n", location));
        }

        text.push_str("\nYour response:");
        Prompt::new("personalAssistantPrompt", text)
    }

    fn fallback() -> AssistantResponse {
        AssistantResponse {
            response: ASSISTANT_FALLBACK_RESPONSE.to_string(),
        }
    }

    fn summarize_request(request: &AssistantRequest) -> String {
        format!("speech={}", request.speech)
    }

    fn summarize_response(response: &AssistantResponse) -> String {
        summarize(&response.response, 50)
    }
}

impl FlowRunner {
    pub async fn personal_assistant(&self, request: &AssistantRequest) -> AssistantResponse {
        self.run_typed::<PersonalAssistant>(request).await
    }
}
