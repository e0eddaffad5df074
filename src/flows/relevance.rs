use super::{Flow, FlowKind, FlowRunner, observer::summarize};
use crate::{
    llm::Prompt,
    schema::{Constraint, Field, FieldKind, Schema},
};
use serde::{Deserialize, Serialize};

pub const RELEVANCE_FALLBACK_REASON: &str =
    "Failed to evaluate content relevance due to an internal error.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceRequest {
    pub query: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceResponse {
    pub is_relevant: bool,
    pub reason: String,
}

pub static RELEVANCE_REQUEST_SCHEMA: Schema = Schema {
    name: "ContentRelevanceInput",
    description: "Web content to check against a user query",
    fields: &[
        Field {
            name: "query",
            kind: FieldKind::String,
            required: true,
            description: "The user query or topic of interest.",
            constraints: &[Constraint::MinLength {
                min: 1,
                message: "Query cannot be empty",
            }],
        },
        Field {
            name: "content",
            kind: FieldKind::String,
            required: true,
            description: "The web content to evaluate for relevance.",
            constraints: &[Constraint::MinLength {
                min: 1,
                message: "Content cannot be empty",
            }],
        },
    ],
};

pub static RELEVANCE_RESPONSE_SCHEMA: Schema = Schema {
    name: "ContentRelevanceOutput",
    description: "Relevance verdict with its reasoning",
    fields: &[
        Field {
            name: "isRelevant",
            kind: FieldKind::Boolean,
            required: true,
            description: "Whether the content is relevant to the query.",
            constraints: &[],
        },
        Field {
            name: "reason",
            kind: FieldKind::String,
            required: true,
            description: "The reason for the relevance determination.",
            constraints: &[Constraint::MinLength {
                min: 1,
                message: "Reason cannot be empty",
            }],
        },
    ],
};

/// Decides whether a piece of web content is worth presenting for a query.
pub struct ContentRelevance;

impl Flow for ContentRelevance {
    type Request = RelevanceRequest;
    type Response = RelevanceResponse;

    const KIND: FlowKind = FlowKind::ContentRelevance;

    fn request_schema() -> &'static Schema {
        &RELEVANCE_REQUEST_SCHEMA
    }

    fn response_schema() -> &'static Schema {
        &RELEVANCE_RESPONSE_SCHEMA
    }

    fn render(request: &RelevanceRequest) -> Prompt {
        let text = format!(
            "You are an AI assistant that determines whether a given piece of web content is \
             relevant to a user's query or topic of interest.\n\
             \n\
             Query: {}\n\
             Content: {}\n\
             \n\
             Determine if the content is relevant to the query. Explain your reasoning.\n\
             Return a JSON object with 'isRelevant' (boolean) and 'reason' (string) fields.",
            request.query, request.content
        );
        Prompt::new("contentRelevancePrompt", text)
    }

    fn fallback() -> RelevanceResponse {
        RelevanceResponse {
            is_relevant: false,
            reason: RELEVANCE_FALLBACK_REASON.to_string(),
        }
    }

    fn summarize_request(request: &RelevanceRequest) -> String {
        format!("query={}", request.query)
    }

    fn summarize_response(response: &RelevanceResponse) -> String {
        format!(
            "isRelevant={} reason={}",
            response.is_relevant,
            summarize(&response.reason, 50)
        )
    }
}

impl FlowRunner {
    pub async fn is_content_relevant(&self, request: &RelevanceRequest) -> RelevanceResponse {
        self.run_typed::<ContentRelevance>(request).await
    }
}
