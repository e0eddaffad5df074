use super::{Flow, FlowKind, FlowRunner, observer::summarize};
use crate::{
    llm::Prompt,
    schema::{Constraint, Field, FieldKind, Schema},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const SCENE_FALLBACK_DESCRIPTION: &str =
    "Unable to describe the scene due to an internal error. Please try again.";

static IMAGE_DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/[a-zA-Z]+;base64,").expect("invalid image data URI regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRequest {
    pub photo_data_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneResponse {
    pub detailed_description: String,
}

pub static SCENE_REQUEST_SCHEMA: Schema = Schema {
    name: "DescribeDetailedSceneInput",
    description: "A photo of a scene plus the last description given for it",
    fields: &[
        Field {
            name: "photoDataUri",
            kind: FieldKind::String,
            required: true,
            description: "A photo of a scene, as a data URI that must include a MIME type \
                          and use Base64 encoding: 'data:<mimetype>;base64,<encoded_data>'.",
            constraints: &[
                Constraint::MinLength {
                    min: 1,
                    message: "photoDataUri cannot be empty",
                },
                Constraint::Pattern {
                    regex: &IMAGE_DATA_URI,
                    message: "photoDataUri must be a valid base64-encoded image data URI",
                },
            ],
        },
        Field {
            name: "previousDescription",
            kind: FieldKind::String,
            required: false,
            description: "The previous detailed description of the scene, if available.",
            constraints: &[],
        },
    ],
};

pub static SCENE_RESPONSE_SCHEMA: Schema = Schema {
    name: "DescribeDetailedSceneOutput",
    description: "Detailed description of a scene for a visually impaired user",
    fields: &[Field {
        name: "detailedDescription",
        kind: FieldKind::String,
        required: true,
        description: "A comprehensive and detailed textual description of the scene.",
        constraints: &[Constraint::MinLength {
            min: 1,
            message: "Description cannot be empty",
        }],
    }],
};

const SCENE_INSTRUCTIONS: &str = "\
You are an expert at describing visual scenes for visually impaired users. Analyze the provided \
image and describe everything you see in detail.
Mention individual objects, their characteristics (like color, texture, type if discernible), \
their approximate location in the frame (e.g., \"in the foreground\", \"on the left\", \
\"top-right corner\"), and any activities or interactions.
Be as comprehensive as possible, paying attention to both large and small elements. If a person \
is visible, describe their apparent actions or posture if discernible, but avoid guessing \
emotions or identities.
Prioritize describing elements that would be most relevant or interesting for someone who \
cannot see the scene.
Make the description sound natural and engaging.
Return a JSON object with a 'detailedDescription' (string) field.";

/// Describes a camera frame in detail, building on the previous description.
pub struct SceneDescription;

impl Flow for SceneDescription {
    type Request = SceneRequest;
    type Response = SceneResponse;

    const KIND: FlowKind = FlowKind::SceneDescription;

    fn request_schema() -> &'static Schema {
        &SCENE_REQUEST_SCHEMA
    }

    fn response_schema() -> &'static Schema {
        &SCENE_RESPONSE_SCHEMA
    }

    fn render(request: &SceneRequest) -> Prompt {
        let mut text = String::from(SCENE_INSTRUCTIONS);

        if let Some(previous) = request
            .previous_description
            .as_deref()
            .filter(|previous| !previous.is_empty())
        {
            text.push_str(&format!(
                "\n\nThe previous detailed description for a very similar scene was: \"{}\".\n\
                 If the current scene is substantially the same, you can acknowledge this \
                 briefly and then focus on any new or changed elements, or re-iterate key \
                 elements if nothing changed.\n\
                 If the scene is different, describe it fully.",
                previous
            ));
        }

        text.push_str("\n\nImage to describe:");
        Prompt::new("describeDetailedScenePrompt", text).with_media(&request.photo_data_uri)
    }

    fn fallback() -> SceneResponse {
        SceneResponse {
            detailed_description: SCENE_FALLBACK_DESCRIPTION.to_string(),
        }
    }

    fn summarize_request(request: &SceneRequest) -> String {
        format!("photoDataUri={}", summarize(&request.photo_data_uri, 50))
    }

    fn summarize_response(response: &SceneResponse) -> String {
        summarize(&response.detailed_description, 50)
    }
}

impl FlowRunner {
    pub async fn describe_scene(&self, request: &SceneRequest) -> SceneResponse {
        self.run_typed::<SceneDescription>(request).await
    }
}
