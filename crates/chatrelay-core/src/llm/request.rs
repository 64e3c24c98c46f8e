//! Message-list assembly for the two request shapes.

use chatrelay_types::llm::{ChatCompletionRequest, ChatMessage, Content, ContentPart};
use chatrelay_types::prompt::PromptSet;
use chatrelay_types::turn::Turn;

/// `[system: text prompt + locale suffix] + history + [user: text + user suffix]`.
pub fn text_request(
    model: &str,
    history: &[Turn],
    user_text: &str,
    prompts: &PromptSet,
) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(prompts.text_system()));
    messages.extend(history.iter().cloned().map(ChatMessage::from));
    messages.push(ChatMessage::user(format!("{user_text}{}", prompts.user_suffix)));

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        stream: false,
        temperature: None,
    }
}

/// `[system: image prompt + locale suffix, user: [text part, image part]]`.
pub fn image_request(
    model: &str,
    image_url: &str,
    prompts: &PromptSet,
    temperature: f64,
) -> ChatCompletionRequest {
    let messages = vec![
        ChatMessage::system(prompts.image_system()),
        ChatMessage::user(Content::Multipart(vec![
            ContentPart::text(prompts.image_user_prompt.clone()),
            ContentPart::image(image_url),
        ])),
    ];

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        stream: false,
        temperature: Some(temperature),
    }
}
