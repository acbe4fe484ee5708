//! Conversions between completion requests and the chat completions API.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use tabby_core::{Choice, Completion, CompletionRequest};

use crate::Result;

/// Builds a two-message conversation, system message first.
pub fn chat_request(
    model: &str,
    request: &CompletionRequest,
) -> Result<CreateChatCompletionRequest> {
    let messages: [ChatCompletionRequestMessage; 2] = [
        ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system.as_str())
            .build()?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(request.user.as_str())
            .build()?
            .into(),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .build()?;

    Ok(request)
}

/// Keeps every returned choice with its (possibly absent) content.
pub fn completion(response: CreateChatCompletionResponse) -> Completion {
    let choices = response
        .choices
        .into_iter()
        .map(|choice| Choice {
            content: choice.message.content,
        })
        .collect();

    Completion { choices }
}
