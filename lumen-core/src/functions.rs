//! Request / response bodies of the remote functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{BackendError, FunctionInvoker};

pub const CHAT: &str = "chat";
pub const SUMMARIZE: &str = "summarize";
pub const TRANSLATE: &str = "translate";

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SummarizeRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest<'a> {
    pub text: &'a str,
    pub target_language: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translation: Option<String>,
}

pub async fn chat(
    invoker: &(impl FunctionInvoker + ?Sized),
    message: &str,
) -> Result<String, BackendError> {
    let value = invoker.invoke(CHAT, to_body(&ChatRequest { message })?).await?;
    let parsed: ChatResponse = serde_json::from_value(value)?;
    parsed.response.ok_or(BackendError::MissingField("response"))
}

pub async fn summarize(
    invoker: &(impl FunctionInvoker + ?Sized),
    text: &str,
) -> Result<String, BackendError> {
    let value = invoker
        .invoke(SUMMARIZE, to_body(&SummarizeRequest { text })?)
        .await?;
    let parsed: SummarizeResponse = serde_json::from_value(value)?;
    parsed.summary.ok_or(BackendError::MissingField("summary"))
}

pub async fn translate(
    invoker: &(impl FunctionInvoker + ?Sized),
    text: &str,
    target_language: &str,
) -> Result<String, BackendError> {
    let body = to_body(&TranslateRequest {
        text,
        target_language,
    })?;
    let value = invoker.invoke(TRANSLATE, body).await?;
    let parsed: TranslateResponse = serde_json::from_value(value)?;
    parsed
        .translation
        .ok_or(BackendError::MissingField("translation"))
}

fn to_body(request: &impl Serialize) -> Result<Value, BackendError> {
    Ok(serde_json::to_value(request)?)
}
