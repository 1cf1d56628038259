// API client module: a small blocking HTTP client for the ChatPDF API.
// Every call is a single request/response exchange authenticated with a
// static `x-api-key` header.

use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "x-api-key";

/// Blocking API client holding the reqwest client, the base URL and the
/// API key sent with every request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Response shape of both source endpoints.
#[derive(Serialize, Deserialize, Debug)]
pub struct Source {
    #[serde(rename = "sourceId", default)]
    pub source_id: String,
}

/// A registered source together with the raw body the server returned.
#[derive(Debug)]
pub struct AddedSource {
    pub source_id: String,
    pub raw_body: String,
}

/// Body of `POST /sources/add-url`.
#[derive(Serialize, Deserialize, Debug)]
pub struct AddUrlRequest {
    pub url: String,
}

/// Speaker of a chat message, sent as `"user"` or `"assistant"`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the chat history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /chats/message`. The full history is sent every turn.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub source_id: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

impl ApiClient {
    /// Create a client for the given config. No request timeout is set:
    /// streamed answers can take arbitrarily long.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("HTTPクライアントの作成に失敗しました")?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn key_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&self.api_key).context("APIキーに使用できない文字が含まれています")?;
        headers.insert(API_KEY_HEADER, val);
        Ok(headers)
    }

    /// Upload a local file as multipart/form-data (field `file`) to
    /// `/sources/add-file`. The file is streamed from disk.
    pub fn add_file(&self, file_path: &Path) -> Result<AddedSource> {
        let url = format!("{}/sources/add-file", &self.base_url);

        let file = File::open(file_path)
            .with_context(|| format!("ファイルを開けませんでした: {}", file_path.display()))?;
        let len = file.metadata().context("ファイル情報の取得に失敗しました")?.len();
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.pdf");

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .context("フォームファイルの作成に失敗しました")?;
        let form = multipart::Form::new().part("file", part);

        debug!(%url, file = %file_path.display(), bytes = len, "uploading source file");
        let res = self
            .client
            .post(&url)
            .headers(self.key_headers()?)
            .multipart(form)
            .send()
            .context("リクエストの送信に失敗しました")?;
        let source = read_source(res)?;
        info!(source_id = %source.source_id, "source file added");
        Ok(source)
    }

    /// Register a document by URL via `/sources/add-url`.
    pub fn add_url(&self, pdf_url: &str) -> Result<AddedSource> {
        let url = format!("{}/sources/add-url", &self.base_url);
        let body = AddUrlRequest { url: pdf_url.to_string() };

        debug!(%url, pdf_url, "registering source url");
        let res = self
            .client
            .post(&url)
            .headers(self.key_headers()?)
            .json(&body)
            .send()
            .context("リクエストの送信に失敗しました")?;
        let source = read_source(res)?;
        info!(source_id = %source.source_id, "source url added");
        Ok(source)
    }

    /// Post one chat turn and hand back the successful response so the
    /// caller can stream its body.
    pub fn send_message(&self, req: &ChatRequest<'_>) -> Result<Response> {
        let url = format!("{}/chats/message", &self.base_url);
        let mut headers = self.key_headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        debug!(%url, messages = req.messages.len(), "sending chat message");
        let res = self
            .client
            .post(&url)
            .headers(headers)
            .json(req)
            .send()
            .context("リクエストの送信に失敗しました")?;
        ensure_success(res)
    }
}

/// Turn a non-success response into an error carrying status and body.
fn ensure_success(res: Response) -> Result<Response> {
    let status = res.status();
    if !status.is_success() {
        let txt = res.text().unwrap_or_else(|_| "".into());
        warn!(status = status.as_u16(), body = %txt, "api returned an error status");
        anyhow::bail!("APIエラー (status: {}): {}", status.as_u16(), txt);
    }
    Ok(res)
}

fn read_source(res: Response) -> Result<AddedSource> {
    let res = ensure_success(res)?;
    let raw_body = res.text().context("レスポンスの読み取りに失敗しました")?;
    let source_id = parse_source_id(&raw_body)?;
    Ok(AddedSource { source_id, raw_body })
}

/// Decode `{"sourceId": ...}`; an empty identifier is an error.
pub fn parse_source_id(body: &str) -> Result<String> {
    let source: Source = serde_json::from_str(body)
        .with_context(|| format!("レスポンスのデコードに失敗しました: {}", body))?;
    if source.source_id.is_empty() {
        anyhow::bail!("SourceIDが空です: {}", body);
    }
    Ok(source.source_id)
}
