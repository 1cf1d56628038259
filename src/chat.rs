// Chat loop: keeps the conversation history for one source and relays
// each question to the API, copying the streamed answer to the console.

use crate::api::{ApiClient, ChatRequest, Message, Role};
use anyhow::Result;
use std::io::{self, BufRead, BufReader, Read, Write};
use tracing::debug;

/// History of a single chat session. Append-only; dropped when the
/// session ends.
#[derive(Debug, Clone)]
pub struct ChatSession {
    source_id: String,
    messages: Vec<Message>,
}

impl ChatSession {
    pub fn new(source_id: impl Into<String>) -> Self {
        ChatSession {
            source_id: source_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message { role: Role::User, content: content.into() });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message { role: Role::Assistant, content: content.into() });
    }

    /// The request for the next turn: full history, streaming on.
    pub fn request(&self) -> ChatRequest<'_> {
        ChatRequest {
            source_id: &self.source_id,
            messages: &self.messages,
            stream: true,
        }
    }
}

/// `exit` in any letter case ends the session.
pub fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit")
}

/// Run the question/answer loop until `exit` or end of input. Failed
/// turns are reported and skipped; the question stays in the history.
/// Returns the session so callers can inspect what was exchanged.
pub fn run_chat<R: BufRead, W: Write>(
    api: &ApiClient,
    source_id: &str,
    mut input: R,
    mut out: W,
) -> Result<ChatSession> {
    let mut session = ChatSession::new(source_id);

    loop {
        write!(out, "\n質問を入力してください (終了する場合は 'exit' と入力): ")?;
        out.flush()?;

        // Raw bytes: a non-UTF-8 terminal must not end the session.
        let mut raw = Vec::new();
        if input.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        let question = line.trim_end_matches(['\r', '\n']);
        if is_exit(question) {
            break;
        }

        session.push_user(question);
        let res = match api.send_message(&session.request()) {
            Ok(res) => res,
            Err(e) => {
                writeln!(out, "{:#}", e)?;
                continue;
            }
        };

        write!(out, "\n回答: ")?;
        let answer = stream_answer(res, &mut out)?;
        debug!(bytes = answer.len(), turns = session.messages().len(), "answer received");
        session.push_assistant(answer);
    }

    Ok(session)
}

/// Copy the body to `out` line by line as it arrives, without any
/// event-stream parsing, and return the text that was shown. A read
/// error ends the answer early; only write errors are returned.
pub fn stream_answer<R: Read, W: Write>(body: R, out: &mut W) -> io::Result<String> {
    let mut reader = BufReader::new(body);
    let mut shown = Vec::new();

    loop {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                writeln!(out, "\n回答が終了しました")?;
                break;
            }
            Ok(_) => {
                out.write_all(&buf)?;
                out.flush()?;
                shown.extend_from_slice(&buf);
            }
            Err(e) => {
                writeln!(out, "\nストリームの読み取りに失敗しました: {}", e)?;
                break;
            }
        }
    }
    writeln!(out)?;

    let text = String::from_utf8_lossy(&shown);
    Ok(text.trim_end_matches(['\r', '\n']).to_string())
}
