// Library root
// ------------
// Small library surface behind the `chatpdf-cli` binary.
//
// - `config`: API key and base URL from the environment or a prompt.
// - `api`: blocking HTTP calls to the ChatPDF endpoints.
// - `chat`: conversation history and the streamed question/answer loop.
// - `ui`: the interactive menu tying the pieces together.
pub mod api;
pub mod chat;
pub mod config;
pub mod ui;
