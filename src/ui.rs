// UI layer: the interactive menu built on `dialoguer`. Each option is one
// API call; on success the resulting source id is handed to the chat loop.

use crate::api::ApiClient;
use crate::chat::run_chat;
use anyhow::Result;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

const MENU_ITEMS: [&str; 4] = [
    "PDFをアップロード",
    "URLからPDFを追加",
    "チャットを開始",
    "終了",
];

/// Main interactive menu. Runs until the user chooses "終了". Operation
/// failures are printed and the menu is shown again.
pub fn main_menu(api: ApiClient) -> Result<()> {
    loop {
        println!();
        let selection = Select::new()
            .with_prompt("選択してください")
            .items(&MENU_ITEMS)
            .default(0)
            .interact()?;
        match selection {
            0 => {
                if let Some(source_id) = handle_upload(&api)? {
                    start_chat(&api, &source_id)?;
                }
            }
            1 => {
                if let Some(source_id) = handle_add_url(&api)? {
                    start_chat(&api, &source_id)?;
                }
            }
            2 => {
                let source_id: String = Input::new()
                    .with_prompt("SourceIDを入力してください")
                    .allow_empty(true)
                    .interact_text()?;
                let source_id = source_id.trim();
                if source_id.is_empty() {
                    println!("SourceIDが空です");
                    continue;
                }
                start_chat(&api, source_id)?;
            }
            3 => {
                println!("アプリケーションを終了します");
                break;
            }
            _ => println!("無効な選択です"),
        }
    }
    Ok(())
}

/// Ask for a local path and upload it. Returns the source id on success.
fn handle_upload(api: &ApiClient) -> Result<Option<String>> {
    let path: String = Input::new()
        .with_prompt("PDFファイルのパスを入力してください")
        .interact_text()?;
    let path = PathBuf::from(path.trim());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("アップロード中...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = api.add_file(&path);
    spinner.finish_and_clear();

    match result {
        Ok(added) => {
            println!("APIレスポンス: {}", added.raw_body);
            println!("PDFがアップロードされました。SourceID: {}", added.source_id);
            Ok(Some(added.source_id))
        }
        Err(e) => {
            println!("{:#}", e);
            Ok(None)
        }
    }
}

/// Ask for a document URL and register it. Returns the source id on success.
fn handle_add_url(api: &ApiClient) -> Result<Option<String>> {
    let url: String = Input::new()
        .with_prompt("PDFのURLを入力してください")
        .interact_text()?;

    match api.add_url(&url) {
        Ok(added) => {
            println!("PDFが追加されました。SourceID: {}", added.source_id);
            Ok(Some(added.source_id))
        }
        Err(e) => {
            println!("{:#}", e);
            Ok(None)
        }
    }
}

fn start_chat(api: &ApiClient, source_id: &str) -> Result<()> {
    let stdin = io::stdin();
    run_chat(api, source_id, stdin.lock(), io::stdout())?;
    Ok(())
}
