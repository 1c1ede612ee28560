//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `noteapp_core` linkage end to end: store, use cases, session.
//! - Keep output deterministic for quick local sanity checks.

use noteapp_core::{
    core_version, Note, NoteAppConfig, NoteColor, NoteListSession, NoteService, NotesEvent,
    NoteOrder, OrderDirection, OrderKey,
};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("noteapp_core smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("noteapp_core version={}", core_version());

    let config = NoteAppConfig::default();
    let store = Arc::new(config.open_store()?);
    let session = NoteListSession::spawn(NoteService::new(store), config.session_options());

    for (title, color) in [("Groceries", NoteColor::LightGreen), ("Books", NoteColor::Violet)] {
        session
            .save_note(Note::new(title, "smoke", color))
            .await?;
    }
    session
        .dispatch(NotesEvent::ChangeOrder(NoteOrder::new(
            OrderKey::Title,
            OrderDirection::Ascending,
        )))
        .await?;

    let mut state = session.subscribe_state();
    let titles: Vec<String> = state
        .wait_for(|state| state.notes.len() == 2)
        .await?
        .notes
        .iter()
        .map(|note| note.title.clone())
        .collect();
    println!("noteapp_core notes={}", titles.join(","));

    session.shutdown().await;
    Ok(())
}
