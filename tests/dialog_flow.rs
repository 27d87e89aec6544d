use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::backend::TestBackend;
use tuikernel::config::DialogConfig;
use tuikernel::runtime::ScriptedInput;
use tuikernel::ui::{BUTTON_NO_LABEL, BUTTON_YES_LABEL, DialogPhase, TerminalScreen};
use tuikernel::{Dialog, DialogButtons, DialogType, Response};

#[test]
fn confirm_dialog_answers_no_after_moving_focus() {
    let resolved = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&resolved);

    let mut dialog = Dialog::builder()
        .property("type", "confirmation")
        .property("buttons", "yesno")
        .property("title", "Overwrite")
        .property("message", "File exists.\\nOverwrite it?")
        .input(
            ScriptedInput::new()
                .idle()
                .key(KeyCode::Right)
                .key(KeyCode::Char(' ')),
        )
        .on_resolved(move |response| *sink.borrow_mut() = Some(response))
        .build()
        .unwrap();

    assert_eq!(dialog.kind(), DialogType::Confirmation);
    assert_eq!(dialog.height(), 8);

    assert_eq!(dialog.run(), Response::No);
    assert_eq!(dialog.phase(), DialogPhase::Resolved);
    assert_eq!(*resolved.borrow(), Some(Response::No));
}

#[test]
fn ctrl_c_cancels() {
    let mut dialog = Dialog::builder()
        .buttons(DialogButtons::YesNo)
        .input(ScriptedInput::new().key_with(KeyCode::Char('c'), KeyModifiers::CONTROL))
        .build()
        .unwrap();

    assert_eq!(dialog.run(), Response::Cancel);
    assert_eq!(dialog.loop_handle().stop_count(), 1);
}

#[test]
fn dialog_renders_through_terminal_screen() {
    let config = DialogConfig {
        min_width: 30,
        ..DialogConfig::default()
    };
    let dialog = Dialog::builder()
        .kind(DialogType::Warning)
        .buttons(DialogButtons::YesNo)
        .title("Careful")
        .message("Really quit?")
        .config(config)
        .build()
        .unwrap();

    let mut screen = TerminalScreen::new(TestBackend::new(50, 14)).unwrap();
    dialog.draw(&mut screen).unwrap();

    let buffer = screen.terminal().backend().buffer();
    let text: String = buffer
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect();

    assert!(text.contains("Careful"));
    assert!(text.contains("Really quit?"));
    assert!(text.contains(BUTTON_YES_LABEL));
    assert!(text.contains(BUTTON_NO_LABEL));
}
