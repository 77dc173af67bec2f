//! Core handler behaviour through a fully assembled dispatcher.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::{Value, json};

use warden_core::{ChatId, InlineKeyboard, MessageId, MessageRef, UserId};
use warden_framework::{
    BoxError, DispatchState, Handler, ModuleDescriptor, Outcome, Predicate, UnhandledReason,
};
use warden_runtime::{RuntimeError, WardenRuntime};

mod common;
use common::{
    Call, GROUP, RecordingBot, StaticModule, boxed, callback, migration, private, reply, runtime,
    text, user,
};

fn callback_targets(keyboard: &InlineKeyboard) -> Vec<String> {
    keyboard
        .buttons()
        .filter_map(|b| b.callback_data().map(str::to_string))
        .collect()
}

fn notes_module() -> StaticModule {
    StaticModule::new(ModuleDescriptor::new("Notes").help(" - /get <name>: fetch a note"))
}

fn callback_id(update: &warden_core::Update) -> String {
    update.callback_query().map(|q| q.id.clone()).unwrap_or_default()
}

// ============================================================================
// /start
// ============================================================================

#[tokio::test]
async fn test_start_in_private_offers_group_link() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[]).dispatcher(boxed(&bot)).unwrap();

    let state = dispatcher.dispatch(private(5, "/start")).await;
    assert_eq!(state, DispatchState::Completed);

    let (text, keyboard) = bot.last_sent().unwrap();
    assert!(text.starts_with("Hello User5! My name is <b>Warden</b>"));
    assert!(text.ends_with("Hit /help if you want to know more about me!"));
    let keyboard = keyboard.unwrap();
    let button = keyboard.buttons().next().unwrap();
    assert_eq!(button.text, "Add me to your group!");
    assert_eq!(
        button.action,
        warden_core::ButtonAction::Url("t.me/warden_bot?startgroup=true".to_string())
    );
}

#[tokio::test]
async fn test_start_in_group_says_alive() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[]).dispatcher(boxed(&bot)).unwrap();

    dispatcher.dispatch(text(GROUP, 5, "/start")).await;
    assert_eq!(bot.sent_texts(), vec!["Hey there, I'm alive!".to_string()]);
}

#[tokio::test]
async fn test_start_help_deep_link_opens_module_page() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(notes_module())
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(private(5, "/start help_notes")).await;
    let (text, keyboard) = bot.last_sent().unwrap();
    assert_eq!(text, "<b>Notes</b>\n - /get <name>: fetch a note");
    assert_eq!(callback_targets(&keyboard.unwrap()), vec!["help_back"]);
}

// ============================================================================
// /help
// ============================================================================

#[tokio::test]
async fn test_help_in_private_lists_modules() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(notes_module())
        .with_module(StaticModule::new(ModuleDescriptor::new("Bans").help("ban stuff")))
        .with_module(StaticModule::new(ModuleDescriptor::new("Silent")))
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(private(5, "/help")).await;

    let (text, keyboard) = bot.last_sent().unwrap();
    assert!(text.starts_with("<b>Help</b>"));
    assert!(text.contains("My name is <b>Warden</b>"));
    let targets = callback_targets(&keyboard.unwrap());
    assert!(targets.contains(&"help_module(notes)".to_string()));
    assert!(targets.contains(&"help_module(bans)".to_string()));
    assert!(!targets.iter().any(|t| t.contains("silent")));
}

#[tokio::test]
async fn test_help_in_group_points_to_private_chat() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(notes_module())
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(text(GROUP, 5, "/help notes")).await;

    let (text, keyboard) = bot.last_sent().unwrap();
    assert_eq!(text, "Contact me in PM for help.");
    let button = keyboard.unwrap().buttons().next().cloned().unwrap();
    assert_eq!(button.text, "Help");
    assert_eq!(
        button.action,
        warden_core::ButtonAction::Url("t.me/warden_bot?start=help_notes".to_string())
    );
}

#[tokio::test]
async fn test_help_button_edits_menu_and_answers() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(notes_module())
        .dispatcher(boxed(&bot))
        .unwrap();

    let update = callback(5, 5, "help_module(notes)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;

    let calls = bot.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Edit { message, text, .. } => {
            assert_eq!(
                *message,
                MessageRef {
                    chat_id: ChatId(5),
                    message_id: MessageId(77),
                }
            );
            assert!(text.starts_with("<b>Notes</b>"));
        }
        other => panic!("expected an edit, got {other:?}"),
    }
    assert_eq!(calls[1], Call::Answer(id));
}

#[tokio::test]
async fn test_undecodable_help_button_is_only_answered() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(notes_module())
        .dispatcher(boxed(&bot))
        .unwrap();

    let update = callback(5, 5, "help_module(notes");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;

    assert_eq!(bot.calls(), vec![Call::Answer(id)]);
}

/// A runtime carrying `count` modules built by `module`.
fn many_modules(count: usize, module: impl Fn(String) -> ModuleDescriptor) -> WardenRuntime {
    (0..count).fold(runtime(1, &[]), |rt, i| {
        rt.with_module(StaticModule::new(module(format!("Mod{i:02}"))))
    })
}

fn help_modules(count: usize) -> WardenRuntime {
    many_modules(count, |name| ModuleDescriptor::new(name).help("text"))
}

/// The edited menu's navigation row, after checking the button was answered.
fn edited_nav_row(bot: &RecordingBot, callback_id: String) -> Vec<String> {
    let calls = bot.calls();
    assert_eq!(calls.len(), 2, "expected an edit and an answer, got {calls:?}");
    assert_eq!(calls[1], Call::Answer(callback_id));
    match &calls[0] {
        Call::Edit {
            message, keyboard, ..
        } => {
            assert_eq!(message.message_id, MessageId(77));
            let keyboard = keyboard.as_ref().expect("menu without keyboard");
            let nav = keyboard.rows.last().cloned().unwrap_or_default();
            callback_targets(&InlineKeyboard::new().row(nav))
        }
        other => panic!("expected an edit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_help_menu_pages_through_twenty_five_modules() {
    let bot = RecordingBot::new();
    let dispatcher = help_modules(25).dispatcher(boxed(&bot)).unwrap();

    let update = callback(5, 5, "help_next(0)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(edited_nav_row(&bot, id), vec!["help_prev(1)", "help_next(1)"]);

    bot.clear();
    let update = callback(5, 5, "help_next(1)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(edited_nav_row(&bot, id), vec!["help_prev(2)"]);

    bot.clear();
    let update = callback(5, 5, "help_prev(1)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(edited_nav_row(&bot, id), vec!["help_next(0)"]);

    bot.clear();
    let update = callback(5, 5, "help_prev(0)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(edited_nav_row(&bot, id), vec!["help_next(0)"]);
}

#[tokio::test]
async fn test_help_next_beyond_last_page_is_only_answered() {
    let bot = RecordingBot::new();
    let dispatcher = help_modules(25).dispatcher(boxed(&bot)).unwrap();

    for data in ["help_next(2)", "help_next(18446744073709551615)"] {
        bot.clear();
        let update = callback(5, 5, data);
        let id = callback_id(&update);
        let state = dispatcher.dispatch(update).await;

        assert_eq!(state, DispatchState::Completed, "{data}");
        assert_eq!(bot.calls(), vec![Call::Answer(id)], "{data}");
    }
}

#[tokio::test]
async fn test_settings_menu_pages_for_admins() {
    let bot = RecordingBot::new();
    bot.make_admin(GROUP, 5);
    let dispatcher = many_modules(12, |name| {
        ModuleDescriptor::new(name)
            .on_chat_settings(|_chat, _user| async move { Ok("on".to_string()) })
    })
    .dispatcher(boxed(&bot))
    .unwrap();

    let update = callback(5, 5, "stngs_next(-100,0)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(edited_nav_row(&bot, id), vec!["stngs_prev(-100,1)"]);

    bot.clear();
    let update = callback(5, 5, "stngs_prev(-100,1)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(edited_nav_row(&bot, id), vec!["stngs_next(-100,0)"]);

    for data in ["stngs_next(-100,1)", "stngs_next(-100,18446744073709551615)"] {
        bot.clear();
        let update = callback(5, 5, data);
        let id = callback_id(&update);
        assert_eq!(dispatcher.dispatch(update).await, DispatchState::Completed, "{data}");
        assert_eq!(bot.calls(), vec![Call::Answer(id)], "{data}");
    }
}

// ============================================================================
// Migration
// ============================================================================

#[tokio::test]
async fn test_migration_runs_hooks_and_stops_walk() {
    let moved: Arc<Mutex<Vec<(ChatId, ChatId)>>> = Arc::default();
    let later_runs = Arc::new(AtomicUsize::new(0));

    let log = Arc::clone(&moved);
    let descriptor = ModuleDescriptor::new("Notes").on_migrate(move |old, new| {
        let log = Arc::clone(&log);
        async move {
            log.lock().push((old, new));
            Ok(())
        }
    });
    let runs = Arc::clone(&later_runs);
    let module = StaticModule::new(descriptor).handler(
        1,
        Handler::new(Predicate::always(), move |_ctx| {
            let runs = Arc::clone(&runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Continue)
            }
        }),
    );

    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(module)
        .dispatcher(boxed(&bot))
        .unwrap();

    let state = dispatcher.dispatch(migration(-100, -1000100)).await;
    assert_eq!(state, DispatchState::StoppedEarly);
    assert_eq!(*moved.lock(), vec![(ChatId(-100), ChatId(-1000100))]);
    assert_eq!(later_runs.load(Ordering::SeqCst), 0);
}

// ============================================================================
// /gdpr, /info, /stats
// ============================================================================

#[tokio::test]
async fn test_gdpr_erases_and_reports_failures() {
    let erased: Arc<Mutex<Vec<UserId>>> = Arc::default();
    let log = Arc::clone(&erased);
    let working = ModuleDescriptor::new("Notes").on_gdpr(move |user| {
        let log = Arc::clone(&log);
        async move {
            log.lock().push(user);
            Ok(())
        }
    });
    let failing = ModuleDescriptor::new("Warns")
        .on_gdpr(|_user| async { Err::<(), BoxError>("database offline".into()) });

    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(StaticModule::new(working))
        .with_module(StaticModule::new(failing))
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(private(9, "/gdpr")).await;

    assert_eq!(*erased.lock(), vec![UserId(9)]);
    let (text, _) = bot.last_sent().unwrap();
    assert!(text.starts_with("Your personal data has been deleted."));
    assert!(text.ends_with("Warns"));
}

#[tokio::test]
async fn test_gdpr_ignored_in_groups() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[]).dispatcher(boxed(&bot)).unwrap();

    let state = dispatcher.dispatch(text(GROUP, 9, "/gdpr")).await;
    assert_eq!(state, DispatchState::Unhandled(UnhandledReason::NoMatch));
    assert!(bot.calls().is_empty());
}

#[tokio::test]
async fn test_info_on_reply_includes_module_sections() {
    let descriptor = ModuleDescriptor::new("Bios").on_user_info(|user: UserId| async move {
        Ok((user == UserId(3)).then(|| "<b>About user:</b>\nlikes tea".to_string()))
    });

    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(StaticModule::new(descriptor))
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(reply(GROUP, 5, user(3), "/info")).await;
    let (body, _) = bot.last_sent().unwrap();
    assert!(body.starts_with("<b>User info</b>:\nID: <code>3</code>"));
    assert!(body.contains("First Name: User3"));
    assert!(body.ends_with("<b>About user:</b>\nlikes tea"));

    dispatcher.dispatch(text(GROUP, 1, "/info")).await;
    let (body, _) = bot.last_sent().unwrap();
    assert!(body.contains("ID: <code>1</code>"));
    assert!(body.contains("my owner"));
}

#[tokio::test]
async fn test_stats_only_for_sudoers() {
    let descriptor =
        ModuleDescriptor::new("Notes").on_stats(|| async { Ok("42 notes".to_string()) });

    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[2])
        .with_module(StaticModule::new(descriptor))
        .dispatcher(boxed(&bot))
        .unwrap();

    let state = dispatcher.dispatch(text(GROUP, 3, "/stats")).await;
    assert_eq!(state, DispatchState::Unhandled(UnhandledReason::NoMatch));
    assert!(bot.calls().is_empty());

    dispatcher.dispatch(text(GROUP, 2, "/stats")).await;
    assert_eq!(bot.sent_texts(), vec!["Current stats:\n42 notes".to_string()]);
}

// ============================================================================
// /export and /import
// ============================================================================

fn backup_module(imported: &Arc<Mutex<Vec<(ChatId, Value)>>>) -> StaticModule {
    let log = Arc::clone(imported);
    let descriptor = ModuleDescriptor::new("Notes")
        .on_export(|_chat| async { Ok(json!({"count": 2})) })
        .on_import(move |chat, data| {
            let log = Arc::clone(&log);
            async move {
                log.lock().push((chat, data));
                Ok(())
            }
        });
    StaticModule::new(descriptor)
}

#[tokio::test]
async fn test_export_requires_admin() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(backup_module(&Arc::default()))
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(text(GROUP, 5, "/export")).await;
    assert_eq!(
        bot.sent_texts(),
        vec!["You need to be a chat admin to do that.".to_string()]
    );

    bot.clear();
    bot.make_admin(GROUP, 5);
    dispatcher.dispatch(text(GROUP, 5, "/export")).await;
    let (text, _) = bot.last_sent().unwrap();
    assert!(text.starts_with("<code>"));
    assert!(text.contains("&quot;notes&quot;"));
    assert!(text.contains("&quot;chat_id&quot;: -100"));
}

#[tokio::test]
async fn test_import_feeds_sections_back() {
    let imported: Arc<Mutex<Vec<(ChatId, Value)>>> = Arc::default();
    let bot = RecordingBot::new();
    bot.make_admin(GROUP, 5);
    let dispatcher = runtime(1, &[])
        .with_module(backup_module(&imported))
        .dispatcher(boxed(&bot))
        .unwrap();

    let backup = json!({"version": 1, "chat_id": GROUP, "data": {"notes": {"count": 2}}});
    dispatcher
        .dispatch(text(GROUP, 5, &format!("/import {backup}")))
        .await;

    assert_eq!(
        bot.sent_texts(),
        vec!["Backup fully imported. Welcome back! :D".to_string()]
    );
    assert_eq!(*imported.lock(), vec![(ChatId(GROUP), json!({"count": 2}))]);
}

#[tokio::test]
async fn test_import_rejects_foreign_chat() {
    let imported: Arc<Mutex<Vec<(ChatId, Value)>>> = Arc::default();
    let bot = RecordingBot::new();
    bot.make_admin(GROUP, 5);
    let dispatcher = runtime(1, &[])
        .with_module(backup_module(&imported))
        .dispatcher(boxed(&bot))
        .unwrap();

    let backup = json!({"version": 1, "chat_id": -555, "data": {"notes": {}}});
    dispatcher
        .dispatch(text(GROUP, 5, &format!("/import {backup}")))
        .await;

    assert_eq!(
        bot.sent_texts(),
        vec!["This backup comes from another chat, I can't restore it here.".to_string()]
    );
    assert!(imported.lock().is_empty());
}

// ============================================================================
// Settings
// ============================================================================

fn settings_module() -> StaticModule {
    StaticModule::new(
        ModuleDescriptor::new("Locks")
            .on_chat_settings(|chat, _user| async move { Ok(format!("{chat} locks nothing")) }),
    )
}

#[tokio::test]
async fn test_settings_button_is_admin_gated() {
    let bot = RecordingBot::new();
    let dispatcher = runtime(1, &[])
        .with_module(settings_module())
        .dispatcher(boxed(&bot))
        .unwrap();

    let update = callback(5, 5, "stngs_module(-100,locks)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;
    assert_eq!(bot.calls(), vec![Call::Answer(id)]);

    bot.clear();
    bot.make_admin(GROUP, 5);
    let update = callback(5, 5, "stngs_module(-100,locks)");
    let id = callback_id(&update);
    dispatcher.dispatch(update).await;

    let calls = bot.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Edit { text, keyboard, .. } => {
            assert!(text.contains("<b>Locks</b>"));
            assert!(text.ends_with("-100 locks nothing"));
            assert_eq!(callback_targets(keyboard.as_ref().unwrap()), vec!["stngs_back(-100)"]);
        }
        other => panic!("expected an edit, got {other:?}"),
    }
    assert_eq!(calls[1], Call::Answer(id));
}

#[tokio::test]
async fn test_settings_command_in_group_links_to_private_chat() {
    let bot = RecordingBot::new();
    bot.make_admin(GROUP, 5);
    let dispatcher = runtime(1, &[])
        .with_module(settings_module())
        .dispatcher(boxed(&bot))
        .unwrap();

    dispatcher.dispatch(text(GROUP, 5, "/settings")).await;
    dispatcher.dispatch(text(GROUP, 6, "/settings")).await;

    assert_eq!(
        bot.sent_texts(),
        vec![
            "Click here to get this chat's settings, as well as yours.".to_string(),
            "Click here to check your settings.".to_string(),
        ]
    );
}

// ============================================================================
// Assembly
// ============================================================================

#[tokio::test]
async fn test_duplicate_module_names_refuse_to_start() {
    let bot = RecordingBot::new();
    let result = runtime(1, &[])
        .with_module(notes_module())
        .with_module(StaticModule::new(ModuleDescriptor::new("notes")))
        .dispatcher(boxed(&bot));

    assert!(matches!(result, Err(RuntimeError::Registry(_))));
}
