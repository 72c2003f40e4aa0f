use super::*;
use crate::core::persona::default_persona;
use crate::utils::test_utils::write_tree;

fn setup() -> (ChatSession, Config) {
    (ChatSession::new(default_persona()), Config::default())
}

fn sent(result: CommandResult) -> String {
    match result {
        CommandResult::SendMessage(text) => text,
        _ => panic!("expected a message to send"),
    }
}

fn last_notice<'c>(ctx: &'c CommandContext<'_>) -> &'c Notice {
    ctx.notices.last().expect("expected a notice")
}

#[test]
fn plain_text_and_unknown_commands_are_sent() {
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);

    assert_eq!(sent(process_input(&mut ctx, "  hello there ")), "hello there");
    assert_eq!(sent(process_input(&mut ctx, "/unknown thing")), "/unknown thing");
    assert_eq!(sent(process_input(&mut ctx, "/")), "/");
    assert!(ctx.notices.is_empty());
}

#[test]
fn aliases_resolve_to_commands() {
    assert_eq!(find_command("p").map(|c| c.name), Some("project"));
    assert_eq!(find_command("F").map(|c| c.name), Some("file"));
    assert_eq!(find_command("h").map(|c| c.name), Some("help"));
    assert_eq!(find_command("HELP").map(|c| c.name), Some("help"));
    assert!(find_command("print").is_none());
}

#[test]
fn help_lists_every_usage() {
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);
    assert!(matches!(process_input(&mut ctx, "/h"), CommandResult::Continue));

    let notice = last_notice(&ctx);
    assert_eq!(notice.level, NoticeLevel::Info);
    for command in all_commands() {
        for usage in command.usages {
            assert!(notice.text.contains(usage.syntax), "missing {}", usage.syntax);
        }
    }
    assert!(notice.text.contains("/p = /project"));
}

#[test]
fn exit_and_clear() {
    let (mut session, config) = setup();
    session.push_user("hi");
    session.push_assistant("hello");
    session.code_blocks.append("x".into());

    let mut ctx = CommandContext::new(&mut session, &config);
    assert!(matches!(process_input(&mut ctx, "/clear"), CommandResult::Continue));
    assert_eq!(last_notice(&ctx).level, NoticeLevel::Success);
    assert!(matches!(process_input(&mut ctx, "/EXIT"), CommandResult::Exit));

    assert_eq!(session.context_size(), 0);
    assert!(session.code_blocks.is_empty());
}

#[test]
fn code_mode_carries_language() {
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);
    match process_input(&mut ctx, "/code rust") {
        CommandResult::StartCodeMode { language } => assert_eq!(language, "rust"),
        _ => panic!("expected code mode"),
    }
    match process_input(&mut ctx, "/code") {
        CommandResult::StartCodeMode { language } => assert!(language.is_empty()),
        _ => panic!("expected code mode"),
    }

    let lines = vec!["fn main() {".to_string(), "}".to_string()];
    assert_eq!(
        compose_code_message("rust", &lines).as_deref(),
        Some("```rust\nfn main() {\n}\n```")
    );
    assert_eq!(compose_code_message("rust", &[]), None);
}

#[test]
fn copy_rejects_bad_numbers() {
    let (mut session, config) = setup();
    session.code_blocks.append("one".into());
    let mut ctx = CommandContext::new(&mut session, &config);

    process_input(&mut ctx, "/copy");
    assert_eq!(last_notice(&ctx).text, "Usage: /copy <number>");
    process_input(&mut ctx, "/copy two");
    assert_eq!(last_notice(&ctx).text, "Usage: /copy <number>");
    process_input(&mut ctx, "/copy 1 2");
    assert_eq!(last_notice(&ctx).text, "Usage: /copy <number>");

    process_input(&mut ctx, "/copy 3");
    let notice = last_notice(&ctx);
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.text, "Invalid code block number 3 (valid: 1-1)");
}

#[test]
fn file_command_wraps_content_by_mode() {
    let dir = write_tree(&[("notes.md", "# Notes\nsome text")]);
    let path = dir.path().join("notes.md");
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);

    let message = sent(process_input(&mut ctx, &format!("/f {}", path.display())));
    assert_eq!(
        message,
        "Here is the content of file `notes.md`:\n\nFile name: `notes.md`\n\n```\n# Notes\nsome text\n```"
    );
    assert_eq!(
        last_notice(&ctx).text,
        "Loaded file: notes.md (17 chars) | Mode: normal"
    );

    let message = sent(process_input(
        &mut ctx,
        &format!("/file --summary \"{}\"", path.display()),
    ));
    assert!(message.starts_with("Provide a concise summary of this file.\n\nFile name: `notes.md`"));
}

#[test]
fn file_command_reports_problems() {
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);

    process_input(&mut ctx, "/file");
    assert_eq!(last_notice(&ctx).level, NoticeLevel::Warning);
    process_input(&mut ctx, "/file --explain");
    assert_eq!(last_notice(&ctx).text, "Missing file path.");
    process_input(&mut ctx, "/file --shout x.py");
    assert!(last_notice(&ctx).text.starts_with("Unknown file mode --shout"));
    process_input(&mut ctx, "/file /definitely/not/here.py");
    let notice = last_notice(&ctx);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.text, "File not found: /definitely/not/here.py");
}

#[test]
fn file_command_truncates_to_limit() {
    let content = "é".repeat(40);
    let dir = write_tree(&[("big.txt", content.as_str())]);
    let path = dir.path().join("big.txt");
    let mut session = ChatSession::new(default_persona());
    let config = Config {
        file_char_limit: 10,
        ..Default::default()
    };
    let mut ctx = CommandContext::new(&mut session, &config);

    let message = sent(process_input(
        &mut ctx,
        &format!("/file --refactor {}", path.display()),
    ));
    assert!(message.contains(&format!("```\n{}\n```", "é".repeat(10))));
    assert!(ctx
        .notices
        .iter()
        .any(|n| n.text == "File too large. Truncating to 10 characters."));
}

#[test]
fn project_lifecycle() {
    let dir = write_tree(&[
        ("app/auth.py", "import os\n\ndef login(user):\n    return check(user)\n"),
        ("README.md", "# Demo project\n"),
    ]);
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);

    process_input(&mut ctx, "/p ask how does login work");
    assert_eq!(last_notice(&ctx).text, "No project loaded");
    process_input(&mut ctx, "/project list");
    assert_eq!(last_notice(&ctx).text, "No project loaded");

    process_input(&mut ctx, &format!("/p add {}", dir.path().display()));
    assert_eq!(last_notice(&ctx).text, "Indexed 2 files, 2 code blocks.");

    process_input(&mut ctx, "/project list");
    let listing = &last_notice(&ctx).text;
    assert!(listing.starts_with("Indexed Files:"));
    assert!(listing.contains("  - app/auth.py (blocks: 1, chunks: 1, imports: 1)"));
    assert!(listing.contains("  - README.md (blocks: 1, chunks: 1, imports: 0)"));

    let prompt = sent(process_input(&mut ctx, "/p ask how does login work"));
    assert!(prompt.starts_with("Answer using the relevant project code below.\n"));
    assert!(prompt.contains("[File: app/auth.py | Symbol: login | Score: "));
    assert!(prompt.ends_with("\nQuestion: how does login work\n"));

    process_input(&mut ctx, "/project ask");
    assert_eq!(last_notice(&ctx).text, "Usage: /project ask <question>");

    process_input(&mut ctx, "/project remove");
    assert_eq!(last_notice(&ctx).text, "Project removed.");
    assert!(!ctx.session.project.is_loaded());
}

#[test]
fn failed_add_keeps_existing_project() {
    let dir = write_tree(&[("main.py", "def main():\n    pass\n")]);
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);

    process_input(&mut ctx, &format!("/project add {}", dir.path().display()));
    let missing = dir.path().join("missing");
    process_input(&mut ctx, &format!("/project add {}", missing.display()));

    let notice = last_notice(&ctx);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.starts_with("Directory not found"));
    assert_eq!(ctx.session.project.block_count(), 1);
}

#[test]
fn project_without_subcommand_shows_usage() {
    let (mut session, config) = setup();
    let mut ctx = CommandContext::new(&mut session, &config);
    process_input(&mut ctx, "/project");
    assert_eq!(last_notice(&ctx).text, "Usage: /project add|remove|list|ask");
    process_input(&mut ctx, "/project frobnicate");
    assert_eq!(last_notice(&ctx).text, "Usage: /project add|remove|list|ask");
}

#[test]
fn file_mode_flags() {
    assert_eq!(FileMode::from_flag("SUMMARY"), Some(FileMode::Summary));
    assert_eq!(FileMode::from_flag("refactor"), Some(FileMode::Refactor));
    assert_eq!(FileMode::from_flag("nope"), None);
}
