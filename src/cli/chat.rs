//! Interactive line-mode chat loop.

use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;

use chrono::Local;
use ratatui::crossterm::style::Stylize;
use ratatui::crossterm::terminal;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::indicator::ThinkingIndicator;
use crate::commands::{
    compose_code_message, process_input, CommandContext, CommandResult, Notice, NoticeLevel,
};
use crate::core::chat_stream::{ChatStreamService, StreamMessage, StreamParams};
use crate::core::config::Config;
use crate::core::persona::{default_persona, find_persona, Persona, BUILTIN_PERSONAS};
use crate::core::response::{ResponseEvent, ResponseStream};
use crate::core::segmenter::{CodeSegment, DEFAULT_RENDER_WIDTH};
use crate::core::session::{ChatSession, ContextUsage, UsageLevel};
use crate::utils::logging::TranscriptLog;

type InputLines = Lines<BufReader<Stdin>>;

/// Columns taken by the code gutter: `│ nnn `.
const GUTTER_WIDTH: usize = 6;
const MIN_RENDER_WIDTH: usize = 20;

pub async fn run_chat(config: Config) -> Result<(), Box<dyn Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let persona = match config.persona.as_deref() {
        Some(choice) => find_persona(choice).unwrap_or_else(|| {
            tracing::warn!("Unknown persona {choice:?}; using {}", default_persona().key);
            default_persona()
        }),
        None => select_persona(&mut input).await?,
    };
    println!("{}\n", format!("Persona set: {}", persona.key).green());

    let mut session = ChatSession::new(persona);
    let transcript = open_transcript(&config);
    print_environment(&config, transcript.as_ref());

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()?;
    let (service, mut rx) = ChatStreamService::new();
    let mut stream_id = 0u64;

    loop {
        println!(
            "{}",
            colorize_usage(session.context_usage(config.max_context_messages))
        );
        let Some(line) = read_line(&mut input, &format!("{} ", " λ".cyan())).await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let (result, notices) = {
            let mut ctx = CommandContext::new(&mut session, &config);
            let result = process_input(&mut ctx, &line);
            (result, ctx.notices)
        };
        print_notices(&notices);

        let message = match result {
            CommandResult::Continue => continue,
            CommandResult::Exit => break,
            CommandResult::SendMessage(message) => message,
            CommandResult::StartCodeMode { language } => {
                match read_code(&mut input, &language).await? {
                    Some(message) => message,
                    None => {
                        println!("{}", "No code entered.".yellow());
                        continue;
                    }
                }
            }
        };

        stream_id += 1;
        session.push_user(message.clone());
        match stream_reply(&service, &mut rx, &client, &config, &mut session, stream_id).await {
            Ok(reply) => {
                if let Some(log) = &transcript {
                    if let Err(err) = log.record(&message, &reply) {
                        tracing::warn!("Could not write transcript: {err}");
                    }
                }
                session.push_assistant(reply);
            }
            Err(err) => {
                session.pop_unanswered();
                println!("\n{}\n", format!("Network error: {err}").red());
            }
        }
    }

    Ok(())
}

async fn read_line(input: &mut InputLines, prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    input.next_line().await
}

async fn select_persona(input: &mut InputLines) -> io::Result<Persona> {
    println!("\nSelect AI persona or number:");
    for (number, persona) in BUILTIN_PERSONAS.iter().enumerate() {
        println!("  {} - {} : {}", number + 1, persona.key, persona.description);
    }

    let choice = read_line(input, "Persona/Number: ").await?.unwrap_or_default();
    Ok(find_persona(&choice).unwrap_or_else(|| {
        println!("{}", "Invalid input, defaulting to first persona".yellow());
        default_persona()
    }))
}

/// Collect lines until `/end` or end of input.
async fn read_code(input: &mut InputLines, language: &str) -> io::Result<Option<String>> {
    let mut lines = Vec::new();
    let prompt = format!("{} ", "...".cyan());
    while let Some(line) = read_line(input, &prompt).await? {
        if line.trim().eq_ignore_ascii_case("/end") {
            break;
        }
        lines.push(line);
    }
    Ok(compose_code_message(language, &lines))
}

fn open_transcript(config: &Config) -> Option<TranscriptLog> {
    let dir = config.resolved_log_dir()?;
    match TranscriptLog::daily(&dir, Local::now()) {
        Ok(log) => Some(log),
        Err(err) => {
            tracing::warn!("Transcript disabled, cannot use {}: {err}", dir.display());
            None
        }
    }
}

fn print_environment(config: &Config, transcript: Option<&TranscriptLog>) {
    let rule = "─".repeat(27);
    println!("{}", format!("{rule} Environment {rule}").cyan());
    println!("● {} {}", "Model:".blue(), config.model);
    println!("● {} /clear | /exit | /code | /copy <num>", "Commands:".yellow());
    println!("● {} /file <path> | --summary | --explain | --refactor", "File:".yellow());
    println!("● {} /project add <dir> | remove | list | ask <question>", "Project:".yellow());
    match transcript {
        Some(log) => println!("● {} saving to {}", "Logs:".blue(), log.path().display()),
        None => println!("● {} disabled", "Logs:".blue()),
    }
    println!("● {} Use '/clear' to reset context without clearing logs", "Tip:".yellow());
    println!("{}\n", "─".repeat(67).cyan());
}

fn colorize_usage(usage: ContextUsage) -> String {
    let bar = usage.to_string();
    match usage.level() {
        UsageLevel::Low => bar.blue().to_string(),
        UsageLevel::Medium => bar.yellow().to_string(),
        UsageLevel::High => bar.red().to_string(),
    }
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let text = notice.text.as_str();
        match notice.level {
            NoticeLevel::Info => println!("{}", text.cyan()),
            NoticeLevel::Success => println!("{}", text.green()),
            NoticeLevel::Warning => println!("{}", text.yellow()),
            NoticeLevel::Error => println!("{}", text.red()),
        }
    }
}

async fn next_message(
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    stream_id: u64,
) -> Option<StreamMessage> {
    while let Some((message, id)) = rx.recv().await {
        if id == stream_id {
            return Some(message);
        }
    }
    None
}

/// Send the session history and print the reply as it streams in.
async fn stream_reply(
    service: &ChatStreamService,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    client: &reqwest::Client,
    config: &Config,
    session: &mut ChatSession,
    stream_id: u64,
) -> Result<String, String> {
    let cancel_token = CancellationToken::new();
    service.spawn_stream(StreamParams {
        client: client.clone(),
        api_url: config.api_url.clone(),
        model: config.model.clone(),
        messages: session.messages().to_vec(),
        cancel_token: cancel_token.clone(),
        stream_id,
    });

    let indicator = ThinkingIndicator::start();
    let first = next_message(rx, stream_id).await;
    indicator.stop().await;

    if let Some(StreamMessage::Error(err)) = first {
        return Err(err);
    }

    let delay = Duration::from_millis(config.typing_delay_ms);
    let mut response = ResponseStream::new(&mut session.code_blocks, render_width());
    let mut stream_error = None;
    let mut pending = first;

    print!("\n{} ", "•ᴗ•".green());
    while let Some(message) = pending {
        match message {
            StreamMessage::Chunk(text) => {
                for event in response.push(&text) {
                    show_event(event, delay).await;
                }
            }
            StreamMessage::Error(err) => stream_error = Some(err),
            StreamMessage::End => break,
        }
        pending = next_message(rx, stream_id).await;
    }
    cancel_token.cancel();

    let (last, full_response) = response.finish();
    if let Some(event) = last {
        show_event(event, delay).await;
    }
    println!("\n");

    match stream_error {
        Some(err) if full_response.is_empty() => Err(err),
        Some(err) => {
            tracing::warn!("Reply ended with an error after {} chars", full_response.len());
            println!("{}\n", err.red());
            Ok(full_response)
        }
        None => Ok(full_response),
    }
}

async fn show_event(event: ResponseEvent, delay: Duration) {
    match event {
        ResponseEvent::Prose(text) => type_out(&text, delay).await,
        ResponseEvent::Code { index, segment } => print_code_block(index, &segment),
    }
}

async fn type_out(text: &str, delay: Duration) {
    let mut stdout = io::stdout();
    if delay.is_zero() {
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();
        return;
    }
    for ch in text.chars() {
        let _ = write!(stdout, "{ch}");
        let _ = stdout.flush();
        tokio::time::sleep(delay).await;
    }
}

fn print_code_block(index: usize, segment: &CodeSegment) {
    let label = segment.language.as_deref().unwrap_or("code");
    println!("\n{}", format!("╭─ [{index}] {label}").cyan());
    for line in gutter_lines(&segment.rendered) {
        println!("{} {}", "│".cyan(), line.yellow());
    }
    println!("{}", format!("╰─ /copy {index}").dark_grey());
}

fn gutter_lines(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .enumerate()
        .map(|(idx, line)| format!("{:>3} {line}", idx + 1))
        .collect()
}

fn render_width() -> usize {
    terminal::size()
        .ok()
        .map(|(cols, _)| usize::from(cols).saturating_sub(GUTTER_WIDTH + 2))
        .filter(|width| *width >= MIN_RENDER_WIDTH)
        .unwrap_or(DEFAULT_RENDER_WIDTH)
}
