use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{Message, Session, Transcript};
use crate::core::models::{default_model, label_for, model_options, resolve_model};
use crate::core::{AppConfig, init_tracing};
use crate::huggingface::{HuggingFace, Model};
use crate::ui::{PAGE_TITLE, TAGLINE};

#[derive(Debug, PartialEq)]
enum Input<'a> {
    Prompt(&'a str),
    SelectModel(&'a str),
    ListModels,
    History,
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    match line.split_once(' ') {
        Some(("/model", selection)) if !selection.trim().is_empty() => {
            Input::SelectModel(selection.trim())
        }
        _ => match line {
            "/models" => Input::ListModels,
            "/history" => Input::History,
            _ => Input::Prompt(line),
        },
    }
}

fn render_message(msg: &Message) -> String {
    format!("[{}] {}", msg.role, msg.content)
}

fn render_transcript(transcript: &Transcript) -> String {
    transcript
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_model(model: &Model) -> String {
    match label_for(model) {
        Some(label) => format!("{} ({})", label, model.id),
        None => model.id.clone(),
    }
}

pub async fn run(model: Option<String>, api_key: Option<String>) -> Result<()> {
    // Keep logs quiet so they don't interleave with the conversation
    init_tracing(&format!("{}=warn", env!("CARGO_CRATE_NAME")));

    let config = AppConfig::default();
    let client = HuggingFace::from_config(&config)?;
    let model = model.as_deref().map_or_else(default_model, resolve_model);
    let api_key = api_key.unwrap_or_else(|| config.hf_api_key.clone());
    let mut session = Session::new(model, &api_key);

    let mut rl = DefaultEditor::new()?;

    println!("🧠 {}", PAGE_TITLE);
    println!("{}", TAGLINE);
    println!("Model: {}", describe_model(session.model()));
    println!("Commands: /model <label or id>, /models, /history");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match parse_input(&line) {
                    Input::Empty => {}
                    Input::ListModels => {
                        for option in model_options() {
                            println!("{} => {}", option.label, option.model.id);
                        }
                    }
                    Input::SelectModel(selection) => {
                        session.select_model(resolve_model(selection));
                        println!("Model: {}", describe_model(session.model()));
                    }
                    Input::History => {
                        if session.transcript().is_empty() {
                            println!("No messages yet");
                        } else {
                            println!("{}", render_transcript(session.transcript()));
                        }
                    }
                    Input::Prompt(prompt) => {
                        println!("Thinking...");
                        let reply = session.turn(prompt, &client).await;
                        println!("{}", reply.content);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("What is DNA?"), Input::Prompt("What is DNA?"));
        assert_eq!(parse_input("/model gpt2"), Input::SelectModel("gpt2"));
        assert_eq!(
            parse_input("/model GPT-2 (Basic)"),
            Input::SelectModel("GPT-2 (Basic)")
        );
        assert_eq!(parse_input("/models"), Input::ListModels);
        assert_eq!(parse_input("/history"), Input::History);
        assert_eq!(parse_input("/model"), Input::Prompt("/model"));
    }

    #[test]
    fn test_render_transcript() {
        let mut transcript = Transcript::new();
        transcript.push(Message::new(Role::User, "hi"));
        transcript.push(Message::new(Role::Assistant, "hello"));
        assert_eq!(
            render_transcript(&transcript),
            "[user] hi\n[assistant] hello"
        );
    }

    #[test]
    fn test_describe_model() {
        assert_eq!(
            describe_model(&Model::new("gpt2")),
            "GPT-2 (Basic) (gpt2)"
        );
        assert_eq!(describe_model(&Model::new("custom/model")), "custom/model");
    }
}
