//! HTML rendering of a chat session using Handlebars. Message
//! contents come from users and models so they are rendered as
//! Markdown with raw HTML escaped, everything else goes through the
//! default Handlebars escaping.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use serde::Serialize;

use crate::chat::{Role, Session};
use crate::core::models::model_options;

pub const PAGE_TITLE: &str = "EduGenius – Your Study Companion";
pub const TAGLINE: &str = "Ask me anything related to your subjects, syllabus, or exams!";
pub const INPUT_PLACEHOLDER: &str = "Ask EduGenius...";
pub const SERVER_KEY_PLACEHOLDER: &str = "Using server key";
pub const SESSION_KEY_PLACEHOLDER: &str = "Using your key";
pub const NO_KEY_PLACEHOLDER: &str = "hf_...";

#[derive(Debug)]
pub enum Template {
    ChatPage,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>EduGenius - AI Assistant</title>
<style>
body { font-family: sans-serif; margin: 0; }
.page { display: flex; min-height: 100vh; }
.sidebar { width: 18rem; padding: 1rem; background-color: #f0f2f6; }
.sidebar label { display: block; margin-top: 1rem; }
.sidebar input, .sidebar select { width: 100%; }
.sidebar input[type=checkbox] { width: auto; }
.main { flex: 1; padding: 1rem 2rem; display: flex; flex-direction: column; }
.transcript { flex: 1; overflow-y: auto; }
.chat-message { padding: 1rem; border-radius: 0.5rem; margin-bottom: 1rem; }
.chat-message p:first-child { margin-top: 0; }
.chat-message p:last-child { margin-bottom: 0; }
.chat-message.user { background-color: #f0f2f6; }
.chat-message.assistant { background-color: #f8f9fa; }
.chat-input { display: flex; gap: 0.5rem; }
.chat-input input { flex: 1; }
</style>
</head>
<body>
<form method="post" action="/" class="page">
<input type="hidden" name="session_id" value="{{session_id}}">
<aside class="sidebar">
<h2>Settings</h2>
<label for="api_key">Enter your Hugging Face API Key</label>
<input type="password" id="api_key" name="api_key" placeholder="{{key_placeholder}}" autocomplete="off">
<label><input type="checkbox" name="clear_api_key" value="true"> Clear the key</label>
<label for="model">Select Model</label>
<select id="model" name="model">
{{#each models}}
<option value="{{label}}"{{#if selected}} selected{{/if}}>{{label}}</option>
{{/each}}
</select>
</aside>
<main class="main">
<h1>🧠 {{title}}</h1>
<p>{{tagline}}</p>
<section class="transcript">
{{#each messages}}
<div class="chat-message {{role}}" data-role="{{role}}">{{{html}}}</div>
{{/each}}
</section>
<div class="chat-input">
<input type="text" name="message" placeholder="{{placeholder}}" autofocus>
<button type="submit">Send</button>
</div>
</main>
</form>
</body>
</html>
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(&Template::ChatPage.to_string(), CHAT_PAGE)
        .expect("Failed to register template");
    registry
}

#[derive(Serialize)]
struct ModelChoice {
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct MessageView {
    role: Role,
    html: String,
}

#[derive(Serialize)]
struct ChatPage<'a> {
    title: &'static str,
    tagline: &'static str,
    placeholder: &'static str,
    session_id: &'a str,
    key_placeholder: &'static str,
    models: Vec<ModelChoice>,
    messages: Vec<MessageView>,
}

fn is_safe_url(url: &str) -> bool {
    let scheme = url
        .split_once(':')
        .map(|(scheme, _)| scheme.trim().to_ascii_lowercase());
    match scheme {
        // No scheme at all or a `:` after a path or query means a relative link
        None => true,
        Some(scheme) if scheme.contains(['/', '?', '#']) => true,
        Some(scheme) => matches!(scheme.as_str(), "http" | "https" | "mailto"),
    }
}

/// Renders message content as Markdown. Raw HTML in the source is
/// shown as text and links with scripting schemes are neutralized.
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let events = Parser::new_ext(content, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        event => event,
    });

    let mut output = String::new();
    html::push_html(&mut output, events);
    output
}

/// The key field is never filled in. The placeholder only says which
/// key the next turn will use.
fn key_placeholder(session_key: &str, server_key: &str) -> &'static str {
    if session_key.is_empty() {
        NO_KEY_PLACEHOLDER
    } else if session_key == server_key {
        SERVER_KEY_PLACEHOLDER
    } else {
        SESSION_KEY_PLACEHOLDER
    }
}

/// Renders the whole page for a session: settings, every transcript
/// entry in order as a bubble tagged with its role, and the input box.
/// `server_key` is the configured default and is only compared against,
/// neither key is ever written into the page.
pub fn render_chat_page(
    registry: &Handlebars,
    session: &Session,
    server_key: &str,
) -> Result<String> {
    let models = model_options()
        .into_iter()
        .map(|option| ModelChoice {
            label: option.label,
            selected: option.model == *session.model(),
        })
        .collect();

    let page = ChatPage {
        title: PAGE_TITLE,
        tagline: TAGLINE,
        placeholder: INPUT_PLACEHOLDER,
        session_id: session.id(),
        key_placeholder: key_placeholder(session.api_key(), server_key),
        models,
        messages: session
            .transcript()
            .iter()
            .map(|msg| MessageView {
                role: msg.role,
                html: render_markdown(&msg.content),
            })
            .collect(),
    };

    Ok(registry.render(&Template::ChatPage.to_string(), &page)?)
}
