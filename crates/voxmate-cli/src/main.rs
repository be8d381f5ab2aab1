//! voxmate CLI: Command-line interface for the VoxMate assistant client

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use voxmate_engine::{
    validate_language, validate_pdf_path, validate_prompt, validate_speech_text, ApiClient,
    Attachment, ChatSession, Config, FileStore, KeyValueStore, Role, SpeechPad,
};

/// Terminal client for the VoxMate assistant backend
#[derive(Parser)]
#[command(name = "voxmate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (defaults to ~/.voxmate/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one chat message and print the reply
    Chat {
        /// The message to send
        message: String,

        /// Attach an image (sent to image search)
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Translate text into a target language
    Translate {
        /// The text to translate
        text: String,

        /// Target language code (e.g. fr, hi, zh-tw)
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Synthesize speech for text and print the audio URL
    Speak {
        /// The text to speak
        text: String,

        /// Target language code
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Upload a PDF and print its summary
    Summarize {
        /// Path to the PDF file
        file: PathBuf,

        /// Summarization prompt
        #[arg(long, default_value = voxmate_engine::DEFAULT_PROMPT)]
        prompt: String,
    },

    /// Print the active conversation
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discard the conversation and start a new one
    Clear,

    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);

    if matches!(&cli.command, Some(Commands::Init)) {
        cmd_init(&config_path);
        return;
    }

    let config = if config_path.exists() {
        match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    match cli.command {
        None | Some(Commands::Tui) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            if let Err(e) = rt.block_on(voxmate_tui::run_tui(config)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { message, image }) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(cmd_chat(&config, &message, image));
        }
        Some(Commands::Translate { text, language }) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(cmd_translate(&config, &text, &language));
        }
        Some(Commands::Speak { text, language }) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(cmd_speak(&config, &text, &language));
        }
        Some(Commands::Summarize { file, prompt }) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(cmd_summarize(&config, &file, &prompt));
        }
        Some(Commands::Status { json }) => {
            cmd_status(&config, json);
        }
        Some(Commands::Clear) => {
            cmd_clear(&config);
        }
        Some(Commands::Init) => unreachable!("handled above"),
    }
}

fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match FileStore::new(config.data_dir()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open state directory: {e}");
            std::process::exit(1);
        }
    }
}

fn open_client(config: &Config) -> ApiClient {
    match ApiClient::with_timeout(
        &config.base_url,
        Duration::from_secs(config.timeout_seconds),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {e}");
            std::process::exit(1);
        }
    }
}

fn open_session(config: &Config) -> ChatSession {
    let store = open_store(config);
    let client = open_client(config);
    match ChatSession::load(store, client, &config.user_id) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to load conversation: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_init(config_path: &std::path::Path) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    let config = Config::default();
    match config.save(config_path) {
        Ok(()) => {
            println!("Created {}", config_path.display());
            println!("Backend: {}", config.base_url);
            println!("Edit the file to point at your backend.");
        }
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
}

async fn cmd_chat(config: &Config, message: &str, image: Option<PathBuf>) {
    let mut session = open_session(config);

    let attachment = match image {
        Some(path) => match Attachment::image(path) {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    match session.send_user_turn(message, attachment).await {
        Ok(Some(reply)) => {
            println!("{}", reply.content);
            if let Some(url) = reply.audio_url() {
                println!("\n[audio] {url}");
            }
        }
        Ok(None) => {
            eprintln!("Nothing to send.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn cmd_translate(config: &Config, text: &str, language: &str) {
    if let Err(e) = validate_speech_text(text) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = validate_language(language) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let client = open_client(config);
    match client.translate(text, language).await {
        Ok(translated) => {
            println!("{translated}");

            // Mirror the result into the speak-screen state
            let store = open_store(config);
            let session = ChatSession::load(store.clone(), open_client(config), &config.user_id);
            if let Ok(session) = session {
                if let Ok(mut pad) =
                    SpeechPad::load(store, session.conversation().id.to_string())
                {
                    pad.language = language.to_string();
                    let _ = pad.record_translation(text, &translated);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn cmd_speak(config: &Config, text: &str, language: &str) {
    if let Err(e) = validate_speech_text(text) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = validate_language(language) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let client = open_client(config);
    match client.synthesize(text, language).await {
        Ok(url) => println!("{url}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn cmd_summarize(config: &Config, file: &std::path::Path, prompt: &str) {
    if let Err(e) = validate_pdf_path(file) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = validate_prompt(prompt) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let session = open_session(config);
    let client = open_client(config);
    match client
        .upload_pdf(file, prompt, &session.conversation().id, &config.user_id)
        .await
    {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_status(config: &Config, json: bool) {
    let session = open_session(config);
    let conversation = session.conversation();

    if json {
        let output = serde_json::json!({
            "conversation_id": conversation.id,
            "messages": conversation.messages.len(),
            "updated_at": conversation.updated_at(),
            "backend": config.base_url,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).expect("failed to serialize")
        );
        return;
    }

    println!("VoxMate Status\n");
    println!("Conversation: {}", conversation.id);
    println!("Backend: {}", config.base_url);
    println!("Messages: {}", conversation.messages.len());

    if let Some(last) = conversation.last() {
        let speaker = match last.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        let preview: String = last.content.chars().take(60).collect();
        println!("Last ({speaker}): {preview}");
    }
}

fn cmd_clear(config: &Config) {
    let mut session = open_session(config);
    let old_id = session.conversation().id.clone();

    if let Err(e) = session.clear() {
        eprintln!("Failed to clear conversation: {e}");
        std::process::exit(1);
    }

    // Drop the speak-screen state tied to the old conversation
    let store = open_store(config);
    if let Ok(mut pad) = SpeechPad::load(store, old_id) {
        let _ = pad.clear(session.conversation().id.clone());
    }

    println!("Started new conversation {}", session.conversation().id);
}
