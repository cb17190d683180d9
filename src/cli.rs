//! CLI interface for learncore

use clap::{Parser, Subcommand};
use anyhow::Result;

#[derive(Parser)]
#[command(name = "learncore")]
#[command(about = "Learning platform client: activity tracking, course recommendations, and AI tutor chat", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record learning activity
    Track {
        #[command(subcommand)]
        command: TrackCommands,
    },
    /// Show course recommendations (default when no command given)
    Recommend {
        /// Path to a catalog JSON file (default: bundled catalog)
        #[arg(short, long)]
        catalog: Option<std::path::PathBuf>,
        /// Maximum courses to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Seed the exploration bonus for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show study insights derived from tracked activity
    Insights,
    /// Show the learning profile derived from tracked activity
    Profile,
    /// Print tracked activity and preferences as JSON
    Export,
    /// Clear all tracked activity
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Ask the AI tutor a question
    Chat {
        /// The question to ask
        message: String,
        /// Continue a saved session by ID
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Manage saved tutor sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Manage study notes on the backend
    Notes {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Log in to the backend
    Login {
        /// Username
        username: String,
    },
    /// Create a backend account
    Register {
        /// Username
        username: String,
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Log out and clear the stored session token
    Logout,
    /// Show unread notification counts
    Notify {
        /// Keep polling instead of fetching once
        #[arg(short, long)]
        watch: bool,
    },
    /// Configure learncore
    Config {
        /// Set the tutor API key
        #[arg(long)]
        set_tutor_key: Option<String>,
        /// Set the backend API base URL
        #[arg(long)]
        set_base_url: Option<String>,
        /// Set the default recommendation limit
        #[arg(long)]
        set_limit: Option<usize>,
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
enum TrackCommands {
    /// Record a course view
    View {
        /// Course ID
        id: String,
        /// Course subject (e.g. mathematics, programming)
        #[arg(short, long)]
        subject: Option<String>,
        /// Course difficulty level (beginner, intermediate, advanced)
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Record time spent on a course
    Time {
        /// Course ID
        id: String,
        /// Seconds spent
        seconds: u64,
    },
    /// Mark a course as completed
    Complete {
        /// Course ID
        id: String,
    },
    /// Record a search query
    Search {
        /// Search query
        query: String,
    },
    /// Record a click on a course
    Click {
        /// Course ID
        id: String,
    },
    /// Bookmark or unbookmark a course
    Bookmark {
        /// Course ID
        id: String,
        /// Remove the bookmark instead of adding it
        #[arg(short, long)]
        remove: bool,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List saved sessions, most recent first
    List,
    /// Show a saved session transcript
    Show {
        /// Session ID
        id: String,
    },
    /// Delete all saved sessions
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// List notes
    List,
    /// Create a note
    Add {
        /// Note title
        title: String,
        /// Note content
        #[arg(short, long)]
        content: String,
    },
    /// Update a note
    Edit {
        /// Note ID
        id: u64,
        /// New title
        #[arg(short, long)]
        title: String,
        /// New content
        #[arg(short, long)]
        content: String,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: u64,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Default to the recommendation view if no command given
    match cli.command {
        None => {
            show_recommendations(None, None, None).await?;
        }
        Some(Commands::Track { command }) => {
            track(command).await?;
        }
        Some(Commands::Recommend { catalog, limit, seed }) => {
            show_recommendations(catalog, limit, seed).await?;
        }
        Some(Commands::Insights) => {
            show_insights().await?;
        }
        Some(Commands::Profile) => {
            show_profile().await?;
        }
        Some(Commands::Export) => {
            export_profile().await?;
        }
        Some(Commands::Reset { yes }) => {
            reset_activity(yes).await?;
        }
        Some(Commands::Chat { message, session }) => {
            chat(&message, session).await?;
        }
        Some(Commands::Sessions { command }) => {
            match command {
                SessionCommands::List => {
                    list_sessions().await?;
                }
                SessionCommands::Show { id } => {
                    show_session(&id).await?;
                }
                SessionCommands::Clear { yes } => {
                    clear_sessions(yes).await?;
                }
            }
        }
        Some(Commands::Notes { command }) => {
            notes(command).await?;
        }
        Some(Commands::Login { username }) => {
            login(&username).await?;
        }
        Some(Commands::Register { username, email }) => {
            register(&username, &email).await?;
        }
        Some(Commands::Logout) => {
            logout().await?;
        }
        Some(Commands::Notify { watch }) => {
            notify(watch).await?;
        }
        Some(Commands::Config { set_tutor_key, set_base_url, set_limit, show, reset }) => {
            if let Some(key) = set_tutor_key {
                crate::config::set_tutor_key(&key)?;
            } else if let Some(url) = set_base_url {
                crate::config::set_base_url(&url)?;
            } else if let Some(limit) = set_limit {
                crate::config::set_recommendation_limit(limit)?;
            } else if reset {
                crate::config::reset_config()?;
            } else if show {
                crate::config::show_config()?;
            } else {
                println!("Configuration options:");
                println!("  --set-tutor-key <key>  Store the tutor API key in the system keyring");
                println!("  --set-base-url <url>   Set the backend API base URL");
                println!("  --set-limit <n>        Set the default recommendation limit");
                println!("  --show                 Display current configuration");
                println!("  --reset                Restore default configuration");
            }
        }
    }

    Ok(())
}

/// Open the interaction store backed by the default data directory
async fn open_store() -> Result<crate::interactions::InteractionStore> {
    let repo = crate::storage::JsonFileRepository::new()?;
    crate::interactions::InteractionStore::open(std::sync::Arc::new(repo)).await
}

/// Record a single tracking event
async fn track(command: TrackCommands) -> Result<()> {
    let store = open_store().await?;

    match command {
        TrackCommands::View { id, subject, level } => {
            let meta = crate::interactions::CourseMeta::new(subject, level);
            store.record_view(&id, Some(&meta)).await?;
            println!("View recorded: {}", id);
        }
        TrackCommands::Time { id, seconds } => {
            store.record_time_spent(&id, seconds).await?;
            println!("Recorded {}s on {}", seconds, id);
        }
        TrackCommands::Complete { id } => {
            store.record_completion(&id).await?;
            println!("✓ Course completed: {}", id);
        }
        TrackCommands::Search { query } => {
            store.record_search(&query).await?;
            if query.trim().chars().count() < crate::interactions::MIN_SEARCH_QUERY_LEN {
                println!(
                    "Query too short to track (minimum {} characters).",
                    crate::interactions::MIN_SEARCH_QUERY_LEN
                );
            } else {
                println!("Search recorded: {}", query);
            }
        }
        TrackCommands::Click { id } => {
            store.record_click(&id).await?;
            println!("Click recorded: {}", id);
        }
        TrackCommands::Bookmark { id, remove } => {
            store.toggle_bookmark(&id, !remove).await?;
            if remove {
                println!("Bookmark removed: {}", id);
            } else {
                println!("✓ Bookmarked: {}", id);
            }
        }
    }

    Ok(())
}

/// Score the catalog against tracked activity and print the top picks
async fn show_recommendations(
    catalog_path: Option<std::path::PathBuf>,
    limit: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let config = crate::config::Config::load()?;
    let store = open_store().await?;
    let record = store.snapshot().await;

    let courses = match catalog_path {
        Some(ref path) => crate::catalog::load_catalog(path)?,
        None => crate::catalog::bundled_catalog()?,
    };

    let weights = config.recommend.weights.clone();
    let recommender = match seed {
        Some(seed) => crate::recommend::Recommender::with_seed(weights, seed),
        None => crate::recommend::Recommender::new(weights),
    };

    let limit = limit.unwrap_or(config.recommend.limit);
    let picks = recommender.recommend(&record, &courses, Some(limit));

    if picks.is_empty() {
        println!("No courses available to recommend.");
        return Ok(());
    }

    println!("\n📚 Recommended for you:\n");
    for (i, pick) in picks.iter().enumerate() {
        let subject = pick.course.subject.as_deref().unwrap_or("general");
        let level = pick.course.level.as_deref().unwrap_or("any level");
        println!("{}. {} ({}, {})", i + 1, pick.course.title, subject, level);
        println!(
            "   Rating: {:.1}  Students: {}  Score: {:.1}",
            pick.course.rating, pick.course.students, pick.score
        );
        println!();
    }

    Ok(())
}

/// Print the canned study insights
async fn show_insights() -> Result<()> {
    let store = open_store().await?;
    let record = store.snapshot().await;
    let insights = crate::recommend::generate_insights(&record);

    println!("\n💡 Study insights:\n");
    for insight in &insights {
        println!("[{}] {}", insight.priority, insight.title);
        println!("   {}", insight.message);
        println!("   Suggested: {}", insight.action);
        println!();
    }

    Ok(())
}

/// Print the derived learning profile and activity totals
async fn show_profile() -> Result<()> {
    let store = open_store().await?;
    let record = store.snapshot().await;
    let profile = crate::recommend::build_profile(&record);

    println!("\nLearning Profile");
    println!("================");
    println!("Style:        {}", profile.style);
    println!("Difficulty:   {}", profile.difficulty);
    if profile.subjects.is_empty() {
        println!("Top subjects: (none tracked yet)");
    } else {
        println!("Top subjects: {}", profile.subjects.join(", "));
    }
    println!();
    println!("Course views:   {}", record.total_views());
    println!("Time tracked:   {}s", record.total_time_spent());
    println!("Completed:      {}", record.completed_courses.len());
    println!("Bookmarked:     {}", record.bookmarked_courses.len());
    println!("Searches:       {}", record.search_queries.len());
    println!("Clicks:         {}", record.clicked_courses.len());

    Ok(())
}

/// Dump the full activity export as pretty JSON
async fn export_profile() -> Result<()> {
    let store = open_store().await?;
    let export = store.export().await;
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}

/// Clear all tracked activity
async fn reset_activity(skip_confirm: bool) -> Result<()> {
    let store = open_store().await?;

    if !skip_confirm {
        println!("This will clear ALL tracked activity and bookmarks!");
        println!("Type 'yes' to confirm:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "yes" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.reset().await?;
    println!("Activity cleared.");

    Ok(())
}

/// Send one message to the tutor and print the reply
async fn chat(message: &str, session: Option<String>) -> Result<()> {
    let config = crate::config::Config::load()?;
    let transcripts = crate::tutor::TranscriptStore::new()?;
    let session_id = session.unwrap_or_else(crate::tutor::TranscriptStore::new_session);

    transcripts.append(&session_id, &crate::types::Message::user(message))?;

    // The system prompt is rebuilt each turn, never persisted
    let mut messages = vec![crate::types::Message::system(crate::tutor::TUTOR_SYSTEM_PROMPT)];
    messages.extend(transcripts.load(&session_id)?);

    let client = crate::tutor::TutorClient::from_config(&config);
    let reply = client.ask(&messages).await;

    transcripts.append(&session_id, &crate::types::Message::assistant(reply.content.clone()))?;

    println!("\n{}\n", reply.content);
    let short_id = crate::tutor::TranscriptStore::short_id(&session_id);
    match reply.source {
        crate::tutor::ReplySource::Provider(ref name) => {
            println!("[session {} via {}]", short_id, name);
        }
        crate::tutor::ReplySource::Offline => {
            println!("[session {} offline reply]", short_id);
            println!("Set a tutor API key with 'learncore config --set-tutor-key <KEY>' for live answers.");
        }
    }

    Ok(())
}

/// List saved tutor sessions
async fn list_sessions() -> Result<()> {
    let transcripts = crate::tutor::TranscriptStore::new()?;
    let sessions = transcripts.list_sessions()?;

    if sessions.is_empty() {
        println!("No saved tutor sessions.");
        return Ok(());
    }

    println!("{} session(s), most recent first:\n", sessions.len());
    for id in &sessions {
        let messages = transcripts.load(id)?;
        println!("  {}  ({} messages)", id, messages.len());
        let preview = messages
            .iter()
            .find(|m| m.role == crate::types::Role::User)
            .map(|m| m.content.chars().take(60).collect::<String>())
            .unwrap_or_default();
        if !preview.is_empty() {
            println!("    \"{}\"", preview);
        }
    }

    Ok(())
}

/// Show a saved session transcript
async fn show_session(id: &str) -> Result<()> {
    let transcripts = crate::tutor::TranscriptStore::new()?;
    let messages = transcripts.load(id)?;

    if messages.is_empty() {
        eprintln!("No transcript found for session: {}", id);
        eprintln!("Use 'learncore sessions list' to see saved sessions.");
        return Ok(());
    }

    println!("\n=== Session: {} ===\n", id);
    for msg in &messages {
        let speaker = match msg.role {
            crate::types::Role::User => "You",
            crate::types::Role::Assistant => "Tutor",
            crate::types::Role::System => "System",
        };
        println!("{} ({}):", speaker, msg.timestamp.format("%Y-%m-%d %H:%M"));
        println!("{}", msg.content);
        println!();
    }

    Ok(())
}

/// Delete all saved tutor sessions
async fn clear_sessions(skip_confirm: bool) -> Result<()> {
    let transcripts = crate::tutor::TranscriptStore::new()?;
    let sessions = transcripts.list_sessions()?;

    if sessions.is_empty() {
        println!("No saved tutor sessions.");
        return Ok(());
    }

    if !skip_confirm {
        println!("This will delete {} saved session(s)!", sessions.len());
        println!("Type 'yes' to confirm:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "yes" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = transcripts.clear()?;
    println!("Deleted {} session(s).", deleted);

    Ok(())
}

/// Run a backend call, forcing a local logout when the session is rejected
async fn run_api<T>(call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match call.await {
        Ok(value) => Ok(value),
        Err(e) => {
            if matches!(
                e.downcast_ref::<crate::api::ApiError>(),
                Some(crate::api::ApiError::Unauthorized)
            ) {
                crate::api::auth::clear_token()?;
                anyhow::bail!("Session expired or invalid. Log in again with 'learncore login <username>'.");
            }
            Err(e)
        }
    }
}

/// Manage study notes on the backend
async fn notes(command: NoteCommands) -> Result<()> {
    let config = crate::config::Config::load()?;
    let client = crate::api::ApiClient::from_config(&config);

    if !client.has_token().await {
        eprintln!("Not logged in. Run 'learncore login <username>' first.");
        std::process::exit(1);
    }

    match command {
        NoteCommands::List => {
            let notes = run_api(crate::api::notes::list_notes(&client)).await?;
            if notes.is_empty() {
                println!("No notes yet.");
                println!("Use 'learncore notes add <title> --content \"...\"' to create one.");
                return Ok(());
            }
            println!("{} note(s):\n", notes.len());
            for note in &notes {
                println!("#{}  {}", note.id, note.title);
                let preview: String = note.content.chars().take(80).collect();
                if !preview.is_empty() {
                    println!("    {}", preview);
                }
                if let Some(ref updated) = note.updated_at {
                    println!("    Updated: {}", updated);
                }
                println!();
            }
        }
        NoteCommands::Add { title, content } => {
            let note = run_api(crate::api::notes::create_note(&client, &title, &content)).await?;
            println!("✓ Note created with ID {}", note.id);
        }
        NoteCommands::Edit { id, title, content } => {
            let note = run_api(crate::api::notes::update_note(&client, id, &title, &content)).await?;
            println!("✓ Note {} updated", note.id);
        }
        NoteCommands::Delete { id } => {
            run_api(crate::api::notes::delete_note(&client, id)).await?;
            println!("✓ Note {} deleted", id);
        }
    }

    Ok(())
}

/// Log in to the backend, prompting for the password with echo disabled
async fn login(username: &str) -> Result<()> {
    let config = crate::config::Config::load()?;
    let client = crate::api::ApiClient::from_config(&config);

    use std::io::Write;
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let password = read_password()?;
    if password.is_empty() {
        eprintln!("Password cannot be empty.");
        std::process::exit(1);
    }

    crate::api::auth::login(&client, username, &password).await?;
    match crate::api::auth::current_user(&client).await {
        Ok(profile) if !profile.email.is_empty() => {
            println!("Logged in as {} ({}).", profile.username, profile.email)
        }
        _ => println!("Logged in as {}.", username),
    }

    Ok(())
}

/// Create a backend account and log in
async fn register(username: &str, email: &str) -> Result<()> {
    let config = crate::config::Config::load()?;
    let client = crate::api::ApiClient::from_config(&config);

    use std::io::Write;
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let password = read_password()?;
    eprint!("Confirm password: ");
    std::io::stderr().flush()?;
    let confirm = read_password()?;
    if password != confirm {
        eprintln!("Passwords do not match.");
        std::process::exit(1);
    }
    if password.is_empty() {
        eprintln!("Password cannot be empty.");
        std::process::exit(1);
    }

    crate::api::auth::register(&client, username, email, &password).await?;
    println!("Account created. You are logged in as {}.", username);

    Ok(())
}

/// Log out and clear the stored session token
async fn logout() -> Result<()> {
    let config = crate::config::Config::load()?;
    let client = crate::api::ApiClient::from_config(&config);
    crate::api::auth::logout(&client).await?;
    println!("Logged out.");
    Ok(())
}

/// Fetch the unread notification count once, or keep polling with --watch
async fn notify(watch: bool) -> Result<()> {
    let config = crate::config::Config::load()?;
    let client = std::sync::Arc::new(crate::api::ApiClient::from_config(&config));

    if !client.has_token().await {
        eprintln!("Not logged in. Run 'learncore login <username>' first.");
        std::process::exit(1);
    }

    if !watch {
        let count = run_api(crate::notifications::fetch_unread_count(&client)).await?;
        println!("Unread notifications: {}", count);
        return Ok(());
    }

    let interval = config.notifications.poll_interval_secs;
    let poller = crate::notifications::NotificationPoller::new(client, interval);
    let mut counts = poller.subscribe();
    poller.start();
    println!("Watching unread notifications every {}s (Ctrl+C to stop)...", interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = counts.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("Unread notifications: {}", *counts.borrow_and_update());
            }
        }
    }

    poller.stop();
    Ok(())
}

/// Read a password from stdin with echo disabled (Unix) or simple fallback
fn read_password() -> Result<String> {
    #[cfg(unix)]
    {
        use std::io::BufRead;
        // Disable echo on stdin
        let fd = 0;
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            libc::tcgetattr(fd, &mut termios);
            let original = termios;
            termios.c_lflag &= !libc::ECHO;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);

            let mut line = String::new();
            let result = std::io::stdin().lock().read_line(&mut line);

            // Restore echo
            libc::tcsetattr(fd, libc::TCSANOW, &original);
            eprintln!();

            result?;
            Ok(line.trim().to_string())
        }
    }
    #[cfg(not(unix))]
    {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}
