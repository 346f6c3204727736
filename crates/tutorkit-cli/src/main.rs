//! tutorkit CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tutorkit", version, about = "AI tutoring backend: chat, practice tests, scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a chat message as a student and print the tutor's reply
    Chat {
        /// Student identifier
        #[arg(long)]
        student: String,

        /// The student's message
        #[arg(long)]
        message: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compose a new practice test from the student's recent conversation
    MakeTest {
        /// Student identifier
        #[arg(long)]
        student: String,

        /// Print the full test as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a submitted answer file against an existing test
    Submit {
        /// Student identifier
        #[arg(long)]
        student: String,

        /// Test identifier returned by make-test
        #[arg(long)]
        test_id: String,

        /// Path to a JSON file holding the answers array
        #[arg(long)]
        answers: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the student's tests with scores and dates
    ListTests {
        /// Student identifier
        #[arg(long)]
        student: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example answers file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tutorkit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat {
            student,
            message,
            config,
        } => commands::chat::execute(student, message, config).await,
        Commands::MakeTest {
            student,
            json,
            config,
        } => commands::make_test::execute(student, json, config).await,
        Commands::Submit {
            student,
            test_id,
            answers,
            config,
        } => commands::submit::execute(student, test_id, answers, config).await,
        Commands::ListTests { student, config } => {
            commands::list_tests::execute(student, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
