//! The `tutorkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create tutorkit.toml
    if std::path::Path::new("tutorkit.toml").exists() {
        println!("tutorkit.toml already exists, skipping.");
    } else {
        std::fs::write("tutorkit.toml", SAMPLE_CONFIG)?;
        println!("Created tutorkit.toml");
    }

    // Create an example answers file
    std::fs::create_dir_all("answers")?;
    let example_path = std::path::Path::new("answers/example.json");
    if example_path.exists() {
        println!("answers/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ANSWERS)?;
        println!("Created answers/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit tutorkit.toml with your API key");
    println!("  2. Run: tutorkit chat --student demo --message \"What is photosynthesis?\"");
    println!("  3. Run: tutorkit make-test --student demo");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tutorkit configuration

default_provider = "cohere"
default_model = "command-r-plus"
database_url = "tutorkit.db"

[providers.cohere]
type = "cohere"
api_key = "${COHERE_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;

const EXAMPLE_ANSWERS: &str = r#"[
  {
    "type": "mcq",
    "subject": "Math",
    "question": "What is 5 + 3?",
    "answer": "8",
    "studentAnswer": "8"
  },
  {
    "type": "short",
    "subject": "Science",
    "question": "Why is the sun important for life on Earth?",
    "answer": "",
    "studentAnswer": "It gives plants light to grow."
  }
]
"#;
