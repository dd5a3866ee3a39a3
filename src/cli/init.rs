//! Init command implementation
//!
//! Writes a default `research-agent.toml`, a `.env.example` and the data
//! directory used by the SQLite store.

use super::output::Output;
use crate::utils::toml_config::{AgentConfig, DEFAULT_CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (research-agent.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing research-agent");

    let base_path = &config.path;
    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.skipped("data", "already exists");
    } else if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created_dir("data");
    }

    let toml_content = match generate_config_toml() {
        Ok(content) => content,
        Err(e) => {
            output.error(&format!("Failed to render configuration: {}", e));
            return InitResult::Error(e);
        }
    };
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, ENV_EXAMPLE, config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.complete("research-agent initialized");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set your API key (optional; without it embeddings are placeholders):");
    output.command("cp .env.example .env");
    output.newline();
    output.info("2. Run the research workflow:");
    output.command("research-agent run");
    output.newline();

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

const CONFIG_HEADER: &str = "\
# research-agent configuration
#
# Every key is optional. API keys are read from the environment variable
# named by `api_key_env` (a .env file in the working directory is loaded).
# Set embedding.fallback = \"abort\" to fail instead of storing placeholder
# embeddings when the embedding provider is unavailable.

";

const ENV_EXAMPLE: &str = "\
# Used for embeddings and, when [llm] enabled = true, critic reflection
OPENAI_API_KEY=

# Log filter, overrides [logging] level
# RUST_LOG=research_agent=debug
";

/// Default configuration file contents
pub fn generate_config_toml() -> Result<String, String> {
    let body = AgentConfig::default()
        .to_toml_string()
        .map_err(|e| e.to_string())?;
    Ok(format!("{}{}", CONFIG_HEADER, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let text = generate_config_toml().unwrap();
        assert!(text.starts_with("# research-agent configuration"));
        assert_eq!(AgentConfig::from_toml_str(&text).unwrap(), AgentConfig::default());
    }

    #[test]
    fn test_init_writes_files_once() {
        let dir = tempfile::tempdir().unwrap();
        let output = Output::no_color();

        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: false,
            },
            &output,
        );
        assert!(matches!(result, InitResult::Success));
        assert!(dir.path().join(DEFAULT_CONFIG_FILE).exists());
        assert!(dir.path().join(".env.example").exists());
        assert!(dir.path().join("data").is_dir());

        let again = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: false,
            },
            &output,
        );
        assert!(matches!(again, InitResult::AlreadyExists));
    }
}
