//! Colored terminal output for the research-agent CLI.
//!
//! Every status line is a marker followed by text. With colors off the
//! marker becomes a bracketed tag (`[OK]`, `[WARN]`, ...) so output stays
//! greppable when piped.

use crate::types::AgentEvent;
use owo_colors::OwoColorize;

const PREVIEW_CHARS: usize = 120;

#[derive(Clone, Copy)]
enum Tone {
    Ok,
    Info,
    Warn,
    Error,
    Skip,
}

impl Tone {
    fn tag(self) -> &'static str {
        match self {
            Tone::Ok => "[OK]",
            Tone::Info => "[INFO]",
            Tone::Warn => "[WARN]",
            Tone::Error => "[ERROR]",
            Tone::Skip => "[SKIPPED]",
        }
    }

    fn marker(self) -> String {
        match self {
            Tone::Ok => "✓".green().bold().to_string(),
            Tone::Info => "•".blue().to_string(),
            Tone::Warn => "⚠".yellow().bold().to_string(),
            Tone::Error => "✗".red().bold().to_string(),
            Tone::Skip => "○".yellow().to_string(),
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            Tone::Ok => text.green().to_string(),
            Tone::Info => text.to_string(),
            Tone::Warn | Tone::Skip => text.yellow().to_string(),
            Tone::Error => text.red().to_string(),
        }
    }
}

/// Terminal printer; `colored: false` for `--no-color` or piped output.
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn status_line(&self, tone: Tone, text: &str) -> String {
        if self.colored {
            format!("  {} {}", tone.marker(), tone.paint(text))
        } else {
            format!("  {} {}", tone.tag(), text)
        }
    }

    pub fn banner(&self) {
        let version = concat!("v", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "research-agent".bright_cyan().bold(),
                version.dimmed(),
                "planner · researcher · memory · critic · executor".dimmed()
            );
        } else {
            println!(
                "\n   research-agent {}\n   planner, researcher, memory, critic, executor\n",
                version
            );
        }
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.status_line(Tone::Ok, message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.status_line(Tone::Info, message));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.status_line(Tone::Warn, message));
    }

    /// Goes to stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.status_line(Tone::Error, message));
    }

    /// `created("config", "research-agent.toml")`
    pub fn created(&self, kind: &str, path: &str) {
        if self.colored {
            println!("  {} {} {}", Tone::Ok.marker(), kind.dimmed(), path.bright_white());
        } else {
            println!("  [CREATED] {} {}", kind, path);
        }
    }

    pub fn created_dir(&self, path: &str) {
        self.created("directory", path);
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        println!("{}", self.status_line(Tone::Skip, &format!("{} ({})", path, reason)));
    }

    /// Numbered workflow step, e.g. `[3/7] gather_research`.
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        let counter = format!("[{}/{}]", step_num, total);
        if self.colored {
            println!("  {} {}", counter.dimmed(), message.bright_white());
        } else {
            println!("  {} {}", counter, message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        let bullet = if self.colored {
            Tone::Info.marker()
        } else {
            "-".to_string()
        };
        println!("    {} {}", bullet, item);
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Shell command the user can copy.
    pub fn command(&self, cmd: &str) {
        let line = format!("$ {}", cmd);
        if self.colored {
            println!("     {}", line.bright_cyan());
        } else {
            println!("     {}", line);
        }
    }

    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", Tone::Ok.marker(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// One agent event: source, event name, then its fields as JSON.
    pub fn event(&self, source: &str, event: &AgentEvent) {
        let fields = serde_json::Value::Object(event.fields.clone()).to_string();
        if self.colored {
            println!(
                "    {} {} {}",
                format!("{:<11}", source).dimmed(),
                format!("{:<22}", event.event).cyan(),
                fields.dimmed()
            );
        } else {
            println!("    {:<11} {:<22} {}", source, event.event, fields);
        }
    }

    /// Ranked search hit: rank, score and id, then a one-line preview.
    pub fn hit(&self, rank: usize, score: f32, id: &str, content: &str) {
        let preview: String = content
            .chars()
            .take(PREVIEW_CHARS)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        if self.colored {
            println!(
                "  {} {} {}",
                format!("{}.", rank).bright_white().bold(),
                format!("{:.4}", score).green(),
                id.dimmed()
            );
        } else {
            println!("  {}. {:.4} {}", rank, score, id);
        }
        println!("     {}", preview);
    }

    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_status_lines_use_tags() {
        let output = Output::no_color();
        assert_eq!(output.status_line(Tone::Ok, "stored"), "  [OK] stored");
        assert_eq!(output.status_line(Tone::Warn, "placeholder"), "  [WARN] placeholder");
        assert_eq!(output.status_line(Tone::Skip, "data (exists)"), "  [SKIPPED] data (exists)");
    }

    #[test]
    fn test_colored_status_lines_keep_text() {
        let output = Output::new();
        let line = output.status_line(Tone::Error, "store unavailable");
        assert!(line.contains("store unavailable"));
        assert!(!line.contains("[ERROR]"));
    }

    #[test]
    fn test_printers_do_not_panic() {
        for output in [Output::no_color(), Output::default()] {
            output.banner();
            output.success("stored");
            output.info("info");
            output.warning("warn");
            output.error("error");
            output.step(3, 7, "gather_research");
            output.created("config", "research-agent.toml");
            output.created_dir("data");
            output.skipped("data", "already exists");
            output.header("Workflow steps");
            output.subheader("planner");
            output.kv("queue_length", "0");
            output.list_item("item_1 --about--> AI papers");
            output.hint("Use --force");
            output.command("research-agent run");
            output.complete("done");
            output.event("critic", &AgentEvent::new("monitor_outcome").with("task", "research_1"));
            output.hit(1, 0.9731, "item_1", "Result 1: Stub result\n\nResult 2: Stub result");
            output.newline();
        }
    }
}
