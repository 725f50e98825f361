//! Colored output helpers for CLI

use crate::types::RetrievedChunk;
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
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

    /// Print the one-line startup banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n  {} {}\n",
                "ragkit".bright_cyan().bold(),
                version.dimmed()
            );
        } else {
            println!("\n  ragkit {}\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Errors go to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// One ingested file: `source -> output (n chunks)`
    pub fn ingested(&self, source: &str, output: &str, chunks: usize) {
        if self.colored {
            println!(
                "  {} {} {} {} {}",
                "✓".green().bold(),
                source.dimmed(),
                "→".dimmed(),
                output.bright_white(),
                format!("({} chunks)", chunks).dimmed()
            );
        } else {
            println!("  [INGEST] {} -> {} ({} chunks)", source, output, chunks);
        }
    }

    pub fn answer(&self, answer: &str) {
        if self.colored {
            println!("\n  {}\n  {}", "Answer".bright_white().bold(), answer.bright_green());
        } else {
            println!("\n  Answer:\n  {}", answer);
        }
    }

    /// Ranked retrieval results, text truncated to one line
    pub fn context(&self, chunks: &[RetrievedChunk]) {
        self.header("Context");
        if chunks.is_empty() {
            self.info("No matching chunks");
            return;
        }
        for chunk in chunks {
            let preview = truncate(&chunk.text, 96);
            if self.colored {
                println!(
                    "    {} {} {}",
                    format!("#{}", chunk.rank).bright_cyan().bold(),
                    format!("{:.4}", chunk.score).dimmed(),
                    preview
                );
            } else {
                println!("    #{} {:.4} {}", chunk.rank, chunk.score, preview);
            }
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}…")
}
