//! Colored output helpers for CLI
//!
//! Terminal rendering for the fitcoach pages: status lines, chat bubbles,
//! tables and trend sparklines.

use crate::state::{Banner, ChangeTone};
use crate::types::MessageRole;
use owo_colors::OwoColorize;
use std::io::{self, Write};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const PLAIN_LEVELS: [char; 8] = ['_', '.', '-', '~', '=', '+', '*', '#'];

/// Output style configuration
#[derive(Debug, Clone, Copy)]
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

    /// Print the fitcoach banner
    pub fn banner(&self) {
        let title = "FITCOACH";
        let subtitle = format!("AI gym coach proxy v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "▟█▙".bright_green().bold(),
                title.bright_white().bold(),
                subtitle.dimmed()
            );
        } else {
            println!("\n   [{}]\n   {}\n", title, subtitle);
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

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a mutation banner as a success or error line.
    pub fn status(&self, banner: &Banner) {
        if banner.is_success() {
            self.success(&banner.message);
        } else {
            self.error(&banner.message);
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
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "›".dimmed(), message.dimmed().italic());
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

    /// Print a block of text indented under the current section.
    pub fn body(&self, text: &str) {
        for line in text.lines() {
            println!("    {}", line);
        }
    }

    /// Print one chat message.
    pub fn message(&self, role: MessageRole, content: &str, tag: Option<&str>) {
        let (who, plain) = match role {
            MessageRole::User => ("You", "[you]"),
            MessageRole::Assistant => ("Coach", "[coach]"),
        };
        if self.colored {
            let name = match role {
                MessageRole::User => who.bright_blue().bold().to_string(),
                MessageRole::Assistant => who.bright_green().bold().to_string(),
            };
            match tag {
                Some(tag) => println!("\n  {} {}", name, format!("[{}]", tag).magenta()),
                None => println!("\n  {}", name),
            }
        } else {
            match tag {
                Some(tag) => println!("\n  {} [{}]", plain, tag),
                None => println!("\n  {}", plain),
            }
        }
        self.body(content);
    }

    /// Print a trend change colored by whether it is progress.
    pub fn change(&self, text: &str, tone: ChangeTone) {
        if self.colored {
            let text = match tone {
                ChangeTone::Improving => text.green().bold().to_string(),
                ChangeTone::Declining => text.red().bold().to_string(),
                ChangeTone::Neutral => text.bright_white().to_string(),
            };
            println!("    {}: {}", "Change".dimmed(), text);
        } else {
            println!("    Change: {}", text);
        }
    }

    /// Print a sparkline of `values`.
    pub fn chart(&self, values: &[f64]) {
        let line = sparkline(values, !self.colored);
        if self.colored {
            println!("    {}", line.bright_cyan());
        } else {
            println!("    {}", line);
        }
    }

    /// Prompt for confirmation (returns true if user confirms)
    pub fn confirm(&self, message: &str) -> bool {
        if self.colored {
            print!(
                "  {} {} [y/N]: ",
                "?".bright_yellow().bold(),
                message.bright_white()
            );
        } else {
            print!("  [?] {} [y/N]: ", message);
        }

        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            input == "y" || input == "yes"
        } else {
            false
        }
    }

    /// Read one line from stdin after printing `label`.
    pub fn prompt(&self, label: &str) -> Option<String> {
        if self.colored {
            print!("  {} {}: ", "?".bright_yellow().bold(), label.bright_white());
        } else {
            print!("  [?] {}: ", label);
        }
        io::stdout().flush().ok();

        let mut input = String::new();
        io::stdin().read_line(&mut input).ok()?;
        let input = input.trim_end_matches(['\r', '\n']).to_string();
        (!input.is_empty()).then_some(input)
    }

    pub fn table_header(&self, columns: &[&str]) {
        let header = table_line(columns);
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(columns.len() * 16).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(columns.len() * 16));
        }
    }

    pub fn table_row(&self, values: &[&str]) {
        println!("    {}", table_line(values));
    }

    pub fn newline(&self) {
        println!();
    }
}

fn table_line(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|c| format!("{:<15}", truncate(c, 15)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shorten `text` to at most `max` characters, ending in `…` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max && !text.contains('\n') {
        return first_line.to_string();
    }
    let kept: String = first_line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// One character per value, scaled between the series minimum and maximum.
pub fn sparkline(values: &[f64], ascii: bool) -> String {
    let levels = if ascii { &PLAIN_LEVELS } else { &SPARK_LEVELS };
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = levels.len() - 1;

    values
        .iter()
        .map(|v| {
            if !v.is_finite() {
                ' '
            } else if span <= f64::EPSILON {
                levels[top / 2]
            } else {
                let idx = (((v - min) / span) * top as f64).round() as usize;
                levels[idx.min(top)]
            }
        })
        .collect()
}
