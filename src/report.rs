//! Terminal status lines and the sweep progress bar. Everything goes to
//! stderr so the output file is the only product of a run.
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Reporter { quiet }
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {}", "[*]".blue().bold(), msg);
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {}", "[OK]".green().bold(), msg);
        }
    }

    pub fn warning(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
        }
    }

    /// Hidden when quiet.
    pub fn progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden());
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message.to_string());
        pb
    }
}

/// Errors are printed even when quiet.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}
