// File: src/session.rs
//! Line-oriented terminal front end for curating a [`Dataset`].
//!
//! The session only talks to the dataset through its public operations; it
//! never touches captions or the tag trie directly.
use crate::config::EditorConfig;
use crate::core::engine::Dataset;
use crate::core::queue::{OnboardingDecision, OnboardingPrompt};
use crate::core::types::TagAction;
use crate::error::Result;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::warn;

/// Asks about captionless images on a terminal.
///
/// Answers: `y` create the caption, `n` skip the image, `Y` create for every
/// remaining image, `N` skip every remaining image.
pub struct TerminalPrompt<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> TerminalPrompt<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> OnboardingPrompt for TerminalPrompt<'_, R, W> {
    fn decide(&mut self, image: &Path, remaining: usize) -> Result<OnboardingDecision> {
        loop {
            writeln!(self.output, "\nNo caption file exists for image:\n  '{}'", image.display())?;
            write!(
                self.output,
                "Create one? [y]es / [n]o / [Y]es to all / [N]o to all ({remaining} more queued) > "
            )?;
            self.output.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                warn!("Input closed during onboarding; skipping the remaining images");
                return Ok(OnboardingDecision::DeclineAll);
            }
            match answer.trim() {
                "y" | "yes" => return Ok(OnboardingDecision::Confirm),
                "n" | "no" => return Ok(OnboardingDecision::Decline),
                "Y" | "all" => return Ok(OnboardingDecision::ConfirmAll),
                "N" | "none" => return Ok(OnboardingDecision::DeclineAll),
                other => writeln!(self.output, "Please answer y, n, Y or N (got '{other}').")?,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub suggestion_limit: usize,
    pub clear_screen: bool,
}

impl From<&EditorConfig> for SessionOptions {
    fn from(config: &EditorConfig) -> Self {
        Self { suggestion_limit: config.suggestion_limit, clear_screen: config.clear_screen }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// `exit`: captions written, with the number saved.
    Saved(usize),
    /// `abort` or end of input: nothing written by the final step.
    Aborted,
}

enum Step {
    Continue,
    Finish(SessionOutcome),
}

pub struct CuratorSession<'d, R, W> {
    dataset: &'d mut Dataset,
    input: R,
    output: W,
    options: SessionOptions,
    mode: TagAction,
    status: String,
    suggestions: Vec<String>,
    suggestions_negated: bool,
}

impl<'d, R: BufRead, W: Write> CuratorSession<'d, R, W> {
    pub fn new(dataset: &'d mut Dataset, input: R, output: W, options: SessionOptions) -> Self {
        Self {
            dataset,
            input,
            output,
            options,
            mode: TagAction::Apply,
            status: String::new(),
            suggestions: Vec::new(),
            suggestions_negated: false,
        }
    }

    pub fn mode(&self) -> TagAction {
        self.mode
    }

    pub fn run(&mut self) -> Result<SessionOutcome> {
        loop {
            self.render()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(SessionOutcome::Aborted);
            }
            match self.handle(line.trim()) {
                Ok(Step::Continue) => {}
                Ok(Step::Finish(outcome)) => return Ok(outcome),
                Err(e) => self.status = format!("error: {e}"),
            }
        }
    }

    fn handle(&mut self, cmd: &str) -> Result<Step> {
        self.status.clear();
        match cmd {
            "" => {}
            "exit" => {
                let saved = self.dataset.save()?;
                return Ok(Step::Finish(SessionOutcome::Saved(saved)));
            }
            "abort" => return Ok(Step::Finish(SessionOutcome::Aborted)),
            "n" | "next" => {
                self.dataset.next();
            }
            "p" | "prev" => {
                self.dataset.previous();
            }
            "save" => {
                let saved = self.dataset.save()?;
                self.status = format!("Saved {saved} captions.");
            }
            "w" => {
                if let Some(image) = self.dataset.current_image().map(Path::to_path_buf) {
                    self.dataset.save_record(&image)?;
                    self.status = format!("Saved caption for {}.", image.display());
                }
            }
            s if s.starts_with("mode ") => {
                self.mode = s["mode ".len()..].parse()?;
                self.status = format!("Mode set to {}.", self.mode.as_str());
            }
            s if s.starts_with('?') => self.suggest(&s[1..]),
            s if s.starts_with(':') && s.len() > 1 => {
                if let Ok(n) = s[1..].parse::<usize>() {
                    if n > 0 && n <= self.suggestions.len() {
                        let chosen = self.suggestions[n - 1].clone();
                        let negate = self.suggestions_negated;
                        self.enter_tag(&chosen, negate)?;
                    }
                }
            }
            s => {
                let text = s.trim_end_matches([',', ' ']).replace(',', "").to_lowercase();
                match text.strip_prefix('-') {
                    Some(tag) => self.enter_tag(tag.trim(), true)?,
                    None => self.enter_tag(text.trim(), false)?,
                }
            }
        }
        Ok(Step::Continue)
    }

    fn suggest(&mut self, text: &str) {
        let text = text.trim().to_lowercase();
        let (prefix, negate) = match text.strip_prefix('-') {
            Some(rest) => (rest.to_string(), true),
            None => (text, false),
        };
        let current = self.dataset.current_image().map(Path::to_path_buf);
        self.suggestions = self.dataset.suggest(
            &prefix,
            current.as_deref(),
            negate,
            self.options.suggestion_limit,
        );
        self.suggestions_negated = negate;
        if self.suggestions.is_empty() {
            self.status = format!("No suggestions for '{prefix}'.");
        }
    }

    fn enter_tag(&mut self, tag: &str, negate: bool) -> Result<()> {
        if tag.is_empty() {
            return Ok(());
        }
        if self.dataset.trigger_word() == Some(tag) {
            self.status = format!("'{tag}' is the trigger word and cannot be changed.");
            return Ok(());
        }
        let action = if negate { self.mode.negated() } else { self.mode };
        let current = self.dataset.current_image().map(Path::to_path_buf);
        let changed = self.dataset.apply(action, tag, current.as_deref())?;
        self.suggestions.clear();
        self.status = match action {
            TagAction::Apply | TagAction::ApplyAll => format!("Added '{tag}' to {changed} caption(s)."),
            TagAction::Delete | TagAction::DeleteAll => {
                format!("Removed '{tag}' from {changed} caption(s).")
            }
        };
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if self.options.clear_screen {
            queue!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        let out = &mut self.output;
        writeln!(out, "Tagman: {}", self.dataset.root().display())?;
        writeln!(out, "---------------------------------------------------------------")?;
        writeln!(out, "Type a tag to add it, '-tag' to remove it, '?text' for suggestions.")?;
        writeln!(out, "'n'/'p' to move, 'mode <apply|apply_all>', 'w' save current, 'save', 'exit', 'abort'.\n")?;

        let total = self.dataset.image_set().len();
        match self.dataset.current_image() {
            Some(image) => {
                let shown = image.strip_prefix(self.dataset.root()).unwrap_or(image);
                writeln!(out, "[{}/{}] {}", self.dataset.display_index() + 1, total, shown.display())?;
                write!(out, "Caption: ")?;
                match self.dataset.record(image)?.caption() {
                    Some(caption) => {
                        for tag in caption.tags() {
                            if Some(tag.as_str()) == self.dataset.trigger_word() {
                                write!(out, "{}, ", tag.as_str().yellow().bold())?;
                            } else {
                                write!(out, "{tag}, ")?;
                            }
                        }
                        writeln!(out)?;
                    }
                    None => writeln!(out, "{}", "(caption could not be read)".dim())?,
                }
            }
            None => writeln!(out, "N/A")?,
        }
        writeln!(out, "Mode: {}", self.mode.as_str())?;

        if !self.suggestions.is_empty() {
            writeln!(out, "\nSuggestions:")?;
            for (i, tag) in self.suggestions.iter().enumerate() {
                writeln!(out, "  :{}: {}", i + 1, tag)?;
            }
        }
        if !self.status.is_empty() {
            writeln!(out, "\n{}", self.status)?;
        }
        write!(out, "\n> ")?;
        out.flush()?;
        Ok(())
    }
}
