//! Answer sources for the wizard: interactive dialoguer prompts, or one line
//! per answer from a reader when running scripted.

use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::cli::output;
use crate::errors::CliError;

pub trait Prompter {
    /// Free-form text. An empty answer keeps `default` when one is given.
    fn text(&mut self, prompt: &str, default: Option<&str>) -> Result<String, CliError>;

    /// Returns the 0-based index of the chosen item.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize, CliError>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError>;
}

pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&mut self, prompt: &str, default: Option<&str>) -> Result<String, CliError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default.filter(|value| !value.is_empty()) {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize, CliError> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Reads answers line by line. Selections accept a 1-based number or the
/// item's label (case-insensitive, prefix match allowed).
pub struct ScriptPrompter<R> {
    reader: R,
}

impl<R: BufRead> ScriptPrompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_line(&mut self, prompt: &str) -> Result<String, CliError> {
        output::prompt(prompt);
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(CliError::InputClosed);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead> Prompter for ScriptPrompter<R> {
    fn text(&mut self, prompt: &str, default: Option<&str>) -> Result<String, CliError> {
        let answer = self.next_line(prompt)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize, CliError> {
        let answer = self.next_line(prompt)?;
        match_choice(&answer, items).ok_or_else(|| {
            CliError::InvalidArguments(format!("`{answer}` is not one of the options"))
        })
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError> {
        let answer = self.next_line(prompt)?.to_ascii_lowercase();
        match answer.as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            other => Err(CliError::InvalidArguments(format!(
                "expected yes or no, got `{other}`"
            ))),
        }
    }
}

fn match_choice(answer: &str, items: &[String]) -> Option<usize> {
    if let Ok(number) = answer.parse::<usize>() {
        return (1..=items.len()).contains(&number).then(|| number - 1);
    }
    let needle = answer.to_ascii_lowercase();
    if needle.is_empty() {
        return None;
    }
    items
        .iter()
        .position(|item| item.to_ascii_lowercase() == needle)
        .or_else(|| {
            items
                .iter()
                .position(|item| item.to_ascii_lowercase().starts_with(&needle))
        })
}
