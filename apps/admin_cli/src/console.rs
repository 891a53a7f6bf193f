//! Terminal adapters for the view-model seams and plain-text rendering.

use std::sync::Mutex;

use client_core::{
    layout::{breadcrumbs, Chrome},
    Confirm, ListScreen, Navigator,
};
use dialoguer::{Confirm as ConfirmPrompt, Input};
use shared::domain::Teacher;

/// Remembers where the view models asked to go; a terminal has nowhere to redirect to.
#[derive(Default)]
pub struct ConsoleNavigator {
    last: Mutex<Option<String>>,
}

impl ConsoleNavigator {
    pub fn last_path(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "redirect");
        if let Ok(mut last) = self.last.lock() {
            *last = Some(path.to_string());
        }
    }
}

/// Yes/no prompt; `assume_yes` answers without asking.
pub struct PromptConfirm {
    pub assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ConfirmPrompt::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub fn prompt_text(prompt: &str) -> anyhow::Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

pub fn print_header(chrome: &Chrome, path: &str) {
    let trail: Vec<String> = breadcrumbs(path)
        .into_iter()
        .map(|crumb| crumb.label)
        .collect();
    println!(
        "{} [{}, {}]",
        chrome.title(),
        chrome.background_theme(),
        chrome.mode().as_str()
    );
    if !trail.is_empty() {
        println!("{}", trail.join(" / "));
    }
    println!();
}

pub fn render_list(screen: &ListScreen) -> Result<(), String> {
    match screen {
        ListScreen::Skeleton { rows } => {
            for _ in 0..*rows {
                println!("...");
            }
            Ok(())
        }
        ListScreen::Failed { message } => Err(message.clone()),
        ListScreen::Rows {
            rows,
            page,
            total_pages,
        } => {
            print_rows(rows);
            println!();
            println!("Page {page} of {total_pages}");
            Ok(())
        }
    }
}

fn print_rows(rows: &[Teacher]) {
    if rows.is_empty() {
        println!("No teachers found.");
        return;
    }

    let id_width = rows
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let email_width = rows
        .iter()
        .map(|t| t.email.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<id_width$}  {:<email_width$}  Name", "Id", "Email");
    for teacher in rows {
        println!(
            "{:<id_width$}  {:<email_width$}  {}",
            teacher.id.to_string(),
            teacher.email,
            teacher.name
        );
    }
}
