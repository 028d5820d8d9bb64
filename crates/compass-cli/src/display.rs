//! Terminal rendering of sessions, reports and history.

use colored::Colorize;
use compass_core::history::{HistoryEntry, ScoreBand};
use compass_core::session::{OperationFailure, Route, Session};

pub fn failure(failure: &OperationFailure) {
    eprintln!("{}", format!("✗ {}", failure.message).red());
}

pub fn success(message: &str) {
    println!("{}", format!("✓ {}", message).green());
}

pub fn info(message: &str) {
    println!("{}", message.bright_black());
}

pub fn report(markdown: &str) {
    println!();
    for line in markdown.lines() {
        if line.starts_with('#') {
            println!("{}", line.bright_magenta().bold());
        } else {
            println!("{}", line);
        }
    }
    println!();
}

pub fn history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        info("No analyses yet.");
        return;
    }

    let name_width = entries
        .iter()
        .map(|e| e.candidate_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Candidate".len());

    println!(
        "{}",
        format!("{:<24}  {:<name_width$}  {:<10}  {:>5}", "ID", "Candidate", "Date", "Score")
            .bold()
    );
    for entry in entries {
        let score = format!("{:>5}", entry.score);
        let score = match entry.band() {
            ScoreBand::Low => score.red(),
            ScoreBand::Medium => score.yellow(),
            ScoreBand::High => score.green(),
        };
        println!(
            "{:<24}  {:<name_width$}  {:<10}  {}",
            entry.id, entry.candidate_name, entry.date, score
        );
    }
}

pub fn status(session: &Session, route: Route) {
    let flag = |on: bool| if on { "yes".green() } else { "no".bright_black() };

    println!("{} {}", "Stage:".bold(), session.stage());
    println!("{} {}", "Screen:".bold(), route.path());
    println!("{} {}", "API key configured:".bold(), flag(session.credential_configured));
    println!("{} {}", "Knowledge base ready:".bold(), flag(session.knowledge_base_ready));
    println!(
        "{} critical {} / minor {}",
        "Penalties:".bold(),
        session.scoring.critical_penalty,
        session.scoring.minor_penalty
    );
    match session.busy_reason() {
        Some(reason) => println!("{} {}", "Busy:".bold(), reason.yellow()),
        None => println!("{} {}", "Busy:".bold(), "no".bright_black()),
    }
    if let Some(message) = session.last_error_message() {
        println!("{} {}", "Last error:".bold(), message.red());
    }
    if session.current_report.is_some() {
        println!("{} {}", "Report:".bold(), "loaded".green());
    }
}
