//! Interactive shell holding one workflow session across commands.
//!
//! Stage operations run in background tasks so the prompt stays usable while
//! a request is in flight; `/status` shows the busy reason and a second
//! operation is rejected until the first one finishes.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use compass_application::{WorkflowCoordinator, WorkflowResult};
use compass_core::analysis::AnalysisRequest;
use compass_core::session::{OperationOutcome, Route, ScoringConfig, WorkflowEvent};
use compass_export::ReportView;
use compass_infrastructure::load_uploads;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::broadcast::error::RecvError;

use crate::app::App;
use crate::display;

const COMMANDS: &[&str] = &[
    "/config", "/ingest", "/scoring", "/analyze", "/history", "/view", "/reset", "/export",
    "/render", "/status", "/help",
];

/// Rustyline helper providing slash-command completion, highlighting and hints.
#[derive(Clone)]
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ShellHelper {}

#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Config { api_key: String },
    Ingest { paths: Vec<PathBuf> },
    Scoring(ScoringConfig),
    Analyze { candidate: String },
    History,
    View { id: String },
    Reset { route: Route },
    Export,
    Render { out: PathBuf },
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Ok(Self::Quit);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match head {
            "/config" => Ok(Self::Config {
                api_key: rest.to_string(),
            }),
            "/ingest" => Ok(Self::Ingest {
                paths: args.iter().map(PathBuf::from).collect(),
            }),
            "/scoring" => match args.as_slice() {
                [critical, minor] => {
                    let critical = critical
                        .parse()
                        .map_err(|_| format!("Invalid critical penalty: {}", critical))?;
                    let minor = minor
                        .parse()
                        .map_err(|_| format!("Invalid minor penalty: {}", minor))?;
                    Ok(Self::Scoring(ScoringConfig {
                        critical_penalty: critical,
                        minor_penalty: minor,
                    }))
                }
                _ => Err("Usage: /scoring <critical> <minor>".to_string()),
            },
            "/analyze" if !rest.is_empty() => Ok(Self::Analyze {
                candidate: rest.to_string(),
            }),
            "/analyze" => Err("Usage: /analyze <candidate name>".to_string()),
            "/history" => Ok(Self::History),
            "/view" => Ok(Self::View {
                id: rest.to_string(),
            }),
            "/reset" if rest.is_empty() => Ok(Self::Reset {
                route: Route::Landing,
            }),
            "/reset" => Route::from_str(rest)
                .map(|route| Self::Reset { route })
                .map_err(|_| format!("Unknown screen: {}", rest)),
            "/export" if rest.is_empty() => Ok(Self::Export),
            "/export" => Err("Usage: /export (exports the report on screen)".to_string()),
            "/render" if !rest.is_empty() => Ok(Self::Render {
                out: PathBuf::from(rest),
            }),
            "/render" => Err("Usage: /render <file.html>".to_string()),
            "/status" => Ok(Self::Status),
            "/help" => Ok(Self::Help),
            _ => Err(format!("Unknown command: {}", head)),
        }
    }
}

fn print_help() {
    let rows = [
        ("/config <api key>", "Configure the analysis service"),
        ("/ingest <file>...", "Upload knowledge-base documents"),
        ("/scoring <critical> <minor>", "Set conflict penalties"),
        ("/analyze <candidate>", "Submit a candidate for analysis"),
        ("/history", "List past analyses"),
        ("/view <id>", "Open a past report"),
        ("/reset [screen]", "Clear the report and go to a screen"),
        ("/export", "Export the current report as PDF"),
        ("/render <file.html>", "Write the current report as HTML"),
        ("/status", "Show the session"),
        ("quit", "Leave the shell"),
    ];
    for (usage, description) in rows {
        println!("  {:<30} {}", usage.bright_cyan(), description.bright_black());
    }
}

fn print_outcome(result: WorkflowResult, on_applied: impl FnOnce()) {
    match result {
        Ok(OperationOutcome::Applied) => on_applied(),
        Ok(OperationOutcome::Superseded) => display::info("Result discarded after reset."),
        Err(failure) => display::failure(&failure),
    }
}

fn print_current_report(coordinator: &WorkflowCoordinator) {
    if let Some(report) = coordinator.session().current_report {
        display::report(&report);
    }
}

pub async fn execute(app: App) -> Result<()> {
    let app = Arc::new(app);

    let ledger_watch = app.ledger.watch_completions(app.coordinator.subscribe());

    let mut events = app.coordinator.subscribe();
    let event_printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(WorkflowEvent::Navigated { route }) => {
                    println!("{}", format!("→ {}", route.path()).bright_black());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let ledger = app.ledger.clone();
    tokio::spawn(async move {
        let _ = ledger.refresh().await;
    });

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    println!("{}", "=== Compass ===".bright_magenta().bold());
    println!(
        "{}",
        "Type '/help' for commands, '/status' for the session, or 'quit' to exit.".bright_black()
    );
    println!();

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let command = match ShellCommand::parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{}", message.yellow());
                        continue;
                    }
                };

                match command {
                    ShellCommand::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    ShellCommand::Help => print_help(),
                    ShellCommand::Status => {
                        display::status(&app.coordinator.session(), app.navigator.current());
                    }
                    ShellCommand::Scoring(scoring) => {
                        app.coordinator.set_scoring(scoring);
                        display::success("Penalties updated");
                    }
                    ShellCommand::Reset { route } => app.coordinator.reset_and_navigate(route),
                    ShellCommand::Config { api_key } => {
                        let coordinator = app.coordinator.clone();
                        tokio::spawn(async move {
                            let result = coordinator.configure_credential(&api_key).await;
                            print_outcome(result, || display::success("API key configured"));
                        });
                    }
                    ShellCommand::Ingest { paths } => {
                        let coordinator = app.coordinator.clone();
                        tokio::spawn(async move {
                            let files = match load_uploads(&paths).await {
                                Ok(files) => files,
                                Err(e) => {
                                    eprintln!("{}", format!("✗ {}", e).red());
                                    return;
                                }
                            };
                            let result = coordinator.ingest_corpus(&files).await;
                            print_outcome(result, || {
                                display::success(&format!(
                                    "Knowledge base loaded ({} document(s))",
                                    files.len()
                                ))
                            });
                        });
                    }
                    ShellCommand::Analyze { candidate } => {
                        let statements = match rl.readline("statements> ") {
                            Ok(text) => text,
                            Err(_) => continue,
                        };
                        let attachments: Vec<PathBuf> = match rl.readline("attachments> ") {
                            Ok(text) => text.split_whitespace().map(PathBuf::from).collect(),
                            Err(_) => continue,
                        };

                        let coordinator = app.coordinator.clone();
                        tokio::spawn(async move {
                            let files = match load_uploads(&attachments).await {
                                Ok(files) => files,
                                Err(e) => {
                                    eprintln!("{}", format!("✗ {}", e).red());
                                    return;
                                }
                            };
                            let request = AnalysisRequest::new(candidate)
                                .with_statements(statements)
                                .with_attachments(files);
                            let result = coordinator.submit_analysis(&request).await;
                            print_outcome(result, || print_current_report(&coordinator));
                        });
                    }
                    ShellCommand::View { id } => {
                        let coordinator = app.coordinator.clone();
                        tokio::spawn(async move {
                            let result = coordinator.view_report(&id).await;
                            print_outcome(result, || print_current_report(&coordinator));
                        });
                    }
                    ShellCommand::History => {
                        let ledger = app.ledger.clone();
                        tokio::spawn(async move {
                            match ledger.refresh().await {
                                Ok(entries) => display::history(&entries),
                                Err(e) => eprintln!("{}", format!("✗ {}", e).red()),
                            }
                        });
                    }
                    ShellCommand::Render { out } => {
                        match app.coordinator.session().current_report {
                            Some(report) => match ReportView::new(report).save_html(&out) {
                                Ok(()) => display::success(&format!(
                                    "Report written to {}",
                                    out.display()
                                )),
                                Err(e) => eprintln!("{}", format!("✗ {}", e).red()),
                            },
                            None => display::info("No report loaded."),
                        }
                    }
                    ShellCommand::Export => {
                        let report = app.coordinator.session().current_report;
                        if let Err(e) =
                            super::export::write_pdf(&app.config.export, report.as_deref(), None)
                        {
                            eprintln!("{}", format!("✗ {:#}", e).red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    ledger_watch.abort();
    event_printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_keeps_key_verbatim() {
        assert_eq!(
            ShellCommand::parse("/config  abc-123 ").unwrap(),
            ShellCommand::Config {
                api_key: "abc-123".to_string()
            }
        );
        assert_eq!(
            ShellCommand::parse("/config").unwrap(),
            ShellCommand::Config {
                api_key: String::new()
            }
        );
    }

    #[test]
    fn test_parse_ingest_paths() {
        assert_eq!(
            ShellCommand::parse("/ingest values.md code.pdf").unwrap(),
            ShellCommand::Ingest {
                paths: vec![PathBuf::from("values.md"), PathBuf::from("code.pdf")]
            }
        );
        assert_eq!(
            ShellCommand::parse("/ingest").unwrap(),
            ShellCommand::Ingest { paths: vec![] }
        );
    }

    #[test]
    fn test_parse_scoring() {
        assert_eq!(
            ShellCommand::parse("/scoring 40 15").unwrap(),
            ShellCommand::Scoring(ScoringConfig {
                critical_penalty: 40,
                minor_penalty: 15
            })
        );
        assert!(ShellCommand::parse("/scoring 40").is_err());
        assert!(ShellCommand::parse("/scoring high 15").is_err());
    }

    #[test]
    fn test_parse_reset_route() {
        assert_eq!(
            ShellCommand::parse("/reset").unwrap(),
            ShellCommand::Reset {
                route: Route::Landing
            }
        );
        assert_eq!(
            ShellCommand::parse("/reset Candidate").unwrap(),
            ShellCommand::Reset {
                route: Route::Candidate
            }
        );
        assert!(ShellCommand::parse("/reset nowhere").is_err());
    }

    #[test]
    fn test_parse_analyze_keeps_full_name() {
        assert_eq!(
            ShellCommand::parse("/analyze Ada Lovelace").unwrap(),
            ShellCommand::Analyze {
                candidate: "Ada Lovelace".to_string()
            }
        );
        assert!(ShellCommand::parse("/analyze").is_err());
    }

    #[test]
    fn test_parse_export_takes_no_arguments() {
        assert_eq!(ShellCommand::parse("/export").unwrap(), ShellCommand::Export);
        assert!(ShellCommand::parse("/export report.png").is_err());
    }

    #[test]
    fn test_parse_quit_and_unknown() {
        assert_eq!(ShellCommand::parse("quit").unwrap(), ShellCommand::Quit);
        assert!(ShellCommand::parse("/dance").is_err());
    }

    #[test]
    fn test_helper_hints_command_suffix() {
        let helper = ShellHelper::new();
        let history = rustyline::history::DefaultHistory::new();
        let ctx = Context::new(&history);
        assert_eq!(helper.hint("/sta", 4, &ctx), Some("tus".to_string()));
        assert_eq!(helper.hint("hello", 5, &ctx), None);
    }
}
