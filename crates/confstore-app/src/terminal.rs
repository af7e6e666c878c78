//! Terminal front end: notices on stderr, prompts on stdin, plain-text renders

use crate::routes::{Resolution, Route};
use crate::ui::{ConfirmPrompt, Notice, Notifier};
use crate::views::{CreateForm, DetailForm, ListRender};
use std::io::{self, BufRead, Write};

/// Prints notices to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Invalid(message) => eprintln!("invalid: {message}"),
            Notice::Failed(message) => eprintln!("error: {message}"),
        }
    }
}

/// Asks on stderr and reads a `y`/`n` line from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        eprint!("{question} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(err) => {
                tracing::warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

/// Whether an answer line means "yes"
#[must_use]
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn write_list(out: &mut impl Write, render: &ListRender) -> io::Result<()> {
    match render {
        ListRender::Landing { title, tagline } => {
            writeln!(out, "{title}")?;
            writeln!(out, "{tagline}")
        }
        ListRender::Configs {
            heading,
            create,
            items,
        } => {
            writeln!(out, "{heading}")?;
            writeln!(out, "  + {} ({})", create.label, create.route)?;
            let Some(items) = items else {
                return writeln!(out, "  loading...");
            };
            for entry in items {
                writeln!(out, "  {}  {}", entry.id, entry.name)?;
                if !entry.created.is_empty() {
                    writeln!(out, "      Created: {}", entry.created)?;
                }
            }
            Ok(())
        }
    }
}

pub fn write_detail(out: &mut impl Write, form: &DetailForm) -> io::Result<()> {
    writeln!(out, "{} ({})", form.config_name, form.id)?;
    if let Some(link) = &form.attachment {
        writeln!(out, "Attachment: {} <{}>", link.text, link.href)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", form.content)
}

pub fn write_create(out: &mut impl Write, form: &CreateForm) -> io::Result<()> {
    writeln!(out, "Name: {}", form.config_name)?;
    if let Some(file) = &form.file_name {
        writeln!(out, "Attachment: {file}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", form.content)
}

pub fn write_resolution(out: &mut impl Write, resolution: &Resolution) -> io::Result<()> {
    match resolution {
        Resolution::Render(route) => writeln!(out, "render {}", describe(route)),
        Resolution::Redirect(to) => writeln!(out, "redirect {to}"),
    }
}

fn describe(route: &Route) -> String {
    match route {
        Route::Home => "home".to_string(),
        Route::Login { .. } => "login".to_string(),
        Route::Signup => "signup".to_string(),
        Route::NewConfig => "new config".to_string(),
        Route::Config(id) => format!("config {id}"),
        Route::NotFound(path) => format!("not found {path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{AttachmentLink, CreateEntry, ListEntry};
    use confstore_core::ConfigId;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn written(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn list_output() {
        let render = ListRender::Configs {
            heading: "Your Configs",
            create: CreateEntry {
                label: "Create a new config",
                route: Route::NewConfig,
            },
            items: Some(vec![ListEntry {
                id: ConfigId::new("c-1"),
                name: "Alpha".to_string(),
                created: String::new(),
                route: Route::Config(ConfigId::new("c-1")),
            }]),
        };
        assert_eq!(
            written(|out| write_list(out, &render)),
            "Your Configs\n  + Create a new config (/config/new)\n  c-1  Alpha\n"
        );
    }

    #[test]
    fn detail_output() {
        let form = DetailForm {
            id: ConfigId::new("c-1"),
            config_name: "Alpha".to_string(),
            content: "body".to_string(),
            attachment: Some(AttachmentLink {
                text: "report.pdf".to_string(),
                href: Url::parse("https://files.test/1-report.pdf").unwrap(),
            }),
            picked_file: None,
            save_enabled: true,
            is_saving: false,
            is_deleting: false,
            is_rolling_back: false,
        };
        assert_eq!(
            written(|out| write_detail(out, &form)),
            "Alpha (c-1)\nAttachment: report.pdf <https://files.test/1-report.pdf>\n\nbody\n"
        );
    }

    #[test]
    fn create_output() {
        let form = CreateForm {
            config_name: "Alpha".to_string(),
            content: "body".to_string(),
            file_name: Some("report.pdf".to_string()),
            submit_enabled: true,
            is_loading: false,
        };
        assert_eq!(
            written(|out| write_create(out, &form)),
            "Name: Alpha\nAttachment: report.pdf\n\nbody\n"
        );
    }

    #[test]
    fn resolution_output() {
        assert_eq!(
            written(|out| write_resolution(out, &Resolution::Render(Route::Home))),
            "render home\n"
        );
        assert_eq!(
            written(|out| {
                write_resolution(out, &Resolution::Redirect("/login?redirect=%2F".to_string()))
            }),
            "redirect /login?redirect=%2F\n"
        );
    }
}
