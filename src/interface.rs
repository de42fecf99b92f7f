use std::io::{stdin, stdout, Write};
use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Local, TimeZone};
use humantime::format_duration;
use prettytable::Table;
use textwrap::fill;
use tracing::info;

use crate::model::{Document, TrackerError, DATE_FORMAT};
use crate::store::Store;

const DESCRIPTION_WIDTH: usize = 40;

/// How a project name is obtained when the user did not pass one on the
/// command line. The binary plugs in a stdin prompt; tests plug in a stub.
pub trait ProjectPicker {
    fn pick(&self, names: &[String]) -> Result<String>;
}

/// Numbered stdin prompt over the given names. Accepts either the number or
/// the name itself.
pub struct StdinPicker;

impl ProjectPicker for StdinPicker {
    fn pick(&self, names: &[String]) -> Result<String> {
        loop {
            println!("Choose a project:");
            for (index, name) in names.iter().enumerate() {
                println!("  {}. {}", index + 1, name);
            }
            let answer = read_line("> ")?;
            if let Ok(index) = answer.parse::<usize>() {
                if index >= 1 && index <= names.len() {
                    return Ok(names[index - 1].clone());
                }
            }
            if names.iter().any(|name| name == &answer) {
                return Ok(answer);
            }
            println!("Pick a number between 1 and {}.", names.len());
        }
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    stdout().flush()?;
    let mut line = String::new();
    stdin().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

/// Settle on a project name: the one given on the command line, or one picked
/// interactively among the non-archived names. Returns None after printing a
/// message when there is nothing to pick from.
fn resolve_project(
    document: &Document,
    name: Option<String>,
    picker: &impl ProjectPicker,
) -> Result<Option<String>> {
    if document.is_empty() {
        println!("{}", TrackerError::EmptyStore);
        return Ok(None);
    }
    match name {
        // Existence is checked by the operation itself.
        Some(name) => Ok(Some(name)),
        None => {
            let names = document.selectable_names();
            if names.is_empty() {
                println!("All projects are archived. Restore one first.");
                return Ok(None);
            }
            Ok(Some(picker.pick(&names)?))
        }
    }
}

pub fn create_project(store: &Store, name: &str) -> Result<()> {
    let mut document = store.load()?;
    match document.create(name) {
        Ok(()) => {
            store.save(&document)?;
            info!(project = name, "created project");
            println!("Project \"{}\" created.", name);
        }
        Err(error) => println!("{}", error),
    }
    Ok(())
}

pub fn start_tracking(
    store: &Store,
    name: Option<String>,
    picker: &impl ProjectPicker,
) -> Result<()> {
    let mut document = store.load()?;
    let name = match resolve_project(&document, name, picker)? {
        Some(name) => name,
        None => return Ok(()),
    };
    match document.start(&name, Local::now()) {
        Ok(()) => {
            store.save(&document)?;
            info!(project = name.as_str(), "started tracking");
            println!("Started tracking time for \"{}\".", name);
        }
        Err(error) => println!("{}", error),
    }
    Ok(())
}

pub fn stop_tracking(
    store: &Store,
    name: Option<String>,
    description: Option<String>,
    picker: &impl ProjectPicker,
) -> Result<()> {
    let mut document = store.load()?;
    let name = match resolve_project(&document, name, picker)? {
        Some(name) => name,
        None => return Ok(()),
    };

    // Validate before prompting, so the user is not asked to describe work
    // on a timer that was never running.
    match document.get(&name) {
        None => {
            println!("{}", TrackerError::ProjectNotFound(name));
            return Ok(());
        }
        Some(project) if !project.is_running() => {
            println!("{}", TrackerError::NotRunning(name));
            return Ok(());
        }
        Some(_) => {}
    }

    let description = match description {
        Some(description) => description,
        None => read_line("What did you get done? ")?,
    };

    match document.stop(&name, &description, Local::now()) {
        Ok(entry) => {
            store.save(&document)?;
            info!(project = name.as_str(), seconds = entry.time_spent, "stopped tracking");
            let spent = format_duration(StdDuration::from_secs(entry.time_spent));
            if entry.description.is_empty() {
                println!("Stopped tracking \"{}\". Time: {}.", name, spent);
            } else {
                println!(
                    "Stopped tracking \"{}\". Time: {}. Description: {}",
                    name, spent, entry.description
                );
            }
        }
        Err(error) => println!("{}", error),
    }
    Ok(())
}

/// Print every project's total and entry log, in stored order. Read-only.
pub fn print_summary(store: &Store) -> Result<()> {
    let document = store.load()?;
    if document.is_empty() {
        println!("No data to display yet.");
        return Ok(());
    }

    for (name, project) in document.projects() {
        let total = format_duration(StdDuration::from_secs(project.total_time()));
        let suffix = if project.archived { " (archived)" } else { "" };
        println!("\n{}{} — total {}", name, suffix, total);

        if let Some(started_at) = project.start_time {
            if let Some(started_at) = Local.timestamp_opt(started_at, 0).single() {
                println!("  timer running since {}", started_at.format(DATE_FORMAT));
            }
        }

        if project.entries.is_empty() {
            println!("  no entries yet");
            continue;
        }

        let mut table = Table::new();
        table.add_row(row!["date", "duration", "description"]);
        for entry in &project.entries {
            table.add_row(row![
                entry.date,
                format_duration(StdDuration::from_secs(entry.time_spent)),
                fill(&entry.description, DESCRIPTION_WIDTH)
            ]);
        }
        table.printstd();
    }
    Ok(())
}

pub fn archive_project(store: &Store, name: &str) -> Result<()> {
    let mut document = store.load()?;
    match document.archive(name) {
        Ok(()) => {
            store.save(&document)?;
            println!("Project \"{}\" archived.", name);
        }
        Err(error) => println!("{}", error),
    }
    Ok(())
}

pub fn restore_project(store: &Store, name: &str) -> Result<()> {
    let mut document = store.load()?;
    match document.restore(name) {
        Ok(()) => {
            store.save(&document)?;
            println!("Project \"{}\" restored.", name);
        }
        Err(error) => println!("{}", error),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct FixedPicker(&'static str);

    impl ProjectPicker for FixedPicker {
        fn pick(&self, names: &[String]) -> Result<String> {
            assert!(names.iter().any(|name| name == self.0));
            Ok(self.0.to_owned())
        }
    }

    struct UnreachablePicker;

    impl ProjectPicker for UnreachablePicker {
        fn pick(&self, _names: &[String]) -> Result<String> {
            panic!("picker must not be consulted");
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> Store {
        Store::new(dir.path().join("data.json"))
    }

    #[test]
    fn create_then_start_and_stop_persists_an_entry() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        create_project(&store, "thesis").unwrap();
        start_tracking(&store, Some("thesis".into()), &UnreachablePicker).unwrap();
        assert!(store.load().unwrap().get("thesis").unwrap().is_running());

        stop_tracking(
            &store,
            Some("thesis".into()),
            Some("outline".into()),
            &UnreachablePicker,
        )
        .unwrap();

        let document = store.load().unwrap();
        let project = document.get("thesis").unwrap();
        assert!(!project.is_running());
        assert_eq!(project.entries.len(), 1);
        assert_eq!(project.entries[0].description, "outline");
    }

    #[test]
    fn omitted_name_goes_through_the_picker() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        create_project(&store, "thesis").unwrap();
        create_project(&store, "garden").unwrap();
        start_tracking(&store, None, &FixedPicker("garden")).unwrap();

        let document = store.load().unwrap();
        assert!(document.get("garden").unwrap().is_running());
        assert!(!document.get("thesis").unwrap().is_running());
    }

    #[test]
    fn domain_errors_do_not_touch_the_stored_state() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        create_project(&store, "thesis").unwrap();
        let before = store.load().unwrap();

        // stop while idle, start of unknown project, duplicate create
        stop_tracking(&store, Some("thesis".into()), Some("x".into()), &UnreachablePicker)
            .unwrap();
        start_tracking(&store, Some("garden".into()), &UnreachablePicker).unwrap();
        create_project(&store, "thesis").unwrap();

        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn start_on_empty_store_reports_and_skips_picker() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        start_tracking(&store, None, &UnreachablePicker).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn summary_is_read_only() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        create_project(&store, "thesis").unwrap();
        start_tracking(&store, Some("thesis".into()), &UnreachablePicker).unwrap();
        let before = store.load().unwrap();

        print_summary(&store).unwrap();
        assert_eq!(store.load().unwrap(), before);
    }
}
