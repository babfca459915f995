use class_calendar::{
    AssignOutcome, CalendarConfig, CalendarSession, GateOutcome, SessionError, load_schedule_from_csv,
    logging, render, save_schedule_to_csv,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Mark class days on a monthly calendar and total the fees")]
struct Cli {
    /// TOML config file (falls back to CLASS_CALENDAR_CONFIG)
    config: Option<PathBuf>,
}

fn print_help() {
    println!(
        "Commands:\n  help                     Show this help\n  show                     Show the month grid and fees\n  prev | next              Move to the previous / next month\n  goto <year> <month>      Jump to a month (month 1-12)\n  set <day> <class>        Mark a day of the visible month with a class type\n  clear <day>              Remove the class from a day\n  types                    List class types\n  fees                     Show fees for the visible month\n  mode                     Show whether this session may edit\n  export <csv_path>        Write all assignments to CSV\n  import <csv_path>        Read assignments from CSV\n  quit|exit                Exit"
    );
}

fn show(session: &CalendarSession) {
    let view = session.month_view();
    println!("{}", render::month_grid(&view));
    print!("{}", render::fee_table(&view.fees));
}

fn print_mode(session: &CalendarSession) {
    if session.can_mutate() {
        println!("Mode: editor");
    } else {
        println!("Mode: viewer (read-only)");
    }
}

fn report_session_error(err: &SessionError) {
    match err {
        SessionError::ReadOnly | SessionError::GatePending => {
            println!("Read-only session: changes are not allowed.")
        }
        other => println!("Error: {other}"),
    }
}

fn parse_day(arg: Option<&str>) -> Option<u32> {
    arg.and_then(|s| s.parse::<u32>().ok())
}

fn read_line(stdin: &io::Stdin, line: &mut String) -> bool {
    line.clear();
    matches!(stdin.lock().read_line(line), Ok(n) if n > 0)
}

fn resolve_password(session: &mut CalendarSession, stdin: &io::Stdin) {
    print!("Password (leave empty to view only): ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    read_line(stdin, &mut line);
    match session.submit_password(line.trim_end_matches(['\r', '\n'])) {
        Ok(GateOutcome::Editor) => println!("Editor mode unlocked."),
        Ok(GateOutcome::ViewerByChoice) => println!("Viewing in read-only mode."),
        Ok(GateOutcome::Rejected) => {
            println!("Password rejected. Continuing in read-only mode.")
        }
        Err(err) => println!("Error: {err}"),
    }
}

fn handle_set(session: &mut CalendarSession, day: Option<u32>, class_type: Option<&str>) {
    let (Some(day), Some(class_type)) = (day, class_type) else {
        println!("Usage: set <day> <class>");
        return;
    };
    match session.assign_day(day, class_type) {
        Ok(AssignOutcome::Assigned { .. }) => {
            let label = session
                .day_class(day)
                .map(|entry| entry.label.clone())
                .unwrap_or_default();
            println!("Set day {day} to {label}.");
        }
        Ok(AssignOutcome::UnknownClassType) => {
            println!("Unknown class type '{class_type}'. Type 'types' to list them.")
        }
        Err(err) => report_session_error(&err),
    }
}

fn handle_clear(session: &mut CalendarSession, day: Option<u32>) {
    let Some(day) = day else {
        println!("Usage: clear <day>");
        return;
    };
    match session.unassign_day(day) {
        Ok(Some(_)) => println!("Cleared day {day}."),
        Ok(None) => println!("Day {day} has no class."),
        Err(err) => report_session_error(&err),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init("info");

    let config = match CalendarConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };
    let mut session = match CalendarSession::from_config(&config).await {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };

    println!("Class Calendar (CLI) - type 'help' for commands\n");
    let stdin = io::stdin();
    if session.mode().is_none() {
        resolve_password(&mut session, &stdin);
    }
    show(&session);

    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        if !read_line(&stdin, &mut line) {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show(&session),
            "prev" => {
                session.previous_month();
                show(&session);
            }
            "next" => {
                session.next_month();
                show(&session);
            }
            "goto" => {
                let year = parts.next().and_then(|s| s.parse::<i32>().ok());
                let month = parts.next().and_then(|s| s.parse::<u32>().ok());
                match (year, month) {
                    (Some(year), Some(month)) if (1..=12).contains(&month) => {
                        session.jump_to(year, month - 1);
                        show(&session);
                    }
                    _ => println!("Usage: goto <year> <month 1-12>"),
                }
            }
            "set" => {
                let day = parse_day(parts.next());
                handle_set(&mut session, day, parts.next());
            }
            "clear" => handle_clear(&mut session, parse_day(parts.next())),
            "types" => print!("{}", render::catalog_legend(session.catalog())),
            "fees" => print!("{}", render::fee_table(&session.fee_summary())),
            "mode" => print_mode(&session),
            "export" => {
                let Some(path) = parts.next() else {
                    println!("Usage: export <csv_path>");
                    continue;
                };
                match save_schedule_to_csv(session.store().assignments(), path) {
                    Ok(()) => println!(
                        "Exported {} assignments to {path}.",
                        session.store().len()
                    ),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "import" => {
                let Some(path) = parts.next() else {
                    println!("Usage: import <csv_path>");
                    continue;
                };
                match load_schedule_from_csv(path) {
                    Ok(schedule) => match session.import(schedule) {
                        Ok(summary) => println!(
                            "Imported {} assignments ({} rejected).",
                            summary.imported, summary.rejected
                        ),
                        Err(err) => report_session_error(&err),
                    },
                    Err(err) => println!("Error: {err}"),
                }
            }
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }

    session.close().await;
}
