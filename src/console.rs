use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::services::BoardSnapshot;
use crate::state::AppState;

const HELP: &str = "\
commands:
  classes                 list classes
  reload                  reload the class list
  select <id>             select a class (no id clears the selection)
  date <YYYY-MM-DD>       change the attendance date
  present <student>       mark a student present
  absent <student>        mark a student absent
  all present|absent      mark every student
  submit                  save the attendance
  show                    print the roster
  history                 saved records for the selected class and date
  stats                   attendance statistics for the selected class
  find <name>             search students by name in every class
  health                  backend status
  quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Classes,
    Reload,
    Select(Option<i64>),
    Date(NaiveDate),
    Mark { student: String, present: bool },
    All(bool),
    Submit,
    Show,
    History,
    Stats,
    Find(String),
    Health,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty command".to_string());
        };
        let rest: Vec<&str> = words.collect();

        let command = match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("classes", []) => Command::Classes,
            ("reload", []) => Command::Reload,
            ("select", []) => Command::Select(None),
            ("select", [id]) => Command::Select(Some(
                id.parse::<i64>()
                    .map_err(|_| format!("invalid class id: {}", id))?,
            )),
            ("date", [date]) => Command::Date(
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| format!("invalid date, expected YYYY-MM-DD: {}", date))?,
            ),
            ("present", [student]) => Command::Mark {
                student: student.to_string(),
                present: true,
            },
            ("absent", [student]) => Command::Mark {
                student: student.to_string(),
                present: false,
            },
            ("all", ["present"]) => Command::All(true),
            ("all", ["absent"]) => Command::All(false),
            ("submit", []) => Command::Submit,
            ("show", []) => Command::Show,
            ("history", []) => Command::History,
            ("stats", []) => Command::Stats,
            ("find", [_, ..]) => Command::Find(rest.join(" ")),
            ("health", []) => Command::Health,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(format!("unknown command: {}", line.trim())),
        };

        Ok(command)
    }
}

pub fn render_classes(snapshot: &BoardSnapshot) -> String {
    let mut out = String::new();
    if snapshot.classes.is_empty() {
        out.push_str("no classes\n");
    }
    for class in &snapshot.classes {
        let marker = if snapshot.selection.class_id == Some(class.id) { '*' } else { ' ' };
        let line = match class.student_count {
            Some(count) => format!("{} {:>4}  {} ({} students)\n", marker, class.id, class.name, count),
            None => format!("{} {:>4}  {}\n", marker, class.id, class.name),
        };
        out.push_str(&line);
    }
    out
}

pub fn render_roster(snapshot: &BoardSnapshot) -> String {
    let mut out = String::new();
    let class = snapshot
        .selection
        .class_id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    out.push_str(&format!("class {}  date {}\n", class, snapshot.selection.date));

    if snapshot.loading_roster {
        out.push_str("loading students...\n");
    }
    for student in &snapshot.roster {
        let mark = if student.present { "P" } else { "A" };
        out.push_str(&format!("  [{}] {:<12} {}\n", mark, student.id, student.name));
    }

    let totals = snapshot.totals();
    out.push_str(&format!(
        "total {}  present {}  absent {}\n",
        totals.students, totals.present, totals.absent
    ));
    out
}

fn render_notification(snapshot: &BoardSnapshot) -> Option<String> {
    snapshot
        .notification
        .as_ref()
        .filter(|n| n.visible)
        .map(|n| format!("[{}] {}\n", n.severity, n.message))
}

/// Reads commands line by line until `quit` or end of input.
pub async fn run<R, W>(app: &AppState, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(render_classes(&app.board.snapshot()).as_bytes()).await?;
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            output.write_all(b"> ").await?;
            output.flush().await?;
            continue;
        }

        let reply = match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(app, command).await,
            Err(e) => format!("{}\n", e),
        };

        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    output.flush().await
}

/// Runs one command against the board and returns the text to print.
pub async fn execute(app: &AppState, command: Command) -> String {
    let board = &app.board;
    let mut out = match command {
        Command::Classes => render_classes(&board.snapshot()),
        Command::Reload => {
            board.load_classes().await;
            render_classes(&board.snapshot())
        }
        Command::Select(class_id) => {
            board.select_class(class_id).await;
            render_roster(&board.snapshot())
        }
        Command::Date(date) => {
            board.set_date(date);
            format!("date set to {}\n", date)
        }
        Command::Mark { student, present } => {
            let snapshot = board.snapshot();
            match snapshot.roster.iter().find(|s| s.id.matches(&student)) {
                Some(found) => {
                    board.toggle_presence(&found.id, present);
                    render_roster(&board.snapshot())
                }
                None => format!("student {} is not in the roster\n", student),
            }
        }
        Command::All(present) => {
            if present {
                board.mark_all_present();
            } else {
                board.mark_all_absent();
            }
            render_roster(&board.snapshot())
        }
        Command::Submit => {
            board.submit().await;
            render_roster(&board.snapshot())
        }
        Command::Show => render_roster(&board.snapshot()),
        Command::History => history(app).await,
        Command::Stats => stats(app).await,
        Command::Find(query) => find(app, &query).await,
        Command::Health => match app.reports.health().await {
            Ok(health) => format!("backend {} at {}\n", health.status, health.timestamp),
            Err(e) => format!("backend unreachable: {}\n", e),
        },
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };

    if let Some(toast) = render_notification(&board.snapshot()) {
        out.push_str(&toast);
    }
    out
}

async fn history(app: &AppState) -> String {
    let selection = app.board.selection();
    match app
        .reports
        .fetch_records(selection.class_id, Some(selection.date))
        .await
    {
        Ok(records) if records.is_empty() => "no saved records\n".to_string(),
        Ok(records) => {
            let mut out = String::new();
            for record in records {
                out.push_str(&format!(
                    "class {} on {}: {}/{} present (saved {})\n",
                    record.class_id,
                    record.date,
                    record.present_count(),
                    record.entries.len(),
                    record.timestamp.as_deref().unwrap_or("-")
                ));
            }
            out
        }
        Err(e) => format!("failed to load history: {}\n", e),
    }
}

async fn stats(app: &AppState) -> String {
    let Some(class_id) = app.board.selection().class_id else {
        return "select a class first\n".to_string();
    };

    match app.reports.fetch_statistics(class_id).await {
        Ok(stats) => {
            let mut out = String::new();
            out.push_str(&format!(
                "class {}: {} students, {} lessons, mean presence {:.2}%\n",
                stats.class_id, stats.total_students, stats.total_lessons, stats.mean_presence_rate
            ));
            for s in stats.students {
                out.push_str(&format!(
                    "  {:<12} {:<20} {} present / {} absent ({:.1}%)\n",
                    s.enrollment_code, s.name, s.presences, s.absences, s.presence_rate
                ));
            }
            out
        }
        Err(e) => format!("failed to load statistics: {}\n", e),
    }
}

async fn find(app: &AppState, query: &str) -> String {
    match app.reports.search_students(query).await {
        Ok(found) if found.is_empty() => format!("no students match {:?}\n", query),
        Ok(found) => found
            .iter()
            .map(|s| {
                let class = s
                    .class_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string());
                format!("  {:<12} {:<20} class {}\n", s.id, s.name, class)
            })
            .collect(),
        Err(e) => format!(
            "search failed: {}\n",
            e.server_message().map_or_else(|| e.to_string(), str::to_string)
        ),
    }
}
