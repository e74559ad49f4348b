use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};

use crate::error::RosterError;
use crate::roster::{AttendanceRoster, Clock};
use crate::search::GroupFilter;

/// One line of session input, parsed with the command name as `argv[0]`.
#[derive(Debug, Parser)]
#[command(multicall = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum SessionCommand {
    /// Check a student in at the session clock time
    #[command(visible_alias = "in")]
    CheckIn { id: String },
    /// Search students by name or email
    #[command(visible_alias = "find")]
    Search {
        /// Words joined with single spaces
        query: Vec<String>,
        /// Exact grade label, may span several words
        #[arg(long, num_args = 1..)]
        grade: Option<Vec<String>>,
    },
    /// Attendance totals
    Stats,
    /// Distinct grade labels
    Grades,
    /// Every student in roster order
    #[command(visible_alias = "ls")]
    List,
    /// End the session
    #[command(visible_alias = "exit")]
    Quit,
}

fn parse_line(line: &str) -> Result<SessionCommand, clap::Error> {
    SessionLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
}

/// An interactive check-in session. The roster lives for exactly as long
/// as the session does.
pub struct Session<C> {
    roster: AttendanceRoster,
    clock: C,
}

impl<C: Clock> Session<C> {
    pub fn new(roster: AttendanceRoster, clock: C) -> Self {
        Self { roster, clock }
    }

    pub fn roster(&self) -> &AttendanceRoster {
        &self.roster
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        writeln!(
            output,
            "{} students loaded, late after {}. Type `help` for commands.",
            self.roster.len(),
            self.roster.config().cutoff.format("%H:%M")
        )?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(SessionCommand::Quit) => break,
                Ok(command) => self.execute(command, &mut output)?,
                Err(err) => write!(output, "{err}")?,
            }
        }

        writeln!(output, "session closed: {}", self.roster.stats())?;
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: SessionCommand, output: &mut W) -> io::Result<()> {
        match command {
            SessionCommand::CheckIn { id } => {
                let now = self.clock.now();
                match self.roster.check_in(&id, now) {
                    Ok(record) => writeln!(output, "{record}")?,
                    Err(err @ RosterError::NotFound(_)) => writeln!(output, "error: {err}")?,
                    Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
                }
            }
            SessionCommand::Search { query, grade } => {
                let grade = grade
                    .map(|words| GroupFilter::parse(&words.join(" ")))
                    .unwrap_or_default();
                let found = self.roster.search(&query.join(" "), &grade);
                if found.is_empty() {
                    writeln!(output, "No students found matching your search.")?;
                }
                for record in found {
                    writeln!(output, "{record}")?;
                }
            }
            SessionCommand::Stats => writeln!(output, "{}", self.roster.stats())?,
            SessionCommand::Grades => writeln!(output, "{}", self.roster.grades().join(", "))?,
            SessionCommand::List => {
                for record in self.roster.records() {
                    writeln!(output, "{record}")?;
                }
            }
            SessionCommand::Quit => {}
        }
        Ok(())
    }

    pub fn into_roster(self) -> AttendanceRoster {
        self.roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::models::AttendanceStatus;
    use crate::roster::FixedClock;
    use crate::seed;
    use chrono::NaiveDate;

    fn session_at(h: u32, m: u32) -> Session<FixedClock> {
        let roster =
            AttendanceRoster::new(seed::sample_students().unwrap(), RosterConfig::default())
                .unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 2, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        Session::new(roster, FixedClock(now))
    }

    fn run(session: &mut Session<FixedClock>, script: &str) -> String {
        let mut out = Vec::new();
        session.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_search_with_multi_word_grade() {
        assert_eq!(
            parse_line("search emma --grade Year 10A").unwrap(),
            SessionCommand::Search {
                query: vec!["emma".to_string()],
                grade: Some(vec!["Year".to_string(), "10A".to_string()]),
            }
        );
        assert_eq!(
            parse_line("find").unwrap(),
            SessionCommand::Search {
                query: Vec::new(),
                grade: None,
            }
        );
        assert_eq!(
            parse_line("in 4").unwrap(),
            SessionCommand::CheckIn { id: "4".to_string() }
        );
    }

    #[test]
    fn rejects_unknown_flags_and_extra_ids() {
        let err = parse_line("search --gradebook").unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);

        let err = parse_line("check-in 1 2").unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);

        assert!(parse_line("check-in").is_err());
        assert!(parse_line("search --grade").is_err());
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn rejected_line_leaves_roster_untouched() {
        let mut session = session_at(8, 0);
        let out = run(&mut session, "check-in 1 4\nsearch --gradebook\nstats\n");
        assert!(out.contains("unexpected argument"));
        assert!(out.contains("total 5 | present 1 | late 1 | absent 3"));
        assert_eq!(
            session.roster().get("1").map(|r| r.status()),
            Some(AttendanceStatus::Absent)
        );
    }

    #[test]
    fn check_in_then_stats() {
        let mut session = session_at(8, 20);
        let out = run(&mut session, "check-in 1\nstats\nquit\ncheck-in 4\n");

        assert!(out.contains("[1] Emma Johnson (Year 10A) present at 08:20"));
        assert!(out.contains("total 5 | present 2 | late 1 | absent 2 | rate 60.0%"));
        let roster = session.into_roster();
        assert_eq!(
            roster.get("4").map(|r| r.status()),
            Some(AttendanceStatus::Absent)
        );
    }

    #[test]
    fn unknown_id_reports_and_continues() {
        let mut session = session_at(9, 0);
        let out = run(&mut session, "check-in 99\ncheck-in 4\n");
        assert!(out.contains("error: no student with id 99"));
        assert!(out.contains("[4] Marcus Williams (Year 10A) late at 09:00"));
        assert!(out.contains("session closed:"));
    }

    #[test]
    fn search_reports_empty_results() {
        let mut session = session_at(8, 0);
        let out = run(&mut session, "search nonexistent-xyz\nsearch --grade Year 10B\n");
        assert!(out.contains("No students found matching your search."));
        assert!(out.contains("[5] Lily Anderson (Year 10B) absent"));
        assert!(!out.contains("Emma Johnson"));
    }

    #[test]
    fn unknown_command_is_reported_and_session_continues() {
        let mut session = session_at(8, 0);
        let out = run(&mut session, "dance\n\ncheck-in 5\n");
        assert!(out.contains("dance"));
        assert!(out.contains("[5] Lily Anderson (Year 10B) present at 08:00"));
        assert_eq!(session.roster().stats().present, 2);
    }

    #[test]
    fn help_lists_commands() {
        let mut session = session_at(8, 0);
        let out = run(&mut session, "help\n");
        assert!(out.contains("check-in"));
        assert!(out.contains("search"));
    }
}
