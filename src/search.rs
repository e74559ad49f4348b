use std::collections::BTreeSet;

use crate::models::{StudentRecord, TeacherRecord};

/// Fields the roster and directory filters look at.
pub trait Searchable {
    fn display_name(&self) -> &str;
    fn contact_email(&self) -> Option<&str>;
    /// Grade for students, department for teachers.
    fn group_label(&self) -> &str;
}

impl Searchable for StudentRecord {
    fn display_name(&self) -> &str {
        self.name()
    }

    fn contact_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn group_label(&self) -> &str {
        self.grade()
    }
}

impl Searchable for TeacherRecord {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn contact_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn group_label(&self) -> &str {
        &self.department
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Exact(String),
}

impl GroupFilter {
    pub const ALL: &'static str = "all";

    /// Anything other than the `all` sentinel or an empty string is kept
    /// verbatim and compared byte for byte.
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case(Self::ALL) {
            GroupFilter::All
        } else {
            GroupFilter::Exact(value.to_string())
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Exact(expected) => expected == label,
        }
    }
}

fn matches_query<T: Searchable>(record: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.display_name().to_lowercase().contains(needle)
        || record
            .contact_email()
            .is_some_and(|email| email.to_lowercase().contains(needle))
}

/// Linear scan keeping the input order.
pub fn filter_records<'a, T: Searchable>(
    records: &'a [T],
    query: &str,
    filter: &GroupFilter,
) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| filter.matches(record.group_label()) && matches_query(*record, &needle))
        .collect()
}

pub fn distinct_groups<T: Searchable>(records: &[T]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.group_label().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
