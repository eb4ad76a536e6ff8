//! List ordering, loan status filter and loan display rows
//!
//! Musicians are ordered by last name, scores by title, loans by loan
//! date (most recent first). Orders are applied once per list load;
//! search filtering never reorders.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::db::models::{Loan, LoanStatus, Musician, Score};
use crate::search::Searchable;
use crate::{Error, Result};

/// Default display format for loan dates, e.g. `5.03.2024`
pub const DEFAULT_DATE_FORMAT: &str = "%-d.%m.%Y";

/// Label used when a loan references a deleted musician or score
pub const UNKNOWN_LABEL: &str = "Unknown";

// ========================================
// Collation
// ========================================

/// Letters that sort as their own letter right after the base letter
/// (Polish alphabet order: a < ą < b < c < ć ...)
fn polish_letter(c: char) -> Option<(char, u32)> {
    Some(match c {
        'ą' => ('a', 1),
        'ć' => ('c', 1),
        'ę' => ('e', 1),
        'ł' => ('l', 1),
        'ń' => ('n', 1),
        'ó' => ('o', 1),
        'ś' => ('s', 1),
        'ź' => ('z', 1),
        'ż' => ('z', 2),
        _ => return None,
    })
}

/// Accented letters that sort with their base letter
fn accent_base(c: char) -> Option<char> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' | 'ň' => 'n',
        'ò' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ř' => 'r',
        'š' => 's',
        'ù' | 'ú' | 'û' | 'ü' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' => 'z',
        _ => return None,
    })
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    primary: Vec<u32>,
    secondary: Vec<u32>,
    lower: String,
}

fn collation_key(s: &str) -> CollationKey {
    let lower = s.to_lowercase();
    let mut primary = Vec::with_capacity(lower.len());
    let mut secondary = Vec::with_capacity(lower.len());
    for c in lower.chars() {
        if let Some((base, rank)) = polish_letter(c) {
            primary.push(base as u32 * 4 + rank);
            secondary.push(0);
        } else if let Some(base) = accent_base(c) {
            primary.push(base as u32 * 4);
            secondary.push(c as u32);
        } else {
            primary.push(c as u32 * 4);
            secondary.push(0);
        }
    }
    CollationKey {
        primary,
        secondary,
        lower,
    }
}

/// Locale-aware comparison: case-insensitive first, accents second,
/// raw text last so the order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

// ========================================
// Sort orders
// ========================================

pub fn sort_musicians(musicians: &mut [Musician]) {
    musicians.sort_by(|a, b| {
        collate(&a.last_name, &b.last_name)
            .then_with(|| collate(&a.first_name, &b.first_name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

pub fn sort_scores(scores: &mut [Score]) {
    scores.sort_by(|a, b| {
        collate(&a.title, &b.title)
            .then_with(|| collate(&a.composer, &b.composer))
            .then_with(|| collate(&a.part, &b.part))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Most recent loan first
pub fn sort_loans(loans: &mut [Loan]) {
    loans.sort_by(|a, b| b.loan_date.cmp(&a.loan_date).then_with(|| a.id.cmp(&b.id)));
}

// ========================================
// Loan status filter
// ========================================

/// Which loans a listing shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanFilter {
    #[default]
    Active,
    Returned,
    All,
}

impl LoanFilter {
    pub fn admits(&self, loan: &Loan) -> bool {
        match self {
            LoanFilter::Active => loan.status == LoanStatus::Active,
            LoanFilter::Returned => loan.status == LoanStatus::Returned,
            LoanFilter::All => true,
        }
    }
}

impl FromStr for LoanFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "active" => Ok(LoanFilter::Active),
            "returned" => Ok(LoanFilter::Returned),
            "all" => Ok(LoanFilter::All),
            other => Err(Error::Validation(format!(
                "Unknown loan filter '{}' (expected active, returned or all)",
                other
            ))),
        }
    }
}

/// Tab counters shown above the loan list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoanCounts {
    pub active: usize,
    pub returned: usize,
    pub total: usize,
}

impl LoanCounts {
    pub fn of(loans: &[Loan]) -> Self {
        let active = loans.iter().filter(|l| l.is_active()).count();
        Self {
            active,
            returned: loans.len() - active,
            total: loans.len(),
        }
    }
}

// ========================================
// Loan display rows
// ========================================

/// Check a chrono format string once, so rendering cannot fail later
pub fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!("Invalid date format '{}'", format)));
    }
    Ok(())
}

/// Render a loan date in `tz` using a format checked by [`validate_date_format`]
pub fn format_loan_date<Tz>(date: DateTime<Utc>, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.with_timezone(tz).format(format).to_string()
}

/// A loan joined with its musician and score for display and search
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub musician: Option<Musician>,
    pub score: Option<Score>,
    pub musician_name: String,
    pub score_label: String,
    pub loan_date_label: String,
}

impl Searchable for LoanView {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        if let Some(musician) = &self.musician {
            fields.extend(musician.search_fields());
        }
        if let Some(score) = &self.score {
            fields.extend(score.search_fields());
        }
        fields.push(self.loan_date_label.as_str());
        fields
    }
}

/// Join loans with the musicians and scores they reference, keeping loan order
pub fn join_loans<Tz>(
    loans: Vec<Loan>,
    musicians: &[Musician],
    scores: &[Score],
    tz: &Tz,
    date_format: &str,
) -> Vec<LoanView>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let musicians: HashMap<&str, &Musician> =
        musicians.iter().map(|m| (m.id.as_str(), m)).collect();
    let scores: HashMap<&str, &Score> = scores.iter().map(|s| (s.id.as_str(), s)).collect();

    loans
        .into_iter()
        .map(|loan| {
            let musician = musicians.get(loan.musician_id.as_str()).map(|m| (*m).clone());
            let score = scores.get(loan.score_id.as_str()).map(|s| (*s).clone());
            LoanView {
                musician_name: musician
                    .as_ref()
                    .map(Musician::full_name)
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                score_label: score
                    .as_ref()
                    .map(Score::label)
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                loan_date_label: format_loan_date(loan.loan_date, tz, date_format),
                musician,
                score,
                loan,
            }
        })
        .collect()
}

/// Dashboard numbers plus the most recent loans
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_loans: usize,
    pub musicians: usize,
    pub scores: usize,
    pub recent_loans: Vec<LoanView>,
}

/// Number of loans shown on the dashboard
pub const RECENT_LOANS: usize = 5;

impl DashboardSummary {
    pub fn build<Tz>(
        mut loans: Vec<Loan>,
        musicians: &[Musician],
        scores: &[Score],
        tz: &Tz,
        date_format: &str,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let active_loans = loans.iter().filter(|l| l.is_active()).count();
        sort_loans(&mut loans);
        loans.truncate(RECENT_LOANS);

        Self {
            active_loans,
            musicians: musicians.len(),
            scores: scores.len(),
            recent_loans: join_loans(loans, musicians, scores, tz, date_format),
        }
    }

    pub fn empty() -> Self {
        Self {
            active_loans: 0,
            musicians: 0,
            scores: 0,
            recent_loans: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchQuery;
    use chrono::{Duration, FixedOffset};

    fn musician(id: &str, first: &str, last: &str) -> Musician {
        Musician {
            id: id.into(),
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.org", id),
            phone: None,
            instrument: "Horn".into(),
            created_at: Utc::now(),
        }
    }

    fn score(id: &str, title: &str, part: &str) -> Score {
        Score {
            id: id.into(),
            title: title.into(),
            composer: "Ravel".into(),
            part: part.into(),
            catalog_number: None,
            created_at: Utc::now(),
        }
    }

    fn loan_at(id: &str, musician_id: &str, score_id: &str, date: DateTime<Utc>) -> Loan {
        let mut loan = Loan::open(musician_id, score_id, None, date).unwrap();
        loan.id = id.into();
        loan
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn collate_ignores_case() {
        assert_eq!(collate("adams", "Baker"), Ordering::Less);
        assert_eq!(collate("Zimmer", "abel"), Ordering::Greater);
    }

    #[test]
    fn collate_places_polish_letters_after_base() {
        let mut names = vec!["Żak", "Zawadzki", "Łuczak", "Lis", "Mazur", "Ćwik", "Czarnecki"];
        names.sort_by(|a, b| collate(a, b));
        assert_eq!(
            names,
            ["Czarnecki", "Ćwik", "Lis", "Łuczak", "Mazur", "Zawadzki", "Żak"]
        );
    }

    #[test]
    fn collate_treats_other_accents_as_secondary() {
        assert_eq!(collate("Dvořák", "Dvorak"), Ordering::Greater);
        assert_eq!(collate("Dvořák", "Dvorakz"), Ordering::Less);
    }

    #[test]
    fn musicians_sorted_by_last_name() {
        let mut list = vec![
            musician("3", "Ewa", "Nowak"),
            musician("1", "Jan", "kowalski"),
            musician("2", "Adam", "Nowak"),
        ];
        sort_musicians(&mut list);
        let ids: Vec<_> = list.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn scores_sorted_by_title() {
        let mut list = vec![score("b", "Carmen", "Flute I"), score("a", "Bolero", "Tuba")];
        sort_scores(&mut list);
        assert_eq!(list[0].title, "Bolero");
    }

    #[test]
    fn loans_sorted_most_recent_first() {
        let mut loans = vec![
            loan_at("old", "m", "s", day(1)),
            loan_at("new", "m", "s", day(9)),
            loan_at("mid", "m", "s", day(5)),
        ];
        sort_loans(&mut loans);
        let ids: Vec<_> = loans.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn filter_parsing_and_admission() {
        assert_eq!("".parse::<LoanFilter>().unwrap(), LoanFilter::Active);
        assert_eq!("all".parse::<LoanFilter>().unwrap(), LoanFilter::All);
        assert!("overdue".parse::<LoanFilter>().is_err());

        let mut loan = loan_at("l", "m", "s", day(1));
        assert!(LoanFilter::Active.admits(&loan));
        loan.mark_returned(day(2)).unwrap();
        assert!(!LoanFilter::Active.admits(&loan));
        assert!(LoanFilter::Returned.admits(&loan));
        assert!(LoanFilter::All.admits(&loan));
    }

    #[test]
    fn counts() {
        let mut returned = loan_at("r", "m", "s", day(1));
        returned.mark_returned(day(2)).unwrap();
        let loans = vec![loan_at("a", "m", "s", day(1)), returned];
        assert_eq!(
            LoanCounts::of(&loans),
            LoanCounts {
                active: 1,
                returned: 1,
                total: 2
            }
        );
    }

    #[test]
    fn date_format_validation() {
        assert!(validate_date_format(DEFAULT_DATE_FORMAT).is_ok());
        assert!(validate_date_format("%Y-%m-%d").is_ok());
        assert!(validate_date_format("%Q").is_err());
    }

    #[test]
    fn date_label_uses_timezone() {
        let late = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
        assert_eq!(format_loan_date(late, &Utc, DEFAULT_DATE_FORMAT), "4.03.2024");
        let warsaw = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_loan_date(late, &warsaw, DEFAULT_DATE_FORMAT), "5.03.2024");
    }

    #[test]
    fn join_marks_missing_references_unknown() {
        let loans = vec![
            loan_at("l1", "m1", "s1", day(5)),
            loan_at("l2", "gone", "s1", day(4)),
        ];
        let views = join_loans(
            loans,
            &[musician("m1", "Jan", "Kowalski")],
            &[score("s1", "Bolero", "Trombone II")],
            &Utc,
            DEFAULT_DATE_FORMAT,
        );
        assert_eq!(views[0].musician_name, "Jan Kowalski");
        assert_eq!(views[0].score_label, "Bolero - Ravel (Trombone II)");
        assert_eq!(views[1].musician_name, UNKNOWN_LABEL);
        assert!(views[1].musician.is_none());
    }

    #[test]
    fn loan_search_covers_musician_score_and_date() {
        let views = join_loans(
            vec![
                loan_at("l1", "m1", "s1", day(5)),
                loan_at("l2", "m2", "s2", day(12)),
            ],
            &[musician("m1", "Jan", "Kowalski"), musician("m2", "Anna", "Nowak")],
            &[score("s1", "Bolero", "Trombone II"), score("s2", "Carmen", "Flute I")],
            &Utc,
            DEFAULT_DATE_FORMAT,
        );

        let hits = SearchQuery::parse("kowalski trombone").filter(views.clone());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].loan.id, "l1");

        let by_date = SearchQuery::parse("12.03").filter(views.clone());
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].loan.id, "l2");

        assert!(SearchQuery::parse("kowalski carmen").filter(views).is_empty());
    }

    #[test]
    fn join_keeps_loan_order() {
        let loans = vec![
            loan_at("b", "m", "s", day(1) + Duration::hours(1)),
            loan_at("a", "m", "s", day(1)),
        ];
        let views = join_loans(loans, &[], &[], &Utc, DEFAULT_DATE_FORMAT);
        assert_eq!(views[0].loan.id, "b");
        assert_eq!(views[1].loan.id, "a");
    }

    #[test]
    fn dashboard_counts_and_recent_loans() {
        let mut loans: Vec<Loan> = (1..=7)
            .map(|d| loan_at(&format!("l{}", d), "m1", "s1", day(d)))
            .collect();
        loans[0].status = LoanStatus::Returned;
        loans[0].return_date = Some(day(2));

        let summary = DashboardSummary::build(
            loans,
            &[musician("m1", "Jan", "Kowalski")],
            &[score("s1", "Bolero", "Harp"), score("s2", "Carmen", "Harp")],
            &Utc,
            DEFAULT_DATE_FORMAT,
        );

        assert_eq!(summary.active_loans, 6);
        assert_eq!(summary.musicians, 1);
        assert_eq!(summary.scores, 2);
        let recent: Vec<&str> = summary.recent_loans.iter().map(|v| v.loan.id.as_str()).collect();
        assert_eq!(recent, ["l7", "l6", "l5", "l4", "l3"]);
    }
}
