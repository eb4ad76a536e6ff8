//! Bulk-delete guard
//!
//! A musician or score referenced by an active loan cannot be deleted.
//! The check covers the whole selection: one blocked id blocks the batch.

use std::collections::HashSet;

use crate::db::models::{Loan, Musician, Score};
use crate::error::EntityKind;
use crate::{Error, Result};

/// Candidate ids referenced by any active loan, in candidate order
pub fn blocked_ids<'a>(
    kind: EntityKind,
    candidates: &'a [String],
    active_loans: &[Loan],
) -> Vec<&'a str> {
    let referenced: HashSet<&str> = active_loans
        .iter()
        .filter(|loan| loan.is_active())
        .map(|loan| match kind {
            EntityKind::Musician => loan.musician_id.as_str(),
            EntityKind::Score => loan.score_id.as_str(),
        })
        .collect();

    candidates
        .iter()
        .map(String::as_str)
        .filter(|id| referenced.contains(id))
        .collect()
}

/// Entities that can name themselves in a guard message
pub trait GuardedEntity {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn display_name(&self) -> String;
}

impl GuardedEntity for Musician {
    const KIND: EntityKind = EntityKind::Musician;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.full_name()
    }
}

impl GuardedEntity for Score {
    const KIND: EntityKind = EntityKind::Score;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.label()
    }
}

/// Deduplicated, trimmed selection; empty selection is a ValidationError
pub fn normalize_selection(ids: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let selection: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect();
    if selection.is_empty() {
        return Err(Error::Validation("Nothing selected to delete".to_string()));
    }
    Ok(selection)
}

/// Fail with a GuardViolation naming every blocked entity.
///
/// `known` resolves ids to names; an id with no matching entity is
/// reported by its id.
pub fn check_deletable<E: GuardedEntity>(
    candidates: &[String],
    active_loans: &[Loan],
    known: &[E],
) -> Result<()> {
    let blocked = blocked_ids(E::KIND, candidates, active_loans);
    if blocked.is_empty() {
        return Ok(());
    }

    let blocking = blocked
        .into_iter()
        .map(|id| {
            known
                .iter()
                .find(|e| e.id() == id)
                .map(|e| e.display_name())
                .unwrap_or_else(|| id.to_string())
        })
        .collect();

    Err(Error::GuardViolation {
        entity: E::KIND,
        blocking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn musician(id: &str, first: &str, last: &str) -> Musician {
        Musician {
            id: id.into(),
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.org", id),
            phone: None,
            instrument: "Cello".into(),
            created_at: Utc::now(),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_active_loans_nothing_blocked() {
        assert!(blocked_ids(EntityKind::Musician, &ids(&["a", "b"]), &[]).is_empty());
    }

    #[test]
    fn returned_loans_do_not_block() {
        let mut loan = Loan::open("a", "s1", None, Utc::now()).unwrap();
        loan.mark_returned(Utc::now()).unwrap();
        assert!(blocked_ids(EntityKind::Musician, &ids(&["a"]), &[loan]).is_empty());
    }

    #[test]
    fn kind_selects_the_reference_column() {
        let loans = vec![Loan::open("m1", "s1", None, Utc::now()).unwrap()];
        assert_eq!(blocked_ids(EntityKind::Musician, &ids(&["m1", "s1"]), &loans), ["m1"]);
        assert_eq!(blocked_ids(EntityKind::Score, &ids(&["m1", "s1"]), &loans), ["s1"]);
    }

    #[test]
    fn one_blocked_musician_blocks_the_batch_and_is_named() {
        let roster = vec![musician("a", "Ala", "Adamska"), musician("b", "Bartek", "Bąk")];
        let loans = vec![Loan::open("b", "s1", None, Utc::now()).unwrap()];

        let err = check_deletable(&ids(&["a", "b"]), &loans, &roster).unwrap_err();

        match err {
            Error::GuardViolation { entity, blocking } => {
                assert_eq!(entity, EntityKind::Musician);
                assert_eq!(blocking, ["Bartek Bąk"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_blocked_id_is_reported_by_id() {
        let loans = vec![Loan::open("ghost", "s1", None, Utc::now()).unwrap()];
        let err = check_deletable::<Musician>(&ids(&["ghost"]), &loans, &[]).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn selection_is_deduplicated_and_required() {
        assert_eq!(
            normalize_selection(&ids(&["a", " a ", "b", ""])).unwrap(),
            ["a", "b"]
        );
        assert!(matches!(
            normalize_selection(&ids(&["  "])),
            Err(Error::Validation(_))
        ));
    }
}
