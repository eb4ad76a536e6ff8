//! Multi-word search
//!
//! The query is split on whitespace into lowercase tokens. A document
//! matches when every token is a substring of at least one of its
//! searchable fields (case-insensitive). An empty query matches
//! everything. Filtering keeps the input order.

use crate::db::models::{Musician, Score};

/// Documents that expose a fixed set of free-text fields to search
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Musician {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.instrument.as_str(),
            self.email.as_str(),
        ];
        if let Some(phone) = &self.phone {
            fields.push(phone);
        }
        fields
    }
}

impl Searchable for Score {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.composer.as_str(),
            self.part.as_str(),
        ];
        if let Some(catalog) = &self.catalog_number {
            fields.push(catalog);
        }
        fields
    }
}

/// A parsed search query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    pub fn parse(query: &str) -> Self {
        Self {
            tokens: query
                .split_whitespace()
                .map(str::to_lowercase)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let fields: Vec<String> = item
            .search_fields()
            .into_iter()
            .map(str::to_lowercase)
            .collect();
        self.tokens
            .iter()
            .all(|token| fields.iter().any(|field| field.contains(token.as_str())))
    }

    /// Keep matching items, preserving order
    pub fn filter<T: Searchable>(&self, items: Vec<T>) -> Vec<T> {
        if self.tokens.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn musician(first: &str, last: &str, instrument: &str) -> Musician {
        Musician {
            id: format!("{}-{}", first, last),
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@orchestra.example", first.to_lowercase()),
            phone: Some("+48 600 100 200".into()),
            instrument: instrument.into(),
            created_at: Utc::now(),
        }
    }

    fn score(title: &str, composer: &str, part: &str, catalog: Option<&str>) -> Score {
        Score {
            id: format!("{}-{}", title, part),
            title: title.into(),
            composer: composer.into(),
            part: part.into(),
            catalog_number: catalog.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn roster() -> Vec<Musician> {
        vec![
            musician("Jan", "Kowalski", "Trumpet"),
            musician("Anna", "Smith", "Violin"),
            musician("Janina", "Nowak", "Viola"),
        ]
    }

    #[test]
    fn parse_lowercases_and_drops_blank_tokens() {
        let query = SearchQuery::parse("  Bolero \t PUZON  II ");
        assert_eq!(query.tokens(), ["bolero", "puzon", "ii"]);
        assert!(SearchQuery::parse("   ").is_empty());
    }

    #[test]
    fn empty_query_matches_everything() {
        let all = SearchQuery::parse("").filter(roster());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn tokens_may_match_different_fields_in_any_order() {
        let query = SearchQuery::parse("kowalski jan");
        let hits = query.filter(roster());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].last_name, "Kowalski");
    }

    #[test]
    fn every_token_must_match_the_same_document() {
        let query = SearchQuery::parse("jan smith");
        assert!(query.filter(roster()).is_empty());
    }

    #[test]
    fn substring_matches_across_documents() {
        // "jan" is a substring of both Jan and Janina
        let hits = SearchQuery::parse("JAN").filter(roster());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn email_and_phone_are_searchable() {
        assert_eq!(SearchQuery::parse("anna@orchestra").filter(roster()).len(), 1);
        assert_eq!(SearchQuery::parse("600").filter(roster()).len(), 3);
    }

    #[test]
    fn score_fields_include_catalog_number() {
        let scores = vec![
            score("Bolero", "Maurice Ravel", "Trombone II", Some("OP-2024-001")),
            score("Bolero", "Maurice Ravel", "Flute I", None),
        ];
        let hits = SearchQuery::parse("ravel op-2024").filter(scores.clone());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].part, "Trombone II");

        assert_eq!(SearchQuery::parse("bolero flute").filter(scores).len(), 1);
    }

    #[test]
    fn non_ascii_is_case_insensitive() {
        let people = vec![musician("Łucja", "Żak", "Róg")];
        assert_eq!(SearchQuery::parse("łucja ŻAK róg").filter(people).len(), 1);
    }

    #[test]
    fn adding_tokens_never_grows_the_result() {
        let queries = ["", "j", "ja", "jan", "jan kow", "jan kow trumpet", "jan kow viola"];
        let mut previous = usize::MAX;
        for q in queries {
            let count = SearchQuery::parse(q).filter(roster()).len();
            assert!(count <= previous, "query '{}' grew the result", q);
            previous = count;
        }
    }

    #[test]
    fn filtering_preserves_order() {
        let hits = SearchQuery::parse("a").filter(roster());
        let names: Vec<_> = hits.iter().map(|m| m.last_name.as_str()).collect();
        assert_eq!(names, ["Kowalski", "Smith", "Nowak"]);
    }
}
