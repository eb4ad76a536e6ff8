//! Symphony orchestra instrument catalog
//!
//! Used to pick the parts created when a new work is catalogued.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentGroup {
    pub category: &'static str,
    pub instruments: &'static [&'static str],
}

pub const ORCHESTRA_INSTRUMENTS: &[InstrumentGroup] = &[
    InstrumentGroup {
        category: "Strings",
        instruments: &["Violin I", "Violin II", "Viola", "Cello", "Double bass"],
    },
    InstrumentGroup {
        category: "Woodwinds",
        instruments: &[
            "Flute I",
            "Flute II",
            "Piccolo",
            "Oboe I",
            "Oboe II",
            "English horn",
            "Clarinet I",
            "Clarinet II",
            "Bass clarinet",
            "Bassoon I",
            "Bassoon II",
            "Contrabassoon",
        ],
    },
    InstrumentGroup {
        category: "Brass",
        instruments: &[
            "Horn I",
            "Horn II",
            "Horn III",
            "Horn IV",
            "Trumpet I",
            "Trumpet II",
            "Trumpet III",
            "Trombone I",
            "Trombone II",
            "Trombone III",
            "Bass trombone",
            "Tuba",
        ],
    },
    InstrumentGroup {
        category: "Percussion",
        instruments: &[
            "Timpani",
            "Cymbals",
            "Snare drum",
            "Bass drum",
            "Triangle",
            "Tambourine",
            "Glockenspiel",
            "Xylophone",
            "Vibraphone",
            "Marimba",
            "Tam-tam",
            "Castanets",
        ],
    },
    InstrumentGroup {
        category: "Keyboards",
        instruments: &["Piano", "Celesta", "Organ", "Harpsichord"],
    },
    InstrumentGroup {
        category: "Harp",
        instruments: &["Harp"],
    },
    InstrumentGroup {
        category: "Other",
        instruments: &["Full score (conductor)", "Other"],
    },
];

pub fn group(category: &str) -> Option<&'static InstrumentGroup> {
    ORCHESTRA_INSTRUMENTS.iter().find(|g| g.category == category)
}

/// Every part in catalog order
pub fn all_parts() -> Vec<&'static str> {
    ORCHESTRA_INSTRUMENTS
        .iter()
        .flat_map(|g| g.instruments.iter().copied())
        .collect()
}

/// Select every part of `category`, or deselect them all if the whole
/// group is already selected. Unknown categories leave the selection as is.
pub fn toggle_group(selection: &mut Vec<String>, category: &str) {
    let Some(group) = group(category) else {
        return;
    };
    let all_selected = group
        .instruments
        .iter()
        .all(|part| selection.iter().any(|s| s == part));

    if all_selected {
        selection.retain(|s| !group.instruments.contains(&s.as_str()));
    } else {
        for part in group.instruments {
            if !selection.iter().any(|s| s == part) {
                selection.push(part.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_no_duplicate_parts() {
        let parts = all_parts();
        let mut unique = parts.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(parts.len(), unique.len());
        assert_eq!(parts.first(), Some(&"Violin I"));
    }

    #[test]
    fn toggle_selects_then_deselects_group() {
        let mut selection = vec!["Tuba".to_string(), "Viola".to_string()];

        toggle_group(&mut selection, "Strings");
        assert_eq!(selection.len(), 6);
        assert_eq!(selection[0], "Tuba");

        toggle_group(&mut selection, "Strings");
        assert_eq!(selection, ["Tuba"]);
    }

    #[test]
    fn toggle_unknown_group_is_noop() {
        let mut selection = vec!["Harp".to_string()];
        toggle_group(&mut selection, "Synths");
        assert_eq!(selection, ["Harp"]);
    }
}
