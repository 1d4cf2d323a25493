/// How a competition splits its league phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLayout {
    /// Fixed round-robin groups, the first one is the default selection.
    Groups(&'static [&'static str]),
    /// One league table covering every non-knockout match.
    Single,
    /// Groups are whatever the feed carries.
    Inferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Competition {
    pub code: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub long_name: &'static str,
    pub layout: GroupLayout,
}

const TWO_GROUPS: &[&str] = &["Group 1", "Group 2"];

/// Catalog order is also the display order (Senior first, Junior C last).
pub const COMPETITIONS: [Competition; 7] = [
    Competition {
        code: "SHC",
        name: "Senior Hurling Championship",
        label: "Senior",
        long_name: "WhiteBox County Senior Hurling Championship",
        layout: GroupLayout::Groups(TWO_GROUPS),
    },
    Competition {
        code: "PIHC",
        name: "Premier Intermediate Hurling Championship",
        label: "Premier Intermediate",
        long_name: "Lyons of Limerick County Premier Intermediate Hurling Championship",
        layout: GroupLayout::Single,
    },
    Competition {
        code: "IHC",
        name: "Intermediate Hurling Championship",
        label: "Intermediate",
        long_name: "County Intermediate Hurling Championship",
        layout: GroupLayout::Groups(TWO_GROUPS),
    },
    Competition {
        code: "PJAHC",
        name: "Premier Junior A Hurling Championship",
        label: "Premier Junior A",
        long_name: "Woodlands House Hotel County Premier Junior A Hurling Championship",
        layout: GroupLayout::Groups(TWO_GROUPS),
    },
    Competition {
        code: "JAHC",
        name: "Junior A Hurling Championship",
        label: "Junior A",
        long_name: "Woodlands House Hotel County Junior A Hurling Championship",
        layout: GroupLayout::Groups(TWO_GROUPS),
    },
    Competition {
        code: "JBHC",
        name: "Junior B Hurling Championship",
        label: "Junior B",
        long_name: "Woodlands House Hotel Junior B Hurling Championship",
        layout: GroupLayout::Inferred,
    },
    Competition {
        code: "JCHC",
        name: "Junior C Hurling Championship",
        label: "Junior C",
        long_name: "Woodlands House Hotel County Junior C Hurling Championship",
        layout: GroupLayout::Groups(TWO_GROUPS),
    },
];

pub const UNKNOWN_RANK: usize = 99;

pub fn find(name: &str) -> Option<&'static Competition> {
    COMPETITIONS.iter().find(|c| c.name == name)
}

pub fn find_by_code(code: &str) -> Option<&'static Competition> {
    COMPETITIONS
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

pub fn default_competition() -> &'static Competition {
    &COMPETITIONS[0]
}

/// Short codes in the feed ("PIHC") are expanded to the full name; anything
/// else passes through untouched.
pub fn resolve_competition(raw: &str) -> String {
    let trimmed = raw.trim();
    match find_by_code(trimmed) {
        Some(comp) => comp.name.to_string(),
        None => trimmed.to_string(),
    }
}

pub fn competition_code(name: &str) -> String {
    if let Some(comp) = find(name) {
        return comp.code.to_string();
    }
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials.to_uppercase()
    }
}

pub fn competition_rank(name: &str) -> usize {
    COMPETITIONS
        .iter()
        .position(|c| c.name == name)
        .map(|idx| idx + 1)
        .unwrap_or(UNKNOWN_RANK)
}

pub fn display_label(name: &str) -> &str {
    find(name).map(|c| c.label).unwrap_or(name)
}

pub fn long_label(name: &str) -> &str {
    find(name).map(|c| c.long_name).unwrap_or(name)
}

pub fn layout_of(name: &str) -> GroupLayout {
    find(name).map(|c| c.layout).unwrap_or(GroupLayout::Inferred)
}
