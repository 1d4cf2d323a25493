//! Team-name helpers shared by the loader, the standings engine and the club view.

/// Locates a `W/O` tag (also `w/ o`) standing as its own word.
pub fn find_walkover_tag(name: &str) -> Option<(usize, usize)> {
    let bytes = name.as_bytes();
    let len = bytes.len();
    for i in 0..len {
        if !bytes[i].eq_ignore_ascii_case(&b'w') {
            continue;
        }
        if i > 0 && is_word_byte(bytes[i - 1]) {
            continue;
        }
        if bytes.get(i + 1) != Some(&b'/') {
            continue;
        }
        let mut j = i + 2;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < len && bytes[j].eq_ignore_ascii_case(&b'o') && (j + 1 == len || !is_word_byte(bytes[j + 1]))
        {
            return Some((i, j + 1));
        }
    }
    None
}

pub fn has_walkover_tag(name: &str) -> bool {
    find_walkover_tag(name).is_some()
}

/// Drops `(W/O)` and bare `W/O` tags and collapses the leftover whitespace.
pub fn clean_team_name(name: &str) -> String {
    let mut out = name.to_string();
    while let Some((start, end)) = find_walkover_tag(&out) {
        let prefix = &out[..start];
        let suffix = &out[end..];
        let prefix_trim = prefix.trim_end();
        let suffix_trim = suffix.trim_start();
        let (prefix, suffix) = if prefix_trim.ends_with('(') && suffix_trim.starts_with(')') {
            (&prefix_trim[..prefix_trim.len() - 1], &suffix_trim[1..])
        } else {
            (prefix, suffix)
        };
        out = format!("{prefix} {suffix}");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Knockout draws name slots like "Winner Group 1" or "TBC" before the real
/// clubs are known; those never belong in a club list or a league table.
pub fn looks_like_club(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_ascii_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();
    if words.iter().any(|w| *w == "group") {
        return false;
    }
    const PLACEHOLDER_LEADS: [&str; 7] = [
        "winner",
        "winners",
        "runner",
        "runners-up",
        "runnersup",
        "loser",
        "losers",
    ];
    if let Some(first) = words.first()
        && PLACEHOLDER_LEADS.contains(first)
    {
        return false;
    }
    if lower.starts_with("runners up") {
        return false;
    }
    !matches!(lower.as_str(), "tbc" | "bye")
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
