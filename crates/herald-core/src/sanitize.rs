//! Rich-text to plain-text conversion for card content.
//!
//! Host strings carry an angle-bracket markup dialect: inline icons
//! (`<sprite name="icon_apple">`), bold spans (`<b>`/`</b>`), and assorted
//! styling tags. Cards only understand `**` emphasis, so [`sanitize`]
//! rewrites icons to words, bold spans to `**`, drops everything else, and
//! highlights the action verb of job descriptions.
//!
//! The pipeline runs in a fixed order (tag scan, whitespace collapse,
//! action emphasis) so that sanitizing already-sanitized text is a no-op.

/// Placeholder shown for entities without a job.
pub const UNEMPLOYED: &str = "Unemployed";

/// Marker for truncated text.
const ELLIPSIS: &str = "...";

/// Markdown emphasis marker substituted for bold spans.
const EMPHASIS: &str = "**";

/// Icon name fragments and the word that replaces the icon.
///
/// Checked in order; the first fragment contained in the icon name wins.
const ICON_LABELS: &[(&[&str], &str)] = &[
    (&["apple"], "Apple"),
    (&["charcoal"], "Charcoal"),
    (&["wheat", "grain"], "Wheat"),
    (&["fish"], "Fish"),
    (&["stone"], "Stone"),
    (&["wood"], "Wood"),
    (&["iron"], "Iron"),
    (&["wool"], "Wool"),
    (&["meat"], "Meat"),
    (&["gold", "money"], "Gold"),
];

/// Verbs that lead job descriptions and get emphasized.
const ACTION_KEYWORDS: &[&str] = &[
    "Returning",
    "Fetching",
    "Planting",
    "Searching",
    "Gathering",
    "Patrolling",
    "Building",
    "Harvesting",
    "Hunting",
    "Working",
    "Collecting",
    "Waiting",
    "Traveling",
    "Chopping",
    "Cutting",
    "Repairing",
    "Idle",
    "Constructing",
    "Defending",
];

/// Convert host markup into card-safe plain text.
pub fn sanitize(input: &str) -> String {
    let stripped = strip_tags(input);
    let collapsed = collapse_spaces(&stripped);
    emphasize_actions(&collapsed)
}

/// Clamp `text` to at most `max` characters.
///
/// Longer strings keep their first `max - 3` characters followed by
/// `...`, so the result is exactly `max` characters long.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    if max < ELLIPSIS.len() {
        return text.chars().take(max).collect();
    }
    let mut out: String = text
        .chars()
        .take(max.saturating_sub(ELLIPSIS.len()))
        .collect();
    out.push_str(ELLIPSIS);
    out
}

/// The sanitized job label for display, or [`UNEMPLOYED`] when the job is
/// missing or sanitizes to nothing.
pub fn job_label(job: Option<&str>) -> String {
    let label = job.map(sanitize).unwrap_or_default();
    if label.is_empty() {
        UNEMPLOYED.to_owned()
    } else {
        label
    }
}

// ---------------------------------------------------------------------------
// Tag scan
// ---------------------------------------------------------------------------

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut tag: Option<String> = None;

    for c in input.chars() {
        match (tag.take(), c) {
            (_, '<') => tag = Some(String::new()),
            (Some(content), '>') => render_tag(&content, &mut out),
            (Some(mut content), other) => {
                content.push(other);
                tag = Some(content);
            }
            (None, other) => out.push(other),
        }
    }

    // An unterminated span is dropped along with its content.
    out
}

fn render_tag(content: &str, out: &mut String) {
    if let Some(icon) = content.strip_prefix("sprite name=") {
        out.push_str(&icon_label(icon.trim()));
    } else if content == "b" || content == "/b" {
        out.push_str(EMPHASIS);
    }
}

fn icon_label(icon: &str) -> String {
    ICON_LABELS
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| icon.contains(f)))
        .map_or_else(
            || {
                icon.replace("icon_", "")
                    .replace(['"', '\'', '='], "")
                    .replace('_', " ")
                    .trim()
                    .to_owned()
            },
            |(_, label)| (*label).to_owned(),
        )
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(c);
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out.trim().to_owned()
}

// ---------------------------------------------------------------------------
// Action emphasis
// ---------------------------------------------------------------------------

/// How a matched action keyword is wrapped.
enum Emphasis {
    /// `Keyword:` anywhere becomes `**Keyword:**`.
    Labelled(&'static str),
    /// A leading `Keyword` becomes `**Keyword**`.
    Leading(&'static str),
}

fn emphasize_actions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos: usize = 0;

    while let Some(tail) = text.get(pos..) {
        let before = text.get(..pos).unwrap_or_default();
        match action_at(before, tail) {
            Some(Emphasis::Labelled(keyword)) => {
                out.push_str(EMPHASIS);
                out.push_str(keyword);
                out.push(':');
                out.push_str(EMPHASIS);
                pos = pos.saturating_add(keyword.len()).saturating_add(1);
            }
            Some(Emphasis::Leading(keyword)) => {
                out.push_str(EMPHASIS);
                out.push_str(keyword);
                out.push_str(EMPHASIS);
                pos = pos.saturating_add(keyword.len());
            }
            None => {
                let Some(c) = tail.chars().next() else {
                    break;
                };
                out.push(c);
                pos = pos.saturating_add(c.len_utf8());
            }
        }
    }

    out
}

fn action_at(before: &str, tail: &str) -> Option<Emphasis> {
    // Only whole words that are not already wrapped.
    if before.ends_with(EMPHASIS) || before.chars().next_back().is_some_and(char::is_alphanumeric)
    {
        return None;
    }

    ACTION_KEYWORDS.iter().find_map(|&keyword| {
        let after = tail.strip_prefix(keyword)?;
        if after.starts_with(':') {
            Some(Emphasis::Labelled(keyword))
        } else if before.is_empty() && (after.is_empty() || after.starts_with(' ')) {
            Some(Emphasis::Leading(keyword))
        } else {
            None
        }
    })
}
