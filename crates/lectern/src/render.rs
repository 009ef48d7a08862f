//! Server-side HTML rendering of the lecture snapshot.

use chrono::{DateTime, Utc};
use lectern_core::Snapshot;
use lectern_upstream::{Category, Record};

const PLACEHOLDER_BASE: &str = "https://placehold.co/600x400/6a5acd/ffffff?text=";
const IMAGE_ERROR: &str = "https://placehold.co/600x400/EEE/333?text=Image+Error";

/// Escapes text for use in HTML bodies and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable age of `then` relative to `now`, e.g. "5 minutes ago".
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const UNITS: [(i64, &str); 5] = [
        (31_536_000, "years"),
        (2_592_000, "months"),
        (86_400, "days"),
        (3_600, "hours"),
        (60, "minutes"),
    ];

    let seconds = (now - then).num_seconds();
    for (unit, label) in UNITS {
        // A unit is used only once strictly more than one of it has elapsed.
        if seconds > unit {
            return format!("{} {label} ago", seconds / unit);
        }
    }
    "Just now".to_string()
}

fn placeholder_for(batch: Option<&str>) -> String {
    let text: String = url::form_urlencoded::byte_serialize(batch.unwrap_or("Lecture").as_bytes())
        .collect();
    format!("{PLACEHOLDER_BASE}{text}")
}

fn lecture_card(record: &Record) -> String {
    let title = record.title().unwrap_or("Untitled Lecture");
    let batch = record.batch_name();
    let thumbnail = record
        .thumbnail()
        .map_or_else(|| placeholder_for(batch), str::to_string);

    let watch = record.link().map_or_else(String::new, |link| {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener" class="watch-button">Watch Now</a>"#,
            escape_html(link)
        )
    });

    format!(
        r#"<div class="lecture-card">
  <img src="{thumb}" alt="{alt}" class="card-thumbnail" loading="lazy" onerror="this.src='{IMAGE_ERROR}'">
  <div class="card-content">
    <span class="batch-name">{batch}</span>
    <h3 class="lecture-name">{title}</h3>
    {watch}
  </div>
</div>
"#,
        thumb = escape_html(&thumbnail),
        alt = escape_html(title),
        batch = escape_html(batch.unwrap_or("General")),
        title = escape_html(title),
    )
}

fn notification_item(record: &Record) -> String {
    let message = record.message().unwrap_or_default();
    match record.link() {
        Some(link) => format!(
            "<li class=\"notification\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></li>\n",
            escape_html(link),
            escape_html(message)
        ),
        None => format!(
            "<li class=\"notification\">{}</li>\n",
            escape_html(message)
        ),
    }
}

fn section(category: Category, records: &[Record]) -> String {
    let label = category.label();
    let body = if records.is_empty() {
        "<p class=\"empty-state\">No classes available in this category right now.</p>\n".to_string()
    } else if category == Category::Notifications {
        let items: String = records.iter().map(notification_item).collect();
        format!("<ul class=\"notifications\">\n{items}</ul>\n")
    } else {
        let cards: String = records.iter().map(lecture_card).collect();
        format!("<div class=\"lecture-grid\">\n{cards}</div>\n")
    };

    format!(
        "<section id=\"{id}\">\n<h2>{label}</h2>\n{body}</section>\n",
        id = category.wire_name(),
    )
}

/// Renders the full page for `snapshot` as seen at `now`.
pub fn render_page(snapshot: &Snapshot, brand: &str, now: DateTime<Utc>) -> String {
    let updated = snapshot
        .last_updated()
        .map_or_else(|| "never".to_string(), |at| time_since(at, now));
    let sections: String = Category::ALL
        .into_iter()
        .map(|category| section(category, snapshot.records(category)))
        .collect();
    let brand = escape_html(brand);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{brand} Lectures</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<header>
<h1>{brand}</h1>
<p id="last-updated">Last updated: {updated}</p>
</header>
<main>
{sections}</main>
</body>
</html>
"#
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_time_since() {
        let now = Utc::now();
        assert_eq!(time_since(now, now), "Just now");
        assert_eq!(time_since(now - TimeDelta::seconds(60), now), "Just now");
        assert_eq!(time_since(now - TimeDelta::seconds(61), now), "1 minutes ago");
        assert_eq!(time_since(now - TimeDelta::minutes(150), now), "2 hours ago");
        assert_eq!(time_since(now - TimeDelta::days(3), now), "3 days ago");
        assert_eq!(time_since(now - TimeDelta::days(800), now), "2 years ago");
    }

    #[test]
    fn test_card_defaults() {
        let card = lecture_card(&Record::new(json!({})));
        assert!(card.contains("Untitled Lecture"));
        assert!(card.contains(">General<"));
        assert!(card.contains("https://placehold.co/600x400/6a5acd/ffffff?text=Lecture"));
        assert!(!card.contains("Watch Now"));
    }

    #[test]
    fn test_card_fields() {
        let card = lecture_card(&Record::new(json!({
            "lectureName": "Algebra <1>",
            "batchName": "Class 10",
            "link": "https://video.example/a?x=1&y=2"
        })));
        assert!(card.contains("Algebra &lt;1&gt;"));
        assert!(card.contains(">Class 10<"));
        assert!(card.contains("text=Class+10"));
        assert!(card.contains(r#"href="https://video.example/a?x=1&amp;y=2""#));
        assert!(card.contains("Watch Now"));
    }

    #[test]
    fn test_page_lists_sections() {
        let page = render_page(&Snapshot::empty(), "Smartrz", Utc::now());
        for label in ["Live", "Upcoming", "Recorded", "Notifications"] {
            assert!(page.contains(&format!("<h2>{label}</h2>")));
        }
        assert!(page.contains("Last updated: never"));
        assert_eq!(page.matches("empty-state").count(), 4);
    }
}
