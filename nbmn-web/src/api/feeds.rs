//! Atom and iCalendar feeds of movie nights

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
};
use chrono::{Local, TimeZone};
use nbmn_common::models::parse_now_field;
use nbmn_common::Night;

use crate::error::ApiResult;
use crate::{AppState, SiteStore};

const FEED_TITLE: &str = "Nutbush Movie Night";

/// GET /feed/atom
pub async fn atom_feed<S: SiteStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let nights = newest_first(state.store.find_all().await?);
    let body = render_atom(&nights, &site_base(&headers));
    Ok(([(header::CONTENT_TYPE, "application/atom+xml; charset=utf-8")], body))
}

/// GET /feed/ical
pub async fn ical_feed<S: SiteStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let nights = newest_first(state.store.find_all().await?);
    let body = render_ical(&nights, &site_base(&headers));
    Ok(([(header::CONTENT_TYPE, "text/calendar; charset=utf-8")], body))
}

fn newest_first(mut nights: Vec<Night>) -> Vec<Night> {
    nights.sort_by(|a, b| b.datestr.cmp(&a.datestr));
    nights
}

/// `http://<host>` from the request, for absolute links
fn site_base(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

// ============================================================================
// Atom
// ============================================================================

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// RFC 3339 time of the last save, else the night itself
fn updated_rfc3339(night: &Night) -> String {
    night
        .last_update
        .as_deref()
        .and_then(parse_now_field)
        .and_then(|naive| Local.from_local_datetime(&naive).single())
        .map(|dt| dt.to_rfc3339())
        .or_else(|| {
            night
                .date()
                .map(|d| d.format("%Y-%m-%dT23:30:00Z").to_string())
        })
        .unwrap_or_else(|| Local::now().to_rfc3339())
}

pub fn render_atom(nights: &[Night], base: &str) -> String {
    let updated = nights
        .first()
        .map(updated_rfc3339)
        .unwrap_or_else(|| Local::now().to_rfc3339());

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    xml.push_str(&format!("  <title>{}</title>\n", FEED_TITLE));
    xml.push_str(&format!("  <author><name>{}</name></author>\n", FEED_TITLE));
    xml.push_str(&format!("  <id>{}/</id>\n", xml_escape(base)));
    xml.push_str(&format!(
        "  <link rel=\"self\" href=\"{}/feed/atom\"/>\n",
        xml_escape(base)
    ));
    xml.push_str(&format!("  <updated>{}</updated>\n", updated));

    for night in nights {
        let url = xml_escape(&format!("{}/night/{}", base, night.datestr));
        let content = format!(
            "<p><b>Attendees:</b> {}</p><p><b>Dinner:</b> {}</p>{}",
            night.attendees.join(", "),
            night.dinner,
            night.comments
        );

        xml.push_str("  <entry>\n");
        xml.push_str(&format!(
            "    <title>{}: {}</title>\n",
            xml_escape(&night.listdate_short()),
            xml_escape(&night.moviename)
        ));
        xml.push_str(&format!("    <id>{}</id>\n", url));
        xml.push_str(&format!("    <link href=\"{}\"/>\n", url));
        xml.push_str(&format!("    <updated>{}</updated>\n", updated_rfc3339(night)));
        xml.push_str(&format!(
            "    <content type=\"html\">{}</content>\n",
            xml_escape(&content)
        ));
        xml.push_str("  </entry>\n");
    }

    xml.push_str("</feed>\n");
    xml
}

// ============================================================================
// iCalendar
// ============================================================================

fn ical_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Content lines longer than this many octets are folded
const ICAL_LINE_OCTETS: usize = 75;

/// Fold a content line: CRLF plus one space before each continuation,
/// never splitting a UTF-8 sequence
fn fold_ical_line(line: &str) -> String {
    if line.len() <= ICAL_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / ICAL_LINE_OCTETS * 3);
    // The leading space of a continuation counts toward its limit
    let mut room = ICAL_LINE_OCTETS;
    let mut used = 0;
    for ch in line.chars() {
        let width = ch.len_utf8();
        if used + width > room {
            out.push_str("\r\n ");
            room = ICAL_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(ch);
        used += width;
    }
    out
}

/// One VEVENT per night with a valid date
pub fn render_ical(nights: &[Night], base: &str) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Nutbush Movie Night//nbmn//EN".to_string(),
        format!("X-WR-CALNAME:{}", FEED_TITLE),
    ];

    for night in nights.iter().filter(|n| n.date().is_some()) {
        let description = format!(
            "Attendees: {}\nDinner: {}",
            night.attendees.join(", "),
            night.dinner
        );
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@nbmn", night.datestr));
        lines.push(format!("DTSTAMP:{}", night.dstamp_ical()));
        lines.push(format!("DTSTART:{}", night.listdate_ical()));
        lines.push(format!("SUMMARY:{}", ical_escape(&night.moviename)));
        lines.push(format!("DESCRIPTION:{}", ical_escape(&description)));
        lines.push(format!("URL:{}/night/{}", base, night.datestr));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    let folded: Vec<String> = lines.iter().map(|l| fold_ical_line(l)).collect();
    let mut body = folded.join("\r\n");
    body.push_str("\r\n");
    body
}
