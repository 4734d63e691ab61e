/*!
format.rs

Output rendering for command results.

Modes (`-o/--output`):
  - json : pretty-printed, unmodified value (machine output; no colors)
  - text : human output
      * array of objects -> aligned table, columns = keys of the first row
        (key order preserved, so projected fields print in projection order)
      * object           -> `key: value` lines
      * scalar           -> printed as-is
      * null / []        -> nothing

Colors are on by default and disabled with NO_COLOR. Width comes from
COLUMNS (clamped 40..=220, default 120); wide cells are truncated with `…`.

This module returns strings and never prints.
*/

use serde_json::Value;

/* ---- Output mode ---- */

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputMode {
    /// Human-readable text (tables for lists)
    #[default]
    Text,
    /// Raw JSON as returned by the service
    Json,
}

/* ---- Style ---- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(120);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            term_width: width,
        }
    }

    /// Fixed style for deterministic rendering.
    #[cfg(test)]
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Header,
    Key,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Header => "1;38;5;45",
        Role::Key => "38;5;250",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* ---- Rendering ---- */

/// Render a command result. `None` when there is nothing to print.
pub fn render(value: &Value, mode: OutputMode, style: &StyleOptions) -> Option<String> {
    match mode {
        OutputMode::Json => {
            if value.is_null() {
                return None;
            }
            Some(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
        }
        OutputMode::Text => render_text(value, style),
    }
}

fn render_text(value: &Value, style: &StyleOptions) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.iter().all(Value::is_object) => Some(records_table(items, style)),
        Value::Array(items) => Some(
            items
                .iter()
                .map(cell_text)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Object(map) => {
            let key_width = map.keys().map(|k| k.chars().count()).max().unwrap_or(0);
            let lines = map
                .iter()
                .map(|(k, v)| {
                    let key = format!("{k:<key_width$}");
                    let text = truncate_ellipsis(&cell_text(v), style.term_width.saturating_sub(key_width + 2));
                    format!("{}: {text}", color(Role::Key, key, style))
                })
                .collect::<Vec<_>>();
            Some(lines.join("\n"))
        }
        other => Some(cell_text(other)),
    }
}

fn records_table(items: &[Value], style: &StyleOptions) -> String {
    let headers: Vec<String> = items
        .first()
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|h| item.get(h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    table(&headers, &rows, style)
}

/// Aligned table: two-space gutters, header rule, widest columns shrunk first
/// when the total exceeds the terminal width.
pub fn table(headers: &[String], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    const MIN_COL: usize = 4;
    let gutter = 2;

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let total = widths.iter().sum::<usize>() + gutter * (widths.len() - 1);
    if total > style.term_width {
        let mut overflow = total - style.term_width;
        let mut order: Vec<usize> = (0..widths.len()).collect();
        order.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
        for idx in order {
            if overflow == 0 {
                break;
            }
            let shrink = widths[idx].saturating_sub(MIN_COL).min(overflow);
            widths[idx] -= shrink;
            overflow -= shrink;
        }
    }

    let render_row = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let raw = cells.get(i).map(String::as_str).unwrap_or("");
                pad(&truncate_ellipsis(raw, *w), *w)
            })
            .collect::<Vec<_>>()
            .join(&" ".repeat(gutter))
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(color(Role::Header, render_row(headers), style));
    let rule = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(&" ".repeat(gutter));
    lines.push(color(Role::Dim, rule, style));
    for row in rows {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

/// Text for one cell: strings unquoted, null empty, everything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace('\n', " "),
        other => other.to_string(),
    }
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_mode_is_passthrough() {
        let v = json!([{"Id": "1", "Formats": null}]);
        let out = render(&v, OutputMode::Json, &StyleOptions::plain(80)).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), v);
        assert!(render(&Value::Null, OutputMode::Json, &StyleOptions::plain(80)).is_none());
    }

    #[test]
    fn text_table_keeps_column_order() {
        let v = json!([
            {"Id": "85907fb0", "Title": "All Documents", "DefaultView": true},
            {"Id": "281e80fd", "Title": "", "DefaultView": false}
        ]);
        let out = render(&v, OutputMode::Text, &StyleOptions::plain(80)).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Id        Title          DefaultView");
        assert_eq!(lines[1], "--------  -------------  -----------");
        assert_eq!(lines[2], "85907fb0  All Documents  true");
        assert_eq!(lines[3], "281e80fd                 false");
    }

    #[test]
    fn text_object_is_key_value() {
        let v = json!({"id": "abc", "displayName": "Contoso"});
        let out = render(&v, OutputMode::Text, &StyleOptions::plain(80)).unwrap();
        assert_eq!(out, "id         : abc\ndisplayName: Contoso");
    }

    #[test]
    fn text_empty_prints_nothing() {
        let style = StyleOptions::plain(80);
        assert!(render(&json!([]), OutputMode::Text, &style).is_none());
        assert!(render(&Value::Null, OutputMode::Text, &style).is_none());
    }

    #[test]
    fn narrow_terminal_truncates() {
        let headers = vec!["Title".to_string()];
        let rows = vec![vec!["a very long view title indeed".to_string()]];
        let out = table(&headers, &rows, &StyleOptions::plain(10));
        assert!(out.lines().all(|l| l.chars().count() <= 10));
        assert!(out.contains('…'));
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_ellipsis("abc", 4), "abc");
    }
}
