//! # HTML Rendering
//!
//! Minimal server-rendered HTML for the report pages: a page shell, summary
//! cards, data tables, and an inline JSON chart config for chart view.
//!
//! ## Safety
//! Every dynamic value passes through [`escape`] before it reaches markup.
//! Report data includes free-text fields (notes, product names, usernames)
//! that must never be interpreted as HTML.

use serde::Serialize;

use till_db::ReportSection;

/// Escapes a value for safe inclusion in HTML text or attributes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Wraps report content in the shared page shell.
pub fn page(title: &str, company: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title} - {company}</title>\n\
         </head>\n\
         <body>\n\
         <header><h1>{title}</h1></header>\n\
         <main>\n{body}</main>\n\
         </body>\n\
         </html>\n",
        title = escape(title),
        company = escape(company),
        body = body,
    )
}

/// A row of summary cards (label/value pairs) above the main table.
pub fn summary_cards(cards: &[(&str, String)]) -> String {
    let mut html = String::from("<section class=\"summary-cards\">\n");
    for (label, value) in cards {
        html.push_str(&format!(
            "<div class=\"card\"><span class=\"label\">{}</span>\
             <span class=\"value\">{}</span></div>\n",
            escape(label),
            escape(value),
        ));
    }
    html.push_str("</section>\n");
    html
}

/// A data table with a header row. Cell values are escaped here, so
/// callers pass raw strings.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for h in headers {
        html.push_str(&format!("<th>{}</th>", escape(h)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    if rows.is_empty() {
        html.push_str(&format!(
            "<tr><td colspan=\"{}\" class=\"empty\">No data for the selected filters</td></tr>\n",
            headers.len()
        ));
    }
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Banner shown in place of a section whose query failed or timed out.
pub fn unavailable_banner(section: &str) -> String {
    format!(
        "<div class=\"section-unavailable\">The {} section is temporarily \
         unavailable. Other sections are unaffected.</div>\n",
        escape(section),
    )
}

/// Renders a section: its content when available, the banner otherwise.
pub fn section_or_banner<T>(
    section: &ReportSection<T>,
    name: &str,
    render: impl FnOnce(&[T]) -> String,
) -> String {
    if section.unavailable {
        unavailable_banner(name)
    } else {
        render(&section.rows)
    }
}

/// Inline chart config for chart view: a `<script type="application/json">`
/// block the front-end chart bootstrap reads. JSON inside a script tag must
/// not contain a literal `</script>`.
pub fn chart_embed<T: Serialize>(chart_id: &str, data: &T) -> String {
    let json = serde_json::to_string(data)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");
    format!(
        "<script type=\"application/json\" id=\"{}\">{}</script>\n",
        escape(chart_id),
        json,
    )
}

/// Pagination footer: current page and total row count.
pub fn pagination(page: u32, per_page: u32, total: i64) -> String {
    let pages = if total == 0 {
        1
    } else {
        ((total as u32) + per_page - 1) / per_page
    };
    format!(
        "<nav class=\"pagination\">Page {page} of {pages} ({total} rows)</nav>\n"
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_table_escapes_cells() {
        let html = table(&["Notes"], &[vec!["<b>hi</b>".to_string()]]);
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>hi</b>"));
    }

    #[test]
    fn test_empty_table_has_placeholder_row() {
        let html = table(&["A", "B"], &[]);
        assert!(html.contains("colspan=\"2\""));
        assert!(html.contains("No data"));
    }

    #[test]
    fn test_unavailable_section_renders_banner() {
        let section: ReportSection<i64> = ReportSection::unavailable();
        let html = section_or_banner(&section, "payment mix", |_| unreachable!());
        assert!(html.contains("temporarily"));
        assert!(html.contains("payment mix"));
    }

    #[test]
    fn test_chart_embed_neutralizes_script_close() {
        let html = chart_embed("sales-chart", &vec!["</script><script>evil()"]);
        assert!(!html.contains("</script><script>evil"));
        assert!(html.contains("<\\/script>"));
    }

    #[test]
    fn test_pagination_math() {
        assert!(pagination(1, 25, 0).contains("Page 1 of 1"));
        assert!(pagination(2, 10, 15).contains("Page 2 of 2"));
        assert!(pagination(1, 10, 100).contains("of 10"));
    }
}
