//! Standalone HTML rendering of a summary.

use html_escape::encode_text;

use crate::models::{PaperMeta, SummaryContent};

const DEFAULT_TITLE: &str = "Academic Research Summary";
const DEFAULT_AUTHOR: &str = "Unknown Author";
const DEFAULT_DATE: &str = "Recent";
const DEFAULT_INTRODUCTION: &str =
    "This research provides valuable insights into important academic concepts.";
const DEFAULT_HEADING: &str = "Key Point";
const DEFAULT_CONTENT: &str = "Content not available";
const DEFAULT_CONCLUSION: &str = "This research contributes valuable knowledge to the field and \
                                  opens new avenues for understanding.";

const STYLESHEET: &str = r#"
        body {
            font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
            line-height: 1.6;
            color: #2d3748;
            max-width: 800px;
            margin: 0 auto;
            padding: 2rem;
            background-color: #f7fafc;
        }
        .header {
            text-align: center;
            margin-bottom: 3rem;
            padding: 2rem;
            background: linear-gradient(135deg, #10b981 0%, #059669 100%);
            color: white;
            border-radius: 12px;
        }
        .header h1 { font-size: 2.5rem; margin-bottom: 1rem; font-weight: 700; }
        .meta { opacity: 0.9; font-size: 0.9rem; }
        .content {
            background: white;
            padding: 2.5rem;
            border-radius: 12px;
            box-shadow: 0 4px 20px rgba(0,0,0,0.1);
            margin-bottom: 2rem;
        }
        .intro {
            font-size: 1.2rem;
            font-style: italic;
            color: #4a5568;
            margin-bottom: 2rem;
            padding: 1.5rem;
            background: #edf2f7;
            border-left: 4px solid #10b981;
            border-radius: 0 8px 8px 0;
        }
        .section { margin-bottom: 2.5rem; }
        .section h2 {
            color: #2d3748;
            font-size: 1.5rem;
            margin-bottom: 1rem;
            border-bottom: 2px solid #e2e8f0;
            padding-bottom: 0.5rem;
        }
        .section p { margin-bottom: 1rem; font-size: 1.1rem; }
        .implications {
            background: #f0fff4;
            border: 1px solid #9ae6b4;
            padding: 1.5rem;
            border-radius: 8px;
            margin-top: 2rem;
        }
        .implications h3 { color: #22543d; margin-bottom: 1rem; }
        .implications ul { list-style-type: none; padding: 0; }
        .implications li { padding: 0.5rem 0; border-bottom: 1px solid #c6f6d5; }
        .implications li:before { content: "\2713 "; color: #38a169; font-weight: bold; margin-right: 0.5rem; }
        .footer {
            text-align: center;
            margin-top: 3rem;
            padding: 2rem;
            background: #2d3748;
            color: white;
            border-radius: 12px;
        }
"#;

/// Render a summary as a self-contained HTML page: inline styles, no external
/// resources. Blank fields are replaced with default phrases.
pub fn render(summary: &SummaryContent, meta: &PaperMeta) -> String {
    let title = or_default(&summary.title, DEFAULT_TITLE);
    let author = meta
        .author
        .as_deref()
        .map(|author| or_default(author, DEFAULT_AUTHOR))
        .unwrap_or(DEFAULT_AUTHOR);
    let published = meta
        .upload_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| DEFAULT_DATE.to_string());

    let key_points: String = summary
        .key_points
        .iter()
        .map(|point| {
            format!(
                r#"
        <div class="section">
            <h2>{}</h2>
            <p>{}</p>
        </div>
"#,
                encode_text(or_default(&point.heading, DEFAULT_HEADING)),
                encode_text(or_default(&point.content, DEFAULT_CONTENT)),
            )
        })
        .collect();

    let implications: String = summary
        .implications
        .iter()
        .filter(|implication| !implication.trim().is_empty())
        .map(|implication| format!("                <li>{}</li>\n", encode_text(implication)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{stylesheet}    </style>
</head>
<body>
    <div class="header">
        <h1>{title}</h1>
        <div class="meta">
            <p>Based on research by {author}</p>
            <p>Published: {published} | Reading time: 6-8 minutes</p>
        </div>
    </div>

    <div class="content">
        <div class="intro">
            {introduction}
        </div>
{key_points}
        <div class="implications">
            <h3>Key Implications and Takeaways</h3>
            <ul>
{implications}            </ul>
        </div>
    </div>

    <div class="footer">
        <p><strong>Conclusion:</strong> {conclusion}</p>
    </div>
</body>
</html>
"#,
        stylesheet = STYLESHEET,
        title = encode_text(title),
        author = encode_text(author),
        published = encode_text(&published),
        introduction = encode_text(or_default(&summary.introduction, DEFAULT_INTRODUCTION)),
        conclusion = encode_text(or_default(&summary.conclusion, DEFAULT_CONCLUSION)),
    )
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyPoint;
    use chrono::{TimeZone, Utc};

    fn summary() -> SummaryContent {
        SummaryContent {
            title: "Clouds & Code".to_string(),
            introduction: "Why <models> matter.".to_string(),
            key_points: vec![
                KeyPoint::new("Data", "Forty years of it."),
                KeyPoint::new("", ""),
            ],
            conclusion: "It works.".to_string(),
            implications: vec!["Cheaper forecasts".to_string(), "  ".to_string()],
        }
    }

    #[test]
    fn test_renders_all_parts() {
        let meta = PaperMeta {
            author: Some("John Smith".to_string()),
            upload_date: Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()),
        };
        let html = render(&summary(), &meta);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Clouds &amp; Code</title>"));
        assert!(html.contains("Based on research by John Smith"));
        assert!(html.contains("Published: 2024-03-09"));
        assert!(html.contains("Why &lt;models&gt; matter."));
        assert!(html.contains("<h2>Data</h2>"));
        assert!(html.contains("<li>Cheaper forecasts</li>"));
        assert_eq!(html.matches("<li>").count(), 1);
        assert!(html.contains("<strong>Conclusion:</strong> It works."));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let empty = SummaryContent {
            title: String::new(),
            introduction: String::new(),
            key_points: vec![KeyPoint::new("", "")],
            conclusion: String::new(),
            implications: Vec::new(),
        };
        let html = render(&empty, &PaperMeta::default());

        assert!(html.contains(DEFAULT_TITLE));
        assert!(html.contains(DEFAULT_AUTHOR));
        assert!(html.contains("Published: Recent"));
        assert!(html.contains(DEFAULT_INTRODUCTION));
        assert!(html.contains(DEFAULT_HEADING));
        assert!(html.contains(DEFAULT_CONTENT));
        assert!(html.contains(DEFAULT_CONCLUSION));
    }

    #[test]
    fn test_output_is_self_contained() {
        let html = render(&summary(), &PaperMeta::default());
        assert!(!html.contains("<link"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("src="));
    }
}
