use crate::model::{BookInfo, ChapterMeta, ChapterResult};

const STYLE: &str = r#"
    body {
        font-family: Georgia, 'Noto Serif', 'Songti SC', serif;
        max-width: 46em;
        margin: 0 auto;
        padding: 2em 1em;
        line-height: 1.7;
        color: #222;
    }
    .book-header {
        text-align: center;
        border-bottom: 1px solid #ccc;
        margin-bottom: 3em;
        padding-bottom: 2em;
    }
    .book-header h1 {
        font-size: 2.2em;
        font-weight: normal;
    }
    .book-header .meta {
        color: #666;
        margin: 0.2em 0;
    }
    .chapter {
        page-break-before: always;
        margin-bottom: 3em;
    }
    .chapter h2 {
        font-size: 1.5em;
        border-bottom: 1px solid #eee;
        padding-bottom: 0.3em;
    }
"#;

/// Builds the output document from the book's metadata and the chapters
/// that were retrieved.
///
/// `chapters` and `results` are paired by position. Failed chapters are left
/// out entirely; chapter fragments are inserted verbatim. The output depends
/// only on the arguments.
pub fn assemble(book: &BookInfo, chapters: &[ChapterMeta], results: &[ChapterResult]) -> String {
    let retrieved: Vec<(usize, &ChapterMeta, &str)> = chapters
        .iter()
        .zip(results)
        .enumerate()
        .filter_map(|(index, (meta, result))| {
            result
                .content
                .as_deref()
                .map(|content| (index, meta, content))
        })
        .collect();

    let title = escape(&book.title);
    let author = escape(&book.author);

    let mut doc = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title} - {author}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="book-header">
<h1>{title}</h1>
<p class="meta author">Author: {author}</p>
<p class="meta format">Format: {format}</p>
<p class="meta chapters">Chapters: {count}</p>
</div>
"#,
        format = escape(&book.format),
        count = retrieved.len(),
    );

    for (index, meta, content) in retrieved {
        doc.push_str(&format!(
            "<div class=\"chapter\" id=\"chapter-{}\">\n<h2>{}</h2>\n{}\n</div>\n",
            escape(&meta.chapter_uid),
            escape(&chapter_title(meta, index)),
            content
        ));
    }

    doc.push_str("</body>\n</html>\n");
    doc
}

/// The chapter's own title, or an ordinal based on its position in the book.
fn chapter_title(meta: &ChapterMeta, index: usize) -> String {
    let title = meta.title.trim();
    if title.is_empty() {
        format!("Chapter {}", index + 1)
    } else {
        title.to_string()
    }
}

fn escape(text: &str) -> String {
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
