use crate::{
    application::dto::transfer_dto::FileListingDTO,
    domain::naming::{FileCategory, ALLOWED_EXTENSIONS},
};

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: linear-gradient(135deg, #f6f9fc, #eef2f7); color: #212529; line-height: 1.6; min-height: 100vh; }
.container { width: 90%; max-width: 800px; margin: 2rem auto; }
header { text-align: center; margin-bottom: 2rem; }
h1 { font-size: 2.2rem; color: #4361ee; }
.subtitle { color: #6c757d; }
.card { background: white; border-radius: 12px; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1); padding: 2rem; margin-bottom: 2rem; }
.upload-form { display: flex; flex-direction: column; align-items: center; gap: 1rem; }
.file-input { width: 100%; padding: 0.8rem; border: 2px dashed #ced4da; border-radius: 12px; background: #f8f9fa; }
.upload-btn { background: #4361ee; color: white; border: none; padding: 0.7rem 2rem; border-radius: 8px; cursor: pointer; }
.hint { font-size: 0.85rem; color: #6c757d; }
.file-item { display: flex; justify-content: space-between; align-items: center; padding: 0.8rem 0; border-bottom: 1px solid #e9ecef; }
.file-info { display: flex; align-items: center; gap: 0.8rem; overflow: hidden; }
.file-icon { font-size: 0.7rem; font-weight: 700; width: 3rem; text-align: center; padding: 0.3rem; border-radius: 6px; background: #e7ecff; color: #4361ee; }
.file-icon.image { background: #e6f7ee; color: #2b9348; }
.file-icon.audio { background: #fff4e6; color: #e8590c; }
.file-icon.video { background: #f3e8ff; color: #7b2cbf; }
.file-icon.pdf { background: #ffe3e3; color: #c92a2a; }
.file-name { white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.file-meta { font-size: 0.8rem; color: #6c757d; }
.file-actions a { margin-left: 0.8rem; text-decoration: none; }
.delete-btn { color: #c92a2a; }
.empty-state { text-align: center; color: #6c757d; padding: 2rem 0; }
"#;

pub fn render_index(files: &[FileListingDTO]) -> String {
    let file_list = if files.is_empty() {
        r#"<div class="empty-state"><p>No files uploaded yet. Upload your first file!</p></div>"#
            .to_string()
    } else {
        files.iter().map(render_file_item).collect::<String>()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fast File Transfer</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Fast File Transfer</h1>
            <p class="subtitle">Share files between devices on the same network</p>
        </header>
        <div class="card">
            <form class="upload-form" method="post" action="/upload" enctype="multipart/form-data">
                <input class="file-input" type="file" name="file">
                <button class="upload-btn" type="submit">Upload</button>
                <p class="hint">Allowed: {allowed}. Files are removed after one hour.</p>
            </form>
        </div>
        <div class="card">
            <h2>Files ({count})</h2>
            {file_list}
        </div>
    </div>
</body>
</html>
"#,
        style = STYLE,
        allowed = ALLOWED_EXTENSIONS.join(", "),
        count = files.len(),
        file_list = file_list,
    )
}

fn render_file_item(file: &FileListingDTO) -> String {
    let handle = urlencoding::encode(&file.storage_name);
    format!(
        r#"
            <div class="file-item">
                <div class="file-info">
                    <div class="file-icon {category}">{badge}</div>
                    <div>
                        <div class="file-name">{name}</div>
                        <div class="file-meta">{size} &middot; {uploaded}</div>
                    </div>
                </div>
                <div class="file-actions">
                    <a href="/download/{handle}" class="download-btn" title="Download">Download</a>
                    <a href="/delete/{handle}" class="delete-btn" title="Delete" onclick="return confirm('Are you sure you want to delete this file?')">Delete</a>
                </div>
            </div>"#,
        category = file.category.as_str(),
        badge = badge(file.category),
        name = escape_html(&file.display_name),
        size = human_size(file.size_bytes),
        uploaded = file.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
        handle = handle,
    )
}

fn badge(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Image => "IMG",
        FileCategory::Audio => "AUDIO",
        FileCategory::Video => "VIDEO",
        FileCategory::Pdf => "PDF",
        FileCategory::Document => "DOC",
        FileCategory::Generic => "FILE",
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    fn listing(storage_name: &str, display_name: &str) -> FileListingDTO {
        FileListingDTO {
            storage_name: storage_name.to_string(),
            display_name: display_name.to_string(),
            category: crate::domain::naming::file_category(storage_name),
            extension: crate::domain::naming::extension(storage_name),
            size_bytes: 2048,
            uploaded_at: Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_listing_shows_placeholder() {
        let html = render_index(&[]);
        assert!(html.contains("No files uploaded yet"));
        assert!(html.contains("Files (0)"));
    }

    #[test]
    fn items_link_by_storage_name_and_show_display_name() {
        let html = render_index(&[listing("20240101_100000_vacation.jpg", "vacation.jpg")]);
        assert!(html.contains(r#"href="/download/20240101_100000_vacation.jpg""#));
        assert!(html.contains(r#"href="/delete/20240101_100000_vacation.jpg""#));
        assert!(html.contains(r#"<div class="file-name">vacation.jpg</div>"#));
        assert!(html.contains("file-icon image"));
        assert!(html.contains("2.0 KB"));
    }

    #[test]
    fn names_are_escaped_and_encoded() {
        let html = render_index(&[listing("<b>&x.txt", "<b>&x.txt")]);
        assert!(html.contains("&lt;b&gt;&amp;x.txt"));
        assert!(html.contains("/download/%3Cb%3E%26x.txt"));
        assert!(!html.contains("<b>&x"));
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
