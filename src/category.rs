//! Static category table and extension classifier.
//! Maps a file name's extension to the category subfolder it belongs in.
//! Pure lookups only; no filesystem access.

/// Category used when no extension set matches (or there is no extension).
pub const FALLBACK_CATEGORY: &str = "Other";

/// Ordered table of (category name, lowercase extensions with leading dot).
/// Lookup is first-match-wins, so overlap between extension sets — none today —
/// resolves to the earlier entry. The table is compiled in and immutable.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &[
            ".jpeg", ".jpg", ".png", ".gif", ".bmp", ".tiff", ".ico", ".webp",
        ],
    ),
    (
        "Documents",
        &[
            ".pdf", ".doc", ".docx", ".txt", ".rtf", ".xls", ".xlsx", ".ppt", ".pptx",
        ],
    ),
    ("Audio", &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a"]),
    ("Videos", &[".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv"]),
    ("Installers", &[".exe", ".msi", ".dmg", ".pkg"]),
    ("Compressed", &[".zip", ".rar", ".7z", ".tar", ".gz"]),
    (
        "Code & Scripts",
        &[
            ".py", ".java", ".c", ".cpp", ".html", ".css", ".js", ".ipynb", ".sh",
        ],
    ),
];

/// Classify a file name by its (last) extension, case-insensitively.
/// Names without an extension, dotfiles, and unknown extensions map to
/// [`FALLBACK_CATEGORY`].
pub fn classify(file_name: &str) -> &'static str {
    let ext = match std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(e) => format!(".{}", e.to_ascii_lowercase()),
        None => return FALLBACK_CATEGORY,
    };

    for (name, extensions) in CATEGORIES {
        if extensions.contains(&ext.as_str()) {
            return name;
        }
    }
    FALLBACK_CATEGORY
}
