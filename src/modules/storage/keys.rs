/// Longest file name kept in object keys and emails
const MAX_FILENAME_CHARS: usize = 100;

/// Longest suffix still treated as an extension when truncating
const MAX_EXTENSION_CHARS: usize = 10;

/// Make a user-supplied file name safe to embed in an object key.
///
/// Directory components are dropped and characters outside `[A-Za-z0-9._-]`
/// become `_` with runs collapsed. Leading dots are removed and the result
/// is capped at 100 characters with the extension preserved.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = replace_unsafe(base);
    let cleaned = cleaned.trim_start_matches('.');

    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.len() <= MAX_EXTENSION_CHARS => {
            (trim_stem(stem), Some(ext.trim_matches('_')))
        }
        _ => (trim_stem(cleaned), None),
    };

    let stem = if stem.is_empty() { "file" } else { stem };
    match ext.filter(|e| !e.is_empty()) {
        Some(ext) => {
            let keep = MAX_FILENAME_CHARS - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        None => stem[..MAX_FILENAME_CHARS.min(stem.len())].to_string(),
    }
}

/// Leading dots may hide behind underscores, e.g. `_.a`
fn trim_stem(stem: &str) -> &str {
    stem.trim_start_matches(['.', '_']).trim_end_matches('_')
}

fn replace_unsafe(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
            ch
        } else {
            '_'
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_safe_names() {
        assert_eq!(sanitize_filename("report-2025_v2.pdf"), "report-2025_v2.pdf");
    }

    #[test]
    fn test_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\plan.xlsx"), "plan.xlsx");
    }

    #[test]
    fn test_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my file!!.png"), "my_file.png");
        assert_eq!(sanitize_filename("決算 資料 (最終).pdf"), "file.pdf");
        assert_eq!(sanitize_filename("見積 v2.xlsx"), "v2.xlsx");
    }

    #[test]
    fn test_hidden_and_empty_names_fall_back() {
        assert_eq!(sanitize_filename(".env"), "env");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename("日本語"), "file");
        assert_eq!(sanitize_filename("_.a.pdf"), "a.pdf");
        assert_eq!(sanitize_filename("（控）.profile"), "file.profile");
    }

    #[test]
    fn test_long_names_keep_extension() {
        let long = format!("{}.docx", "a".repeat(150));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), MAX_FILENAME_CHARS);
        assert!(sanitized.ends_with(".docx"));
    }

    #[test]
    fn test_result_never_contains_separators() {
        for raw in [
            "a/b/../c.txt",
            "..\\..\\x.csv",
            "a\0b.txt",
            "/",
            "_.a.pdf",
            "_._.hidden",
            "__..__env",
        ] {
            let sanitized = sanitize_filename(raw);
            assert!(!sanitized.contains('/'));
            assert!(!sanitized.contains('\\'));
            assert!(!sanitized.starts_with('.'));
        }
    }
}
