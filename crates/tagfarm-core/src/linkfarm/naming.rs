use crate::catalog::Scene;
use std::path::Path;

/// Characters that are unsafe in file names on at least one platform.
const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Placeholder for names that sanitize to nothing.
pub const UNNAMED: &str = "unnamed";

/// Make `name` usable as a single path component.
///
/// Unsafe characters become `_`, leading and trailing dots and whitespace
/// are stripped, and an empty result becomes [`UNNAMED`]. The function is
/// idempotent.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        UNNAMED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Base name (without extension) for the link to `scene`.
///
/// Title when `use_title` is set and the title is non-empty, else the stem
/// of the first file's basename, else `scene_<id>`.
pub fn resolve_link_name(scene: &Scene, use_title: bool) -> String {
    if use_title {
        if let Some(title) = scene.title.as_deref().filter(|t| !t.is_empty()) {
            return sanitize_name(title);
        }
    }

    let stem = scene.primary_file().and_then(|file| {
        Path::new(&file.basename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
    });

    stem.unwrap_or_else(|| format!("scene_{}", scene.id.as_deref().unwrap_or("unknown")))
}

/// Extension of the first file's path including the leading dot, or empty.
pub fn resolve_extension(scene: &Scene) -> String {
    scene
        .source_path()
        .and_then(Path::extension)
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SceneFile;
    use std::path::PathBuf;

    fn scene(id: Option<&str>, title: Option<&str>, files: &[&str]) -> Scene {
        Scene {
            id: id.map(str::to_string),
            title: title.map(str::to_string),
            files: files
                .iter()
                .map(|p| {
                    let path = PathBuf::from(p);
                    let basename = path.file_name().unwrap().to_string_lossy().into_owned();
                    SceneFile { path, basename }
                })
                .collect(),
        }
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_name(r#"x\y*z?"q"<r>|"#), "x_y_z__q__r__");
    }

    #[test]
    fn test_sanitize_empty_inputs_become_placeholder() {
        assert_eq!(sanitize_name(""), "unnamed");
        assert_eq!(sanitize_name("..."), "unnamed");
        assert_eq!(sanitize_name(" . \t."), "unnamed");
    }

    #[test]
    fn test_sanitize_trims_dots_and_whitespace() {
        assert_eq!(sanitize_name("  .Hidden Gems.  "), "Hidden Gems");
        assert_eq!(sanitize_name("a..b"), "a..b");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "",
            "...",
            "a/b:c",
            " .x. ",
            "./..",
            "名前: テスト",
            "trailing/",
            "|||",
            "ok",
            " /. ",
            "\t|x|\n",
            "a . /b",
            ". :.",
            "x\u{a0}. ",
        ];
        for input in inputs {
            let once = sanitize_name(input);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_link_name_prefers_title() {
        let s = scene(Some("1"), Some("Beach: Day 1"), &["/media/clip01.mp4"]);
        assert_eq!(resolve_link_name(&s, true), "Beach_ Day 1");
        assert_eq!(resolve_link_name(&s, false), "clip01");
    }

    #[test]
    fn test_link_name_falls_back_to_file_stem() {
        let s = scene(Some("1"), Some(""), &["/media/archive.tar.gz"]);
        assert_eq!(resolve_link_name(&s, true), "archive.tar");

        let s = scene(Some("1"), None, &["/media/clip01.mp4"]);
        assert_eq!(resolve_link_name(&s, true), "clip01");
    }

    #[test]
    fn test_link_name_without_files_uses_id() {
        assert_eq!(resolve_link_name(&scene(Some("42"), None, &[]), true), "scene_42");
        assert_eq!(resolve_link_name(&scene(None, None, &[]), false), "scene_unknown");
    }

    #[test]
    fn test_extension_from_first_file() {
        assert_eq!(resolve_extension(&scene(None, None, &["/m/a.mkv", "/m/b.mp4"])), ".mkv");
        assert_eq!(resolve_extension(&scene(None, None, &["/m/noext"])), "");
        assert_eq!(resolve_extension(&scene(None, None, &[])), "");
    }
}
