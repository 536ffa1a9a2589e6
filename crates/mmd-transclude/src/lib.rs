//! Recursive transclusion (spec.md §4.10): `{{path}}` is replaced with the
//! contents of `path` (resolved relative to the including file's
//! directory), recursively, with cycle detection via an active-path
//! stack and a depth cap as the backstop. `{{TOC}}` is reserved for the
//! table-of-contents marker and is never treated as a transclusion
//! target. A failed include (missing file, I/O error) is logged and the
//! marker is left untouched rather than aborting the whole document
//! (spec.md §7: external-resource failure is logged, not rejected).

use std::path::{Path, PathBuf};

use mmd_config::Format;
use relative_path::RelativePath;

/// Interior of a `{{...}}` marker is only searched for within this many
/// bytes of the opening brace; past that it's almost certainly not a
/// transclusion marker at all (a literal `{{` in running text), and
/// scanning further would make pathological input quadratic.
const MAX_INTERIOR: usize = 1000;

/// Recursion bound matching the grammar's container nesting cap in
/// spirit: past this, stop expanding and leave markers as-is.
const MAX_DEPTH: u32 = 64;

#[derive(Debug, Default)]
pub struct TranscludeResult {
    pub output: String,
    /// Every file successfully read, in inclusion order, for callers that
    /// want to track the document's full dependency set.
    pub manifest: Vec<PathBuf>,
}

pub fn transclude(source: &str, base_dir: &Path, format: Format) -> TranscludeResult {
    let mut manifest = Vec::new();
    let mut active = Vec::new();
    let output = expand(source, base_dir, format, &mut active, &mut manifest, 0);
    TranscludeResult { output, manifest }
}

fn expand(
    source: &str,
    base_dir: &Path,
    format: Format,
    active: &mut Vec<PathBuf>,
    manifest: &mut Vec<PathBuf>,
    depth: u32,
) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let window = &after[..after.len().min(MAX_INTERIOR)];

        match window.find("}}") {
            Some(end) => {
                let inner = after[..end].trim();
                rest = &after[end + 2..];

                if inner.eq_ignore_ascii_case("toc") {
                    out.push_str("{{");
                    out.push_str(inner);
                    out.push_str("}}");
                } else if depth >= MAX_DEPTH {
                    tracing::warn!(path = inner, depth, "transclusion depth limit reached");
                    out.push_str("{{");
                    out.push_str(inner);
                    out.push_str("}}");
                } else {
                    out.push_str(&resolve_one(inner, base_dir, format, active, manifest, depth));
                }
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Drop a transcluded file's own UTF-8 BOM and leading metadata block before
/// it is spliced into the including document (spec.md §4.10 step 4): each
/// file is meaningful on its own, but only the outer document's metadata
/// should reach the merged result.
fn strip_bom_and_metadata(content: &str) -> &str {
    let rest = content.strip_prefix('\u{feff}').unwrap_or(content);

    if let Some(body) = rest.strip_prefix("---\n") {
        if let Some(close) = body.find("\n---\n") {
            return &body[close + "\n---\n".len()..];
        }
    }

    let mut consumed = 0;
    let mut in_block = false;
    let mut line_start = 0usize;
    while line_start < rest.len() {
        let line_end = match rest[line_start..].find('\n') {
            Some(idx) => line_start + idx + 1,
            None => rest.len(),
        };
        let line = rest[line_start..line_end].trim_end_matches('\n');

        let is_continuation = in_block && line.starts_with([' ', '\t']) && !line.trim().is_empty();
        if is_continuation || is_meta_line(line) {
            in_block = true;
            consumed = line_end;
        } else {
            break;
        }
        line_start = line_end;
    }
    rest[consumed..].trim_start_matches('\n')
}

/// `key: value` with no leading whitespace and no colon before the key
/// (spec.md §4.3 metadata line syntax).
fn is_meta_line(line: &str) -> bool {
    if line.starts_with([' ', '\t']) {
        return false;
    }
    match line.find(':') {
        Some(idx) if idx > 0 => !line[..idx].trim().is_empty(),
        _ => false,
    }
}

fn remap_wildcard(path: &str, format: Format) -> String {
    match path.strip_suffix(".*") {
        Some(stem) => format!("{stem}.{}", format.wildcard_extension()),
        None => path.to_string(),
    }
}

fn resolve_one(
    spec: &str,
    base_dir: &Path,
    format: Format,
    active: &mut Vec<PathBuf>,
    manifest: &mut Vec<PathBuf>,
    depth: u32,
) -> String {
    let remapped = remap_wildcard(spec, format);
    let full_path = RelativePath::new(&remapped).to_path(base_dir);

    if active.contains(&full_path) {
        tracing::warn!(path = %full_path.display(), "transclusion cycle detected");
        return format!("{{{{{spec}}}}}");
    }

    match std::fs::read_to_string(&full_path) {
        Ok(content) => {
            active.push(full_path.clone());
            manifest.push(full_path.clone());
            let child_base = full_path.parent().map(Path::to_path_buf).unwrap_or_else(|| base_dir.to_path_buf());
            let stripped = strip_bom_and_metadata(&content);
            let expanded = expand(stripped, &child_base, format, active, manifest, depth + 1);
            active.pop();
            expanded
        }
        Err(err) => {
            tracing::warn!(path = %full_path.display(), error = %err, "failed to read transcluded file");
            format!("{{{{{spec}}}}}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn inlines_a_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("part.md"), "included text").unwrap();
        let result = transclude("before {{part.md}} after", dir.path(), Format::Markdown);
        assert_eq!(result.output, "before included text after");
        assert_eq!(result.manifest.len(), 1);
    }

    #[test]
    fn toc_marker_is_never_transcluded() {
        let dir = tempdir().unwrap();
        let result = transclude("{{TOC}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "{{TOC}}");
        assert!(result.manifest.is_empty());
    }

    #[test]
    fn missing_file_leaves_marker_and_does_not_abort() {
        let dir = tempdir().unwrap();
        let result = transclude("see {{missing.md}} here", dir.path(), Format::Markdown);
        assert_eq!(result.output, "see {{missing.md}} here");
    }

    #[test]
    fn recursive_includes_expand_relative_to_their_own_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/child.md"), "leaf").unwrap();
        fs::write(dir.path().join("parent.md"), "{{sub/child.md}}").unwrap();
        let result = transclude("{{parent.md}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "leaf");
    }

    #[test]
    fn cycle_is_detected_and_marker_left_in_place() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "{{b.md}}").unwrap();
        fs::write(dir.path().join("b.md"), "{{a.md}}").unwrap();
        let result = transclude("{{a.md}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "{{a.md}}");
    }

    #[test]
    fn wildcard_extension_resolves_per_format() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("chapter.tex"), "latex body").unwrap();
        let result = transclude("{{chapter.*}}", dir.path(), Format::Latex);
        assert_eq!(result.output, "latex body");
    }

    #[test]
    fn included_files_own_metadata_block_is_stripped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("part.md"), "Title: Part One\nAuthor: Someone\n\nbody text\n").unwrap();
        let result = transclude("{{part.md}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "body text\n");
    }

    #[test]
    fn included_files_leading_bom_is_stripped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("part.md"), "\u{feff}leaf").unwrap();
        let result = transclude("{{part.md}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "leaf");
    }

    #[test]
    fn metadata_continuation_lines_are_stripped_too() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("part.md"), "Title: Part\n  continued\n\nbody\n").unwrap();
        let result = transclude("{{part.md}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "body\n");
    }

    #[test]
    fn a_plain_included_file_is_untouched() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("part.md"), "just some text\n").unwrap();
        let result = transclude("{{part.md}}", dir.path(), Format::Markdown);
        assert_eq!(result.output, "just some text\n");
    }
}
