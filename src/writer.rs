//! Writer inference from output file extensions
//!
//! Mirrors pandoc's `Text.Pandoc.App.FormatHeuristics`. An unrecognized
//! extension yields `None`; callers leave the writer unset in that case.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Extension (lowercase, with leading dot) to writer
const EXTENSION_WRITERS: &[(&str, &str)] = &[
    (".adoc", "asciidoc"),
    (".asciidoc", "asciidoc"),
    (".context", "context"),
    (".ctx", "context"),
    (".db", "docbook"),
    (".docx", "docx"),
    (".dokuwiki", "dokuwiki"),
    (".epub", "epub"),
    (".fb2", "fb2"),
    (".htm", "html"),
    (".html", "html"),
    (".icml", "icml"),
    (".json", "json"),
    (".latex", "latex"),
    (".lhs", "markdown+lhs"),
    (".ltx", "latex"),
    (".markdown", "markdown"),
    (".md", "markdown"),
    (".ms", "ms"),
    (".muse", "muse"),
    (".native", "native"),
    (".odt", "odt"),
    (".opml", "opml"),
    (".org", "org"),
    (".pdf", "pdf"),
    (".pptx", "pptx"),
    (".roff", "ms"),
    (".rst", "rst"),
    (".rtf", "rtf"),
    (".s5", "s5"),
    (".t2t", "t2t"),
    (".tei", "tei"),
    (".tex", "latex"),
    (".texi", "texinfo"),
    (".texinfo", "texinfo"),
    (".text", "markdown"),
    (".textile", "textile"),
    (".txt", "markdown"),
    (".wiki", "mediawiki"),
    (".xhtml", "html"),
    (".ipynb", "ipynb"),
    (".bib", "biblatex"),
];

/// Man page section suffixes such as `.1` or `.3`
static MAN_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.[1-9]{1,4}$").expect("man section pattern is valid"));

/// Infer the writer for a file extension such as `.pdf` (the dot is optional)
pub fn infer_writer(extension: &str) -> Option<&'static str> {
    let lower = extension.trim().to_lowercase();
    if lower.is_empty() || lower == "." {
        return None;
    }
    let ext = if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    };

    if let Some(&(_, writer)) = EXTENSION_WRITERS.iter().find(|(e, _)| *e == ext) {
        return Some(writer);
    }
    if MAN_SECTION.is_match(&ext) {
        return Some("man");
    }
    None
}

/// Infer the writer for a full output path
///
/// Recognizes the compound `.tei.xml` suffix before falling back to the final
/// extension.
pub fn infer_writer_for_path(path: impl AsRef<Path>) -> Option<&'static str> {
    let path = path.as_ref();
    let file_name = path.file_name()?.to_string_lossy().to_lowercase();
    if file_name.ends_with(".tei.xml") {
        return Some("tei");
    }
    let extension = path.extension()?.to_string_lossy();
    infer_writer(&extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_extensions() {
        assert_eq!(infer_writer(".pdf"), Some("pdf"));
        assert_eq!(infer_writer(".docx"), Some("docx"));
        assert_eq!(infer_writer(".html"), Some("html"));
        assert_eq!(infer_writer(".pptx"), Some("pptx"));
        assert_eq!(infer_writer(".tex"), Some("latex"));
        assert_eq!(infer_writer(".md"), Some("markdown"));
    }

    #[test]
    fn test_case_insensitive_and_dotless() {
        assert_eq!(infer_writer(".PDF"), Some("pdf"));
        assert_eq!(infer_writer("Docx"), Some("docx"));
    }

    #[test]
    fn test_unknown_extension_is_unset() {
        assert_eq!(infer_writer(".potato"), None);
        assert_eq!(infer_writer(""), None);
        assert_eq!(infer_writer("."), None);
    }

    #[test]
    fn test_man_sections() {
        assert_eq!(infer_writer(".1"), Some("man"));
        assert_eq!(infer_writer(".8"), Some("man"));
        assert_eq!(infer_writer(".0"), None);
        assert_eq!(infer_writer(".1a"), None);
    }

    #[test]
    fn test_path_inference() {
        assert_eq!(infer_writer_for_path("/test/path/to/file.pdf"), Some("pdf"));
        assert_eq!(infer_writer_for_path("out/corpus.TEI.xml"), Some("tei"));
        assert_eq!(infer_writer_for_path("ls.1"), Some("man"));
        assert_eq!(infer_writer_for_path("/test/path/to/file.potato"), None);
        assert_eq!(infer_writer_for_path("README"), None);
    }
}
