//! LaTeX support: document framing and text escaping
//!
//! The header and footer wrap every typeset rendering of a run into one
//! compilable document, even when no statement was rendered at all.

/// Preamble opening the document; loads the packages the forest and tikz
/// dumpers rely on
pub fn header() -> String {
    [
        "\\documentclass{article}",
        "\\usepackage[T1]{fontenc}",
        "\\usepackage[margin=1.5cm]{geometry}",
        "\\usepackage{forest}",
        "\\usepackage{tikz}",
        "\\begin{document}",
        "",
    ]
    .join("\n")
}

pub fn footer() -> String {
    "\\end{document}\n".to_string()
}

/// Escape characters with a special meaning in LaTeX text
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '^' => escaped.push_str("\\textasciicircum{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            '<' => escaped.push_str("\\textless{}"),
            '>' => escaped.push_str("\\textgreater{}"),
            '|' => escaped.push_str("\\textbar{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_opens_and_footer_closes_document() {
        assert!(header().contains("\\begin{document}"));
        assert!(header().ends_with('\n'));
        assert_eq!(footer(), "\\end{document}\n");
    }

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape("a_b"), "a\\_b");
        assert_eq!(escape("50%"), "50\\%");
        assert_eq!(escape("a <> b"), "a \\textless{}\\textgreater{} b");
        assert_eq!(escape("{x}"), "\\{x\\}");
        assert_eq!(escape("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape("plain"), "plain");
    }
}
