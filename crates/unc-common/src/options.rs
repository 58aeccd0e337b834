//! The option subset the core consults (§6, §9 "Global options and per-file
//! statistics"). Plain config record, not a singleton: constructed by the
//! embedding application and threaded explicitly into `tokenize`/
//! `run_frame_pass`/`classify`.

use crate::lang::LangFlags;

/// Target end-of-line style, falling back to the input's majority line
/// ending when `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewlineStyle {
    #[default]
    Auto,
    Lf,
    Crlf,
    Cr,
}

/// Severity to attach to a specific, narrowly-scoped lexer diagnostic:
/// tabs found inside a verbatim string literal when tab-replacement was
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarnLevel {
    Ignore,
    #[default]
    Warn,
    Fatal,
}

/// The marker text (or regex pattern) that toggles `IGNORED` pass-through
/// mode inside a comment.
#[derive(Debug, Clone)]
pub struct CommentMarker {
    pub enable: String,
    pub disable: String,
    pub as_regex: bool,
}

impl Default for CommentMarker {
    fn default() -> Self {
        Self {
            enable: "*INDENT-ON*".to_string(),
            disable: "*INDENT-OFF*".to_string(),
            as_regex: false,
        }
    }
}

/// The option subset this crate consults, per §6's table. Everything else
/// uncrustify's real option set covers (alignment, indentation width,
/// brace style, …) belongs to the out-of-scope printer/alignment passes.
#[derive(Debug, Clone)]
pub struct Options {
    pub language: LangFlags,
    pub comment_marker: CommentMarker,
    /// `pp_ignore_define_body`: tokens inside a `#define` body are passed
    /// through as `PP_IGNORE` (here: left `Ignored`) without classification.
    pub pp_ignore_define_body: bool,
    pub string_escape_char: char,
    pub string_escape_char2: Option<char>,
    pub string_replace_tab_chars: bool,
    pub input_tab_size: u32,
    pub newlines: NewlineStyle,
    pub disable_processing_nl_cont: bool,
    pub warn_level_tabs_found_in_verbatim_string_literals: WarnLevel,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            language: LangFlags::CPP,
            comment_marker: CommentMarker::default(),
            pp_ignore_define_body: false,
            string_escape_char: '\\',
            string_escape_char2: None,
            string_replace_tab_chars: false,
            input_tab_size: 8,
            newlines: NewlineStyle::Auto,
            disable_processing_nl_cont: false,
            warn_level_tabs_found_in_verbatim_string_literals: WarnLevel::Warn,
        }
    }
}

impl Options {
    pub fn for_language(language: LangFlags) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_marker_matches_original_spelling() {
        let marker = CommentMarker::default();
        assert_eq!(marker.enable, "*INDENT-ON*");
        assert_eq!(marker.disable, "*INDENT-OFF*");
        assert!(!marker.as_regex);
    }

    #[test]
    fn for_language_overrides_only_language() {
        let opts = Options::for_language(LangFlags::JAVA);
        assert_eq!(opts.language, LangFlags::JAVA);
        assert_eq!(opts.input_tab_size, 8);
    }
}
