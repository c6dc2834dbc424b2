//! Syntax highlighting for the code column.
//!
//! The segmenter hands every block's raw code to a [`Highlighter`] together
//! with a language tag and gets HTML back. Highlighters are tolerant by
//! contract: any input, including half a string literal or a language nobody
//! registered, produces escaped markup and never an error.
//!
//! [`TokenHighlighter`] is a small single-pass lexer that knows a handful of
//! token classes per language:
//!
//! | Class | CSS class |
//! |-------|-----------|
//! | keyword | `hl-keyword` |
//! | string literal | `hl-string` |
//! | number | `hl-number` |
//! | comment | `hl-comment` |
//! | shell variable | `hl-variable` |
//!
//! Languages it doesn't know are escaped without any spans.

use maud::html;

/// Turns source text into HTML markup for a given language tag.
pub trait Highlighter {
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// HTML-escape text using maud's escaping rules.
pub fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Escapes only; no token markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> String {
        escape(code)
    }
}

/// Lexical rules for one language family.
struct Grammar {
    keywords: &'static [&'static str],
    line_comment: &'static str,
    block_comment: Option<(&'static str, &'static str)>,
    /// Quote characters whose literals end at the line break.
    quotes: &'static [char],
    /// Quote characters whose literals may span lines.
    multiline_quotes: &'static [char],
    /// `$name` and `${...}` expansions.
    variables: bool,
}

const JAVASCRIPT: Grammar = Grammar {
    keywords: &[
        "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
        "default", "delete", "do", "else", "export", "extends", "false", "finally", "for",
        "function", "if", "import", "in", "instanceof", "let", "new", "null", "of", "return",
        "static", "super", "switch", "this", "throw", "true", "try", "typeof", "undefined",
        "var", "void", "while", "with", "yield", "from",
    ],
    line_comment: "//",
    block_comment: Some(("/*", "*/")),
    quotes: &['\'', '"'],
    multiline_quotes: &['`'],
    variables: false,
};

const SHELL: Grammar = Grammar {
    keywords: &[
        "if", "then", "else", "elif", "fi", "for", "while", "until", "do", "done", "case",
        "esac", "in", "function", "return", "export", "local", "echo", "cd", "exit", "set",
    ],
    line_comment: "#",
    block_comment: None,
    quotes: &[],
    multiline_quotes: &['\'', '"'],
    variables: true,
};

fn grammar_for(language: &str) -> Option<&'static Grammar> {
    match language.to_ascii_lowercase().as_str() {
        "javascript" | "js" | "node" | "typescript" | "ts" => Some(&JAVASCRIPT),
        "bash" | "sh" | "shell" | "console" => Some(&SHELL),
        _ => None,
    }
}

/// Keyword/string/number/comment highlighter for JavaScript and shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenHighlighter;

impl Highlighter for TokenHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        match grammar_for(language) {
            Some(grammar) => Lexer::new(code, grammar).run(),
            None => escape(code),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    grammar: &'static Grammar,
    out: String,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, grammar: &'static Grammar) -> Self {
        Self {
            src,
            pos: 0,
            grammar,
            out: String::with_capacity(src.len() * 2),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn prev(&self) -> Option<char> {
        self.src[..self.pos].chars().next_back()
    }

    fn span(&mut self, class: &str, len: usize) {
        let text = &self.src[self.pos..self.pos + len];
        self.out.push_str(&format!(r#"<span class="{class}">{}</span>"#, escape(text)));
        self.pos += len;
    }

    fn run(mut self) -> String {
        while let Some(c) = self.peek() {
            let rest = self.rest();
            if self.at_line_comment() {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.span("hl-comment", len);
            } else if let Some((open, close)) = self.grammar.block_comment
                && rest.starts_with(open)
            {
                let len = rest[open.len()..]
                    .find(close)
                    .map(|i| open.len() + i + close.len())
                    .unwrap_or(rest.len());
                self.span("hl-comment", len);
            } else if self.grammar.quotes.contains(&c) {
                let len = string_len(rest, c, false);
                self.span("hl-string", len);
            } else if self.grammar.multiline_quotes.contains(&c) {
                let len = string_len(rest, c, true);
                self.span("hl-string", len);
            } else if self.grammar.variables && c == '$' {
                let len = variable_len(rest);
                if len > 1 {
                    self.span("hl-variable", len);
                } else {
                    self.plain(c);
                }
            } else if c.is_ascii_digit() && !self.prev().is_some_and(is_ident_continue) {
                let len = rest
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'))
                    .unwrap_or(rest.len());
                self.span("hl-number", len);
            } else if is_ident_start(c) {
                let len = rest
                    .find(|ch: char| !is_ident_continue(ch))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                let keyword_position = !self.prev().is_some_and(|p| p == '.' || p == '-');
                if keyword_position && self.grammar.keywords.contains(&word) {
                    self.span("hl-keyword", len);
                } else {
                    self.out.push_str(&escape(word));
                    self.pos += len;
                }
            } else {
                self.plain(c);
            }
        }
        self.out
    }

    fn plain(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.out.push_str(&escape(c.encode_utf8(&mut buf)));
        self.pos += c.len_utf8();
    }

    fn at_line_comment(&self) -> bool {
        let marker = self.grammar.line_comment;
        if !self.rest().starts_with(marker) {
            return false;
        }
        // `#` only opens a shell comment at a word boundary (`$#`, `a#b` are not comments).
        if marker == "#" {
            return self.prev().is_none_or(char::is_whitespace);
        }
        true
    }
}

/// Byte length of a string literal starting at `rest[0] == quote`.
///
/// Unterminated literals run to the end of the line (or the input when
/// `multiline`), which keeps the rest of the block readable.
fn string_len(rest: &str, quote: char, multiline: bool) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\n' if !multiline => return i,
            c if c == quote => return i + c.len_utf8(),
            _ => {}
        }
    }
    rest.len()
}

/// Byte length of `$name`, `${...}`, or a special parameter like `$1` / `$@`.
fn variable_len(rest: &str) -> usize {
    let after = &rest[1..];
    if after.starts_with('{') {
        return after.find('}').map(|i| i + 2).unwrap_or(rest.len());
    }
    match after.chars().next() {
        Some(c) if c.is_ascii_digit() || "@*#?$!-".contains(c) => 1 + c.len_utf8(),
        Some(c) if is_ident_start(c) => {
            1 + after
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                .unwrap_or(after.len())
        }
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hl(code: &str, lang: &str) -> String {
        TokenHighlighter.highlight(code, lang)
    }

    #[test]
    fn plain_highlighter_escapes() {
        assert_eq!(
            PlainHighlighter.highlight("a < b && c", "javascript"),
            "a &lt; b &amp;&amp; c"
        );
    }

    #[test]
    fn empty_input_is_empty_markup() {
        assert_eq!(hl("", "javascript"), "");
        assert_eq!(hl("", "bash"), "");
        assert_eq!(hl("", "cobol"), "");
    }

    #[test]
    fn javascript_keywords_and_numbers() {
        let out = hl("const x = 1;\n", "javascript");
        assert_eq!(
            out,
            r#"<span class="hl-keyword">const</span> x = <span class="hl-number">1</span>;
"#
        );
    }

    #[test]
    fn property_named_like_keyword_is_plain() {
        let out = hl("obj.default", "javascript");
        assert!(!out.contains("hl-keyword"));
    }

    #[test]
    fn identifiers_containing_digits_are_not_numbers() {
        let out = hl("let x2 = y1;", "javascript");
        assert!(!out.contains("hl-number"));
    }

    #[test]
    fn strings_are_escaped_inside_spans() {
        let out = hl(r#"console.log("<b>");"#, "javascript");
        assert!(out.contains(r#"<span class="hl-string">&quot;&lt;b&gt;&quot;</span>"#));
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let out = hl(r#"'it\'s' + 1"#, "javascript");
        assert!(out.contains(r#"<span class="hl-string">'it\'s'</span>"#));
        assert!(out.contains("hl-number"));
    }

    #[test]
    fn unterminated_string_is_tolerated() {
        let out = hl("const s = 'oops\nlet y = 2;", "javascript");
        assert!(out.contains(r#"<span class="hl-string">'oops</span>"#));
        assert!(out.contains(r#"<span class="hl-keyword">let</span>"#));
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        let out = hl("x /* never closed", "javascript");
        assert!(out.ends_with(r#"<span class="hl-comment">/* never closed</span>"#));
    }

    #[test]
    fn template_literal_spans_lines() {
        let out = hl("`a\nb`", "javascript");
        assert_eq!(out, "<span class=\"hl-string\">`a\nb`</span>");
    }

    #[test]
    fn shell_comment_and_variables() {
        let out = hl("echo $HOME # home\n", "bash");
        assert!(out.contains(r#"<span class="hl-keyword">echo</span>"#));
        assert!(out.contains(r#"<span class="hl-variable">$HOME</span>"#));
        assert!(out.contains(r#"<span class="hl-comment"># home</span>"#));
    }

    #[test]
    fn shell_hash_inside_word_is_not_comment() {
        let out = hl("echo $#", "bash");
        assert!(!out.contains("hl-comment"));
        assert!(out.contains(r#"<span class="hl-variable">$#</span>"#));
    }

    #[test]
    fn shell_braced_variable() {
        let out = hl("${NAME:-x}", "sh");
        assert_eq!(out, r#"<span class="hl-variable">${NAME:-x}</span>"#);
    }

    #[test]
    fn unknown_language_is_only_escaped() {
        assert_eq!(hl("if x < 1", "cobol"), "if x &lt; 1");
    }

    #[test]
    fn non_ascii_text_survives() {
        let out = hl("const s = 'héllo'; // ✓", "javascript");
        assert!(out.contains("héllo"));
        assert!(out.contains("✓"));
    }

    #[test]
    fn highlighting_is_deterministic() {
        let code = "for (let i = 0; i < 3; i++) { console.log(`${i}`); }\n";
        assert_eq!(hl(code, "js"), hl(code, "js"));
    }
}
