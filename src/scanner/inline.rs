//! Inline transforms applied to every source line.
//!
//! The transforms are an ordered table of `(pattern, rewrite)` rules. Order
//! is part of the contract: escaping runs before emphasis so that the
//! emphasis patterns never see half-escaped text, bold runs before italic so
//! a doubled delimiter is not read as two italics, and links run before
//! images and citations so bracketed link text is gone by then. A rule whose
//! pattern does not match leaves the line untouched, so prose with none of
//! the patterns comes back unchanged.

use regex::{Captures, Regex};

/// Facts about the surrounding structure that some rules depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContext {
    /// Inside a tabular frame (ampersands are column separators)
    pub in_table: bool,
    /// Inside a `[bv]`/`[ev]` region
    pub leave_alone: bool,
}

/// Side effects discovered while transforming a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineEffects {
    /// Citation keys in order of appearance
    pub citations: Vec<String>,
    /// An image asked for `align=center`
    pub center_image: bool,
}

/// Transformed line plus its side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineOutcome {
    /// The rewritten line
    pub line: String,
    /// Side effects for the scanner
    pub effects: InlineEffects,
}

type RuleFn = fn(&Regex, &str, &InlineContext, &mut InlineEffects) -> String;

enum Rewrite {
    /// Regex replacement template applied to every match
    Template(&'static str),
    /// Custom rewrite of the whole line
    Function(RuleFn),
}

struct InlineRule {
    name: &'static str,
    pattern: Regex,
    /// The rule is skipped when this also matches the line.
    unless: Option<Regex>,
    rewrite: Rewrite,
}

impl InlineRule {
    fn new(name: &'static str, pattern: &str, rewrite: Rewrite) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("inline rule pattern is valid"),
            unless: None,
            rewrite,
        }
    }

    fn unless(mut self, pattern: &str) -> Self {
        self.unless = Some(Regex::new(pattern).expect("inline guard pattern is valid"));
        self
    }
}

/// The ordered inline rule table.
pub struct InlineEngine {
    rules: Vec<InlineRule>,
}

impl InlineEngine {
    /// Build the rule table for the given emphasis delimiter.
    pub fn new(emphasis: char) -> Self {
        let d = regex::escape(&emphasis.to_string());
        let bold = format!(r"{d}{d}([^{d}]+){d}{d}", d = d);
        let italic = format!(r"{d}([^{d}]+){d}", d = d);

        let rules = vec![
            // 1. smart punctuation
            InlineRule::new("ellipsis", r"\.\.\.", Rewrite::Template(r"\ldots{}")),
            InlineRule::new("open-quote", r#"(^|[\s(])""#, Rewrite::Template("${1}``")),
            InlineRule::new("close-quote", r#"([^"])""#, Rewrite::Template("${1}''")),
            // 2. percent after a digit or question mark
            InlineRule::new("percent", r"(\d|\?)%", Rewrite::Template(r"${1}\%")),
            // 3. in-text superscript
            InlineRule::new(
                "superscript",
                r"\^([^\^]+)\^",
                Rewrite::Template(r"\textsuperscript{${1}}"),
            ),
            // 4. dollar amounts
            InlineRule::new("dollar", r"(^|[^\\])\$(\d)", Rewrite::Template(r"${1}\$$${2}")),
            // 5. a/b between spaces
            InlineRule::new(
                "fraction",
                r" (\d+)/(\d+) ",
                Rewrite::Template(r" $$\frac{${1}}{${2}}$$ "),
            ),
            // 6. ampersands, unless the line carries a URI
            InlineRule::new("ampersand", "&", Rewrite::Function(escape_ampersands))
                .unless(r"(?i)\b(?:https?|ftp)://|\bwww\."),
            // 7. emphasis, bold first
            InlineRule::new("bold", &bold, Rewrite::Template(r"\textbf{${1}}")),
            InlineRule::new("italic", &italic, Rewrite::Template(r"\textit{${1}}")),
            // 8. links
            InlineRule::new(
                "link",
                r"(^|[^!])\[([^\]]+)\]\(((?:[A-Za-z][A-Za-z0-9+.\-]*:|www\d{0,3}\.)[^\s()<>]+)\)",
                Rewrite::Template(r"${1}\href{${3}}{${2}}"),
            ),
            // 9. images
            InlineRule::new(
                "image",
                r"!\[([^\]]*)\]\(([^)\s]+)\)(?:\{([^}]*)\})?",
                Rewrite::Function(rewrite_images),
            ),
            // 10. citations, parenthetical then in-text
            InlineRule::new(
                "cite-parenthetical",
                r"\[([^\[\]]*@[^\[\]]*)\]",
                Rewrite::Function(rewrite_parenthetical_citations),
            ),
            InlineRule::new(
                "cite-in-text",
                r"(^|[^\w\\])@(\w+(?:[:.\-]\w+)*)(?: ?\[([^\]]+)\])?",
                Rewrite::Function(rewrite_in_text_citations),
            ),
        ];

        Self { rules }
    }

    /// Rule names in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Apply every rule, in order, to one line.
    pub fn apply(&self, line: &str, ctx: &InlineContext) -> InlineOutcome {
        let mut effects = InlineEffects::default();
        let mut text = line.to_string();

        for rule in &self.rules {
            if !rule.pattern.is_match(&text) {
                continue;
            }
            if rule.unless.as_ref().is_some_and(|guard| guard.is_match(&text)) {
                continue;
            }
            text = match &rule.rewrite {
                Rewrite::Template(template) => rule.pattern.replace_all(&text, *template).into_owned(),
                Rewrite::Function(f) => f(&rule.pattern, &text, ctx, &mut effects),
            };
        }

        InlineOutcome { line: text, effects }
    }

    /// Apply the rules and return only the line.
    pub fn transform(&self, line: &str, ctx: &InlineContext) -> String {
        self.apply(line, ctx).line
    }
}

impl Default for InlineEngine {
    fn default() -> Self {
        Self::new('*')
    }
}

fn escape_ampersands(_: &Regex, line: &str, ctx: &InlineContext, _: &mut InlineEffects) -> String {
    if ctx.in_table || ctx.leave_alone {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 4);
    let mut prev = None;
    for c in line.chars() {
        if c == '&' && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn rewrite_images(re: &Regex, line: &str, _: &InlineContext, effects: &mut InlineEffects) -> String {
    re.replace_all(line, |caps: &Captures| {
        let path = caps.get(2).map_or("", |m| m.as_str());
        let path = match path.strip_suffix(".svg") {
            Some(stem) => format!("{}.pdf", stem),
            None => path.to_string(),
        };

        let mut options = Vec::new();
        if let Some(args) = caps.get(3) {
            for pair in args.as_str().split([',', ' ']).filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some(("align", "center")) => effects.center_image = true,
                    Some(_) => options.push(pair.to_string()),
                    None => log::debug!("ignoring image argument '{}'", pair),
                }
            }
        }

        if options.is_empty() {
            format!("\n\\includegraphics{{{}}}\n", path)
        } else {
            format!("\n\\includegraphics[{}]{{{}}}\n", options.join(","), path)
        }
    })
    .into_owned()
}

fn rewrite_parenthetical_citations(
    re: &Regex,
    line: &str,
    _: &InlineContext,
    effects: &mut InlineEffects,
) -> String {
    re.replace_all(line, |caps: &Captures| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let inner = caps.get(1).map_or("", |m| m.as_str());
        let keys = scan_citation_keys(inner);
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return whole.to_string();
        };

        let prefix = inner[..first.start].trim().trim_end_matches([';', ',']).trim();
        let suffix = inner[last.end..].trim_start_matches([';', ',', ' ']).trim();
        let names: Vec<&str> = keys.iter().map(|k| k.key.as_str()).collect();
        effects.citations.extend(names.iter().map(|k| k.to_string()));

        match (prefix.is_empty(), suffix.is_empty()) {
            (true, true) => format!("\\citep{{{}}}", names.join(",")),
            (true, false) => format!("\\citep[{}]{{{}}}", suffix, names.join(",")),
            _ => format!("\\citep[{}][{}]{{{}}}", prefix, suffix, names.join(",")),
        }
    })
    .into_owned()
}

fn rewrite_in_text_citations(
    re: &Regex,
    line: &str,
    _: &InlineContext,
    effects: &mut InlineEffects,
) -> String {
    re.replace_all(line, |caps: &Captures| {
        let lead = caps.get(1).map_or("", |m| m.as_str());
        let key = caps.get(2).map_or("", |m| m.as_str());
        effects.citations.push(key.to_string());
        match caps.get(3) {
            Some(suffix) => format!("{}\\citet[{}]{{{}}}", lead, suffix.as_str(), key),
            None => format!("{}\\citet{{{}}}", lead, key),
        }
    })
    .into_owned()
}

/// A citation key and its byte span (including the `@`).
struct CitationKey {
    key: String,
    start: usize,
    end: usize,
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')
}

/// `@key` tokens whose `@` does not follow a word character.
fn scan_citation_keys(text: &str) -> Vec<CitationKey> {
    let mut keys = Vec::new();
    let mut prev: Option<char> = None;

    for (start, c) in text.char_indices() {
        if c == '@' && !prev.is_some_and(|p| p.is_alphanumeric() || p == '\\') {
            let rest = &text[start + 1..];
            let len: usize = rest.chars().take_while(|c| is_key_char(*c)).map(char::len_utf8).sum();
            let key = rest[..len].trim_end_matches([':', '.', '-']);
            if !key.is_empty() {
                keys.push(CitationKey {
                    key: key.to_string(),
                    start,
                    end: start + 1 + key.len(),
                });
            }
        }
        prev = Some(c);
    }
    keys
}
