//! Maps a build id to its place in the project hierarchy.
//!
//! Rules are evaluated in order and the first match wins. Reordering a rule set
//! changes classification results, so callers that build their own set must
//! keep the most specific markers first.

/// Catch-all segment for ids no rule recognises.
pub const OTHER: &str = "Other";

/// Separator between structural parts of a build id.
pub const SEGMENT_SEPARATOR: char = '_';

/// Predicate over the raw id string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Matches when the id contains any of the needles. Empty needles are ignored.
    ContainsAny(Vec<String>),
    /// Matches when the id starts with the given prefix.
    Prefix(String),
}

impl Matcher {
    pub fn contains(needle: impl Into<String>) -> Self {
        Matcher::ContainsAny(vec![needle.into()])
    }

    pub fn contains_any<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Matcher::ContainsAny(needles.into_iter().map(Into::into).collect())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Matcher::Prefix(prefix.into())
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Matcher::ContainsAny(needles) => needles
                .iter()
                .any(|needle| !needle.is_empty() && id.contains(needle.as_str())),
            Matcher::Prefix(prefix) => !prefix.is_empty() && id.starts_with(prefix.as_str()),
        }
    }
}

/// How the first path segment is derived from the id's first part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSegment {
    /// Always the same label, whatever the id says.
    Fixed(String),
    /// Replace the first occurrence of `from` with `to`. Parts without `from` are humanized.
    Relabel { from: String, to: String },
    /// The first part with word spacing inserted.
    Humanized,
}

impl RootSegment {
    pub fn fixed(label: impl Into<String>) -> Self {
        RootSegment::Fixed(label.into())
    }

    pub fn relabel(from: impl Into<String>, to: impl Into<String>) -> Self {
        RootSegment::Relabel {
            from: from.into(),
            to: to.into(),
        }
    }

    fn render(&self, first_part: &str) -> String {
        match self {
            RootSegment::Fixed(label) => label.trim().to_string(),
            RootSegment::Relabel { from, to } if !from.is_empty() && first_part.contains(from.as_str()) => {
                first_part.replacen(from.as_str(), to, 1).trim().to_string()
            }
            RootSegment::Relabel { .. } | RootSegment::Humanized => humanize(first_part),
        }
    }
}

/// Path construction for a matched id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplate {
    /// Root from the first id part followed by the next `depth` parts, humanized.
    /// Ids with fewer than `depth + 1` parts get `fallback` instead.
    Segmented {
        root: RootSegment,
        depth: usize,
        fallback: Vec<String>,
    },
    /// The same path for every matching id.
    Fixed(Vec<String>),
}

impl PathTemplate {
    pub fn segmented<I, S>(root: RootSegment, depth: usize, fallback: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathTemplate::Segmented {
            root,
            depth,
            fallback: fallback.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fixed<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathTemplate::Fixed(segments.into_iter().map(Into::into).collect())
    }

    fn build(&self, id: &str) -> Vec<String> {
        match self {
            PathTemplate::Fixed(segments) => segments.clone(),
            PathTemplate::Segmented {
                root,
                depth,
                fallback,
            } => {
                let parts: Vec<&str> = id.split(SEGMENT_SEPARATOR).collect();
                if parts.len() < depth + 1 {
                    return fallback.clone();
                }
                let mut path = Vec::with_capacity(depth + 1);
                path.push(root.render(parts[0]));
                path.extend(parts[1..=*depth].iter().map(|part| humanize(part)));
                if path.iter().any(String::is_empty) {
                    return fallback.clone();
                }
                path
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub matcher: Matcher,
    pub template: PathTemplate,
}

impl Rule {
    pub fn new(name: impl Into<String>, matcher: Matcher, template: PathTemplate) -> Self {
        Self {
            name: name.into(),
            matcher,
            template,
        }
    }
}

/// Ordered rule list; the first rule whose matcher accepts the id decides the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Never fails and never returns an empty path.
    pub fn classify(&self, id: &str) -> Vec<String> {
        if id.trim().is_empty() {
            return vec![OTHER.to_string()];
        }
        let path = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(id))
            .map(|rule| rule.template.build(id))
            .unwrap_or_default();
        let path: Vec<String> = path
            .into_iter()
            .map(|segment| segment.trim().to_string())
            .filter(|segment| !segment.is_empty())
            .collect();
        if path.is_empty() {
            vec![OTHER.to_string()]
        } else {
            path
        }
    }

    /// Name of the rule that would classify `id`, if any.
    pub fn matching_rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matcher.matches(id))
    }
}

/// Inserts a space wherever an uppercase letter follows a lowercase letter or a digit.
///
/// `ProductInstall` becomes `Product Install`, `GO2Portal` becomes `GO2 Portal`,
/// while runs of capitals such as `GObot` stay intact.
pub fn humanize(part: &str) -> String {
    let mut out = String::with_capacity(part.len() + 4);
    let mut prev: Option<char> = None;
    for ch in part.chars() {
        if ch.is_uppercase() {
            if let Some(p) = prev {
                if p.is_lowercase() || p.is_ascii_digit() {
                    out.push(' ');
                }
            }
        }
        out.push(ch);
        prev = Some(ch);
    }
    out.trim().to_string()
}

/// The CI server's own naming scheme, most specific marker first.
pub fn default_rules() -> Vec<Rule> {
    let web_services = || {
        PathTemplate::segmented(RootSegment::fixed("Web Services"), 1, ["Web Services"])
    };
    vec![
        Rule::new(
            "version-612",
            Matcher::contains("Go2Version612"),
            PathTemplate::segmented(
                RootSegment::relabel("Go2Version", "GO2 Version "),
                2,
                ["GO2 Version 612"],
            ),
        ),
        Rule::new(
            "version-new",
            Matcher::contains_any(["Go2VersionNew", "InstalleursNew"]),
            PathTemplate::segmented(
                RootSegment::relabel("Go2VersionNew", "GO2 Version New"),
                2,
                ["GO2 Version New"],
            ),
        ),
        Rule::new(
            "internal-libraries",
            Matcher::contains("InternalLibNew"),
            PathTemplate::fixed(["GO2 Version New", "Internal Libraries", "GO2 Dlls"]),
        ),
        Rule::new(
            "dental",
            Matcher::contains("GO2DentalNew"),
            PathTemplate::fixed(["GO2 Version New", "Product Install", "Dental"]),
        ),
        Rule::new(
            "go2cam",
            Matcher::contains("GO2camNew"),
            PathTemplate::fixed(["GO2 Version New", "Product Compil", "GO2cam"]),
        ),
        Rule::new(
            "web-services",
            Matcher::contains_any(["WebServices", "GO2Portal", "Web"]),
            web_services(),
        ),
        Rule::new(
            "legacy-portal",
            Matcher::contains_any(["Portal", "API"]),
            web_services(),
        ),
    ]
}
