// Path pattern compilation, matching, scoring, and variable extraction

use smallvec::SmallVec;

/// An extracted path variable. `None` marks an optional segment the request
/// path did not supply.
pub type RouteVar = Option<String>;

/// Per-call segment list for the matching hot path. Eight segments covers
/// typical route depth without heap allocation.
type Parts<'a> = SmallVec<[&'a str; 8]>;

fn split(path: &str) -> Parts<'_> {
    // Empty segments from leading/trailing/double slashes are kept and
    // compared as literal empty strings.
    path.split('/').collect()
}

/// One `/`-delimited unit of a compiled route template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Matched by exact, case-sensitive string equality.
    Literal(String),
    /// `{name}`: accepts any value, which must be present in the path.
    Required(String),
    /// `{?name}`: accepts any value, or no value at all.
    Optional(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix("{?") {
            Segment::Optional(name.trim_end_matches('}').to_string())
        } else if let Some(name) = raw.strip_prefix('{') {
            Segment::Required(name.trim_end_matches('}').to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    /// The variable name, or `None` for literal segments.
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Required(name) | Segment::Optional(name) => Some(name),
        }
    }

    fn is_optional(&self) -> bool {
        matches!(self, Segment::Optional(_))
    }

    fn is_variable(&self) -> bool {
        !matches!(self, Segment::Literal(_))
    }
}

/// Compiled representation of a route's path template.
///
/// Segments are derived once at construction and immutable thereafter.
/// A pattern never matches a path with more segments than it has; shorter
/// paths are only accepted through trailing optional segments.
#[derive(Clone, Debug)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(template: &str) -> Self {
        let segments = template.split('/').map(Segment::parse).collect();
        Self {
            raw: template.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Test whether `path` satisfies this pattern.
    pub fn matches(&self, path: &str) -> bool {
        if self.raw == path {
            return true;
        }

        let parts = split(path);
        if parts.len() > self.segments.len() {
            return false;
        }

        for (index, segment) in self.segments.iter().enumerate() {
            match parts.get(index) {
                // Past the end of the path: only optional segments survive.
                None => {
                    if !segment.is_optional() {
                        return false;
                    }
                }
                Some(part) => {
                    if let Segment::Literal(expected) = segment {
                        if expected.as_str() != *part {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    /// Specificity score of `path` against this pattern. Zero means the path
    /// does not match at all.
    ///
    /// A literal segment equal to its path segment scores 2, a variable
    /// segment with a value present scores 1, and an optional segment past
    /// the end of the path scores 0 without failing the scan. Any literal
    /// mismatch or missing required segment zeroes the whole score.
    pub fn score(&self, path: &str) -> u32 {
        let parts = split(path);
        if parts.len() > self.segments.len() {
            return 0;
        }

        let mut score = 0;
        for (index, segment) in self.segments.iter().enumerate() {
            match parts.get(index) {
                None => {
                    if !segment.is_optional() {
                        return 0;
                    }
                }
                Some(part) => match segment {
                    Segment::Literal(expected) if expected.as_str() == *part => score += 2,
                    Segment::Literal(_) => return 0,
                    Segment::Required(_) | Segment::Optional(_) => score += 1,
                },
            }
        }

        score
    }

    /// Extract variable values from `path`, in left-to-right pattern order.
    ///
    /// Literal segments contribute nothing. Variable segments past the end
    /// of the path yield `None`. No decoding or type coercion is performed.
    pub fn vars(&self, path: &str) -> Vec<RouteVar> {
        let parts = split(path);
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| segment.is_variable())
            .map(|(index, _)| parts.get(index).map(|part| part.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segment_kinds() {
        let pattern = Pattern::parse("/home/{board}/{?area}");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("".to_string()),
                Segment::Literal("home".to_string()),
                Segment::Required("board".to_string()),
                Segment::Optional("area".to_string()),
            ]
        );
    }

    #[test]
    fn test_segment_names() {
        let pattern = Pattern::parse("/home/{board}/{?area}");
        let names: Vec<Option<&str>> = pattern.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec![None, None, Some("board"), Some("area")]);
    }

    #[test]
    fn test_static_match() {
        let pattern = Pattern::parse("/home");
        assert!(pattern.matches("/home"));
        assert!(!pattern.matches("/hom"));
        assert!(!pattern.matches("/home/dash"));
    }

    #[test]
    fn test_required_variable_match() {
        let pattern = Pattern::parse("/home/{board}");
        assert!(pattern.matches("/home/dash"));
        assert!(!pattern.matches("/home"));
        assert!(!pattern.matches("/home/dash/something"));
    }

    #[test]
    fn test_optional_variable_match() {
        let pattern = Pattern::parse("/home/{?board}");
        assert!(pattern.matches("/home/dash"));
        assert!(pattern.matches("/home"));
        assert!(!pattern.matches("/home/dash/something"));
    }

    #[test]
    fn test_literal_comparison_is_case_sensitive() {
        let pattern = Pattern::parse("/Home");
        assert!(pattern.matches("/Home"));
        assert!(!pattern.matches("/home"));
    }

    #[test]
    fn test_longer_path_never_matches() {
        let pattern = Pattern::parse("/a/{b}/{?c}");
        assert!(!pattern.matches("/a/x/y/z"));
        assert_eq!(pattern.score("/a/x/y/z"), 0);
    }

    #[test]
    fn test_multiple_trailing_optionals() {
        let pattern = Pattern::parse("/files/{?dir}/{?name}");
        assert!(pattern.matches("/files"));
        assert!(pattern.matches("/files/docs"));
        assert!(pattern.matches("/files/docs/readme"));
        // Each absent optional contributes 0 without failing the scan.
        assert_eq!(pattern.score("/files"), 4);
        assert_eq!(pattern.score("/files/docs"), 5);
        assert_eq!(pattern.score("/files/docs/readme"), 6);
    }

    #[test]
    fn test_scores() {
        let pattern = Pattern::parse("/home/{board}/{?area}");
        assert_eq!(pattern.score("/home"), 0);
        assert_eq!(pattern.score("/home/dash"), 5);
        assert_eq!(pattern.score("/home/dash/chat"), 6);
        assert_eq!(pattern.score("/home/dash/chat/users"), 0);
    }

    #[test]
    fn test_literal_outranks_variable() {
        let variable = Pattern::parse("/home/{board}/{?area}");
        let literal = Pattern::parse("/home/dash/{board}/{?area}");
        let path = "/home/dash/status";
        assert!(literal.score(path) > variable.score(path));
    }

    #[test]
    fn test_literal_mismatch_zeroes_score() {
        let pattern = Pattern::parse("/home/dash/{board}");
        assert_eq!(pattern.score("/home/sales/status"), 0);
    }

    #[test]
    fn test_vars_extraction() {
        let pattern = Pattern::parse("/home/{board}/{?area}");
        assert_eq!(
            pattern.vars("/home/dash"),
            vec![Some("dash".to_string()), None]
        );
        assert_eq!(
            pattern.vars("/home/dash/chat"),
            vec![Some("dash".to_string()), Some("chat".to_string())]
        );
    }

    #[test]
    fn test_vars_skip_literals() {
        let pattern = Pattern::parse("/home");
        assert!(pattern.vars("/home").is_empty());
    }
}
