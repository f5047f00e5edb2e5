use regex::RegexBuilder;

/// Part of a text, either plain or an occurrence of the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match *self {
            Segment::Plain(text) | Segment::Match(text) => text,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Segment::Match(_))
    }
}

/// Split `text` around case-insensitive occurrences of the whole trimmed `query`.
///
/// Concatenating the segments gives back `text`.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }

    let query = query.trim();
    if query.is_empty() {
        return vec![Segment::Plain(text)];
    }

    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return vec![Segment::Plain(text)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            segments.push(Segment::Plain(&text[last..found.start()]));
        }
        segments.push(Segment::Match(found.as_str()));
        last = found.end();
    }
    if last < text.len() {
        segments.push(Segment::Plain(&text[last..]));
    }
    segments
}
