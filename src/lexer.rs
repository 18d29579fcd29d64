use crate::config::ConfigKey;

/// A classified source line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Comment,
    MetaOpen,   // <
    MetaClose,  // >

    // KEY: VALUE inside a meta block, verbatim
    MetaEntry { key: String, value: String },

    PatternMarker, // [pattern]

    // [<index>:<name>]
    TrackMarker { index: u32, name: String },

    // KEY: VALUE outside a meta block for a known key, value upper-cased
    Assign { key: ConfigKey, value: String },

    Notes(Vec<String>),
}

/// A line with its 1-based position in the source
#[derive(Debug, Clone)]
pub struct LocatedLine {
    pub line: Line,
    pub number: usize,
}

/// Line classifier for Monure source
///
/// Tracks whether it is inside a `<` ... `>` meta block, since the same
/// `KEY: VALUE` text means a meta entry inside the block and a configuration
/// assignment outside it.
pub struct Lexer<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    in_meta: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            in_meta: false,
        }
    }

    pub fn tokenize(self) -> Vec<LocatedLine> {
        self.collect()
    }

    fn classify(&mut self, raw: &str) -> Option<Line> {
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }
        if line.starts_with('#') {
            return Some(Line::Comment);
        }
        if line == "<" {
            self.in_meta = true;
            return Some(Line::MetaOpen);
        }
        if line == ">" {
            self.in_meta = false;
            return Some(Line::MetaClose);
        }

        if self.in_meta {
            // Lines without a colon inside a meta block carry nothing
            let (key, value) = line.split_once(':')?;
            return Some(Line::MetaEntry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            });
        }

        if starts_with_ignore_case(line, "[pattern]") {
            return Some(Line::PatternMarker);
        }

        if !line.starts_with('[') {
            // Anything else with a colon is left to the sequencer
            if let Some((key, value)) = line.split_once(':') {
                if let Some(key) = ConfigKey::from_name(key) {
                    return Some(Line::Assign {
                        key,
                        value: value.trim().to_uppercase(),
                    });
                }
            }
        }

        if let Some(marker) = track_marker(line) {
            return Some(marker);
        }

        Some(Line::Notes(
            line.split_whitespace().map(str::to_string).collect(),
        ))
    }
}

impl Iterator for Lexer<'_> {
    type Item = LocatedLine;

    fn next(&mut self) -> Option<LocatedLine> {
        loop {
            let (idx, raw) = self.lines.next()?;
            if let Some(line) = self.classify(raw) {
                return Some(LocatedLine {
                    line,
                    number: idx + 1,
                });
            }
        }
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Match `[<digits>:<name>]` at the start of the line
fn track_marker(line: &str) -> Option<Line> {
    let rest = line.strip_prefix('[')?;
    let colon = rest.find(':')?;
    let digits = &rest[..colon];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;

    let after = &rest[colon + 1..];
    let close = after.find(']')?;
    if close == 0 {
        return None;
    }
    let name = after[..close].trim();

    Some(Line::TrackMarker {
        index,
        name: name.to_string(),
    })
}
