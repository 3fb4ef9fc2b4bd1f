//! # Glob Matcher
//!
//! Segment-based glob matching for declared paths.
//!
//! Patterns and paths are split on `/` (empty and `.` segments dropped) and
//! compared segment by segment:
//!
//! | Syntax  | Matches |
//! |---------|---------|
//! | `*`     | any run of characters within one segment |
//! | `?`     | exactly one character within one segment |
//! | `[a-z]` | one character from the class (`[^..]` / `[!..]` negate) |
//! | `**`    | zero or more whole segments (only as a whole segment) |
//!
//! A pattern ending in `/` matches as if it ended in `/**`.
//!
//! The same module synthesizes a concrete probe path from a pattern, used
//! when no real file exists yet (ignore oracle queries). Synthesis and
//! matching share the class parser, so a synthesized path always matches
//! the well-formed pattern it came from.

/// Stand-in for `*` and `**` in synthesized paths
pub const STAND_IN: &str = "sample";

/// Stand-in for `?` in synthesized paths
const STAND_IN_CHAR: char = 'x';

/// Recursive wildcard segment
const RECURSIVE: &str = "**";

// ============================================================================
// Synthesis
// ============================================================================

/// Produce one concrete path the pattern matches
///
/// - `*` and `**` become [`STAND_IN`]
/// - `?` becomes a single character
/// - `[...]` becomes one character accepted by the class
/// - an empty result, or one ending in `/`, gets [`STAND_IN`] appended
pub fn synthesize_path(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + STAND_IN.len());
    let mut i = 0;

    while let Some(&ch) = chars.get(i) {
        match ch {
            '*' => {
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
                out.push_str(STAND_IN);
            }
            '?' => out.push(STAND_IN_CHAR),
            '[' => match CharClass::parse(&chars[i..]) {
                Some((class, consumed)) => {
                    out.push(class.representative());
                    i += consumed;
                    continue;
                }
                None => {
                    // Unterminated class: nothing can match, emit a stand-in and stop
                    out.push(STAND_IN_CHAR);
                    break;
                }
            },
            other => out.push(other),
        }
        i += 1;
    }

    if out.is_empty() || out.ends_with('/') {
        out.push_str(STAND_IN);
    }

    split_segments(&out).join("/")
}

// ============================================================================
// Matching
// ============================================================================

/// Whether `path` matches `pattern`
pub fn match_path(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = split_segments(pattern);
    if pattern.ends_with('/') {
        pattern_segments.push(RECURSIVE);
    }
    match_segments(&pattern_segments, &split_segments(path))
}

/// Split on `/`, dropping empty and `.` segments
pub fn split_segments(value: &str) -> Vec<&str> {
    value
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// Match pattern segments against path segments
///
/// A `**` segment tries two branches: consume the `**` and match the rest of
/// the pattern here, or keep it and advance one path segment. Both sides
/// must be exhausted together for a match.
pub fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&RECURSIVE, rest)) => {
            match_segments(rest, path)
                || (!path.is_empty() && match_segments(pattern, &path[1..]))
        }
        Some((head, rest)) => match path.split_first() {
            Some((segment, remaining)) => {
                match_segment(head, segment) && match_segments(rest, remaining)
            }
            None => false,
        },
    }
}

/// Match one segment against a single-segment wildcard pattern
///
/// Greedy two-pointer scan: on a mismatch, resume from the most recent `*`
/// with one more character consumed. Runs in O(pattern * name).
pub fn match_segment(pattern: &str, name: &str) -> bool {
    let Some(tokens) = tokenize(pattern) else {
        return false;
    };
    let name: Vec<char> = name.chars().collect();

    let (mut t, mut n) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;
    while n < name.len() {
        match tokens.get(t) {
            Some(Token::Star) => {
                resume = Some((t, n));
                t += 1;
            }
            Some(token) if token.accepts(name[n]) => {
                t += 1;
                n += 1;
            }
            _ => match resume {
                Some((star, consumed)) => {
                    t = star + 1;
                    n = consumed + 1;
                    resume = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|token| *token == Token::Star)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Star,
    Any,
    Class(CharClass),
    Literal(char),
}

impl Token {
    /// Whether this single-character token accepts `ch`
    fn accepts(&self, ch: char) -> bool {
        match self {
            Token::Star => false,
            Token::Any => true,
            Token::Class(class) => class.matches(ch),
            Token::Literal(literal) => *literal == ch,
        }
    }
}

/// `None` when the pattern has an unterminated class, which matches nothing
fn tokenize(pattern: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while let Some(&ch) = chars.get(i) {
        let token = match ch {
            '*' => Token::Star,
            '?' => Token::Any,
            '[' => {
                let (class, consumed) = CharClass::parse(&chars[i..])?;
                i += consumed;
                tokens.push(Token::Class(class));
                continue;
            }
            other => Token::Literal(other),
        };
        tokens.push(token);
        i += 1;
    }
    Some(tokens)
}

// ============================================================================
// Character classes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct CharClass {
    negated: bool,
    ranges: Vec<(char, char)>,
}

impl CharClass {
    /// Parse a class starting at `chars[0] == '['`
    ///
    /// Returns the class and the number of chars consumed, or `None` when the
    /// class is unterminated. A `]` directly after the opening bracket (or
    /// negation) is a literal member.
    fn parse(chars: &[char]) -> Option<(Self, usize)> {
        let mut i = 1;
        let negated = matches!(chars.get(i), Some('^') | Some('!'));
        if negated {
            i += 1;
        }

        let mut ranges = Vec::new();
        loop {
            let lo = *chars.get(i)?;
            if lo == ']' && !ranges.is_empty() {
                return Some((Self { negated, ranges }, i + 1));
            }
            i += 1;

            let hi = match (chars.get(i), chars.get(i + 1)) {
                (Some('-'), Some(&hi)) if hi != ']' => {
                    i += 2;
                    hi
                }
                _ => lo,
            };
            ranges.push((lo, hi));
        }
    }

    fn matches(&self, ch: char) -> bool {
        let in_ranges = self
            .ranges
            .iter()
            .any(|&(lo, hi)| lo <= ch && ch <= hi);
        in_ranges != self.negated
    }

    /// One character this class accepts
    fn representative(&self) -> char {
        if !self.negated {
            if let Some(&(lo, _)) = self.ranges.iter().find(|(lo, hi)| lo <= hi) {
                return lo;
            }
        }
        [STAND_IN_CHAR, 'y', 'z', 'a', '0', '_']
            .into_iter()
            .chain('a'..='z')
            .find(|&ch| self.matches(ch))
            .unwrap_or(STAND_IN_CHAR)
    }
}
