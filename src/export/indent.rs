//! Layout adjustment for rendered closure text.

/// Collapses every whitespace run outside string literals to a single space.
/// Standard-mode closures are embedded on one line; quoted contents pass
/// through untouched. The renderer never emits multi-line string literals, so
/// string state cannot carry across the collapse.
pub fn collapse_whitespace(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut strings = StringTracker::default();
    let mut pending_space = false;
    for ch in code.chars() {
        if strings.inside() {
            out.push(ch);
            strings.step(ch);
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
        strings.step(ch);
    }
    out
}

/// Tracks whether a character stream is currently inside a quoted literal,
/// honoring backslash escapes.
#[derive(Default)]
struct StringTracker {
    quote: Option<char>,
    escaped: bool,
}

impl StringTracker {
    fn inside(&self) -> bool {
        self.quote.is_some()
    }

    fn step(&mut self, ch: char) {
        match self.quote {
            Some(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == quote {
                    self.quote = None;
                }
            }
            None => {
                if ch == '\'' || ch == '"' {
                    self.quote = Some(ch);
                }
            }
        }
    }
}

/// Re-indents multi-line rendered code so it nests under `base_depth`
/// repetitions of `unit` inside an enclosing container. The first line (the
/// declaration header) is emitted as-is; every later line is re-indented by
/// `unit x (base_depth + nesting)`, where nesting tracks the running brace
/// depth and never goes below zero, even on malformed input.
pub fn reindent(code: &str, base_depth: usize, unit: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut nesting: usize = 0;
    for (i, line) in code.lines().enumerate() {
        let trimmed = line.trim();
        if i == 0 {
            out.push_str(trimmed);
            nesting = adjust(nesting, trimmed);
            continue;
        }
        out.push('\n');
        if trimmed.is_empty() {
            continue;
        }
        // A line opening with a closing delimiter sits one level shallower
        // than the lines above it.
        let display_level = if starts_with_closer(trimmed) {
            nesting.saturating_sub(1)
        } else {
            nesting
        };
        for _ in 0..base_depth + display_level {
            out.push_str(unit);
        }
        out.push_str(trimmed);
        nesting = adjust(nesting, trimmed);
    }
    out
}

fn starts_with_closer(line: &str) -> bool {
    matches!(line.as_bytes().first(), Some(b'}' | b']' | b')'))
}

fn adjust(nesting: usize, line: &str) -> usize {
    let mut level = nesting as isize;
    let mut strings = StringTracker::default();
    for ch in line.chars() {
        if strings.inside() {
            strings.step(ch);
            continue;
        }
        match ch {
            '{' | '[' => level += 1,
            '}' | ']' => level -= 1,
            _ => {}
        }
        strings.step(ch);
    }
    level.max(0) as usize
}
