//! GEDCOM line tokenizer.
//!
//! Every line reads `level [@xref@] TAG [value]`. `CONC` and `CONT` lines are
//! folded into the value of the line they continue, so callers only see
//! logical lines.

use super::LoadError;

/// One logical GEDCOM line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based source line number.
    pub number: usize,
    pub level: u32,
    /// Cross-reference id without the `@` delimiters.
    pub xref: Option<String>,
    pub tag: String,
    pub value: Option<String>,
}

impl Line {
    /// Value with pointer delimiters removed, e.g. `@F1@` -> `F1`.
    pub fn pointer(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(|v| v.trim().trim_matches('@'))
            .filter(|v| !v.is_empty())
    }
}

/// Tokenize a whole document into logical lines.
pub fn read_lines(content: &str) -> Result<Vec<Line>, LoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines: Vec<Line> = Vec::new();

    for (idx, text) in content.lines().enumerate() {
        let number = idx + 1;
        if text.trim().is_empty() {
            continue;
        }
        let line = parse_line(number, text)?;

        if let Some(previous) = lines.last() {
            if line.level > previous.level + 1 {
                return Err(LoadError::Syntax {
                    line: number,
                    message: format!(
                        "level jumps from {} to {}",
                        previous.level, line.level
                    ),
                });
            }
        } else if line.level != 0 {
            return Err(LoadError::Syntax {
                line: number,
                message: "first record must start at level 0".to_string(),
            });
        }

        if line.tag == "CONC" || line.tag == "CONT" {
            let Some(parent) = lines.last_mut().filter(|p| p.level + 1 == line.level) else {
                return Err(LoadError::Syntax {
                    line: number,
                    message: format!("{} does not follow a line it can continue", line.tag),
                });
            };
            let value = parent.value.get_or_insert_with(String::new);
            if line.tag == "CONT" {
                value.push('\n');
            }
            if let Some(more) = &line.value {
                value.push_str(more);
            }
            continue;
        }

        lines.push(line);
    }

    Ok(lines)
}

/// Parse a single physical line.
pub fn parse_line(number: usize, text: &str) -> Result<Line, LoadError> {
    let syntax = |message: String| LoadError::Syntax {
        line: number,
        message,
    };

    let text = text.trim_start();
    let (level, rest) = text
        .split_once(' ')
        .ok_or_else(|| syntax(format!("expected 'level TAG', found '{}'", text)))?;
    let level: u32 = level
        .parse()
        .map_err(|_| syntax(format!("invalid level '{}'", level)))?;

    let rest = rest.trim_start();
    let (xref, rest) = if rest.starts_with('@') {
        let (xref, rest) = rest.split_once(' ').unwrap_or((rest, ""));
        let id = xref.trim_matches('@');
        if id.is_empty() || !xref.ends_with('@') || xref.len() < 3 {
            return Err(syntax(format!("malformed cross-reference '{}'", xref)));
        }
        (Some(id.to_string()), rest.trim_start())
    } else {
        (None, rest)
    };

    let (tag, value) = match rest.split_once(' ') {
        Some((tag, value)) => (tag, Some(value)),
        None => (rest, None),
    };
    if tag.is_empty() {
        return Err(syntax("missing tag".to_string()));
    }

    Ok(Line {
        number,
        level,
        xref,
        tag: tag.to_uppercase(),
        value: value
            .map(|v| v.trim_end().to_string())
            .filter(|v| !v.is_empty()),
    })
}
