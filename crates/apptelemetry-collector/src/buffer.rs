//! Buffer of telemetry payloads awaiting a scrape.
//!
//! Each scrape drains the buffer. The `agent` label is removed from every
//! line on the way out so series from reporters that differ only by agent
//! collapse onto the same name for the scraper.

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct TelemetryBuffer {
    messages: Mutex<Vec<String>>,
}

impl TelemetryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one rendered payload. Empty payloads carry no series and are skipped.
    pub fn add_message(&self, text: String) {
        if text.is_empty() {
            return;
        }
        self.messages.lock().push(text);
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every queued payload, strip the agent label and join the lines.
    pub fn drain(&self) -> String {
        let messages = std::mem::take(&mut *self.messages.lock());
        messages
            .iter()
            .flat_map(|m| m.lines())
            .map(strip_agent_label)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Remove `agent="..."` and its trailing comma from a series line.
pub fn strip_agent_label(line: &str) -> String {
    let Some(start) = find_label(line, "agent=\"") else {
        return line.to_string();
    };
    let value_start = start + "agent=\"".len();

    let mut end = None;
    let mut escaped = false;
    for (i, c) in line[value_start..].char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                end = Some(value_start + i + 1);
                break;
            }
            _ => {}
        }
    }
    let Some(mut end) = end else {
        return line.to_string();
    };
    if line[end..].starts_with(',') {
        end += 1;
    }

    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..start]);
    out.push_str(&line[end..]);
    out
}

/// Position of `label` where it opens a label (after `{` or `,`).
fn find_label(line: &str, label: &str) -> Option<usize> {
    line.match_indices(label)
        .map(|(i, _)| i)
        .find(|&i| matches!(line[..i].chars().last(), Some('{') | Some(',')))
}
