/// Resolved per-step formatting metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMeta {
    /// Draw the line-number gutter.
    pub show_line_numbers: bool,
    /// Number printed next to the first line, always >= 1 once parsed.
    pub start_line: u32,
}

impl Default for StepMeta {
    fn default() -> Self {
        Self {
            show_line_numbers: false,
            start_line: 1,
        }
    }
}

/// Keys explicitly present in a `{key:value,...}` annotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetaOverrides {
    /// Value of `lines`, when given.
    pub lines: Option<bool>,
    /// Value of `startLine`, when given and valid.
    pub start_line: Option<u32>,
}

impl MetaOverrides {
    /// Fill keys that are not explicitly set from `fallback`.
    pub fn resolve(self, fallback: StepMeta) -> StepMeta {
        StepMeta {
            show_line_numbers: self.lines.unwrap_or(fallback.show_line_numbers),
            start_line: self.start_line.unwrap_or(fallback.start_line),
        }
    }
}

/// Parse zero or more `{key:value,...}` groups.
///
/// Recognized keys are `lines` (boolean; a bare `lines` means `true`) and `startLine` (floored,
/// ignored when non-finite or below 1). Unknown keys and malformed pairs are ignored. Later groups
/// override earlier ones.
pub fn parse_meta(annotation: &str) -> MetaOverrides {
    let mut out = MetaOverrides::default();
    let mut rest = annotation;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        for pair in after[..close].split(',') {
            apply_pair(&mut out, pair);
        }
        rest = &after[close + 1..];
    }
    out
}

fn apply_pair(out: &mut MetaOverrides, pair: &str) {
    let pair = pair.trim();
    if pair.is_empty() {
        return;
    }
    let (key, value) = match pair.split_once([':', '=']) {
        Some((k, v)) => (unquote(k), Some(unquote(v))),
        None => (unquote(pair), None),
    };

    match key {
        "lines" => match value {
            None | Some("true") => out.lines = Some(true),
            Some("false") => out.lines = Some(false),
            Some(_) => {}
        },
        "startLine" => {
            if let Some(n) = value.and_then(parse_start_line) {
                out.start_line = Some(n);
            }
        }
        _ => {}
    }
}

fn parse_start_line(raw: &str) -> Option<u32> {
    let v: f64 = raw.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    let v = v.floor();
    if v < 1.0 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v as u32)
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|x| x.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|x| x.strip_suffix('\'')))
        .unwrap_or(s)
        .trim()
}

#[cfg(test)]
#[path = "../../tests/unit/parse/meta.rs"]
mod tests;
