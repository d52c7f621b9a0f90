//! The built-in catalog of Noise handshake patterns. Every entry is run
//! through `HandshakePattern::compile` at lookup time rather than trusted
//! as pre-validated data, the same way a caller's own pattern text would be.

use crate::error::NoiseError;
use crate::pattern::HandshakePattern;

/// Base (non-PSK) fundamental and deferred patterns, named per the Noise
/// specification.
fn base_text(name: &str) -> Option<&'static str> {
    Some(match name {
        "N" => "<- s\n...\n-> e, es",
        "K" => "-> s\n<- s\n...\n-> e, es, ss",
        "X" => "<- s\n...\n-> e, es, s, ss",
        "NN" => "-> e\n<- e, ee",
        "NK" => "<- s\n...\n-> e, es\n<- e, ee",
        "NX" => "-> e\n<- e, ee, s, es",
        "XN" => "-> e\n<- e, ee\n-> s, se",
        "XK" => "<- s\n...\n-> e, es\n<- e, ee\n-> s, se",
        "XX" => "-> e\n<- e, ee, s, es\n-> s, se",
        "KN" => "-> s\n...\n-> e\n<- e, ee, se",
        "KK" => "-> s\n<- s\n...\n-> e, es, ss\n<- e, ee, se",
        "KX" => "-> s\n...\n-> e\n<- e, ee, se, s, es",
        "IN" => "-> e, s\n<- e, ee, se",
        "IK" => "<- s\n...\n-> e, es, s, ss\n<- e, ee, se",
        "IX" => "-> e, s\n<- e, ee, se, s, es",
        _ => return None,
    })
}

/// Splices `psk0`/`psk1`/`psk2` modifiers per the Noise PSK extension: `psk0`
/// inserts a `psk` token at the front of the first message line, `pskN`
/// (N >= 1) appends one at the end of the Nth message line.
fn apply_psk(base: &str, modifier: &str) -> Result<String, NoiseError> {
    let n: usize = modifier
        .strip_prefix("psk")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| NoiseError::InvalidComponent("pattern", modifier.to_string()))?;

    let mut lines: Vec<String> = base.lines().map(|l| l.to_string()).collect();
    let message_start = lines.iter().position(|l| l.trim() == "...").map(|i| i + 1).unwrap_or(0);

    if n == 0 {
        let line = &lines[message_start];
        let (arrow, rest) = line.split_at(2);
        let rest = rest.trim();
        lines[message_start] = format!("{} psk, {}", arrow, rest);
    } else {
        let idx = message_start + n - 1;
        if idx >= lines.len() {
            return Err(NoiseError::InvalidComponent("pattern", modifier.to_string()));
        }
        let line = lines[idx].trim_end().to_string();
        lines[idx] = format!("{}, psk", line);
    }

    Ok(lines.join("\n"))
}

/// Resolves a catalog pattern name (e.g. `"XXpsk3"`) to compiled pattern
/// text, splitting off any trailing `pskN` modifier first.
pub fn lookup(name: &str) -> Result<HandshakePattern, NoiseError> {
    let (base_name, modifier) = split_psk_modifier(name);

    let base = base_text(base_name)
        .ok_or_else(|| NoiseError::InvalidComponent("pattern", name.to_string()))?;

    let text = match modifier {
        Some(m) => apply_psk(base, m)?,
        None => base.to_string(),
    };

    HandshakePattern::compile(name, &text)
}

fn split_psk_modifier(name: &str) -> (&str, Option<&str>) {
    match name.find("psk") {
        Some(idx) => (&name[..idx], Some(&name[idx..])),
        None => (name, None),
    }
}
