//! Pattern compiler: turns textual handshake recipes like `-> e` / `<- e, ee,
//! s, es` into a verified token program, enforcing the structural and
//! Noise-framework validity rules before a `HandshakeState` ever sees them.

pub mod catalog;

use std::collections::HashSet;
use std::fmt;

use crate::error::NoiseError;

/// One operation a handshake line performs, in the order the Noise spec
/// writes them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Token {
    E,
    S,
    Ee,
    Es,
    Se,
    Ss,
    Psk,
}

impl Token {
    fn literal(self) -> &'static str {
        match self {
            Token::E => "e",
            Token::S => "s",
            Token::Ee => "ee",
            Token::Es => "es",
            Token::Se => "se",
            Token::Ss => "ss",
            Token::Psk => "psk",
        }
    }

    fn from_literal(literal: &str) -> Option<Token> {
        match literal {
            "e" => Some(Token::E),
            "s" => Some(Token::S),
            "ee" => Some(Token::Ee),
            "es" => Some(Token::Es),
            "se" => Some(Token::Se),
            "ss" => Some(Token::Ss),
            "psk" => Some(Token::Psk),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.literal())
    }
}

/// The role that writes a given line: `ItoR` is initiator-to-responder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    ItoR,
    RtoI,
}

impl Direction {
    pub fn is_initiator(self) -> bool {
        self == Direction::ItoR
    }

    fn arrow(self) -> &'static str {
        match self {
            Direction::ItoR => "->",
            Direction::RtoI => "<-",
        }
    }
}

/// A direction token followed by its non-empty ordered operation tokens.
#[derive(Clone, Debug)]
pub struct PatternLine {
    pub direction: Direction,
    pub tokens: Vec<Token>,
}

impl PatternLine {
    fn render(&self) -> String {
        let toks: Vec<&str> = self.tokens.iter().map(|t| t.literal()).collect();
        format!("{} {}", self.direction.arrow(), toks.join(", "))
    }
}

/// A compiled, validated handshake recipe.
#[derive(Clone, Debug)]
pub struct HandshakePattern {
    pub name: String,
    pub pre_initiator: Vec<Token>,
    pub pre_responder: Vec<Token>,
    pub message_patterns: Vec<PatternLine>,
}

impl HandshakePattern {
    pub fn psk_count(&self) -> usize {
        self.message_patterns
            .iter()
            .flat_map(|line| line.tokens.iter())
            .filter(|t| **t == Token::Psk)
            .count()
    }

    /// Parses and validates `text` under the given catalog `name`.
    pub fn compile(name: &str, text: &str) -> Result<HandshakePattern, NoiseError> {
        let lines = lex(text)?;

        let (pre_lines, message_lines) = split_premessage(&lines);

        let (pre_initiator, pre_responder) = compile_premessages(pre_lines)?;
        let message_patterns = compile_messages(message_lines)?;

        Ok(HandshakePattern {
            name: name.to_string(),
            pre_initiator,
            pre_responder,
            message_patterns,
        })
    }
}

fn lex(text: &str) -> Result<Vec<PatternLine>, NoiseError> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "..." {
            // Separator between pre-message and message lines. Recorded as
            // an empty-token line: a real line always has at least one
            // token, so this is unambiguous downstream.
            out.push(PatternLine { direction: Direction::ItoR, tokens: vec![] });
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let arrow = parts.next().ok_or_else(|| NoiseError::InvalidToken(trimmed.to_string()))?;
        let direction = match arrow {
            "->" => Direction::ItoR,
            "<-" => Direction::RtoI,
            other => return Err(NoiseError::InvalidToken(other.to_string())),
        };

        let mut tokens = Vec::new();
        for part in parts {
            let literal = part.trim_end_matches(',');
            let token = Token::from_literal(literal)
                .ok_or_else(|| NoiseError::InvalidToken(literal.to_string()))?;
            tokens.push(token);
        }
        out.push(PatternLine { direction, tokens });
    }
    Ok(out)
}

fn split_premessage(lines: &[PatternLine]) -> (Vec<PatternLine>, Vec<PatternLine>) {
    match lines.iter().position(|l| l.tokens.is_empty()) {
        Some(idx) => {
            let pre = lines[..idx].to_vec();
            let msg = lines[idx + 1..].to_vec();
            (pre, msg)
        }
        None => (Vec::new(), lines.to_vec()),
    }
}

fn compile_premessages(
    pre_lines: Vec<PatternLine>,
) -> Result<(Vec<Token>, Vec<Token>), NoiseError> {
    let mut pre_initiator = Vec::new();
    let mut pre_responder = Vec::new();

    for line in &pre_lines {
        if line.tokens.is_empty() || line.tokens.len() > 2 {
            return Err(NoiseError::InvalidPattern {
                rule: "invalid_premessage",
                offending_line: line.render(),
            });
        }
        for tok in &line.tokens {
            if *tok != Token::E && *tok != Token::S {
                return Err(NoiseError::InvalidPattern {
                    rule: "invalid_premessage",
                    offending_line: line.render(),
                });
            }
        }
        let mut seen = HashSet::new();
        for tok in &line.tokens {
            if !seen.insert(*tok) {
                return Err(NoiseError::InvalidPattern {
                    rule: "invalid_premessage",
                    offending_line: line.render(),
                });
            }
        }

        let bucket = if line.direction.is_initiator() {
            &mut pre_initiator
        } else {
            &mut pre_responder
        };
        bucket.extend(line.tokens.iter().copied());
    }

    Ok((pre_initiator, pre_responder))
}

fn compile_messages(message_lines: Vec<PatternLine>) -> Result<Vec<PatternLine>, NoiseError> {
    if message_lines.is_empty() {
        return Err(NoiseError::InvalidPattern {
            rule: "no_message_lines",
            offending_line: String::new(),
        });
    }
    if message_lines[0].direction != Direction::ItoR {
        return Err(NoiseError::InvalidPattern {
            rule: "first_line_not_initiator",
            offending_line: message_lines[0].render(),
        });
    }
    for pair in message_lines.windows(2) {
        if pair[0].direction == pair[1].direction {
            return Err(NoiseError::InvalidPattern {
                rule: "consecutive_same_direction",
                offending_line: pair[1].render(),
            });
        }
    }

    let mut sent_e = (false, false); // (initiator, responder)
    let mut sent_s = (false, false);
    let mut occurred: HashSet<Token> = HashSet::new();

    for line in &message_lines {
        let initiator_owns = line.direction.is_initiator();

        for (i, tok) in line.tokens.iter().enumerate() {
            match tok {
                Token::E => {
                    let slot = if initiator_owns { &mut sent_e.0 } else { &mut sent_e.1 };
                    if *slot {
                        return Err(NoiseError::InvalidPattern {
                            rule: "repeated_token",
                            offending_line: line.render(),
                        });
                    }
                    *slot = true;
                }
                Token::S => {
                    let slot = if initiator_owns { &mut sent_s.0 } else { &mut sent_s.1 };
                    if *slot {
                        return Err(NoiseError::InvalidPattern {
                            rule: "repeated_token",
                            offending_line: line.render(),
                        });
                    }
                    *slot = true;
                }
                Token::Ee | Token::Es | Token::Se | Token::Ss => {
                    if !occurred.insert(*tok) {
                        return Err(NoiseError::InvalidPattern {
                            rule: "repeated_token",
                            offending_line: line.render(),
                        });
                    }
                }
                Token::Psk => {
                    let is_edge = i == 0 || i == line.tokens.len() - 1;
                    if !is_edge {
                        return Err(NoiseError::InvalidPattern {
                            rule: "psk_position",
                            offending_line: line.render(),
                        });
                    }
                }
            }
        }

        if initiator_owns {
            if occurred.contains(&Token::Se) && !occurred.contains(&Token::Ee) {
                return Err(NoiseError::InvalidPattern {
                    rule: "se_before_ee",
                    offending_line: line.render(),
                });
            }
            if occurred.contains(&Token::Ss) && !occurred.contains(&Token::Es) {
                return Err(NoiseError::InvalidPattern {
                    rule: "ss_before_es",
                    offending_line: line.render(),
                });
            }
        } else {
            if occurred.contains(&Token::Es) && !occurred.contains(&Token::Ee) {
                return Err(NoiseError::InvalidPattern {
                    rule: "es_before_ee",
                    offending_line: line.render(),
                });
            }
            if occurred.contains(&Token::Ss) && !occurred.contains(&Token::Se) {
                return Err(NoiseError::InvalidPattern {
                    rule: "ss_before_se",
                    offending_line: line.render(),
                });
            }
        }
    }

    Ok(message_lines)
}
