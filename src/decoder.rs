//! G-code text decoder
//!
//! Only absolute positioning is understood, lines that arrive while relative
//! positioning (`G91`) is active are dropped with a warning.
use crate::{Command, Error, Opcode, Result, Scalar, serializer::COMMENT_DELIMITER};

/// Positioning mode selected by `G90` / `G91`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    #[default]
    Absolute,
    Relative,
}

/// Line by line G-code decoder
#[derive(Debug, Default)]
pub struct Decoder {
    positioning: Positioning,
    line: usize,
    commands: Vec<Command>,
    dropped: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current positioning mode
    pub fn positioning(&self) -> Positioning {
        self.positioning
    }

    /// Number of lines dropped because of relative positioning
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Decode single line of G-code
    pub fn decode_line(&mut self, text: &str) -> Result<&mut Self> {
        self.line += 1;
        let (code, comment) = match text.split_once(COMMENT_DELIMITER) {
            Some((code, comment)) => (code.trim(), Some(comment.trim())),
            None => (text.trim(), None),
        };
        let mut tokens = code.split_whitespace();
        let Some(opcode) = tokens.next() else {
            // comment-only line, blank lines carry nothing
            if let Some(comment) = comment.filter(|c| !c.is_empty()) {
                self.commands.push(Command::comment(comment));
            }
            return Ok(self);
        };

        let opcode = Opcode::from(opcode);
        if opcode == Opcode::G90 {
            self.positioning = Positioning::Absolute;
        } else if opcode == Opcode::G91 {
            self.positioning = Positioning::Relative;
        } else if self.positioning == Positioning::Relative {
            tracing::warn!(
                "[decode] line {}: relative positioning is not supported, dropping {}",
                self.line,
                opcode
            );
            self.dropped += 1;
            return Ok(self);
        }

        let mut command = Command::new(opcode);
        for token in tokens {
            let mut chars = token.chars();
            let Some(name) = chars.next() else {
                continue;
            };
            let value = chars.as_str();
            if value.is_empty() {
                continue;
            }
            let value: Scalar =
                lexical_core::parse(value.as_bytes()).map_err(|error| Error::ParseError {
                    line: self.line,
                    token: token.to_owned(),
                    reason: format!("{:?}", error),
                })?;
            command = command.with_arg(name, value);
        }
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            command = command.with_comment(comment);
        }
        self.commands.push(command);
        Ok(self)
    }

    /// Consume decoder and return decoded commands
    pub fn finish(self) -> Vec<Command> {
        self.commands
    }
}

/// Decode G-code text into a sequence of commands
///
/// Blank lines are skipped, positioning sentinels are kept in the output.
pub fn decode(text: &str) -> Result<Vec<Command>> {
    let mut decoder = Decoder::new();
    for line in text.lines() {
        decoder.decode_line(line)?;
    }
    if decoder.dropped() > 0 {
        tracing::debug!(
            "[decode] {} lines dropped in relative positioning",
            decoder.dropped()
        );
    }
    Ok(decoder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommentFlags;

    #[test]
    fn test_decode_line() -> Result<()> {
        let commands = decode("G5 I2 J5.5 P-2 Q5 X10 Y0 ; curve\n\n; marker\nM84 X Y Z E")?;
        assert_eq!(commands.len(), 3);

        let curve = &commands[0];
        assert_eq!(curve.opcode(), &Opcode::G5);
        assert_eq!(curve.arg('J'), Some(5.5));
        assert_eq!(curve.arg('P'), Some(-2.0));
        assert_eq!(curve.comment_text(), Some("curve"));
        assert_eq!(
            curve.render(CommentFlags::NONE),
            "G5 I2.000000 J5.500000 P-2.000000 Q5.000000 X10.000000 Y0.000000"
        );

        assert!(commands[1].is_comment_only());
        assert_eq!(commands[1].comment_text(), Some("marker"));

        // single letter tokens have no value
        assert_eq!(commands[2].opcode().as_str(), "M84");
        assert!(commands[2].args().is_empty());
        Ok(())
    }

    #[test]
    fn test_relative_dropped() -> Result<()> {
        let mut decoder = Decoder::new();
        decoder
            .decode_line("G0 X1 Y1")?
            .decode_line("G91")?
            .decode_line("G0 X2 Y2")?
            .decode_line("; still here")?
            .decode_line("G0 Z-20")?;
        assert_eq!(decoder.positioning(), Positioning::Relative);
        decoder.decode_line("G90")?.decode_line("G0 X3 Y3")?;
        assert_eq!(decoder.positioning(), Positioning::Absolute);
        assert_eq!(decoder.dropped(), 2);

        let commands = decoder.finish();
        let codes: Vec<_> = commands
            .iter()
            .map(|cmd| cmd.render(CommentFlags::ALL))
            .collect();
        assert_eq!(
            codes,
            vec![
                "G0 X1.000000 Y1.000000",
                "G91",
                "; still here",
                "G90",
                "G0 X3.000000 Y3.000000",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_error() {
        let error = decode("G0 X1\nG0 Xabc Y2").err();
        match error {
            Some(Error::ParseError { line, token, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "Xabc");
            }
            error => panic!("unexpected result: {:?}", error),
        }
    }
}
