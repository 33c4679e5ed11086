//! G-code command model
use crate::Scalar;
use std::{borrow::Cow, collections::BTreeMap, fmt};

/// Operation code of a G-code line (e.g. `G0`, `G2`, `G91`)
///
/// Empty opcode is used for comment-only lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(Cow<'static, str>);

impl Opcode {
    /// Rapid move
    pub const G0: Opcode = Opcode(Cow::Borrowed("G0"));
    /// Linear move
    pub const G1: Opcode = Opcode(Cow::Borrowed("G1"));
    /// Clockwise arc, optional `X`/`Y` endpoint for partial arcs
    pub const G2: Opcode = Opcode(Cow::Borrowed("G2"));
    /// Cubic bezier move
    pub const G5: Opcode = Opcode(Cow::Borrowed("G5"));
    /// Absolute positioning
    pub const G90: Opcode = Opcode(Cow::Borrowed("G90"));
    /// Relative positioning
    pub const G91: Opcode = Opcode(Cow::Borrowed("G91"));
    /// Comment-only line
    pub const NONE: Opcode = Opcode(Cow::Borrowed(""));

    pub const RAPID_MOVE: Opcode = Self::G0;
    pub const ARC: Opcode = Self::G2;
    pub const BEZIER_CUBIC: Opcode = Self::G5;

    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Opcode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Controls which comments are emitted when commands are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentFlags {
    /// Trailing comments on lines with an opcode
    pub line: bool,
    /// Comment-only lines (trace markers, separators)
    pub above: bool,
}

impl CommentFlags {
    pub const NONE: CommentFlags = CommentFlags {
        line: false,
        above: false,
    };
    pub const ALL: CommentFlags = CommentFlags {
        line: true,
        above: true,
    };
}

impl Default for CommentFlags {
    fn default() -> Self {
        Self {
            line: true,
            above: false,
        }
    }
}

/// Single G-code line: opcode, named numeric arguments and a comment
///
/// Arguments are keyed by a single letter and always rendered in ascending
/// letter order, independent of the order they were added in.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    opcode: Opcode,
    args: BTreeMap<char, Scalar>,
    comment: Option<String>,
}

impl Command {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            args: BTreeMap::new(),
            comment: None,
        }
    }

    /// Comment-only command
    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(Opcode::NONE).with_comment(text)
    }

    /// Add argument, replaces previous value with the same name
    pub fn with_arg(mut self, name: char, value: Scalar) -> Self {
        self.args.insert(name, value);
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = (char, Scalar)>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    pub fn args(&self) -> &BTreeMap<char, Scalar> {
        &self.args
    }

    /// Value of the argument with the name
    pub fn arg(&self, name: char) -> Option<Scalar> {
        self.args.get(&name).copied()
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Line without opcode, only carries a comment (or nothing at all)
    pub fn is_comment_only(&self) -> bool {
        self.opcode.is_empty() && self.args.is_empty()
    }

    /// Same opcode and arguments, comments are ignored
    pub fn same_code(&self, other: &Command) -> bool {
        self.opcode == other.opcode && self.args == other.args
    }

    /// Render command as a single G-code line
    ///
    /// Returns empty string if there is nothing to emit.
    pub fn render(&self, flags: CommentFlags) -> String {
        let mut result = String::from(self.opcode.as_str());
        for (name, value) in self.args.iter() {
            result.push_str(&format!(" {}{:.6}", name, value));
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            let has_code = !self.opcode.is_empty();
            if (flags.line && has_code) || (flags.above && !has_code) {
                result.push_str(" ; ");
                result.push_str(comment);
            }
        }
        collapse_whitespace(result.trim_start())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(CommentFlags::ALL))
    }
}

/// Merge repeated spaces and empty lines until nothing changes
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = text.to_owned();
    loop {
        let next = result.replace("  ", " ").replace("\n\n", "\n");
        if next == result {
            return result;
        }
        result = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args_sorted() {
        let cmd = Command::new(Opcode::G5)
            .with_arg('Y', 2.0)
            .with_arg('X', 1.0)
            .with_arg('Q', -0.5)
            .with_arg('I', 0.25);
        assert_eq!(
            cmd.render(CommentFlags::NONE),
            "G5 I0.250000 Q-0.500000 X1.000000 Y2.000000"
        );
    }

    #[test]
    fn test_render_comments() {
        let cmd = Command::new(Opcode::G0)
            .with_arg('Z', -20.0)
            .with_comment("start drawing");
        let comment = Command::comment("BEGIN Move((1,2))");

        assert_eq!(cmd.render(CommentFlags::NONE), "G0 Z-20.000000");
        assert_eq!(
            cmd.render(CommentFlags::default()),
            "G0 Z-20.000000 ; start drawing"
        );
        assert_eq!(comment.render(CommentFlags::default()), "");
        assert_eq!(
            comment.render(CommentFlags {
                line: false,
                above: true
            }),
            "; BEGIN Move((1,2))"
        );
        assert_eq!(
            cmd.render(CommentFlags {
                line: false,
                above: true
            }),
            "G0 Z-20.000000"
        );
        // separators carry nothing to render
        assert_eq!(Command::comment("").render(CommentFlags::ALL), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        let text = "G0    X1\n\n\n\nG1  Y2 ;  comment\n";
        let once = collapse_whitespace(text);
        assert_eq!(once, "G0 X1\nG1 Y2 ; comment\n");
        assert_eq!(collapse_whitespace(&once), once);
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_with_arg_replaces() {
        let cmd = Command::new(Opcode::G0)
            .with_arg('X', 1.0)
            .with_arg('X', 3.0);
        assert_eq!(cmd.args().len(), 1);
        assert_eq!(cmd.arg('X'), Some(3.0));
        assert_eq!(cmd.arg('Y'), None);
        assert!(!cmd.is_comment_only());
        assert!(Command::comment("x").is_comment_only());
    }
}
