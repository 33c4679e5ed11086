//! Rendering of command sequences into G-code text
use crate::{Command, CommentFlags, Workspace, scalar_fmt};
use std::fmt;

/// Prefix of the lines that delimit preamble, body and postamble
pub const SECTION_MARKER: &str = ";;";

/// Delimiter that starts a comment inside of a G-code line
pub const COMMENT_DELIMITER: char = ';';

/// Postamble appended after the body
pub const DEFAULT_POSTAMBLE: &str = ";; END BODY

;; BEGIN POSTAMBLE
M84 X Y Z E ; Disable ALL motors
;; END POSTAMBLE
";

/// Preamble prepended to the body
///
/// Resets the printer state, homes `X` and `Y`, parks the head at the base
/// point of the workspace and switches to relative positioning.
pub fn default_preamble(workspace: &Workspace) -> String {
    struct Base<'a>(&'a Workspace);

    impl fmt::Display for Base<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let base = self.0.base();
            write!(f, "X")?;
            scalar_fmt(f, base.x())?;
            write!(f, " Y")?;
            scalar_fmt(f, base.y())
        }
    }

    format!(
        ";; BEGIN PREAMBLE
M413 S0 ; Disable power loss recovery
M107 ; Fan off
M104 S0 ; Set target temperature
G92 E0 ; Hotend reset
G90 ; Absolute positioning

G28 X Y ; Home X and Y axes

G0 {} F5000.0 ; Move to start position

G91 ; Relative positioning

; START OF PRINT

M204 S2000 ; Printing and travel acceleration in mm/s/s

;; END PREAMBLE

;; BEGIN BODY
",
        Base(workspace)
    )
}

/// Render commands into body lines, commands that render to nothing are skipped
pub fn render_commands(commands: &[Command], flags: CommentFlags) -> Vec<String> {
    commands
        .iter()
        .map(|cmd| cmd.render(flags))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Pad code portion of the lines so all comments start in the same column
///
/// Lines starting with [`SECTION_MARKER`] neither contribute to the column
/// nor get padded, lines without comments stay unchanged.
pub fn align_comments(lines: &mut [String]) {
    fn split(line: &str) -> (&str, Option<&str>) {
        match line.find(COMMENT_DELIMITER) {
            Some(index) => (line[..index].trim_end(), Some(&line[index..])),
            None => (line.trim_end(), None),
        }
    }

    let width = lines
        .iter()
        .filter(|line| !line.starts_with(SECTION_MARKER))
        .map(|line| split(line).0.chars().count())
        .max()
        .unwrap_or(0);
    if width == 0 {
        return;
    }
    for line in lines.iter_mut() {
        if line.starts_with(SECTION_MARKER) {
            continue;
        }
        if let (code, Some(comment)) = split(line) {
            *line = format!("{:<width$} {}", code, comment, width = width);
        }
    }
}

/// Render full G-code document: preamble, aligned body and postamble
pub fn serialize(
    preamble: &str,
    commands: &[Command],
    postamble: &str,
    flags: CommentFlags,
) -> String {
    let mut body = render_commands(commands, flags);
    align_comments(&mut body);

    let mut output = String::with_capacity(
        preamble.len() + postamble.len() + body.iter().map(|l| l.len() + 1).sum::<usize>() + 2,
    );
    output.push_str(preamble);
    if !preamble.is_empty() && !preamble.ends_with('\n') {
        output.push('\n');
    }
    for line in body.iter() {
        output.push_str(line);
        output.push('\n');
    }
    output.push_str(postamble);
    output
}
