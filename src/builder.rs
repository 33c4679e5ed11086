//! Stateful G-code encoder
//!
//! [`GCodeBuilder`] exposes drawing primitives in the drawing space and
//! turns them into a sequence of [`Command`]s in the machine space, while
//! keeping track of the head position, whether the pen is down and whether a
//! continuous line is being drawn.
use crate::{
    AbsolutePos, Command, CommentFlags, Error, HardwareAbsolutePos, Opcode, Result, Scalar,
    Workspace, decoder, serializer,
    utils::cubic_flatten,
};
use std::fmt;

/// How deep the head goes down to draw
pub const DEFAULT_DEPTH: Scalar = 20.0;
/// Stroke width used to fill shapes
pub const DEFAULT_HEAD_SIZE: Scalar = 2.0;

/// Upper limit on the number of passes of a filled shape
pub const MAX_FILL_PASSES: usize = 10_000;

// max distance (in hardware units) between the start of a continuous line
// primitive and the current position
const CONTINUITY_EPSILON: Scalar = 1e-9;

// relative slack when counting fill passes, keeps `1.0 / 0.1` at ten passes
const FILL_PASS_TOLERANCE: Scalar = 1e-9;

/// Vertical state of the head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PenState {
    /// Traveling
    Up,
    /// Drawing
    Down,
}

/// G-code builder with Cairo like drawing interface.
///
/// All positions accepted and returned by the builder are in the drawing
/// space ([`AbsolutePos`]), translation to the machine space and bounds
/// checking is done internally. Every operation is all or nothing, if it
/// fails neither position, pen state nor command sequence are changed.
#[derive(Clone)]
pub struct GCodeBuilder {
    workspace: Workspace,
    depth: Scalar,
    head_size: Scalar,
    pen: PenState,
    current: HardwareAbsolutePos,
    pub(crate) continuous_line: bool,
    comments: CommentFlags,
    preamble: String,
    postamble: String,
    commands: Vec<Command>,
}

impl fmt::Debug for GCodeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GCodeBuilder")
            .field("workspace", &self.workspace.name)
            .field("pen", &self.pen)
            .field("current", &self.current())
            .field("continuous_line", &self.continuous_line)
            .field("commands", &self.commands.len())
            .finish()
    }
}

impl Default for GCodeBuilder {
    fn default() -> Self {
        Self::new(Workspace::default())
    }
}

impl GCodeBuilder {
    /// Create builder with the head parked at the base point of the workspace
    pub fn new(workspace: Workspace) -> Self {
        Self {
            current: workspace.base(),
            preamble: serializer::default_preamble(&workspace),
            postamble: serializer::DEFAULT_POSTAMBLE.to_owned(),
            workspace,
            depth: DEFAULT_DEPTH,
            head_size: DEFAULT_HEAD_SIZE,
            pen: PenState::Up,
            continuous_line: false,
            comments: CommentFlags::default(),
            commands: Vec::new(),
        }
    }

    /// Decode G-code text into a fresh builder
    pub fn from_gcode(text: &str, workspace: Workspace) -> Result<Self> {
        let mut builder = Self::new(workspace);
        builder.push_commands(decoder::decode(text)?);
        Ok(builder)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// How deep the head goes down to draw
    pub fn set_depth(&mut self, depth: Scalar) -> &mut Self {
        self.depth = depth;
        self
    }

    pub fn depth(&self) -> Scalar {
        self.depth
    }

    /// Stroke width, used as a step by filled shapes
    pub fn set_head_size(&mut self, size: Scalar) -> Result<&mut Self> {
        if !(size > 0.0) {
            return Err(Error::InvalidHeadSize(size));
        }
        self.head_size = size;
        Ok(self)
    }

    pub fn head_size(&self) -> Scalar {
        self.head_size
    }

    /// Enable or disable trailing comments and comment-only lines
    pub fn set_comments(&mut self, line: bool, above: bool) -> &mut Self {
        self.comments = CommentFlags { line, above };
        self
    }

    pub fn set_line_comments(&mut self, enabled: bool) -> &mut Self {
        self.comments.line = enabled;
        self
    }

    pub fn set_above_comments(&mut self, enabled: bool) -> &mut Self {
        self.comments.above = enabled;
        self
    }

    pub fn comments(&self) -> CommentFlags {
        self.comments
    }

    pub fn set_preamble(&mut self, preamble: impl Into<String>) -> &mut Self {
        self.preamble = preamble.into();
        self
    }

    pub fn set_postamble(&mut self, postamble: impl Into<String>) -> &mut Self {
        self.postamble = postamble.into();
        self
    }

    /// Current position in the drawing space
    pub fn current(&self) -> AbsolutePos {
        self.workspace.to_absolute(self.current)
    }

    /// Current position in the machine space
    pub fn current_hardware(&self) -> HardwareAbsolutePos {
        self.current
    }

    pub fn pen(&self) -> PenState {
        self.pen
    }

    pub fn is_continuous_line(&self) -> bool {
        self.continuous_line
    }

    /// Commands accumulated so far
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Append raw command, position and pen state are not tracked
    pub fn push_command(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn push_commands(&mut self, commands: impl IntoIterator<Item = Command>) -> &mut Self {
        self.commands.extend(commands);
        self
    }

    /// Log all accumulated commands
    pub fn dump(&self) {
        for (index, command) in self.commands.iter().enumerate() {
            tracing::debug!("[dump:{}] {}", index, command);
        }
    }

    /// Add comment, emission is decided when G-code is rendered
    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_command(Command::comment(text))
    }

    /// Empty comment line, used to structure the output
    pub fn separator(&mut self) -> &mut Self {
        self.comment("")
    }

    /// Lower the head to start drawing
    pub fn down(&mut self) -> Result<&mut Self> {
        if self.pen == PenState::Down {
            return Err(Error::DrawStateConflict {
                operation: "Down called, but already drawing",
            });
        }
        self.commands.push(
            Command::new(Opcode::G0)
                .with_arg('Z', -self.depth)
                .with_comment("start drawing"),
        );
        self.pen = PenState::Down;
        Ok(self)
    }

    /// Raise the head to stop drawing
    pub fn up(&mut self) -> Result<&mut Self> {
        if self.pen == PenState::Up {
            return Err(Error::DrawStateConflict {
                operation: "Up called, but not drawing",
            });
        }
        self.commands.push(
            Command::new(Opcode::G0)
                .with_arg('Z', self.depth)
                .with_comment("stop drawing"),
        );
        self.pen = PenState::Up;
        Ok(self)
    }

    /// Start continuous line at the current position
    ///
    /// Lowers the head, after that every primitive must start where the
    /// previous one ended and no up/down brackets are emitted between them.
    pub fn begin_continuous_line(&mut self) -> Result<&mut Self> {
        if self.continuous_line {
            return Err(Error::DrawStateConflict {
                operation: "BeginContinuousLine called, but already drawing continuous line",
            });
        }
        self.transaction(|builder| {
            builder.down()?;
            builder.continuous_line = true;
            Ok(())
        })
    }

    /// Finish continuous line, the head is raised
    pub fn end_continuous_line(&mut self) -> Result<&mut Self> {
        if !self.continuous_line {
            return Err(Error::DrawStateConflict {
                operation: "EndContinuousLine called, but not drawing continuous line",
            });
        }
        if self.pen == PenState::Down {
            self.up()?;
        }
        self.continuous_line = false;
        Ok(self)
    }

    /// Rapid move to the position, does not change pen state
    pub fn move_to(&mut self, p: impl Into<AbsolutePos>) -> Result<&mut Self> {
        let p = p.into();
        let target = self.workspace.to_hardware(p)?;
        let offset = target.relative_to(self.current);
        self.comment(format!("BEGIN Move({:?})", p));
        self.commands.push(
            Command::new(Opcode::RAPID_MOVE)
                .with_arg('X', target.x())
                .with_arg('Y', target.y())
                .with_comment(format!("Move to {:?} by {:?}", target, offset)),
        );
        self.current = target;
        self.comment(format!("END Move({:?})", p));
        Ok(self)
    }

    /// Draw line from `p0` to `p1`
    pub fn draw_line(
        &mut self,
        p0: impl Into<AbsolutePos>,
        p1: impl Into<AbsolutePos>,
    ) -> Result<&mut Self> {
        let (p0, p1) = (p0.into(), p1.into());
        self.transaction(|builder| {
            builder.comment(format!("BEGIN DrawLine({:?}, {:?})", p0, p1));
            builder.stroke_begin("DrawLine", p0)?;
            builder.move_to(p1)?;
            builder.stroke_end()?;
            builder.comment(format!("END DrawLine({:?}, {:?})", p0, p1));
            Ok(())
        })
    }

    /// Draw polyline through all points of the path
    ///
    /// Empty path draws nothing, single point path draws a dot.
    pub fn draw_lines(&mut self, path: &[AbsolutePos]) -> Result<&mut Self> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(self);
        };
        self.transaction(|builder| {
            builder.comment(format!("BEGIN DrawLines({:?})", path));
            builder.stroke_begin("DrawLines", *first)?;
            for (index, p) in rest.iter().enumerate() {
                builder.comment(format!("Line {}", index + 1));
                builder.move_to(*p)?;
            }
            builder.stroke_end()?;
            builder.comment(format!("END DrawLines({:?})", path));
            Ok(())
        })
    }

    /// Draw full circle with the center and radius
    ///
    /// Drawing starts and ends at the top of the circle `(center.x, center.y + radius)`.
    pub fn draw_circle(&mut self, center: impl Into<AbsolutePos>, radius: Scalar) -> Result<&mut Self> {
        let center = center.into();
        let start = AbsolutePos::new(center.x(), center.y() + radius);
        self.transaction(|builder| {
            let center_hw = builder.workspace.to_hardware(center)?;
            builder.comment(format!("BEGIN DrawCircle({:?}, {})", center, radius));
            builder.stroke_begin("DrawCircle", start)?;
            let offset = center_hw.relative_to(builder.current);
            builder.commands.push(
                Command::new(Opcode::ARC)
                    .with_arg('I', offset.x())
                    .with_arg('J', offset.y())
                    .with_comment(format!(
                        "Draw circle with center in {:?} and radius {}",
                        center_hw, radius
                    )),
            );
            builder.stroke_end()?;
            builder.comment(format!("END DrawCircle({:?}, {})", center, radius));
            Ok(())
        })
    }

    /// Fill circle with concentric circles spaced by the head size
    pub fn draw_circle_filled(
        &mut self,
        center: impl Into<AbsolutePos>,
        radius: Scalar,
    ) -> Result<&mut Self> {
        let center = center.into();
        let step = self.head_size;
        self.transaction(|builder| {
            builder.comment(format!("BEGIN DrawCircleFilled({:?}, {})", center, radius));
            let passes = fill_passes("DrawCircleFilled", radius, step)?;
            for pass in 0..passes {
                builder.draw_circle(center, radius - pass as Scalar * step)?;
            }
            builder.comment(format!("END DrawCircleFilled({:?}, {})", center, radius));
            Ok(())
        })
    }

    /// Draw clockwise arc of the circle from `start` to `end` angle
    ///
    /// Angles are in radians, `0` points along positive `x` axis and angles
    /// grow counterclockwise.
    pub fn draw_sector(
        &mut self,
        center: impl Into<AbsolutePos>,
        radius: Scalar,
        start: Scalar,
        end: Scalar,
    ) -> Result<&mut Self> {
        let center = center.into();
        let start_pos = center.on_circle(radius, start);
        let end_pos = center.on_circle(radius, end);
        self.transaction(|builder| {
            let center_hw = builder.workspace.to_hardware(center)?;
            let end_hw = builder.workspace.to_hardware(end_pos)?;
            builder.comment(format!(
                "BEGIN DrawSector({:?}, {}, {}, {})",
                center, radius, start, end
            ));
            builder.stroke_begin("DrawSector", start_pos)?;
            let center_offset = center_hw.relative_to(builder.current);
            let end_offset = end_hw.relative_to(builder.current);
            builder.commands.push(
                Command::new(Opcode::ARC)
                    .with_arg('I', center_offset.x())
                    .with_arg('J', center_offset.y())
                    .with_arg('X', end_offset.x())
                    .with_arg('Y', end_offset.y())
                    .with_comment(format!(
                        "Draw sector with center in {:?} ends at {:?}",
                        center_hw, end_hw
                    )),
            );
            builder.current = end_hw;
            builder.stroke_end()?;
            builder.comment(format!(
                "END DrawSector({:?}, {}, {}, {})",
                center, radius, start, end
            ));
            Ok(())
        })
    }

    /// Draw rectangle spanned by two corners
    ///
    /// Visits corners in the order `p1, p1, p0, p0` after starting at `p0`,
    /// machines in the field rely on this exact sequence.
    pub fn draw_rect(
        &mut self,
        p0: impl Into<AbsolutePos>,
        p1: impl Into<AbsolutePos>,
    ) -> Result<&mut Self> {
        let (p0, p1) = (p0.into(), p1.into());
        self.transaction(|builder| {
            builder.comment(format!("BEGIN DrawRect({:?}, {:?})", p0, p1));
            builder.stroke_begin("DrawRect", p0)?;
            for p in [p1, p1, p0, p0] {
                builder.move_to(p)?;
            }
            builder.stroke_end()?;
            builder.comment(format!("END DrawRect({:?}, {:?})", p0, p1));
            Ok(())
        })
    }

    /// Fill rectangle with concentric rectangles inset by the head size
    ///
    /// Corners are normalized first, passes stop once the rectangle degenerates
    /// on either axis.
    pub fn draw_rect_filled(
        &mut self,
        p0: impl Into<AbsolutePos>,
        p1: impl Into<AbsolutePos>,
    ) -> Result<&mut Self> {
        let (p0, p1) = (p0.into(), p1.into());
        let step = self.head_size;
        self.transaction(|builder| {
            builder.comment(format!("BEGIN DrawRectFilled({:?}, {:?})", p0, p1));
            let min = AbsolutePos::new(p0.x().min(p1.x()), p0.y().min(p1.y()));
            let max = AbsolutePos::new(p0.x().max(p1.x()), p0.y().max(p1.y()));
            let extent = (max.x() - min.x()).min(max.y() - min.y()) / 2.0;
            let passes = fill_passes("DrawRectFilled", extent, step)?;
            for pass in 0..passes {
                let offset = pass as Scalar * step;
                let inset = AbsolutePos::new(offset, offset);
                builder.draw_rect(min + inset, max - inset)?;
            }
            builder.comment(format!("END DrawRectFilled({:?}, {:?})", p0, p1));
            Ok(())
        })
    }

    /// Draw cubic bezier curve with a single `G5` command
    ///
    /// `I`/`J` is the first control point relative to `start`, `P`/`Q` is the
    /// second control point relative to `end`, `X`/`Y` is `end` relative to
    /// the current position.
    pub fn draw_bezier_cubic(
        &mut self,
        start: impl Into<AbsolutePos>,
        end: impl Into<AbsolutePos>,
        control1: impl Into<AbsolutePos>,
        control2: impl Into<AbsolutePos>,
    ) -> Result<&mut Self> {
        let (start, end) = (start.into(), end.into());
        let (control1, control2) = (control1.into(), control2.into());
        self.transaction(|builder| {
            let end_hw = builder.workspace.to_hardware(end)?;
            builder.comment(format!(
                "BEGIN DrawBezierCubic({:?}, {:?}, {:?}, {:?})",
                start, end, control1, control2
            ));
            builder.stroke_begin("DrawBezierCubic", start)?;
            let control1_offset = control1 - start;
            let control2_offset = control2 - end;
            let end_offset = end_hw.relative_to(builder.current);
            builder.commands.push(
                Command::new(Opcode::BEZIER_CUBIC)
                    .with_arg('I', control1_offset.x())
                    .with_arg('J', control1_offset.y())
                    .with_arg('P', control2_offset.x())
                    .with_arg('Q', control2_offset.y())
                    .with_arg('X', end_offset.x())
                    .with_arg('Y', end_offset.y())
                    .with_comment(format!("Finish at {:?}", end_hw)),
            );
            builder.current = end_hw;
            builder.stroke_end()?;
            builder.comment(format!(
                "END DrawBezierCubic({:?}, {:?}, {:?}, {:?})",
                start, end, control1, control2
            ));
            Ok(())
        })
    }

    /// Draw cubic bezier curve approximated by `segments` straight lines
    pub fn draw_bezier(
        &mut self,
        segments: usize,
        start: impl Into<AbsolutePos>,
        control1: impl Into<AbsolutePos>,
        control2: impl Into<AbsolutePos>,
        end: impl Into<AbsolutePos>,
    ) -> Result<&mut Self> {
        let (start, end) = (start.into(), end.into());
        let (control1, control2) = (control1.into(), control2.into());
        let points = cubic_flatten(segments, start, control1, control2, end);
        self.transaction(|builder| {
            builder.comment(format!(
                "BEGIN DrawBezier({}, {:?}, {:?}, {:?}, {:?})",
                segments, start, control1, control2, end
            ));
            builder.draw_lines(&points)?;
            builder.comment(format!(
                "END DrawBezier({}, {:?}, {:?}, {:?}, {:?})",
                segments, start, control1, control2, end
            ));
            Ok(())
        })
    }

    /// Return to the origin and replay everything built so far `times` more
    /// times, each pass `step_down` deeper than the previous one
    pub fn repeat(&mut self, times: usize, step_down: Scalar) -> Result<&mut Self> {
        self.transaction(|builder| {
            builder.move_to(AbsolutePos::new(0.0, 0.0))?;
            let pass = builder.commands.clone();
            for _ in 0..times {
                builder.commands.push(
                    Command::new(Opcode::G0)
                        .with_arg('Z', -step_down)
                        .with_comment("Move down and repeat the previous sequence."),
                );
                builder.commands.extend(pass.iter().cloned());
            }
            Ok(())
        })
    }

    /// Go to the start of a stroke and lower the head, or check that the
    /// continuous line is already there
    ///
    /// The positioning move is skipped when the head already sits at `start`.
    fn stroke_begin(&mut self, operation: &'static str, start: AbsolutePos) -> Result<()> {
        let start_hw = self.workspace.to_hardware(start)?;
        let offset = start_hw.relative_to(self.current);
        let at_start =
            offset.x().abs() <= CONTINUITY_EPSILON && offset.y().abs() <= CONTINUITY_EPSILON;
        if self.continuous_line {
            if !at_start {
                return Err(Error::ContinuityMismatch {
                    operation,
                    start,
                    current: self.current(),
                });
            }
        } else {
            if !at_start {
                self.move_to(start)?;
            }
            self.down()?;
        }
        Ok(())
    }

    fn stroke_end(&mut self) -> Result<()> {
        if !self.continuous_line {
            self.up()?;
        }
        Ok(())
    }

    /// Run `body`, restoring the builder to its previous state if it fails
    fn transaction<F>(&mut self, body: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let commands_len = self.commands.len();
        let current = self.current;
        let pen = self.pen;
        let continuous_line = self.continuous_line;
        match body(self) {
            Ok(()) => Ok(self),
            Err(error) => {
                tracing::debug!(
                    "[rollback] {} commands dropped: {}",
                    self.commands.len().saturating_sub(commands_len),
                    error
                );
                self.commands.truncate(commands_len);
                self.current = current;
                self.pen = pen;
                self.continuous_line = continuous_line;
                Err(error)
            }
        }
    }
}

/// Number of passes spaced by `step` that fit into `extent`
///
/// A pass is drawn at every `extent - i * step` that is still positive.
fn fill_passes(operation: &'static str, extent: Scalar, step: Scalar) -> Result<usize> {
    let exact = extent / step;
    // NaN and negative extents give no passes
    let passes = (exact - exact.max(1.0) * FILL_PASS_TOLERANCE).ceil().max(0.0);
    if passes > MAX_FILL_PASSES as Scalar {
        return Err(Error::TooManyPasses { operation, passes });
    }
    Ok(passes as usize)
}

impl fmt::Display for GCodeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serializer::serialize(
            &self.preamble,
            &self.commands,
            &self.postamble,
            self.comments,
        ))
    }
}
