//! Drawing of shapes delivered by an external producer
//!
//! Producers (e.g. an SVG path walker) yield a stream of [`ShapeEvent`]s,
//! the end of the stream finishes the drawing and the first error aborts it.
use crate::{AbsolutePos, Error, GCodeBuilder, Result, Scalar};

/// Single step of the shape outline in the drawing space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeEvent {
    /// Start new sub-path at the point
    MoveTo(AbsolutePos),
    /// Straight line from the current position
    LineTo(AbsolutePos),
    /// Cubic bezier curve from the current position
    CubicTo {
        control1: AbsolutePos,
        control2: AbsolutePos,
        end: AbsolutePos,
    },
    /// Standalone circle
    Circle { center: AbsolutePos, radius: Scalar },
    /// Line back to the start of the current sub-path
    Close,
    /// Fill request, not supported by the head
    Paint,
}

impl ShapeEvent {
    /// Scale all coordinates of the event
    pub fn scale(self, factor: Scalar) -> Self {
        use ShapeEvent::*;
        match self {
            MoveTo(p) => MoveTo(factor * p),
            LineTo(p) => LineTo(factor * p),
            CubicTo {
                control1,
                control2,
                end,
            } => CubicTo {
                control1: factor * control1,
                control2: factor * control2,
                end: factor * end,
            },
            Circle { center, radius } => Circle {
                center: factor * center,
                radius: factor * radius,
            },
            Close => Close,
            Paint => Paint,
        }
    }
}

/// How cubic curves of the shape events are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveMode {
    /// Single `G5` command per curve
    #[default]
    Bezier,
    /// Polyline with the number of segments
    Flatten(usize),
}

impl GCodeBuilder {
    /// Draw all shape events until the producer is exhausted
    pub fn consume<I, E>(&mut self, events: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = std::result::Result<ShapeEvent, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.consume_with(events, 1.0, CurveMode::default())
    }

    /// Same as [`GCodeBuilder::consume`] with every coordinate multiplied by `scale`
    pub fn consume_scaled<I, E>(&mut self, events: I, scale: Scalar) -> Result<&mut Self>
    where
        I: IntoIterator<Item = std::result::Result<ShapeEvent, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.consume_with(events, scale, CurveMode::default())
    }

    /// Draw shape events scaled by `scale` with curves drawn according to `curves`
    ///
    /// Events are drawn inside of a continuous line, it is restarted on every
    /// sub-path and around circles. Commands drawn before an error are kept,
    /// but the continuous line is finished and the head is raised.
    pub fn consume_with<I, E>(
        &mut self,
        events: I,
        scale: Scalar,
        curves: CurveMode,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = std::result::Result<ShapeEvent, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.comment("Drawing paths");
        self.begin_continuous_line()?;
        let result = self.consume_events(events, scale, curves);
        if self.continuous_line {
            if result.is_err() {
                tracing::debug!("[consume] aborted, finishing continuous line");
            }
            self.end_continuous_line()?;
        }
        result?;
        Ok(self)
    }

    fn consume_events<I, E>(&mut self, events: I, scale: Scalar, curves: CurveMode) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<ShapeEvent, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut subpath_start = self.current();
        for (index, event) in events.into_iter().enumerate() {
            let event = event.map_err(|error| Error::Producer(error.into()))?;
            let event = event.scale(scale);
            tracing::debug!("[consume:{}] {:?}", index, event);
            match event {
                ShapeEvent::MoveTo(p) => {
                    self.end_continuous_line()?;
                    self.move_to(p)?;
                    self.begin_continuous_line()?;
                    subpath_start = p;
                }
                ShapeEvent::LineTo(p) => {
                    let current = self.current();
                    self.draw_line(current, p)?;
                }
                ShapeEvent::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    let current = self.current();
                    match curves {
                        CurveMode::Bezier => {
                            self.draw_bezier_cubic(current, end, control1, control2)?
                        }
                        CurveMode::Flatten(segments) => {
                            self.draw_bezier(segments, current, control1, control2, end)?
                        }
                    };
                }
                ShapeEvent::Circle { center, radius } => {
                    self.end_continuous_line()?;
                    self.draw_circle(center, radius)?;
                    self.begin_continuous_line()?;
                    subpath_start = self.current();
                }
                ShapeEvent::Close => {
                    let current = self.current();
                    self.draw_line(current, subpath_start)?;
                }
                ShapeEvent::Paint => {
                    tracing::warn!("[consume:{}] paint is not supported, ignored", index);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, Opcode, Workspace};

    fn code(builder: &GCodeBuilder) -> Vec<String> {
        builder
            .commands()
            .iter()
            .filter(|cmd| !cmd.is_comment_only())
            .map(|cmd| cmd.render(crate::CommentFlags::NONE))
            .collect()
    }

    #[test]
    fn test_consume_path() -> Result<()> {
        let mut b = GCodeBuilder::new(Workspace::new(80, 80, 160, 160));
        let events = vec![
            ShapeEvent::MoveTo(AbsolutePos::new(1.0, 1.0)),
            ShapeEvent::LineTo(AbsolutePos::new(5.0, 1.0)),
            ShapeEvent::LineTo(AbsolutePos::new(5.0, 5.0)),
            ShapeEvent::Paint,
            ShapeEvent::Close,
        ];
        b.consume(events.into_iter().map(Ok::<_, Error>))?;
        assert!(!b.is_continuous_line());
        assert_eq!(
            code(&b),
            vec![
                "G0 Z-20.000000",
                "G0 Z20.000000",
                "G0 X81.000000 Y81.000000",
                "G0 Z-20.000000",
                "G0 X85.000000 Y81.000000",
                "G0 X85.000000 Y85.000000",
                "G0 X81.000000 Y81.000000",
                "G0 Z20.000000",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_consume_scaled() -> Result<()> {
        let mut b = GCodeBuilder::new(Workspace::new(80, 80, 160, 160));
        let events = [
            ShapeEvent::Circle {
                center: AbsolutePos::new(5.0, 5.0),
                radius: 1.0,
            },
            ShapeEvent::CubicTo {
                control1: AbsolutePos::new(5.0, 7.0),
                control2: AbsolutePos::new(7.0, 7.0),
                end: AbsolutePos::new(7.0, 6.0),
            },
        ];
        b.consume_scaled(events.into_iter().map(Ok::<_, Error>), 2.0)?;
        let arcs: Vec<&Command> = b
            .commands()
            .iter()
            .filter(|cmd| cmd.opcode() == &Opcode::G2)
            .collect();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].arg('J'), Some(-2.0));
        // circle starts and ends at the top, the curve continues from there
        assert_eq!(b.current(), AbsolutePos::new(14.0, 12.0));
        Ok(())
    }

    #[test]
    fn test_consume_producer_error() {
        let mut b = GCodeBuilder::new(Workspace::new(80, 80, 160, 160));
        let events: Vec<std::result::Result<ShapeEvent, String>> = vec![
            Ok(ShapeEvent::LineTo(AbsolutePos::new(3.0, 0.0))),
            Err("broken path".to_owned()),
            Ok(ShapeEvent::LineTo(AbsolutePos::new(6.0, 0.0))),
        ];
        match b.consume(events) {
            Err(Error::Producer(error)) => assert_eq!(error.to_string(), "broken path"),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
        // nothing after the error is drawn, the head is raised
        assert_eq!(b.current(), AbsolutePos::new(3.0, 0.0));
        assert_eq!(b.pen(), crate::PenState::Up);
        assert!(!b.is_continuous_line());
    }

    #[test]
    fn test_consume_failed_primitive() -> Result<()> {
        let mut b = GCodeBuilder::new(Workspace::new(80, 80, 160, 160));
        let events = [
            ShapeEvent::MoveTo(AbsolutePos::new(1.0, 1.0)),
            ShapeEvent::LineTo(AbsolutePos::new(500.0, 1.0)),
        ];
        assert!(matches!(
            b.consume(events.into_iter().map(Ok::<_, Error>)),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(b.pen(), crate::PenState::Up);
        assert!(!b.is_continuous_line());
        assert!(code(&b).last().is_some_and(|cmd| cmd == "G0 Z20.000000"));

        // builder is usable again
        let events = [ShapeEvent::LineTo(AbsolutePos::new(2.0, 1.0))];
        b.consume(events.into_iter().map(Ok::<_, Error>))?;
        assert_eq!(b.current(), AbsolutePos::new(2.0, 1.0));
        assert_eq!(b.pen(), crate::PenState::Up);
        Ok(())
    }

    #[test]
    fn test_consume_flattened() -> Result<()> {
        let mut b = GCodeBuilder::new(Workspace::new(80, 80, 160, 160));
        let events = [ShapeEvent::CubicTo {
            control1: AbsolutePos::new(0.0, 4.0),
            control2: AbsolutePos::new(4.0, 4.0),
            end: AbsolutePos::new(4.0, 0.0),
        }];
        b.consume_with(
            events.into_iter().map(Ok::<_, Error>),
            1.0,
            CurveMode::Flatten(4),
        )?;
        let code = code(&b);
        assert!(code.iter().all(|line| !line.starts_with("G5")));
        // down, four segments, up
        assert_eq!(code.len(), 6);
        assert_eq!(code[4], "G0 X84.000000 Y80.000000");
        assert_eq!(b.current(), AbsolutePos::new(4.0, 0.0));
        Ok(())
    }
}
