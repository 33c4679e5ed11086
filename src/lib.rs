//! G-code generation for pen plotters and engraving heads built on 3D printers.
//!
//! Main features:
//!  - Type safe drawing, relative and hardware coordinate spaces
//!  - Pen state machine with continuous line drawing
//!  - Lines, circles, sectors, rectangles and bezier curves
//!  - G-code serialization with aligned comments and decoding back into commands
//!
#![deny(warnings)]

mod builder;
mod command;
mod decoder;
mod error;
mod geometry;
mod serializer;
mod shape;
mod utils;
mod workspace;

pub use builder::{DEFAULT_DEPTH, DEFAULT_HEAD_SIZE, GCodeBuilder, MAX_FILL_PASSES, PenState};
pub use command::{Command, CommentFlags, Opcode, collapse_whitespace};
pub use decoder::{Decoder, Positioning, decode};
pub use error::{Error, Result};
pub use geometry::{
    Absolute, AbsolutePos, Axis, Bound, EPSILON, Hardware, HardwareAbsolutePos, PI, Pos, Relative,
    RelativePos, Scalar, scalar_fmt,
};
pub use serializer::{
    COMMENT_DELIMITER, DEFAULT_POSTAMBLE, SECTION_MARKER, align_comments, default_preamble,
    render_commands, serialize,
};
pub use shape::{CurveMode, ShapeEvent};
pub use workspace::{DEFAULT_WORKSPACE, Workspace};
