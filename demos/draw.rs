//! Draws a small sample picture and prints resulting G-code to stdout
#![deny(warnings)]

use gcodebuilder::*;
use std::{env, io::Write};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

fn picture(builder: &mut GCodeBuilder) -> Result<(), gcodebuilder::Error> {
    builder
        .comment("frame")
        .draw_rect((0.0, 0.0), (70.0, 70.0))?
        .separator()
        .comment("sun")
        .draw_circle_filled((50.0, 52.0), 6.0)?
        .draw_sector((50.0, 52.0), 10.0, 0.0, PI / 2.0)?
        .separator()
        .comment("house")
        .draw_rect_filled((10.0, 5.0), (30.0, 25.0))?
        .move_to((8.0, 25.0))?
        .begin_continuous_line()?
        .draw_line((8.0, 25.0), (20.0, 35.0))?
        .draw_line((20.0, 35.0), (32.0, 25.0))?
        .end_continuous_line()?
        .separator()
        .comment("hills")
        .draw_bezier_cubic((0.0, 10.0), (40.0, 10.0), (10.0, 20.0), (30.0, 0.0))?
        .draw_bezier(16, (40.0, 10.0), (50.0, 25.0), (60.0, 0.0), (70.0, 10.0))?;

    // same outline through the shape events interface
    let star = [
        (60.0, 30.0),
        (63.0, 39.0),
        (54.0, 33.0),
        (66.0, 33.0),
        (57.0, 39.0),
    ];
    let events = std::iter::once(ShapeEvent::MoveTo(star[0].into()))
        .chain(star[1..].iter().map(|p| ShapeEvent::LineTo((*p).into())))
        .chain(std::iter::once(ShapeEvent::Close))
        .map(Ok::<_, gcodebuilder::Error>);
    builder.consume(events)?;
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let workspace = match args.next() {
        #[cfg(feature = "serde")]
        Some(name) => Workspace::get(&name)?,
        #[cfg(not(feature = "serde"))]
        Some(_) => return Err("workspace presets require `serde` feature".into()),
        None => Workspace::default(),
    };
    tracing::debug!("[workspace] {:?}", workspace);

    let mut builder = GCodeBuilder::new(workspace);
    builder.set_comments(true, true);
    if let Err(error) = tracing::debug_span!("[draw]").in_scope(|| picture(&mut builder)) {
        builder.dump();
        return Err(error.into());
    }

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    write!(stdout, "{}", builder)?;
    Ok(())
}
