//! Format layer creation

use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{Layer, Registry};

use crate::config::{Config, Format};

pub(crate) type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Applies the display options shared by every format and boxes the layer.
macro_rules! finish_layer {
    ($layer:expr, $display:expr) => {{
        let layer = $layer
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source);
        if $display.time {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    }};
}

/// Builds the formatting layer for `config`, writing to `writer`.
pub(crate) fn make_layer<W>(config: &Config, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let display = &config.display;
    match config.format {
        Format::Pretty => finish_layer!(fmt::layer().pretty().with_writer(writer), display),
        Format::Compact => finish_layer!(fmt::layer().compact().with_writer(writer), display),
        Format::Json => finish_layer!(
            fmt::layer()
                .json()
                .with_current_span(true)
                .flatten_event(display.flatten)
                .with_writer(writer),
            display
        ),
    }
}
