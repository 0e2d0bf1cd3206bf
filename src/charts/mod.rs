//! Charts module - Figure model, colours and rendering

mod palette;
mod plotter;
mod renderer;

pub use palette::{resolve_color, ColorMap, Palette, PALETTE};
pub use plotter::{BarGroup, Figure, Marker, Panel, PanelBody, Series};
pub use renderer::{RenderError, StaticChartRenderer};
