use std::error::Error;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flame_core::{
    AffineTransformation, Colour, ComputeConfig, ComputeEvent, ComputeListener,
    FireGradientPalette, Flame, FlameBuilder, FlameTransformation, Point, StrategyRegistry,
    Variation, Viewport,
};

const DEFAULT_WIDTH: usize = 800;
const DEFAULT_HEIGHT: usize = 600;
const DEFAULT_DENSITY: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RenderArgs {
    width: usize,
    height: usize,
    density: u32,
}

impl Default for RenderArgs {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            density: DEFAULT_DENSITY,
        }
    }
}

/// Parses `[WIDTHxHEIGHT] [DENSITY]`.
fn parse_args(args: &[String]) -> Result<RenderArgs, String> {
    let mut parsed = RenderArgs::default();

    if let Some(size) = args.first() {
        let (w, h) = size
            .split_once('x')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{size}'"))?;
        parsed.width = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
        parsed.height = h.parse().map_err(|_| format!("invalid height '{h}'"))?;
    }

    if let Some(density) = args.get(1) {
        parsed.density = density
            .parse()
            .map_err(|_| format!("invalid density '{density}'"))?;
    }

    if args.len() > 2 {
        return Err("usage: flame_render [WIDTHxHEIGHT] [DENSITY]".to_string());
    }

    Ok(parsed)
}

fn shark_fin() -> Result<Flame, Box<dyn Error>> {
    let mut builder = FlameBuilder::new();

    builder.add_transformation(&FlameTransformation::new(
        AffineTransformation::new(-0.4113504, -0.7124804, -0.4, 0.7124795, -0.4113508, 0.8),
        &[1.0, 0.1, 0.0, 0.0, 0.0, 0.0],
    )?)?;
    builder.add_transformation(&FlameTransformation::new(
        AffineTransformation::new(-0.3957339, 0.0, -1.6, 0.0, -0.3957337, 0.2),
        &[0.0; 6],
    )?)?;
    builder.set_variation_weight(1, Variation::Horseshoe.index(), 0.8)?;
    builder.set_variation_weight(1, Variation::Bubble.index(), 1.0)?;
    builder.add_transformation(&FlameTransformation::new(
        AffineTransformation::new(0.4810169, 0.0, 1.0, 0.0, 0.4810169, 0.9),
        &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    )?)?;

    Ok(builder.build()?)
}

struct ChannelListener {
    sender: Mutex<Sender<ComputeEvent>>,
}

impl ComputeListener for ChannelListener {
    fn on_event(&self, event: ComputeEvent) {
        if let ComputeEvent::Progress { percent, .. } = event {
            if percent % 10 == 0 {
                info!(percent, "progress");
            }
            return;
        }

        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if sender.send(event).is_err() {
            warn!("render result dropped");
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let computer = StrategyRegistry::default().bind(shark_fin()?, ComputeConfig::from_env());
    let (sender, receiver) = mpsc::channel();
    computer.set_listener(Some(Arc::new(ChannelListener {
        sender: Mutex::new(sender),
    })));

    let viewport = Viewport::new(Point::new(-0.25, 0.0), 5.0, 4.0)?;
    computer.compute(viewport, args.width, args.height, args.density)?;

    match receiver.recv()? {
        ComputeEvent::Completed {
            accumulator,
            elapsed,
            ..
        } => {
            let brightest = accumulator.brightest_cell().map(|(x, y)| {
                let colour = accumulator.color(&FireGradientPalette, Colour::BLACK, x, y);
                (x, y, colour.map(|c| c.to_rgb8()))
            });
            info!(
                strategy = computer.strategy().name(),
                max_hit = accumulator.max_hit(),
                filled_cells = accumulator.filled_cells(),
                total_hits = accumulator.total_hits(),
                elapsed_ms = elapsed.as_millis(),
                ?brightest,
                "render finished"
            );
            Ok(())
        }
        ComputeEvent::Failed { message, .. } => Err(message.into()),
        ComputeEvent::Progress { .. } => Err("unexpected progress event".into()),
    }
}
