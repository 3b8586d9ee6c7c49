use std::{cell::Cell, path::PathBuf, rc::Rc};

use anyhow::Context;
use chip8_vm_core::{Chip8Builder, RunConfig, Runner, ThreadScheduler};
use clap::Parser;

mod audio;
mod color;
mod input;
mod render;

use audio::SdlAudio;
use color::{Chip8Color, Palette};
use input::SdlInput;
use render::SdlRenderer;

/// CHIP-8 Emulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file that will be executed
    #[clap(index = 1)]
    rom: PathBuf,

    /// Filepath to an 80 byte font file
    #[clap(long)]
    font: Option<PathBuf>,

    /// Background Color as HEX 0xAABBFF [default: 0x000000]
    #[clap(long)]
    background: Option<Chip8Color>,

    /// Foreground Color as HEX 0xAABBFF [default: 0xFFFFFF]
    #[clap(long)]
    foreground: Option<Chip8Color>,

    /// Display scaling factor
    #[clap(short, long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..=100))]
    scale: u32,

    /// Instructions per second
    #[clap(short, long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..=1_000_000))]
    ips: u32,

    /// Delay and sound timer rate
    #[clap(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1_000))]
    timer_hz: u32,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Log every executed instruction
    #[clap(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    run(args).inspect_err(|err| log::error!("{:#}", err))
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut builder = Chip8Builder::new();

    let rom_data = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM file {}", args.rom.display()))?;
    builder = builder.with_rom(rom_data);

    if let Some(font) = &args.font {
        let font_data = std::fs::read(font)
            .with_context(|| format!("failed to read font file {}", font.display()))?;
        builder = builder.with_font(font_data);
    }

    if let Some(seed) = args.seed {
        builder = builder.with_rng_seed(seed);
    }

    let mut palette = Palette::default();
    if let Some(foreground) = args.foreground {
        palette.foreground = foreground;
    }
    if let Some(background) = args.background {
        palette.background = background;
    }
    let palette = Rc::new(Cell::new(palette));

    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;
    let audio_subsystem = sdl_context.audio().map_err(anyhow::Error::msg)?;

    let audio = SdlAudio::new(&audio_subsystem).context("failed to open audio device")?;
    let chip = builder
        .with_beeper(Box::new(audio.beeper()))
        .with_debug(args.debug)
        .build()
        .context("failed to load ROM")?;

    let canvas = render::create_canvas(&video_subsystem, args.scale, palette.get().background)
        .context("failed to create window")?;
    let texture_creator = canvas.texture_creator();
    let renderer = SdlRenderer::new(canvas, &texture_creator, palette.clone())
        .context("failed to create display texture")?;
    let event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;
    let input = SdlInput::new(event_pump, palette);

    let config = RunConfig {
        cycle_hz: args.ips,
        timer_hz: args.timer_hz,
    };
    let mut runner = Runner::new(chip, renderer, input, ThreadScheduler, config)?;
    runner.run()?;
    Ok(())
}
