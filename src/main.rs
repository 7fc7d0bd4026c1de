use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::bounded;
use log::error;

use moodtune::audio::scheduler::AUTO_STOP_MARGIN_SECONDS;
use moodtune::config::sanitize_volume;
use moodtune::{Config, Melody, PlayOutcome, PlaybackController};

/// Play a short melody generated from a mood phrase.
#[derive(Parser, Debug)]
#[command(name = "moodtune", version)]
struct Cli {
    /// The mood phrase; the same phrase always plays the same tune.
    text: String,

    /// Path to a TOML config file (defaults to ./moodtune.toml).
    #[arg(long)]
    config: Option<String>,

    /// Override the configured master volume (0.0 to 1.0).
    #[arg(long)]
    volume: Option<f32>,

    /// Print the generated melody without opening an audio device.
    #[arg(long)]
    dry_run: bool,
}

fn print_melody(melody: &Melody) {
    let pattern = &melody.pattern;
    println!("\"{}\" -> seed {}", melody.text, melody.seed);
    for (i, (note, offset)) in pattern.notes().iter().zip(pattern.start_offsets()).enumerate() {
        println!("{i:>2}  @{offset:>5.3}s  {note}");
    }
    println!(
        "total {:.3}s, auto-stop at {:.3}s",
        pattern.total_duration(),
        pattern.total_duration() + AUTO_STOP_MARGIN_SECONDS
    );
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref());
    if let Some(volume) = cli.volume {
        config.master_volume = sanitize_volume(volume);
    }

    let melody = Melody::from_text(&cli.text);
    print_melody(&melody);
    if cli.dry_run {
        return ExitCode::SUCCESS;
    }

    let (done_tx, done_rx) = bounded(1);
    let controller = PlaybackController::with_finished_hook(Arc::new(config.device()), move |id| {
        let _ = done_tx.try_send(id);
    });
    match controller.play(&cli.text) {
        Ok(PlayOutcome::Started(_)) | Ok(PlayOutcome::AlreadyPlaying) => {}
        Err(err) => {
            error!("{err}");
            eprintln!("moodtune: {err}");
            return ExitCode::FAILURE;
        }
    }

    // the hook lives as long as the controller, so this only returns once the melody ends
    let _ = done_rx.recv();
    ExitCode::SUCCESS
}
