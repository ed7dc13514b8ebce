//! Headless pacing demo.
//!
//! Generates a sine test tone one frame at a time, paces it to the selected
//! TV standard with `wait_for_vbi`, and reports the achieved frame rate.

use std::f32::consts::TAU;
use std::time::Instant;

use audio_fragments::{AudioOutput, FragmentConfig, fragment_ring};
use frame_pacer::{HostClock, RefreshRates, TvStandard, VbiPacer};

const SAMPLE_RATE: u32 = 44_100;
const TONE_HZ: f32 = 440.0;

struct Cli {
    standard: TvStandard,
    frames: u32,
    full_speed: bool,
    audio: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            standard: TvStandard::Pal,
            frames: 500,
            full_speed: false,
            audio: true,
        }
    }
}

fn parse_args() -> Cli {
    let mut cli = Cli::default();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--standard" => {
                i += 1;
                cli.standard = match args.get(i).map(String::as_str) {
                    Some("ntsc") => TvStandard::Ntsc,
                    _ => TvStandard::Pal,
                };
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(500);
                }
            }
            "--full-speed" => cli.full_speed = true,
            "--no-audio" => cli.audio = false,
            "--help" | "-h" => {
                println!("Usage: frame-pacer [options]");
                println!("  --standard <pal|ntsc>  TV standard [default: pal]");
                println!("  --frames <n>           Frames to run [default: 500]");
                println!("  --full-speed           Disable throttling");
                println!("  --no-audio             Skip audio output");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    cli
}

fn main() {
    let cli = parse_args();

    let rates = RefreshRates::default();
    let refresh_hz = rates.target_hz(cli.standard);
    let samples_per_frame = (SAMPLE_RATE / refresh_hz) as usize;

    let mut pacer = VbiPacer::new(HostClock::new());
    if !pacer.examine() {
        eprintln!("Host clock source is unusable, cannot pace");
        std::process::exit(1);
    }
    pacer.reset(cli.standard);
    pacer.set_full_speed(cli.full_speed);

    let config = FragmentConfig::for_refresh_rate(SAMPLE_RATE, refresh_hz, 2, 8);
    let (mut producer, consumer) = fragment_ring(config);
    let output = if cli.audio {
        let output = AudioOutput::new(SAMPLE_RATE, consumer);
        if output.is_none() {
            eprintln!("Warning: no audio device available, running silent");
        }
        output
    } else {
        None
    };
    let audio_active = output.is_some();

    let mut phase = 0.0f32;
    let mut samples = vec![0.0f32; samples_per_frame];
    let start = Instant::now();

    for _ in 0..cli.frames {
        for sample in &mut samples {
            *sample = 0.25 * phase.sin();
            phase = (phase + TAU * TONE_HZ / SAMPLE_RATE as f32) % TAU;
        }
        if audio_active {
            producer.write_samples(&samples);
            producer.end_frame();
            pacer.wait_for_vbi(Some(&mut producer));
        } else {
            pacer.wait_for_vbi(None);
        }
    }

    let elapsed = start.elapsed();
    let fps = f64::from(cli.frames) / elapsed.as_secs_f64();
    println!(
        "{} frames in {:.2}s ({fps:.2} fps, target {refresh_hz} Hz{})",
        cli.frames,
        elapsed.as_secs_f64(),
        if cli.full_speed { ", unthrottled" } else { "" }
    );
}
