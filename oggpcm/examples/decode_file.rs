//! Probes an Ogg/Vorbis file and decodes it to raw PCM.
//!
//! Usage: cargo run -p oggpcm --example decode_file -- input.ogg output.pcm

use oggpcm::{decode_to_pcm, probe};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: decode_file <input.ogg> <output.pcm>");
        std::process::exit(2);
    };

    let info = probe(&input)?;
    println!("Sample rate: {} Hz", info.sample_rate);
    println!("Channels: {}", info.channels);

    let summary = decode_to_pcm(&input, &output)?;
    println!(
        "Wrote {} bytes ({} frames, {:.2} s) to {}",
        summary.bytes_written,
        summary.frames,
        summary.frames as f64 / info.sample_rate as f64,
        output
    );
    Ok(())
}
