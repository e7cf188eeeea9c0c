//! One text turn answered with audio, written to a 24 kHz mono WAV file.

use gemini_samples::driver::Driver;
use gemini_samples::v1beta::live::{Error, InlineData};
use gemini_samples::v1beta::session::{Pcm16Decoder, TurnHandler};
use gemini_samples::v1beta::ResponseModality;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use tracing::{debug, warn};

#[path = "common/utils.rs"]
mod utils;

const SAMPLE_RATE: u32 = 24_000;

struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    decoder: Pcm16Decoder,
}

impl TurnHandler for WavSink {
    fn on_audio(&mut self, audio: &InlineData) -> Result<(), Error> {
        debug!(mime_type = audio.mime_type(), bytes = audio.data().len(), "audio chunk");
        for sample in self.decoder.decode(audio.data()) {
            self.writer
                .write_sample(sample)
                .map_err(|e| Error::Handler(Box::new(e)))?;
        }
        Ok(())
    }

    fn on_transcription(&mut self, text: &str) -> Result<(), Error> {
        print!("{text}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let model = utils::model("GEMINI_LIVE_MODEL", "gemini-2.0-flash-exp");

    let dir = driver.config().output_dir().clone();
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("audio.wav");

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut sink = WavSink {
        writer: WavWriter::create(&path, spec)?,
        decoder: Pcm16Decoder::default(),
    };

    let summary = driver
        .live_turn(
            &model,
            vec![ResponseModality::Audio],
            "Hello? Gemini are you there?",
            &mut sink,
        )
        .await?;
    if sink.decoder.pending().is_some() {
        warn!("audio ended mid-sample, dropping the last byte");
    }
    sink.writer.finalize()?;

    println!(
        "saved {} ({} chunks, {} bytes)",
        path.display(),
        summary.audio_chunks,
        summary.audio_bytes
    );
    Ok(())
}
