use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use mediacap::{
    CaptureConfig, CaptureError, CaptureKind, CaptureSessionController, DeviceStreamProvider,
    MediaStream, PcmAudioStream, PixelSnapshot, SurfaceRasterizer, TokioTickScheduler,
};

/// Demo provider: synthesizes a 440 Hz tone in place of a real microphone.
struct ToneProvider;

#[async_trait::async_trait]
impl DeviceStreamProvider for ToneProvider {
    async fn request_stream(
        &self,
        kind: CaptureKind,
    ) -> Result<Box<dyn MediaStream>, CaptureError> {
        if kind != CaptureKind::VoiceAudio {
            return Err(CaptureError::Permission(format!(
                "demo provider only supplies microphone audio, not {:?}",
                kind
            )));
        }

        let (stream, feed) = PcmAudioStream::new(16000, 1);

        tokio::spawn(async move {
            // 100ms frames of a 440 Hz sine at 16 kHz mono.
            let samples_per_frame = 1600;
            let mut phase: f32 = 0.0;
            let step = 440.0 * 2.0 * std::f32::consts::PI / 16000.0;

            while !feed.is_closed() {
                let frame: Vec<i16> = (0..samples_per_frame)
                    .map(|_| {
                        phase += step;
                        (phase.sin() * 8000.0) as i16
                    })
                    .collect();
                feed.push_frame(&frame);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        Ok(Box::new(stream))
    }
}

/// Demo rasterizer: a blank surface (no real UI to snapshot here).
struct BlankRasterizer;

#[async_trait::async_trait]
impl SurfaceRasterizer for BlankRasterizer {
    async fn rasterize(&self) -> Result<PixelSnapshot, CaptureError> {
        Ok(PixelSnapshot::solid(1280, 720, [245, 245, 245, 255]))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = CaptureConfig::load("config/mediacap")?;
    info!(
        "mediacap demo (min selection {}u, chunk slice {}ms)",
        config.min_selection_dim, config.chunk_slice_ms
    );

    let mut controller = CaptureSessionController::new(
        Arc::new(ToneProvider),
        Arc::new(BlankRasterizer),
        Arc::new(TokioTickScheduler),
        config,
    );

    // Scripted voice session: record 2s, pause 1s, record 1 more second.
    let id = controller.start_session(CaptureKind::VoiceAudio).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    controller.pause(id)?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    controller.resume(id)?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let artifact = controller.stop(id)?;
    let snapshot = controller.session_snapshot(id)?;

    info!(
        "captured {} bytes of {} after {}s active recording",
        artifact.len(),
        artifact.mime_type(),
        snapshot.elapsed_seconds
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
