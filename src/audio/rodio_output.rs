use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::audio::pcm::PcmClip;
use crate::audio::player::AudioOutput;
use crate::audio::AudioError;

/// Default system output through rodio. The stream is opened on first use
/// and must stay on the thread that opened it.
#[derive(Default)]
pub struct RodioOutput {
    stream: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for RodioOutput {
    fn ensure_ready(&mut self) -> Result<(), AudioError> {
        if self.stream.is_none() {
            let opened =
                OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
            tracing::info!("audio output opened");
            self.stream = Some(opened);
        }
        Ok(())
    }

    fn start(&mut self, clip: PcmClip) -> Result<(), AudioError> {
        let Some((_, handle)) = self.stream.as_ref() else {
            return Err(AudioError::Device("output not opened".into()));
        };

        let sink = Sink::try_new(handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.append(SamplesBuffer::new(clip.channels, clip.sample_rate, clip.samples));
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}
