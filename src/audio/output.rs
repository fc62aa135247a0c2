//! Plays effects through the default output device: a `cpal` stream driving an `oddio` mixer,
//! with the MP3 assets decoded up front by `symphonia`.

use std::path::Path;
use std::sync::Arc;

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Stream,
};
use oddio::{Frames, FramesSignal, Handle, Mixer, Stop};
use symphonia::core::{audio::SampleBuffer, io::MediaSourceStream, probe::Hint};

use super::{AudioError, AudioSettings, SoundEffect, SoundSink};

type StereoFrames = Arc<Frames<[f32; 2]>>;
type VoiceHandle = Handle<Stop<FramesSignal<[f32; 2]>>>;

pub struct OutputSink {
    mixer_handle: Handle<Mixer<[f32; 2]>>,
    // Dropping the stream silences everything, so it lives as long as the sink.
    _stream: Stream,
    sounds: [Option<StereoFrames>; SoundEffect::COUNT],
    voices: [Option<VoiceHandle>; SoundEffect::COUNT],
}

impl OutputSink {
    /// Opens the default output device and loads every effect. An effect whose file can't be
    /// read or decoded is left out; only a device failure is an error.
    pub fn open(settings: &AudioSettings) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "<unnamed>".to_string()),
            "using default audio device"
        );
        let sample_rate = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?
            .sample_rate();
        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        tracing::debug!(?config, "cpal stream config");

        let (mixer_handle, mixer) = oddio::split(oddio::Mixer::new());

        let stream = device
            .build_output_stream(
                &config,
                move |out_flat: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let out_stereo: &mut [[f32; 2]] = oddio::frame_stereo(out_flat);
                    oddio::run(&mixer, sample_rate.0, out_stereo);
                },
                |err| tracing::warn!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        let sounds = SoundEffect::ALL.map(|effect| {
            let path = settings.asset_path(effect);
            match load_effect(&path, settings.volume) {
                Ok(frames) => Some(frames),
                Err(err) => {
                    tracing::warn!(effect = ?effect, "sound unavailable: {err}");
                    None
                }
            }
        });

        Ok(Self {
            mixer_handle,
            _stream: stream,
            sounds,
            voices: Default::default(),
        })
    }

    fn start(&mut self, effect: SoundEffect) -> Result<&mut VoiceHandle, AudioError> {
        let slot = effect.slot();
        let frames = self.sounds[slot]
            .clone()
            .ok_or(AudioError::MissingAsset(effect))?;
        if let Some(mut previous) = self.voices[slot].take() {
            previous.control::<Stop<_>, _>().stop();
        }
        let signal = FramesSignal::from(frames);
        let handle = self.mixer_handle.control().play(signal);
        Ok(self.voices[slot].insert(handle))
    }
}

impl SoundSink for OutputSink {
    fn play(&mut self, effect: SoundEffect) -> Result<(), AudioError> {
        self.start(effect).map(|_| ())
    }

    fn prime(&mut self, effect: SoundEffect) -> Result<(), AudioError> {
        let voice = self.start(effect)?;
        voice.control::<Stop<_>, _>().stop();
        Ok(())
    }
}

fn load_effect(path: &Path, volume: f32) -> Result<StereoFrames, AudioError> {
    let bytes = std::fs::read(path).map_err(|source| AudioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (samples, channels, sample_rate) =
        decode_mp3(bytes).map_err(|reason| AudioError::Decode {
            path: path.to_path_buf(),
            reason,
        })?;
    let stereo = to_stereo(&samples, channels, volume);
    Ok(oddio::Frames::from_slice(sample_rate, &stereo))
}

/// Interleaved samples, channel count and sample rate.
fn decode_mp3(mp3_bytes: Vec<u8>) -> Result<(Vec<f32>, usize, u32), String> {
    let cursor = Box::new(std::io::Cursor::new(mp3_bytes));
    let mss = MediaSourceStream::new(cursor, Default::default());
    let mut hint = Hint::new();
    hint.with_extension("mp3");
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &Default::default(), &Default::default())
        .map_err(|e| e.to_string())?;

    let mut reader = probed.format;
    let track = reader
        .default_track()
        .ok_or_else(|| "no audio track".to_string())?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &Default::default())
        .map_err(|e| e.to_string())?;
    let sample_rate = decoder
        .codec_params()
        .sample_rate
        .ok_or_else(|| "unknown sample rate".to_string())?;

    let mut samples: Vec<f32> = Vec::new();
    let mut channels = 1;

    // Stop at the first read error; for a complete file that is the end of stream.
    while let Ok(packet) = reader.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                channels = decoded.spec().channels.count();
                let mut sample_buf =
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                sample_buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(sample_buf.samples());
            }
            Err(err) => {
                tracing::debug!("stopping decode early: {err}");
                break;
            }
        }
    }

    if samples.is_empty() {
        return Err("no samples decoded".to_string());
    }
    Ok((samples, channels, sample_rate))
}

/// Folds interleaved samples into scaled stereo frames. Mono is duplicated to both sides and
/// anything past the second channel is dropped.
fn to_stereo(samples: &[f32], channels: usize, volume: f32) -> Vec<[f32; 2]> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().map(|&s| [s * volume; 2]).collect(),
        n => samples
            .chunks_exact(n)
            .map(|frame| [frame[0] * volume, frame[1] * volume])
            .collect(),
    }
}
