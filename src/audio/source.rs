//! Turning a stream URL into a decoded `rodio` source.
//!
//! Streams are fetched whole (HTTP(S) via `reqwest`, anything else as a
//! local path) and decoded from memory.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use lofty::probe::Probe;
use rodio::{Decoder, Source};

use crate::catalog::is_remote;

use super::types::AudioError;

pub(super) struct LoadedStream {
    pub decoder: Decoder<Cursor<Vec<u8>>>,
    pub duration: Option<Duration>,
}

pub(super) fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, AudioError> {
    if is_remote(url) {
        let resp = client
            .get(url)
            .send()
            .map_err(|e| AudioError::Fetch(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AudioError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().map_err(|e| AudioError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    } else {
        let path = url.strip_prefix("file://").unwrap_or(url);
        std::fs::read(Path::new(path)).map_err(|e| AudioError::Io(e.to_string()))
    }
}

pub(super) fn decode(bytes: Vec<u8>) -> Result<LoadedStream, AudioError> {
    // Probe before handing the buffer to the decoder; many MP3 decoders
    // can't tell their length up front.
    let probed = probe_duration(&bytes);

    let decoder =
        Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::Decode(e.to_string()))?;
    let duration = decoder.total_duration().or(probed);

    Ok(LoadedStream { decoder, duration })
}

fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration()).filter(|d| !d.is_zero())
}

/// A silent 16-bit mono PCM WAV file, `secs` long.
#[cfg(test)]
pub(super) fn silent_wav(sample_rate: u32, secs: u32) -> Vec<u8> {
    let data_len = sample_rate * secs * 2;
    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn near(actual: Option<Duration>, expected: Duration) -> bool {
        actual.is_some_and(|d| d.abs_diff(expected) <= Duration::from_millis(50))
    }

    #[test]
    fn decode_reports_wav_duration() {
        let loaded = decode(silent_wav(8_000, 1)).expect("wav decodes");
        assert!(near(loaded.duration, Duration::from_secs(1)));
    }

    #[test]
    fn probe_finds_duration_without_decoder() {
        assert!(near(
            probe_duration(&silent_wav(8_000, 2)),
            Duration::from_secs(2)
        ));
        assert_eq!(probe_duration(b"not audio"), None);
    }

    #[test]
    fn decode_rejects_garbage() {
        let garbage = b"this is not an audio stream at all".repeat(64);
        assert!(matches!(decode(garbage), Err(AudioError::Decode(_))));
    }

    #[test]
    fn fetch_reads_local_and_file_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"bytes on disk").unwrap();
        let path = file.path().display().to_string();
        let client = reqwest::blocking::Client::new();

        assert_eq!(fetch(&client, &path).unwrap(), b"bytes on disk");
        assert_eq!(
            fetch(&client, &format!("file://{path}")).unwrap(),
            b"bytes on disk"
        );
    }

    #[test]
    fn fetch_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.mp3").display().to_string();
        let client = reqwest::blocking::Client::new();

        assert!(matches!(fetch(&client, &missing), Err(AudioError::Io(_))));
        assert!(matches!(
            fetch(&client, &format!("file://{missing}")),
            Err(AudioError::Io(_))
        ));
    }
}
