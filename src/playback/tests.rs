use super::*;
use crate::{transcribe, RenderConfig, SheetError};
use std::io::Cursor;

struct RecordingSink {
    played: Vec<usize>,
    stopped: bool,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, audio: &PreparedAudio) -> Result<(), SheetError> {
        self.played.push(audio.page);
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

struct RejectingSink;

impl AudioSink for RejectingSink {
    fn play(&mut self, _audio: &PreparedAudio) -> Result<(), SheetError> {
        Err(SheetError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "autoplay blocked",
        )))
    }
}

fn scale_source(count: usize) -> String {
    let notes: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"pitch": "C4", "duration": "e", "time": {}, "velocity": 90}}"#, i as f64 * 0.25))
        .collect();
    format!(r#"{{"title": "Scale", "tempo": 120, "notes": [{}]}}"#, notes.join(","))
}

#[test]
fn test_prepare_page_basic() {
    let sheet = transcribe(&scale_source(4));
    let result = prepare_page(&sheet, 0, &RenderConfig::default());
    assert!(result.is_ok());
    let audio = result.unwrap();

    assert_eq!(audio.page, 0);
    assert_eq!(audio.note_count, 4);
    assert_eq!(audio.tempo, 120.0);
    assert_eq!(audio.sample_rate, 44100);
    // last note: 0.75 + 0.2 seconds
    assert_eq!(audio.sample_count, ((0.75f64 + 0.2) * 44100.0).ceil() as usize);
    assert_eq!(audio.wav.len(), 44 + audio.sample_count * 2);
}

#[test]
fn test_prepare_empty_page() {
    let sheet = transcribe(&scale_source(0));
    let result = prepare_page(&sheet, 0, &RenderConfig::default());
    assert!(matches!(result, Err(SheetError::NoNotesOnPage { page: 0 })));

    let sheet = transcribe(&scale_source(5));
    let result = prepare_page(&sheet, 1, &RenderConfig::default());
    assert!(matches!(result, Err(SheetError::NoNotesOnPage { page: 1 })));
}

#[test]
fn test_second_page_plays_its_own_notes() {
    let sheet = transcribe(&scale_source(33));
    let audio = prepare_page(&sheet, 1, &RenderConfig::default()).unwrap();
    assert_eq!(audio.note_count, 1);
    // Onsets are absolute, so the buffer still spans from time zero
    assert_eq!(audio.sample_count, ((8.0f64 + 0.2) * 44100.0).ceil() as usize);
}

#[test]
fn test_page_audio_includes_unnotated_notes() {
    // 32 notes on one page, 8 measures: everything is both seen and heard
    let sheet = transcribe(&scale_source(32));
    let audio = prepare_page(&sheet, 0, &RenderConfig::default()).unwrap();
    assert_eq!(audio.note_count, 32);
    assert_eq!(crate::engrave_page(crate::page(&sheet.notes, 0)).len(), 8);
}

#[test]
fn test_tempo_override() {
    let sheet = transcribe(&scale_source(1));
    let config = RenderConfig {
        sample_rate: 8000,
        tempo: Some(60.0),
    };
    let audio = prepare_page(&sheet, 0, &config).unwrap();
    assert_eq!(audio.tempo, 60.0);
    // eighth note = 0.2s at 120 BPM, 0.4s at 60
    assert_eq!(audio.sample_count, 3200);
    assert_eq!(audio.duration_secs(), 0.4);
}

#[test]
fn test_wav_decodes() {
    let sheet = transcribe(&scale_source(8));
    let audio = prepare_page(&sheet, 0, &RenderConfig::default()).unwrap();

    let reader = hound::WavReader::new(Cursor::new(audio.wav.clone())).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.len() as usize, audio.sample_count);
}

#[test]
fn test_play_page_reports() {
    let sheet = transcribe(&scale_source(40));
    let mut sink = RecordingSink {
        played: Vec::new(),
        stopped: false,
    };

    let report = play_page(&mut sink, &sheet, 1, &RenderConfig::default()).unwrap();
    assert_eq!(sink.played, vec![1]);
    assert_eq!(report.page_number, 2);
    assert_eq!(report.note_count, 8);
    assert_eq!(report.message(), "Playing 8 notes from page 2 at 120 BPM");

    sink.stop();
    assert!(sink.stopped);
}

#[test]
fn test_play_page_surfaces_sink_failure() {
    let sheet = transcribe(&scale_source(4));
    let before = sheet.clone();

    let result = play_page(&mut RejectingSink, &sheet, 0, &RenderConfig::default());
    match result {
        Err(SheetError::Playback(message)) => assert!(message.contains("autoplay blocked")),
        other => panic!("expected playback error, got {:?}", other),
    }
    assert_eq!(sheet, before);
}

#[test]
fn test_empty_page_never_reaches_sink() {
    let sheet = transcribe(&scale_source(0));
    let mut sink = RecordingSink {
        played: Vec::new(),
        stopped: false,
    };
    let result = play_page(&mut sink, &sheet, 0, &RenderConfig::default());
    assert!(matches!(result, Err(SheetError::NoNotesOnPage { .. })));
    assert!(sink.played.is_empty());
}

#[test]
fn test_far_onset_is_refused() {
    let sheet = transcribe(r#"{"notes": [{"pitch": "C4", "duration": "q", "time": 1e15}]}"#);
    assert_eq!(sheet.notes.len(), 1);

    let result = prepare_page(&sheet, 0, &RenderConfig::default());
    assert!(matches!(
        result,
        Err(SheetError::RenderTooLong { page: 0, limit, .. }) if limit == 60.0
    ));
}

#[test]
fn test_millisecond_onsets_fail_as_playback_notice() {
    // onsets sent in milliseconds instead of seconds
    let sheet = transcribe(
        r#"{"notes": [{"pitch": "C4", "time": 0}, {"pitch": "E4", "time": 150000}]}"#,
    );
    let mut sink = RecordingSink {
        played: Vec::new(),
        stopped: false,
    };

    let result = play_page(&mut sink, &sheet, 0, &RenderConfig::default());
    match result {
        Err(e @ SheetError::RenderTooLong { .. }) => {
            assert!(e.to_string().starts_with("Page 1 audio would last 150000.4 seconds"))
        }
        other => panic!("expected render limit error, got {:?}", other),
    }
    assert!(sink.played.is_empty());
}

#[test]
fn test_slow_override_tempo_hits_the_limit() {
    let sheet = transcribe(&scale_source(1));
    let config = RenderConfig {
        sample_rate: 8000,
        tempo: Some(1.0),
    };
    // an eighth note at 1 BPM lasts 24 seconds, still under the limit
    assert!(prepare_page(&sheet, 0, &config).is_ok());

    let config = RenderConfig {
        sample_rate: 8000,
        tempo: Some(0.25),
    };
    assert!(matches!(
        prepare_page(&sheet, 0, &config),
        Err(SheetError::RenderTooLong { .. })
    ));
}
