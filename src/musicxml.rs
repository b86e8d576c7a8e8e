use quick_xml::escape::escape;

use crate::engrave::{render_page, StaffRenderer, StaveLayout, Tickable, BEATS_PER_MEASURE};
use crate::error::SheetError;
use crate::note::Pitch;
use crate::paginate::page;
use crate::sheet::SheetMusic;

/// Convert one page of a sheet to MusicXML
pub fn page_to_musicxml(sheet: &SheetMusic, page_index: usize) -> String {
    let mut renderer = MusicXmlRenderer::new(key_fifths(&sheet.key_signature));
    render_page(&mut renderer, page(&sheet.notes, page_index));
    renderer.finish(&sheet.title)
}

/// A [`StaffRenderer`] that writes MusicXML measures
pub struct MusicXmlRenderer {
    fifths: i8,
    measures: String,
    count: usize,
}

impl MusicXmlRenderer {
    pub fn new(fifths: i8) -> Self {
        Self {
            fifths,
            measures: String::new(),
            count: 0,
        }
    }

    /// Number of measures written so far
    pub fn measure_count(&self) -> usize {
        self.count
    }

    /// Wrap the measures in a partwise score document.
    pub fn finish(self, title: &str) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
        xml.push('\n');
        xml.push_str(r#"<score-partwise version="4.0">"#);
        xml.push('\n');

        xml.push_str("  <work>\n");
        xml.push_str(&format!("    <work-title>{}</work-title>\n", escape(title)));
        xml.push_str("  </work>\n");

        xml.push_str("  <part-list>\n");
        xml.push_str("    <score-part id=\"P1\">\n");
        xml.push_str("      <part-name print-object=\"no\"></part-name>\n");
        xml.push_str("    </score-part>\n");
        xml.push_str("  </part-list>\n");

        xml.push_str("  <part id=\"P1\">\n");
        xml.push_str(&self.measures);
        xml.push_str("  </part>\n");
        xml.push_str("</score-partwise>\n");

        xml
    }

    fn attributes(&self) -> String {
        let mut xml = String::new();
        xml.push_str("      <attributes>\n");
        xml.push_str("        <divisions>1</divisions>\n"); // one division per quarter note
        xml.push_str("        <key>\n");
        xml.push_str(&format!("          <fifths>{}</fifths>\n", self.fifths));
        xml.push_str("        </key>\n");
        xml.push_str("        <time>\n");
        xml.push_str("          <beats>4</beats>\n");
        xml.push_str("          <beat-type>4</beat-type>\n");
        xml.push_str("        </time>\n");
        xml.push_str("        <clef>\n");
        xml.push_str("          <sign>G</sign>\n");
        xml.push_str("          <line>2</line>\n");
        xml.push_str("        </clef>\n");
        xml.push_str("      </attributes>\n");
        xml
    }
}

impl StaffRenderer for MusicXmlRenderer {
    fn draw_measure(
        &mut self,
        layout: &StaveLayout,
        ticks: &[Tickable; BEATS_PER_MEASURE],
    ) -> Result<(), SheetError> {
        let mut xml = String::new();
        xml.push_str(&format!(
            "    <measure number=\"{}\" width=\"{}\">\n",
            layout.index + 1,
            layout.width
        ));

        if layout.index > 0 && layout.column == 0 {
            xml.push_str("      <print new-system=\"yes\"/>\n");
        }
        if layout.index == 0 {
            xml.push_str(&self.attributes());
        }

        for tick in ticks {
            match tick {
                Tickable::Note {
                    pitch, accidental, ..
                } => xml.push_str(&note_to_xml(pitch, accidental.is_some())),
                Tickable::Rest => xml.push_str(&rest_to_xml()),
            }
        }

        xml.push_str("    </measure>\n");

        self.measures.push_str(&xml);
        self.count += 1;
        Ok(())
    }
}

fn note_to_xml(pitch: &Pitch, show_accidental: bool) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");
    xml.push_str("        <pitch>\n");
    xml.push_str(&format!("          <step>{}</step>\n", pitch.name.step()));
    if pitch.alter() != 0 {
        xml.push_str(&format!("          <alter>{}</alter>\n", pitch.alter()));
    }
    xml.push_str(&format!("          <octave>{}</octave>\n", pitch.octave));
    xml.push_str("        </pitch>\n");
    xml.push_str("        <duration>1</duration>\n");
    xml.push_str("        <type>quarter</type>\n");
    if show_accidental {
        xml.push_str("        <accidental>sharp</accidental>\n");
    }
    xml.push_str("      </note>\n");

    xml
}

fn rest_to_xml() -> String {
    let mut xml = String::new();
    xml.push_str("      <note>\n");
    xml.push_str("        <rest/>\n");
    xml.push_str("        <duration>1</duration>\n");
    xml.push_str("        <type>quarter</type>\n");
    xml.push_str("      </note>\n");
    xml
}

/// Circle-of-fifths position for a key signature like "G", "Bb", "F#m" or
/// "E minor". Unknown keys are drawn without sharps or flats.
pub fn key_fifths(key: &str) -> i8 {
    let trimmed = key.trim();
    let (tonic, minor) = if let Some(t) = trimmed.strip_suffix(" minor") {
        (t, true)
    } else if let Some(t) = trimmed.strip_suffix(" major") {
        (t, false)
    } else if let Some(t) = trimmed.strip_suffix('m').filter(|t| !t.is_empty()) {
        (t, true)
    } else {
        (trimmed, false)
    };

    if minor {
        match tonic {
            "A" => 0,
            "E" => 1,
            "B" => 2,
            "F#" => 3,
            "C#" => 4,
            "G#" => 5,
            "D#" => 6,
            "A#" => 7,
            "D" => -1,
            "G" => -2,
            "C" => -3,
            "F" => -4,
            "Bb" => -5,
            "Eb" => -6,
            "Ab" => -7,
            _ => 0,
        }
    } else {
        match tonic {
            "C" => 0,
            "G" => 1,
            "D" => 2,
            "A" => 3,
            "E" => 4,
            "B" => 5,
            "F#" => 6,
            "C#" => 7,
            "F" => -1,
            "Bb" => -2,
            "Eb" => -3,
            "Ab" => -4,
            "Db" => -5,
            "Gb" => -6,
            "Cb" => -7,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    fn sheet(pitches: &[&str]) -> SheetMusic {
        let notes: Vec<_> = pitches
            .iter()
            .enumerate()
            .map(|(i, p)| json!({ "pitch": p, "duration": "q", "time": i as f64 * 0.5 }))
            .collect();
        validate(&json!({ "title": "Fish & Chips", "keySignature": "G", "notes": notes }))
    }

    #[test]
    fn test_basic_musicxml_output() {
        let xml = page_to_musicxml(&sheet(&["C4", "D4", "E4", "F#4", "G4"]), 0);
        assert!(xml.contains("<score-partwise"));
        assert!(xml.contains("<work-title>Fish &amp; Chips</work-title>"));
        assert!(xml.contains("<fifths>1</fifths>"));
        assert!(xml.contains("<step>C</step>"));
        assert!(xml.contains("<alter>1</alter>"));
        assert!(xml.contains("<accidental>sharp</accidental>"));
        assert_eq!(xml.matches("<measure number=").count(), 2);
        assert!(xml.contains("<measure number=\"2\" width=\"170\">"));
        // 5 notes + 3 padding rests
        assert_eq!(xml.matches("<note>").count(), 8);
        assert_eq!(xml.matches("<rest/>").count(), 3);
    }

    #[test]
    fn test_second_row_starts_new_system() {
        let pitches = vec!["A4"; 32];
        let xml = page_to_musicxml(&sheet(&pitches), 0);
        assert_eq!(xml.matches("<measure number=").count(), 8);
        assert_eq!(xml.matches("<print new-system=\"yes\"/>").count(), 1);
        assert_eq!(xml.matches("<attributes>").count(), 1);
    }

    #[test]
    fn test_empty_page() {
        let xml = page_to_musicxml(&sheet(&[]), 0);
        assert!(xml.contains("<part id=\"P1\">"));
        assert!(!xml.contains("<measure"));
    }

    #[test]
    fn test_key_fifths() {
        assert_eq!(key_fifths("C"), 0);
        assert_eq!(key_fifths("Bb"), -2);
        assert_eq!(key_fifths("F#m"), 3);
        assert_eq!(key_fifths("E minor"), 1);
        assert_eq!(key_fifths("D major"), 2);
        assert_eq!(key_fifths("unknown"), 0);
    }
}
