//! Tesseract CLI recognizer.
//!
//! The decoded image is piped to `tesseract stdin stdout <args> tsv` as PNG.
//! Words from the TSV report are grouped into lines; each line becomes a
//! [`TextRegion`] whose single candidate is the line text, with the mean word
//! confidence.

use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::detection::{TextRecognizer, TextRegion};
use crate::error::RecognizeError;

const TSV_HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";
const WORD_LEVEL: &str = "5";

#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: String,
    args: Vec<String>,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &RgbaImage) -> Result<Vec<TextRegion>, RecognizeError> {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image.clone())
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|err| RecognizeError::Scheduling(format!("encode image: {err}")))?;

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout"])
            .args(&self.args)
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| RecognizeError::Scheduling(format!("{}: {err}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(png.get_ref()) {
                drop(stdin);
                // reap the child so it does not linger
                let _ = child.kill();
                let _ = child.wait();
                return Err(RecognizeError::Scheduling(format!("write image: {err}")));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|err| RecognizeError::Result(err.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognizeError::Result(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug)]
struct Line {
    key: (u32, u32, u32, u32),
    words: Vec<String>,
    confidence_sum: f32,
}

/// Group a Tesseract TSV report into line regions, in reading order.
pub fn parse_tsv(tsv: &str) -> Result<Vec<TextRegion>, RecognizeError> {
    let mut rows = tsv.lines();
    match rows.next() {
        Some(header) if header.trim_end() == TSV_HEADER => {}
        _ => return Err(RecognizeError::NoTextObservations),
    }

    let mut lines: Vec<Line> = Vec::new();
    for (index, row) in rows.enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            return Err(RecognizeError::Result(format!(
                "malformed TSV row {}: {row:?}",
                index + 2
            )));
        }
        if cols[0] != WORD_LEVEL {
            continue;
        }
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }

        let number = |col: usize| -> Result<u32, RecognizeError> {
            cols[col].parse().map_err(|_| {
                RecognizeError::Result(format!("bad number {:?} in row {}", cols[col], index + 2))
            })
        };
        let key = (number(1)?, number(2)?, number(3)?, number(4)?);
        let confidence: f32 = cols[10].parse().unwrap_or(0.0);

        match lines.last_mut() {
            Some(line) if line.key == key => {
                line.words.push(text.to_string());
                line.confidence_sum += confidence;
            }
            _ => lines.push(Line {
                key,
                words: vec![text.to_string()],
                confidence_sum: confidence,
            }),
        }
    }

    Ok(lines
        .into_iter()
        .map(|line| {
            let confidence = line.confidence_sum / line.words.len() as f32 / 100.0;
            TextRegion::single(line.words.join(" "), confidence)
        })
        .collect())
}
