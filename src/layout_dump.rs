use crate::layout::SvgDocument;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub font_family: String,
    pub font_size: u32,
    pub background: Option<String>,
    pub lines: Vec<LineDump>,
}

#[derive(Debug, Serialize)]
pub struct LineDump {
    pub y: f64,
    pub runs: Vec<RunDump>,
}

#[derive(Debug, Serialize)]
pub struct RunDump {
    pub x: f64,
    pub color: String,
    pub text: String,
    pub chars: usize,
}

impl LayoutDump {
    /// Groups the runs of `layout` by baseline.
    pub fn from_layout(layout: &SvgDocument) -> Self {
        let mut lines: Vec<LineDump> = Vec::new();
        for run in &layout.runs {
            let entry = RunDump {
                x: run.x,
                color: run.color.clone(),
                text: run.text.clone(),
                chars: run.text.chars().count(),
            };
            match lines.last_mut() {
                Some(line) if line.y == run.y => line.runs.push(entry),
                _ => lines.push(LineDump {
                    y: run.y,
                    runs: vec![entry],
                }),
            }
        }

        LayoutDump {
            width: layout.width,
            height: layout.height,
            font_family: layout.font_family.clone(),
            font_size: layout.font_size.px(),
            background: layout.background.clone(),
            lines,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &SvgDocument) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
