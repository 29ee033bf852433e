use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

pub const CREATION_DATE: &str = "creation_date";

/// Seconds between 1904-01-01 (QuickTime epoch) and 1970-01-01.
const QT_TO_UNIX_OFFSET: i64 = 2_082_844_800;

/// hdrl -> strl -> INFO is as deep as dated lists go.
const MAX_RIFF_DEPTH: u32 = 3;

/// RIFF text chunks longer than this are not dates.
const MAX_TEXT_CHUNK: u64 = 1024;

const RIFF_DATETIME_FORMATS: &[&str] = &[
    "%a %b %d %H:%M:%S %Y",
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];
const RIFF_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y:%m:%d", "%Y/%m/%d"];

const ISO_BMFF_TOP_LEVEL: &[&[u8; 4]] = &[b"ftyp", b"moov", b"mdat", b"free", b"skip", b"wide", b"pnot"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// MP4, QuickTime, 3GP
    IsoBmff,
    /// AVI
    Riff,
}

/// Items extracted from a container, each holding one or more values in priority order.
#[derive(Debug, Clone, Default)]
pub struct ContainerMetadata {
    items: BTreeMap<&'static str, Vec<NaiveDateTime>>,
}

impl ContainerMetadata {
    fn push(&mut self, key: &'static str, value: NaiveDateTime) {
        self.items.entry(key).or_default().push(value);
    }

    pub fn get(&self, key: &str) -> Option<&[NaiveDateTime]> {
        self.items.get(key).map(Vec::as_slice)
    }

    pub fn first(&self, key: &str) -> Option<NaiveDateTime> {
        self.get(key)?.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Identify the container from its first bytes.
pub fn detect_container<R: Read + Seek>(r: &mut R) -> io::Result<Option<Container>> {
    r.seek(SeekFrom::Start(0))?;
    let mut head = [0u8; 12];
    let mut filled = 0;
    while filled < head.len() {
        let n = r.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled < head.len() {
        return Ok(None);
    }
    if &head[0..4] == b"RIFF" && &head[8..12] == b"AVI " {
        return Ok(Some(Container::Riff));
    }
    if ISO_BMFF_TOP_LEVEL.iter().any(|kind| head[4..8] == kind[..]) {
        return Ok(Some(Container::IsoBmff));
    }
    Ok(None)
}

pub fn extract_metadata<R: Read + Seek>(
    r: &mut R,
    container: Container,
) -> anyhow::Result<ContainerMetadata> {
    let end = r.seek(SeekFrom::End(0))?;
    let mut metadata = ContainerMetadata::default();
    match container {
        Container::IsoBmff => read_iso_bmff(r, end, &mut metadata)?,
        Container::Riff => read_riff(r, end, &mut metadata)?,
    }
    Ok(metadata)
}

/// Creation date stored in a video container, logging why it is missing.
pub fn extract_container_date(path: &Path) -> Option<NaiveDateTime> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Unable to open {}: {}", path.display(), e);
            return None;
        }
    };
    let mut reader = BufReader::new(file);

    let container = match detect_container(&mut reader) {
        Ok(Some(c)) => c,
        Ok(None) => {
            warn!("Unable to parse file {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Unable to parse file {}: {}", path.display(), e);
            return None;
        }
    };

    let metadata = match extract_metadata(&mut reader, container) {
        Ok(m) if !m.is_empty() => m,
        Ok(_) => {
            warn!("Unable to extract metadata for {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Metadata extraction error for {}: {:#}", path.display(), e);
            return None;
        }
    };

    let date = metadata.first(CREATION_DATE);
    if date.is_none() {
        warn!("Unable to extract creation date for {}", path.display());
    }
    date
}

// ISO base media file format (MP4 / MOV)

#[derive(Debug, Clone, Copy)]
struct BoxRange {
    data_start: u64,
    data_end: u64,
}

fn find_box<R: Read + Seek>(
    r: &mut R,
    start: u64,
    end: u64,
    kind: &[u8; 4],
) -> anyhow::Result<Option<BoxRange>> {
    let mut offset = start;
    while offset + 8 <= end {
        r.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; 8];
        r.read_exact(&mut header)?;
        let mut size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let mut header_size = 8u64;

        if size == 1 {
            size = read_u64_be(r)?;
            header_size = 16;
        } else if size == 0 {
            size = end - offset;
        }
        if size < header_size || offset + header_size > end {
            bail!("malformed box at offset {}", offset);
        }
        let box_end = offset.saturating_add(size).min(end);

        if header[4..8] == kind[..] {
            return Ok(Some(BoxRange {
                data_start: offset + header_size,
                data_end: box_end,
            }));
        }
        offset = box_end;
    }
    Ok(None)
}

fn read_iso_bmff<R: Read + Seek>(
    r: &mut R,
    end: u64,
    metadata: &mut ContainerMetadata,
) -> anyhow::Result<()> {
    let Some(moov) = find_box(r, 0, end, b"moov")? else {
        return Ok(());
    };
    let Some(mvhd) = find_box(r, moov.data_start, moov.data_end, b"mvhd")? else {
        return Ok(());
    };
    let len = mvhd.data_end.saturating_sub(mvhd.data_start);
    if len < 4 {
        bail!("truncated mvhd box");
    }

    r.seek(SeekFrom::Start(mvhd.data_start))?;
    let mut version_flags = [0u8; 4];
    r.read_exact(&mut version_flags)?;
    // version/flags, then creation and modification times (64-bit in version 1)
    let needed = if version_flags[0] == 1 { 20 } else { 12 };
    if len < needed {
        bail!("truncated mvhd box");
    }
    let created = if version_flags[0] == 1 {
        read_u64_be(r)?
    } else {
        read_u32_be(r)? as u64
    };

    // zero means the recorder never set its clock
    if let Some(dt) = qt_seconds_to_datetime(created) {
        metadata.push(CREATION_DATE, dt);
    }
    Ok(())
}

fn qt_seconds_to_datetime(qt_seconds: u64) -> Option<NaiveDateTime> {
    if qt_seconds == 0 {
        return None;
    }
    let unix = i64::try_from(qt_seconds).ok()?.checked_sub(QT_TO_UNIX_OFFSET)?;
    chrono::DateTime::from_timestamp(unix, 0).map(|utc| utc.naive_utc())
}

fn read_u32_be<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64_be<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

// RIFF (AVI)

#[derive(Default)]
struct RiffDates {
    /// `IDIT` digitization time chunks
    idit: Vec<NaiveDateTime>,
    /// `ICRD` creation date entries from `LIST INFO`
    icrd: Vec<NaiveDateTime>,
}

fn read_riff<R: Read + Seek>(
    r: &mut R,
    end: u64,
    metadata: &mut ContainerMetadata,
) -> anyhow::Result<()> {
    let mut dates = RiffDates::default();
    // skip "RIFF" <size> "AVI "
    walk_riff(r, 12, end, 0, &mut dates)?;
    for dt in dates.idit.into_iter().chain(dates.icrd) {
        metadata.push(CREATION_DATE, dt);
    }
    Ok(())
}

fn walk_riff<R: Read + Seek>(
    r: &mut R,
    start: u64,
    end: u64,
    depth: u32,
    dates: &mut RiffDates,
) -> anyhow::Result<()> {
    let mut offset = start;
    while offset + 8 <= end {
        r.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; 8];
        r.read_exact(&mut header)?;
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as u64;
        let data_start = offset + 8;
        let data_end = data_start.saturating_add(size).min(end);

        match &header[0..4] {
            b"LIST" if data_end >= data_start + 4 => {
                let mut list_type = [0u8; 4];
                r.read_exact(&mut list_type)?;
                // movi holds the frames; only header and info lists carry dates
                if (&list_type == b"hdrl" || &list_type == b"INFO") && depth < MAX_RIFF_DEPTH {
                    walk_riff(r, data_start + 4, data_end, depth + 1, dates)?;
                }
            }
            b"IDIT" => {
                if let Some(dt) = read_text_chunk(r, data_end - data_start)?.and_then(|t| parse_riff_date(&t)) {
                    dates.idit.push(dt);
                }
            }
            b"ICRD" => {
                if let Some(dt) = read_text_chunk(r, data_end - data_start)?.and_then(|t| parse_riff_date(&t)) {
                    dates.icrd.push(dt);
                }
            }
            _ => {}
        }

        // chunks are word aligned
        offset = data_start.saturating_add(size).saturating_add(size & 1);
    }
    Ok(())
}

fn read_text_chunk<R: Read>(r: &mut R, len: u64) -> io::Result<Option<String>> {
    if len == 0 || len > MAX_TEXT_CHUNK {
        return Ok(None);
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&buf);
    Ok(Some(text.into_owned()))
}

/// Parse the free-form date text camcorders write into `IDIT` / `ICRD`.
pub fn parse_riff_date(text: &str) -> Option<NaiveDateTime> {
    let cleaned = text
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    RIFF_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
        .or_else(|| {
            RIFF_DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(&cleaned, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
}
