use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use chrono::NaiveDateTime;
use exif::{Context, In, Reader, Value};
use log::debug;

/// Key written by the container reader for the original capture time.
const PRIMARY_DATE_KEY: &str = "EXIF DateTimeOriginal";
const DATE_TAG: &str = "DateTimeOriginal";

/// Date layouts seen in tag values, tried in order.
const TAG_DATE_FORMATS: &[&str] = &["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Tag name -> raw tag value, as produced by one reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTags(BTreeMap<String, String>);

impl MetadataTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Trimmed value of the original capture time tag, if any.
    /// The container reader's exact key wins over any other key mentioning the tag.
    pub fn original_date_string(&self) -> Option<&str> {
        self.get(PRIMARY_DATE_KEY)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(k, _)| k.contains(DATE_TAG))
                    .map(|(_, v)| v.as_str())
            })
            .map(|v| v.trim_matches(|c: char| c.is_whitespace() || c == '\0'))
    }
}

/// A source of metadata tags for a file. Readers are tried in order.
pub trait TagReader {
    fn name(&self) -> &'static str;
    fn read_tags(&self, path: &Path) -> anyhow::Result<MetadataTags>;
}

/// Low-level reader that locates the EXIF block inside a JPEG/TIFF/HEIF/PNG/WebP container.
pub struct ExifContainerReader;

impl TagReader for ExifContainerReader {
    fn name(&self) -> &'static str {
        "exif-container"
    }

    fn read_tags(&self, path: &Path) -> anyhow::Result<MetadataTags> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let exif = Reader::new()
            .read_from_container(&mut BufReader::new(file))
            .with_context(|| format!("read EXIF from {}", path.display()))?;

        let mut tags = MetadataTags::new();
        for field in exif.fields() {
            let group = match field.tag.context() {
                Context::Exif => "EXIF",
                Context::Gps => "GPS",
                Context::Interop => "Interoperability",
                _ if field.ifd_num == In::THUMBNAIL => "Thumbnail",
                _ => "Image",
            };
            // ASCII values are kept raw; display_value() would quote and reformat them.
            let value = match &field.value {
                Value::Ascii(parts) if !parts.is_empty() => {
                    String::from_utf8_lossy(&parts[0]).into_owned()
                }
                _ => field.display_value().to_string(),
            };
            tags.insert(format!("{} {}", group, field.tag), value);
        }
        Ok(tags)
    }
}

/// Reads the whole image into memory and decodes its embedded EXIF table.
pub struct ExifTableReader;

impl TagReader for ExifTableReader {
    fn name(&self) -> &'static str {
        "exif-table"
    }

    fn read_tags(&self, path: &Path) -> anyhow::Result<MetadataTags> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        // parse_buffer_quiet keeps rexif from printing warnings to stderr
        let (result, _warnings) = rexif::parse_buffer_quiet(&bytes);
        let data = result.map_err(|e| anyhow::anyhow!("decode EXIF table: {}", e))?;

        let mut tags = MetadataTags::new();
        for entry in &data.entries {
            if matches!(entry.tag, rexif::ExifTag::UnknownToMe) {
                continue;
            }
            tags.insert(format!("{:?}", entry.tag), entry.value.to_string());
        }
        Ok(tags)
    }
}

/// The reader chain used for images and side-cars.
pub fn default_readers() -> [&'static dyn TagReader; 2] {
    [&ExifContainerReader, &ExifTableReader]
}

/// Tags from the first reader that succeeds; empty if all of them fail.
pub fn read_tags_with(readers: &[&dyn TagReader], path: &Path) -> MetadataTags {
    for reader in readers {
        match reader.read_tags(path) {
            Ok(tags) => return tags,
            Err(e) => debug!("{} failed for {}: {:#}", reader.name(), path.display(), e),
        }
    }
    MetadataTags::new()
}

pub fn read_tags(path: &Path) -> MetadataTags {
    read_tags_with(&default_readers(), path)
}

/// Parse a tag date string in colon or dash layout.
pub fn parse_tag_datetime(s: &str) -> Option<NaiveDateTime> {
    TAG_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn date_from_tags(tags: &MetadataTags) -> Option<NaiveDateTime> {
    parse_tag_datetime(tags.original_date_string()?)
}

/// Extract the original capture time from an image or side-car file.
pub fn extract_exif_date(path: &Path) -> Option<NaiveDateTime> {
    date_from_tags(&read_tags(path))
}
