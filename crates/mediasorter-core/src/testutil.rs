//! Synthetic media fixtures for unit tests.

/// Seconds between the QuickTime epoch (1904-01-01) and the Unix epoch.
pub const QT_TO_UNIX_OFFSET: i64 = 2_082_844_800;

fn push_ifd_entry(buf: &mut Vec<u8>, tag: u16, typ: u16, count: u32, value: u32) {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&typ.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Little-endian TIFF block: IFD0 -> Exif IFD -> DateTimeOriginal.
pub fn exif_tiff(datetime: &str) -> Vec<u8> {
    let mut t = Vec::new();
    t.extend_from_slice(b"II");
    t.extend_from_slice(&42u16.to_le_bytes());
    t.extend_from_slice(&8u32.to_le_bytes());
    // IFD0 at 8
    t.extend_from_slice(&1u16.to_le_bytes());
    push_ifd_entry(&mut t, 0x8769, 4, 1, 26);
    t.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD at 26
    t.extend_from_slice(&1u16.to_le_bytes());
    push_ifd_entry(&mut t, 0x9003, 2, datetime.len() as u32 + 1, 44);
    t.extend_from_slice(&0u32.to_le_bytes());
    // value at 44
    t.extend_from_slice(datetime.as_bytes());
    t.push(0);
    t
}

/// Minimal JPEG carrying an APP1 Exif segment with DateTimeOriginal.
pub fn jpeg_with_exif(datetime: &str) -> Vec<u8> {
    let tiff = exif_tiff(datetime);
    let mut j = vec![0xFF, 0xD8, 0xFF, 0xE1];
    j.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    j.extend_from_slice(b"Exif\0\0");
    j.extend_from_slice(&tiff);
    j.extend_from_slice(&[0xFF, 0xD9]);
    j
}

/// Minimal JPEG with no metadata at all.
pub fn jpeg_without_exif() -> Vec<u8> {
    let mut j = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    j.extend_from_slice(b"JFIF\0");
    j.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
    j.extend_from_slice(&[0xFF, 0xD9]);
    j
}

pub fn riff_chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut c = Vec::with_capacity(8 + data.len() + 1);
    c.extend_from_slice(id);
    c.extend_from_slice(&(data.len() as u32).to_le_bytes());
    c.extend_from_slice(data);
    if data.len() % 2 == 1 {
        c.push(0);
    }
    c
}

pub fn riff_list(kind: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    let mut body = kind.to_vec();
    for child in children {
        body.extend_from_slice(child);
    }
    riff_chunk(b"LIST", &body)
}

pub fn riff_avi(children: &[Vec<u8>]) -> Vec<u8> {
    let mut body = b"AVI ".to_vec();
    for child in children {
        body.extend_from_slice(child);
    }
    riff_chunk(b"RIFF", &body)
}

/// AVI whose header list optionally carries an `IDIT` timestamp chunk.
pub fn avi_with_idit(idit: Option<&str>) -> Vec<u8> {
    let mut hdrl = vec![riff_chunk(b"avih", &[0u8; 56])];
    if let Some(text) = idit {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        hdrl.push(riff_chunk(b"IDIT", &data));
    }
    riff_avi(&[riff_list(b"hdrl", &hdrl), riff_list(b"movi", &[])])
}

/// AVI with a `LIST INFO` block holding an `ICRD` creation date.
pub fn avi_with_icrd(icrd: &str) -> Vec<u8> {
    let hdrl = vec![riff_chunk(b"avih", &[0u8; 56])];
    let mut data = icrd.as_bytes().to_vec();
    data.push(0);
    let info = vec![riff_chunk(b"ICRD", &data)];
    riff_avi(&[
        riff_list(b"hdrl", &hdrl),
        riff_list(b"INFO", &info),
        riff_list(b"movi", &[]),
    ])
}

pub fn mp4_box(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut b = Vec::with_capacity(8 + body.len());
    b.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    b.extend_from_slice(kind);
    b.extend_from_slice(body);
    b
}

/// ISO-BMFF file with a version 0 `mvhd` creation time (seconds since 1904).
pub fn mp4_with_creation(qt_seconds: u32) -> Vec<u8> {
    let mut ftyp = b"isom".to_vec();
    ftyp.extend_from_slice(&0x200u32.to_be_bytes());
    ftyp.extend_from_slice(b"isommp41");

    let mut mvhd = vec![0u8; 4];
    mvhd.extend_from_slice(&qt_seconds.to_be_bytes());
    mvhd.extend_from_slice(&qt_seconds.to_be_bytes());
    mvhd.extend_from_slice(&1000u32.to_be_bytes());
    mvhd.extend_from_slice(&0u32.to_be_bytes());
    mvhd.resize(100, 0);

    let mut out = mp4_box(b"ftyp", &ftyp);
    out.extend_from_slice(&mp4_box(b"free", &[]));
    out.extend_from_slice(&mp4_box(b"moov", &mp4_box(b"mvhd", &mvhd)));
    out
}
