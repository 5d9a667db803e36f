//! Shared fixtures: PFS0 containers with plaintext content headers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dlcman::archive::nca::{
    CONTENT_TYPE_OFFSET, HEADER_SIZE, MAGIC_OFFSET, TITLE_ID_OFFSET,
};
use dlcman::archive::pfs0::MAGIC;
use dlcman::archive::ContentType;
use dlcman::config::ResolvedConfig;

pub const OWNER: u64 = 0x0100_0000_0000_e000;

/// One file to place in a container
pub enum Fixture {
    Content(ContentType, u64),
    Encrypted,
    Raw(Vec<u8>),
}

pub fn public(title_id: u64) -> Fixture {
    Fixture::Content(ContentType::PublicData, title_id)
}

fn content_bytes(fixture: &Fixture) -> Vec<u8> {
    match fixture {
        Fixture::Content(content_type, title_id) => {
            let mut buf = vec![0u8; HEADER_SIZE];
            buf[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(b"NCA3");
            buf[CONTENT_TYPE_OFFSET] = content_type.as_u8();
            buf[TITLE_ID_OFFSET..TITLE_ID_OFFSET + 8].copy_from_slice(&title_id.to_le_bytes());
            buf
        }
        Fixture::Encrypted => (0..HEADER_SIZE).map(|i| (i * 7 + 3) as u8).collect(),
        Fixture::Raw(bytes) => bytes.clone(),
    }
}

/// Serialize a PFS0 container holding `files`
pub fn pfs0_bytes(files: &[(&str, Fixture)]) -> Vec<u8> {
    let mut strings = Vec::new();
    let mut table = Vec::new();
    let mut data = Vec::new();

    for (name, fixture) in files {
        let bytes = content_bytes(fixture);
        table.extend_from_slice(&(data.len() as u64).to_le_bytes());
        table.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        table.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        table.extend_from_slice(&0u32.to_le_bytes());
        strings.extend_from_slice(name.as_bytes());
        strings.push(0);
        data.extend_from_slice(&bytes);
    }

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());
    out.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&table);
    out.extend_from_slice(&strings);
    out.extend_from_slice(&data);
    out
}

/// Write a PFS0 container to `dir/name`
pub fn write_archive(dir: &Path, name: &str, files: &[(&str, Fixture)]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pfs0_bytes(files)).unwrap();
    path
}

/// Config rooted in a temp directory
pub fn test_config(home: &Path) -> ResolvedConfig {
    ResolvedConfig::with_home(home)
}
