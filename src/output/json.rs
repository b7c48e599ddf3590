//! JSON sitemap serialization

use crate::state::Sitemap;
use crate::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where the sitemap ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitTarget {
    File(PathBuf),
    Stdout,
}

/// Name of the sitemap file for a domain
pub fn sitemap_file_name(domain: &str) -> String {
    format!("{}.json", domain)
}

/// Writes the sitemap as pretty-printed JSON
///
/// Keys and sets come out sorted, so the same crawl always produces the same
/// bytes.
pub fn write_sitemap<W: Write>(sitemap: &Sitemap, mut writer: W) -> Result<usize> {
    let json = serde_json::to_string_pretty(sitemap)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(json.len() + 1)
}

/// Emits the sitemap to `<directory>/<domain>.json`, or to stdout
///
/// # Arguments
///
/// * `sitemap` - The finished sitemap
/// * `domain` - The crawl's domain, used as the file name
/// * `directory` - Output directory; stdout when `None` or when it does not exist
///
/// # Returns
///
/// * `Ok(EmitTarget)` - Where the sitemap was written
/// * `Err(AtlasError)` - Serialization or I/O failed
pub fn emit_sitemap(
    sitemap: &Sitemap,
    domain: &str,
    directory: Option<&Path>,
) -> Result<EmitTarget> {
    match directory {
        Some(dir) if dir.is_dir() => {
            let path = dir.join(sitemap_file_name(domain));
            let file = std::fs::File::create(&path)?;
            let written = write_sitemap(sitemap, std::io::BufWriter::new(file))?;
            tracing::info!("Wrote {} bytes to {}", written, path.display());
            Ok(EmitTarget::File(path))
        }
        Some(dir) => {
            tracing::warn!(
                "{} doesn't exist, printing sitemap to stdout instead",
                dir.display()
            );
            print_sitemap(sitemap)
        }
        None => print_sitemap(sitemap),
    }
}

fn print_sitemap(sitemap: &Sitemap) -> Result<EmitTarget> {
    let stdout = std::io::stdout();
    write_sitemap(sitemap, stdout.lock())?;
    Ok(EmitTarget::Stdout)
}
