//! `.strm` library entries and file downloads.

use crate::services::prehrajto::PrehrajtoClient;
use crate::services::listing::absolute_url;
use crate::utils::fs::{ensure_dir, get_extension, write_file};
use crate::utils::text::sanitize_filename;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const DEFAULT_EXTENSION: &str = ".mp4";

/// Write `<dir>/<name>.strm` pointing at a video page.
///
/// Fails with [`Error::FileAlreadyExists`] rather than overwrite.
pub fn write_strm(dir: &Path, name: &str, link: &str) -> Result<PathBuf> {
    let safe = sanitize_filename(name);
    if safe.is_empty() {
        return Err(Error::InvalidConfig(format!("invalid library name '{}'", name)));
    }

    let path = dir.join(format!("{}.strm", safe));
    if path.exists() {
        return Err(Error::FileAlreadyExists(path.display().to_string()));
    }
    write_file(&path, link)?;
    tracing::info!("Saved library entry {}", path.display());
    Ok(path)
}

fn url_path(url: &str) -> String {
    reqwest::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or_default().to_string())
}

/// Default library name for a page link: last path segment, `-` as spaces.
pub fn suggested_name(link: &str) -> String {
    let path = url_path(link);
    let last = path.rsplit('/').next().unwrap_or_default();
    let stem = Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(last);
    if stem.is_empty() {
        "unknown_video".to_string()
    } else {
        stem.replace('-', " ")
    }
}

/// Download file stem for a page link: last path segment, `-` as `_`.
pub fn download_base_name(link: &str) -> String {
    let path = url_path(link);
    let last = path.rsplit('/').next().unwrap_or_default();
    let stem = Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(last);
    if stem.is_empty() {
        "downloaded_video".to_string()
    } else {
        stem.replace('-', "_")
    }
}

/// Extension (with dot) of a stream URL, `.mp4` when it has none.
pub fn stream_extension(stream_url: &str) -> String {
    let path = url_path(stream_url);
    let last = path.rsplit('/').next().unwrap_or_default();
    match get_extension(Path::new(last)) {
        Some(ext) if !ext.is_empty() => format!(".{}", ext),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Files written by a download.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub file: PathBuf,
    pub subtitle: Option<PathBuf>,
    pub bytes: u64,
}

/// Resolve a video page and stream its file into `out_dir`.
///
/// Subtitles are saved next to the file as `.srt`; subtitle failures are
/// logged only. An existing file is never overwritten, and a transfer that
/// fails midway leaves no partial file behind.
pub async fn download(
    client: &PrehrajtoClient,
    link: &str,
    out_dir: &Path,
    show_progress: bool,
) -> Result<Downloaded> {
    ensure_dir(out_dir)?;
    let page_url = absolute_url(client.base_url(), link);
    let resolved = client.resolve(&page_url).await?;

    let base_name = download_base_name(&page_url);
    let file = out_dir.join(format!("{}{}", base_name, stream_extension(&resolved.stream_url)));
    if file.exists() {
        return Err(Error::FileAlreadyExists(file.display().to_string()));
    }

    let mut subtitle = None;
    if let Some(sub_url) = &resolved.subtitle_url {
        let sub_path = out_dir.join(format!("{}.srt", base_name));
        match save_subtitle(client, sub_url, &sub_path).await {
            Ok(()) => {
                tracing::info!("Subtitles saved: {}", sub_path.display());
                subtitle = Some(sub_path);
            }
            Err(e) => tracing::error!("Subtitle download failed: {}", e),
        }
    }

    tracing::info!("Downloading {} to {}", resolved.stream_url, file.display());
    let mut resp = client.get(&resolved.stream_url).await?;
    let total = resp.content_length().unwrap_or(0);

    let pb = if show_progress {
        progress_bar(total)
    } else {
        ProgressBar::hidden()
    };
    pb.set_message(base_name.clone());

    let bytes = match write_body(&mut resp, &file, &pb).await {
        Ok(bytes) => bytes,
        Err(e) => {
            pb.abandon();
            if let Err(remove_err) = tokio::fs::remove_file(&file).await {
                tracing::warn!("Could not remove partial {}: {}", file.display(), remove_err);
            }
            return Err(e);
        }
    };
    pb.finish_and_clear();

    tracing::info!("Downloaded {} bytes to {}", bytes, file.display());
    Ok(Downloaded {
        file,
        subtitle,
        bytes,
    })
}

/// Stream the response body into a new file. Returns the byte count.
async fn write_body(resp: &mut reqwest::Response, file: &Path, pb: &ProgressBar) -> Result<u64> {
    let mut out = tokio::fs::File::create(file).await?;
    let mut bytes = 0u64;
    while let Some(chunk) = resp.chunk().await? {
        out.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
        pb.set_position(bytes);
    }
    out.flush().await?;
    Ok(bytes)
}

async fn save_subtitle(client: &PrehrajtoClient, url: &str, path: &Path) -> Result<()> {
    let body = client.get(url).await?.bytes().await?;
    write_file(path, &body)
}

fn progress_bar(total: u64) -> ProgressBar {
    if total == 0 {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {bytes} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        return pb;
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}
