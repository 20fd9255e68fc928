//! Streams response bodies to disk and places them under a free name.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::naming::{candidate_name, resolve_filename};
use crate::observe::{Event, Observer};
use crate::outcome::{ErrorKind, Failure, Outcome, status_code, try_outcome};
use crate::transport::{BodyStream, HttpResponse};

/// Upper bound on `name(n).ext` candidates tried before giving up.
const MAX_CANDIDATES: u32 = 10_000;

/// Checks the destination directory and creates it if missing.
///
/// An empty path is an [`ErrorKind::InvalidRequest`]; a directory that
/// cannot be created is an [`ErrorKind::Io`] failure carrying the
/// filesystem error.
pub async fn prepare_directory(directory: &Path) -> Outcome<()> {
    if directory.as_os_str().is_empty() {
        return Failure::of(
            ErrorKind::InvalidRequest,
            "Destination directory must not be empty",
        )
        .into();
    }

    match tokio::fs::create_dir_all(directory).await {
        Ok(()) => Outcome::success((), status_code::NOT_APPLICABLE),
        Err(e) => io_failure(
            format!("Cannot create destination directory '{}'", directory.display()),
            e,
        ),
    }
}

/// Streams `response` into `directory` and returns the final path.
///
/// The body goes to a temporary file inside `directory` first. Once the
/// body is complete the file is moved to the resolved name, or to the
/// first `name(n).ext` that does not exist yet; existing files are never
/// overwritten. On any failure, including cancellation, the temporary
/// file is removed.
pub async fn save(
    response: HttpResponse,
    url: &Url,
    directory: &Path,
    cancel: &CancellationToken,
    observer: &dyn Observer,
) -> Outcome<PathBuf> {
    let status = response.status.as_u16();
    let filename = resolve_filename(&response.headers, url);

    observer.on_event(&Event::DownloadStarted { url, directory });

    let temp = match tempfile::Builder::new()
        .prefix(".download-")
        .suffix(".part")
        .tempfile_in(directory)
    {
        Ok(temp) => temp,
        Err(e) => {
            return io_failure(
                format!("Cannot create temporary file in '{}'", directory.display()),
                e,
            );
        }
    };
    let file = match temp.reopen() {
        Ok(file) => tokio::fs::File::from_std(file),
        Err(e) => return io_failure("Cannot open temporary file", e),
    };

    let written = match write_body(file, response.body.into_stream(), cancel).await {
        Outcome::Cancelled(failure) => {
            observer.on_event(&Event::Cancelled { url });
            return Outcome::Cancelled(failure);
        }
        outcome => try_outcome!(outcome),
    };

    let path = try_outcome!(place(temp, directory, &filename));
    observer.on_event(&Event::DownloadFinished {
        url,
        path: &path,
        bytes: written,
    });
    Outcome::success(path, status)
}

/// Copies the body stream into `file`, returning the number of bytes written.
async fn write_body(
    mut file: tokio::fs::File,
    mut stream: BodyStream,
    cancel: &CancellationToken,
) -> Outcome<u64> {
    let mut written = 0u64;
    loop {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => return Outcome::cancelled(),
            chunk = stream.next() => chunk,
        };
        match chunk {
            None => break,
            Some(Ok(bytes)) => {
                if let Err(e) = file.write_all(&bytes).await {
                    return io_failure("Failed to write download", e);
                }
                written += bytes.len() as u64;
            }
            Some(Err(e)) => {
                return Failure::of(ErrorKind::TransportError, "Failed to read download body")
                    .with_source(e)
                    .into();
            }
        }
    }

    if let Err(e) = file.flush().await {
        return io_failure("Failed to write download", e);
    }
    Outcome::success(written, status_code::NOT_APPLICABLE)
}

/// Moves the finished temporary file to the first free candidate name.
fn place(mut temp: NamedTempFile, directory: &Path, filename: &str) -> Outcome<PathBuf> {
    for index in 0..MAX_CANDIDATES {
        let path = directory.join(candidate_name(filename, index));
        match temp.persist_noclobber(&path) {
            Ok(_) => return Outcome::success(path, status_code::NOT_APPLICABLE),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => temp = e.file,
            Err(e) => {
                return io_failure(format!("Cannot move download to '{}'", path.display()), e.error);
            }
        }
    }

    Failure::of(
        ErrorKind::Io,
        format!("No free file name for '{filename}' in '{}'", directory.display()),
    )
    .into()
}

fn io_failure<T>(message: impl Into<String>, error: io::Error) -> Outcome<T> {
    Failure::of(ErrorKind::Io, message).with_source(error).into()
}
