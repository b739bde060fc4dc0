use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::common::request::Request;
use crate::common::response::{Body, DEFAULT_CONTENT_TYPE, Response};
use crate::common::status;
use crate::files::error::{not_found_to_none, ServeError};
use crate::files::mime;
use crate::files::resolve::Resolver;
use crate::server::Upload;

/// Size of the write buffer in front of an uploaded file.
const UPLOAD_BUF_SIZE: usize = 64 * 1024;

/// Serves the file or directory listing at the request path.
/// Directories are listed one entry name per line, sorted.
pub fn get(resolver: &Resolver, request: &Request) -> Result<Response, ServeError> {
    let path = resolver.resolve(&request.uri)?;
    let metadata = not_found_to_none(fs::metadata(&path))?.ok_or(ServeError::NotFound)?;

    if metadata.is_dir() {
        let listing = list_directory(&path)?;
        return Ok(Response::from(listing).with_content_type(DEFAULT_CONTENT_TYPE));
    }

    let file = File::open(&path)?;
    let len = file.metadata()?.len();
    Ok(Response::new(status::OK, Body::File { file, len }).with_content_type(mime::content_type(&path)))
}

/// Opens the file at the request path for writing, replacing any existing content.
/// The request body is written into it as it arrives.
pub fn put(resolver: &Resolver, request: &Request) -> Result<Box<dyn Upload>, ServeError> {
    let path = resolver.resolve(&request.uri)?;
    let file = File::create(&path)?;

    Ok(Box::new(FileUpload { file: BufWriter::with_capacity(UPLOAD_BUF_SIZE, file), path, written: 0 }))
}

/// A file being written by a PUT request.
struct FileUpload {
    file: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl Write for FileUpload {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let amount = self.file.write(buf)?;
        self.written += amount as u64;
        Ok(amount)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl Upload for FileUpload {
    fn finish(mut self: Box<Self>) -> Result<Response, ServeError> {
        self.file.flush()?;
        debug!("Wrote {} bytes to {}", self.written, self.path.display());
        Ok(status::NO_CONTENT.into())
    }
}

/// Removes the file or empty directory at the request path. Removing nothing also succeeds.
pub fn delete(resolver: &Resolver, request: &Request) -> Result<Response, ServeError> {
    let path = resolver.resolve(&request.uri)?;

    match not_found_to_none(fs::symlink_metadata(&path))? {
        Some(metadata) if metadata.is_dir() => fs::remove_dir(&path)?,
        Some(_) => fs::remove_file(&path)?,
        None => {}
    }

    Ok(status::NO_CONTENT.into())
}

/// Creates a directory at the request path. An existing directory is left as is.
pub fn mkcol(resolver: &Resolver, request: &Request) -> Result<Response, ServeError> {
    let path = resolver.resolve(&request.uri)?;

    match not_found_to_none(fs::metadata(&path))? {
        Some(metadata) if metadata.is_dir() => {}
        Some(_) => return Err(ServeError::NotADirectory),
        None => fs::create_dir(&path)?
    }

    Ok(status::NO_CONTENT.into())
}

/// Gets the sorted names of a directory's immediate entries, one per line.
fn list_directory(path: &Path) -> std::io::Result<String> {
    let mut names = fs::read_dir(path)?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<String>>>()?;
    names.sort();
    Ok(names.join("\n"))
}
