use crate::client::{Client, RequestBody};
use crate::commands::{Command, CommandSet, ConvertOptions, ResizeOption, TransformOptions};
use crate::constants::{
    HEADER_COMPRESSION_COUNT, HEADER_CONTENT_TYPE, HEADER_LOCATION, JSON_MEDIA_TYPE, SHRINK_PATH,
};
use crate::error::{Result, TinifyError};
use crate::result::ImageResult;
use reqwest::blocking::Response;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// JSON error payload returned by the Tinify API.
#[derive(Debug, Clone, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// An uploaded (or referenced) image plus the commands to apply to it.
///
/// Every export call fetches the result again; nothing is cached.
#[derive(Debug, Clone)]
pub struct Source {
    client: Client,
    url: String,
    commands: CommandSet,
    compression_count: Option<u64>,
}

impl Source {
    /// Resumes from a location previously returned by the service.
    pub fn new(client: &Client, url: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            url: url.into(),
            commands: CommandSet::new(),
            compression_count: None,
        }
    }

    pub fn from_file(client: &Client, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buffer = fs::read(path)?;
        debug!("read {} bytes from {:?}", buffer.len(), path);
        Self::from_buffer(client, buffer)
    }

    pub fn from_buffer(client: &Client, buffer: impl Into<Vec<u8>>) -> Result<Self> {
        let response = client.request(Method::POST, SHRINK_PATH, RequestBody::Raw(buffer.into()))?;
        Self::from_response(client, response)
    }

    /// Asks the service to download and compress the image at `url`.
    pub fn from_url(client: &Client, url: &str) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(TinifyError::validation("URL is required"));
        }

        let body = RequestBody::json(&json!({ "source": { "url": url } }))?;
        let response = client.request(Method::POST, SHRINK_PATH, body)?;
        Self::from_response(client, response)
    }

    fn from_response(client: &Client, response: Response) -> Result<Self> {
        let status = response.status();
        let location = header_text(response.headers(), HEADER_LOCATION)
            .filter(|location| !location.is_empty())
            .map(str::to_string);

        let location = match location {
            Some(location) if status != StatusCode::BAD_REQUEST => location,
            _ if status.is_client_error() || status.is_server_error() => {
                debug!("upload rejected with status {}", status);
                return Err(api_error(response));
            }
            _ => {
                return Err(TinifyError::Api {
                    status: status.as_u16(),
                    error: status_line(status),
                    message: "empty location in response".to_string(),
                });
            }
        };

        let compression_count = header_text(response.headers(), HEADER_COMPRESSION_COUNT)
            .and_then(|count| count.trim().parse().ok());

        debug!(
            "uploaded; location {} (compression count {:?})",
            location, compression_count
        );

        let mut source = Source::new(client, location);
        source.compression_count = compression_count;
        Ok(source)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Compression count seen on the latest response, if it carried one.
    pub fn compression_count(&self) -> Option<u64> {
        self.compression_count
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn resize(&mut self, option: ResizeOption) -> Result<()> {
        option.validate()?;
        self.commands.insert(Command::Resize(option));
        Ok(())
    }

    /// Converts to the smallest of the given types ("png", "jpeg", "webp", "avif").
    ///
    /// Unknown names are dropped silently; if none remain the call fails.
    pub fn convert<S: AsRef<str>>(&mut self, type_names: &[S]) -> Result<()> {
        let options = ConvertOptions::from_type_names(type_names)?;
        self.commands.insert(Command::Convert(options));
        Ok(())
    }

    /// Fills transparent areas with a background colour; the value is sent unchecked.
    pub fn transform(&mut self, option: TransformOptions) -> Result<()> {
        self.commands.insert(Command::Transform(option));
        Ok(())
    }

    /// Fetches the processed image, applying all pending commands.
    pub fn fetch(&mut self) -> Result<ImageResult> {
        if self.url.is_empty() {
            return Err(TinifyError::validation("url is empty"));
        }

        let body = RequestBody::json(&self.commands)?;
        let response = self.client.request(Method::GET, &self.url, body)?;

        let status = response.status();
        if status.as_u16() >= 400 || is_json(response.headers()) {
            return Err(api_error(response));
        }

        let headers = response.headers().clone();
        let data = response.bytes()?.to_vec();
        let result = ImageResult::new(headers, data);

        if header_text(result.meta().headers(), HEADER_COMPRESSION_COUNT).is_some() {
            self.compression_count = Some(result.compression_count());
        }
        debug!(
            "fetched {} bytes of {:?}",
            result.data().len(),
            result.media_type()
        );
        Ok(result)
    }

    /// Writes the processed image to `path` and returns the compression count.
    ///
    /// A write failure after a successful fetch still carries the count, see
    /// [`TinifyError::compression_count`].
    pub fn to_file_counted(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let result = self.fetch()?;
        let compression_count = result.compression_count();

        match result.to_file(path) {
            Ok(written) => {
                debug!("wrote {} bytes to {:?}", result.data().len(), written);
                Ok(compression_count)
            }
            Err(source) => Err(TinifyError::Write {
                path: path.to_path_buf(),
                compression_count,
                source,
            }),
        }
    }

    /// Returns the processed image bytes together with the compression count.
    pub fn to_buffer_counted(&mut self) -> Result<(Vec<u8>, u64)> {
        let result = self.fetch()?;
        let compression_count = result.compression_count();

        let data = result.into_data();
        if data.is_empty() {
            return Err(TinifyError::EmptyResult { compression_count });
        }
        Ok((data, compression_count))
    }

    pub fn to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.to_file_counted(path).map(|_| ())
    }

    pub fn to_buffer(&mut self) -> Result<Vec<u8>> {
        self.to_buffer_counted().map(|(data, _)| data)
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn is_json(headers: &HeaderMap) -> bool {
    header_text(headers, HEADER_CONTENT_TYPE)
        .and_then(|value| value.split(';').next())
        .map_or(false, |media_type| {
            media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE)
        })
}

/// Turns an error response into the matching `TinifyError`.
fn api_error(response: Response) -> TinifyError {
    let status = response.status();
    let status_line = status_line(status);

    let body = match response.bytes() {
        Ok(body) => body,
        Err(e) => {
            warn!("could not read error body: {}", e);
            return TinifyError::Api {
                status: status.as_u16(),
                error: status_line,
                message: String::new(),
            };
        }
    };

    match serde_json::from_slice::<ErrorMessage>(&body) {
        Ok(payload) => TinifyError::Api {
            status: status.as_u16(),
            error: payload.error,
            message: payload.message,
        },
        Err(source) => TinifyError::Decoding {
            status: status_line,
            source,
        },
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
