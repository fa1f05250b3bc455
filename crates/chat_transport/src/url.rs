use url::Url;

use crate::error::TransportError;

/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const DOCUMENTATION_PATH: &str = "demo-architecture";

/// Session channel endpoint: `<base>/ws/<session_id>` with `http` mapped to
/// `ws` and `https` to `wss`.
pub fn ws_url(base: &str, session_id: &str) -> Result<Url, TransportError> {
    let mut url = parse_base(base)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::invalid_base_url(format!(
                "unsupported scheme `{other}`"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::invalid_base_url(base))?;
    append_segments(&mut url, &["ws", session_id])?;
    Ok(url)
}

/// Download endpoint for a generated file: `<base>/files/<file_id>`.
pub fn file_url(base: &str, file_id: &str) -> Result<Url, TransportError> {
    let mut url = parse_base(base)?;
    append_segments(&mut url, &["files", file_id])?;
    Ok(url)
}

/// Architecture documentation endpoint.
pub fn docs_url(base: &str) -> Result<Url, TransportError> {
    let mut url = parse_base(base)?;
    append_segments(&mut url, &[DOCUMENTATION_PATH])?;
    Ok(url)
}

fn parse_base(input: &str) -> Result<Url, TransportError> {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };
    let mut url = Url::parse(base).map_err(|error| {
        TransportError::invalid_base_url(format!("{base}: {error}"))
    })?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn append_segments(url: &mut Url, segments: &[&str]) -> Result<(), TransportError> {
    let rendered = url.to_string();
    url.path_segments_mut()
        .map_err(|()| TransportError::invalid_base_url(rendered))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}
