use crate::Error;
use url::Url;

pub(crate) fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw).map_err(|err| Error::InvalidConfig {
        message: "invalid idler base_url".into(),
        source: Some(Box::new(err)),
    })?;

    if url.cannot_be_a_base() {
        return Err(Error::InvalidConfig {
            message: "idler base_url must be a hierarchical URL".into(),
            source: None,
        });
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::InvalidConfig {
            message: "idler base_url must not include query or fragment".into(),
            source: None,
        });
    }

    let path = url.path();
    if path != "/" && !path.ends_with('/') {
        url.set_path(&format!("{path}/"));
    }
    Ok(url)
}

/// Appends `segments` to `base_url`, each percent-encoded as a single path
/// segment. A literal `%` is escaped too, so ids are never decoded twice.
pub(crate) fn endpoint_url<'a, I>(base_url: &Url, segments: I) -> Result<Url, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| Error::InvalidConfig {
            message: "idler base_url must be a hierarchical URL".into(),
            source: None,
        })?;
        path.pop_if_empty();
        for seg in segments {
            path.push(seg);
        }
    }
    Ok(url)
}

pub(crate) fn sanitize_url_for_error(url: &Url) -> Url {
    let mut safe = url.clone();
    safe.set_query(None);
    safe.set_fragment(None);
    let _ = safe.set_username("");
    let _ = safe.set_password(None);
    safe
}
