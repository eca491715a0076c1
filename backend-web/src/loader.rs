use crate::canvas::WebImage;
use js_sys::Promise;
use tracepad::{Error, ErrorKind, ImageLoader};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

/// Loads reference pictures through `<img>` elements, relative to `base`.
#[derive(Debug, Default)]
pub struct WebLoader {
    base: String,
}

impl WebLoader {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        WebLoader { base }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

impl ImageLoader for WebLoader {
    type Image = WebImage;

    async fn load(&self, path: &str) -> Result<WebImage, Error> {
        let url = self.url(path);
        log::debug!("load {url}");

        let failed = |why: String| {
            Error::because(
                ErrorKind::ImageLoad {
                    path: path.to_string(),
                },
                why,
            )
        };

        let image = HtmlImageElement::new().map_err(|err| failed(format!("{err:?}")))?;

        let decoded = Promise::new(&mut |resolve, reject| {
            image.set_onload(Some(&resolve));
            image.set_onerror(Some(&reject));
        });
        image.set_src(&url);

        let result = JsFuture::from(decoded).await;
        image.set_onload(None);
        image.set_onerror(None);

        match result {
            Ok(_) => Ok(WebImage(image)),
            Err(_) => Err(failed(url)),
        }
    }
}
