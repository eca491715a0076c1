use kdl::KdlDocument;
use once_cell::sync::Lazy;
use std::sync::RwLock;

const FALLBACK_LANG: &str = "en";

static POT: Lazy<KdlDocument> = Lazy::new(|| {
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res/pot.kdl"))
        .parse()
        .expect("pot.kdl failed to parse")
});

static LANG: Lazy<RwLock<String>> = Lazy::new(|| {
    #[cfg(not(target_arch = "wasm32"))]
    let lang = std::env::var("LANGUAGE")
        .or_else(|_| std::env::var("LANG"))
        .unwrap_or_else(|_| String::from(FALLBACK_LANG));

    #[cfg(target_arch = "wasm32")]
    let lang = String::from(FALLBACK_LANG);

    RwLock::new(normalize(&lang))
});

macro_rules! messages {
    ($($variant:ident),* $(,)?) => {
        #[derive(Clone, Copy, Debug)]
        pub enum Message {
            $($variant),*
        }

        impl Message {
            #[cfg(test)]
            fn all_strs() -> &'static [&'static str] {
                &[$(stringify!($variant)),*]
            }

            fn as_str(&self) -> &'static str {
                use Message::*;
                match self {
                    $($variant => stringify!($variant)),*
                }
            }
        }
    };
}

messages!(
    ErrorTitle,
    CouldNotLoadImage,
    NoReferenceImages,
    CouldNotOpenConfigFile,
    CouldNotReadScript,
    CouldNotWriteImage,
    ClearButton,
    UndoButton,
    ShowReferenceButton,
);

#[macro_export]
macro_rules! s {
    ($variant:ident) => {
        $crate::i18n::get_str($crate::i18n::Message::$variant)
    };
    (&$variant:ident) => {
        $crate::i18n::get_str($crate::i18n::Message::$variant).as_str()
    };
}

/// `ja_JP.UTF-8`, `ja-JP` and `ja` all select the `ja` catalogue.
fn normalize(lang: &str) -> String {
    let code = lang
        .split(|c| c == '_' || c == '-' || c == '.')
        .next()
        .unwrap_or(FALLBACK_LANG)
        .to_ascii_lowercase();

    if POT.get(&code).is_some() {
        code
    } else {
        String::from(FALLBACK_LANG)
    }
}

fn lookup(lang: &str, key: Message) -> Option<String> {
    POT.get(lang)?
        .children()?
        .get_arg(key.as_str())?
        .as_string()
        .map(String::from)
}

pub fn get_str(key: Message) -> String {
    let lang = get_lang();
    lookup(&lang, key)
        .or_else(|| lookup(FALLBACK_LANG, key))
        .unwrap_or_else(|| key.as_str().to_string())
}

pub fn get_lang() -> String {
    match LANG.read() {
        Ok(lang) => lang.clone(),
        Err(_) => String::from(FALLBACK_LANG),
    }
}

pub fn set_lang(lang: &str) {
    let lang = normalize(lang);
    log::info!("set language {lang}");
    if let Ok(mut current) = LANG.write() {
        *current = lang;
    }
}
