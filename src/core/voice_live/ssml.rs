//! SSML document generation for Azure neural voices.

use std::fmt::Write;

pub const SSML_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";
pub const MSTTS_NAMESPACE: &str = "https://www.w3.org/2001/mstts";

/// Voice and prosody used when wrapping plain text in SSML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsmlOptions {
    /// Azure voice short name, e.g. `en-US-AvaMultilingualNeural`
    pub voice: String,
    /// BCP-47 locale, e.g. `pt-PT`
    pub language: String,
    /// Prosody rate (`medium`, `slow`, `+10%`, ...)
    pub rate: String,
    /// Prosody pitch (`medium`, `+2st`, ...)
    pub pitch: String,
}

impl SsmlOptions {
    pub fn new(voice: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            language: language.into(),
            rate: "medium".to_string(),
            pitch: "medium".to_string(),
        }
    }
}

/// Emphasis strength for [`emphasis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmphasisLevel {
    Strong,
    #[default]
    Moderate,
    Reduced,
}

impl EmphasisLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Reduced => "reduced",
        }
    }
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap plain text in a complete `<speak>` document.
///
/// The text is escaped. Attribute values from `options` are escaped as well.
pub fn generate_ssml(text: &str, options: &SsmlOptions) -> String {
    let language = escape_xml(&options.language);
    let mut ssml = String::with_capacity(text.len() + 512);

    // Writing to a String cannot fail.
    let _ = write!(
        ssml,
        concat!(
            "<speak version=\"1.0\" xmlns=\"{ns}\" xmlns:mstts=\"{mstts}\" xml:lang=\"{lang}\">\n",
            "  <voice name=\"{voice}\">\n",
            "    <lang xml:lang=\"{lang}\">\n",
            "      <mstts:express-as style=\"general\">\n",
            "        <prosody rate=\"{rate}\" pitch=\"{pitch}\">{text}</prosody>\n",
            "      </mstts:express-as>\n",
            "    </lang>\n",
            "  </voice>\n",
            "</speak>"
        ),
        ns = SSML_NAMESPACE,
        mstts = MSTTS_NAMESPACE,
        lang = language,
        voice = escape_xml(&options.voice),
        rate = escape_xml(&options.rate),
        pitch = escape_xml(&options.pitch),
        text = escape_xml(text),
    );
    ssml
}

/// `<emphasis>` fragment. `text` is inserted as-is so fragments can nest.
pub fn emphasis(text: &str, level: EmphasisLevel) -> String {
    format!("<emphasis level=\"{}\">{text}</emphasis>", level.as_str())
}

/// `<break>` fragment.
pub fn pause(duration_ms: u32) -> String {
    format!("<break time=\"{duration_ms}ms\"/>")
}

/// `<phoneme>` fragment with an explicit pronunciation.
pub fn phoneme(text: &str, ph: &str, alphabet: &str) -> String {
    format!(
        "<phoneme alphabet=\"{}\" ph=\"{}\">{text}</phoneme>",
        escape_xml(alphabet),
        escape_xml(ph)
    )
}

/// True if the text is already an SSML document.
pub fn is_ssml(text: &str) -> bool {
    text.trim_start().starts_with("<speak")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"Tom & Jerry <said> "hi" 'there'"#),
            "Tom &amp; Jerry &lt;said&gt; &quot;hi&quot; &apos;there&apos;"
        );
        assert_eq!(escape_xml("olá"), "olá");
    }

    #[test]
    fn test_generate_ssml_uses_options() {
        let mut options = SsmlOptions::new("pt-PT-RaquelNeural", "pt-PT");
        options.rate = "+10%".into();
        options.pitch = "+2st".into();

        let ssml = generate_ssml("Olá & adeus", &options);
        assert!(ssml.starts_with("<speak version=\"1.0\""));
        assert!(ssml.contains("xml:lang=\"pt-PT\""));
        assert!(ssml.contains("<voice name=\"pt-PT-RaquelNeural\">"));
        assert!(ssml.contains("<mstts:express-as style=\"general\">"));
        assert!(ssml.contains("<prosody rate=\"+10%\" pitch=\"+2st\">Olá &amp; adeus</prosody>"));
        assert!(ssml.ends_with("</speak>"));
    }

    #[test]
    fn test_default_prosody() {
        let ssml = generate_ssml("hi", &SsmlOptions::new("v", "en-US"));
        assert!(ssml.contains("rate=\"medium\" pitch=\"medium\""));
    }

    #[test]
    fn test_fragments() {
        assert_eq!(
            emphasis("now", EmphasisLevel::Strong),
            "<emphasis level=\"strong\">now</emphasis>"
        );
        assert_eq!(pause(500), "<break time=\"500ms\"/>");
        assert_eq!(
            phoneme("tomato", "təˈmeɪtoʊ", "ipa"),
            "<phoneme alphabet=\"ipa\" ph=\"təˈmeɪtoʊ\">tomato</phoneme>"
        );
    }

    #[test]
    fn test_is_ssml() {
        assert!(is_ssml("  <speak version=\"1.0\">"));
        assert!(!is_ssml("hello <speak"));
    }
}
