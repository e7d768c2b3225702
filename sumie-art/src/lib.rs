//! Art-direction templates for the interview platform's visual identity
//! ("Calm Confidence"): warm light, paper texture, muted earth tones.
//!
//! Templates are static data. The prompt builder resolves a template name and
//! caller parameters into the final Midjourney prompt text plus the aspect
//! ratio the remote generator expects.

use clap::ValueEnum;
use thiserror::Error;

/// Core style clauses shared by the fixed templates and custom prompts.
pub const STYLE_BASE: &str = "soft golden ambient light, subtle paper texture, \
                              muted warm earth tones, artisanal crafted quality, \
                              atmospheric depth, layered elements";

/// Trailing directives applied to the heaviest-styled templates.
pub const STYLE_SUFFIX: &str = "--style raw --no people faces text";

/// Marker replaced by the caller-supplied feature name.
pub const FEATURE_PLACEHOLDER: &str = "[FEATURE]";

/// Substituted for [`FEATURE_PLACEHOLDER`] when no feature was supplied.
pub const DEFAULT_FEATURE: &str = "Developer Tools";

const STYLE_DIRECTIVE: &str = "--style";

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("unknown template '{name}' (available: {available})")]
    UnknownTemplate { name: String, available: String },
    #[error("template '{template}' requires --{parameter}")]
    MissingParameter {
        template: &'static str,
        parameter: &'static str,
    },
}

/// Interview pairing rendered by the `interview-banner` template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InterviewMode {
    #[default]
    HumanHuman,
    BotHuman,
    BotBot,
}

/// One prompt per interview mode.
#[derive(Debug, Clone, Copy)]
pub struct ModePrompts {
    pub human_human: &'static str,
    pub bot_human: &'static str,
    pub bot_bot: &'static str,
}

impl ModePrompts {
    pub fn for_mode(&self, mode: InterviewMode) -> &'static str {
        match mode {
            InterviewMode::HumanHuman => self.human_human,
            InterviewMode::BotHuman => self.bot_human,
            InterviewMode::BotBot => self.bot_bot,
        }
    }
}

/// A template carries either one fixed prompt or one prompt per mode.
#[derive(Debug, Clone, Copy)]
pub enum PromptSource {
    Fixed(&'static str),
    ByMode(ModePrompts),
}

/// Parameter a template cannot be built without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredParam {
    Feature,
    Mode,
}

impl RequiredParam {
    /// CLI flag name, without the leading dashes.
    pub fn flag(self) -> &'static str {
        match self {
            RequiredParam::Feature => "feature",
            RequiredParam::Mode => "mode",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub aspect_ratio: &'static str,
    pub source: PromptSource,
    pub requires: &'static [RequiredParam],
}

const TEMPLATES: &[Template] = &[
    Template {
        name: "hero-banner",
        description: "Landing page hero banner (2560x1440)",
        aspect_ratio: "16:9",
        source: PromptSource::Fixed(
            "atmospheric developer sanctuary, soft golden ambient light, \
             subtle paper texture, muted warm earth tones, \
             artisanal crafted quality, atmospheric depth, layered elements, \
             depth of field, code editor glow in distance, \
             feeling of quiet preparation before important moment, \
             CENTER-WEIGHTED composition for responsive cropping, \
             cinematic --style raw --no people faces text",
        ),
        requires: &[],
    },
    Template {
        name: "og-card",
        description: "Social/OG card for sharing (1200x630)",
        aspect_ratio: "1.91:1",
        source: PromptSource::Fixed(
            "abstract developer workspace essence, warm amber glow, \
             layered paper textures, soft geometric code symbols, \
             calm focused atmosphere, premium handcrafted feel, \
             TEXT-SAFE MARGINS (keep edges clear for platform overlays), \
             golden hour lighting --style raw",
        ),
        requires: &[],
    },
    Template {
        name: "twitter-card",
        description: "Twitter/X card (1200x600)",
        aspect_ratio: "2:1",
        source: PromptSource::Fixed(
            "abstract developer workspace essence, warm amber glow, \
             layered paper textures, soft geometric code symbols, \
             calm focused atmosphere, premium handcrafted feel, \
             TEXT-SAFE MARGINS, golden hour lighting --style raw",
        ),
        requires: &[],
    },
    Template {
        name: "icon-sheet",
        description: "Developer icon concept sheet (1024x1024)",
        aspect_ratio: "1:1",
        source: PromptSource::Fixed(
            "minimal developer icon set, monoline style with organic curves, \
             subtle hand-drawn imperfection, warm golden accent color, \
             dark background, code brackets and flow symbols, \
             consistent stroke weight, soft rounded terminals, \
             HIGH CONTRAST for small size legibility, \
             artisanal quality --style raw --no 3d realistic gradient",
        ),
        requires: &[],
    },
    Template {
        name: "feature-banner",
        description: "Feature section banner (1920x640)",
        aspect_ratio: "3:1",
        source: PromptSource::Fixed(
            "abstract representation of [FEATURE], atmospheric depth, \
             soft focus layers, warm amber and deep charcoal palette, \
             subtle noise texture overlay, feeling of calm confidence, \
             HORIZONTAL composition optimized for wide banner, \
             developer-focused visual metaphor --style raw",
        ),
        requires: &[RequiredParam::Feature],
    },
    Template {
        name: "mobile-hero",
        description: "Mobile hero vertical (750x1334)",
        aspect_ratio: "9:16",
        source: PromptSource::Fixed(
            "atmospheric developer moment, vertical composition, \
             soft golden light from above, subtle paper grain texture, \
             CENTERED focal point for safe cropping, \
             calm preparation feeling, artisanal warmth, \
             muted earth tones --style raw --no text",
        ),
        requires: &[],
    },
    Template {
        name: "interview-banner",
        description: "Interview mode specific banner",
        aspect_ratio: "16:9",
        source: PromptSource::ByMode(ModePrompts {
            human_human: "two abstract warm glowing forms in conversation, \
                          soft golden ambient light, collaborative atmosphere, \
                          subtle paper texture, depth and warmth, \
                          feeling of mutual respect and preparation, \
                          muted earth tones --style raw --no people faces text",
            bot_human: "abstract warm glow meeting geometric form, \
                        soft amber light bridging organic and structured, \
                        subtle texture, atmospheric depth, \
                        feeling of supportive AI presence, \
                        human warmth despite technology --style raw --no faces robots",
            bot_bot: "two geometric forms in harmonic dialogue, \
                      soft golden light, structured but warm, \
                      subtle paper texture, layered depth, \
                      feeling of precise orchestration, \
                      technical elegance --style raw --no robots faces",
        }),
        requires: &[RequiredParam::Mode],
    },
    Template {
        name: "card-background",
        description: "Card/tile background (800x600)",
        aspect_ratio: "4:3",
        source: PromptSource::Fixed(
            "abstract atmospheric background, soft golden ambient light, \
             subtle paper texture, muted warm earth tones, \
             artisanal crafted quality, atmospheric depth, layered elements, \
             soft focus, subtle geometric patterns, \
             warm charcoal base with amber accents, \
             premium texture overlay --style raw --no text objects",
        ),
        requires: &[],
    },
];

/// The full template catalog, in display order.
pub fn templates() -> &'static [Template] {
    TEMPLATES
}

pub fn find_template(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.name == name)
}

fn template_names() -> String {
    TEMPLATES
        .iter()
        .map(|template| template.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Caller-supplied inputs to [`build_prompt`].
#[derive(Debug, Default, Clone)]
pub struct PromptParams<'a> {
    pub feature: Option<&'a str>,
    pub mode: Option<InterviewMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub text: String,
    pub aspect_ratio: &'static str,
}

/// Resolve a template name and parameters into prompt text and aspect ratio.
///
/// # Errors
///
/// Returns [`ArtError::UnknownTemplate`] when the name is not in the catalog
/// and [`ArtError::MissingParameter`] when a parameter the template declares
/// as required is absent or blank.
pub fn build_prompt(name: &str, params: &PromptParams<'_>) -> Result<BuiltPrompt, ArtError> {
    let template = find_template(name).ok_or_else(|| ArtError::UnknownTemplate {
        name: name.to_string(),
        available: template_names(),
    })?;

    for required in template.requires {
        let present = match required {
            RequiredParam::Feature => params
                .feature
                .map(str::trim)
                .is_some_and(|feature| !feature.is_empty()),
            RequiredParam::Mode => params.mode.is_some(),
        };
        if !present {
            return Err(ArtError::MissingParameter {
                template: template.name,
                parameter: required.flag(),
            });
        }
    }

    let text = match &template.source {
        PromptSource::Fixed(text) => (*text).to_string(),
        PromptSource::ByMode(prompts) => prompts
            .for_mode(params.mode.unwrap_or_default())
            .to_string(),
    };

    Ok(BuiltPrompt {
        text: substitute_feature(&text, params.feature),
        aspect_ratio: template.aspect_ratio,
    })
}

/// Append the shared art direction to a custom prompt, unless the text
/// already carries a style directive. Idempotent: styling an already styled
/// prompt returns it unchanged.
pub fn apply_art_direction(prompt: &str) -> String {
    if prompt.to_lowercase().contains(STYLE_DIRECTIVE) {
        return prompt.to_string();
    }
    format!("{prompt}, {STYLE_BASE}, --style raw")
}

fn substitute_feature(text: &str, feature: Option<&str>) -> String {
    if !text.contains(FEATURE_PLACEHOLDER) {
        return text.to_string();
    }
    let feature = feature
        .map(str::trim)
        .filter(|feature| !feature.is_empty())
        .unwrap_or(DEFAULT_FEATURE);
    text.replace(FEATURE_PLACEHOLDER, feature)
}

#[cfg(test)]
mod tests;
