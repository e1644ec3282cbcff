//! Prompt templates for post generation

/// Maximum number of words kept from a generated title
pub const TITLE_WORD_LIMIT: usize = 18;

const FALLBACK_BODY_PERSONA: &str = "a playful social strategist";

/// What a post should be about and how it should sound
#[derive(Debug, Clone, Copy)]
pub struct PostBrief<'a> {
    pub topic: &'a str,
    pub tone: &'a str,
    pub region: &'a str,
    pub persona: &'a str,
}

impl PostBrief<'_> {
    fn region_label(&self) -> String {
        self.region.replace('_', " ")
    }
}

/// Prompt asking for one catchy title
pub fn title_prompt(style_context: &str, brief: &PostBrief<'_>) -> String {
    with_style(
        style_context,
        format!(
            "Craft a catchy, scroll-stopping Reddit post title for the topic '{}'. \
             Keep it under {} words, aim for readers in {}, and match a {} vibe. \
             Lean into the persona '{}' if it adds flair, and include one relevant emoji only if it boosts appeal.",
            brief.topic,
            TITLE_WORD_LIMIT,
            brief.region_label(),
            brief.tone.to_lowercase(),
            brief.persona
        ),
    )
}

/// Prompt asking for a full self-post of `paragraphs` paragraphs
pub fn body_prompt(style_context: &str, brief: &PostBrief<'_>, paragraphs: u8) -> String {
    let persona = if brief.persona.is_empty() {
        FALLBACK_BODY_PERSONA
    } else {
        brief.persona
    };
    with_style(
        style_context,
        format!(
            "You're {}. Create a lively Reddit self-post about '{}' for readers in {}. \
             Use a {} tone and deliver {} vivid paragraphs. Blend storytelling, one playful stat or fun fact, \
             a social-media-style CTA, and finish with a hashtag cluster. \
             Utilize markdown (bold, italics, bullet points) where it enhances readability. \
             Make sure the voice is consistent with the style samples above.",
            persona,
            brief.topic,
            brief.region_label(),
            brief.tone.to_lowercase(),
            paragraphs
        ),
    )
}

/// Keep the first [`TITLE_WORD_LIMIT`] words, joined by single spaces
pub fn clamp_title(raw: &str) -> String {
    raw.split_whitespace()
        .take(TITLE_WORD_LIMIT)
        .collect::<Vec<_>>()
        .join(" ")
}

fn with_style(style_context: &str, instruction: String) -> String {
    if style_context.is_empty() {
        instruction
    } else {
        format!("{}\n\n{}", style_context, instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> PostBrief<'static> {
        PostBrief {
            topic: "Solar eclipse",
            tone: "Playful",
            region: "united_kingdom",
            persona: "an amateur astronomer",
        }
    }

    #[test]
    fn test_title_prompt_without_style() {
        let prompt = title_prompt("", &brief());
        assert!(prompt.starts_with("Craft a catchy, scroll-stopping Reddit post title for the topic 'Solar eclipse'."));
        assert!(prompt.contains("Keep it under 18 words, aim for readers in united kingdom, and match a playful vibe."));
        assert!(prompt.contains("persona 'an amateur astronomer'"));
    }

    #[test]
    fn test_title_prompt_with_style() {
        let prompt = title_prompt("STYLE", &brief());
        assert!(prompt.starts_with("STYLE\n\nCraft a catchy"));
    }

    #[test]
    fn test_body_prompt() {
        let prompt = body_prompt("", &brief(), 7);
        assert!(prompt.starts_with("You're an amateur astronomer. Create a lively Reddit self-post about 'Solar eclipse' for readers in united kingdom."));
        assert!(prompt.contains("Use a playful tone and deliver 7 vivid paragraphs."));
        assert!(prompt.ends_with("Make sure the voice is consistent with the style samples above."));
    }

    #[test]
    fn test_body_prompt_blank_persona() {
        let mut brief = brief();
        brief.persona = "";
        assert!(body_prompt("", &brief, 5).starts_with("You're a playful social strategist."));
    }

    #[test]
    fn test_clamp_title() {
        let long: Vec<String> = (1..=25).map(|i| format!("w{}", i)).collect();
        let clamped = clamp_title(&long.join("  "));
        assert_eq!(clamped.split(' ').count(), 18);
        assert!(clamped.starts_with("w1 w2"));
        assert!(clamped.ends_with("w18"));

        assert_eq!(clamp_title("  Short\ttitle \n"), "Short title");
    }
}
