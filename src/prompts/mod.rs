//! Outgoing message generation
//!
//! Each cycle picks one topic uniformly from the table and embeds it verbatim
//! in the message template. The random source is passed in so a seeded
//! generator gives reproducible choices.

pub mod topics;

pub use topics::DEFAULT_TOPICS;

use crate::config::PromptConfig;
use rand::Rng;

/// Placeholder replaced by the chosen topic
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Template used when the config does not supply one
pub const DEFAULT_TEMPLATE: &str = "Hello, I'd like you to tell me a long story about {topic}.";

/// Topic table plus message template
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use storyloop::config::PromptConfig;
/// use storyloop::prompts::StoryPrompts;
///
/// let prompts = StoryPrompts::from_config(&PromptConfig::default());
/// let mut rng = StdRng::seed_from_u64(7);
/// let (topic, message) = prompts.next_message(&mut rng);
/// assert!(message.contains(topic));
/// ```
#[derive(Debug, Clone)]
pub struct StoryPrompts {
    template: String,
    topics: Vec<String>,
}

impl StoryPrompts {
    /// Build the prompt set from configuration
    pub fn from_config(config: &PromptConfig) -> Self {
        Self {
            template: config.template.clone(),
            topics: config.topics.clone(),
        }
    }

    /// Number of topics in the table
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Topics in table order
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Embed `topic` verbatim in the template
    pub fn render(&self, topic: &str) -> String {
        self.template.replace(TOPIC_PLACEHOLDER, topic)
    }

    /// Pick a topic uniformly at random
    ///
    /// # Panics
    ///
    /// Panics if the table is empty; `Config::validate` rejects that case.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> &str {
        let index = rng.random_range(0..self.topics.len());
        &self.topics[index]
    }

    /// Pick a topic and render the message for it
    pub fn next_message<R: Rng>(&self, rng: &mut R) -> (&str, String) {
        let topic = self.choose(rng);
        (topic, self.render(topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn prompts() -> StoryPrompts {
        StoryPrompts::from_config(&PromptConfig::default())
    }

    #[test]
    fn test_render_embeds_topic_verbatim() {
        let prompts = prompts();
        for topic in DEFAULT_TOPICS {
            let message = prompts.render(topic);
            assert_eq!(
                message,
                format!("Hello, I'd like you to tell me a long story about {}.", topic)
            );
        }
    }

    #[test]
    fn test_render_keeps_special_characters() {
        let prompts = prompts();
        let topic = r#"a "quoted" {brace} \ slash"#;
        assert!(prompts.render(topic).contains(topic));
    }

    #[test]
    fn test_custom_template() {
        let prompts = StoryPrompts::from_config(&PromptConfig {
            template: "Story: {topic}!".to_string(),
            topics: vec!["owls".to_string()],
        });
        assert_eq!(prompts.render("owls"), "Story: owls!");
    }

    #[test]
    fn test_choose_is_deterministic_for_seed() {
        let prompts = prompts();
        let mut a = StdRng::seed_from_u64(1234);
        let mut b = StdRng::seed_from_u64(1234);
        let first: Vec<String> = (0..20).map(|_| prompts.choose(&mut a).to_string()).collect();
        let second: Vec<String> = (0..20).map(|_| prompts.choose(&mut b).to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_choose_covers_table_roughly_uniformly() {
        let prompts = prompts();
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = vec![0usize; prompts.len()];
        let draws = 16_000;
        for _ in 0..draws {
            let topic = prompts.choose(&mut rng);
            let index = prompts.topics().iter().position(|t| t == topic).unwrap();
            counts[index] += 1;
        }
        let expected = draws / prompts.len();
        for count in counts {
            assert!(count > expected / 2, "count {} too low", count);
            assert!(count < expected * 3 / 2, "count {} too high", count);
        }
    }

    #[test]
    fn test_next_message_matches_topic() {
        let prompts = prompts();
        let mut rng = StdRng::seed_from_u64(5);
        let (topic, message) = prompts.next_message(&mut rng);
        assert_eq!(message, prompts.render(topic));
    }
}
