//! Instruction text and response schema sent with every extraction call.

use serde_json::{json, Value};

const CHEF_INSTRUCTIONS: &str = "\
You are a professional chef that extracts recipe information from cooking videos.
Analyze the video content carefully and provide detailed ingredient lists and cooking instructions.

Watch the entire video and identify:
- The exact recipe being prepared
- All ingredients used (with measurements if shown)
- Step-by-step cooking instructions
- Preparation and cooking times if mentioned
- Difficulty level and cuisine type

Focus on precise measurements and important cooking instruction notes.
Be accurate - only extract information that is clearly shown or mentioned in the video.";

/// Full prompt for one video.
pub fn recipe_prompt(video_url: &str) -> String {
    format!("{CHEF_INSTRUCTIONS}\n\nVideo URL: {video_url}\n")
}

/// JSON schema the model is asked to answer in. Mirrors the serde shape of
/// `chef_core::recipe::Recipe`.
pub fn recipe_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recipe_overview": {
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "prep_time": {"type": ["string", "null"]},
                    "cook_time": {"type": ["string", "null"]},
                    "servings": {"type": "integer"},
                    "difficulty": {
                        "type": ["string", "null"],
                        "enum": ["Easy", "Intermediate", "Advanced", null]
                    },
                    "cuisine_type": {"type": ["string", "null"]}
                },
                "required": ["title", "servings"]
            },
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "item": {"type": "string"},
                        "amount": {"type": "string"},
                        "unit": {"type": ["string", "null"]},
                        "notes": {"type": ["string", "null"]}
                    },
                    "required": ["item", "amount"]
                }
            },
            "instructions": {
                "type": "array",
                "items": {"type": "string"}
            },
            "equipment": {
                "type": ["array", "null"],
                "items": {"type": "string"}
            }
        },
        "required": ["recipe_overview", "ingredients", "instructions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_the_url() {
        let prompt = recipe_prompt("https://www.tiktok.com/@chef/video/1");
        assert!(prompt.starts_with("You are a professional chef"));
        assert!(prompt.contains("Video URL: https://www.tiktok.com/@chef/video/1"));
    }

    #[test]
    fn schema_requires_the_three_sections() {
        let schema = recipe_response_schema();
        assert_eq!(
            schema["required"],
            json!(["recipe_overview", "ingredients", "instructions"])
        );
        assert_eq!(
            schema["properties"]["recipe_overview"]["required"],
            json!(["title", "servings"])
        );
    }
}
