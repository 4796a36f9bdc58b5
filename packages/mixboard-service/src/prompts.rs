//! Prompt templates for the analysis and image roles.

/// Character budget for the digest slice fed to the visual concept stage.
const VISUAL_CONTEXT_CAP: usize = 3_000;

pub fn summary_prompt(item_name: &str, digest: &str) -> String {
	format!(
		"You are an expert content curator. Analyze the following board content \
		 and generate a visual theme and a concise summary context.\n\
		 \n\
		 BOARD DATA:\n\
		 Name: {item_name}\n\
		 Content:\n\
		 {digest}\n\
		 \n\
		 TASK:\n\
		 1. Summary: write a 2-sentence summary of what this board is about.\n\
		 2. Theme: choose the best color theme from the list below based on the mood.\n\
		 \n\
		 THEMES:\n\
		 - blue (Professional, Calm)\n\
		 - purple (Creative, Deep)\n\
		 - emerald (Growth, Fresh)\n\
		 - orange (Energetic, Warm)\n\
		 - pink (Playful, Vibrant)\n\
		 - slate (Neutral, Minimal)\n\
		 \n\
		 OUTPUT FORMAT (JSON ONLY):\n\
		 {{\n\
		 \t\"summary\": \"This board explores...\",\n\
		 \t\"theme\": \"color_name\"\n\
		 }}"
	)
}

pub fn visual_concept_prompt(digest: &str) -> String {
	let context = digest.chars().take(VISUAL_CONTEXT_CAP).collect::<String>();

	format!(
		"You are an expert illustrator specializing in soft flat illustration.\n\
		 \n\
		 MANDATORY STYLE: soft colors, rounded shapes, hand-drawn feel, \
		 textureless or soft-textured, warm atmosphere.\n\
		 \n\
		 CONTENT TO ANALYZE:\n\
		 \"\"\"\n\
		 {context}\n\
		 \"\"\"\n\
		 \n\
		 TASK:\n\
		 1. Subject: identify the main activity or topic and pick one or two \
		 characters acting it out. Vary the cast: women, children, elderly \
		 people, or animals where appropriate.\n\
		 2. Character design: soft rounded features, dot eyes, simple smile, \
		 pastel or warm clothing colors. No sharp angles, no detailed noses, \
		 simple hands.\n\
		 3. Style: flat but warm, no outlines or soft colored outlines.\n\
		 \n\
		 OUTPUT FORMAT (1-2 sentences):\n\
		 Describe ONLY the character(s) and their action or setting."
	)
}

pub fn image_prompt(visual_concept: &str) -> String {
	format!(
		"You are an expert prompt engineer for soft flat illustration image \
		 generation.\n\
		 \n\
		 CHARACTER CONCEPT: \"{visual_concept}\"\n\
		 \n\
		 CRITICAL RULES:\n\
		 1. Style MUST be soft flat illustration: low saturation, warm pastel \
		 colors, soft rounded clean lines or no lines.\n\
		 2. Faces: simple dot eyes, simple smiles, generic but expressive.\n\
		 3. Proportions: soft and slightly rounded, 2-3 heads tall. NOT \
		 realistic, NOT standard anime.\n\
		 4. Background: minimal, solid or simple pattern, white or beige \
		 dominant.\n\
		 5. No text: the image must NOT contain any text.\n\
		 \n\
		 NEGATIVE CONSTRAINTS:\n\
		 - NO anime big eyes, detailed shading, cinematic lighting, sharp \
		 outlines, or 3D render.\n\
		 - NO flat vector art with exaggerated limbs.\n\
		 \n\
		 ALLOWED STYLE KEYWORDS:\n\
		 - soft illustration, warm pastel colors, cute simple character, \
		 hand-drawn feel, clip art.\n\
		 \n\
		 OUTPUT: Return ONLY the final English image prompt (1-2 sentences \
		 maximum).\n\
		 \n\
		 FINAL PROMPT:"
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn visual_concept_prompt_caps_its_context_slice() {
		// Marker character that cannot occur in the template text itself.
		let digest = "ξ".repeat(10_000);
		let prompt = visual_concept_prompt(&digest);
		let run = prompt.chars().filter(|&c| c == 'ξ').count();

		assert_eq!(run, VISUAL_CONTEXT_CAP);
	}

	#[test]
	fn summary_prompt_names_the_item() {
		let prompt = summary_prompt("Roadmap", "Plan the Q3 launch.");

		assert!(prompt.contains("Name: Roadmap"));
		assert!(prompt.contains("Plan the Q3 launch."));
		assert!(prompt.contains("JSON ONLY"));
	}
}
