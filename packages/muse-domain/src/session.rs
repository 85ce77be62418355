use serde::{Deserialize, Serialize};

/// Longest description, in characters, carried into session content.
pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDetails {
	pub genre: Option<String>,
	pub priority: Option<String>,
	pub status: Option<String>,
	pub tags: Vec<String>,
	pub description: Option<String>,
}

/// Composes the text recorded for a notable action, e.g. `task created: "Mix vocals"` followed by
/// one labeled line per present detail.
pub fn build_session_content(
	action: &str,
	entity_type: &str,
	title: &str,
	details: &SessionDetails,
) -> String {
	let mut lines = vec![format!("{entity_type} {action}: \"{title}\"")];

	for (label, value) in [
		("Genre", details.genre.as_deref()),
		("Priority", details.priority.as_deref()),
		("Status", details.status.as_deref()),
	] {
		if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
			lines.push(format!("{label}: {value}"));
		}
	}

	let tags: Vec<&str> =
		details.tags.iter().map(|tag| tag.trim()).filter(|tag| !tag.is_empty()).collect();

	if !tags.is_empty() {
		lines.push(format!("Tags: {}", tags.join(", ")));
	}
	if let Some(description) =
		details.description.as_deref().map(str::trim).filter(|value| !value.is_empty())
	{
		lines.push(format!("Description: {}", truncate_chars(description, DESCRIPTION_MAX_CHARS)));
	}

	lines.join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
		None => text.to_string(),
	}
}
