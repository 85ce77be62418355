use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
	Note,
	Task,
	Project,
	SessionEvent,
}
impl EntityType {
	pub const ALL: [Self; 4] = [Self::Note, Self::Task, Self::Project, Self::SessionEvent];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Note => "note",
			Self::Task => "task",
			Self::Project => "project",
			Self::SessionEvent => "session_event",
		}
	}
}
impl fmt::Display for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for EntityType {
	type Err = ParseEntityTypeError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim() {
			"note" => Ok(Self::Note),
			"task" => Ok(Self::Task),
			"project" => Ok(Self::Project),
			"session_event" => Ok(Self::SessionEvent),
			other => Err(ParseEntityTypeError { raw: other.to_string() }),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown entity type {raw:?}.")]
pub struct ParseEntityTypeError {
	pub raw: String,
}

/// Identity key of every embedding record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
	pub entity_type: EntityType,
	pub entity_id: Uuid,
}
impl EntityRef {
	pub fn new(entity_type: EntityType, entity_id: Uuid) -> Self {
		Self { entity_type, entity_id }
	}
}
impl fmt::Display for EntityRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.entity_type, self.entity_id)
	}
}

/// Fields previously extracted from a note by the generation model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteMemory {
	pub transcript: Option<String>,
	pub summary: Option<String>,
	pub concepts: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteEntity {
	pub title: Option<String>,
	pub content: Option<String>,
	pub note_type: Option<String>,
	pub tags: Vec<String>,
	pub memory: NoteMemory,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskEntity {
	pub title: Option<String>,
	pub description: Option<String>,
	pub task_type: Option<String>,
	pub tags: Vec<String>,
	pub status: Option<String>,
	pub priority: Option<String>,
	pub due_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntity {
	pub name: Option<String>,
	pub description: Option<String>,
	pub project_type: Option<String>,
	pub tags: Vec<String>,
	pub genre: Option<String>,
	pub status: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEventEntity {
	pub event_type: Option<String>,
	pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum Entity {
	Note(NoteEntity),
	Task(TaskEntity),
	Project(ProjectEntity),
	SessionEvent(SessionEventEntity),
}
impl Entity {
	pub fn entity_type(&self) -> EntityType {
		match self {
			Self::Note(_) => EntityType::Note,
			Self::Task(_) => EntityType::Task,
			Self::Project(_) => EntityType::Project,
			Self::SessionEvent(_) => EntityType::SessionEvent,
		}
	}

	/// Builds a variant from a loose field map.
	///
	/// Unknown keys and values of an unexpected JSON type are ignored. Tags may be given as an
	/// array of strings or as a single comma-separated string.
	pub fn from_fields(entity_type: EntityType, fields: &Map<String, Value>) -> Self {
		match entity_type {
			EntityType::Note => Self::Note(NoteEntity {
				title: text_field(fields, &["title"]),
				content: text_field(fields, &["content", "text"]),
				note_type: text_field(fields, &["note_type", "type"]),
				tags: list_field(fields, "tags"),
				memory: NoteMemory {
					transcript: text_field(fields, &["transcript"]),
					summary: text_field(fields, &["summary"]),
					concepts: list_field(fields, "concepts"),
				},
			}),
			EntityType::Task => Self::Task(TaskEntity {
				title: text_field(fields, &["title"]),
				description: text_field(fields, &["description"]),
				task_type: text_field(fields, &["task_type", "type"]),
				tags: list_field(fields, "tags"),
				status: text_field(fields, &["status"]),
				priority: text_field(fields, &["priority"]),
				due_date: text_field(fields, &["due_date"]),
			}),
			EntityType::Project => Self::Project(ProjectEntity {
				name: text_field(fields, &["name", "title"]),
				description: text_field(fields, &["description"]),
				project_type: text_field(fields, &["project_type", "type"]),
				tags: list_field(fields, "tags"),
				genre: text_field(fields, &["genre"]),
				status: text_field(fields, &["status"]),
			}),
			EntityType::SessionEvent => Self::SessionEvent(SessionEventEntity {
				event_type: text_field(fields, &["event_type"]),
				content: text_field(fields, &["content"]),
			}),
		}
	}
}

fn text_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
	keys.iter().find_map(|key| fields.get(*key).and_then(Value::as_str)).map(str::to_string)
}

fn list_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
	match fields.get(key) {
		Some(Value::Array(items)) =>
			items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
		Some(Value::String(raw)) => raw.split(',').map(|item| item.trim().to_string()).collect(),
		_ => Vec::new(),
	}
}
