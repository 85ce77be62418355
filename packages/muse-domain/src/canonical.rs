//! Flattens entities into the single text string that is embedded and searched.
//!
//! Output is deterministic: present fields are trimmed, empty ones dropped, and the rest joined
//! with `". "` in a fixed per-variant order. An entity with nothing to say yields `""`.

use serde_json::{Map, Value};

use crate::entity::{
	Entity, EntityType, NoteEntity, ProjectEntity, SessionEventEntity, TaskEntity,
};

const SEPARATOR: &str = ". ";

pub fn canonicalize(entity: &Entity) -> String {
	let mut parts = Parts::default();

	match entity {
		Entity::Note(note) => note_parts(&mut parts, note),
		Entity::Task(task) => task_parts(&mut parts, task),
		Entity::Project(project) => project_parts(&mut parts, project),
		Entity::SessionEvent(event) => session_event_parts(&mut parts, event),
	}

	parts.finish()
}

/// Canonicalizes a loose field map; see [`Entity::from_fields`] for the accepted keys.
pub fn canonicalize_fields(entity_type: EntityType, fields: &Map<String, Value>) -> String {
	canonicalize(&Entity::from_fields(entity_type, fields))
}

fn note_parts(parts: &mut Parts, note: &NoteEntity) {
	parts.raw(note.title.as_deref());
	parts.raw(note.content.as_deref());
	parts.labeled("Type", note.note_type.as_deref());
	parts.list("Tags", &note.tags);
	parts.raw(note.memory.transcript.as_deref());
	parts.labeled("Summary", note.memory.summary.as_deref());
	parts.list("Concepts", &note.memory.concepts);
}

fn task_parts(parts: &mut Parts, task: &TaskEntity) {
	parts.raw(task.title.as_deref());
	parts.raw(task.description.as_deref());
	parts.labeled("Type", task.task_type.as_deref());
	parts.list("Tags", &task.tags);
	parts.labeled("Status", task.status.as_deref());
	parts.labeled("Priority", task.priority.as_deref());
	parts.labeled("Due", task.due_date.as_deref());
}

fn project_parts(parts: &mut Parts, project: &ProjectEntity) {
	parts.raw(project.name.as_deref());
	parts.raw(project.description.as_deref());
	parts.labeled("Type", project.project_type.as_deref());
	parts.list("Tags", &project.tags);
	parts.labeled("Genre", project.genre.as_deref());
	parts.labeled("Status", project.status.as_deref());
}

fn session_event_parts(parts: &mut Parts, event: &SessionEventEntity) {
	parts.raw(event.content.as_deref());
	parts.labeled("Type", event.event_type.as_deref());
}

#[derive(Default)]
struct Parts(Vec<String>);
impl Parts {
	fn raw(&mut self, value: Option<&str>) {
		if let Some(value) = non_empty(value) {
			self.push(value.to_string());
		}
	}

	fn labeled(&mut self, label: &str, value: Option<&str>) {
		if let Some(value) = non_empty(value) {
			self.push(format!("{label}: {value}"));
		}
	}

	fn list(&mut self, label: &str, items: &[String]) {
		let items: Vec<&str> =
			items.iter().map(|item| item.trim()).filter(|item| !item.is_empty()).collect();

		if !items.is_empty() {
			self.push(format!("{label}: {}", items.join(", ")));
		}
	}

	// The separator supplies the period, so a part keeps none of its own.
	fn push(&mut self, mut part: String) {
		if part.ends_with('.') {
			part.pop();
		}

		let part = part.trim_end();

		if !part.is_empty() {
			self.0.push(part.to_string());
		}
	}

	fn finish(self) -> String {
		self.0.join(SEPARATOR)
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn orders_task_fields_and_skips_blanks() {
		let task = Entity::Task(TaskEntity {
			title: Some("Mix vocals".to_string()),
			description: Some("  ".to_string()),
			tags: vec!["mixing".to_string(), "".to_string(), "vocals".to_string()],
			status: Some("todo".to_string()),
			priority: Some("high".to_string()),
			..Default::default()
		});

		assert_eq!(
			canonicalize(&task),
			"Mix vocals. Tags: mixing, vocals. Status: todo. Priority: high"
		);
	}

	#[test]
	fn drops_trailing_period_before_joining() {
		let project = Entity::Project(ProjectEntity {
			name: Some("Night Drive.".to_string()),
			description: Some("Ten tracks for late highways.".to_string()),
			status: Some("mixing".to_string()),
			..Default::default()
		});

		assert_eq!(
			canonicalize(&project),
			"Night Drive. Ten tracks for late highways. Status: mixing"
		);
	}
}
