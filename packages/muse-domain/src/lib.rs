pub mod canonical;
pub mod entity;
pub mod session;

pub use canonical::{canonicalize, canonicalize_fields};
pub use entity::{
	Entity, EntityRef, EntityType, NoteEntity, NoteMemory, ParseEntityTypeError, ProjectEntity,
	SessionEventEntity, TaskEntity,
};
pub use session::{SessionDetails, build_session_content};
