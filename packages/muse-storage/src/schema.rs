pub fn render_schema(vector_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

/// The rendered schema split into individual statements.
pub fn statements(vector_dim: u32) -> Vec<String> {
	render_schema(vector_dim)
		.split(';')
		.map(str::trim)
		.filter(|statement| !statement.is_empty())
		.map(str::to_string)
		.collect()
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		match line.trim().strip_prefix("\\ir ").map(str::trim) {
			Some("00_extensions.sql") =>
				out.push_str(include_str!("../../../sql/00_extensions.sql")),
			Some("tables/001_entity_embeddings.sql") =>
				out.push_str(include_str!("../../../sql/tables/001_entity_embeddings.sql")),
			Some("tables/002_session_events.sql") =>
				out.push_str(include_str!("../../../sql/tables/002_session_events.sql")),
			_ => out.push_str(line),
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_vector_dimension_and_tables() {
		let sql = render_schema(768);

		assert!(sql.contains("vector(768)"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS session_events"));
		assert!(!sql.contains("\\ir"));
	}

	#[test]
	fn splits_into_non_empty_statements() {
		let statements = statements(3);

		assert!(statements.iter().all(|statement| !statement.is_empty()));
		assert!(statements.iter().all(|statement| !statement.ends_with(';')));
		assert!(
			statements
				.iter()
				.any(|statement| statement.starts_with("CREATE EXTENSION IF NOT EXISTS vector"))
		);
	}
}
