pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

/// The rendered schema as individual executable statements. Comment lines are
/// stripped before splitting on `;` so a semicolon inside a comment cannot cut
/// a statement in half.
pub fn schema_statements() -> Vec<String> {
	let rendered = render_schema();
	let without_comments = rendered
		.lines()
		.filter(|line| !line.trim_start().starts_with("--"))
		.collect::<Vec<_>>()
		.join("\n");

	without_comments
		.split(';')
		.map(str::trim)
		.filter(|statement| !statement.is_empty())
		.map(str::to_string)
		.collect()
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_reminders.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_reminders.sql")),
				"tables/002_notification_preferences.sql" => out.push_str(include_str!(
					"../../../sql/tables/002_notification_preferences.sql"
				)),
				"tables/003_notification_log.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_notification_log.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
