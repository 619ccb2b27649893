use crate::solver::db::Database;

/// Renders the database one fact per line, sorted, for trace logging.
pub fn dump_database(db: &Database) -> String {
    let mut lines: Vec<String> = db.propositions().iter().map(|p| p.to_string()).collect();
    lines.sort();
    lines.join("\n")
}
