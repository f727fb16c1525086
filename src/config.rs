//! Run constants and input file formats

/// Maximum generation attempts per project when the platform reports a
/// transient failure
pub const PROJECT_RETRY_ATTEMPTS: u32 = 10;

/// Parses the project-id list format: one id per line, `#` starts a
/// comment, surrounding whitespace and blank lines are ignored
pub fn parse_project_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.find('#').map_or(line, |index| &line[..index]))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
